#[tokio::main]
async fn main() {
    marketplace_backend::run().await;
}
