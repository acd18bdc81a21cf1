pub mod lifecycle;
pub mod view_state;
pub mod listings;
pub mod retry;
