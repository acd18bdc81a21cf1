pub mod health;
pub mod job;
pub mod application;
pub mod view_state;
pub mod notification;
