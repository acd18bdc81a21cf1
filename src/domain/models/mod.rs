pub mod job;
pub mod application;
pub mod notification;
pub mod conversation;
pub mod auth;
