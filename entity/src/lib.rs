pub mod account;
pub mod application;
pub mod document;
pub mod global_event;
pub mod inquiry;
pub mod message;
pub mod public_event;
pub mod task;
pub mod user;
