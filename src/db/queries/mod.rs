pub mod accounts;
pub mod applications;
pub mod checklist;
pub mod events;
pub mod inquiries;
pub mod messages;
pub mod users;
