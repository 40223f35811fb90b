pub mod api;
pub mod conversation;
