pub mod chat;
pub mod conversation;
pub mod errors;
pub mod host;
pub mod models;
pub mod providers;
pub mod tools;
