//! Shared request, response, and conversation types

pub mod chat;
pub mod request;
pub mod response;

pub use chat::{ChatMessage, ChatRole};
