pub mod chat;
pub mod realizer;
pub mod screen;

pub use chat::{ChatLog, ChatMessage, Role};
pub use screen::{LoggingScreenRouter, ScreenRouter};
