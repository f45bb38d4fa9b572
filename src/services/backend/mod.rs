pub mod client;
pub mod dispatcher;

pub use client::ConversationClient;
pub use dispatcher::TurnDispatcher;
