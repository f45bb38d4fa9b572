//! Turn model: what the conversation backend says, in client vocabulary.

pub mod normalizer;
pub mod types;
pub mod wire;

pub use types::{DialogueStep, FocusToken, SlotSet, TurnResponse};
