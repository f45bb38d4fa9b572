pub mod classifier;
pub mod types;

pub use classifier::IntentClassifier;
pub use types::{Intent, Utterances};
