pub mod audio;
pub mod catalog;
pub mod config;
pub mod error;
pub mod kernel;
pub mod outputs;
pub mod services;
pub mod turn;

pub use error::{AudioError, KioskError};
pub use kernel::reactor::Reactor;
