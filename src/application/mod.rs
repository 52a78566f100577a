//! Application layer: the editing session
//!
//! Holds the current tree and turns user intents into tree editor calls.

pub mod error;
pub mod session;

pub use error::{ApplicationError, ApplicationResult};
pub use session::{Command, Outcome, QuerySession};
