//! Pet query runner - replays a command file against the pet services
//!
//! Reads `query:` and `purchase:` statements, sends each one to the pet
//! store or pet order service in file order, and writes one transcript
//! block per command.

pub mod command;
pub mod common;
pub mod executor;
pub mod readiness;
pub mod router;
pub mod runner;
pub mod seed;
pub mod transcript;

// Re-export commonly used types for tests
pub use command::{Command, CommandResult, StoreId};
pub use common::{Error, Result};
