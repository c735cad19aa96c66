//! Command data model
//!
//! A command file is a list of `query:` and `purchase:` statements. Each
//! statement that parses becomes one [`Command`], and each command yields
//! exactly one [`CommandResult`] when executed.

pub mod parser;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

pub use parser::{parse_commands, parse_file, ParseDiagnostic, ParseErrorKind, ParsedCommands};

/// Status a query must return for its body to be kept
pub const QUERY_SUCCESS: u16 = 200;

/// Status a purchase must return for its body to be kept
pub const PURCHASE_SUCCESS: u16 = 201;

/// Status recorded when no response was received at all
pub const TRANSPORT_FAILURE: u16 = 500;

/// Identifier of a pet store service as written in a command file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StoreId(pub i64);

impl StoreId {
    pub const STORE_1: StoreId = StoreId(1);
    pub const STORE_2: StoreId = StoreId(2);
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A parsed unit of work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Look up pet types on one store with a single `field=value` filter
    Query {
        store: StoreId,
        field: String,
        value: String,
    },

    /// Create an order; the payload is forwarded verbatim
    Purchase { payload: Map<String, Value> },
}

impl Command {
    /// Short name used in logs and progress output
    pub fn kind(&self) -> &'static str {
        match self {
            Command::Query { .. } => "query",
            Command::Purchase { .. } => "purchase",
        }
    }

    /// The status the protocol declares as success for this kind of command
    pub fn success_status(&self) -> u16 {
        match self {
            Command::Query { .. } => QUERY_SUCCESS,
            Command::Purchase { .. } => PURCHASE_SUCCESS,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Query {
                store,
                field,
                value,
            } => write!(f, "query store {store}, {field}={value}"),
            Command::Purchase { payload } => {
                write!(f, "purchase {}", Value::Object(payload.clone()))
            }
        }
    }
}

/// Outcome of executing one command
///
/// `payload` is present only when `status` equals the command's success
/// status; use the constructors to keep that pairing.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult {
    pub status: u16,
    pub payload: Option<Value>,
}

impl CommandResult {
    /// A call that returned the declared success status with a body
    pub fn success(status: u16, payload: Value) -> Self {
        Self {
            status,
            payload: Some(payload),
        }
    }

    /// A call that returned some other status
    pub fn failure(status: u16) -> Self {
        Self {
            status,
            payload: None,
        }
    }

    /// No usable response was received
    pub fn transport_failure() -> Self {
        Self::failure(TRANSPORT_FAILURE)
    }
}
