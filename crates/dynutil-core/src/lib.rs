// # dynutil-core
//
// Core library for the dynutil command-line tool.
//
// ## Architecture Overview
//
// dynutil runs one operation per invocation against a hosted DNS provider:
// - **Credentials**: Typed, safely-parsed API credentials file
// - **Invocation**: Validated command built from raw command-line options
// - **SessionConnector / DnsSession**: Traits the provider crates implement
// - **Dispatcher**: Runs a command against a session (list, create, update, delete + publish)
// - **output**: Renders results as YAML documents or plain zone names
//
// ## Design Principles
//
// 1. **Validate first**: Usage errors are found before files or network are touched
// 2. **Provider is the source of truth**: No caching, no retries, no rollback
// 3. **Library-First**: Everything but flag parsing is usable without the binary

pub mod command;
pub mod credentials;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod output;
pub mod session;
pub mod traits;

// Re-export core types for convenience
pub use command::{Command, Invocation, Mutation, Operation, Options, QueryType};
pub use credentials::Credentials;
pub use dispatch::{Dispatcher, Outcome, ServiceListing};
pub use error::{Error, ErrorKind, Result};
pub use model::{DsfRecord, DsfService, Node, Record, RecordType, Redirect, Zone};
pub use session::{MemoryConnector, MemorySession};
pub use traits::{DnsSession, SessionConnector};
