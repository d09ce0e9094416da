//! Core traits for dynutil
//!
//! This module defines the abstract interfaces that all providers must follow.
//!
//! - [`SessionConnector`]: Authenticate against a provider
//! - [`DnsSession`]: Query and mutate zones, records, redirects and DSF services

pub mod session;

pub use session::{DnsSession, SessionConnector};
