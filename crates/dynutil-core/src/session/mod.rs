//! Session implementations
//!
//! This module contains the built-in DnsSession implementations.

pub mod memory;

pub use memory::{MemoryConnector, MemorySession};
