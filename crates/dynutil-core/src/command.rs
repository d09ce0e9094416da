//! Command-line option validation
//!
//! Raw options as they come off the command line are turned into a closed
//! [`Command`] before anything touches the filesystem or the network.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::model::RecordType;
use crate::{Error, Result};

/// What to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    List,
    Update,
    Create,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::List => "list",
            Operation::Update => "update",
            Operation::Create => "create",
            Operation::Delete => "delete",
        })
    }
}

/// What to do it to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Zone,
    Mx,
    Cname,
    A,
    Redirect,
    Dsf,
}

impl QueryType {
    /// The record type behind this query type, if any
    pub fn record_type(&self) -> Option<RecordType> {
        match self {
            QueryType::A => Some(RecordType::A),
            QueryType::Cname => Some(RecordType::Cname),
            QueryType::Mx => Some(RecordType::Mx),
            QueryType::Zone | QueryType::Redirect | QueryType::Dsf => None,
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QueryType::Zone => "zone",
            QueryType::Mx => "mx",
            QueryType::Cname => "cname",
            QueryType::A => "a",
            QueryType::Redirect => "redirect",
            QueryType::Dsf => "dsf",
        })
    }
}

/// Options exactly as the user supplied them
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub zone: Option<String>,
    pub node: Option<String>,
    pub value: Option<String>,
    pub operation: Option<Operation>,
    pub creds_file: Option<PathBuf>,
    pub query_type: Option<QueryType>,
}

/// A staged change to a single record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create { value: String },
    Update { value: String },
    Delete,
}

impl Mutation {
    pub fn operation(&self) -> Operation {
        match self {
            Mutation::Create { .. } => Operation::Create,
            Mutation::Update { .. } => Operation::Update,
            Mutation::Delete => Operation::Delete,
        }
    }
}

/// A validated command, one per invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print all zone names, or just the named one
    ListZones { zone: Option<String> },
    /// Print every record of one type in a zone
    ListRecords { zone: String, record_type: RecordType },
    /// Print the HTTP redirects of a zone
    ListRedirects { zone: String },
    /// Print every traffic director service
    ListDsf,
    /// Create, update or delete a record and publish the zone
    Mutate {
        zone: String,
        node: String,
        record_type: RecordType,
        mutation: Mutation,
    },
}

/// A validated invocation: where the credentials are, and what to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub creds_file: PathBuf,
    pub command: Command,
}

impl Invocation {
    /// Validate raw options
    ///
    /// Checks run in a fixed order (credentials file, type, operation, then
    /// the per-operation rules) and the first failure wins.
    pub fn from_options(options: Options) -> Result<Self> {
        let Options {
            zone,
            node,
            value,
            operation,
            creds_file,
            query_type,
        } = options;

        let creds_file = creds_file
            .ok_or_else(|| Error::usage("Please specify API credentials file (--creds-file)"))?;
        let query_type = query_type
            .ok_or_else(|| Error::usage("Please specify type of items to query (--type)"))?;
        let operation = operation
            .ok_or_else(|| Error::usage("Please specify operation to perform (--operation)"))?;

        let command = match operation {
            Operation::List => {
                if let Some(record_type) = query_type.record_type() {
                    Command::ListRecords {
                        zone: require_zone(zone)?,
                        record_type,
                    }
                } else if query_type == QueryType::Redirect {
                    Command::ListRedirects {
                        zone: require_zone(zone)?,
                    }
                } else if query_type == QueryType::Zone {
                    Command::ListZones { zone }
                } else {
                    Command::ListDsf
                }
            }
            Operation::Update | Operation::Create | Operation::Delete => {
                let record_type = query_type.record_type().ok_or_else(|| {
                    Error::usage(format!(
                        "Operation '{}' is only supported for types a, cname and mx (got '{}')",
                        operation, query_type
                    ))
                })?;
                let node = node.ok_or_else(|| {
                    Error::usage(format!(
                        "Please specify node to {} (--node, use '' for the root node)",
                        operation
                    ))
                })?;
                let zone = require_zone(zone)?;

                let mutation = match operation {
                    Operation::Delete => {
                        if value.is_some() {
                            tracing::warn!("Ignoring value for delete operation");
                        }
                        Mutation::Delete
                    }
                    Operation::Update => Mutation::Update {
                        value: require_value(value, operation)?,
                    },
                    _ => Mutation::Create {
                        value: require_value(value, operation)?,
                    },
                };

                Command::Mutate {
                    zone,
                    node,
                    record_type,
                    mutation,
                }
            }
        };

        Ok(Self {
            creds_file,
            command,
        })
    }
}

fn require_zone(zone: Option<String>) -> Result<String> {
    zone.ok_or_else(|| Error::usage("Please specify zone to run query against (--zone)"))
}

fn require_value(value: Option<String>, operation: Operation) -> Result<String> {
    value.ok_or_else(|| Error::usage(format!("Please specify value to {} (--value)", operation)))
}
