//! Data model shared by sessions, the dispatcher and the output formatter

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// DNS record types dynutil can list and mutate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// Canonical name record
    Cname,
    /// Mail exchange record
    Mx,
}

impl RecordType {
    /// All supported record types
    pub const ALL: [RecordType; 3] = [RecordType::A, RecordType::Cname, RecordType::Mx];

    /// Upper-case mnemonic as used by the provider ("A", "CNAME", "MX")
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
        }
    }

    /// Name of the rdata field that carries this type's value
    pub fn value_field(&self) -> &'static str {
        match self {
            RecordType::A => "address",
            RecordType::Cname => "cname",
            RecordType::Mx => "exchange",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "CNAME" => Ok(RecordType::Cname),
            "MX" => Ok(RecordType::Mx),
            other => Err(Error::invalid_input(format!(
                "unsupported record type '{}'",
                other
            ))),
        }
    }
}

/// A DNS zone managed by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    /// Zone name, e.g. "example.com"
    pub name: String,
}

impl Zone {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A name inside a zone at which records hang
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Owning zone
    pub zone: String,
    /// Fully-qualified name of the node
    pub fqdn: String,
}

impl Node {
    /// Resolve `name` inside `zone`; an empty name is the zone apex
    pub fn resolve(zone: &str, name: &str) -> Self {
        let fqdn = if name.is_empty() {
            zone.to_string()
        } else {
            format!("{}.{}", name, zone)
        };
        Self {
            zone: zone.to_string(),
            fqdn,
        }
    }

    /// Whether this node is the zone apex
    pub fn is_root(&self) -> bool {
        self.fqdn == self.zone
    }
}

/// A single A, CNAME or MX record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Owning zone
    pub zone: String,
    /// Fully-qualified owner name
    pub fqdn: String,
    /// Record type
    pub record_type: RecordType,
    /// Provider-assigned record id
    pub id: String,
    /// Value of the type-specific field (address, cname or exchange)
    pub value: String,
    /// Full rdata as the provider returned it, e.g. MX `preference`
    pub rdata: Map<String, Value>,
}

impl Record {
    /// Record whose rdata holds only the value field
    pub fn new(
        zone: impl Into<String>,
        fqdn: impl Into<String>,
        record_type: RecordType,
        id: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let mut record = Self {
            zone: zone.into(),
            fqdn: fqdn.into(),
            record_type,
            id: id.into(),
            value: String::new(),
            rdata: Map::new(),
        };
        record.set_value(value);
        record
    }

    /// Replace the value field, leaving the rest of the rdata untouched
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.rdata.insert(
            self.record_type.value_field().to_string(),
            Value::String(self.value.clone()),
        );
    }
}

/// An HTTP redirect bound to a name in a zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// Name the redirect answers for
    pub fqdn: String,
    /// Target URL
    pub url: String,
}

/// A traffic director (DSF) service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DsfService {
    /// Provider-assigned service id
    pub id: String,
    /// Human-readable label
    pub label: String,
    /// FQDNs of the nodes the service is attached to
    pub nodes: Vec<String>,
}

/// A record served by a traffic director service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DsfRecord {
    /// Record label
    pub label: String,
    /// Record in "<TYPE> <rdata>" form
    pub record: String,
}
