//! Rendering of query results
//!
//! Listings become YAML documents; zone names are plain lines. Empty record
//! and redirect listings render to nothing at all, not to an empty document.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::dispatch::{Outcome, ServiceListing};
use crate::model::{DsfRecord, Record, RecordType, Redirect};
use crate::Result;

/// `recordset` document for typed record listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSetDocument {
    pub recordset: RecordSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    #[serde(rename = "type")]
    pub record_type: String,
    pub zone: String,
    /// One single-key `{fqdn: value}` mapping per record
    pub records: Vec<BTreeMap<String, String>>,
}

/// `webredirects` document for redirect listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebRedirectsDocument {
    pub webredirects: WebRedirects,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebRedirects {
    pub zone: String,
    /// One single-key `{fqdn: url}` mapping per redirect
    pub redirects: Vec<BTreeMap<String, String>>,
}

/// `trafficdirector` document, one per DSF service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficDirectorDocument {
    pub trafficdirector: TrafficDirector,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficDirector {
    pub label: String,
    pub nodes: Vec<String>,
    pub records: Vec<DsfRecord>,
}

impl RecordSetDocument {
    pub fn new(zone: &str, record_type: RecordType, records: &[Record]) -> Self {
        Self {
            recordset: RecordSet {
                record_type: record_type.as_str().to_string(),
                zone: zone.to_string(),
                records: records
                    .iter()
                    .map(|r| single_entry(&r.fqdn, &r.value))
                    .collect(),
            },
        }
    }
}

impl WebRedirectsDocument {
    pub fn new(zone: &str, redirects: &[Redirect]) -> Self {
        Self {
            webredirects: WebRedirects {
                zone: zone.to_string(),
                redirects: redirects
                    .iter()
                    .map(|r| single_entry(&r.fqdn, &r.url))
                    .collect(),
            },
        }
    }
}

impl From<&ServiceListing> for TrafficDirectorDocument {
    fn from(listing: &ServiceListing) -> Self {
        Self {
            trafficdirector: TrafficDirector {
                label: listing.service.label.clone(),
                nodes: listing.service.nodes.clone(),
                records: listing.records.clone(),
            },
        }
    }
}

fn single_entry(key: &str, value: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(key.to_string(), value.to_string())])
}

/// Render an outcome as the text to write on stdout
///
/// Returns an empty string when there is nothing to print.
pub fn render(outcome: &Outcome) -> Result<String> {
    match outcome {
        Outcome::Zones(names) => Ok(names.iter().map(|n| format!("{}\n", n)).collect()),
        Outcome::RecordSet {
            zone,
            record_type,
            records,
        } => {
            if records.is_empty() {
                return Ok(String::new());
            }
            Ok(serde_yaml::to_string(&RecordSetDocument::new(
                zone,
                *record_type,
                records,
            ))?)
        }
        Outcome::Redirects { zone, redirects } => {
            if redirects.is_empty() {
                return Ok(String::new());
            }
            Ok(serde_yaml::to_string(&WebRedirectsDocument::new(
                zone, redirects,
            ))?)
        }
        Outcome::Dsf(services) => {
            let mut out = String::new();
            for listing in services {
                out.push_str("---\n");
                out.push_str(&serde_yaml::to_string(&TrafficDirectorDocument::from(
                    listing,
                ))?);
            }
            Ok(out)
        }
        Outcome::Mutated { .. } => Ok(String::new()),
    }
}
