//! Test doubles and common utilities for dispatcher contract tests

#![allow(dead_code)]

use async_trait::async_trait;
use dynutil_core::error::{Error, Result};
use dynutil_core::model::{DsfRecord, DsfService, Node, Record, RecordType, Redirect, Zone};
use dynutil_core::traits::DnsSession;
use dynutil_core::{Command, Invocation, MemorySession, Operation, Options, QueryType};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A memory session seeded with the zone most tests use
pub async fn example_session() -> MemorySession {
    let session = MemorySession::new();
    session.add_zone("example.com").await;
    session.add_zone("example.org").await;
    session
}

/// Build and validate a command the way the binary would
pub fn command(
    operation: Operation,
    query_type: QueryType,
    zone: Option<&str>,
    node: Option<&str>,
    value: Option<&str>,
) -> Command {
    Invocation::from_options(Options {
        zone: zone.map(str::to_string),
        node: node.map(str::to_string),
        value: value.map(str::to_string),
        operation: Some(operation),
        creds_file: Some(PathBuf::from("creds.yaml")),
        query_type: Some(query_type),
    })
    .expect("valid options")
    .command
}

/// A session where every call fails and each call is counted
#[derive(Default, Clone)]
pub struct FailingSession {
    calls: Arc<AtomicUsize>,
}

impl FailingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> Result<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::provider("failing", "service unavailable"))
    }
}

#[async_trait]
impl DnsSession for FailingSession {
    async fn list_zones(&self) -> Result<Vec<Zone>> {
        self.fail()
    }

    async fn get_zone(&self, _name: &str) -> Result<Zone> {
        self.fail()
    }

    async fn get_records_by_type(&self, _node: &Node, _t: RecordType) -> Result<Vec<Record>> {
        self.fail()
    }

    async fn get_all_records(&self, _zone: &Zone) -> Result<BTreeMap<RecordType, Vec<Record>>> {
        self.fail()
    }

    async fn add_record(&self, _node: &Node, _t: RecordType, _value: &str) -> Result<Record> {
        self.fail()
    }

    async fn update_record(&self, _record: &Record, _value: &str) -> Result<Record> {
        self.fail()
    }

    async fn delete_record(&self, _record: &Record) -> Result<()> {
        self.fail()
    }

    async fn publish(&self, _zone: &Zone) -> Result<()> {
        self.fail()
    }

    async fn get_all_http_redirects(&self, _zone: &Zone) -> Result<Vec<Redirect>> {
        self.fail()
    }

    async fn list_dsf_services(&self) -> Result<Vec<DsfService>> {
        self.fail()
    }

    async fn get_records_for_service(&self, _service: &DsfService) -> Result<Vec<DsfRecord>> {
        self.fail()
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "failing"
    }
}
