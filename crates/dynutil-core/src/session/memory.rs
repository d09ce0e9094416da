// # Memory Session
//
// In-memory implementation of DnsSession.
//
// ## Purpose
//
// Holds zones, records, redirects and DSF services in a map so the
// dispatcher can be driven without a provider account. Useful for tests
// and for embedding dynutil's dispatch logic in other tools.
//
// ## Staging Model
//
// Mutations are applied to the zone's pending copy. `publish` copies the
// pending state over the live state, which is what listings read from,
// mirroring how the provider only serves published changes.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::credentials::Credentials;
use crate::model::{DsfRecord, DsfService, Node, Record, RecordType, Redirect, Zone};
use crate::traits::{DnsSession, SessionConnector};
use crate::{Error, Result};

#[derive(Debug, Clone, Default)]
struct ZoneState {
    live: Vec<Record>,
    pending: Vec<Record>,
    redirects: Vec<Redirect>,
    dirty: bool,
}

#[derive(Debug, Default)]
struct Inner {
    zones: BTreeMap<String, ZoneState>,
    services: Vec<(DsfService, Vec<DsfRecord>)>,
    fail_publish: bool,
}

/// In-memory session implementation
///
/// Cloning shares the underlying state, so a test can keep a handle to
/// inspect what a dispatcher did through a boxed clone.
///
/// # Example
///
/// ```rust,no_run
/// use dynutil_core::session::MemorySession;
/// use dynutil_core::model::RecordType;
/// use dynutil_core::traits::DnsSession;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let session = MemorySession::new();
///     session.add_zone("example.com").await;
///     session.seed_record("example.com", "www", RecordType::A, "192.0.2.1").await?;
///
///     let zone = session.get_zone("example.com").await?;
///     let all = session.get_all_records(&zone).await?;
///     assert_eq!(all[&RecordType::A].len(), 1);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySession {
    inner: Arc<RwLock<Inner>>,
    next_id: Arc<AtomicU64>,
    publish_count: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl MemorySession {
    /// Create a new empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty zone
    pub async fn add_zone(&self, name: &str) {
        self.inner
            .write()
            .await
            .zones
            .entry(name.to_string())
            .or_default();
    }

    /// Add a published record to a zone
    pub async fn seed_record(
        &self,
        zone: &str,
        node: &str,
        record_type: RecordType,
        value: &str,
    ) -> Result<Record> {
        let record = self.new_record(&Node::resolve(zone, node), record_type, value);
        let mut inner = self.inner.write().await;
        let state = zone_mut(&mut inner, zone)?;
        state.live.push(record.clone());
        state.pending.push(record.clone());
        Ok(record)
    }

    /// Add an HTTP redirect to a zone
    pub async fn seed_redirect(&self, zone: &str, fqdn: &str, url: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        zone_mut(&mut inner, zone)?.redirects.push(Redirect {
            fqdn: fqdn.to_string(),
            url: url.to_string(),
        });
        Ok(())
    }

    /// Add a DSF service with its records
    pub async fn seed_service(&self, service: DsfService, records: Vec<DsfRecord>) {
        self.inner.write().await.services.push((service, records));
    }

    /// Make every subsequent publish fail
    pub async fn fail_publish(&self, fail: bool) {
        self.inner.write().await.fail_publish = fail;
    }

    /// Number of successful publishes
    pub fn publish_count(&self) -> usize {
        self.publish_count.load(Ordering::SeqCst)
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst) > 0
    }

    /// Published records of one type at a FQDN
    pub async fn live_records(&self, zone: &str, fqdn: &str, record_type: RecordType) -> Vec<Record> {
        self.inner
            .read()
            .await
            .zones
            .get(zone)
            .map(|z| {
                z.live
                    .iter()
                    .filter(|r| r.fqdn == fqdn && r.record_type == record_type)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether a zone has unpublished changes
    pub async fn has_pending_changes(&self, zone: &str) -> bool {
        self.inner
            .read()
            .await
            .zones
            .get(zone)
            .is_some_and(|z| z.dirty)
    }

    fn new_record(&self, node: &Node, record_type: RecordType, value: &str) -> Record {
        Record::new(
            node.zone.clone(),
            node.fqdn.clone(),
            record_type,
            self.next_id.fetch_add(1, Ordering::SeqCst).to_string(),
            value,
        )
    }
}

fn zone_mut<'a>(inner: &'a mut Inner, zone: &str) -> Result<&'a mut ZoneState> {
    inner
        .zones
        .get_mut(zone)
        .ok_or_else(|| Error::not_found(format!("zone '{}'", zone)))
}

#[async_trait]
impl DnsSession for MemorySession {
    async fn list_zones(&self) -> Result<Vec<Zone>> {
        Ok(self
            .inner
            .read()
            .await
            .zones
            .keys()
            .map(Zone::new)
            .collect())
    }

    async fn get_zone(&self, name: &str) -> Result<Zone> {
        if self.inner.read().await.zones.contains_key(name) {
            Ok(Zone::new(name))
        } else {
            Err(Error::not_found(format!("zone '{}'", name)))
        }
    }

    async fn get_records_by_type(
        &self,
        node: &Node,
        record_type: RecordType,
    ) -> Result<Vec<Record>> {
        let inner = self.inner.read().await;
        let state = inner
            .zones
            .get(&node.zone)
            .ok_or_else(|| Error::not_found(format!("zone '{}'", node.zone)))?;
        Ok(state
            .pending
            .iter()
            .filter(|r| r.fqdn == node.fqdn && r.record_type == record_type)
            .cloned()
            .collect())
    }

    async fn get_all_records(&self, zone: &Zone) -> Result<BTreeMap<RecordType, Vec<Record>>> {
        let inner = self.inner.read().await;
        let state = inner
            .zones
            .get(&zone.name)
            .ok_or_else(|| Error::not_found(format!("zone '{}'", zone.name)))?;

        let mut grouped: BTreeMap<RecordType, Vec<Record>> = BTreeMap::new();
        for record in &state.live {
            grouped
                .entry(record.record_type)
                .or_default()
                .push(record.clone());
        }
        Ok(grouped)
    }

    async fn add_record(
        &self,
        node: &Node,
        record_type: RecordType,
        value: &str,
    ) -> Result<Record> {
        let record = self.new_record(node, record_type, value);
        let mut inner = self.inner.write().await;
        let state = zone_mut(&mut inner, &node.zone)?;
        state.pending.push(record.clone());
        state.dirty = true;
        Ok(record)
    }

    async fn update_record(&self, record: &Record, value: &str) -> Result<Record> {
        let mut inner = self.inner.write().await;
        let state = zone_mut(&mut inner, &record.zone)?;
        let existing = state
            .pending
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or_else(|| Error::not_found(format!("record {}", record.id)))?;
        existing.set_value(value);
        let updated = existing.clone();
        state.dirty = true;
        Ok(updated)
    }

    async fn delete_record(&self, record: &Record) -> Result<()> {
        let mut inner = self.inner.write().await;
        let state = zone_mut(&mut inner, &record.zone)?;
        let before = state.pending.len();
        state.pending.retain(|r| r.id != record.id);
        if state.pending.len() == before {
            return Err(Error::not_found(format!("record {}", record.id)));
        }
        state.dirty = true;
        Ok(())
    }

    async fn publish(&self, zone: &Zone) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.fail_publish {
            return Err(Error::provider("memory", "publish rejected"));
        }
        let state = zone_mut(&mut inner, &zone.name)?;
        state.live = state.pending.clone();
        state.dirty = false;
        self.publish_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_all_http_redirects(&self, zone: &Zone) -> Result<Vec<Redirect>> {
        let inner = self.inner.read().await;
        inner
            .zones
            .get(&zone.name)
            .map(|z| z.redirects.clone())
            .ok_or_else(|| Error::not_found(format!("zone '{}'", zone.name)))
    }

    async fn list_dsf_services(&self) -> Result<Vec<DsfService>> {
        Ok(self
            .inner
            .read()
            .await
            .services
            .iter()
            .map(|(s, _)| s.clone())
            .collect())
    }

    async fn get_records_for_service(&self, service: &DsfService) -> Result<Vec<DsfRecord>> {
        self.inner
            .read()
            .await
            .services
            .iter()
            .find(|(s, _)| s.id == service.id)
            .map(|(_, records)| records.clone())
            .ok_or_else(|| Error::not_found(format!("DSF service '{}'", service.id)))
    }

    async fn close(&self) -> Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}

/// Connector that hands out clones of one [`MemorySession`]
///
/// Accepts exactly one set of credentials; anything else is an
/// authentication failure.
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    session: MemorySession,
    accepted: Credentials,
    connects: Arc<AtomicUsize>,
}

impl MemoryConnector {
    pub fn new(session: MemorySession, accepted: Credentials) -> Self {
        Self {
            session,
            accepted,
            connects: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of connection attempts
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionConnector for MemoryConnector {
    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn DnsSession>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if *credentials != self.accepted {
            return Err(Error::auth("invalid customer, user or password"));
        }
        Ok(Box::new(self.session.clone()))
    }
}
