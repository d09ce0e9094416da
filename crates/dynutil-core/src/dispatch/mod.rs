//! Query dispatcher
//!
//! Runs exactly one validated [`Command`] against a [`DnsSession`].
//!
//! ## Dispatch Table
//!
//! ```text
//! operation  type          action
//! ---------  ------------  ----------------------------------------------
//! list       zone          all zones, or the named one
//! list       a/cname/mx    every record of that type in the zone
//! list       redirect      every HTTP redirect in the zone
//! list       dsf           every DSF service with its records
//! update     a/cname/mx    first record of that type at the node → publish
//! create     a/cname/mx    new record at the node → publish
//! delete     a/cname/mx    first record of that type at the node → publish
//! ```
//!
//! Update and delete touch only the first record the provider returns for
//! the node; any others of the same type are left alone.
//!
//! Every failure is reported as a single [`Error::Query`] naming the
//! operation and target. Nothing is rolled back: if a mutation landed but
//! publish failed, the zone is left with pending changes on the provider.

use tracing::{debug, info};

use crate::command::{Command, Mutation, Operation};
use crate::error::{Error, Result};
use crate::model::{DsfRecord, DsfService, Node, Record, RecordType, Redirect};
use crate::traits::DnsSession;

/// A DSF service together with its records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceListing {
    pub service: DsfService,
    pub records: Vec<DsfRecord>,
}

/// Result of running a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Zone names
    Zones(Vec<String>),
    /// Records of one type in a zone
    RecordSet {
        zone: String,
        record_type: RecordType,
        records: Vec<Record>,
    },
    /// HTTP redirects in a zone
    Redirects {
        zone: String,
        redirects: Vec<Redirect>,
    },
    /// DSF services
    Dsf(Vec<ServiceListing>),
    /// A record was changed and the zone published
    Mutated {
        operation: Operation,
        zone: String,
        fqdn: String,
        record_type: RecordType,
    },
}

/// Runs commands against a session
pub struct Dispatcher<'a> {
    session: &'a dyn DnsSession,
}

impl<'a> Dispatcher<'a> {
    pub fn new(session: &'a dyn DnsSession) -> Self {
        Self { session }
    }

    /// Run a command
    pub async fn execute(&self, command: &Command) -> Result<Outcome> {
        debug!(
            "Dispatching {:?} via {}",
            command,
            self.session.provider_name()
        );

        match command {
            Command::ListZones { zone } => self
                .list_zones(zone.as_deref())
                .await
                .map_err(|e| Error::query("failed to get zone(s)", e)),
            Command::ListRecords { zone, record_type } => self
                .list_records(zone, *record_type)
                .await
                .map_err(|e| {
                    Error::query(
                        format!("failed to get {} records for zone '{}'", record_type, zone),
                        e,
                    )
                }),
            Command::ListRedirects { zone } => self
                .list_redirects(zone)
                .await
                .map_err(|e| {
                    Error::query(format!("failed to get redirects for zone '{}'", zone), e)
                }),
            Command::ListDsf => self
                .list_dsf()
                .await
                .map_err(|e| Error::query("failed to get traffic director services", e)),
            Command::Mutate {
                zone,
                node,
                record_type,
                mutation,
            } => self
                .mutate(zone, node, *record_type, mutation)
                .await
                .map_err(|e| {
                    Error::query(
                        format!(
                            "failed to {} {} record at node '{}' in zone '{}'",
                            mutation.operation(),
                            record_type,
                            node,
                            zone
                        ),
                        e,
                    )
                }),
        }
    }

    async fn list_zones(&self, zone: Option<&str>) -> Result<Outcome> {
        let zones = match zone {
            None => self.session.list_zones().await?,
            Some(name) => vec![self.session.get_zone(name).await?],
        };
        Ok(Outcome::Zones(zones.into_iter().map(|z| z.name).collect()))
    }

    async fn list_records(&self, zone: &str, record_type: RecordType) -> Result<Outcome> {
        let zone = self.session.get_zone(zone).await?;
        let mut all = self.session.get_all_records(&zone).await?;
        let records = all.remove(&record_type).unwrap_or_default();
        debug!(
            "Found {} {} record(s) in {}",
            records.len(),
            record_type,
            zone.name
        );
        Ok(Outcome::RecordSet {
            zone: zone.name,
            record_type,
            records,
        })
    }

    async fn list_redirects(&self, zone: &str) -> Result<Outcome> {
        let zone = self.session.get_zone(zone).await?;
        let redirects = self.session.get_all_http_redirects(&zone).await?;
        Ok(Outcome::Redirects {
            zone: zone.name,
            redirects,
        })
    }

    async fn list_dsf(&self) -> Result<Outcome> {
        let services = self.session.list_dsf_services().await?;
        let mut listings = Vec::with_capacity(services.len());
        for service in services {
            let records = self.session.get_records_for_service(&service).await?;
            listings.push(ServiceListing { service, records });
        }
        Ok(Outcome::Dsf(listings))
    }

    async fn mutate(
        &self,
        zone: &str,
        node: &str,
        record_type: RecordType,
        mutation: &Mutation,
    ) -> Result<Outcome> {
        let zone = self.session.get_zone(zone).await?;
        let node = self.session.get_node(&zone, node).await?;

        match mutation {
            Mutation::Create { value } => {
                let record = self.session.add_record(&node, record_type, value).await?;
                info!(
                    "Created {} record {} -> {}",
                    record_type, record.fqdn, record.value
                );
            }
            Mutation::Update { value } => {
                let record = self.first_record(&node, record_type).await?;
                let updated = self.session.update_record(&record, value).await?;
                info!(
                    "Updated {} record {}: {} -> {}",
                    record_type, updated.fqdn, record.value, updated.value
                );
            }
            Mutation::Delete => {
                let record = self.first_record(&node, record_type).await?;
                self.session.delete_record(&record).await?;
                info!(
                    "Deleted {} record {} -> {}",
                    record_type, record.fqdn, record.value
                );
            }
        }

        self.session.publish(&zone).await?;
        info!("Published zone {}", zone.name);

        Ok(Outcome::Mutated {
            operation: mutation.operation(),
            zone: zone.name,
            fqdn: node.fqdn,
            record_type,
        })
    }

    async fn first_record(
        &self,
        node: &Node,
        record_type: RecordType,
    ) -> Result<Record> {
        let mut records = self.session.get_records_by_type(node, record_type).await?;
        if records.len() > 1 {
            debug!(
                "{} {} records at {}, using the first",
                records.len(),
                record_type,
                node.fqdn
            );
        }
        if records.is_empty() {
            return Err(Error::not_found(format!(
                "no {} record at {}",
                record_type, node.fqdn
            )));
        }
        Ok(records.swap_remove(0))
    }
}
