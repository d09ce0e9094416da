// # DNS Session Traits
//
// Defines the interface dynutil uses to talk to the DNS provider.
//
// ## Implementations
//
// - DynECT REST API: `dynutil-provider-dynect` crate
// - In-memory: [`crate::session::MemorySession`] (tests, embedding)
//
// ## Usage
//
// ```rust,ignore
// use dynutil_core::{Credentials, SessionConnector};
//
// async fn run(connector: &dyn SessionConnector) -> dynutil_core::Result<()> {
//     let creds = Credentials::from_file("creds.yaml")?;
//     let session = connector.connect(&creds).await?;
//
//     for zone in session.list_zones().await? {
//         println!("{}", zone.name);
//     }
//
//     session.close().await
// }
// ```

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::credentials::Credentials;
use crate::model::{DsfRecord, DsfService, Node, Record, RecordType, Redirect, Zone};
use crate::Result;

/// An authenticated session with the DNS provider
///
/// Every call is a single, blocking-from-the-caller's-view request. The
/// session performs no retries and keeps no cache: the provider is the
/// source of truth for every answer.
///
/// Mutations (`add_record`, `update_record`, `delete_record`) only stage
/// changes; they become live after [`DnsSession::publish`] on the zone.
#[async_trait]
pub trait DnsSession: Send + Sync {
    /// List every zone visible to the session
    async fn list_zones(&self) -> Result<Vec<Zone>>;

    /// Resolve a single zone by name
    ///
    /// Fails with [`crate::Error::NotFound`] if the zone does not exist.
    async fn get_zone(&self, name: &str) -> Result<Zone>;

    /// Resolve a node inside a zone
    ///
    /// An empty `name` is the zone apex.
    async fn get_node(&self, zone: &Zone, name: &str) -> Result<Node> {
        Ok(Node::resolve(&zone.name, name))
    }

    /// Records of one type attached to a node, in provider order
    ///
    /// Returns an empty list when the node carries no such records.
    async fn get_records_by_type(&self, node: &Node, record_type: RecordType)
        -> Result<Vec<Record>>;

    /// Every A, CNAME and MX record in a zone, grouped by type
    async fn get_all_records(&self, zone: &Zone) -> Result<BTreeMap<RecordType, Vec<Record>>>;

    /// Stage a new record at a node
    async fn add_record(&self, node: &Node, record_type: RecordType, value: &str)
        -> Result<Record>;

    /// Stage a new value for an existing record
    async fn update_record(&self, record: &Record, value: &str) -> Result<Record>;

    /// Stage the removal of a record
    async fn delete_record(&self, record: &Record) -> Result<()>;

    /// Make staged changes in a zone live
    async fn publish(&self, zone: &Zone) -> Result<()>;

    /// HTTP redirects configured in a zone
    async fn get_all_http_redirects(&self, zone: &Zone) -> Result<Vec<Redirect>>;

    /// Every traffic director service on the account
    async fn list_dsf_services(&self) -> Result<Vec<DsfService>>;

    /// Records served by a traffic director service
    async fn get_records_for_service(&self, service: &DsfService) -> Result<Vec<DsfRecord>>;

    /// End the session on the provider side
    async fn close(&self) -> Result<()>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Opens authenticated sessions
///
/// Authentication failures must surface as [`crate::Error::Authentication`];
/// there is no partially-open session.
#[async_trait]
pub trait SessionConnector: Send + Sync {
    /// Authenticate and return a live session
    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn DnsSession>>;
}
