// # DynECT Session Provider
//
// This crate implements dynutil's `SessionConnector` and `DnsSession`
// traits on top of the DynECT Managed DNS REST API.
//
// ## Behavior
//
// - ✅ One HTTP request per trait call
// - ✅ Full error propagation (the caller decides what a failure means)
// - ✅ Specific error handling for HTTP status codes (401, 403, 404, 429, 5xx)
// - ✅ Pending jobs (HTTP 307) are reported, never polled
// - ❌ NO retry logic
// - ❌ NO client-side timeout
// - ❌ NO caching
//
// ## Security Requirements
//
// - Password and session token NEVER appear in logs or Debug output
// - The session token only travels in the `Auth-Token` header
//
// ## API Reference
//
// - Create session: POST `/REST/Session/`
// - End session: DELETE `/REST/Session/`
// - Zones: GET `/REST/Zone/`, GET/PUT `/REST/Zone/:zone/`
// - Records: GET/POST `/REST/:TypeRecord/:zone/:fqdn/`, PUT/DELETE `.../:record_id/`
// - All records: GET `/REST/AllRecord/:zone/?detail=Y`
// - Redirects: GET `/REST/HTTPRedirect/:zone/?detail=Y`
// - Traffic director: GET `/REST/DSF/?detail=Y`, GET `/REST/DSFRecord/:service_id/?detail=Y`

use async_trait::async_trait;
use dynutil_core::model::{DsfRecord, DsfService, Node, Record, RecordType, Redirect, Zone};
use dynutil_core::traits::{DnsSession, SessionConnector};
use dynutil_core::{Credentials, Error, Result};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// DynECT API base URL
pub const DYNECT_API_BASE: &str = "https://api.dynect.net";

/// Provider name used in errors and logs
const PROVIDER: &str = "dynect";

/// MX preference used for newly created MX records
const DEFAULT_MX_PREFERENCE: u32 = 10;

/// Standard response envelope
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: String,
    data: Option<T>,
    #[serde(default)]
    job_id: Option<u64>,
    #[serde(default)]
    msgs: Vec<ApiMessage>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(rename = "INFO", default)]
    info: String,
    #[serde(rename = "ERR_CD", default)]
    err_cd: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionData {
    token: String,
}

#[derive(Debug, Deserialize)]
struct ZoneData {
    zone: String,
}

#[derive(Debug, Deserialize)]
struct RecordData {
    zone: String,
    fqdn: String,
    #[serde(default)]
    rdata: Map<String, Value>,
    record_id: Value,
}

#[derive(Debug, Deserialize)]
struct RedirectData {
    fqdn: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct ServiceData {
    service_id: Value,
    #[serde(default)]
    label: String,
    #[serde(default)]
    nodes: Vec<ServiceNode>,
}

#[derive(Debug, Deserialize)]
struct ServiceNode {
    fqdn: String,
}

#[derive(Debug, Deserialize)]
struct DsfRecordData {
    #[serde(default)]
    label: String,
    #[serde(default)]
    rdata_class: Option<String>,
    #[serde(default)]
    master_line: Option<String>,
}

/// Path segment naming the REST resource for a record type
fn record_resource(record_type: RecordType) -> &'static str {
    match record_type {
        RecordType::A => "ARecord",
        RecordType::Cname => "CNAMERecord",
        RecordType::Mx => "MXRecord",
    }
}

/// Key under which `AllRecord` groups a record type
fn all_records_key(record_type: RecordType) -> &'static str {
    match record_type {
        RecordType::A => "a_records",
        RecordType::Cname => "cname_records",
        RecordType::Mx => "mx_records",
    }
}

/// Ids come back as numbers or strings depending on the resource
fn id_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// "/REST/Zone/example.com/" -> "example.com"
fn zone_name_from_uri(uri: &str) -> Option<&str> {
    uri.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
}

/// rdata for a new record; MX records get the default preference
fn rdata_for(record_type: RecordType, value: &str) -> Value {
    let mut rdata = Map::new();
    rdata.insert(
        record_type.value_field().to_string(),
        Value::String(value.to_string()),
    );
    if record_type == RecordType::Mx {
        rdata.insert("preference".to_string(), Value::from(DEFAULT_MX_PREFERENCE));
    }
    Value::Object(rdata)
}

impl RecordData {
    fn into_record(self, record_type: RecordType) -> Result<Record> {
        let field = record_type.value_field();
        let value = self
            .rdata
            .get(field)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::provider(
                    PROVIDER,
                    format!(
                        "Invalid response format: {} record {} has no '{}'",
                        record_type, self.fqdn, field
                    ),
                )
            })?
            .to_string();

        Ok(Record {
            zone: self.zone,
            fqdn: self.fqdn,
            record_type,
            id: id_string(&self.record_id),
            value,
            rdata: self.rdata,
        })
    }
}

impl From<DsfRecordData> for DsfRecord {
    fn from(data: DsfRecordData) -> Self {
        let master_line = data.master_line.unwrap_or_default();
        let record = match data.rdata_class {
            Some(class) if !class.is_empty() => format!("{} {}", class, master_line),
            _ => master_line,
        };
        DsfRecord {
            label: data.label,
            record: record.trim().to_string(),
        }
    }
}

fn joined_messages(msgs: &[ApiMessage]) -> String {
    msgs.iter()
        .filter(|m| !m.info.is_empty())
        .map(|m| match &m.err_cd {
            Some(code) => format!("{} ({})", m.info, code),
            None => m.info.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Best-effort detail from an error body: the envelope messages if it is
/// one, otherwise the raw text
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<Envelope<Value>>(body) {
        Ok(envelope) if !envelope.msgs.is_empty() => joined_messages(&envelope.msgs),
        _ => body.trim().to_string(),
    }
}

fn build_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))
}

/// Turn a response into the envelope's `data`, mapping HTTP and API
/// failures to dynutil errors
async fn read_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
    what: &str,
) -> Result<Option<T>> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::http(format!("Failed to read response: {}", e)))?;

    if status == StatusCode::TEMPORARY_REDIRECT {
        let job = serde_json::from_str::<Envelope<Value>>(&body)
            .ok()
            .and_then(|e| e.job_id)
            .map(|id| id.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        return Err(Error::provider(
            PROVIDER,
            format!("{}: request still running as job {}", what, job),
        ));
    }

    if !status.is_success() {
        let detail = error_detail(&body);
        return match status.as_u16() {
            401 | 403 => Err(Error::auth(format!(
                "{}: session rejected ({}): {}",
                what, status, detail
            ))),
            404 => Err(Error::not_found(format!("{}: {}", what, detail))),
            429 => Err(Error::provider(
                PROVIDER,
                format!("Rate limit exceeded. Please retry later. Status: {}", status),
            )),
            500..=599 => Err(Error::provider(
                PROVIDER,
                format!("DynECT server error: {} - {}", status, detail),
            )),
            _ => Err(Error::provider(
                PROVIDER,
                format!("{} failed: {} - {}", what, status, detail),
            )),
        };
    }

    let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
        Error::provider(PROVIDER, format!("Failed to parse response to {}: {}", what, e))
    })?;

    if envelope.status != "success" {
        return Err(Error::provider(
            PROVIDER,
            format!("{} failed: {}", what, joined_messages(&envelope.msgs)),
        ));
    }

    Ok(envelope.data)
}

fn require_data<T>(data: Option<T>, what: &str) -> Result<T> {
    data.ok_or_else(|| {
        Error::provider(
            PROVIDER,
            format!("Invalid response format: {} returned no data", what),
        )
    })
}

/// Opens DynECT sessions
#[derive(Debug, Clone)]
pub struct DynectConnector {
    base_url: String,
    client: reqwest::Client,
}

impl DynectConnector {
    /// Connector for the public DynECT API
    pub fn new() -> Result<Self> {
        Self::with_base_url(DYNECT_API_BASE)
    }

    /// Connector for an alternative endpoint (staging, tests)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::invalid_input("DynECT API base URL cannot be empty"));
        }
        Ok(Self {
            base_url,
            client: build_client()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl SessionConnector for DynectConnector {
    /// ```http
    /// POST /REST/Session/
    /// {"customer_name": "...", "user_name": "...", "password": "..."}
    /// ```
    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn DnsSession>> {
        tracing::debug!(
            "Opening DynECT session for {}/{}",
            credentials.customer_name(),
            credentials.user_name()
        );

        let url = format!("{}/REST/Session/", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "customer_name": credentials.customer_name(),
                "user_name": credentials.user_name(),
                "password": credentials.password(),
            }))
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let session: Option<SessionData> = read_envelope(response, "create session")
            .await
            .map_err(|e| match e {
                Error::Provider { message, .. } if status.is_client_error() || status.is_success() => {
                    Error::auth(message)
                }
                Error::NotFound(message) => Error::auth(message),
                other => other,
            })?;
        let session = require_data(session, "create session")?;

        if session.token.is_empty() {
            return Err(Error::auth("DynECT returned an empty session token"));
        }

        tracing::debug!("DynECT session established");
        Ok(Box::new(DynectSession {
            base_url: self.base_url.clone(),
            token: session.token,
            client: self.client.clone(),
        }))
    }
}

/// An authenticated DynECT session
pub struct DynectSession {
    base_url: String,
    /// ⚠️ NEVER log this value
    token: String,
    client: reqwest::Client,
}

// Custom Debug implementation that hides the session token
impl std::fmt::Debug for DynectSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynectSession")
            .field("base_url", &self.base_url)
            .field("token", &"<REDACTED>")
            .finish()
    }
}

impl DynectSession {
    /// Session from an already-issued token
    pub fn from_token(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            client: build_client()?,
        })
    }

    /// Request whose response must carry `data`
    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        what: &str,
    ) -> Result<T> {
        let data = self.send(method, path, body, what).await?;
        require_data(data, what)
    }

    /// Request whose response data is not needed
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        what: &str,
    ) -> Result<()> {
        self.send::<Value>(method, path, body, what).await?;
        Ok(())
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        what: &str,
    ) -> Result<Option<T>> {
        let url = format!("{}/REST/{}", self.base_url, path);
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, &url)
            .header("Auth-Token", &self.token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        read_envelope(response, what).await
    }

    fn record_path(node: &Node, record_type: RecordType) -> String {
        format!(
            "{}/{}/{}/",
            record_resource(record_type),
            node.zone,
            node.fqdn
        )
    }

    fn record_id_path(record: &Record) -> String {
        format!(
            "{}/{}/{}/{}/",
            record_resource(record.record_type),
            record.zone,
            record.fqdn,
            record.id
        )
    }
}

#[async_trait]
impl DnsSession for DynectSession {
    async fn list_zones(&self) -> Result<Vec<Zone>> {
        let uris: Vec<String> = self
            .call(Method::GET, "Zone/", None, "list zones")
            .await?;
        Ok(uris
            .iter()
            .filter_map(|uri| zone_name_from_uri(uri))
            .map(Zone::new)
            .collect())
    }

    async fn get_zone(&self, name: &str) -> Result<Zone> {
        let data: ZoneData = self
            .call(
                Method::GET,
                &format!("Zone/{}/", name),
                None,
                &format!("get zone {}", name),
            )
            .await?;
        Ok(Zone::new(data.zone))
    }

    async fn get_records_by_type(
        &self,
        node: &Node,
        record_type: RecordType,
    ) -> Result<Vec<Record>> {
        let path = format!("{}?detail=Y", Self::record_path(node, record_type));
        let what = format!("get {} records at {}", record_type, node.fqdn);

        let records: Vec<RecordData> = match self.call(Method::GET, &path, None, &what).await {
            Ok(records) => records,
            Err(Error::NotFound(_)) => {
                tracing::debug!("No {} records at {}", record_type, node.fqdn);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        records
            .into_iter()
            .map(|r| r.into_record(record_type))
            .collect()
    }

    async fn get_all_records(&self, zone: &Zone) -> Result<BTreeMap<RecordType, Vec<Record>>> {
        let mut data: HashMap<String, Value> = self
            .call(
                Method::GET,
                &format!("AllRecord/{}/?detail=Y", zone.name),
                None,
                &format!("get all records in {}", zone.name),
            )
            .await?;

        let mut grouped = BTreeMap::new();
        for record_type in RecordType::ALL {
            let Some(raw) = data.remove(all_records_key(record_type)) else {
                continue;
            };
            let records: Vec<RecordData> = serde_json::from_value(raw)?;
            let records = records
                .into_iter()
                .map(|r| r.into_record(record_type))
                .collect::<Result<Vec<_>>>()?;
            if !records.is_empty() {
                grouped.insert(record_type, records);
            }
        }
        Ok(grouped)
    }

    async fn add_record(
        &self,
        node: &Node,
        record_type: RecordType,
        value: &str,
    ) -> Result<Record> {
        tracing::info!("Creating {} record {} -> {}", record_type, node.fqdn, value);
        let data: RecordData = self
            .call(
                Method::POST,
                &Self::record_path(node, record_type),
                Some(serde_json::json!({
                    "rdata": rdata_for(record_type, value),
                    "ttl": 0,
                })),
                &format!("create {} record at {}", record_type, node.fqdn),
            )
            .await?;
        data.into_record(record_type)
    }

    async fn update_record(&self, record: &Record, value: &str) -> Result<Record> {
        tracing::info!(
            "Updating {} record {} (id {}): {} -> {}",
            record.record_type,
            record.fqdn,
            record.id,
            record.value,
            value
        );
        let mut updated = record.clone();
        updated.set_value(value);
        let data: RecordData = self
            .call(
                Method::PUT,
                &Self::record_id_path(record),
                Some(serde_json::json!({ "rdata": updated.rdata })),
                &format!("update {} record at {}", record.record_type, record.fqdn),
            )
            .await?;
        data.into_record(record.record_type)
    }

    async fn delete_record(&self, record: &Record) -> Result<()> {
        tracing::info!(
            "Deleting {} record {} (id {})",
            record.record_type,
            record.fqdn,
            record.id
        );
        self.execute(
            Method::DELETE,
            &Self::record_id_path(record),
            None,
            &format!("delete {} record at {}", record.record_type, record.fqdn),
        )
        .await
    }

    async fn publish(&self, zone: &Zone) -> Result<()> {
        tracing::info!("Publishing zone {}", zone.name);
        self.execute(
            Method::PUT,
            &format!("Zone/{}/", zone.name),
            Some(serde_json::json!({ "publish": true })),
            &format!("publish zone {}", zone.name),
        )
        .await
    }

    async fn get_all_http_redirects(&self, zone: &Zone) -> Result<Vec<Redirect>> {
        let redirects: Vec<RedirectData> = self
            .call(
                Method::GET,
                &format!("HTTPRedirect/{}/?detail=Y", zone.name),
                None,
                &format!("get redirects in {}", zone.name),
            )
            .await?;
        Ok(redirects
            .into_iter()
            .map(|r| Redirect {
                fqdn: r.fqdn,
                url: r.url,
            })
            .collect())
    }

    async fn list_dsf_services(&self) -> Result<Vec<DsfService>> {
        let services: Vec<ServiceData> = self
            .call(Method::GET, "DSF/?detail=Y", None, "list traffic director services")
            .await?;
        Ok(services
            .into_iter()
            .map(|s| DsfService {
                id: id_string(&s.service_id),
                label: s.label,
                nodes: s.nodes.into_iter().map(|n| n.fqdn).collect(),
            })
            .collect())
    }

    async fn get_records_for_service(&self, service: &DsfService) -> Result<Vec<DsfRecord>> {
        let records: Vec<DsfRecordData> = self
            .call(
                Method::GET,
                &format!("DSFRecord/{}/?detail=Y", service.id),
                None,
                &format!("get records for traffic director service '{}'", service.label),
            )
            .await?;
        Ok(records.into_iter().map(DsfRecord::from).collect())
    }

    async fn close(&self) -> Result<()> {
        self.execute(Method::DELETE, "Session/", None, "end session")
            .await?;
        tracing::debug!("DynECT session closed");
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_name_from_uri() {
        assert_eq!(zone_name_from_uri("/REST/Zone/example.com/"), Some("example.com"));
        assert_eq!(zone_name_from_uri("/REST/Zone/example.org"), Some("example.org"));
        assert_eq!(zone_name_from_uri("/"), None);
    }

    #[test]
    fn test_record_resources() {
        assert_eq!(record_resource(RecordType::A), "ARecord");
        assert_eq!(record_resource(RecordType::Cname), "CNAMERecord");
        assert_eq!(record_resource(RecordType::Mx), "MXRecord");
        assert_eq!(all_records_key(RecordType::Mx), "mx_records");
    }

    #[test]
    fn test_record_paths() {
        let node = Node::resolve("example.com", "www");
        assert_eq!(
            DynectSession::record_path(&node, RecordType::A),
            "ARecord/example.com/www.example.com/"
        );

        let record = Record::new(
            "example.com",
            "example.com",
            RecordType::Mx,
            "42",
            "mail.example.com",
        );
        assert_eq!(
            DynectSession::record_id_path(&record),
            "MXRecord/example.com/example.com/42/"
        );
    }

    #[test]
    fn test_mx_rdata_carries_preference() {
        assert_eq!(
            rdata_for(RecordType::Mx, "mail.example.com"),
            serde_json::json!({ "exchange": "mail.example.com", "preference": 10 })
        );
        assert_eq!(
            rdata_for(RecordType::Cname, "example.net"),
            serde_json::json!({ "cname": "example.net" })
        );
    }

    #[test]
    fn test_record_data_conversion() {
        let data: RecordData = serde_json::from_value(serde_json::json!({
            "zone": "example.com",
            "ttl": 3600,
            "fqdn": "www.example.com",
            "record_type": "A",
            "rdata": { "address": "192.0.2.1" },
            "record_id": 123456
        }))
        .unwrap();

        let record = data.into_record(RecordType::A).unwrap();
        assert_eq!(record.id, "123456");
        assert_eq!(record.value, "192.0.2.1");
        assert_eq!(record.fqdn, "www.example.com");
    }

    #[test]
    fn test_record_data_missing_value_field() {
        let data: RecordData = serde_json::from_value(serde_json::json!({
            "zone": "example.com",
            "fqdn": "www.example.com",
            "rdata": { "cname": "example.net" },
            "record_id": "7"
        }))
        .unwrap();

        assert!(data.into_record(RecordType::A).is_err());
    }

    #[test]
    fn test_dsf_record_text() {
        let record = DsfRecord::from(DsfRecordData {
            label: "europe".into(),
            rdata_class: Some("A".into()),
            master_line: Some("192.0.2.10".into()),
        });
        assert_eq!(record.record, "A 192.0.2.10");

        let record = DsfRecord::from(DsfRecordData {
            label: "bare".into(),
            rdata_class: None,
            master_line: Some("192.0.2.11".into()),
        });
        assert_eq!(record.record, "192.0.2.11");
    }

    #[test]
    fn test_error_detail_uses_messages() {
        let body = r#"{"status":"failure","data":{},"job_id":1,"msgs":[
            {"INFO":"login: Credentials you entered did not match","SOURCE":"BLL","ERR_CD":"INVALID_DATA","LVL":"ERROR"}
        ]}"#;
        assert_eq!(
            error_detail(body),
            "login: Credentials you entered did not match (INVALID_DATA)"
        );
        assert_eq!(error_detail("gateway timeout\n"), "gateway timeout");
    }

    #[test]
    fn test_token_not_exposed_in_debug() {
        let session = DynectSession::from_token(DYNECT_API_BASE, "secret_token_12345").unwrap();
        let debug_str = format!("{:?}", session);
        assert!(!debug_str.contains("secret_token_12345"));
        assert!(debug_str.contains("DynectSession"));
    }

    #[test]
    fn test_base_url_normalized() {
        let connector = DynectConnector::with_base_url("http://localhost:8080/").unwrap();
        assert_eq!(connector.base_url(), "http://localhost:8080");
        assert!(DynectConnector::with_base_url("").is_err());
    }

    #[test]
    fn test_provider_name() {
        let session = DynectSession::from_token(DYNECT_API_BASE, "t").unwrap();
        assert_eq!(session.provider_name(), "dynect");
    }
}
