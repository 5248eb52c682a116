//! n8n API client.
//!
//! This crate provides a lightweight client for the workflow management
//! surface of a remote n8n instance. It focuses on:
//!
//! - Constructing an HTTP client with sensible defaults and the
//!   `X-N8N-API-KEY` authentication header
//! - Validating the configured base URL before any request is sent
//! - One method per remote operation, all resolved under the versioned
//!   `/api/v1` path prefix
//! - Normalizing every response, success or failure, into the uniform
//!   [`OperationResult`] envelope
//!
//! No operation lets a transport or remote error escape: network failures,
//! non-2xx statuses, and malformed bodies all become failure-shaped results
//! carrying the error message and, when available, the remote status code.
//! Callers branch on one success/failure distinction, never on response
//! topology.
//!
//! # Example
//!
//! ```ignore
//! use flowctl_api::N8nClient;
//! use flowctl_types::{ClientConfig, OperationResult};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let client = N8nClient::new(&ClientConfig::new("https://n8n.example.com", "key"))?;
//! match client.get_workflows().await {
//!     OperationResult::Success(list) => println!("{} workflows", list.workflows.len()),
//!     OperationResult::Failure(failure) => println!("listing failed: {failure}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod normalize;

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Method, RequestBuilder, header};
use serde_json::Value;
use url::Url;
use tracing::{debug, warn};

use flowctl_types::{
    ClientConfig, CreatedWorkflow, OperationFailure, OperationResult, ProbeReport, UpdatedWorkflow,
    WorkflowDefinition, WorkflowList,
};

pub use normalize::UNKNOWN_WORKFLOW_ID;

/// Versioned path prefix every operation resolves under.
const API_PREFIX: &str = "/api/v1";

/// Header carrying the API key.
const API_KEY_HEADER: &str = "X-N8N-API-KEY";

/// Hostnames for which plain `http` is expected during local development.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

/// Thin wrapper around a configured `reqwest::Client` for n8n API access.
///
/// The client pre-configures default headers and builds requests against a
/// validated base URL. The configuration is read once at construction and
/// never mutated for the client's lifetime.
#[derive(Debug, Clone)]
pub struct N8nClient {
    base_url: String,
    http: Client,
}

impl N8nClient {
    /// Construct a client from connection settings.
    ///
    /// Fails when the base URL does not parse, lacks a host, or uses a
    /// scheme other than `http`/`https`, or when the API key is not a valid
    /// header value. Plain `http` against a non-localhost host is allowed
    /// but logged, since self-hosted instances commonly sit on private
    /// networks.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = validate_base_url(&config.base_url)?;

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(
            API_KEY_HEADER,
            header::HeaderValue::from_str(&config.api_key).context("API key is not a valid header value")?,
        );
        default_headers.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(30))
            .build()
            .context("build http client")?;

        Ok(Self { base_url, http })
    }

    /// Build a `reqwest::RequestBuilder` for a method and API-relative path.
    ///
    /// The path is resolved under `{base_url}/api/v1` and carries the
    /// configured default headers.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}{}", self.base_url, API_PREFIX, path);
        debug!(%url, "building request");
        self.http.request(method, url)
    }

    /// Probe the instance by listing workflows, reporting the raw response.
    pub async fn test_connection(&self) -> OperationResult<ProbeReport> {
        match self.send(Method::GET, "/workflows", None).await {
            Ok((status, data)) => OperationResult::Success(ProbeReport { status, data }),
            Err(failure) => OperationResult::Failure(failure),
        }
    }

    /// Fetch all workflows, extracted from the listing envelope.
    pub async fn get_workflows(&self) -> OperationResult<WorkflowList> {
        match self.send(Method::GET, "/workflows", None).await {
            Ok((_, payload)) => OperationResult::Success(WorkflowList {
                workflows: normalize::extract_workflow_list(&payload),
            }),
            Err(failure) => OperationResult::Failure(failure),
        }
    }

    /// Fetch a single workflow by id, returned as received.
    pub async fn get_workflow(&self, workflow_id: &str) -> OperationResult<Value> {
        match self.send(Method::GET, &format!("/workflows/{workflow_id}"), None).await {
            Ok((_, payload)) => OperationResult::Success(payload),
            Err(failure) => OperationResult::Failure(failure),
        }
    }

    /// Create a workflow from a definition.
    ///
    /// The id is extracted best-effort from the response (`data.id`, then
    /// `id`); when neither is present the literal sentinel `"unknown"` is
    /// reported and creation still counts as a success. Downstream tooling
    /// depends on this operation never failing over a missing id.
    pub async fn create_workflow(&self, definition: &WorkflowDefinition) -> OperationResult<CreatedWorkflow> {
        let body = match serde_json::to_value(definition) {
            Ok(body) => body,
            Err(error) => return OperationResult::error(format!("unserializable definition: {error}")),
        };
        match self.send(Method::POST, "/workflows", Some(body)).await {
            Ok((_, payload)) => {
                let id = normalize::workflow_id_or_unknown(&payload);
                OperationResult::Success(CreatedWorkflow {
                    workflow: normalize::unwrap_data_envelope(payload),
                    id,
                })
            }
            Err(failure) => OperationResult::Failure(failure),
        }
    }

    /// Apply a partial definition to an existing workflow.
    pub async fn update_workflow(&self, workflow_id: &str, patch: Value) -> OperationResult<UpdatedWorkflow> {
        match self
            .send(Method::PATCH, &format!("/workflows/{workflow_id}"), Some(patch))
            .await
        {
            Ok((_, payload)) => OperationResult::Success(UpdatedWorkflow {
                workflow: normalize::unwrap_data_envelope(payload),
            }),
            Err(failure) => OperationResult::Failure(failure),
        }
    }

    /// Switch a workflow to active on the remote instance.
    pub async fn activate_workflow(&self, workflow_id: &str) -> OperationResult<Value> {
        match self
            .send(Method::POST, &format!("/workflows/{workflow_id}/activate"), None)
            .await
        {
            Ok((_, payload)) => OperationResult::Success(payload),
            Err(failure) => OperationResult::Failure(failure),
        }
    }

    /// Switch a workflow to inactive on the remote instance.
    pub async fn deactivate_workflow(&self, workflow_id: &str) -> OperationResult<Value> {
        match self
            .send(Method::POST, &format!("/workflows/{workflow_id}/deactivate"), None)
            .await
        {
            Ok((_, payload)) => OperationResult::Success(payload),
            Err(failure) => OperationResult::Failure(failure),
        }
    }

    /// Delete a workflow definition from the remote instance.
    pub async fn delete_workflow(&self, workflow_id: &str) -> OperationResult<Value> {
        match self.send(Method::DELETE, &format!("/workflows/{workflow_id}"), None).await {
            Ok((_, payload)) => OperationResult::Success(payload),
            Err(failure) => OperationResult::Failure(failure),
        }
    }

    /// Scoped try/convert block shared by every operation: send the request
    /// and turn any transport or remote failure into [`OperationFailure`]
    /// data. Success bodies are parsed leniently; unparseable or empty
    /// bodies degrade to `Value::Null` rather than failing the operation.
    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<(u16, Value), OperationFailure> {
        let mut builder = self.request(method.clone(), path);
        if let Some(ref body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|error| {
            warn!(%method, path, error = %error, "transport failure");
            OperationFailure {
                error: error.to_string(),
                status: None,
            }
        })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            let detail = if text.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                text.trim().to_string()
            };
            warn!(%method, path, status = status.as_u16(), "remote failure");
            return Err(OperationFailure {
                error: format!("HTTP {}: {}", status.as_u16(), detail),
                status: Some(status.as_u16()),
            });
        }

        let payload = serde_json::from_str(&text).unwrap_or(Value::Null);
        debug!(%method, path, status = status.as_u16(), "request completed");
        Ok((status.as_u16(), payload))
    }
}

/// Validate and normalize a base URL.
///
/// Rules:
/// - must parse and include a host
/// - scheme must be `http` or `https`
/// - a trailing slash is stripped so path concatenation stays predictable
fn validate_base_url(base: &str) -> Result<String> {
    let parsed = Url::parse(base).map_err(|error| anyhow!("invalid base URL '{}': {}", base, error))?;

    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("base URL '{}' must include a host", base))?;

    match parsed.scheme() {
        "https" => {}
        "http" => {
            if !LOCALHOST_DOMAINS.iter().any(|&local| host.eq_ignore_ascii_case(local)) {
                warn!(%host, "using plain http against a non-localhost instance");
            }
        }
        other => {
            return Err(anyhow!("base URL scheme must be http or https; got '{}://'", other));
        }
    }

    Ok(base.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowctl_types::ClientConfig;
    use serde_json::json;
    use std::net::SocketAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve exactly one request with a canned response, returning the
    /// request head (method + path line) for assertions.
    async fn one_shot_server(status: &'static str, body: String) -> (SocketAddr, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind one-shot server");
        let addr = listener.local_addr().expect("server addr");

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.expect("accept connection");

            let mut raw = Vec::new();
            let mut chunk = [0u8; 1024];
            let header_end = loop {
                let read = stream.read(&mut chunk).await.expect("read request");
                raw.extend_from_slice(&chunk[..read]);
                if let Some(position) = raw.windows(4).position(|window| window == b"\r\n\r\n") {
                    break position + 4;
                }
                assert!(read > 0, "connection closed before headers completed");
            };

            let head = String::from_utf8_lossy(&raw[..header_end]).to_string();
            let content_length = head
                .lines()
                .find_map(|line| line.to_ascii_lowercase().strip_prefix("content-length:").map(str::trim).map(String::from))
                .and_then(|length| length.parse::<usize>().ok())
                .unwrap_or(0);
            while raw.len() < header_end + content_length {
                let read = stream.read(&mut chunk).await.expect("read body");
                assert!(read > 0, "connection closed before body completed");
                raw.extend_from_slice(&chunk[..read]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.expect("write response");
            stream.shutdown().await.ok();

            head.lines().next().unwrap_or_default().to_string()
        });

        (addr, handle)
    }

    fn client_for(addr: SocketAddr) -> N8nClient {
        let config = ClientConfig::new(format!("http://{addr}"), "test-key");
        N8nClient::new(&config).expect("build client")
    }

    #[tokio::test]
    async fn create_extracts_id_from_the_data_envelope() {
        let (addr, server) = one_shot_server("200 OK", json!({ "data": { "id": "abc" } }).to_string()).await;

        let result = client_for(addr).create_workflow(&sample_definition()).await;
        let created = result.into_success().expect("create succeeds");
        assert_eq!(created.id, "abc");
        assert_eq!(created.workflow, json!({ "id": "abc" }));

        let request_line = server.await.expect("server task");
        assert_eq!(request_line, "POST /api/v1/workflows HTTP/1.1");
    }

    #[tokio::test]
    async fn create_accepts_a_bare_top_level_id() {
        let (addr, _server) = one_shot_server("200 OK", json!({ "id": "xyz" }).to_string()).await;

        let result = client_for(addr).create_workflow(&sample_definition()).await;
        assert_eq!(result.into_success().expect("create succeeds").id, "xyz");
    }

    #[tokio::test]
    async fn create_reports_the_unknown_sentinel_without_failing() {
        let (addr, _server) = one_shot_server("200 OK", json!({ "name": "no id" }).to_string()).await;

        let result = client_for(addr).create_workflow(&sample_definition()).await;
        assert_eq!(result.into_success().expect("create succeeds").id, UNKNOWN_WORKFLOW_ID);
    }

    #[tokio::test]
    async fn create_preserves_the_remote_status_code() {
        let (addr, server) = one_shot_server("400 Bad Request", json!({ "message": "request body missing required fields" }).to_string()).await;

        let result = client_for(addr).create_workflow(&sample_definition()).await;
        let failure = result.failure().expect("create fails").clone();
        assert_eq!(failure.status, Some(400));
        assert!(failure.error.contains("400"), "message carries the status: {}", failure.error);

        let request_line = server.await.expect("server task");
        assert_eq!(request_line, "POST /api/v1/workflows HTTP/1.1");
    }

    #[tokio::test]
    async fn delete_preserves_the_remote_status_code() {
        let (addr, server) = one_shot_server("404 Not Found", json!({ "message": "not found" }).to_string()).await;

        let result = client_for(addr).delete_workflow("missing").await;
        let failure = result.failure().expect("delete fails").clone();
        assert_eq!(failure.status, Some(404));
        assert!(failure.error.contains("404"), "message carries the status: {}", failure.error);

        let request_line = server.await.expect("server task");
        assert_eq!(request_line, "DELETE /api/v1/workflows/missing HTTP/1.1");
    }

    #[tokio::test]
    async fn transport_failures_become_failure_results() {
        // Bind then drop so the port is known to refuse connections.
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let client = client_for(addr);
        let result = client.test_connection().await;
        let failure = result.failure().expect("probe fails");
        assert_eq!(failure.status, None);
        assert!(!failure.error.is_empty());
    }

    #[tokio::test]
    async fn listing_extracts_the_nested_data_collection() {
        let body = json!({ "data": [{ "id": "a", "name": "First" }], "nextCursor": null }).to_string();
        let (addr, server) = one_shot_server("200 OK", body).await;

        let result = client_for(addr).get_workflows().await;
        let list = result.into_success().expect("listing succeeds");
        assert_eq!(list.workflows.len(), 1);
        assert_eq!(list.workflows[0]["name"], json!("First"));

        let request_line = server.await.expect("server task");
        assert_eq!(request_line, "GET /api/v1/workflows HTTP/1.1");
    }

    #[tokio::test]
    async fn activation_hits_the_activate_endpoint() {
        let (addr, server) = one_shot_server("200 OK", json!({ "active": true }).to_string()).await;

        let result = client_for(addr).activate_workflow("abc").await;
        assert!(result.success());

        let request_line = server.await.expect("server task");
        assert_eq!(request_line, "POST /api/v1/workflows/abc/activate HTTP/1.1");
    }

    #[tokio::test]
    async fn deactivation_hits_the_deactivate_endpoint() {
        let (addr, server) = one_shot_server("200 OK", json!({ "active": false }).to_string()).await;

        let result = client_for(addr).deactivate_workflow("abc").await;
        assert!(result.success());

        let request_line = server.await.expect("server task");
        assert_eq!(request_line, "POST /api/v1/workflows/abc/deactivate HTTP/1.1");
    }

    #[tokio::test]
    async fn update_unwraps_the_data_envelope() {
        let body = json!({ "data": { "id": "abc", "name": "Renamed" } }).to_string();
        let (addr, server) = one_shot_server("200 OK", body).await;

        let result = client_for(addr)
            .update_workflow("abc", json!({ "name": "Renamed" }))
            .await;
        let updated = result.into_success().expect("update succeeds");
        assert_eq!(updated.workflow["name"], json!("Renamed"));

        let request_line = server.await.expect("server task");
        assert_eq!(request_line, "PATCH /api/v1/workflows/abc HTTP/1.1");
    }

    #[test]
    fn base_url_validation_rules() {
        assert_eq!(validate_base_url("https://n8n.example.com/").expect("valid"), "https://n8n.example.com");
        assert!(validate_base_url("http://localhost:5678").is_ok());
        assert!(validate_base_url("ftp://example.com").is_err());
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    fn rejects_api_keys_that_cannot_be_headers() {
        let config = ClientConfig::new("https://n8n.example.com", "bad\nkey");
        assert!(N8nClient::new(&config).is_err());
    }

    fn sample_definition() -> WorkflowDefinition {
        WorkflowDefinition {
            name: "Test".to_string(),
            nodes: Vec::new(),
            connections: Default::default(),
            settings: Default::default(),
        }
    }
}
