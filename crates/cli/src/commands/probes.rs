//! Connectivity and authentication diagnostics.
//!
//! These commands intentionally bypass [`flowctl_api::N8nClient`] and build
//! their own requests: the whole point is to observe how the instance
//! responds to paths and credential placements the client would never use.
//! Probes run strictly in sequence, with a fixed courtesy pause between
//! endpoint probes to avoid tripping rate limits.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde_json::Value;

use flowctl_api::N8nClient;
use flowctl_types::{ClientConfig, OperationResult};
use flowctl_util::redact_sensitive;

/// Candidate API roots probed by `diagnose`. n8n deployments have exposed
/// the REST surface under each of these at some point.
const DIAGNOSTIC_ENDPOINTS: &[&str] = &[
    "/health",
    "/api/v1/health",
    "/rest/health",
    "/webhook/test",
    "/api/v1/webhook/test",
    "/rest/webhook/test",
    "/workflows",
    "/api/v1/workflows",
    "/rest/workflows",
];

/// Courtesy pause between endpoint probes; not a correctness requirement.
const PROBE_DELAY: Duration = Duration::from_millis(500);

const LISTING_PATH: &str = "/api/v1/workflows";

/// `test`: liveness probe, then a listing summary.
pub async fn test(config: &ClientConfig) -> Result<ExitCode> {
    println!("Testing connection to n8n instance...");
    let client = N8nClient::new(config)?;

    match client.test_connection().await {
        OperationResult::Success(report) => {
            println!("Connection successful! (status {})", report.status);
        }
        OperationResult::Failure(failure) => {
            println!("Connection failed: {}", failure.error);
            if let Some(status) = failure.status {
                println!("Status: {status}");
            }
            return Ok(ExitCode::SUCCESS);
        }
    }

    println!("Testing workflow retrieval...");
    match client.get_workflows().await {
        OperationResult::Success(list) => {
            println!("Found {} existing workflow(s)", list.workflows.len());
            for workflow in &list.workflows {
                println!(
                    "  - {} (ID: {}, Active: {})",
                    workflow.get("name").and_then(Value::as_str).unwrap_or("unnamed"),
                    workflow.get("id").and_then(Value::as_str).unwrap_or("?"),
                    workflow.get("active").and_then(Value::as_bool).unwrap_or(false),
                );
            }
        }
        OperationResult::Failure(failure) => println!("Failed to retrieve workflows: {}", failure.error),
    }
    Ok(ExitCode::SUCCESS)
}

/// `diagnose`: probe each candidate endpoint and classify the response.
pub async fn diagnose(config: &ClientConfig) -> Result<ExitCode> {
    println!("Diagnosing n8n API endpoints...");
    println!("Base URL: {}", config.base_url);

    let http = probe_client(api_key_headers(config)?)?;
    let mut working_json_endpoints = Vec::new();

    for (index, endpoint) in DIAGNOSTIC_ENDPOINTS.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(PROBE_DELAY).await;
        }
        println!("\nTesting: {endpoint}");

        let url = format!("{}{}", config.base_url.trim_end_matches('/'), endpoint);
        let response = match http.get(&url).send().await {
            Ok(response) => response,
            Err(error) => {
                println!("Error: {error}");
                continue;
            }
        };

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();
        let body = response.text().await.unwrap_or_default();

        println!("Status: {status}");
        if content_type.contains("application/json") {
            println!("JSON response detected");
            println!("Response sample: {}", redact_sensitive(&preview(&body)));
            working_json_endpoints.push(*endpoint);
        } else if content_type.contains("text/html") {
            println!("HTML response detected (likely UI page)");
            println!("Response starts with: {}", preview(&body));
        } else {
            println!("Unknown content type: {content_type}");
        }
    }

    println!("\nSummary:");
    if working_json_endpoints.is_empty() {
        println!("No JSON endpoints found. The n8n REST API might be disabled or using different endpoints.");
        println!("Check n8n configuration for REST API settings.");
    } else {
        println!("Working JSON endpoints:");
        for endpoint in working_json_endpoints {
            println!("  - {endpoint}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// `auth-probe`: try the listing endpoint under each credential placement
/// the platform has accepted across versions, in a fixed order.
pub async fn auth_probe(config: &ClientConfig) -> Result<ExitCode> {
    println!("Testing authentication methods...");
    let base = config.base_url.trim_end_matches('/');
    let listing_url = format!("{base}{LISTING_PATH}");

    println!("\n1. Bearer token...");
    let mut bearer = json_headers();
    bearer.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", config.api_key)).context("API key is not a valid header value")?,
    );
    report_scheme("Bearer token", probe_client(bearer)?.get(&listing_url).send().await);

    println!("\n2. X-N8N-API-KEY header...");
    report_scheme(
        "X-N8N-API-KEY",
        probe_client(api_key_headers(config)?)?.get(&listing_url).send().await,
    );

    println!("\n3. Query parameter...");
    report_scheme(
        "Query parameter",
        probe_client(json_headers())?
            .get(&listing_url)
            .query(&[("api_key", config.api_key.as_str())])
            .send()
            .await,
    );

    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        println!("\n4. Basic auth + X-N8N-API-KEY...");
        report_scheme(
            "Basic auth + X-N8N-API-KEY",
            probe_client(api_key_headers(config)?)?
                .get(&listing_url)
                .basic_auth(username, Some(password))
                .send()
                .await,
        );
    }

    println!("\nFinal check: no authentication...");
    report_scheme("No auth", probe_client(HeaderMap::new())?.get(&listing_url).send().await);

    Ok(ExitCode::SUCCESS)
}

fn report_scheme(scheme: &str, outcome: reqwest::Result<reqwest::Response>) {
    match outcome {
        Ok(response) if response.status().is_success() => {
            println!("{} works: {}", scheme, response.status().as_u16());
        }
        Ok(response) => {
            println!("{} failed: {}", scheme, response.status().as_u16());
        }
        Err(error) => {
            println!("{} failed: {}", scheme, redact_sensitive(&error.to_string()));
        }
    }
}

fn probe_client(headers: HeaderMap) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(30))
        .build()
        .context("build probe client")
}

fn api_key_headers(config: &ClientConfig) -> Result<HeaderMap> {
    let mut headers = json_headers();
    headers.insert(
        "X-N8N-API-KEY",
        HeaderValue::from_str(&config.api_key).context("API key is not a valid header value")?,
    );
    Ok(headers)
}

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

/// First 200 characters with whitespace collapsed, for response samples.
fn preview(body: &str) -> String {
    let collapsed: String = body.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut preview: String = collapsed.chars().take(200).collect();
    if collapsed.chars().count() > 200 {
        preview.push_str("...");
    }
    preview
}
