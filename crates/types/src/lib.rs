//! Shared type definitions for the flowctl workspace.
//!
//! Everything the API client, template catalog, and CLI exchange lives here:
//! the connection configuration, the n8n workflow wire shapes, and the
//! uniform [`OperationResult`] envelope every client operation returns.

pub mod result;
pub mod workflow;

pub use result::{
    CreatedWorkflow, OperationFailure, OperationResult, ProbeReport, UpdatedWorkflow, WorkflowList,
};
pub use workflow::validation::{DefinitionError, validate_definition};
pub use workflow::{
    ConnectionTarget, NodeConnections, NodeSpec, WorkflowDefinition, WorkflowSettings,
};

use serde::{Deserialize, Serialize};

/// Connection settings for one n8n instance.
///
/// Loaded once from the config file at client construction and never mutated
/// in-process; the `config` subcommand rewrites the file for the next run.
/// Field names match the `n8n` section of the config document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Base URL of the instance, without the `/api/v1` suffix.
    pub base_url: String,
    /// API key sent as the `X-N8N-API-KEY` header.
    pub api_key: String,
    /// Username for instances fronted by basic auth.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Password paired with `username`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ClientConfig {
    /// Build a config carrying only a base URL and API key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            username: None,
            password: None,
        }
    }
}
