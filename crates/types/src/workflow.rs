//! Typed n8n workflow wire shapes shared across the catalog, client, and CLI.
//!
//! The models here serialize to exactly the JSON the n8n REST API accepts:
//! camelCase field names, connections keyed by source node name, and one
//! nested sequence per output slot. `IndexMap` preserves authoring order so
//! deployed definitions render in the n8n editor the way templates declare
//! them.

pub mod validation;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A complete workflow definition as submitted to `POST /workflows`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowDefinition {
    /// Display name shown in the n8n editor.
    pub name: String,
    /// Ordered node list; names must be unique within the definition.
    pub nodes: Vec<NodeSpec>,
    /// Directed edges keyed by source node name.
    #[serde(default)]
    pub connections: IndexMap<String, NodeConnections>,
    /// Execution configuration applied by the remote instance.
    #[serde(default)]
    pub settings: WorkflowSettings,
}

impl WorkflowDefinition {
    /// Clone of this definition under a different display name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }
}

/// One step in a workflow: a trigger, HTTP call, code block, email send, etc.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    /// Arbitrary node configuration; keys depend on the node type.
    #[serde(default)]
    pub parameters: Map<String, Value>,
    /// Unique name within the definition, referenced by connections.
    pub name: String,
    /// Node behavior identifier, e.g. `n8n-nodes-base.webhook`.
    pub r#type: String,
    /// Schema version of the node type.
    pub type_version: u32,
    /// Editor canvas position.
    pub position: [i64; 2],
    /// Stable webhook path identifier, set only on webhook trigger nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_id: Option<String>,
}

/// Outgoing edges of one node, keyed by channel kind (typically `"main"`).
///
/// The outer sequence index is the source output slot; each slot fans out to
/// zero or more targets.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NodeConnections(pub IndexMap<String, Vec<Vec<ConnectionTarget>>>);

impl NodeConnections {
    /// Edges on the default `main` channel from a single output slot.
    pub fn main(targets: Vec<ConnectionTarget>) -> Self {
        Self(IndexMap::from([("main".to_string(), vec![targets])]))
    }

    /// Iterate every target across all channels and output slots.
    pub fn targets(&self) -> impl Iterator<Item = &ConnectionTarget> {
        self.0.values().flatten().flatten()
    }
}

/// A directed edge endpoint: which node, which channel, which input slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionTarget {
    /// Target node name; must reference an existing [`NodeSpec`].
    pub node: String,
    /// Channel kind on the target, typically `"main"`.
    pub r#type: String,
    /// Input slot on the target node.
    pub index: u32,
}

impl ConnectionTarget {
    /// Edge into input slot 0 of `node` on the `main` channel.
    pub fn main(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            r#type: "main".to_string(),
            index: 0,
        }
    }
}

/// Execution configuration for a workflow.
///
/// Unknown settings keys are carried through the flattened `extra` map so
/// definitions survive round-trips against newer n8n versions unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSettings {
    pub save_execution_progress: bool,
    pub save_manual_executions: bool,
    pub save_data_error_execution: String,
    pub save_data_success_execution: String,
    /// Per-execution timeout in seconds.
    pub execution_timeout: u64,
    pub timezone: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkflowSettings {
    /// Shallow-merge raw settings keys over this baseline; later keys win.
    ///
    /// Known keys overwrite their typed fields when the JSON type matches;
    /// everything else lands in the flattened `extra` map unchanged.
    pub fn apply_overrides(&mut self, overrides: Map<String, Value>) {
        for (key, value) in overrides {
            match (key.as_str(), &value) {
                ("saveExecutionProgress", Value::Bool(flag)) => self.save_execution_progress = *flag,
                ("saveManualExecutions", Value::Bool(flag)) => self.save_manual_executions = *flag,
                ("saveDataErrorExecution", Value::String(mode)) => {
                    self.save_data_error_execution = mode.clone();
                }
                ("saveDataSuccessExecution", Value::String(mode)) => {
                    self.save_data_success_execution = mode.clone();
                }
                // Claims the key even when malformed, so a non-numeric
                // override cannot shadow the typed field via `extra`.
                ("executionTimeout", _) => {
                    if let Some(seconds) = value.as_u64() {
                        self.execution_timeout = seconds;
                    }
                }
                ("timezone", Value::String(zone)) => self.timezone = zone.clone(),
                _ => {
                    self.extra.insert(key, value);
                }
            }
        }
    }
}

impl Default for WorkflowSettings {
    /// Baseline applied to every template and custom build: progress and
    /// manual executions saved, error/success execution data retained, a
    /// one-hour timeout, and a fixed timezone.
    fn default() -> Self {
        Self {
            save_execution_progress: true,
            save_manual_executions: true,
            save_data_error_execution: "all".to_string(),
            save_data_success_execution: "all".to_string(),
            execution_timeout: 3600,
            timezone: "America/New_York".to_string(),
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(name: &str) -> NodeSpec {
        NodeSpec {
            parameters: Map::new(),
            name: name.to_string(),
            r#type: "n8n-nodes-base.code".to_string(),
            type_version: 1,
            position: [250, 300],
            webhook_id: None,
        }
    }

    #[test]
    fn node_spec_serializes_camel_case_and_omits_absent_webhook_id() {
        let value = serde_json::to_value(node("Process Data")).expect("serialize node");

        assert_eq!(value["typeVersion"], json!(1));
        assert_eq!(value["position"], json!([250, 300]));
        assert!(value.get("webhookId").is_none(), "absent webhookId must not serialize");
    }

    #[test]
    fn connections_serialize_as_channel_keyed_slot_sequences() {
        let mut definition = WorkflowDefinition {
            name: "X".to_string(),
            nodes: vec![node("A"), node("B")],
            connections: IndexMap::new(),
            settings: WorkflowSettings::default(),
        };
        definition
            .connections
            .insert("A".to_string(), NodeConnections::main(vec![ConnectionTarget::main("B")]));

        let value = serde_json::to_value(&definition).expect("serialize definition");
        assert_eq!(
            value["connections"]["A"]["main"],
            json!([[{ "node": "B", "type": "main", "index": 0 }]])
        );
    }

    #[test]
    fn settings_round_trip_preserves_unknown_keys() {
        let document = json!({
            "saveExecutionProgress": true,
            "saveManualExecutions": true,
            "saveDataErrorExecution": "all",
            "saveDataSuccessExecution": "all",
            "executionTimeout": 3600,
            "timezone": "UTC",
            "callerPolicy": "workflowsFromSameOwner"
        });

        let settings: WorkflowSettings = serde_json::from_value(document.clone()).expect("deserialize settings");
        assert_eq!(settings.timezone, "UTC");
        assert_eq!(settings.extra.get("callerPolicy"), Some(&json!("workflowsFromSameOwner")));
        assert_eq!(serde_json::to_value(&settings).expect("serialize settings"), document);
    }

    #[test]
    fn malformed_execution_timeout_override_is_dropped_without_duplicating_the_key() {
        let mut settings = WorkflowSettings::default();
        let mut overrides = Map::new();
        overrides.insert("executionTimeout".to_string(), json!("later"));
        overrides.insert("timezone".to_string(), json!("UTC"));

        settings.apply_overrides(overrides);

        assert_eq!(settings.execution_timeout, 3600);
        assert_eq!(settings.timezone, "UTC");
        assert!(settings.extra.get("executionTimeout").is_none(), "typed key must not shadow into extra");
    }

    #[test]
    fn renamed_keeps_everything_but_the_name() {
        let definition = WorkflowDefinition {
            name: "Original".to_string(),
            nodes: vec![node("A")],
            connections: IndexMap::new(),
            settings: WorkflowSettings::default(),
        };

        let renamed = definition.renamed("Custom");
        assert_eq!(renamed.name, "Custom");
        assert_eq!(renamed.nodes, definition.nodes);
        assert_eq!(renamed.settings, definition.settings);
    }
}
