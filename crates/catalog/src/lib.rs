//! Embedded workflow template catalog.
//!
//! Ready-made [`WorkflowDefinition`]s for the common automation patterns —
//! webhook-triggered processing, scheduled HTTP fetch, scheduled email
//! notification — plus a builder for ad-hoc custom definitions. Templates
//! are JSON documents compiled into the binary and parsed once at first
//! access; the catalog is read-only afterwards.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use thiserror::Error;

use flowctl_types::{NodeConnections, NodeSpec, WorkflowDefinition, WorkflowSettings};

/// Template keys in catalog order, matching the embedded documents below.
const TEMPLATE_SOURCES: &[(&str, &str)] = &[
    ("webhookTrigger", include_str!("../templates/webhook_trigger.json")),
    ("scheduledFetch", include_str!("../templates/scheduled_fetch.json")),
    ("emailNotification", include_str!("../templates/email_notification.json")),
];

static TEMPLATES: Lazy<IndexMap<&'static str, WorkflowDefinition>> = Lazy::new(|| {
    TEMPLATE_SOURCES
        .iter()
        .map(|(key, source)| {
            let definition = serde_json::from_str(source)
                .unwrap_or_else(|error| panic!("embedded template '{key}' is malformed: {error}"));
            (*key, definition)
        })
        .collect()
});

/// Error surfaced when a catalog lookup fails.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Unknown template key. The message enumerates the valid keys since
    /// callers use it for discovery.
    #[error("template '{key}' not found. Available templates: {available}")]
    TemplateNotFound { key: String, available: String },
}

/// Look up a template by key.
pub fn template(key: &str) -> Result<&'static WorkflowDefinition, CatalogError> {
    TEMPLATES.get(key).ok_or_else(|| CatalogError::TemplateNotFound {
        key: key.to_string(),
        available: template_keys().collect::<Vec<_>>().join(", "),
    })
}

/// All template keys in catalog order.
pub fn template_keys() -> impl Iterator<Item = &'static str> {
    TEMPLATES.keys().copied()
}

/// All templates in catalog order, keyed for display.
pub fn templates() -> impl Iterator<Item = (&'static str, &'static WorkflowDefinition)> {
    TEMPLATES.iter().map(|(key, definition)| (*key, definition))
}

/// Build a custom workflow definition.
///
/// `settings_overrides` is shallow-merged over the default settings
/// baseline; later keys win, and unknown keys are carried through to the
/// remote instance unchanged.
pub fn build_workflow(
    name: impl Into<String>,
    nodes: Vec<NodeSpec>,
    connections: IndexMap<String, NodeConnections>,
    settings_overrides: Map<String, Value>,
) -> WorkflowDefinition {
    let mut settings = WorkflowSettings::default();
    settings.apply_overrides(settings_overrides);
    WorkflowDefinition {
        name: name.into(),
        nodes,
        connections,
        settings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowctl_types::validate_definition;
    use serde_json::json;

    #[test]
    fn every_template_parses_and_validates() {
        for (key, definition) in templates() {
            assert!(!definition.nodes.is_empty(), "template '{key}' has no nodes");
            validate_definition(definition).unwrap_or_else(|error| panic!("template '{key}' is invalid: {error}"));
        }
    }

    #[test]
    fn catalog_order_is_stable() {
        let keys: Vec<_> = template_keys().collect();
        assert_eq!(keys, vec!["webhookTrigger", "scheduledFetch", "emailNotification"]);
    }

    #[test]
    fn known_template_resolves_with_expected_name() {
        let definition = template("webhookTrigger").expect("known key");
        assert_eq!(definition.name, "Webhook Data Processor");
        assert_eq!(definition.nodes.len(), 3);
        assert!(definition.connections.contains_key("Webhook"));
    }

    #[test]
    fn unknown_template_error_enumerates_keys() {
        let error = template("doesNotExist").expect_err("unknown key must fail");
        let message = error.to_string();
        assert!(message.contains("doesNotExist"));
        for key in template_keys() {
            assert!(message.contains(key), "message must list '{key}': {message}");
        }
    }

    #[test]
    fn build_workflow_merges_overrides_over_defaults() {
        let overrides = Map::from_iter([("timezone".to_string(), json!("UTC"))]);
        let definition = build_workflow("X", Vec::new(), IndexMap::new(), overrides);

        assert_eq!(definition.name, "X");
        assert_eq!(definition.settings.timezone, "UTC");
        let defaults = WorkflowSettings::default();
        assert_eq!(definition.settings.save_execution_progress, defaults.save_execution_progress);
        assert_eq!(definition.settings.save_manual_executions, defaults.save_manual_executions);
        assert_eq!(definition.settings.save_data_error_execution, defaults.save_data_error_execution);
        assert_eq!(
            definition.settings.save_data_success_execution,
            defaults.save_data_success_execution
        );
        assert_eq!(definition.settings.execution_timeout, defaults.execution_timeout);
    }

    #[test]
    fn build_workflow_keeps_unknown_settings_keys() {
        let overrides = Map::from_iter([
            ("executionTimeout".to_string(), json!(120)),
            ("callerPolicy".to_string(), json!("any")),
        ]);
        let definition = build_workflow("X", Vec::new(), IndexMap::new(), overrides);

        assert_eq!(definition.settings.execution_timeout, 120);
        assert_eq!(definition.settings.extra.get("callerPolicy"), Some(&json!("any")));
    }

    #[test]
    fn no_overrides_yields_the_default_baseline() {
        let definition = build_workflow("X", Vec::new(), IndexMap::new(), Map::new());
        assert_eq!(definition.settings, WorkflowSettings::default());
    }
}
