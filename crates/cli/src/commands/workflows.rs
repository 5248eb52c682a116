//! Workflow management subcommands: listing, template deployment, deletion,
//! and the single-workflow detail view.

use std::process::ExitCode;

use anyhow::Result;
use serde_json::Value;

use flowctl_api::N8nClient;
use flowctl_types::{ClientConfig, OperationFailure, OperationResult, validate_definition};

/// `list`: fetch and print every workflow on the instance.
pub async fn list(config: &ClientConfig) -> Result<ExitCode> {
    let client = N8nClient::new(config)?;
    println!("Fetching workflows from n8n instance...\n");

    match client.get_workflows().await {
        OperationResult::Success(list) => {
            if list.workflows.is_empty() {
                println!("No workflows found in the n8n instance.");
                return Ok(ExitCode::SUCCESS);
            }

            println!("Found {} workflow(s):\n", list.workflows.len());
            for (index, workflow) in list.workflows.iter().enumerate() {
                println!("{}. {}", index + 1, field(workflow, "name"));
                println!("   ID: {}", field(workflow, "id"));
                println!("   Active: {}", active_marker(workflow));
                println!("   Created: {}", field(workflow, "createdAt"));
                println!("   Updated: {}", field(workflow, "updatedAt"));
                println!("   Trigger Count: {}", field(workflow, "triggerCount"));
                println!();
            }
        }
        OperationResult::Failure(failure) => print_failure("Failed to fetch workflows", &failure),
    }
    Ok(ExitCode::SUCCESS)
}

/// `templates`: enumerate the catalog.
pub fn templates() -> Result<ExitCode> {
    println!("Available workflow templates:");
    for (key, definition) in flowctl_catalog::templates() {
        println!("  {} - {}", key, definition.name);
    }
    Ok(ExitCode::SUCCESS)
}

/// `deploy`: resolve a template, validate it, create it remotely, then
/// best-effort activate. Activation failure downgrades the status line but
/// not the exit code.
pub async fn deploy(config: &ClientConfig, template_key: &str, custom_name: Option<&str>) -> Result<ExitCode> {
    let template = match flowctl_catalog::template(template_key) {
        Ok(template) => template,
        Err(error) => {
            println!("{error}");
            return Ok(ExitCode::SUCCESS);
        }
    };

    let definition = match custom_name {
        Some(name) => template.renamed(name),
        None => template.clone(),
    };
    if let Err(error) = validate_definition(&definition) {
        println!("Template '{template_key}' failed validation: {error}");
        return Ok(ExitCode::SUCCESS);
    }

    println!("Deploying workflow: {}", definition.name);
    let client = N8nClient::new(config)?;

    match client.create_workflow(&definition).await {
        OperationResult::Success(created) => {
            println!("Workflow created successfully!");
            println!("   ID: {}", created.id);
            println!("   Name: {}", definition.name);

            let activation = client.activate_workflow(&created.id).await;
            if activation.success() {
                println!("   Status: Activated");
            } else {
                println!("   Status: Created (not activated)");
            }
        }
        OperationResult::Failure(failure) => print_failure("Failed to create workflow", &failure),
    }
    Ok(ExitCode::SUCCESS)
}

/// `delete`: remove a workflow by id.
pub async fn delete(config: &ClientConfig, workflow_id: &str) -> Result<ExitCode> {
    let client = N8nClient::new(config)?;
    println!("Attempting to delete workflow: {workflow_id}");

    match client.delete_workflow(workflow_id).await {
        OperationResult::Success(_) => println!("Workflow {workflow_id} deleted successfully!"),
        OperationResult::Failure(failure) => print_failure("Failed to delete workflow", &failure),
    }
    Ok(ExitCode::SUCCESS)
}

/// `show`: structured detail view of one workflow. Unlike the other
/// commands, a failed fetch exits nonzero.
pub async fn show(config: &ClientConfig, workflow_id: &str) -> Result<ExitCode> {
    let client = N8nClient::new(config)?;
    println!("Fetching details for workflow ID: {workflow_id}...");

    let workflow = match client.get_workflow(workflow_id).await {
        OperationResult::Success(workflow) => workflow,
        OperationResult::Failure(failure) => {
            print_failure("Error fetching workflow details", &failure);
            return Ok(ExitCode::FAILURE);
        }
    };

    println!("\nWORKFLOW DETAILS");
    println!("================");
    println!("Name: {}", field(&workflow, "name"));
    println!("ID: {}", field(&workflow, "id"));
    println!("Active: {}", active_marker(&workflow));
    println!("Created: {}", field(&workflow, "createdAt"));
    println!("Updated: {}", field(&workflow, "updatedAt"));
    println!("Trigger Count: {}", field(&workflow, "triggerCount"));

    let nodes = node_values(&workflow);
    println!("\nTRIGGER NODE");
    println!("============");
    match nodes.iter().find(|node| is_trigger(node)) {
        Some(trigger) => {
            println!("Type: {}", field(trigger, "type"));
            println!("Name: {}", field(trigger, "name"));
        }
        None => println!("No trigger node found"),
    }

    println!("\nWORKFLOW NODES");
    println!("==============");
    for (index, node) in nodes.iter().enumerate() {
        println!("{}. {} ({})", index + 1, field(node, "name"), field(node, "type"));
        let summary = parameter_summary(node);
        if !summary.is_empty() {
            println!("   Parameters: {summary}");
        }
    }

    println!("\nCONNECTIONS");
    println!("===========");
    if let Some(Value::Object(connections)) = workflow.get("connections") {
        for (source, channels) in connections {
            let Some(channels) = channels.as_object() else { continue };
            for (channel, slots) in channels {
                let Some(slots) = slots.as_array() else { continue };
                for (slot, targets) in slots.iter().enumerate() {
                    for target in targets.as_array().into_iter().flatten() {
                        println!("{} -> {} ({} output {})", source, field(target, "node"), channel, slot);
                    }
                }
            }
        }
    }

    if let Some(tags) = workflow.get("tags").and_then(Value::as_array)
        && !tags.is_empty()
    {
        let names: Vec<String> = tags.iter().map(|tag| field(tag, "name")).collect();
        println!("\nTags: {}", names.join(", "));
    }

    Ok(ExitCode::SUCCESS)
}

fn print_failure(context: &str, failure: &OperationFailure) {
    println!("{context}:");
    println!("   Error: {}", failure.error);
    if let Some(status) = failure.status {
        println!("   Status: {status}");
    }
}

/// String rendering of a field, `undefined` when absent (matching the
/// detail output users of the original tooling grep for).
fn field(value: &Value, key: &str) -> String {
    match value.get(key) {
        None | Some(Value::Null) => "undefined".to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn active_marker(workflow: &Value) -> &'static str {
    if workflow.get("active").and_then(Value::as_bool).unwrap_or(false) {
        "yes"
    } else {
        "no"
    }
}

/// Nodes arrive as an array on current instances; older ones keyed them by
/// name. Accept both.
fn node_values(workflow: &Value) -> Vec<&Value> {
    match workflow.get("nodes") {
        Some(Value::Array(nodes)) => nodes.iter().collect(),
        Some(Value::Object(nodes)) => nodes.values().collect(),
        _ => Vec::new(),
    }
}

fn is_trigger(node: &Value) -> bool {
    node.get("type")
        .and_then(Value::as_str)
        .is_some_and(|node_type| {
            ["Trigger", "Webhook", "Cron", "Schedule"]
                .iter()
                .any(|marker| node_type.contains(marker))
        })
}

/// Up to three scalar parameters, rendered `key: value`.
fn parameter_summary(node: &Value) -> String {
    let Some(parameters) = node.get("parameters").and_then(Value::as_object) else {
        return String::new();
    };
    parameters
        .iter()
        .filter(|(_, value)| !matches!(value, Value::Array(_) | Value::Object(_) | Value::Null))
        .take(3)
        .map(|(key, value)| match value {
            Value::String(text) => format!("{key}: {text}"),
            other => format!("{key}: {other}"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
