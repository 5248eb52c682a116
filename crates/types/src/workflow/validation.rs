//! Structural validation for workflow definitions.
//!
//! The remote API is the final authority on definition shape, but it rejects
//! bad payloads with an opaque 400. These checks catch the two mistakes the
//! editor cannot represent — a connection referencing a node that does not
//! exist, and two nodes sharing a name — before anything is sent.

use std::collections::HashSet;
use std::fmt;

use super::WorkflowDefinition;

/// A structural problem in a [`WorkflowDefinition`].
// Implemented by hand rather than with `#[derive(thiserror::Error)]` because
// thiserror treats any field named `source` as the error chain source, which
// `String` cannot be.
#[derive(Debug, PartialEq, Eq)]
pub enum DefinitionError {
    /// Two nodes carry the same name, so connections would be ambiguous.
    DuplicateNode(String),
    /// A connection source key names a node absent from `nodes`.
    UnknownSource(String),
    /// A connection target references a node absent from `nodes`.
    UnknownTarget { source: String, target: String },
}

impl fmt::Display for DefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateNode(name) => write!(f, "duplicate node name '{name}'"),
            Self::UnknownSource(source) => {
                write!(f, "connection source '{source}' does not match any node")
            }
            Self::UnknownTarget { source, target } => {
                write!(f, "connection from '{source}' targets unknown node '{target}'")
            }
        }
    }
}

impl std::error::Error for DefinitionError {}

/// Check that every name referenced by `connections` exists in `nodes` and
/// that node names are unique.
pub fn validate_definition(definition: &WorkflowDefinition) -> Result<(), DefinitionError> {
    let mut node_names: HashSet<&str> = HashSet::with_capacity(definition.nodes.len());
    for node in &definition.nodes {
        if !node_names.insert(node.name.as_str()) {
            return Err(DefinitionError::DuplicateNode(node.name.clone()));
        }
    }

    for (source, connections) in &definition.connections {
        if !node_names.contains(source.as_str()) {
            return Err(DefinitionError::UnknownSource(source.clone()));
        }
        for target in connections.targets() {
            if !node_names.contains(target.node.as_str()) {
                return Err(DefinitionError::UnknownTarget {
                    source: source.clone(),
                    target: target.node.clone(),
                });
            }
        }
    }

    Ok(())
}
