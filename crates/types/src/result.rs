//! The uniform result envelope returned by every API client operation.
//!
//! The remote API wraps resources in a `data` envelope on some endpoints and
//! returns them bare on others. The client absorbs that inconsistency and
//! every caller branches on a single success/failure distinction instead of
//! on response topology. Transport and remote errors never escape the client
//! as error types; they arrive here as [`OperationFailure`] data.

use serde_json::Value;

/// Outcome of one client operation: a typed success payload or a failure
/// carrying the error message and, when known, the remote status code.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationResult<T> {
    Success(T),
    Failure(OperationFailure),
}

impl<T> OperationResult<T> {
    /// Failure from a bare message, with no status code available.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Failure(OperationFailure {
            error: message.into(),
            status: None,
        })
    }

    /// Failure preserving the remote status code.
    pub fn remote_error(message: impl Into<String>, status: u16) -> Self {
        Self::Failure(OperationFailure {
            error: message.into(),
            status: Some(status),
        })
    }

    /// True when the operation completed against the remote API.
    pub fn success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The success payload, if any.
    pub fn into_success(self) -> Option<T> {
        match self {
            Self::Success(payload) => Some(payload),
            Self::Failure(_) => None,
        }
    }

    /// The failure, if any.
    pub fn failure(&self) -> Option<&OperationFailure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure),
        }
    }
}

/// Failure half of the envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationFailure {
    /// Human-readable message from the transport error or response body.
    pub error: String,
    /// Remote HTTP status, when the failure came from a response.
    pub status: Option<u16>,
}

impl std::fmt::Display for OperationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {})", self.error, status),
            None => f.write_str(&self.error),
        }
    }
}

/// Liveness probe result: the raw listing response and its status code.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    pub status: u16,
    pub data: Value,
}

/// Workflows extracted from the listing endpoint's `data` envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowList {
    pub workflows: Vec<Value>,
}

/// A freshly created workflow and its best-effort server-assigned id.
///
/// `id` is the literal sentinel `"unknown"` when the response carried
/// neither `data.id` nor a top-level `id`; creation itself still succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedWorkflow {
    pub workflow: Value,
    pub id: String,
}

/// An updated workflow, unwrapped from the `data` envelope when present.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatedWorkflow {
    pub workflow: Value,
}
