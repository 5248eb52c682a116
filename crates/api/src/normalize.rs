//! Response-shape normalization.
//!
//! The n8n API wraps resources in a `data` envelope on some endpoints and
//! returns them bare on others, sometimes varying across successful calls to
//! the same endpoint. Each helper here is an explicit ranked list of
//! extraction strategies tried in order: first hit wins, with a defined
//! fallback when nothing matches. Downstream tooling depends on the exact
//! order, in particular the best-effort create id with its literal
//! `"unknown"` sentinel.

use serde_json::Value;

/// Sentinel id reported when a create response carries no usable id.
pub const UNKNOWN_WORKFLOW_ID: &str = "unknown";

/// Extract a workflow id from a create response.
///
/// Strategies, in order: `data.id`, then top-level `id`. String and numeric
/// ids are both accepted; numbers are rendered in decimal.
pub fn extract_workflow_id(payload: &Value) -> Option<String> {
    payload
        .get("data")
        .and_then(|data| data.get("id"))
        .and_then(id_to_string)
        .or_else(|| payload.get("id").and_then(id_to_string))
}

/// [`extract_workflow_id`] with the `"unknown"` sentinel fallback.
pub fn workflow_id_or_unknown(payload: &Value) -> String {
    extract_workflow_id(payload).unwrap_or_else(|| UNKNOWN_WORKFLOW_ID.to_string())
}

/// Unwrap a `data` envelope when the payload carries one, otherwise return
/// the payload itself.
pub fn unwrap_data_envelope(payload: Value) -> Value {
    match payload {
        Value::Object(mut map) if map.contains_key("data") => map
            .remove("data")
            .unwrap_or(Value::Null),
        other => other,
    }
}

/// Extract the workflow collection from a listing response.
///
/// Strategies, in order: the nested `data` array, a bare top-level array,
/// the sole array-valued field of a wrapper object. Falls back to an empty
/// collection so callers always receive a concrete sequence.
pub fn extract_workflow_list(payload: &Value) -> Vec<Value> {
    if let Some(Value::Array(items)) = payload.get("data") {
        return items.clone();
    }

    match payload {
        Value::Array(items) => items.clone(),
        Value::Object(map) => {
            let mut arrays = map.values().filter_map(Value::as_array);
            match (arrays.next(), arrays.next()) {
                (Some(items), None) => items.clone(),
                _ => Vec::new(),
            }
        }
        _ => Vec::new(),
    }
}

fn id_to_string(id: &Value) -> Option<String> {
    match id {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
