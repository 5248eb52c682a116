//! Utility helpers for the flowctl CLI: config persistence and output
//! redaction.

pub mod config_store;

pub use config_store::{ConfigStore, ConfigStoreError, ConfigUpdate, resolve_config_path};

use once_cell::sync::Lazy;
use regex::Regex;

static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(authorization: )([^\r\n]+)",
        r"(?i)(x-n8n-api-key: )([\w\-\.=:/+]+)",
        r#"(?i)("?(?:apiKey|password)"?\s*[=:]\s*)"?([^\s",}]+)"?"#,
        r"(?i)([A-Z0-9_]*?(?:KEY|TOKEN|SECRET|PASSWORD))=([^\s]+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("redaction pattern must compile"))
    .collect()
});

/// Redacts values that look like secrets in a string.
///
/// Applied to diagnostic output before printing, since the probe commands
/// echo request configurations that would otherwise contain the API key.
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for pattern in REDACT_PATTERNS.iter() {
        redacted = pattern
            .replace_all(&redacted, |caps: &regex::Captures| {
                let prefix = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                format!("{}<redacted>", prefix)
            })
            .to_string();
    }
    redacted
}
