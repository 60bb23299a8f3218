//! Playbook YAML parser.
//!
//! Parsing and validation are deliberately split: a document with missing
//! fields still parses (everything defaults), and `validate_playbook`
//! decides whether the result is executable.

use std::path::Path;

use crate::error::{AuditError, AuditResult};
use crate::playbook::types::Playbook;

/// Parse a YAML string into a Playbook.
///
/// Absent fields default to empty/false values; only malformed YAML fails.
pub fn parse_playbook(yaml_content: &str) -> AuditResult<Playbook> {
    serde_yaml::from_str(yaml_content).map_err(|e| AuditError::Parse(e.to_string()))
}

/// Validate a parsed playbook.
///
/// Returns false if the config block is absent, the call list is empty, or
/// any call is missing name/endpoint/method/output. Parameter and filter
/// contents are not inspected.
pub fn validate_playbook(playbook: &Playbook) -> bool {
    if playbook.config.is_none() || playbook.api_calls.is_empty() {
        return false;
    }

    playbook.api_calls.iter().all(|call| {
        !call.name.is_empty()
            && !call.api.endpoint.is_empty()
            && !call.api.method.is_empty()
            && !call.output.is_empty()
    })
}

/// Read, parse and validate a playbook file.
pub fn load_playbook(path: &Path) -> AuditResult<Playbook> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AuditError::Parse(format!("Failed to read {}: {}", path.display(), e)))?;

    let playbook = parse_playbook(&content)?;

    if !validate_playbook(&playbook) {
        return Err(AuditError::Validation(format!(
            "Invalid playbook structure: {}",
            path.display()
        )));
    }

    Ok(playbook)
}
