//! Playbook model types.
//!
//! A playbook is a flat ordered list of API call steps plus immutable
//! metadata. Every field defaults when absent so that a sparse document
//! still parses; missing required fields are a validation concern, not a
//! parse-time one.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Immutable playbook metadata, created once at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybookConfig {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub author: String,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for PlaybookConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            version: default_version(),
            author: String::new(),
        }
    }
}

/// Remote call definition nested under an `api_calls` entry.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiSpec {
    /// Dot-separated capability path, e.g. `networks.switch.settings`
    /// or `devices.switch.ports`.
    #[serde(default)]
    pub endpoint: String,

    /// Concrete remote method to invoke, e.g. `getNetworkSwitchSettings`.
    #[serde(default)]
    pub method: String,

    /// Static parameters merged with the resolved target's identifier.
    #[serde(default)]
    pub parameters: HashMap<String, serde_json::Value>,

    /// Reserved; not consulted during execution.
    #[serde(default)]
    pub filters: HashMap<String, serde_json::Value>,

    /// Dot-paths selecting which response fields survive into the result.
    /// Empty means the full response is kept.
    #[serde(default)]
    pub output_filter: Vec<String>,

    /// Force device-level iteration regardless of the endpoint prefix.
    #[serde(default)]
    pub requires_device: bool,
}

/// One playbook step: a named remote call plus output routing.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiCall {
    /// Human label, used as log/progress key.
    #[serde(default)]
    pub name: String,

    /// The remote call to make.
    #[serde(default)]
    pub api: ApiSpec,

    /// Output bucket the step's records are filed under.
    #[serde(default)]
    pub output: String,
}

impl ApiCall {
    /// Device-level steps iterate (network, device) pairs; everything else
    /// iterates the selected networks.
    pub fn is_device_level(&self) -> bool {
        self.api.requires_device || self.api.endpoint.split('.').next() == Some("devices")
    }
}

/// Ordered sequence of API calls plus one config block.
///
/// Constructed from YAML at load time, validated once, then read-only for
/// the remainder of an execution.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Playbook {
    #[serde(default)]
    pub config: Option<PlaybookConfig>,

    #[serde(default)]
    pub api_calls: Vec<ApiCall>,
}

impl Playbook {
    /// Playbook display name from the config block.
    pub fn name(&self) -> &str {
        self.config.as_ref().map(|c| c.name.as_str()).unwrap_or("")
    }

    /// True if any step requires device-level iteration.
    pub fn has_device_steps(&self) -> bool {
        self.api_calls.iter().any(ApiCall::is_device_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_level_by_endpoint_prefix() {
        let call = ApiCall {
            api: ApiSpec {
                endpoint: "devices.switch.ports".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(call.is_device_level());
    }

    #[test]
    fn test_network_level_by_default() {
        let call = ApiCall {
            api: ApiSpec {
                endpoint: "networks.switch.settings".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(!call.is_device_level());
    }

    #[test]
    fn test_requires_device_override() {
        let call = ApiCall {
            api: ApiSpec {
                endpoint: "networks.clients".to_string(),
                requires_device: true,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(call.is_device_level());
    }

    #[test]
    fn test_version_defaults() {
        let config: PlaybookConfig = serde_yaml::from_str("name: audit").unwrap();
        assert_eq!(config.version, "1.0");
    }
}
