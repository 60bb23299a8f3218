//! Runtime configuration for netaudit.

use serde::Deserialize;

/// Configuration loaded from environment variables.
///
/// Environment variables are prefixed with `NETAUDIT_`:
/// - `NETAUDIT_API_KEY`: Dashboard API key (required for live runs)
/// - `NETAUDIT_BASE_URL`: Dashboard API base URL
/// - `NETAUDIT_REPORTS_ROOT`: Root directory for generated reports (default: "reports")
/// - `NETAUDIT_TIMEOUT_SECONDS`: Per-request HTTP timeout (default: 30)
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Dashboard API key
    #[serde(default)]
    pub api_key: String,

    /// Dashboard API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Root directory for generated reports
    #[serde(default = "default_reports_root")]
    pub reports_root: String,

    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "https://api.meraki.com/api/v1".to_string()
}

fn default_reports_root() -> String {
    "reports".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl AuditConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables are prefixed with `NETAUDIT_`.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed("NETAUDIT_").from_env::<AuditConfig>()
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            reports_root: default_reports_root(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AuditConfig::default();
        assert!(config.api_key.is_empty());
        assert_eq!(config.base_url, "https://api.meraki.com/api/v1");
        assert_eq!(config.reports_root, "reports");
        assert_eq!(config.timeout_seconds, 30);
    }
}
