//! Dashboard API client.
//!
//! The engine talks to the dashboard through the [`DashboardClient`] trait;
//! [`HttpDashboardClient`] is the live reqwest-backed implementation. Tests
//! substitute scripted implementations.

pub mod registry;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use crate::config::AuditConfig;
use crate::error::{AuditError, AuditResult};
use crate::topology::{DeviceRecord, NetworkRecord};

pub use registry::{EndpointScope, ResolvedCall, DEVICE_LIST_ENDPOINT};

/// Opaque remote collaborator executing resolved playbook calls and
/// topology discovery. Any call may fail; the engine decides how far the
/// failure propagates.
#[async_trait]
pub trait DashboardClient: Send + Sync {
    /// Invoke a resolved call for one target. `params` carries the step's
    /// static parameters plus the injected target identifier
    /// (`networkId` or `serial`, per the call's scope).
    async fn invoke(
        &self,
        call: &ResolvedCall,
        params: &HashMap<String, Value>,
    ) -> AuditResult<Value>;

    /// List the organizations visible to the API key.
    async fn organizations(&self) -> AuditResult<Vec<Value>>;

    /// List the networks of one organization.
    async fn organization_networks(&self, org_id: &str) -> AuditResult<Vec<NetworkRecord>>;

    /// List the devices of one network.
    async fn network_devices(&self, network_id: &str) -> AuditResult<Vec<DeviceRecord>>;
}

/// Live dashboard client over HTTPS.
pub struct HttpDashboardClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl HttpDashboardClient {
    /// Build a client from configuration. Fails if the API key is unset.
    pub fn new(config: &AuditConfig) -> AuditResult<Self> {
        if config.api_key.is_empty() {
            return Err(AuditError::Config(
                "NETAUDIT_API_KEY is not set".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AuditError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json(&self, path: &str, query: &[(String, String)]) -> AuditResult<Value> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .header("X-Cisco-Meraki-API-Key", &self.api_key)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AuditError::Auth(format!(
                "Dashboard rejected the API key ({})",
                status
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuditError::Api(format!(
                "HTTP {} from {}: {}",
                status, url, body
            )));
        }

        Ok(response.json().await?)
    }

    /// Check the API key by listing organizations. Returns false on an
    /// authentication rejection, propagates any other failure.
    pub async fn verify_key(&self) -> AuditResult<bool> {
        match self.organizations().await {
            Ok(_) => Ok(true),
            Err(AuditError::Auth(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Discover every network across all organizations visible to the key.
    pub async fn load_networks(&self) -> AuditResult<Vec<NetworkRecord>> {
        let orgs = self
            .organizations()
            .await
            .map_err(|e| AuditError::Connection(format!("Failed to load networks: {}", e)))?;

        let mut networks = Vec::new();
        for org in &orgs {
            let org_id = org.get("id").and_then(Value::as_str).unwrap_or_default();
            if org_id.is_empty() {
                continue;
            }
            let org_networks = self
                .organization_networks(org_id)
                .await
                .map_err(|e| AuditError::Connection(format!("Failed to load networks: {}", e)))?;
            networks.extend(org_networks);
        }

        Ok(networks)
    }
}

#[async_trait]
impl DashboardClient for HttpDashboardClient {
    async fn invoke(
        &self,
        call: &ResolvedCall,
        params: &HashMap<String, Value>,
    ) -> AuditResult<Value> {
        let target_param = call.scope.target_param();
        let target_id = params
            .get(target_param)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AuditError::Api(format!(
                    "Missing {} parameter for {}",
                    target_param, call.endpoint
                ))
            })?;

        let path = call.path(target_id);

        // Everything except the target identifier travels as query string.
        let query: Vec<(String, String)> = params
            .iter()
            .filter(|(key, _)| key.as_str() != target_param)
            .map(|(key, value)| (key.clone(), query_value(value)))
            .collect();

        tracing::debug!(
            endpoint = %call.endpoint,
            method = %call.method,
            target = %target_id,
            "Invoking dashboard call"
        );

        self.get_json(&path, &query).await
    }

    async fn organizations(&self) -> AuditResult<Vec<Value>> {
        let value = self.get_json("/organizations", &[]).await?;
        serde_json::from_value(value)
            .map_err(|e| AuditError::Api(format!("Unexpected organizations response: {}", e)))
    }

    async fn organization_networks(&self, org_id: &str) -> AuditResult<Vec<NetworkRecord>> {
        let value = self
            .get_json(&format!("/organizations/{}/networks", org_id), &[])
            .await?;
        serde_json::from_value(value)
            .map_err(|e| AuditError::Api(format!("Unexpected networks response: {}", e)))
    }

    async fn network_devices(&self, network_id: &str) -> AuditResult<Vec<DeviceRecord>> {
        let value = self
            .get_json(&format!("/networks/{}/devices", network_id), &[])
            .await?;
        serde_json::from_value(value)
            .map_err(|e| AuditError::Api(format!("Unexpected devices response: {}", e)))
    }
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_api_key() {
        let config = AuditConfig::default();
        let result = HttpDashboardClient::new(&config);
        assert!(matches!(result, Err(AuditError::Config(_))));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = AuditConfig {
            api_key: "key".to_string(),
            base_url: "https://api.example.com/api/v1/".to_string(),
            ..Default::default()
        };
        let client = HttpDashboardClient::new(&config).unwrap();
        assert_eq!(client.base_url, "https://api.example.com/api/v1");
    }

    #[test]
    fn test_query_value_rendering() {
        assert_eq!(query_value(&Value::String("abc".to_string())), "abc");
        assert_eq!(query_value(&serde_json::json!(3600)), "3600");
        assert_eq!(query_value(&serde_json::json!(true)), "true");
    }
}
