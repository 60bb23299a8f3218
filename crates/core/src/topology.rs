//! Topology records and the per-run device cache.
//!
//! The cache is owned by one execution session and mutated only by the
//! engine; it has no internal locking and must not be shared across
//! concurrent runs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::client::DashboardClient;
use crate::error::AuditResult;
use crate::playbook::types::Playbook;

/// A selected top-level network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRecord {
    #[serde(alias = "networkId")]
    pub id: String,

    #[serde(default)]
    pub name: String,
}

/// A device discovered under a network.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde(default)]
    pub serial: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub model: String,

    #[serde(default, rename = "productType")]
    pub product_type: String,

    /// Remaining discovery fields (mac, lanIp, firmware, status, ...).
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl DeviceRecord {
    /// Display name, falling back to the serial for unnamed devices.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.serial
        } else {
            &self.name
        }
    }
}

/// Per-run store of discovered devices keyed by network identifier.
#[derive(Debug, Default)]
pub struct TopologyCache {
    devices: HashMap<String, Vec<DeviceRecord>>,
}

impl TopologyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached devices for a network, fetching once if absent.
    ///
    /// Records without a serial identifier are dropped: some endpoints can
    /// return partial records, and downstream device iteration keys on the
    /// serial.
    pub async fn ensure_devices(
        &mut self,
        client: &dyn DashboardClient,
        network: &NetworkRecord,
    ) -> AuditResult<&[DeviceRecord]> {
        if !self.devices.contains_key(&network.id) {
            let fetched = client.network_devices(&network.id).await?;
            let fetched: Vec<DeviceRecord> = fetched
                .into_iter()
                .filter(|d| !d.serial.is_empty())
                .collect();
            tracing::debug!(
                network = %network.name,
                devices = fetched.len(),
                "Cached device list"
            );
            self.devices.insert(network.id.clone(), fetched);
        }

        Ok(self
            .devices
            .get(&network.id)
            .map(Vec::as_slice)
            .unwrap_or(&[]))
    }

    /// Eagerly warm the cache for every target network when the playbook
    /// contains any device-level step. A discovery failure is logged and the
    /// network contributes zero devices for the remainder of the run.
    pub async fn preload_if_needed(
        &mut self,
        client: &dyn DashboardClient,
        playbook: &Playbook,
        networks: &[NetworkRecord],
    ) {
        if !playbook.has_device_steps() {
            return;
        }

        for network in networks {
            if self.devices.contains_key(&network.id) {
                continue;
            }
            if let Err(e) = self.ensure_devices(client, network).await {
                tracing::warn!(
                    network = %network.name,
                    error = %e,
                    "Device discovery failed; network contributes no devices"
                );
                self.devices.insert(network.id.clone(), Vec::new());
            }
        }
    }

    /// Cached devices for a network, empty if never discovered.
    pub fn devices(&self, network_id: &str) -> &[DeviceRecord] {
        self.devices
            .get(network_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Write a device list into the cache. Used when a device-listing step
    /// has already fetched the list, so it doubles as a cache-warm step.
    pub fn insert_devices(&mut self, network_id: &str, devices: Vec<DeviceRecord>) {
        let devices: Vec<DeviceRecord> =
            devices.into_iter().filter(|d| !d.serial.is_empty()).collect();
        self.devices.insert(network_id.to_string(), devices);
    }

    pub fn contains(&self, network_id: &str) -> bool {
        self.devices.contains_key(network_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ResolvedCall;
    use crate::error::AuditError;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Client that counts discovery calls and fails for one network.
    struct CountingClient {
        calls: AtomicUsize,
        failing_network: Option<String>,
    }

    impl CountingClient {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                failing_network: None,
            }
        }
    }

    #[async_trait]
    impl DashboardClient for CountingClient {
        async fn invoke(
            &self,
            _call: &ResolvedCall,
            _params: &std::collections::HashMap<String, Value>,
        ) -> AuditResult<Value> {
            unimplemented!("not used by topology tests")
        }

        async fn organizations(&self) -> AuditResult<Vec<Value>> {
            Ok(vec![])
        }

        async fn organization_networks(&self, _org_id: &str) -> AuditResult<Vec<NetworkRecord>> {
            Ok(vec![])
        }

        async fn network_devices(&self, network_id: &str) -> AuditResult<Vec<DeviceRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing_network.as_deref() == Some(network_id) {
                return Err(AuditError::Api("device discovery failed".to_string()));
            }
            Ok(vec![
                DeviceRecord {
                    serial: "Q2XX-0001".to_string(),
                    name: "sw-01".to_string(),
                    model: "MS250".to_string(),
                    product_type: "switch".to_string(),
                    ..Default::default()
                },
                // Partial record without serial, must be filtered out.
                DeviceRecord::default(),
            ])
        }
    }

    fn network(id: &str) -> NetworkRecord {
        NetworkRecord {
            id: id.to_string(),
            name: format!("net-{}", id),
        }
    }

    #[tokio::test]
    async fn test_ensure_devices_fetches_once() {
        let client = CountingClient::new();
        let mut cache = TopologyCache::new();
        let net = network("N_1");

        let devices = cache.ensure_devices(&client, &net).await.unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].serial, "Q2XX-0001");

        cache.ensure_devices(&client, &net).await.unwrap();
        cache.ensure_devices(&client, &net).await.unwrap();
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_preload_skips_network_only_playbooks() {
        let client = CountingClient::new();
        let mut cache = TopologyCache::new();
        let playbook = crate::playbook::parse_playbook(
            r#"
config:
  name: net_only
api_calls:
  - name: settings
    api:
      endpoint: networks.switch.settings
      method: getNetworkSwitchSettings
    output: settings
"#,
        )
        .unwrap();

        cache
            .preload_if_needed(&client, &playbook, &[network("N_1")])
            .await;
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_preload_warms_every_network_once() {
        let client = CountingClient::new();
        let mut cache = TopologyCache::new();
        let playbook = crate::playbook::parse_playbook(
            r#"
config:
  name: device_audit
api_calls:
  - name: ports
    api:
      endpoint: devices.switch.ports
      method: getDeviceSwitchPorts
    output: ports
  - name: lldp
    api:
      endpoint: devices.lldp.cdp
      method: getDeviceLldpCdp
    output: lldp
"#,
        )
        .unwrap();

        let networks = [network("N_1"), network("N_2")];
        cache.preload_if_needed(&client, &playbook, &networks).await;
        cache.preload_if_needed(&client, &playbook, &networks).await;

        // Two device-level steps, two preload invocations: still one
        // discovery call per network.
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_preload_failure_contributes_zero_devices() {
        let client = CountingClient {
            calls: AtomicUsize::new(0),
            failing_network: Some("N_2".to_string()),
        };
        let mut cache = TopologyCache::new();
        let playbook = crate::playbook::parse_playbook(
            r#"
config:
  name: device_audit
api_calls:
  - name: ports
    api:
      endpoint: devices.switch.ports
      method: getDeviceSwitchPorts
    output: ports
"#,
        )
        .unwrap();

        let networks = [network("N_1"), network("N_2")];
        cache.preload_if_needed(&client, &playbook, &networks).await;

        assert_eq!(cache.devices("N_1").len(), 1);
        assert!(cache.devices("N_2").is_empty());
        // The failed network is still marked cached: no re-fetch later.
        assert!(cache.contains("N_2"));
    }

    #[test]
    fn test_display_name_falls_back_to_serial() {
        let device = DeviceRecord {
            serial: "Q2XX-0002".to_string(),
            ..Default::default()
        };
        assert_eq!(device.display_name(), "Q2XX-0002");
    }

    #[test]
    fn test_insert_devices_filters_missing_serials() {
        let mut cache = TopologyCache::new();
        cache.insert_devices(
            "N_1",
            vec![
                DeviceRecord {
                    serial: "Q2XX-0001".to_string(),
                    ..Default::default()
                },
                DeviceRecord::default(),
            ],
        );
        assert_eq!(cache.devices("N_1").len(), 1);
    }
}
