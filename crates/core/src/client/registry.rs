//! Endpoint registry.
//!
//! Dot-separated capability paths are resolved to concrete HTTP invocations
//! once, before execution begins. An unknown (endpoint, method) pair is a
//! validation error at resolve time, never a per-call runtime failure.

use serde::{Deserialize, Serialize};

use crate::error::{AuditError, AuditResult};
use crate::playbook::types::{ApiCall, Playbook};

/// Endpoint capability path that lists a network's devices. A step using it
/// doubles as a cache-warm step for subsequent device-level iteration.
pub const DEVICE_LIST_ENDPOINT: &str = "networks.devices";

/// Topology level an endpoint operates at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointScope {
    /// Iterates the selected networks.
    Network,
    /// Iterates (network, device) pairs.
    Device,
}

impl EndpointScope {
    /// Name of the identifier parameter injected for this scope.
    pub fn target_param(&self) -> &'static str {
        match self {
            EndpointScope::Network => "networkId",
            EndpointScope::Device => "serial",
        }
    }
}

/// A playbook call resolved against the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCall {
    /// Capability path from the playbook.
    pub endpoint: String,
    /// Remote method name from the playbook.
    pub method: String,
    /// Level the call operates at.
    pub scope: EndpointScope,
    /// URL path relative to the API base, with a `{networkId}` or `{serial}`
    /// placeholder for the target identifier.
    pub path_template: &'static str,
}

impl ResolvedCall {
    /// Substitute the target identifier into the path template.
    pub fn path(&self, target_id: &str) -> String {
        self.path_template
            .replace("{networkId}", target_id)
            .replace("{serial}", target_id)
    }
}

struct EndpointDef {
    endpoint: &'static str,
    method: &'static str,
    scope: EndpointScope,
    path_template: &'static str,
}

/// Known dashboard capabilities addressable from playbooks.
const ENDPOINTS: &[EndpointDef] = &[
    EndpointDef {
        endpoint: "networks.devices",
        method: "getNetworkDevices",
        scope: EndpointScope::Network,
        path_template: "/networks/{networkId}/devices",
    },
    EndpointDef {
        endpoint: "networks.clients",
        method: "getNetworkClients",
        scope: EndpointScope::Network,
        path_template: "/networks/{networkId}/clients",
    },
    EndpointDef {
        endpoint: "networks.vlans",
        method: "getNetworkVlans",
        scope: EndpointScope::Network,
        path_template: "/networks/{networkId}/appliance/vlans",
    },
    EndpointDef {
        endpoint: "networks.switch.settings",
        method: "getNetworkSwitchSettings",
        scope: EndpointScope::Network,
        path_template: "/networks/{networkId}/switch/settings",
    },
    EndpointDef {
        endpoint: "networks.switch.dhcp",
        method: "getNetworkSwitchDhcpServerPolicy",
        scope: EndpointScope::Network,
        path_template: "/networks/{networkId}/switch/dhcpServerPolicy",
    },
    EndpointDef {
        endpoint: "networks.switch.mtu",
        method: "getNetworkSwitchMtu",
        scope: EndpointScope::Network,
        path_template: "/networks/{networkId}/switch/mtu",
    },
    EndpointDef {
        endpoint: "networks.switch.stormControl",
        method: "getNetworkSwitchStormControl",
        scope: EndpointScope::Network,
        path_template: "/networks/{networkId}/switch/stormControl",
    },
    EndpointDef {
        endpoint: "networks.switch.accessPolicies",
        method: "getNetworkSwitchAccessPolicies",
        scope: EndpointScope::Network,
        path_template: "/networks/{networkId}/switch/accessPolicies",
    },
    EndpointDef {
        endpoint: "networks.switch.portSchedules",
        method: "getNetworkSwitchPortSchedules",
        scope: EndpointScope::Network,
        path_template: "/networks/{networkId}/switch/portSchedules",
    },
    EndpointDef {
        endpoint: "networks.switch.qosRules",
        method: "getNetworkSwitchQosRules",
        scope: EndpointScope::Network,
        path_template: "/networks/{networkId}/switch/qosRules",
    },
    EndpointDef {
        endpoint: "networks.switch.stp",
        method: "getNetworkSwitchStp",
        scope: EndpointScope::Network,
        path_template: "/networks/{networkId}/switch/stp",
    },
    EndpointDef {
        endpoint: "networks.wireless.ssids",
        method: "getNetworkWirelessSsids",
        scope: EndpointScope::Network,
        path_template: "/networks/{networkId}/wireless/ssids",
    },
    EndpointDef {
        endpoint: "devices.switch.ports",
        method: "getDeviceSwitchPorts",
        scope: EndpointScope::Device,
        path_template: "/devices/{serial}/switch/ports",
    },
    EndpointDef {
        endpoint: "devices.switch.portSchedules",
        method: "getDeviceSwitchPortSchedules",
        scope: EndpointScope::Device,
        path_template: "/devices/{serial}/switch/ports/schedules",
    },
    EndpointDef {
        endpoint: "devices.switch.routingInterfaces",
        method: "getDeviceSwitchRoutingInterfaces",
        scope: EndpointScope::Device,
        path_template: "/devices/{serial}/switch/routing/interfaces",
    },
    EndpointDef {
        endpoint: "devices.switch.warmSpare",
        method: "getDeviceSwitchWarmSpare",
        scope: EndpointScope::Device,
        path_template: "/devices/{serial}/switch/warmSpare",
    },
    EndpointDef {
        endpoint: "devices.switch.portsStatuses",
        method: "getDeviceSwitchPortsStatuses",
        scope: EndpointScope::Device,
        path_template: "/devices/{serial}/switch/ports/statuses",
    },
    EndpointDef {
        endpoint: "devices.management.interface",
        method: "getDeviceManagementInterface",
        scope: EndpointScope::Device,
        path_template: "/devices/{serial}/managementInterface",
    },
    EndpointDef {
        endpoint: "devices.lldp.cdp",
        method: "getDeviceLldpCdp",
        scope: EndpointScope::Device,
        path_template: "/devices/{serial}/lldpCdp",
    },
    EndpointDef {
        endpoint: "devices.wireless.radio.settings",
        method: "getDeviceWirelessRadioSettings",
        scope: EndpointScope::Device,
        path_template: "/devices/{serial}/wireless/radio/settings",
    },
    EndpointDef {
        endpoint: "devices.appliance.performance",
        method: "getDeviceAppliancePerformance",
        scope: EndpointScope::Device,
        path_template: "/devices/{serial}/appliance/performance",
    },
];

/// Resolve an (endpoint, method) pair against the registry.
pub fn resolve(endpoint: &str, method: &str) -> AuditResult<ResolvedCall> {
    ENDPOINTS
        .iter()
        .find(|def| def.endpoint == endpoint && def.method == method)
        .map(|def| ResolvedCall {
            endpoint: def.endpoint.to_string(),
            method: def.method.to_string(),
            scope: def.scope,
            path_template: def.path_template,
        })
        .ok_or_else(|| {
            AuditError::Validation(format!(
                "Unknown endpoint/method pair: {} / {}",
                endpoint, method
            ))
        })
}

/// Resolve one playbook step.
pub fn resolve_call(call: &ApiCall) -> AuditResult<ResolvedCall> {
    resolve(&call.api.endpoint, &call.api.method)
}

/// Resolve every step of a playbook, in order. Fails on the first unknown
/// pair so invalid playbooks are rejected before any network traffic.
pub fn resolve_playbook(playbook: &Playbook) -> AuditResult<Vec<ResolvedCall>> {
    playbook.api_calls.iter().map(resolve_call).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playbook::types::ApiSpec;

    #[test]
    fn test_resolve_network_endpoint() {
        let call = resolve("networks.devices", "getNetworkDevices").unwrap();
        assert_eq!(call.scope, EndpointScope::Network);
        assert_eq!(call.scope.target_param(), "networkId");
        assert_eq!(call.path("N_123"), "/networks/N_123/devices");
    }

    #[test]
    fn test_resolve_device_endpoint() {
        let call = resolve("devices.switch.ports", "getDeviceSwitchPorts").unwrap();
        assert_eq!(call.scope, EndpointScope::Device);
        assert_eq!(call.scope.target_param(), "serial");
        assert_eq!(call.path("Q2XX-1"), "/devices/Q2XX-1/switch/ports");
    }

    #[test]
    fn test_resolve_unknown_pair_fails() {
        let result = resolve("networks.devices", "deleteNetworkDevices");
        assert!(matches!(result, Err(AuditError::Validation(_))));

        let result = resolve("networks.nonsense", "getNetworkDevices");
        assert!(matches!(result, Err(AuditError::Validation(_))));
    }

    #[test]
    fn test_resolve_playbook_fails_on_any_unknown_step() {
        let playbook = Playbook {
            config: Some(Default::default()),
            api_calls: vec![
                ApiCall {
                    name: "ok".to_string(),
                    api: ApiSpec {
                        endpoint: "networks.devices".to_string(),
                        method: "getNetworkDevices".to_string(),
                        ..Default::default()
                    },
                    output: "inventory".to_string(),
                },
                ApiCall {
                    name: "bad".to_string(),
                    api: ApiSpec {
                        endpoint: "networks.made.up".to_string(),
                        method: "getSomething".to_string(),
                        ..Default::default()
                    },
                    output: "other".to_string(),
                },
            ],
        };

        assert!(resolve_playbook(&playbook).is_err());
    }

    #[test]
    fn test_scope_matches_endpoint_prefix() {
        for def in ENDPOINTS {
            let expected = if def.endpoint.starts_with("devices.") {
                EndpointScope::Device
            } else {
                EndpointScope::Network
            };
            assert_eq!(def.scope, expected, "scope mismatch for {}", def.endpoint);
        }
    }
}
