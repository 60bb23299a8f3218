//! Run result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::topology::DeviceRecord;

/// Outcome of one (operation, target) pair: a success payload or an error
/// description, never both. Consumers must branch on the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Structured payload returned by the dashboard: an object or a list
    /// of objects.
    Success(serde_json::Value),
    /// Error description for a failed target.
    Error(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn payload(&self) -> Option<&serde_json::Value> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Error(message) => Some(message),
        }
    }
}

/// Device identity attached to device-level records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceContext {
    pub name: String,
    pub serial: String,
    pub model: String,
    pub product_type: String,
}

impl From<&DeviceRecord> for DeviceContext {
    fn from(device: &DeviceRecord) -> Self {
        Self {
            name: device.display_name().to_string(),
            serial: device.serial.clone(),
            model: device.model.clone(),
            product_type: device.product_type.clone(),
        }
    }
}

/// One (operation, target) result with its network (and optionally device)
/// context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub network: String,
    pub network_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<DeviceContext>,

    pub outcome: Outcome,
}

impl ResultRecord {
    /// Successful network-level record.
    pub fn success(network: &str, network_id: &str, payload: serde_json::Value) -> Self {
        Self {
            network: network.to_string(),
            network_id: network_id.to_string(),
            device: None,
            outcome: Outcome::Success(payload),
        }
    }

    /// Failed network-level record.
    pub fn failure(network: &str, network_id: &str, error: impl Into<String>) -> Self {
        Self {
            network: network.to_string(),
            network_id: network_id.to_string(),
            device: None,
            outcome: Outcome::Error(error.into()),
        }
    }

    /// Successful device-level record.
    pub fn device_success(
        network: &str,
        network_id: &str,
        device: &DeviceRecord,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            network: network.to_string(),
            network_id: network_id.to_string(),
            device: Some(DeviceContext::from(device)),
            outcome: Outcome::Success(payload),
        }
    }

    /// Whole-step failure entry, with no target context.
    pub fn step_error(error: impl Into<String>) -> Self {
        Self {
            network: String::new(),
            network_id: String::new(),
            device: None,
            outcome: Outcome::Error(error.into()),
        }
    }
}

/// Metadata for one full playbook execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub playbook_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_seconds: f64,
    pub networks: Vec<String>,
}

/// A named group of result records, filed by the steps writing to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bucket {
    pub name: String,
    pub records: Vec<ResultRecord>,
}

/// Everything one playbook execution produced. Bucket order follows
/// playbook step order; steps sharing a bucket name append.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub metadata: RunMetadata,
    pub buckets: Vec<Bucket>,
}

impl RunResult {
    /// Append records under a bucket name, creating the bucket on first use.
    pub fn append(&mut self, bucket_name: &str, records: Vec<ResultRecord>) {
        match self.buckets.iter_mut().find(|b| b.name == bucket_name) {
            Some(bucket) => bucket.records.extend(records),
            None => self.buckets.push(Bucket {
                name: bucket_name.to_string(),
                records,
            }),
        }
    }

    /// Records of one bucket, if present.
    pub fn bucket(&self, bucket_name: &str) -> Option<&[ResultRecord]> {
        self.buckets
            .iter()
            .find(|b| b.name == bucket_name)
            .map(|b| b.records.as_slice())
    }

    /// True when no step produced any bucket.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
