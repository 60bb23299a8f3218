//! netaudit core library.
//!
//! Drives declarative playbooks of dashboard API operations against a
//! network/device topology and turns the collected results into flattened
//! CSV reports:
//!
//! - Playbook model: parsed, validated list of API call steps
//! - Endpoint registry: dotted capability paths resolved to typed calls
//!   at load time
//! - Topology cache: per-run device discovery cache keyed by network
//! - Execution engine: ordered two-level fan-out with per-target failure
//!   isolation and injected progress reporting
//! - Report builder: per-bucket CSV output with inferred column schemas

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod playbook;
pub mod report;
pub mod topology;

pub use client::{DashboardClient, HttpDashboardClient, ResolvedCall};
pub use config::AuditConfig;
pub use engine::{Executor, NoopProgress, Outcome, ProgressObserver, ResultRecord, RunResult};
pub use error::{AuditError, AuditResult};
pub use playbook::{load_playbook, parse_playbook, validate_playbook, ApiCall, Playbook};
pub use report::{write_device_inventory, ReportBuilder};
pub use topology::{DeviceRecord, NetworkRecord, TopologyCache};
