//! Playbook execution engine.
//!
//! Iterates playbook steps strictly in order, dispatching each to a
//! network-level or device-level fan-out. Failures are contained at the
//! smallest possible scope: a whole-step failure becomes one error entry in
//! the step's bucket, a network failure becomes an error record for that
//! network, and a device failure is logged and skipped. One bad target
//! never aborts the run.
//!
//! Execution is sequential by design: the remote API enforces rate limits,
//! and a single flow keeps record ordering and progress reporting trivial.

pub mod outcome;
pub mod progress;
pub mod projection;

use chrono::Utc;
use serde_json::Value;

use crate::client::{registry, DashboardClient, ResolvedCall, DEVICE_LIST_ENDPOINT};
use crate::error::{AuditError, AuditResult};
use crate::playbook::types::{ApiCall, Playbook};
use crate::playbook::validate_playbook;
use crate::topology::{DeviceRecord, NetworkRecord, TopologyCache};

pub use outcome::{Bucket, DeviceContext, Outcome, ResultRecord, RunMetadata, RunResult};
pub use progress::{NoopProgress, ProgressObserver};

static NOOP: NoopProgress = NoopProgress;

/// Executes one playbook against the selected networks.
pub struct Executor<'a> {
    client: &'a dyn DashboardClient,
    observer: &'a dyn ProgressObserver,
}

impl<'a> Executor<'a> {
    pub fn new(client: &'a dyn DashboardClient) -> Self {
        Self {
            client,
            observer: &NOOP,
        }
    }

    /// Inject a progress observer.
    pub fn with_observer(mut self, observer: &'a dyn ProgressObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Run every step of the playbook, in order.
    ///
    /// Fails before any network traffic if the playbook is invalid or any
    /// step references an unknown endpoint. Once the run starts, failures
    /// are contained per step / per target and the run always completes.
    pub async fn execute(
        &self,
        playbook: &Playbook,
        networks: &[NetworkRecord],
        cache: &mut TopologyCache,
    ) -> AuditResult<RunResult> {
        if !validate_playbook(playbook) {
            return Err(AuditError::Validation(
                "Invalid playbook structure".to_string(),
            ));
        }

        // Resolve all endpoints up front so an unknown capability path is a
        // load-time error, not a mid-run surprise.
        let resolved = registry::resolve_playbook(playbook)?;

        let start_time = Utc::now();
        let started = std::time::Instant::now();
        let total_steps = playbook.api_calls.len();

        let mut run = RunResult {
            metadata: RunMetadata {
                playbook_name: playbook.name().to_string(),
                start_time,
                end_time: start_time,
                duration_seconds: 0.0,
                networks: networks.iter().map(|n| n.name.clone()).collect(),
            },
            buckets: Vec::new(),
        };

        tracing::info!(
            playbook = %playbook.name(),
            steps = total_steps,
            networks = networks.len(),
            "Starting playbook run"
        );

        cache.preload_if_needed(self.client, playbook, networks).await;

        for (index, (step, call)) in playbook.api_calls.iter().zip(&resolved).enumerate() {
            self.observer.on_status(&format!("Executing: {}", step.name));

            let base = index as f64 * 100.0 / total_steps as f64;
            let span = 100.0 / total_steps as f64;

            let records = if step.is_device_level() {
                self.run_device_step(step, call, networks, cache, base, span)
                    .await
            } else {
                self.run_network_step(step, call, networks, cache, base, span)
                    .await
            };

            match records {
                Ok(records) => {
                    tracing::info!(step = %step.name, records = records.len(), "Step complete");
                    run.append(&step.output, records);
                }
                Err(e) => {
                    tracing::error!(step = %step.name, error = %e, "Step failed");
                    run.append(&step.output, vec![ResultRecord::step_error(e.to_string())]);
                }
            }

            self.observer
                .on_progress((index + 1) as f64 * 100.0 / total_steps as f64);
        }

        run.metadata.end_time = Utc::now();
        run.metadata.duration_seconds = started.elapsed().as_secs_f64();

        self.observer.on_progress(100.0);
        self.observer.on_status("Run complete");

        tracing::info!(
            playbook = %playbook.name(),
            duration_seconds = run.metadata.duration_seconds,
            "Playbook run finished"
        );

        Ok(run)
    }

    /// Invoke a step once per selected network. A per-network failure
    /// produces an error record and iteration continues.
    async fn run_network_step(
        &self,
        step: &ApiCall,
        call: &ResolvedCall,
        networks: &[NetworkRecord],
        cache: &mut TopologyCache,
        base: f64,
        span: f64,
    ) -> AuditResult<Vec<ResultRecord>> {
        let mut records = Vec::with_capacity(networks.len());

        for (index, network) in networks.iter().enumerate() {
            let mut params = step.api.parameters.clone();
            params.insert(
                "networkId".to_string(),
                Value::String(network.id.clone()),
            );

            match self.client.invoke(call, &params).await {
                Ok(payload) => {
                    if step.api.endpoint == DEVICE_LIST_ENDPOINT {
                        self.cache_device_list(cache, network, &payload);
                    }
                    records.push(ResultRecord::success(&network.name, &network.id, payload));
                }
                Err(e) => {
                    tracing::warn!(
                        step = %step.name,
                        network = %network.name,
                        error = %e,
                        "Network call failed"
                    );
                    records.push(ResultRecord::failure(
                        &network.name,
                        &network.id,
                        e.to_string(),
                    ));
                }
            }

            self.observer
                .on_progress(base + (index + 1) as f64 / networks.len() as f64 * span);
        }

        Ok(records)
    }

    /// Invoke a step once per (network, device) pair from the cache. A
    /// per-device failure is routine (not every device supports every
    /// capability): it is logged and the target is omitted, with no error
    /// placeholder.
    async fn run_device_step(
        &self,
        step: &ApiCall,
        call: &ResolvedCall,
        networks: &[NetworkRecord],
        cache: &TopologyCache,
        base: f64,
        span: f64,
    ) -> AuditResult<Vec<ResultRecord>> {
        let targets: Vec<(&NetworkRecord, &DeviceRecord)> = networks
            .iter()
            .flat_map(|network| {
                cache
                    .devices(&network.id)
                    .iter()
                    .map(move |device| (network, device))
            })
            .collect();

        if targets.is_empty() {
            tracing::warn!(step = %step.name, "No devices available for device-level step");
            return Ok(Vec::new());
        }

        let total = targets.len();
        let mut records = Vec::new();

        for (index, (network, device)) in targets.into_iter().enumerate() {
            let mut params = step.api.parameters.clone();
            params.insert("serial".to_string(), Value::String(device.serial.clone()));

            match self.client.invoke(call, &params).await {
                Ok(payload) => {
                    let projected = projection::project(&payload, &step.api.output_filter);
                    records.push(ResultRecord::device_success(
                        &network.name,
                        &network.id,
                        device,
                        projected,
                    ));
                }
                Err(e) => {
                    tracing::info!(
                        step = %step.name,
                        device = %device.display_name(),
                        serial = %device.serial,
                        error = %e,
                        "Device call skipped"
                    );
                }
            }

            self.observer
                .on_progress(base + (index + 1) as f64 / total as f64 * span);
        }

        Ok(records)
    }

    /// Write a device-listing payload back into the cache, letting the step
    /// double as a cache-warm step for later device-level iteration.
    fn cache_device_list(&self, cache: &mut TopologyCache, network: &NetworkRecord, payload: &Value) {
        match serde_json::from_value::<Vec<DeviceRecord>>(payload.clone()) {
            Ok(devices) => cache.insert_devices(&network.id, devices),
            Err(e) => {
                tracing::debug!(
                    network = %network.name,
                    error = %e,
                    "Device list payload not cacheable"
                );
            }
        }
    }
}
