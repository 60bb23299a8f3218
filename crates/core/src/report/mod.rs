//! Report builder.
//!
//! Converts a run's nested results into per-bucket CSV files with a
//! self-describing wide schema: the column set is the union of keys across
//! the bucket's flattened rows, and a sidecar schema document records the
//! value kind realized in each column.

pub mod flatten;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, Utc};
use serde_json::Value;

use crate::engine::outcome::RunResult;
use crate::error::{AuditError, AuditResult};
use crate::topology::{NetworkRecord, TopologyCache};

pub use flatten::{flatten_record, Row};

/// Builds CSV reports under a configured root directory.
pub struct ReportBuilder {
    reports_root: PathBuf,
}

impl ReportBuilder {
    pub fn new(reports_root: impl Into<PathBuf>) -> Self {
        Self {
            reports_root: reports_root.into(),
        }
    }

    /// Write a full report for one run.
    ///
    /// Creates `<root>/<name>_<YYYYMMDD_HHMMSS>/` with `metadata.json` and,
    /// per non-empty bucket, `<bucket>/<bucket>_<timestamp>.csv` plus
    /// `<bucket>/schema.json`. Buckets with zero flattened rows produce no
    /// files at all. Returns the report directory path.
    pub fn build(&self, run: &RunResult, report_name: &str) -> AuditResult<PathBuf> {
        if run.is_empty() {
            return Err(AuditError::Report(
                "No results to generate report from".to_string(),
            ));
        }

        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let report_dir = self
            .reports_root
            .join(format!("{}_{}", report_name, timestamp));
        fs::create_dir_all(&report_dir).map_err(|e| {
            AuditError::Report(format!(
                "Failed to create report directory {}: {}",
                report_dir.display(),
                e
            ))
        })?;

        let metadata = serde_json::to_string_pretty(&run.metadata)?;
        write_file(&report_dir.join("metadata.json"), metadata.as_bytes())?;

        let generated_at = Utc::now().to_rfc3339();

        for bucket in &run.buckets {
            let mut rows: Vec<Row> = bucket.records.iter().map(flatten_record).collect();
            if rows.is_empty() {
                continue;
            }

            for row in &mut rows {
                row.insert(
                    "timestamp".to_string(),
                    Value::String(generated_at.clone()),
                );
            }

            let columns = column_union(&rows);

            let bucket_dir = report_dir.join(&bucket.name);
            fs::create_dir_all(&bucket_dir).map_err(|e| {
                AuditError::Report(format!(
                    "Failed to create bucket directory {}: {}",
                    bucket_dir.display(),
                    e
                ))
            })?;

            let csv_path = bucket_dir.join(format!("{}_{}.csv", bucket.name, timestamp));
            write_csv(&csv_path, &columns, &rows)?;

            let schema = infer_schema(&columns, &rows);
            let schema_json = serde_json::to_string_pretty(&schema)?;
            write_file(&bucket_dir.join("schema.json"), schema_json.as_bytes())?;

            tracing::info!(
                bucket = %bucket.name,
                rows = rows.len(),
                columns = columns.len(),
                "Bucket written"
            );
        }

        Ok(report_dir)
    }
}

/// Export every cached device of the selected networks as one flat CSV,
/// important columns first.
pub fn write_device_inventory(
    networks: &[NetworkRecord],
    cache: &TopologyCache,
    reports_root: &Path,
) -> AuditResult<PathBuf> {
    const IMPORTANT_COLUMNS: &[&str] = &[
        "networkName",
        "name",
        "model",
        "serial",
        "productType",
        "networkId",
        "mac",
        "lanIp",
        "firmware",
        "status",
    ];

    let mut rows: Vec<Row> = Vec::new();
    for network in networks {
        for device in cache.devices(&network.id) {
            let mut row = Row::new();
            row.insert(
                "networkName".to_string(),
                Value::String(network.name.clone()),
            );
            row.insert("name".to_string(), Value::String(device.name.clone()));
            row.insert("model".to_string(), Value::String(device.model.clone()));
            row.insert("serial".to_string(), Value::String(device.serial.clone()));
            row.insert(
                "productType".to_string(),
                Value::String(device.product_type.clone()),
            );
            row.insert("networkId".to_string(), Value::String(network.id.clone()));
            for (key, value) in &device.extra {
                row.insert(key.clone(), value.clone());
            }
            rows.push(row);
        }
    }

    if rows.is_empty() {
        return Err(AuditError::Report(
            "No devices found in selected networks".to_string(),
        ));
    }

    // Important columns first, then the rest in first-seen order.
    let union = column_union(&rows);
    let mut columns: Vec<String> = IMPORTANT_COLUMNS
        .iter()
        .filter(|c| union.iter().any(|u| u == *c))
        .map(|c| c.to_string())
        .collect();
    columns.extend(
        union
            .into_iter()
            .filter(|c| !IMPORTANT_COLUMNS.contains(&c.as_str())),
    );

    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let report_dir = reports_root.join(format!("device_inventory_{}", timestamp));
    fs::create_dir_all(&report_dir).map_err(|e| {
        AuditError::Report(format!(
            "Failed to create report directory {}: {}",
            report_dir.display(),
            e
        ))
    })?;

    let csv_path = report_dir.join(format!("device_inventory_{}.csv", timestamp));
    write_csv(&csv_path, &columns, &rows)?;

    Ok(report_dir)
}

/// Union of row keys, in first-seen order.
fn column_union(rows: &[Row]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for row in rows {
        for key in row.keys() {
            if seen.insert(key.clone()) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

fn write_csv(path: &Path, columns: &[String], rows: &[Row]) -> AuditResult<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AuditError::Report(format!("Failed to open {}: {}", path.display(), e)))?;

    writer.write_record(columns)?;
    for row in rows {
        writer.write_record(columns.iter().map(|column| cell(row.get(column))))?;
    }
    writer
        .flush()
        .map_err(|e| AuditError::Report(format!("Failed to write {}: {}", path.display(), e)))?;

    Ok(())
}

/// Render one cell. Rows missing a column get an empty value.
fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Infer a column → value-kind schema from the realized row values.
fn infer_schema(columns: &[String], rows: &[Row]) -> serde_json::Map<String, Value> {
    let mut schema = serde_json::Map::new();
    for column in columns {
        let mut kinds: Vec<&'static str> = Vec::new();
        for row in rows {
            if let Some(value) = row.get(column) {
                let kind = value_kind(value);
                if kind != "null" && !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
        }
        let kind = match kinds.as_slice() {
            [] => "empty",
            [single] => single,
            _ => "mixed",
        };
        schema.insert(column.clone(), Value::String(kind.to_string()));
    }
    schema
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn write_file(path: &Path, contents: &[u8]) -> AuditResult<()> {
    fs::write(path, contents)
        .map_err(|e| AuditError::Report(format!("Failed to write {}: {}", path.display(), e)))
}
