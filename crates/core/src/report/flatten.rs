//! Row flattening for report output.
//!
//! Each result record becomes one flat row: common target columns first,
//! then the success payload's own fields (nested objects flattened with
//! dotted keys). Error records carry only the error text and network
//! context.

use serde_json::Value;

use crate::engine::outcome::{Outcome, ResultRecord};

/// One flattened report row. Key order is insertion order.
pub type Row = serde_json::Map<String, Value>;

/// Flatten one result record into a row.
pub fn flatten_record(record: &ResultRecord) -> Row {
    let mut row = Row::new();

    match &record.outcome {
        Outcome::Error(message) => {
            row.insert("error".to_string(), Value::String(message.clone()));
            row.insert("network".to_string(), Value::String(record.network.clone()));
        }
        Outcome::Success(payload) => {
            row.insert("network".to_string(), Value::String(record.network.clone()));
            row.insert(
                "networkId".to_string(),
                Value::String(record.network_id.clone()),
            );
            if let Some(device) = &record.device {
                row.insert(
                    "deviceName".to_string(),
                    Value::String(device.name.clone()),
                );
                row.insert(
                    "deviceSerial".to_string(),
                    Value::String(device.serial.clone()),
                );
                row.insert(
                    "deviceModel".to_string(),
                    Value::String(device.model.clone()),
                );
                row.insert(
                    "deviceProductType".to_string(),
                    Value::String(device.product_type.clone()),
                );
            }
            merge_payload(&mut row, payload);
        }
    }

    row
}

/// Merge a success payload's fields into the row. A list payload
/// contributes only its first element's fields as representative columns.
fn merge_payload(row: &mut Row, payload: &Value) {
    match payload {
        Value::Object(map) => {
            for (key, value) in map {
                merge_value(row, key, value);
            }
        }
        Value::Array(items) => match items.first() {
            Some(Value::Object(first)) => {
                for (key, value) in first {
                    merge_value(row, key, value);
                }
            }
            Some(other) => {
                row.insert("value".to_string(), other.clone());
            }
            None => {}
        },
        Value::Null => {}
        other => {
            row.insert("value".to_string(), other.clone());
        }
    }
}

/// Insert a payload field, flattening nested objects into dotted columns.
fn merge_value(row: &mut Row, key: &str, value: &Value) {
    match value {
        Value::Object(map) => {
            for (nested_key, nested_value) in map {
                merge_value(row, &format!("{}.{}", key, nested_key), nested_value);
            }
        }
        other => {
            row.insert(key.to_string(), other.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::DeviceRecord;
    use serde_json::json;

    #[test]
    fn test_flatten_object_payload() {
        let record = ResultRecord::success(
            "branch-1",
            "N_1",
            json!({"mtu": 9100, "enabled": true}),
        );
        let row = flatten_record(&record);

        let keys: Vec<&String> = row.keys().collect();
        assert_eq!(keys, vec!["network", "networkId", "mtu", "enabled"]);
        assert_eq!(row["mtu"], json!(9100));
    }

    #[test]
    fn test_flatten_list_payload_uses_first_element() {
        let record = ResultRecord::success(
            "branch-1",
            "N_1",
            json!([{"portId": "1", "vlan": 10}, {"portId": "2", "vlan": 20}]),
        );
        let row = flatten_record(&record);

        assert_eq!(row["portId"], json!("1"));
        assert_eq!(row["vlan"], json!(10));
    }

    #[test]
    fn test_flatten_nested_objects_into_dotted_columns() {
        let record = ResultRecord::success(
            "branch-1",
            "N_1",
            json!({"stp": {"enabled": true, "priority": 4096}}),
        );
        let row = flatten_record(&record);

        assert_eq!(row["stp.enabled"], json!(true));
        assert_eq!(row["stp.priority"], json!(4096));
        assert!(!row.contains_key("stp"));
    }

    #[test]
    fn test_flatten_error_record_carries_only_error_and_network() {
        let record = ResultRecord::failure("branch-2", "N_2", "HTTP 500");
        let row = flatten_record(&record);

        assert_eq!(row.len(), 2);
        assert_eq!(row["error"], json!("HTTP 500"));
        assert_eq!(row["network"], json!("branch-2"));
    }

    #[test]
    fn test_flatten_device_record_includes_device_columns() {
        let device = DeviceRecord {
            serial: "Q2XX-1".to_string(),
            name: "sw-01".to_string(),
            model: "MS250".to_string(),
            product_type: "switch".to_string(),
            ..Default::default()
        };
        let record =
            ResultRecord::device_success("branch-1", "N_1", &device, json!({"uplink": "up"}));
        let row = flatten_record(&record);

        assert_eq!(row["deviceName"], json!("sw-01"));
        assert_eq!(row["deviceSerial"], json!("Q2XX-1"));
        assert_eq!(row["deviceModel"], json!("MS250"));
        assert_eq!(row["deviceProductType"], json!("switch"));
        assert_eq!(row["uplink"], json!("up"));
    }
}
