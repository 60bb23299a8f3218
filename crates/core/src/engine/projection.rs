//! Response field projection.

use serde_json::Value;

/// Select a subset of dot-addressed fields out of a response object.
///
/// Returns the response unchanged when no paths are requested or the
/// response is not an object. Each requested path becomes one key in the
/// output (the full dotted path, in request order); a path that does not
/// resolve projects to null rather than erroring.
pub fn project(response: &Value, field_paths: &[String]) -> Value {
    if field_paths.is_empty() || !response.is_object() {
        return response.clone();
    }

    let mut projected = serde_json::Map::new();
    for path in field_paths {
        projected.insert(path.clone(), lookup_path(response, path));
    }
    Value::Object(projected)
}

fn lookup_path(value: &Value, path: &str) -> Value {
    let mut current = value;
    for segment in path.split('.') {
        match current.get(segment) {
            Some(next) => current = next,
            None => return Value::Null,
        }
    }
    current.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_project_resolves_and_nulls() {
        let response = json!({"a": {"b": 1}});
        let projected = project(&response, &["a.b".to_string(), "a.c".to_string()]);
        assert_eq!(projected, json!({"a.b": 1, "a.c": null}));
    }

    #[test]
    fn test_project_empty_paths_passes_through() {
        let response = json!({"a": 1, "b": 2});
        assert_eq!(project(&response, &[]), response);
    }

    #[test]
    fn test_project_non_object_passes_through() {
        let response = json!([{"port": 1}, {"port": 2}]);
        let paths = vec!["port".to_string()];
        assert_eq!(project(&response, &paths), response);
    }

    #[test]
    fn test_project_through_non_object_yields_null() {
        let response = json!({"a": 5});
        let projected = project(&response, &["a.b".to_string()]);
        assert_eq!(projected, json!({"a.b": null}));
    }

    #[test]
    fn test_project_keeps_request_order() {
        let response = json!({"x": 1, "y": 2});
        let projected = project(&response, &["y".to_string(), "x".to_string()]);
        let keys: Vec<&String> = projected.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["y", "x"]);
    }
}
