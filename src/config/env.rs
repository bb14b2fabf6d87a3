//! Environment variable overrides layered onto the YAML document.

use serde_yaml::{Mapping, Value};

/// Prefix shared by every override variable.
pub const ENV_PREFIX: &str = "COGNILENS_";
/// Separator between nested keys (`COGNILENS_LLM__MODEL` → `llm.model`).
pub const ENV_NESTED_DELIMITER: &str = "__";

/// Prefixed variables that configure the binary rather than the config tree.
const RESERVED: &[&str] = &["CONFIG", "LOG"];

/// Apply `COGNILENS_*` variables to `root`, creating intermediate tables as needed.
pub(super) fn apply_overrides<I>(root: &mut Value, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, raw) in vars {
        let Some(rest) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        if RESERVED.contains(&rest) {
            continue;
        }

        let path: Vec<String> = rest
            .split(ENV_NESTED_DELIMITER)
            .map(str::to_ascii_lowercase)
            .collect();
        if path.iter().any(String::is_empty) {
            tracing::warn!(variable = %key, "Ignoring malformed config override");
            continue;
        }

        tracing::debug!(variable = %key, "Applying config override from environment");
        set_path(root, &path, parse_scalar(&raw));
    }
}

/// Interpret the raw value as YAML so numbers and booleans keep their type.
fn parse_scalar(raw: &str) -> Value {
    match serde_yaml::from_str::<Value>(raw) {
        Ok(Value::Null) | Err(_) => Value::String(raw.to_string()),
        Ok(value) => value,
    }
}

fn set_path(node: &mut Value, path: &[String], value: Value) {
    let Some((head, rest)) = path.split_first() else {
        *node = value;
        return;
    };

    if !node.is_mapping() {
        *node = Value::Mapping(Mapping::new());
    }
    if let Value::Mapping(map) = node {
        if !map.contains_key(head.as_str()) {
            map.insert(Value::String(head.clone()), Value::Null);
        }
        if let Some(child) = map.get_mut(head.as_str()) {
            set_path(child, rest, value);
        }
    }
}
