// dqc-core/src/domain/config/raw.rs

// Accessors over raw config documents (already parsed into generic JSON-shaped trees).

use serde_json::{Map, Value};

use crate::domain::error::DomainError;

pub type RawConfig = Map<String, Value>;

/// Canonical (cache / merge key) form of every config identifier.
pub fn normalize_id(id: &str) -> String {
    id.trim().to_uppercase()
}

pub fn payload(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub fn map_payload(map: &RawConfig) -> String {
    payload(&Value::Object(map.clone()))
}

pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn as_object<'a>(
    config_id: &str,
    value: &'a Value,
    what: &str,
) -> Result<&'a RawConfig, DomainError> {
    value.as_object().ok_or_else(|| {
        DomainError::invalid(
            config_id,
            format!("{} must be a mapping, got:\n{}", what, payload(value)),
        )
    })
}

/// Present, non-empty and not null; returns the raw value.
pub fn required<'a>(
    config_id: &str,
    map: &'a RawConfig,
    key: &str,
) -> Result<&'a Value, DomainError> {
    match map.get(key) {
        Some(v) if !is_empty_value(v) => Ok(v),
        _ => Err(DomainError::invalid(
            config_id,
            format!(
                "Config ID '{}' must define non-empty attribute '{}'.\nSupplied config:\n{}",
                config_id,
                key,
                map_payload(map)
            ),
        )),
    }
}

pub fn required_str(config_id: &str, map: &RawConfig, key: &str) -> Result<String, DomainError> {
    let value = required(config_id, map, key)?;
    scalar_to_string(value).ok_or_else(|| {
        DomainError::invalid(
            config_id,
            format!(
                "Attribute '{}' of config ID '{}' must be a scalar value, got:\n{}",
                key,
                config_id,
                payload(value)
            ),
        )
    })
}

pub fn optional_str(
    config_id: &str,
    map: &RawConfig,
    key: &str,
) -> Result<Option<String>, DomainError> {
    match map.get(key) {
        None => Ok(None),
        Some(v) if is_empty_value(v) => Ok(None),
        Some(v) => scalar_to_string(v).map(Some).ok_or_else(|| {
            DomainError::invalid(
                config_id,
                format!(
                    "Attribute '{}' of config ID '{}' must be a scalar value, got:\n{}",
                    key,
                    config_id,
                    payload(v)
                ),
            )
        }),
    }
}

/// A required, non-empty list whose items are all scalars.
pub fn required_str_list(
    config_id: &str,
    map: &RawConfig,
    key: &str,
) -> Result<Vec<String>, DomainError> {
    let value = required(config_id, map, key)?;
    let items = value.as_array().ok_or_else(|| {
        DomainError::invalid(
            config_id,
            format!(
                "Config ID '{}' must define attribute '{}' of type list.",
                config_id, key
            ),
        )
    })?;
    items
        .iter()
        .map(|item| {
            scalar_to_string(item).ok_or_else(|| {
                DomainError::invalid(
                    config_id,
                    format!(
                        "Attribute '{}' of config ID '{}' must only contain scalar values, got:\n{}",
                        key,
                        config_id,
                        payload(item)
                    ),
                )
            })
        })
        .collect()
}

/// Optional mapping; null and absent both yield an empty map.
pub fn optional_object(
    config_id: &str,
    map: &RawConfig,
    key: &str,
) -> Result<RawConfig, DomainError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(RawConfig::new()),
        Some(Value::Object(o)) => Ok(o.clone()),
        Some(other) => Err(DomainError::invalid(
            config_id,
            format!(
                "Attribute '{}' of config ID '{}' must be a mapping, got:\n{}",
                key,
                config_id,
                payload(other)
            ),
        )),
    }
}
