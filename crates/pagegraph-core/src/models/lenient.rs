//! Fail-soft serde helpers.
//!
//! Record maps are denormalized and loosely typed. A field whose shape does
//! not match the expected type is treated as absent instead of failing the
//! whole record map.

use std::collections::{BTreeMap, HashMap};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize `Option<T>`, mapping any shape mismatch to `None`.
pub(crate) fn option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Deserialize `T: Default`, mapping any shape mismatch to `T::default()`.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Deserialize a list, keeping each element that parses as `T` and replacing
/// the others with `None`. Positions are preserved for index alignment.
pub(crate) fn aligned_vec<'de, D, T>(deserializer: D) -> Result<Vec<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Deserialize a string-keyed map, dropping entries whose value does not
/// parse as `T` instead of rejecting the whole map.
pub(crate) fn filtered_map<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(entries) => entries
            .into_iter()
            .filter_map(|(key, item)| serde_json::from_value(item).ok().map(|v| (key, v)))
            .collect(),
        _ => BTreeMap::new(),
    })
}

/// Deserialize a two-level string-keyed map, dropping each inner entry that
/// does not parse as `T` and each outer entry that is not an object.
pub(crate) fn nested_map<'de, D, T>(
    deserializer: D,
) -> Result<HashMap<String, HashMap<String, T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Object(outer) = value else {
        return Ok(HashMap::new());
    };
    Ok(outer
        .into_iter()
        .filter_map(|(key, inner)| match inner {
            Value::Object(entries) => Some((
                key,
                entries
                    .into_iter()
                    .filter_map(|(k, item)| serde_json::from_value(item).ok().map(|v| (k, v)))
                    .collect(),
            )),
            _ => None,
        })
        .collect())
}
