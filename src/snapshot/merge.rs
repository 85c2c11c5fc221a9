//! Deep merge of cache snapshots
//!
//! Objects merge key by key, arrays merge as a set union under deep equality,
//! and on any other collision the value from the existing cache is kept.

use super::CacheSnapshot;
use serde_json::Value;

/// Merge `incoming` hydration state with the `existing` cache contents
///
/// - keys present on one side only are copied as-is
/// - two objects merge recursively
/// - two arrays merge through [`merge_sequences`]
/// - anything else (two scalars, or mismatched kinds) keeps the existing value
pub fn merge_snapshots(incoming: &CacheSnapshot, existing: &CacheSnapshot) -> CacheSnapshot {
    merge_objects(incoming.clone(), existing)
}

/// Set union of two sequences under deep equality
///
/// Existing elements that also appear in `incoming` are dropped; the remaining
/// existing elements come first, followed by all of `incoming` in order.
/// Stale existing elements therefore stay ahead of incoming ones, even when the
/// server reorders the list between renders.
pub fn merge_sequences(existing: &[Value], incoming: &[Value]) -> Vec<Value> {
    existing
        .iter()
        .filter(|item| !incoming.contains(*item))
        .chain(incoming.iter())
        .cloned()
        .collect()
}

fn merge_objects(mut merged: CacheSnapshot, existing: &CacheSnapshot) -> CacheSnapshot {
    for (key, existing_value) in existing {
        let value = match merged.remove(key) {
            Some(incoming_value) => merge_values(incoming_value, existing_value),
            None => existing_value.clone(),
        };
        merged.insert(key.clone(), value);
    }
    merged
}

fn merge_values(incoming: Value, existing: &Value) -> Value {
    match (incoming, existing) {
        (Value::Object(incoming), Value::Object(existing)) => {
            Value::Object(merge_objects(incoming, existing))
        }
        (Value::Array(incoming), Value::Array(existing)) => {
            Value::Array(merge_sequences(existing, &incoming))
        }
        (_, existing) => existing.clone(),
    }
}
