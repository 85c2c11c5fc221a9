//! Page props and the hydration hand-off key

use crate::snapshot::CacheSnapshot;
use crate::{HydrateError, Result};
use gql_client::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Prop under which a serialized cache snapshot travels from server to browser
pub const HYDRATION_PROP_KEY: &str = "__APOLLO_STRAPI__";

/// Props handed to a page by the rendering framework
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageProps(Map<String, Value>);

impl PageProps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value; only objects are valid props
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(HydrateError::Parse(format!(
                "page props must be a JSON object, got {}",
                kind(&other)
            ))),
        }
    }

    /// Read props from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "Loading page props");

        let content = fs::read_to_string(path)?;
        Self::from_value(serde_json::from_str(&content)?)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// The hydration snapshot carried by these props
    ///
    /// Absent, `null`, or non-object values all mean "nothing to hydrate".
    pub fn snapshot(&self) -> Option<CacheSnapshot> {
        match self.0.get(HYDRATION_PROP_KEY) {
            Some(Value::Object(snapshot)) => Some(snapshot.clone()),
            None | Some(Value::Null) => None,
            Some(other) => {
                tracing::debug!(
                    key = HYDRATION_PROP_KEY,
                    kind = kind(other),
                    "Ignoring malformed hydration state"
                );
                None
            }
        }
    }
}

impl From<Map<String, Value>> for PageProps {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Store `client`'s cache in `props` so a later render can hydrate from it
pub fn attach_cache_state(client: &Client, props: &mut PageProps) {
    let snapshot = client.extract();
    tracing::debug!(entities = snapshot.len(), "Attaching cache state to page props");
    props.insert(HYDRATION_PROP_KEY, Value::Object(snapshot));
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::NamedTempFile;

    #[test]
    fn test_snapshot_present() {
        let props = PageProps::from_value(json!({
            "title": "Home",
            "__APOLLO_STRAPI__": {"Article:1": {"id": 1}}
        }))
        .unwrap();

        let snapshot = props.snapshot().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot["Article:1"], json!({"id": 1}));
    }

    #[test]
    fn test_snapshot_absent_or_null() {
        assert!(PageProps::new().snapshot().is_none());

        let props = PageProps::from_value(json!({"__APOLLO_STRAPI__": null})).unwrap();
        assert!(props.snapshot().is_none());
    }

    #[test]
    fn test_malformed_snapshot_is_ignored() {
        for bad in [json!("state"), json!([1, 2]), json!(42), json!(true)] {
            let mut props = PageProps::new();
            props.insert(HYDRATION_PROP_KEY, bad);
            assert!(props.snapshot().is_none());
        }
    }

    #[test]
    fn test_props_must_be_object() {
        let err = PageProps::from_value(json!([1])).unwrap_err();
        assert!(matches!(err, HydrateError::Parse(_)));
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_attach_cache_state() {
        let client = Client::builder().build();
        client.cache().write_root_field("nav", json!({"id": 7}));

        let mut props = PageProps::from_value(json!({"title": "Home"})).unwrap();
        attach_cache_state(&client, &mut props);

        assert_eq!(props.get("title"), Some(&json!("Home")));
        assert_eq!(props.snapshot(), Some(client.extract()));
    }

    #[test]
    fn test_load_from_file() {
        let file = NamedTempFile::new().unwrap();
        fs::write(
            file.path(),
            r#"{"slug": "about", "__APOLLO_STRAPI__": {"Page:about": {"id": "about"}}}"#,
        )
        .unwrap();

        let props = PageProps::load(file.path()).unwrap();
        assert_eq!(props.get("slug"), Some(&json!("about")));
        assert!(props.snapshot().is_some());
    }

    #[test]
    fn test_serializes_transparently() {
        let props = PageProps::from_value(json!({"a": 1})).unwrap();
        assert_eq!(serde_json::to_value(&props).unwrap(), json!({"a": 1}));
    }
}
