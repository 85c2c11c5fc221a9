//! Minimal GraphQL client for Rust
//!
//! An HTTP transport link, a normalized in-memory cache that can be extracted
//! and restored wholesale, and a client tying the two together.
//!
//! # Example
//!
//! ```no_run
//! use gql_client::{Client, FetchPolicy, HttpLink, Operation};
//!
//! # async fn run() -> gql_client::Result<()> {
//! let client = Client::builder()
//!     .link(HttpLink::new(Some("https://cms.example.com/graphql".to_string())))
//!     .ssr_mode(false)
//!     .build();
//!
//! let articles = client
//!     .query(&Operation::new("{ articles { id title } }"), FetchPolicy::CacheFirst)
//!     .await?;
//! println!("{}", articles);
//!
//! // Snapshot the cache for hand-off to another client
//! let snapshot = client.extract();
//! # let _ = snapshot;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use thiserror::Error;

/// Root entity under which query results are stored
pub const ROOT_QUERY: &str = "ROOT_QUERY";

/// Serializable normalized cache contents, keyed by entity identity
pub type NormalizedCacheObject = Map<String, Value>;

/// Errors that can occur when talking to a GraphQL endpoint
#[derive(Error, Debug)]
pub enum Error {
    #[error("No GraphQL endpoint configured")]
    MissingEndpoint,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("GraphQL errors: {}", join_messages(.0))]
    GraphQL(Vec<GraphQLError>),

    #[error("Response carried no data for {0}")]
    EmptyResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, Error>;

fn join_messages(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// A single entry of a GraphQL `errors` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

/// Response body of a GraphQL request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphQLResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQLError>,
}

/// A GraphQL operation as sent over the wire
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub query: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub variables: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

impl Operation {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: Map::new(),
            operation_name: None,
        }
    }

    pub fn with_variables(mut self, variables: Map<String, Value>) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Key of the `ROOT_QUERY` field holding this operation's result
    ///
    /// Named operations use their name, anonymous ones their whitespace-collapsed
    /// query text. Variables are appended as canonical JSON (object keys sorted).
    pub fn store_key(&self) -> String {
        let base = match &self.operation_name {
            Some(name) => name.clone(),
            None => format!(
                "query:{}",
                self.query.split_whitespace().collect::<Vec<_>>().join(" ")
            ),
        };

        if self.variables.is_empty() {
            base
        } else {
            format!("{}({})", base, Value::Object(self.variables.clone()))
        }
    }
}

/// How a query consults the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchPolicy {
    /// Serve from the cache when present, otherwise fetch and store
    #[default]
    CacheFirst,
    /// Always fetch, then store
    NetworkOnly,
}

impl std::fmt::Display for FetchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchPolicy::CacheFirst => write!(f, "cache-first"),
            FetchPolicy::NetworkOnly => write!(f, "network-only"),
        }
    }
}

/// Normalized in-memory cache
///
/// Shared by reference; every accessor takes `&self`.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    data: RwLock<NormalizedCacheObject>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache pre-populated with a snapshot
    pub fn from_snapshot(snapshot: NormalizedCacheObject) -> Self {
        Self {
            data: RwLock::new(snapshot),
        }
    }

    /// Copy of the current contents
    pub fn extract(&self) -> NormalizedCacheObject {
        self.read().clone()
    }

    /// Replace the contents entirely
    pub fn restore(&self, snapshot: NormalizedCacheObject) {
        *self.write() = snapshot;
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Number of top-level entities
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn read_root_field(&self, key: &str) -> Option<Value> {
        self.read().get(ROOT_QUERY)?.get(key).cloned()
    }

    pub fn write_root_field(&self, key: impl Into<String>, value: Value) {
        let mut data = self.write();
        let root = data
            .entry(ROOT_QUERY)
            .or_insert_with(|| Value::Object(Map::new()));
        if !root.is_object() {
            *root = Value::Object(Map::new());
        }
        if let Value::Object(fields) = root {
            fields.insert(key.into(), value);
        }
    }

    // A panic while holding the lock leaves plain JSON behind, still usable.
    fn read(&self) -> RwLockReadGuard<'_, NormalizedCacheObject> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, NormalizedCacheObject> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Transport that carries an operation to a GraphQL server
#[async_trait]
pub trait Link: Send + Sync + std::fmt::Debug {
    async fn request(&self, operation: &Operation) -> Result<GraphQLResponse>;
}

/// Link that POSTs operations as JSON to a single endpoint
///
/// The endpoint is optional at construction; a missing one is reported when a
/// request is issued.
#[derive(Debug, Clone)]
pub struct HttpLink {
    uri: Option<String>,
    client: reqwest::Client,
}

impl HttpLink {
    pub fn new(uri: Option<String>) -> Self {
        Self {
            uri,
            client: reqwest::Client::new(),
        }
    }

    /// Create a link whose requests time out after `timeout`
    pub fn with_timeout(uri: Option<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self { uri, client }
    }

    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }
}

#[async_trait]
impl Link for HttpLink {
    async fn request(&self, operation: &Operation) -> Result<GraphQLResponse> {
        let uri = self
            .uri
            .as_deref()
            .filter(|uri| !uri.trim().is_empty())
            .ok_or(Error::MissingEndpoint)?;

        tracing::debug!(
            uri,
            operation = operation.operation_name.as_deref().unwrap_or("<anonymous>"),
            "Sending GraphQL request"
        );

        let response = self.client.post(uri).json(operation).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<GraphQLResponse>().await?)
    }
}

/// GraphQL client: a link plus a cache
#[derive(Debug)]
pub struct Client {
    link: Arc<dyn Link>,
    cache: InMemoryCache,
    ssr_mode: bool,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn cache(&self) -> &InMemoryCache {
        &self.cache
    }

    pub fn link(&self) -> &Arc<dyn Link> {
        &self.link
    }

    /// Whether this client was built for server-side rendering
    pub fn ssr_mode(&self) -> bool {
        self.ssr_mode
    }

    /// Snapshot of the cache contents
    pub fn extract(&self) -> NormalizedCacheObject {
        self.cache.extract()
    }

    /// Replace the cache contents with `snapshot`
    pub fn restore(&self, snapshot: NormalizedCacheObject) {
        self.cache.restore(snapshot);
    }

    /// Run a query and return its `data`
    ///
    /// In SSR mode network-only fetches are downgraded to cache-first, so a
    /// server render never refetches what it already holds.
    pub async fn query(&self, operation: &Operation, policy: FetchPolicy) -> Result<Value> {
        let policy = if self.ssr_mode && policy == FetchPolicy::NetworkOnly {
            tracing::debug!("Network-only fetch disabled in SSR mode, using cache-first");
            FetchPolicy::CacheFirst
        } else {
            policy
        };

        let key = operation.store_key();

        if policy == FetchPolicy::CacheFirst {
            if let Some(cached) = self.cache.read_root_field(&key) {
                tracing::debug!(key = %key, "Cache hit");
                return Ok(cached);
            }
        }

        let response = self.link.request(operation).await?;
        if !response.errors.is_empty() {
            tracing::warn!(key = %key, errors = response.errors.len(), "Query returned errors");
            return Err(Error::GraphQL(response.errors));
        }

        let data = response.data.ok_or_else(|| Error::EmptyResponse(key.clone()))?;
        self.cache.write_root_field(key, data.clone());

        Ok(data)
    }
}

/// Builder for [`Client`]
#[derive(Debug, Default)]
pub struct ClientBuilder {
    link: Option<Arc<dyn Link>>,
    cache: Option<InMemoryCache>,
    ssr_mode: bool,
}

impl ClientBuilder {
    pub fn link(mut self, link: impl Link + 'static) -> Self {
        self.link = Some(Arc::new(link));
        self
    }

    /// Use an already shared link
    pub fn shared_link(mut self, link: Arc<dyn Link>) -> Self {
        self.link = Some(link);
        self
    }

    pub fn cache(mut self, cache: InMemoryCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn ssr_mode(mut self, ssr_mode: bool) -> Self {
        self.ssr_mode = ssr_mode;
        self
    }

    /// Build the client; without a link it gets an endpoint-less [`HttpLink`]
    pub fn build(self) -> Client {
        Client {
            link: self
                .link
                .unwrap_or_else(|| Arc::new(HttpLink::new(None))),
            cache: self.cache.unwrap_or_default(),
            ssr_mode: self.ssr_mode,
        }
    }
}
