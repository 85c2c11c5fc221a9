//! Client provisioning
//!
//! A [`ClientProvisioner`] is created once at the application entry point with
//! an explicit [`ExecutionMode`], then asked for clients:
//!
//! - **Browser**: the first call builds a client and keeps it; every later
//!   call returns that same client, folding any new initial state into its cache.
//! - **Server**: every call builds a fresh client that is never retained, so
//!   no cache state crosses requests.
//!
//! # Example
//!
//! ```
//! use cms_hydrate::provisioner::{ClientProvisioner, ExecutionMode};
//! use std::sync::Arc;
//!
//! let provisioner = ClientProvisioner::new(ExecutionMode::Browser, None);
//! let first = provisioner.initialize(None);
//! let second = provisioner.initialize(None);
//! assert!(Arc::ptr_eq(&first, &second));
//! ```

mod mode;

pub use mode::ExecutionMode;

use crate::config::HydrateConfig;
use crate::hydration::HydrationScope;
use crate::snapshot::{merge_snapshots, CacheSnapshot};
use gql_client::{Client, HttpLink};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// Default request timeout for provisioned clients
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Hands out GraphQL clients for one application session
#[derive(Debug)]
pub struct ClientProvisioner {
    mode: ExecutionMode,
    endpoint: Option<String>,
    request_timeout: Duration,
    /// Browser-mode client; set once, never replaced
    singleton: OnceLock<Arc<Client>>,
}

impl ClientProvisioner {
    /// Create a provisioner whose clients talk to `endpoint`
    ///
    /// The endpoint is not validated; a missing one is reported by the first
    /// request issued through a client.
    pub fn new(mode: ExecutionMode, endpoint: Option<String>) -> Self {
        Self {
            mode,
            endpoint,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            singleton: OnceLock::new(),
        }
    }

    /// Create a provisioner from loaded configuration
    pub fn from_config(config: &HydrateConfig, mode: ExecutionMode) -> Self {
        Self::new(mode, config.endpoint.clone()).with_request_timeout(config.request_timeout())
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// The retained browser client, if one has been provisioned
    pub fn singleton(&self) -> Option<Arc<Client>> {
        self.singleton.get().cloned()
    }

    /// Obtain a client, hydrating its cache with `initial_state` when given
    ///
    /// The incoming state is deep-merged with whatever the client already
    /// holds (see [`merge_snapshots`]) and the result replaces the cache
    /// contents.
    pub fn initialize(&self, initial_state: Option<&CacheSnapshot>) -> Arc<Client> {
        let client = match self.mode {
            ExecutionMode::Server => self.create_client(),
            ExecutionMode::Browser => Arc::clone(self.singleton.get_or_init(|| {
                tracing::debug!("Creating browser client");
                self.create_client()
            })),
        };

        if let Some(state) = initial_state {
            hydrate(&client, state);
        }

        client
    }

    /// Start a render scope that memoizes clients for page props
    pub fn scope(&self) -> HydrationScope<'_> {
        HydrationScope::new(self)
    }

    fn create_client(&self) -> Arc<Client> {
        tracing::debug!(
            mode = %self.mode,
            endpoint = self.endpoint.as_deref().unwrap_or("<unset>"),
            "Constructing GraphQL client"
        );

        let link = HttpLink::with_timeout(self.endpoint.clone(), self.request_timeout);
        Arc::new(
            Client::builder()
                .link(link)
                .ssr_mode(self.mode.is_server())
                .build(),
        )
    }
}

fn hydrate(client: &Client, state: &CacheSnapshot) {
    let existing = client.extract();
    let merged = merge_snapshots(state, &existing);

    tracing::debug!(
        incoming = state.len(),
        existing = existing.len(),
        merged = merged.len(),
        "Hydrating client cache"
    );

    client.restore(merged);
}
