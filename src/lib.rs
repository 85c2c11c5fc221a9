//! cms-hydrate - GraphQL client provisioning for server-rendered CMS pages
//!
//! Hands out GraphQL clients to a page-rendering pipeline and hydrates their
//! normalized caches from state produced by an earlier server render.
//!
//! # Architecture
//!
//! - **provisioner**: One client per browser session, a fresh one per server render
//! - **hydration**: Page props hand-off and per-render client memoization
//! - **snapshot**: Deep merge of cache snapshots
//! - **config**: Endpoint and request settings
//! - **logging**: tracing subscriber setup

pub mod config;
pub mod error;
pub mod hydration;
pub mod logging;
pub mod provisioner;
pub mod snapshot;

// Re-exports
pub use error::{HydrateError, Result};
pub use hydration::{attach_cache_state, use_client_for_page, HydrationScope, PageProps};
pub use provisioner::{ClientProvisioner, ExecutionMode};
pub use snapshot::{merge_sequences, merge_snapshots, CacheSnapshot};
