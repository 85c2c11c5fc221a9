//! Configuration system
//!
//! Loads ~/.config/cms-hydrate/config.yaml. The GraphQL endpoint can be
//! overridden through the `STRAPI_URL` environment variable.

mod hydrate_config;

pub use hydrate_config::{HydrateConfig, ENDPOINT_ENV_VAR};
