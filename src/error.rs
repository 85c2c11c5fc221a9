//! Error types for cms-hydrate
//!
//! Provisioning itself never fails; these cover configuration, page props
//! parsing, and requests issued through a provisioned client.

use thiserror::Error;

/// Result type alias for cms-hydrate operations
pub type Result<T> = std::result::Result<T, HydrateError>;

/// Error type for cms-hydrate operations
#[derive(Error, Debug)]
pub enum HydrateError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Page props or snapshot parsing errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Errors raised by the GraphQL client when a request is issued
    #[error("GraphQL client error: {0}")]
    Client(#[from] gql_client::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),

    /// Anyhow errors (for more context)
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

impl HydrateError {
    /// Whether the failure came from the GraphQL endpoint not being configured
    pub fn is_missing_endpoint(&self) -> bool {
        matches!(self, HydrateError::Client(gql_client::Error::MissingEndpoint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_conversion() {
        let err: HydrateError = gql_client::Error::MissingEndpoint.into();
        assert!(err.is_missing_endpoint());
        assert_eq!(
            err.to_string(),
            "GraphQL client error: No GraphQL endpoint configured"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = HydrateError::Config("bad endpoint".to_string());
        assert!(!err.is_missing_endpoint());
        assert_eq!(err.to_string(), "Configuration error: bad endpoint");
    }
}
