//! CLI command definitions
//!
//! All CLI structs and subcommand enums are defined here.

use clap::{Parser, Subcommand};
use cms_hydrate::ExecutionMode;
use std::path::PathBuf;

/// cms-hydrate - GraphQL client provisioning and cache hydration
#[derive(Parser, Debug)]
#[command(name = "cms-hydrate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (default: ~/.config/cms-hydrate/config.yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// GraphQL endpoint URL (overrides STRAPI_URL and config)
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Show debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge an incoming snapshot into an existing one and print the result
    Merge {
        /// Snapshot currently held by the cache (JSON file)
        existing: PathBuf,

        /// Snapshot arriving from the server render (JSON file)
        incoming: PathBuf,
    },

    /// Provision clients for a sequence of page props within one render scope
    Hydrate {
        /// Execution mode (browser, server)
        #[arg(short, long, default_value = "browser")]
        mode: ExecutionMode,

        /// Page props files (JSON), processed in order
        #[arg(required = true)]
        props: Vec<PathBuf>,
    },

    /// Run a query through a provisioned client
    Query {
        /// GraphQL query text
        query: String,

        /// Execution mode (browser, server)
        #[arg(short, long, default_value = "server")]
        mode: ExecutionMode,

        /// Query variables as a JSON object
        #[arg(long)]
        variables: Option<String>,

        /// Operation name
        #[arg(short = 'n', long)]
        operation_name: Option<String>,

        /// Page props to hydrate from before querying (JSON file)
        #[arg(short, long)]
        props: Option<PathBuf>,

        /// Always hit the network (downgraded to cache-first in SSR mode)
        #[arg(long)]
        network_only: bool,

        /// Print the page props with the resulting cache attached instead of the data
        #[arg(long)]
        emit_props: bool,
    },

    /// Print the effective configuration
    Config,
}
