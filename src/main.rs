//! cms-hydrate - GraphQL client provisioning and cache hydration
//!
//! Main entry point for the cms-hydrate CLI.

mod commands;

use anyhow::Context;
use clap::Parser;
use cms_hydrate::config::HydrateConfig;
use cms_hydrate::hydration::{attach_cache_state, PageProps};
use cms_hydrate::snapshot::{merge_snapshots, CacheSnapshot};
use cms_hydrate::{ClientProvisioner, ExecutionMode, HydrateError, Result};
use commands::{Cli, Commands};
use gql_client::{FetchPolicy, Operation};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    if let Err(e) = cms_hydrate::logging::init_with_default(default_filter) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        if e.is_missing_endpoint() {
            eprintln!("Set STRAPI_URL, pass --endpoint, or add `endpoint:` to the config file.");
        }
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?
        .with_env_overrides()
        .with_endpoint_override(cli.endpoint);

    match cli.command {
        Commands::Merge { existing, incoming } => handle_merge(&existing, &incoming),
        Commands::Hydrate { mode, props } => handle_hydrate(&config, mode, &props),
        Commands::Query {
            query,
            mode,
            variables,
            operation_name,
            props,
            network_only,
            emit_props,
        } => {
            let operation = build_operation(query, variables.as_deref(), operation_name)?;
            let policy = if network_only {
                FetchPolicy::NetworkOnly
            } else {
                config.default_fetch_policy
            };

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(handle_query(
                &config,
                mode,
                &operation,
                policy,
                props.as_deref(),
                emit_props,
            ))
        }
        Commands::Config => handle_config(&config, cli.config.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<HydrateConfig> {
    match path {
        Some(path) => HydrateConfig::load(path),
        None => HydrateConfig::load_or_default(HydrateConfig::default_path()),
    }
}

fn read_snapshot(path: &Path) -> Result<CacheSnapshot> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;

    match serde_json::from_str::<Value>(&content)? {
        Value::Object(snapshot) => Ok(snapshot),
        _ => Err(HydrateError::Parse(format!(
            "{} does not contain a JSON object",
            path.display()
        ))),
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn handle_merge(existing: &Path, incoming: &Path) -> Result<()> {
    let existing = read_snapshot(existing)?;
    let incoming = read_snapshot(incoming)?;

    print_json(&merge_snapshots(&incoming, &existing))
}

fn handle_hydrate(config: &HydrateConfig, mode: ExecutionMode, paths: &[PathBuf]) -> Result<()> {
    let provisioner = ClientProvisioner::from_config(config, mode);
    let mut scope = provisioner.scope();
    let mut previous = None;

    for (index, path) in paths.iter().enumerate() {
        let props = PageProps::load(path)
            .with_context(|| format!("Failed to load page props {}", path.display()))?;

        let client = scope.client_for_page(&props);
        let reused = previous
            .as_ref()
            .is_some_and(|prev| Arc::ptr_eq(prev, &client));

        eprintln!(
            "page {} ({}): {} client, {} cache entries",
            index + 1,
            path.display(),
            if reused { "reused" } else { "new" },
            client.cache().len()
        );

        previous = Some(client);
    }

    match previous {
        Some(client) => print_json(&client.extract()),
        None => Ok(()),
    }
}

fn build_operation(
    query: String,
    variables: Option<&str>,
    operation_name: Option<String>,
) -> Result<Operation> {
    let mut operation = Operation::new(query);

    if let Some(raw) = variables {
        let variables: Map<String, Value> = serde_json::from_str(raw)
            .map_err(|e| HydrateError::Parse(format!("--variables must be a JSON object: {}", e)))?;
        operation = operation.with_variables(variables);
    }

    if let Some(name) = operation_name {
        operation = operation.with_operation_name(name);
    }

    Ok(operation)
}

async fn handle_query(
    config: &HydrateConfig,
    mode: ExecutionMode,
    operation: &Operation,
    policy: FetchPolicy,
    props_path: Option<&Path>,
    emit_props: bool,
) -> Result<()> {
    let mut props = match props_path {
        Some(path) => PageProps::load(path)?,
        None => PageProps::new(),
    };

    let provisioner = ClientProvisioner::from_config(config, mode);
    let client = provisioner.initialize(props.snapshot().as_ref());

    tracing::info!(
        mode = %mode,
        policy = %policy,
        key = %operation.store_key(),
        "Running query"
    );

    let data = client.query(operation, policy).await?;

    if emit_props {
        attach_cache_state(&client, &mut props);
        print_json(&props)
    } else {
        print_json(&data)
    }
}

fn handle_config(config: &HydrateConfig, path: Option<&Path>) -> Result<()> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(HydrateConfig::default_path);

    println!("# {}", path.display());
    print!("{}", serde_yaml::to_string(config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_json(dir: &TempDir, name: &str, value: Value) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, value.to_string()).unwrap();
        path
    }

    #[test]
    fn test_build_operation() {
        let op = build_operation(
            "query Page { page { id } }".to_string(),
            Some(r#"{"slug": "home"}"#),
            Some("Page".to_string()),
        )
        .unwrap();

        assert_eq!(op.operation_name.as_deref(), Some("Page"));
        assert_eq!(op.variables.get("slug"), Some(&json!("home")));
        assert_eq!(op.store_key(), r#"Page({"slug":"home"})"#);
    }

    #[test]
    fn test_build_operation_rejects_non_object_variables() {
        let err = build_operation("{ a }".to_string(), Some("[1, 2]"), None).unwrap_err();
        assert!(matches!(err, HydrateError::Parse(_)));
    }

    #[test]
    fn test_read_snapshot() {
        let dir = TempDir::new().unwrap();
        let good = write_json(&dir, "good.json", json!({"Article:1": {"id": 1}}));
        let bad = write_json(&dir, "bad.json", json!([1]));

        assert_eq!(read_snapshot(&good).unwrap().len(), 1);
        assert!(matches!(read_snapshot(&bad), Err(HydrateError::Parse(_))));
        assert!(read_snapshot(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_handle_merge() {
        let dir = TempDir::new().unwrap();
        let existing = write_json(&dir, "existing.json", json!({"A": [1, 2]}));
        let incoming = write_json(&dir, "incoming.json", json!({"A": [2, 3]}));

        handle_merge(&existing, &incoming).unwrap();
        assert!(handle_merge(&existing, &dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_handle_hydrate() {
        let dir = TempDir::new().unwrap();
        let first = write_json(&dir, "a.json", json!({"__APOLLO_STRAPI__": {"A": {"id": 1}}}));
        let second = write_json(&dir, "b.json", json!({"__APOLLO_STRAPI__": {"B": {"id": 2}}}));

        let config = HydrateConfig::new();
        handle_hydrate(&config, ExecutionMode::Browser, &[first.clone(), second]).unwrap();

        let not_props = write_json(&dir, "c.json", json!("props"));
        assert!(handle_hydrate(&config, ExecutionMode::Server, &[first, not_props]).is_err());
    }

    #[test]
    fn test_handle_query_without_endpoint() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let err = runtime
            .block_on(handle_query(
                &HydrateConfig::new(),
                ExecutionMode::Server,
                &Operation::new("{ a }"),
                FetchPolicy::CacheFirst,
                None,
                false,
            ))
            .unwrap_err();

        assert!(err.is_missing_endpoint());
    }

    #[test]
    fn test_load_config_from_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "endpoint: https://cms.example.com/graphql\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.endpoint.as_deref(), Some("https://cms.example.com/graphql"));
        assert!(load_config(Some(&dir.path().join("missing.yaml"))).is_err());
    }
}
