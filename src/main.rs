// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use tokio::io::AsyncReadExt;
use tracing::debug;
use tracing_subscriber::prelude::*;

use cli::{Args, Command, OutputFormat};
use k8search::config::Config;
use k8search::{ElasticsearchClient, ListOptions, PreResolvedOwners, ResourceStorage};

/// Initialize logging to stderr, keeping stdout for query output
fn init_logging(verbose: bool) {
    let filter = if verbose {
        "k8search=debug"
    } else {
        "k8search=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // Flags override saved settings for this run only
    let mut config = Config::load()?;

    match args.command {
        Command::Compile {
            file,
            owner_ids,
            output,
            resource,
        } => {
            resource.apply(&mut config);
            run_compile(&config, file.as_deref(), owner_ids, &output).await
        }
        Command::EnsureIndex {
            mapping,
            endpoint,
            resource,
        } => {
            resource.apply(&mut config);
            if let Some(endpoint) = endpoint {
                config.endpoint = endpoint;
            }
            run_ensure_index(&config, &mapping).await
        }
        Command::Config { endpoint, resource } => {
            resource.apply(&mut config);
            if let Some(endpoint) = endpoint {
                config.endpoint = endpoint;
            }
            config.save()?;
            println!(
                "{}",
                serde_json::to_string_pretty(&config).context("Failed to serialize config")?
            );
            Ok(())
        }
    }
}

async fn read_list_options(file: Option<&Path>) -> Result<ListOptions> {
    let content = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read list options: {}", path.display()))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("Failed to read list options from stdin")?;
            buf
        }
    };

    if content.trim().is_empty() {
        return Ok(ListOptions::default());
    }
    serde_json::from_str(&content).context("Failed to parse list options")
}

async fn run_compile(
    config: &Config,
    file: Option<&Path>,
    owner_ids: Vec<String>,
    output: &OutputFormat,
) -> Result<()> {
    let opts = read_list_options(file).await?;
    let storage = ResourceStorage::new(config.storage_version(), config.index_name());
    debug!(index = storage.index(), resource = %config.resource, "Compiling list query");

    let query = storage
        .list_query(&PreResolvedOwners(owner_ids), &opts)
        .await?;

    let rendered = match output {
        OutputFormat::Json => query.to_json_pretty()?,
        OutputFormat::Yaml => query.to_yaml()?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

async fn run_ensure_index(config: &Config, mapping: &Path) -> Result<()> {
    let mapping = std::fs::read_to_string(mapping)
        .with_context(|| format!("Failed to read mapping file: {}", mapping.display()))?;
    serde_json::from_str::<serde_json::Value>(&mapping).context("Mapping is not valid JSON")?;

    let client = ElasticsearchClient::new(&config.endpoint)?;
    let storage = ResourceStorage::new(config.storage_version(), config.index_name());
    storage
        .ensure_index(&client, &mapping)
        .await
        .with_context(|| format!("Failed to ensure index '{}'", storage.index()))?;

    println!("index {} ready", storage.index());
    Ok(())
}
