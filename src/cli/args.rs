// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "k8search")]
#[command(
    author,
    version,
    about = "Compile Kubernetes list requests into search engine queries"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Resource type overrides, falling back to the saved config
#[derive(ClapArgs, Debug, Default, Clone)]
pub struct ResourceArgs {
    /// API group of the resource ("" for core)
    #[arg(long)]
    pub group: Option<String>,

    /// API version of the resource
    #[arg(long, value_name = "VERSION")]
    pub api_version: Option<String>,

    /// Resource name (plural, e.g. "pods")
    #[arg(long)]
    pub resource: Option<String>,

    /// Index name
    #[arg(long)]
    pub index: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile list options (JSON) into a search query
    Compile {
        /// File with list options; reads stdin when omitted
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Pre-resolved owner identifier (repeatable)
        #[arg(long = "owner-id", value_name = "UID")]
        owner_ids: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        output: OutputFormat,

        #[command(flatten)]
        resource: ResourceArgs,
    },

    /// Create the resource index unless it already exists
    EnsureIndex {
        /// File with the index mapping (JSON)
        #[arg(short, long)]
        mapping: PathBuf,

        /// Search engine URL
        #[arg(short, long)]
        endpoint: Option<String>,

        #[command(flatten)]
        resource: ResourceArgs,
    },

    /// Update and save default settings
    Config {
        /// Search engine URL
        #[arg(short, long)]
        endpoint: Option<String>,

        #[command(flatten)]
        resource: ResourceArgs,
    },
}

#[derive(ValueEnum, Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compile() {
        let args = Args::parse_from([
            "k8search",
            "compile",
            "-f",
            "opts.json",
            "--owner-id",
            "a",
            "--owner-id",
            "b",
            "-o",
            "yaml",
            "--resource",
            "deployments",
            "--group",
            "apps",
        ]);
        match args.command {
            Command::Compile {
                file,
                owner_ids,
                output,
                resource,
            } => {
                assert_eq!(file, Some(PathBuf::from("opts.json")));
                assert_eq!(owner_ids, vec!["a", "b"]);
                assert!(matches!(output, OutputFormat::Yaml));
                assert_eq!(resource.resource.as_deref(), Some("deployments"));
                assert_eq!(resource.group.as_deref(), Some("apps"));
                assert!(resource.api_version.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_ensure_index_verbose() {
        let args = Args::parse_from([
            "k8search",
            "ensure-index",
            "--mapping",
            "mapping.json",
            "--index",
            "pods",
            "-v",
        ]);
        assert!(args.verbose);
        assert!(matches!(args.command, Command::EnsureIndex { .. }));
    }

    #[test]
    fn test_command_required() {
        assert!(Args::try_parse_from(["k8search"]).is_err());
    }
}
