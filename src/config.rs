// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Configuration persistence for k8search
//!
//! Stores the search endpoint and the resource type queries are compiled
//! for, so they don't have to be repeated on every invocation.
//! All k8search data is stored under ~/.k8search/:
//! - ~/.k8search/config.json - user configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::storage::StorageVersion;

/// Endpoint used when none is configured
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:9200";

/// Get the base k8search directory (~/.k8search/)
pub fn base_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|p| p.join(".k8search"))
        .context("Could not determine home directory")
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_version() -> String {
    "v1".to_string()
}

fn default_resource() -> String {
    "pods".to_string()
}

/// k8search configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Search engine base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Index holding the configured resource; derived from it when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    /// API group of the resource ("" for the core group)
    #[serde(default)]
    pub group: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_resource")]
    pub resource: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            index: None,
            group: String::new(),
            version: default_version(),
            resource: default_resource(),
        }
    }
}

impl Config {
    /// Load config from disk, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Get the config file path (~/.k8search/config.json)
    pub fn config_path() -> Result<PathBuf> {
        Ok(base_dir()?.join("config.json"))
    }

    pub fn storage_version(&self) -> StorageVersion {
        StorageVersion::new(&self.group, &self.version, &self.resource)
    }

    /// Configured index, or `<resource>` / `<resource>.<group>` when unset
    pub fn index_name(&self) -> String {
        match &self.index {
            Some(index) => index.clone(),
            None if self.group.is_empty() => self.resource.clone(),
            None => format!("{}.{}", self.resource, self.group),
        }
    }
}
