// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

mod args;

pub use args::{Args, Command, OutputFormat, ResourceArgs};

use k8search::config::Config;

impl ResourceArgs {
    /// Overlay the flags that were given onto `config`
    pub fn apply(&self, config: &mut Config) {
        if let Some(group) = &self.group {
            config.group = group.clone();
        }
        if let Some(version) = &self.api_version {
            config.version = version.clone();
        }
        if let Some(resource) = &self.resource {
            config.resource = resource.clone();
        }
        if let Some(index) = &self.index {
            config.index = Some(index.clone());
        }
    }
}
