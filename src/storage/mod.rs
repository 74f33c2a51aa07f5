// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Resource storage backed by a search engine index
//!
//! A [`ResourceStorage`] serves one resource type. Every query it compiles is
//! pinned to that type's group, version and resource, and may be narrowed to
//! the children of an owner when a single cluster is targeted.

mod index;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{QueryError, Result};
use crate::query::{CompiledQuery, Expression, LogicalField, QueryBuilder, apply_list_options};
use crate::selector::ListOptions;

pub use index::{ElasticsearchClient, IndexLifecycle, check_create_index_response};

/// The resource type a storage is pinned to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageVersion {
    pub group: String,
    pub version: String,
    pub resource: String,
}

impl StorageVersion {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            resource: resource.into(),
        }
    }
}

/// Resolves owner UID / name constraints of a request to owner identifiers
#[async_trait]
pub trait OwnerResolver: Send + Sync {
    async fn resolve_owner_ids(&self, opts: &ListOptions) -> Result<Vec<String>>;
}

/// Owner identifiers resolved ahead of time by the caller
#[derive(Debug, Clone, Default)]
pub struct PreResolvedOwners(pub Vec<String>);

#[async_trait]
impl OwnerResolver for PreResolvedOwners {
    async fn resolve_owner_ids(&self, _opts: &ListOptions) -> Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

/// Owner filtering only applies to requests against exactly one cluster
fn wants_owner_filter(opts: &ListOptions) -> bool {
    opts.cluster_names.len() == 1 && opts.has_owner_constraint()
}

pub struct ResourceStorage {
    version: StorageVersion,
    index: String,
}

impl ResourceStorage {
    pub fn new(version: StorageVersion, index: impl Into<String>) -> Self {
        Self {
            version,
            index: index.into(),
        }
    }

    pub fn version(&self) -> &StorageVersion {
        &self.version
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    /// Compile the list query for `opts` using already resolved owner ids
    pub fn gen_list_query(
        &self,
        owner_ids: &[String],
        opts: &ListOptions,
    ) -> Result<CompiledQuery, QueryError> {
        let mut builder = QueryBuilder::new();
        apply_list_options(&mut builder, opts)?;

        if wants_owner_filter(opts) {
            builder.add_expression(Expression::term(
                LogicalField::OwnerReference.path(),
                owner_ids.iter().cloned(),
            ));
        } else if opts.has_owner_constraint() {
            debug!(
                clusters = opts.cluster_names.len(),
                "Owner filter requires exactly one cluster, skipping"
            );
        }

        let scope = [
            (LogicalField::Group, &self.version.group),
            (LogicalField::Version, &self.version.version),
            (LogicalField::Resource, &self.version.resource),
        ];
        for (field, value) in scope {
            builder.add_expression(Expression::term(field.path(), [value.as_str()]));
        }

        Ok(builder.build())
    }

    /// Resolve owners when the request needs them, then compile the list query
    pub async fn list_query(
        &self,
        resolver: &dyn OwnerResolver,
        opts: &ListOptions,
    ) -> Result<CompiledQuery> {
        let owner_ids = if wants_owner_filter(opts) {
            resolver.resolve_owner_ids(opts).await?
        } else {
            Vec::new()
        };
        Ok(self.gen_list_query(&owner_ids, opts)?)
    }

    /// Create this storage's index if it does not exist yet
    pub async fn ensure_index(&self, lifecycle: &dyn IndexLifecycle, mapping: &str) -> Result<()> {
        lifecycle.ensure_index(mapping, &self.index).await
    }
}
