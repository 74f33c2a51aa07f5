// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Compile Kubernetes list requests into search engine queries
//!
//! A multi-cluster resource index stores every Kubernetes object as a
//! document. This crate turns a [`ListOptions`] (cluster / namespace / name
//! sets, label and field selectors, creation time bounds, ordering and
//! pagination) into the boolean query that lists the matching documents.
//!
//! ```
//! use k8search::{ListOptions, ResourceStorage, StorageVersion};
//!
//! let storage = ResourceStorage::new(StorageVersion::new("apps", "v1", "deployments"), "deployments");
//! let opts = ListOptions {
//!     namespaces: vec!["default".to_string()],
//!     label_selector: Some("app=web".parse().unwrap()),
//!     limit: 10,
//!     ..Default::default()
//! };
//! let query = storage.gen_list_query(&[], &opts).unwrap();
//! assert_eq!(query.size(), Some(10));
//! ```

pub mod config;
pub mod error;
pub mod query;
pub mod selector;
pub mod storage;

pub use error::{FieldError, QueryError, StorageError};
pub use query::{CompiledQuery, QueryBuilder};
pub use selector::{FieldSelector, LabelSelector, ListOptions, Operator};
pub use storage::{
    ElasticsearchClient, IndexLifecycle, OwnerResolver, PreResolvedOwners, ResourceStorage,
    StorageVersion,
};
