// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Sort compilation
//!
//! Maps the `orderby` keys of a list request onto document paths.

use serde_json::{Map, Value, json};

use super::paths::{LogicalField, object_path};
use crate::selector::OrderBy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// A single compiled sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub path: String,
    pub order: SortOrder,
}

impl SortSpec {
    /// `{path: {"order": "asc"|"desc"}}`
    pub fn compile(&self) -> Value {
        let mut spec = Map::new();
        spec.insert(self.path.clone(), json!({ "order": self.order.as_str() }));
        Value::Object(spec)
    }
}

/// Resolve a sort key alias to its document path
///
/// Known aliases map to fixed paths; anything else is an object field.
fn sort_path(key: &str) -> String {
    let field = match key {
        "cluster" => LogicalField::Cluster,
        "namespace" => LogicalField::Namespace,
        "name" => LogicalField::Name,
        "created_at" => LogicalField::CreationTimestamp,
        "resource_version" => LogicalField::ResourceVersion,
        _ => return object_path(key),
    };
    field.path().to_string()
}

pub fn sort_spec(key: &str, desc: bool) -> SortSpec {
    SortSpec {
        path: sort_path(key),
        order: if desc { SortOrder::Desc } else { SortOrder::Asc },
    }
}

/// Compile every ordering key, preserving the caller's order
pub fn compile_order_by(order_by: &[OrderBy]) -> Vec<SortSpec> {
    order_by
        .iter()
        .map(|order| sort_spec(&order.field, order.desc))
        .collect()
}
