// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Query builder
//!
//! Accumulates expressions, sort keys and pagination for one list request and
//! compiles them into the search engine's request body:
//!
//! ```json
//! {
//!   "query": {"bool": {"must": [..], "must_not": [..], "should": [..]}},
//!   "sort": [{"object.metadata.name": {"order": "asc"}}],
//!   "size": 500,
//!   "from": 0
//! }
//! ```

use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use super::expression::{Combinator, Expression};
use super::sort::SortSpec;

/// Page size used when the request carries no positive limit
pub const DEFAULT_PAGE_SIZE: u64 = 500;

/// Combinators in the order their sections appear in the bool query
const SECTIONS: [Combinator; 3] = [
    Combinator::Required,
    Combinator::Forbidden,
    Combinator::Optional,
];

/// Builder for a single list query
///
/// Created per request and consumed by [`QueryBuilder::build`].
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    expressions: Vec<Expression>,
    sort: Vec<SortSpec>,
    size: u64,
    from: u64,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self {
            expressions: Vec::new(),
            sort: Vec::new(),
            size: DEFAULT_PAGE_SIZE,
            from: 0,
        }
    }

    /// Append an expression. Duplicates and contradictions are kept as-is.
    pub fn add_expression(&mut self, expression: Expression) {
        self.expressions.push(expression);
    }

    pub fn set_sort(&mut self, sort: Vec<SortSpec>) {
        self.sort = sort;
    }

    pub fn set_size(&mut self, size: u64) {
        self.size = size;
    }

    pub fn set_from(&mut self, from: u64) {
        self.from = from;
    }

    pub fn expressions(&self) -> &[Expression] {
        &self.expressions
    }

    pub fn sort(&self) -> &[SortSpec] {
        &self.sort
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn from(&self) -> u64 {
        self.from
    }

    /// Compile the accumulated state into the final query document
    pub fn build(self) -> CompiledQuery {
        let mut bool_query = Map::new();
        for combinator in SECTIONS {
            let clauses: Vec<Value> = self
                .expressions
                .iter()
                .filter(|e| e.combinator() == combinator)
                .map(Expression::compile)
                .collect();
            bool_query.insert(combinator.section().to_string(), Value::Array(clauses));
        }

        debug!(
            expressions = self.expressions.len(),
            sort_keys = self.sort.len(),
            size = self.size,
            from = self.from,
            "Compiled list query"
        );

        let sort: Vec<Value> = self.sort.iter().map(SortSpec::compile).collect();
        CompiledQuery(json!({
            "query": { "bool": Value::Object(bool_query) },
            "sort": sort,
            "size": self.size,
            "from": self.from,
        }))
    }
}

/// Compiled query document, ready to be sent as a search request body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CompiledQuery(Value);

impl CompiledQuery {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Clauses of one bool section
    pub fn clauses(&self, combinator: Combinator) -> &[Value] {
        self.0["query"]["bool"][combinator.section()]
            .as_array()
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn size(&self) -> Option<u64> {
        self.0["size"].as_u64()
    }

    pub fn from(&self) -> Option<u64> {
        self.0["from"].as_u64()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.0)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.0)
    }
}
