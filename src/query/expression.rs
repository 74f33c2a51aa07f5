// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Query expressions
//!
//! An [`Expression`] is one clause of the compiled boolean query: a document
//! path, what kind of match to run against it, and whether the match is
//! required, forbidden or optional.

use serde_json::{Map, Value, json};

/// Where a compiled clause lands in the boolean query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combinator {
    /// `must`
    #[default]
    Required,
    /// `must_not`
    Forbidden,
    /// `should`
    Optional,
}

impl Combinator {
    /// Name of the bool query section holding clauses of this combinator
    pub fn section(self) -> &'static str {
        match self {
            Combinator::Required => "must",
            Combinator::Forbidden => "must_not",
            Combinator::Optional => "should",
        }
    }
}

/// Match performed by an expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchKind {
    /// Exact match against any of the values
    Term(Vec<String>),
    /// Inclusive range, either bound may be open
    Range {
        low: Option<String>,
        high: Option<String>,
    },
    /// Glob-style pattern on a single value
    Wildcard(String),
    /// Approximate text match on a single value
    Fuzzy(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    path: String,
    kind: MatchKind,
    combinator: Combinator,
}

impl Expression {
    fn new(path: impl Into<String>, kind: MatchKind) -> Self {
        Self {
            path: path.into(),
            kind,
            combinator: Combinator::Required,
        }
    }

    pub fn term<I, S>(path: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            path,
            MatchKind::Term(values.into_iter().map(Into::into).collect()),
        )
    }

    pub fn range(path: impl Into<String>, low: Option<String>, high: Option<String>) -> Self {
        Self::new(path, MatchKind::Range { low, high })
    }

    pub fn wildcard(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(path, MatchKind::Wildcard(value.into()))
    }

    pub fn fuzzy(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(path, MatchKind::Fuzzy(value.into()))
    }

    /// Move this expression into the `must_not` section
    pub fn set_forbidden(&mut self) {
        self.combinator = Combinator::Forbidden;
    }

    /// Builder-style [`Expression::set_forbidden`]
    pub fn forbidden(mut self) -> Self {
        self.set_forbidden();
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> &MatchKind {
        &self.kind
    }

    pub fn combinator(&self) -> Combinator {
        self.combinator
    }

    /// Compile into the search engine's clause object
    ///
    /// - Term: `{"terms": {path: [v1, v2]}}`
    /// - Range: `{"range": {path: {"gte": low, "lte": high}}}` (absent bounds omitted)
    /// - Wildcard: `{"wildcard": {path: {"value": v}}}`
    /// - Fuzzy: `{"fuzzy": {path: {"value": v}}}`
    pub fn compile(&self) -> Value {
        let (clause, body) = match &self.kind {
            MatchKind::Term(values) => ("terms", json!(values)),
            MatchKind::Range { low, high } => {
                let mut bounds = Map::new();
                if let Some(low) = low {
                    bounds.insert("gte".to_string(), json!(low));
                }
                if let Some(high) = high {
                    bounds.insert("lte".to_string(), json!(high));
                }
                ("range", Value::Object(bounds))
            }
            MatchKind::Wildcard(value) => ("wildcard", json!({ "value": value })),
            MatchKind::Fuzzy(value) => ("fuzzy", json!({ "value": value })),
        };

        let mut field = Map::new();
        field.insert(self.path.clone(), body);
        let mut compiled = Map::new();
        compiled.insert(clause.to_string(), Value::Object(field));
        Value::Object(compiled)
    }
}
