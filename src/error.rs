// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for query compilation and the storage collaborators

use std::fmt;
use thiserror::Error;

/// API group reported in validation errors
pub const API_GROUP: &str = "clusterpedia.io";

/// Storage name reported in validation errors
pub const STORAGE_NAME: &str = "elasticsearch";

/// One rejected field of a list request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Path of the offending field within the selector
    pub path: String,
    /// The offending value (the field name)
    pub value: String,
    pub detail: String,
}

impl FieldError {
    pub fn invalid(
        path: impl Into<String>,
        value: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: Invalid value: {:?}: {}",
            self.path, self.value, self.detail
        )
    }
}

/// Errors raised while translating a list request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The request names fields the storage cannot filter on.
    /// Carries every violation, not just the first one found.
    #[error(
        "{kind}.{group} {field:?} is invalid: [{joined}]",
        group = API_GROUP,
        joined = join_errors(.errors)
    )]
    Invalid {
        kind: &'static str,
        field: &'static str,
        errors: Vec<FieldError>,
    },
}

impl QueryError {
    pub fn invalid_field_selector(errors: Vec<FieldError>) -> Self {
        QueryError::Invalid {
            kind: "ListOptions",
            field: "fieldSelector",
            errors,
        }
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            QueryError::Invalid { errors, .. } => errors,
        }
    }
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised by the storage layer around query compilation
#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Query(#[from] QueryError),

    /// The search engine rejected an index request; status and body verbatim
    #[error("index '{index}' request failed with {status}: {body}")]
    Index {
        index: String,
        status: u16,
        body: String,
    },

    #[error("search engine transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to resolve owner: {0}")]
    Owner(String),
}

pub type Result<T, E = StorageError> = std::result::Result<T, E>;
