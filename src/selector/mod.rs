// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! List request model
//!
//! [`ListOptions`] is what the storage layer hands to the query compiler.
//! Label selectors and enhanced field selectors arrive either already parsed
//! or in the Kubernetes selector string form (`app=nginx,env in (a,b)`),
//! which is how they are carried through JSON.

mod parser;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use parser::{RawRequirement, parse_requirements};

/// Selector requirement operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Exists,
    DoesNotExist,
    Equals,
    DoubleEquals,
    NotEquals,
    In,
    NotIn,
    GreaterThan,
    LessThan,
}

/// Malformed selector string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorParseError {
    #[error("empty key in requirement '{0}'")]
    EmptyKey(String),
    #[error("invalid key '{key}' in requirement '{requirement}'")]
    InvalidKey { requirement: String, key: String },
    #[error("invalid value '{value}' in requirement '{requirement}'")]
    InvalidValue { requirement: String, value: String },
    #[error("unknown operator in requirement '{0}'")]
    UnknownOperator(String),
    #[error("set operator requires at least one value in '{0}'")]
    MissingValues(String),
    #[error("unbalanced parentheses in '{0}'")]
    Unbalanced(String),
    #[error("invalid field path '{0}'")]
    InvalidFieldPath(String),
}

/// Render `key<op>values` in selector syntax
fn write_requirement(
    f: &mut fmt::Formatter<'_>,
    key: &dyn fmt::Display,
    operator: Operator,
    values: &BTreeSet<String>,
) -> fmt::Result {
    let joined = || values.iter().map(String::as_str).collect::<Vec<_>>().join(",");
    match operator {
        Operator::Exists => write!(f, "{}", key),
        Operator::DoesNotExist => write!(f, "!{}", key),
        Operator::Equals => write!(f, "{}={}", key, joined()),
        Operator::DoubleEquals => write!(f, "{}=={}", key, joined()),
        Operator::NotEquals => write!(f, "{}!={}", key, joined()),
        Operator::GreaterThan => write!(f, "{}>{}", key, joined()),
        Operator::LessThan => write!(f, "{}<{}", key, joined()),
        Operator::In => write!(f, "{} in ({})", key, joined()),
        Operator::NotIn => write!(f, "{} notin ({})", key, joined()),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Label selectors
// ═══════════════════════════════════════════════════════════════════════════

/// One label selector requirement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub key: String,
    pub operator: Operator,
    /// Iterated in sorted order
    pub values: BTreeSet<String>,
}

impl Requirement {
    pub fn new<I, S>(key: impl Into<String>, operator: Operator, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.into(),
            operator,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Values as an ordered list
    pub fn values(&self) -> Vec<String> {
        self.values.iter().cloned().collect()
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_requirement(f, &self.key, self.operator, &self.values)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSelector {
    pub requirements: Vec<Requirement>,
}

impl LabelSelector {
    pub fn new(requirements: Vec<Requirement>) -> Self {
        Self { requirements }
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }
}

impl FromStr for LabelSelector {
    type Err = SelectorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let requirements = parse_requirements(s)?
            .into_iter()
            .map(|raw| Requirement {
                key: raw.key,
                operator: raw.operator,
                values: raw.values,
            })
            .collect();
        Ok(Self { requirements })
    }
}

impl fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, requirement) in self.requirements.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", requirement)?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Enhanced field selectors
// ═══════════════════════════════════════════════════════════════════════════

/// One segment of a dotted field path. `containers[]` is a list segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSegment {
    pub name: String,
    pub is_list: bool,
}

impl FieldSegment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_list: false,
        }
    }

    pub fn list(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_list: true,
        }
    }
}

impl fmt::Display for FieldSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_list {
            write!(f, "{}[]", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

/// One enhanced field selector requirement over a nested path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRequirement {
    pub fields: Vec<FieldSegment>,
    pub operator: Operator,
    pub values: BTreeSet<String>,
}

impl FieldRequirement {
    pub fn new<I, S>(fields: Vec<FieldSegment>, operator: Operator, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields,
            operator,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn values(&self) -> Vec<String> {
        self.values.iter().cloned().collect()
    }

    /// Dotted path of the first `len` segments, without list markers
    pub fn path_prefix(&self, len: usize) -> String {
        self.fields
            .iter()
            .take(len)
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Full path in selector syntax (`spec.containers[].name`)
    pub fn path(&self) -> String {
        self.fields
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for FieldRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_requirement(f, &self.path(), self.operator, &self.values)
    }
}

fn parse_field_path(key: &str) -> Result<Vec<FieldSegment>, SelectorParseError> {
    key.split('.')
        .map(|segment| {
            let (name, is_list) = match segment.strip_suffix("[]") {
                Some(name) => (name, true),
                None => (segment, false),
            };
            if name.is_empty() || name.contains(['[', ']']) {
                return Err(SelectorParseError::InvalidFieldPath(key.to_string()));
            }
            Ok(FieldSegment {
                name: name.to_string(),
                is_list,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSelector {
    pub requirements: Vec<FieldRequirement>,
}

impl FieldSelector {
    pub fn new(requirements: Vec<FieldRequirement>) -> Self {
        Self { requirements }
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }
}

impl FromStr for FieldSelector {
    type Err = SelectorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let requirements = parse_requirements(s)?
            .into_iter()
            .map(|RawRequirement { key, operator, values }| {
                Ok(FieldRequirement {
                    fields: parse_field_path(&key)?,
                    operator,
                    values,
                })
            })
            .collect::<Result<_, SelectorParseError>>()?;
        Ok(Self { requirements })
    }
}

impl fmt::Display for FieldSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, requirement) in self.requirements.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", requirement)?;
        }
        Ok(())
    }
}

/// Selectors travel through JSON in their string form
macro_rules! string_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

string_serde!(LabelSelector);
string_serde!(FieldSelector);

// ═══════════════════════════════════════════════════════════════════════════
// List options
// ═══════════════════════════════════════════════════════════════════════════

/// One `orderby` key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    #[serde(default)]
    pub desc: bool,
}

/// Criteria of a single list request
///
/// Absent or empty filter sets mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListOptions {
    pub cluster_names: Vec<String>,
    pub namespaces: Vec<String>,
    pub names: Vec<String>,

    /// Inclusive lower bound on creation time
    pub since: Option<DateTime<Utc>>,
    /// Inclusive upper bound on creation time
    pub before: Option<DateTime<Utc>>,

    pub owner_uid: String,
    pub owner_name: String,
    pub owner_group_resource: Option<String>,
    pub owner_seniority: i32,

    pub label_selector: Option<LabelSelector>,
    /// Synthetic directives encoded as label requirements (e.g. fuzzy name match)
    pub extra_label_selector: Option<LabelSelector>,
    pub enhanced_field_selector: Option<FieldSelector>,

    pub order_by: Vec<OrderBy>,
    pub limit: i64,
    #[serde(rename = "continue")]
    pub continue_token: String,
}

impl ListOptions {
    /// True when the request filters by owner UID or owner name
    pub fn has_owner_constraint(&self) -> bool {
        !self.owner_uid.is_empty() || !self.owner_name.is_empty()
    }
}
