// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Document field path registry
//!
//! Resources are indexed as documents of the shape
//! `{ "group": .., "version": .., "resource": .., "object": { <k8s object> } }`.
//! This module maps the logical filter names used by list requests onto the
//! dotted paths of that document, so no other module spells a path by hand.

/// Root of the stored Kubernetes object inside an indexed document
pub const OBJECT_ROOT: &str = "object";

/// Reserved first segment of an enhanced field selector path.
/// `ws.spec.nodeName=node-*` targets `object.spec.nodeName` with a wildcard match.
pub const WILDCARD_STRING_SEGMENT: &str = "ws";

/// Logical names a list request can filter or sort on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalField {
    Object,
    Cluster,
    Namespace,
    Name,
    OwnerReference,
    CreationTimestamp,
    ResourceVersion,
    Labels,
    Group,
    Version,
    Resource,
    Uid,
    ApiVersion,
    Kind,
    ObjectMeta,
}

impl LogicalField {
    /// Fully qualified document path for this field
    pub const fn path(self) -> &'static str {
        match self {
            LogicalField::Object => OBJECT_ROOT,
            LogicalField::Cluster => {
                "object.metadata.annotations.shadow.clusterpedia.io/cluster-name"
            }
            LogicalField::Namespace => "object.metadata.namespace",
            LogicalField::Name => "object.metadata.name",
            LogicalField::OwnerReference => "object.metadata.ownerReferences.uid",
            LogicalField::CreationTimestamp => "object.metadata.creationTimestamp",
            LogicalField::ResourceVersion => "object.metadata.resourceVersion",
            LogicalField::Labels => "object.metadata.labels",
            LogicalField::Group => "group",
            LogicalField::Version => "version",
            LogicalField::Resource => "resource",
            LogicalField::Uid => "object.metadata.uid",
            LogicalField::ApiVersion => "object.apiVersion",
            LogicalField::Kind => "object.kind",
            LogicalField::ObjectMeta => "object.metadata",
        }
    }
}

/// How values targeting a resolved field are matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMatch {
    /// Exact match against the full value set
    Term,
    /// Pattern match, one clause per value
    Wildcard,
}

/// Result of resolving a caller-supplied object field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    pub path: String,
    pub match_kind: FieldMatch,
}

/// Resolve a caller-supplied object field path (already split on `.`)
///
/// The object root is prefixed onto the segments. A leading
/// [`WILDCARD_STRING_SEGMENT`] is consumed and switches the match kind to
/// [`FieldMatch::Wildcard`].
///
/// # Example
/// ```
/// use k8search::query::paths::{resolve_object_field, FieldMatch};
///
/// let resolved = resolve_object_field(&["ws", "spec", "nodeName"]);
/// assert_eq!(resolved.path, "object.spec.nodeName");
/// assert_eq!(resolved.match_kind, FieldMatch::Wildcard);
/// ```
pub fn resolve_object_field<S: AsRef<str>>(segments: &[S]) -> ResolvedField {
    let (match_kind, rest) = match segments.split_first() {
        Some((first, rest)) if first.as_ref() == WILDCARD_STRING_SEGMENT => {
            (FieldMatch::Wildcard, rest)
        }
        _ => (FieldMatch::Term, segments),
    };

    let mut path = String::from(OBJECT_ROOT);
    for segment in rest {
        path.push('.');
        path.push_str(segment.as_ref());
    }

    ResolvedField { path, match_kind }
}

/// Prefix an arbitrary dotted key with the object root
pub fn object_path(key: &str) -> String {
    format!("{}.{}", OBJECT_ROOT, key)
}
