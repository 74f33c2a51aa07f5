// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! List request translation
//!
//! Walks a [`ListOptions`] and feeds one [`QueryBuilder`] with the
//! expressions, sort keys and pagination that implement it:
//!
//! 1. cluster / namespace / name sets → required `terms`
//! 2. creation time bounds → one `range`
//! 3. label selector → `terms` over the label map
//! 4. extra label selector → fuzzy name `wildcard`s
//! 5. enhanced field selector → `terms` or `wildcard`s over object fields
//! 6. size / from from limit and continue token
//! 7. sort keys
//!
//! Scoping to a resource type and owner filtering happen in the storage layer.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use super::builder::{DEFAULT_PAGE_SIZE, QueryBuilder};
use super::expression::Expression;
use super::paths::{FieldMatch, LogicalField, resolve_object_field};
use super::sort::compile_order_by;
use crate::error::{FieldError, QueryError, STORAGE_NAME};
use crate::selector::{FieldRequirement, ListOptions, Operator, Requirement};

/// Extra label key requesting a fuzzy match on the resource name
pub const FUZZY_NAME_LABEL: &str = "elasticsearchstorage.clusterpedia.io/fuzzy-name";

/// A selector requirement tagged with the selector it came from
#[derive(Debug, Clone, Copy)]
pub enum SelectorRequirement<'a> {
    Label(&'a Requirement),
    ExtraLabel(&'a Requirement),
    EnhancedField(&'a FieldRequirement),
}

impl SelectorRequirement<'_> {
    /// Expressions implementing this requirement, in emission order
    fn expressions(self) -> Vec<Expression> {
        match self {
            SelectorRequirement::Label(req) => label_expressions(req),
            SelectorRequirement::ExtraLabel(req) => extra_label_expressions(req),
            SelectorRequirement::EnhancedField(req) => field_expressions(req),
        }
    }
}

/// Whether a clause built from `operator` must match or must not match.
///
/// `None` for operators with no translation (numeric comparisons).
/// Existence operators share the value-match slot of equality; only the
/// requirement's values reach the query.
fn operator_forbids(operator: Operator) -> Option<bool> {
    match operator {
        Operator::Exists
        | Operator::DoesNotExist
        | Operator::Equals
        | Operator::DoubleEquals
        | Operator::In => Some(false),
        Operator::NotEquals | Operator::NotIn => Some(true),
        Operator::GreaterThan | Operator::LessThan => None,
    }
}

fn with_operator(expressions: Vec<Expression>, forbidden: bool) -> Vec<Expression> {
    if !forbidden {
        return expressions;
    }
    expressions.into_iter().map(Expression::forbidden).collect()
}

fn label_expressions(req: &Requirement) -> Vec<Expression> {
    let Some(forbidden) = operator_forbids(req.operator) else {
        debug!(key = %req.key, operator = ?req.operator, "Skipping unsupported label operator");
        return Vec::new();
    };
    with_operator(
        vec![Expression::term(LogicalField::Labels.path(), req.values())],
        forbidden,
    )
}

fn extra_label_expressions(req: &Requirement) -> Vec<Expression> {
    if req.key != FUZZY_NAME_LABEL {
        debug!(key = %req.key, "Ignoring unknown extra label selector key");
        return Vec::new();
    }
    let Some(forbidden) = operator_forbids(req.operator) else {
        debug!(key = %req.key, operator = ?req.operator, "Skipping unsupported fuzzy name operator");
        return Vec::new();
    };
    let expressions = req
        .values
        .iter()
        .map(|value| Expression::wildcard(LogicalField::Name.path(), value.as_str()))
        .collect();
    with_operator(expressions, forbidden)
}

/// Expressions for a field requirement already checked by [`list_field_errors`]
fn field_expressions(req: &FieldRequirement) -> Vec<Expression> {
    let Some(forbidden) = operator_forbids(req.operator) else {
        debug!(field = %req.path(), operator = ?req.operator, "Skipping unsupported field operator");
        return Vec::new();
    };

    let segments: Vec<&str> = req.fields.iter().map(|f| f.name.as_str()).collect();
    let resolved = resolve_object_field(&segments);
    let expressions = match resolved.match_kind {
        FieldMatch::Wildcard => req
            .values
            .iter()
            .map(|value| Expression::wildcard(resolved.path.as_str(), value.as_str()))
            .collect(),
        FieldMatch::Term => vec![Expression::term(resolved.path, req.values())],
    };
    with_operator(expressions, forbidden)
}

/// One error per list-typed segment of the requirement's path
fn list_field_errors(req: &FieldRequirement) -> impl Iterator<Item = FieldError> + '_ {
    req.fields
        .iter()
        .enumerate()
        .filter(|(_, field)| field.is_list)
        .map(move |(i, field)| {
            FieldError::invalid(
                req.path_prefix(i + 1),
                field.name.as_str(),
                format!("Storage<{}>: not support list field", STORAGE_NAME),
            )
        })
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Page size for a request limit: the limit when positive, the default otherwise
pub fn page_size(limit: i64) -> u64 {
    if limit > 0 {
        limit as u64
    } else {
        DEFAULT_PAGE_SIZE
    }
}

/// Offset encoded in a continue token; anything unparsable restarts at 0
pub fn page_offset(continue_token: &str) -> u64 {
    continue_token.trim().parse().unwrap_or(0)
}

/// Collect the selector requirements of a request in translation order
pub fn selector_requirements(opts: &ListOptions) -> Vec<SelectorRequirement<'_>> {
    let labels = opts
        .label_selector
        .iter()
        .flat_map(|s| &s.requirements)
        .map(SelectorRequirement::Label);
    let extra = opts
        .extra_label_selector
        .iter()
        .flat_map(|s| &s.requirements)
        .map(SelectorRequirement::ExtraLabel);
    let fields = opts
        .enhanced_field_selector
        .iter()
        .flat_map(|s| &s.requirements)
        .map(SelectorRequirement::EnhancedField);
    labels.chain(extra).chain(fields).collect()
}

/// Translate a list request into `builder`
///
/// Fails only when the enhanced field selector targets list-typed fields; the
/// error names every such field and the builder must be discarded.
pub fn apply_list_options(builder: &mut QueryBuilder, opts: &ListOptions) -> Result<(), QueryError> {
    let field_errors: Vec<FieldError> = opts
        .enhanced_field_selector
        .iter()
        .flat_map(|s| &s.requirements)
        .flat_map(list_field_errors)
        .collect();
    if !field_errors.is_empty() {
        debug!(count = field_errors.len(), "Rejecting list fields in field selector");
        return Err(QueryError::invalid_field_selector(field_errors));
    }

    let sets = [
        (LogicalField::Cluster, &opts.cluster_names),
        (LogicalField::Namespace, &opts.namespaces),
        (LogicalField::Name, &opts.names),
    ];
    for (field, values) in sets {
        if !values.is_empty() {
            builder.add_expression(Expression::term(field.path(), values.iter().cloned()));
        }
    }

    if opts.since.is_some() || opts.before.is_some() {
        builder.add_expression(Expression::range(
            LogicalField::CreationTimestamp.path(),
            opts.since.as_ref().map(format_timestamp),
            opts.before.as_ref().map(format_timestamp),
        ));
    }

    for requirement in selector_requirements(opts) {
        for expression in requirement.expressions() {
            builder.add_expression(expression);
        }
    }

    builder.set_size(page_size(opts.limit));
    builder.set_from(page_offset(&opts.continue_token));
    builder.set_sort(compile_order_by(&opts.order_by));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::expression::{Combinator, MatchKind};
    use crate::selector::{FieldSegment, FieldSelector, LabelSelector, OrderBy};
    use chrono::TimeZone;
    use serde_json::json;

    fn translate(opts: &ListOptions) -> QueryBuilder {
        let mut builder = QueryBuilder::new();
        apply_list_options(&mut builder, opts).unwrap();
        builder
    }

    fn label_opts(selector: &str) -> ListOptions {
        ListOptions {
            label_selector: Some(selector.parse().unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_options_emit_nothing() {
        let builder = translate(&ListOptions::default());
        assert!(builder.expressions().is_empty());
        assert_eq!(builder.size(), 500);
        assert_eq!(builder.from(), 0);
        assert!(builder.sort().is_empty());
    }

    #[test]
    fn test_sets_emit_one_required_term_each() {
        let opts = ListOptions {
            cluster_names: vec!["c1".to_string(), "c2".to_string()],
            namespaces: vec!["default".to_string()],
            names: vec!["web".to_string()],
            ..Default::default()
        };
        let builder = translate(&opts);
        let exprs = builder.expressions();
        assert_eq!(exprs.len(), 3);
        assert_eq!(exprs[0].path(), LogicalField::Cluster.path());
        assert_eq!(
            exprs[0].kind(),
            &MatchKind::Term(vec!["c1".to_string(), "c2".to_string()])
        );
        assert_eq!(exprs[1].path(), "object.metadata.namespace");
        assert_eq!(exprs[2].path(), "object.metadata.name");
        assert!(exprs.iter().all(|e| e.combinator() == Combinator::Required));
    }

    #[test]
    fn test_empty_sets_are_no_constraint() {
        let opts = ListOptions {
            namespaces: vec![],
            names: vec!["web".to_string()],
            ..Default::default()
        };
        let builder = translate(&opts);
        assert_eq!(builder.expressions().len(), 1);
        assert_eq!(builder.expressions()[0].path(), "object.metadata.name");
    }

    #[test]
    fn test_time_range_open_upper_bound() {
        let opts = ListOptions {
            since: Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
            ..Default::default()
        };
        let builder = translate(&opts);
        let exprs = builder.expressions();
        assert_eq!(exprs.len(), 1);
        assert_eq!(
            exprs[0].compile(),
            json!({"range": {"object.metadata.creationTimestamp": {"gte": "2024-01-02T03:04:05Z"}}})
        );
    }

    #[test]
    fn test_time_range_both_bounds() {
        let opts = ListOptions {
            since: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            before: Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        let builder = translate(&opts);
        assert_eq!(
            builder.expressions()[0].kind(),
            &MatchKind::Range {
                low: Some("2024-01-01T00:00:00Z".to_string()),
                high: Some("2024-06-01T00:00:00Z".to_string()),
            }
        );
    }

    #[test]
    fn test_label_operator_mapping() {
        let cases = [
            ("app=nginx", Combinator::Required),
            ("app==nginx", Combinator::Required),
            ("app", Combinator::Required),
            ("!app", Combinator::Required),
            ("app in (a,b)", Combinator::Required),
            ("app!=nginx", Combinator::Forbidden),
            ("app notin (a,b)", Combinator::Forbidden),
        ];
        for (selector, expected) in cases {
            let builder = translate(&label_opts(selector));
            let exprs = builder.expressions();
            assert_eq!(exprs.len(), 1, "{}", selector);
            assert_eq!(exprs[0].path(), LogicalField::Labels.path(), "{}", selector);
            assert_eq!(exprs[0].combinator(), expected, "{}", selector);
        }
    }

    #[test]
    fn test_label_values_collected_sorted() {
        let builder = translate(&label_opts("env notin (staging,dev)"));
        assert_eq!(
            builder.expressions()[0].compile(),
            json!({"terms": {"object.metadata.labels": ["dev", "staging"]}})
        );
    }

    #[test]
    fn test_label_numeric_comparison_skipped() {
        let builder = translate(&label_opts("replicas>3,app=web"));
        assert_eq!(builder.expressions().len(), 1);
    }

    #[test]
    fn test_fuzzy_name_equals() {
        let opts = ListOptions {
            extra_label_selector: Some(LabelSelector::new(vec![Requirement::new(
                FUZZY_NAME_LABEL,
                Operator::Equals,
                ["foo"],
            )])),
            ..Default::default()
        };
        let builder = translate(&opts);
        let exprs = builder.expressions();
        assert_eq!(exprs.len(), 1);
        assert_eq!(exprs[0].path(), LogicalField::Name.path());
        assert_eq!(exprs[0].kind(), &MatchKind::Wildcard("foo".to_string()));
        assert_eq!(exprs[0].combinator(), Combinator::Required);
    }

    #[test]
    fn test_fuzzy_name_not_equals_is_forbidden() {
        let opts = ListOptions {
            extra_label_selector: Some(LabelSelector::new(vec![Requirement::new(
                FUZZY_NAME_LABEL,
                Operator::NotEquals,
                ["foo"],
            )])),
            ..Default::default()
        };
        let builder = translate(&opts);
        let exprs = builder.expressions();
        assert_eq!(exprs.len(), 1);
        assert_eq!(exprs[0].kind(), &MatchKind::Wildcard("foo".to_string()));
        assert_eq!(exprs[0].combinator(), Combinator::Forbidden);
    }

    #[test]
    fn test_fuzzy_name_one_wildcard_per_value() {
        let opts = ListOptions {
            extra_label_selector: Some(
                format!("{} in (api,web)", FUZZY_NAME_LABEL).parse().unwrap(),
            ),
            ..Default::default()
        };
        let builder = translate(&opts);
        let values: Vec<_> = builder.expressions().iter().map(|e| e.kind().clone()).collect();
        assert_eq!(
            values,
            vec![
                MatchKind::Wildcard("api".to_string()),
                MatchKind::Wildcard("web".to_string()),
            ]
        );
    }

    #[test]
    fn test_unknown_extra_label_ignored() {
        let opts = ListOptions {
            extra_label_selector: Some("some.io/other=foo".parse().unwrap()),
            ..Default::default()
        };
        assert!(translate(&opts).expressions().is_empty());
    }

    #[test]
    fn test_field_selector_term() {
        let opts = ListOptions {
            enhanced_field_selector: Some("status.phase notin (Failed,Pending)".parse().unwrap()),
            ..Default::default()
        };
        let builder = translate(&opts);
        let exprs = builder.expressions();
        assert_eq!(exprs.len(), 1);
        assert_eq!(exprs[0].combinator(), Combinator::Forbidden);
        assert_eq!(
            exprs[0].compile(),
            json!({"terms": {"object.status.phase": ["Failed", "Pending"]}})
        );
    }

    #[test]
    fn test_field_selector_wildcard_per_value() {
        let opts = ListOptions {
            enhanced_field_selector: Some("ws.spec.nodeName in (node-a*,node-b*)".parse().unwrap()),
            ..Default::default()
        };
        let builder = translate(&opts);
        let exprs = builder.expressions();
        assert_eq!(exprs.len(), 2);
        for expr in exprs {
            assert_eq!(expr.path(), "object.spec.nodeName");
            assert!(matches!(expr.kind(), MatchKind::Wildcard(_)));
            assert_eq!(expr.combinator(), Combinator::Required);
        }
    }

    #[test]
    fn test_field_selector_list_field_rejected() {
        let opts = ListOptions {
            namespaces: vec!["default".to_string()],
            enhanced_field_selector: Some("spec.containers[].name=nginx".parse().unwrap()),
            ..Default::default()
        };
        let mut builder = QueryBuilder::new();
        let err = apply_list_options(&mut builder, &opts).unwrap_err();
        let errors = err.field_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "spec.containers");
        assert_eq!(errors[0].value, "containers");
        assert!(err.to_string().contains("not support list field"));
    }

    #[test]
    fn test_field_selector_all_list_fields_reported() {
        let selector = FieldSelector::new(vec![
            FieldRequirement::new(
                vec![FieldSegment::new("spec"), FieldSegment::list("containers")],
                Operator::Equals,
                ["a"],
            ),
            FieldRequirement::new(
                vec![FieldSegment::new("status"), FieldSegment::new("phase")],
                Operator::Equals,
                ["Running"],
            ),
            FieldRequirement::new(
                vec![
                    FieldSegment::new("status"),
                    FieldSegment::list("conditions"),
                    FieldSegment::new("type"),
                ],
                Operator::NotEquals,
                ["Ready"],
            ),
        ]);
        let opts = ListOptions {
            enhanced_field_selector: Some(selector),
            ..Default::default()
        };
        let mut builder = QueryBuilder::new();
        let err = apply_list_options(&mut builder, &opts).unwrap_err();
        let paths: Vec<_> = err.field_errors().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["spec.containers", "status.conditions"]);
    }

    #[test]
    fn test_pagination() {
        let cases = [
            (10, "42", 10, 42),
            (0, "", 500, 0),
            (-5, "abc", 500, 0),
            (25, "-3", 25, 0),
        ];
        for (limit, token, size, from) in cases {
            let opts = ListOptions {
                limit,
                continue_token: token.to_string(),
                ..Default::default()
            };
            let builder = translate(&opts);
            assert_eq!(builder.size(), size, "limit {}", limit);
            assert_eq!(builder.from(), from, "token {:?}", token);
        }
    }

    #[test]
    fn test_sort_compiled() {
        let opts = ListOptions {
            order_by: vec![
                OrderBy {
                    field: "created_at".to_string(),
                    desc: true,
                },
                OrderBy {
                    field: "custom.x".to_string(),
                    desc: false,
                },
            ],
            ..Default::default()
        };
        let builder = translate(&opts);
        let sort: Vec<_> = builder.sort().iter().map(|s| s.compile()).collect();
        assert_eq!(
            sort,
            vec![
                json!({"object.metadata.creationTimestamp": {"order": "desc"}}),
                json!({"object.custom.x": {"order": "asc"}}),
            ]
        );
    }

    #[test]
    fn test_selector_requirements_order() {
        let opts = ListOptions {
            label_selector: Some("a=1".parse().unwrap()),
            extra_label_selector: Some(format!("{}=x", FUZZY_NAME_LABEL).parse().unwrap()),
            enhanced_field_selector: Some("spec.x=1".parse().unwrap()),
            ..Default::default()
        };
        let kinds: Vec<_> = selector_requirements(&opts)
            .into_iter()
            .map(|r| match r {
                SelectorRequirement::Label(_) => "label",
                SelectorRequirement::ExtraLabel(_) => "extra",
                SelectorRequirement::EnhancedField(_) => "field",
            })
            .collect();
        assert_eq!(kinds, vec!["label", "extra", "field"]);
    }
}
