// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Parser for the Kubernetes selector string grammar
//!
//! Shared by label selectors and enhanced field selectors, which only differ
//! in how the key is interpreted:
//!
//! - `key` / `!key`            existence
//! - `key=v`, `key==v`, `key!=v`
//! - `key in (a, b)`, `key notin (a, b)`
//! - `key>3`, `key<3`          integer comparison
//!
//! Requirements are separated by commas outside of parentheses.

use std::collections::BTreeSet;

use super::{Operator, SelectorParseError};

/// A requirement with its key still in raw string form
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct RawRequirement {
    pub key: String,
    pub operator: Operator,
    pub values: BTreeSet<String>,
}

pub(super) fn parse_requirements(input: &str) -> Result<Vec<RawRequirement>, SelectorParseError> {
    split_top_level(input)?
        .into_iter()
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(parse_requirement)
        .collect()
}

/// Split on commas that are not inside a `( ... )` value set
fn split_top_level(input: &str) -> Result<Vec<&str>, SelectorParseError> {
    let mut terms = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| SelectorParseError::Unbalanced(input.to_string()))?;
            }
            ',' if depth == 0 => {
                terms.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(SelectorParseError::Unbalanced(input.to_string()));
    }
    terms.push(&input[start..]);
    Ok(terms)
}

fn parse_requirement(term: &str) -> Result<RawRequirement, SelectorParseError> {
    if let Some(key) = term.strip_prefix('!') {
        return Ok(RawRequirement {
            key: parse_key(key, term)?,
            operator: Operator::DoesNotExist,
            values: BTreeSet::new(),
        });
    }

    if let Some(open) = term.find('(') {
        return parse_set_requirement(term, open);
    }

    let Some(pos) = term.find(['!', '=', '<', '>']) else {
        return Ok(RawRequirement {
            key: parse_key(term, term)?,
            operator: Operator::Exists,
            values: BTreeSet::new(),
        });
    };

    let rest = &term[pos..];
    let (operator, op_len) = if rest.starts_with("!=") {
        (Operator::NotEquals, 2)
    } else if rest.starts_with("==") {
        (Operator::DoubleEquals, 2)
    } else if rest.starts_with('=') {
        (Operator::Equals, 1)
    } else if rest.starts_with('>') {
        (Operator::GreaterThan, 1)
    } else if rest.starts_with('<') {
        (Operator::LessThan, 1)
    } else {
        return Err(SelectorParseError::UnknownOperator(term.to_string()));
    };

    let key = parse_key(&term[..pos], term)?;
    let value = parse_value(&rest[op_len..], term)?;

    if matches!(operator, Operator::GreaterThan | Operator::LessThan) && value.parse::<i64>().is_err()
    {
        return Err(SelectorParseError::InvalidValue {
            requirement: term.to_string(),
            value,
        });
    }

    Ok(RawRequirement {
        key,
        operator,
        values: BTreeSet::from([value]),
    })
}

/// `key in (a, b)` / `key notin (a, b)`
fn parse_set_requirement(term: &str, open: usize) -> Result<RawRequirement, SelectorParseError> {
    let head: Vec<&str> = term[..open].split_whitespace().collect();
    let (key, operator) = match head.as_slice() {
        [key, "in"] => (*key, Operator::In),
        [key, "notin"] => (*key, Operator::NotIn),
        _ => return Err(SelectorParseError::UnknownOperator(term.to_string())),
    };

    let body = term[open + 1..]
        .trim_end()
        .strip_suffix(')')
        .ok_or_else(|| SelectorParseError::Unbalanced(term.to_string()))?;

    let values = body
        .split(',')
        .map(|v| parse_value(v, term))
        .collect::<Result<BTreeSet<_>, _>>()?;
    if body.trim().is_empty() {
        return Err(SelectorParseError::MissingValues(term.to_string()));
    }

    Ok(RawRequirement {
        key: parse_key(key, term)?,
        operator,
        values,
    })
}

fn parse_key(key: &str, term: &str) -> Result<String, SelectorParseError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(SelectorParseError::EmptyKey(term.to_string()));
    }
    if key.contains(|c: char| c.is_whitespace() || matches!(c, '=' | '!' | '<' | '>' | '(' | ')'))
    {
        return Err(SelectorParseError::InvalidKey {
            requirement: term.to_string(),
            key: key.to_string(),
        });
    }
    Ok(key.to_string())
}

fn parse_value(value: &str, term: &str) -> Result<String, SelectorParseError> {
    let value = value.trim();
    if value.contains(|c: char| c.is_whitespace() || matches!(c, '(' | ')' | ',' | '=' | '!')) {
        return Err(SelectorParseError::InvalidValue {
            requirement: term.to_string(),
            value: value.to_string(),
        });
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(input: &str) -> RawRequirement {
        let mut reqs = parse_requirements(input).unwrap();
        assert_eq!(reqs.len(), 1, "expected one requirement in {:?}", input);
        reqs.remove(0)
    }

    #[test]
    fn test_equality_operators() {
        assert_eq!(parse_one("app=nginx").operator, Operator::Equals);
        assert_eq!(parse_one("app==nginx").operator, Operator::DoubleEquals);
        assert_eq!(parse_one("app!=nginx").operator, Operator::NotEquals);

        let req = parse_one(" app = nginx ");
        assert_eq!(req.key, "app");
        assert_eq!(req.values, BTreeSet::from(["nginx".to_string()]));
    }

    #[test]
    fn test_existence() {
        let req = parse_one("app");
        assert_eq!(req.operator, Operator::Exists);
        assert!(req.values.is_empty());

        let req = parse_one("!app");
        assert_eq!(req.operator, Operator::DoesNotExist);
        assert_eq!(req.key, "app");
    }

    #[test]
    fn test_set_operators() {
        let req = parse_one("env in (prod, staging)");
        assert_eq!(req.operator, Operator::In);
        assert_eq!(req.key, "env");
        assert_eq!(
            req.values,
            BTreeSet::from(["prod".to_string(), "staging".to_string()])
        );

        let req = parse_one("env notin (dev)");
        assert_eq!(req.operator, Operator::NotIn);
    }

    #[test]
    fn test_multiple_requirements_with_sets() {
        let reqs = parse_requirements("app=nginx,env in (a,b),!legacy").unwrap();
        assert_eq!(reqs.len(), 3);
        assert_eq!(reqs[1].values.len(), 2);
        assert_eq!(reqs[2].operator, Operator::DoesNotExist);
    }

    #[test]
    fn test_empty_selector() {
        assert!(parse_requirements("").unwrap().is_empty());
        assert!(parse_requirements("  ").unwrap().is_empty());
    }

    #[test]
    fn test_numeric_comparison() {
        let req = parse_one("replicas>3");
        assert_eq!(req.operator, Operator::GreaterThan);
        assert!(parse_requirements("replicas<abc").is_err());
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            parse_requirements("=nginx"),
            Err(SelectorParseError::EmptyKey(_))
        ));
        assert!(matches!(
            parse_requirements("env in (a,b"),
            Err(SelectorParseError::Unbalanced(_))
        ));
        assert!(matches!(
            parse_requirements("env within (a)"),
            Err(SelectorParseError::UnknownOperator(_))
        ));
        assert!(matches!(
            parse_requirements("env in ()"),
            Err(SelectorParseError::MissingValues(_))
        ));
    }
}
