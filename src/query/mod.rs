// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Query compilation
//!
//! Turns a [`ListOptions`](crate::selector::ListOptions) into the boolean
//! query document understood by Elasticsearch-compatible engines.

mod builder;
mod expression;
pub mod paths;
mod sort;
mod translate;

pub use builder::{CompiledQuery, DEFAULT_PAGE_SIZE, QueryBuilder};
pub use expression::{Combinator, Expression, MatchKind};
pub use paths::{FieldMatch, LogicalField, ResolvedField};
pub use sort::{SortOrder, SortSpec, compile_order_by, sort_spec};
pub use translate::{
    FUZZY_NAME_LABEL, SelectorRequirement, apply_list_options, page_offset, page_size,
    selector_requirements,
};
