//! Query compiler for the audit log search language.
//!
//! Queries look like `login AND failed`, `login OR logout`, `NOT success` or
//! `user_name:John AND action:LOGIN`. A query with any `column:value` pair is
//! compiled into column conditions as a whole; anything else becomes a
//! full-text expression.

use regex::Regex;
use std::sync::LazyLock;

use super::conditions::compile_conditions;
use super::full_text::compile_full_text;
use super::tokenizer::tokenize;
use super::types::CompiledQuery;

static COLUMN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+:[^\s)]+").unwrap());

/// True if `text` contains an `identifier:value` pair anywhere.
pub fn is_column_specific(text: &str) -> bool {
    COLUMN_PATTERN.is_match(text)
}

/// Compile a raw query string.
///
/// # Examples
///
/// ```
/// use audit_api::domain::search::compile;
///
/// let compiled = compile("login AND failed");
/// assert!(!compiled.is_column_specific);
/// assert_eq!(compiled.full_text, "login:* & failed:*");
///
/// let compiled = compile("user_name:John AND action:LOGIN");
/// assert!(compiled.is_column_specific);
/// assert_eq!(compiled.conditions.len(), 2);
/// ```
pub fn compile(query: &str) -> CompiledQuery {
    let query = query.trim();
    if query.is_empty() {
        return CompiledQuery::default();
    }

    let tokens = tokenize(query);

    if is_column_specific(query) {
        CompiledQuery {
            is_column_specific: true,
            full_text: String::new(),
            conditions: compile_conditions(&tokens),
        }
    } else {
        CompiledQuery {
            is_column_specific: false,
            full_text: compile_full_text(&tokens),
            conditions: Vec::new(),
        }
    }
}
