//! Translates tokens into per-column filter conditions.

use super::tokenizer::strip_quotes;
use super::types::{AuditColumn, JoinOperator, QueryCondition};

/// Fold tokens left to right into an ordered list of conditions.
///
/// `column:value` tokens on an allow-listed column become column conditions.
/// A `column:value` token on any other column is dropped without an error.
/// Everything else becomes a free-text condition with `column = None`.
pub fn compile_conditions(tokens: &[String]) -> Vec<QueryCondition> {
    let mut conditions = Vec::new();
    let mut join = JoinOperator::And;

    for token in tokens.iter().map(|t| t.trim()) {
        if token.is_empty() {
            continue;
        }

        if token.eq_ignore_ascii_case("AND") {
            join = JoinOperator::And;
            continue;
        }
        if token.eq_ignore_ascii_case("OR") {
            join = JoinOperator::Or;
            continue;
        }

        match split_column(token) {
            Some((name, value)) => match name.parse::<AuditColumn>() {
                Ok(column) => {
                    conditions.push(QueryCondition {
                        column: Some(column),
                        search_term: strip_quotes(value).to_string(),
                        join,
                    });
                    join = JoinOperator::And;
                }
                Err(_) => {
                    // TODO: confirm whether unknown columns should be rejected with a 400
                    tracing::debug!(column = name, "dropping filter on unknown column");
                }
            },
            None => {
                let term = strip_quotes(token);
                if !term.is_empty() {
                    conditions.push(QueryCondition {
                        column: None,
                        search_term: term.to_string(),
                        join,
                    });
                    join = JoinOperator::And;
                }
            }
        }
    }

    conditions
}

/// Split at the first `:` when it has at least one character on each side.
fn split_column(token: &str) -> Option<(&str, &str)> {
    let index = token.find(':')?;
    if index == 0 || index == token.len() - 1 {
        return None;
    }
    Some((&token[..index], &token[index + 1..]))
}
