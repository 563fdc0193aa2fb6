//! Translates tokens into a PostgreSQL `to_tsquery` expression.

use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;

use super::tokenizer::strip_quotes;

// Everything that isn't a word character, whitespace or a hyphen.
static TS_UNSAFE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());

#[derive(Clone, Copy)]
enum Joiner {
    And,
    Or,
}

impl Joiner {
    fn symbol(self) -> &'static str {
        match self {
            Joiner::And => "&",
            Joiner::Or => "|",
        }
    }
}

/// Fold tokens left to right into `term:* & term:* | !term:*` form.
///
/// `AND`/`OR` (any case) set the joiner for the next term, `NOT` negates the
/// token after it. Parentheses are not grouping operators here; they are
/// stripped from whatever token they touch.
pub fn compile_full_text(tokens: &[String]) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut joiner = Joiner::And;
    let mut tokens = tokens.iter().map(|t| t.trim());

    while let Some(token) = tokens.next() {
        if token.is_empty() {
            continue;
        }

        if token.eq_ignore_ascii_case("AND") {
            joiner = Joiner::And;
        } else if token.eq_ignore_ascii_case("OR") {
            joiner = Joiner::Or;
        } else if token.eq_ignore_ascii_case("NOT") {
            let Some(next) = tokens.next() else {
                break;
            };
            if let Some(term) = escape_term(strip_quotes(next)) {
                push_term(&mut parts, joiner, format!("!{term}"));
                joiner = Joiner::And;
            }
        } else if let Some(term) = escape_term(strip_quotes(token)) {
            push_term(&mut parts, joiner, term);
            joiner = Joiner::And;
        }
    }

    parts.join(" ")
}

fn push_term(parts: &mut Vec<String>, joiner: Joiner, term: String) {
    if !parts.is_empty() {
        parts.push(joiner.symbol().to_string());
    }
    parts.push(term);
}

/// Make a literal safe for `to_tsquery` and turn it into a prefix match.
///
/// A multi-word literal becomes an AND of prefix matches:
/// `user login` → `user:*&login:*`. Returns `None` when nothing is left.
fn escape_term(term: &str) -> Option<String> {
    let cleaned = TS_UNSAFE.replace_all(term, "");
    let words = cleaned.split_whitespace().join(":*&");
    if words.is_empty() {
        None
    } else {
        Some(format!("{words}:*"))
    }
}
