//! Whitespace tokenizer that keeps quoted phrases together.

#[derive(Clone, Copy)]
enum ScanState {
    Normal,
    InQuote(char),
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

/// Split `text` on whitespace, keeping `"..."` and `'...'` runs intact.
///
/// Quote characters stay in the emitted token. An unterminated quote runs to
/// the end of the input. There is no escaping inside quotes.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut state = ScanState::Normal;

    for c in text.chars() {
        match state {
            ScanState::Normal if is_quote(c) => {
                state = ScanState::InQuote(c);
                current.push(c);
            }
            ScanState::Normal if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            ScanState::InQuote(quote) if c == quote => {
                state = ScanState::Normal;
                current.push(c);
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// Remove any leading and trailing quote characters.
pub fn strip_quotes(token: &str) -> &str {
    token.trim_matches(is_quote)
}
