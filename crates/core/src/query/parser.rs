//! Search grammar parser.
//!
//! A raw query is a sequence of whitespace-separated words. Words shaped like
//! `key:value` or `-key:value` become operators; everything else is free
//! text. Values are either a quoted span (`"needs review"`, `'a,b'`) taken
//! literally, or an unquoted run split on commas (`type:pr,issue`).

use std::collections::BTreeMap;

/// A parsed search query. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    operators: BTreeMap<String, Vec<String>>,
    free_text: String,
}

/// Parse a raw search string.
pub fn parse(raw: &str) -> Query {
    Query::parse(raw)
}

impl Query {
    pub fn parse(raw: &str) -> Self {
        let mut operators: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut residual: Vec<&str> = Vec::new();
        let mut rest = raw;

        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }

            let token = scan_key(rest)
                .and_then(|(key, after)| scan_value(after).map(|(values, tail)| (key, values, tail)));

            if let Some((key, values, tail)) = token {
                operators.entry(key.to_lowercase()).or_default().extend(values);
                rest = tail;
            } else {
                let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
                residual.push(&rest[..end]);
                rest = &rest[end..];
            }
        }

        Self { operators, free_text: residual.join(" ") }
    }

    /// Values for `key` (case-insensitive), in the order they appeared.
    pub fn values(&self, key: &str) -> &[String] {
        self.operators.get(&key.to_lowercase()).map_or(&[], Vec::as_slice)
    }

    pub fn has_operator(&self, key: &str) -> bool {
        self.operators.contains_key(&key.to_lowercase())
    }

    /// All operators, keys lower-cased, including ones the filter ignores.
    pub fn operators(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.operators.iter().map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Unconsumed words, whitespace-normalized.
    pub fn free_text(&self) -> &str {
        &self.free_text
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty() && self.free_text.is_empty()
    }
}

/// Match `-?\w+:` at the start of `input`, returning the key and the text
/// after the colon.
fn scan_key(input: &str) -> Option<(&str, &str)> {
    let body_start = usize::from(input.starts_with('-'));
    let body = &input[body_start..];
    let word_len = body.find(|c: char| !(c.is_alphanumeric() || c == '_')).unwrap_or(body.len());
    if word_len == 0 {
        return None;
    }
    let key_end = body_start + word_len;
    input[key_end..].strip_prefix(':').map(|after| (&input[..key_end], after))
}

/// Read a value directly after the colon. `None` when nothing follows.
fn scan_value(input: &str) -> Option<(Vec<String>, &str)> {
    let first = input.chars().next().filter(|c| !c.is_whitespace())?;

    if first == '"' || first == '\'' {
        let body = &input[1..];
        if let Some(close) = body.find(first) {
            let values = if close == 0 { Vec::new() } else { vec![body[..close].to_string()] };
            return Some((values, &body[close + 1..]));
        }
    }

    let end = input.find(char::is_whitespace).unwrap_or(input.len());
    let values = input[..end]
        .split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(ToString::to_string)
        .collect();
    Some((values, &input[end..]))
}
