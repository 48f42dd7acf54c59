//! `KEY=VALUE` text form of free-form model parameters, as edited in a
//! multi-line text field.

use std::collections::BTreeMap;

pub fn encode_kwargs(entries: &BTreeMap<String, String>) -> String {
    entries
        .iter()
        .map(|(key, value)| format!("{key}={}", quote_value(value)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn quote_value(value: &str) -> String {
    if value.contains('\n') {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
    } else if value.is_empty() || value.contains(' ') || value.contains(['"', '\'']) {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

/// Parses `key = value` lines. Lines without `=` and `#` comments are
/// skipped; one pair of surrounding quotes is stripped. A value opening with a
/// single quote that does not close on the same line continues until a line
/// ending in an unescaped single quote; inside it `\\` and `\'` stand for a
/// backslash and a quote.
pub fn decode_kwargs(text: &str) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();
    let mut pending: Option<(String, String)> = None;

    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if let Some((key, mut value)) = pending.take() {
            value.push('\n');
            value.push_str(line);
            if ends_with_closing_quote(line.trim_end()) {
                let body = value.trim_end();
                entries.insert(key, unescape(&body[1..body.len() - 1]));
            } else {
                pending = Some((key, value));
            }
            continue;
        }

        let Some((key, value)) = split_assignment(line) else {
            continue;
        };
        let closed = value.trim_end().len() >= 2 && ends_with_closing_quote(value.trim_end());
        if value.starts_with('\'') && !closed {
            pending = Some((key.to_string(), value.to_string()));
        } else {
            entries.insert(key.to_string(), strip_quotes(value.trim()).to_string());
        }
    }

    if let Some((key, value)) = pending {
        let unterminated = value.strip_prefix('\'').unwrap_or(&value);
        entries.insert(key, unescape(unterminated));
    }
    entries
}

/// True when `text` ends in a single quote not preceded by an odd run of
/// backslashes.
fn ends_with_closing_quote(text: &str) -> bool {
    let Some(rest) = text.strip_suffix('\'') else {
        return false;
    };
    let backslashes = rest.chars().rev().take_while(|c| *c == '\\').count();
    backslashes % 2 == 0
}

/// Resolves `\\` and `\'`; any other backslash is kept as typed.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next @ ('\\' | '\'')) = chars.peek().copied() {
                out.push(next);
                chars.next();
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Splits `key = value`, returning the trimmed key and the value with leading
/// whitespace removed.
fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() || key.starts_with('#') {
        return None;
    }
    Some((key, value.trim_start()))
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
