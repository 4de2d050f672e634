//! Field name → column reference resolution.

use std::fmt;

use crate::ast::MatchKind;
use crate::config::{BackendConfig, IdentifierQuoting};
use crate::value::SigmaValue;

/// A column reference as it appears on the left-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    ident: String,
    function: Option<String>,
}

impl Column {
    /// A column referenced by an already-quoted identifier.
    pub fn new(ident: impl Into<String>) -> Self {
        Column {
            ident: ident.into(),
            function: None,
        }
    }

    /// Wrap the column in a single-argument SQL function call.
    pub fn wrapped(mut self, function: &str) -> Self {
        self.function = Some(function.to_string());
        self
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.function {
            Some(function) => write!(f, "{function}({})", self.ident),
            None => f.write_str(&self.ident),
        }
    }
}

/// Resolve a field name into a plain column reference.
pub fn resolve_column(field: &str, config: &BackendConfig) -> Column {
    Column::new(quote_identifier(field, &config.quoting))
}

/// Quote `field` if the quoting rule asks for it. Embedded quote characters
/// are doubled.
pub fn quote_identifier(field: &str, quoting: &IdentifierQuoting) -> String {
    if !quoting.needs_quoting(field) {
        return field.to_string();
    }
    let quote = quoting.quote_char();
    let mut quoted = String::with_capacity(field.len() + 2);
    quoted.push(quote);
    for c in field.chars() {
        if c == quote {
            quoted.push(quote);
        }
        quoted.push(c);
    }
    quoted.push(quote);
    quoted
}

/// The suffix literal to search for on the reversed column, when the
/// reverse-index rewrite applies to this field match.
///
/// Applies only to reverse-indexed fields and pure suffix patterns: `*text`
/// under `equals`/`wildcard`, or a plain `text` under `endswith`.
pub fn reverse_index_suffix(
    field: &str,
    kind: MatchKind,
    value: &SigmaValue,
    config: &BackendConfig,
) -> Option<String> {
    if !config.is_reverse_indexed(field) {
        return None;
    }
    let SigmaValue::String(s) = value else {
        return None;
    };
    match kind {
        MatchKind::Equals | MatchKind::Wildcard => s.suffix_literal().map(str::to_string),
        MatchKind::EndsWith => s
            .with_wildcards(true, false)
            .suffix_literal()
            .map(str::to_string),
        _ => None,
    }
}

/// Reverse a string by characters.
pub fn reverse_text(text: &str) -> String {
    text.chars().rev().collect()
}
