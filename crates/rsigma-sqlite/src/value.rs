use std::fmt;

use serde::Serialize;

// =============================================================================
// SigmaString: string values with wildcard support
// =============================================================================
//
// `*` is a multi-character wildcard and `?` a single-character wildcard.
// Backslash escapes `*`, `?` and itself; before any other character it is
// kept literally so Windows paths like `C:\Windows\` survive untouched.

/// Wildcard characters that can appear in a [`SigmaString`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpecialChar {
    /// `*`
    WildcardMulti,
    /// `?`
    WildcardSingle,
}

/// A part of a [`SigmaString`]: plain text or a wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StringPart {
    Plain(String),
    Special(SpecialChar),
}

/// A string match value that may contain wildcards.
///
/// `parts` drive LIKE pattern generation, `original` is kept verbatim for
/// match kinds that must not interpret wildcards (regex, CIDR, field
/// references).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SigmaString {
    pub parts: Vec<StringPart>,
    pub original: String,
}

impl SigmaString {
    /// Parse a string, interpreting `*` and `?` as wildcards and `\` as escape.
    pub fn new(s: &str) -> Self {
        let mut parts = Vec::new();
        let mut acc = String::new();
        let mut chars = s.chars();

        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some(next @ ('*' | '?' | '\\')) => acc.push(next),
                    Some(next) => {
                        acc.push('\\');
                        acc.push(next);
                    }
                    None => acc.push('\\'),
                },
                '*' | '?' => {
                    if !acc.is_empty() {
                        parts.push(StringPart::Plain(std::mem::take(&mut acc)));
                    }
                    let special = if c == '*' {
                        SpecialChar::WildcardMulti
                    } else {
                        SpecialChar::WildcardSingle
                    };
                    parts.push(StringPart::Special(special));
                }
                _ => acc.push(c),
            }
        }

        if !acc.is_empty() {
            parts.push(StringPart::Plain(acc));
        }

        SigmaString {
            parts,
            original: s.to_string(),
        }
    }

    /// Create from a raw string with no wildcard parsing (regex patterns, CIDR).
    pub fn from_raw(s: &str) -> Self {
        SigmaString {
            parts: if s.is_empty() {
                Vec::new()
            } else {
                vec![StringPart::Plain(s.to_string())]
            },
            original: s.to_string(),
        }
    }

    /// Returns `true` if the string contains no wildcards.
    pub fn is_plain(&self) -> bool {
        self.parts.iter().all(|p| matches!(p, StringPart::Plain(_)))
    }

    /// Returns `true` if the string contains any wildcard characters.
    pub fn contains_wildcards(&self) -> bool {
        !self.is_plain()
    }

    /// The plain text content, or `None` if wildcards are present.
    pub fn as_plain(&self) -> Option<String> {
        if !self.is_plain() {
            return None;
        }
        Some(
            self.parts
                .iter()
                .filter_map(|p| match p {
                    StringPart::Plain(s) => Some(s.as_str()),
                    StringPart::Special(_) => None,
                })
                .collect(),
        )
    }

    /// The literal of a pure suffix pattern (`*literal`), if this is one.
    ///
    /// Exactly one leading `*` followed by plain text qualifies; `*`, `*a*`,
    /// `a*b` and `*a?b` do not.
    pub fn suffix_literal(&self) -> Option<&str> {
        match self.parts.as_slice() {
            [
                StringPart::Special(SpecialChar::WildcardMulti),
                StringPart::Plain(text),
            ] => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn starts_with_wildcard(&self) -> bool {
        matches!(
            self.parts.first(),
            Some(StringPart::Special(SpecialChar::WildcardMulti))
        )
    }

    pub fn ends_with_wildcard(&self) -> bool {
        matches!(
            self.parts.last(),
            Some(StringPart::Special(SpecialChar::WildcardMulti))
        )
    }

    /// Add a leading and/or trailing `*` unless one is already present.
    ///
    /// This is how `contains`, `startswith` and `endswith` turn into plain
    /// wildcard patterns.
    pub fn with_wildcards(&self, leading: bool, trailing: bool) -> SigmaString {
        let mut parts = self.parts.clone();
        let mut original = self.original.clone();
        if leading && !self.starts_with_wildcard() {
            parts.insert(0, StringPart::Special(SpecialChar::WildcardMulti));
            original.insert(0, '*');
        }
        if trailing && !self.ends_with_wildcard() {
            parts.push(StringPart::Special(SpecialChar::WildcardMulti));
            original.push('*');
        }
        SigmaString { parts, original }
    }
}

impl fmt::Display for SigmaString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

// =============================================================================
// SigmaValue: typed values in field matches
// =============================================================================

/// A typed value from a field match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SigmaValue {
    /// String value (may contain wildcards)
    String(SigmaString),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl SigmaValue {
    /// A string value taken verbatim, without wildcard parsing.
    pub fn raw(s: &str) -> Self {
        SigmaValue::String(SigmaString::from_raw(s))
    }

    /// The textual form of the value, ignoring wildcard structure.
    ///
    /// Returns `None` for `Null`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            SigmaValue::String(s) => Some(s.original.clone()),
            SigmaValue::Integer(n) => Some(n.to_string()),
            SigmaValue::Float(n) => Some(n.to_string()),
            SigmaValue::Bool(b) => Some(b.to_string()),
            SigmaValue::Null => None,
        }
    }
}

impl From<&str> for SigmaValue {
    fn from(s: &str) -> Self {
        SigmaValue::String(SigmaString::new(s))
    }
}

impl From<String> for SigmaValue {
    fn from(s: String) -> Self {
        SigmaValue::String(SigmaString::new(&s))
    }
}

impl From<SigmaString> for SigmaValue {
    fn from(s: SigmaString) -> Self {
        SigmaValue::String(s)
    }
}

impl From<i64> for SigmaValue {
    fn from(n: i64) -> Self {
        SigmaValue::Integer(n)
    }
}

impl From<f64> for SigmaValue {
    fn from(n: f64) -> Self {
        SigmaValue::Float(n)
    }
}

impl From<bool> for SigmaValue {
    fn from(b: bool) -> Self {
        SigmaValue::Bool(b)
    }
}

impl fmt::Display for SigmaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigmaValue::String(s) => write!(f, "{s}"),
            SigmaValue::Integer(n) => write!(f, "{n}"),
            SigmaValue::Float(n) => write!(f, "{n}"),
            SigmaValue::Bool(b) => write!(f, "{b}"),
            SigmaValue::Null => write!(f, "null"),
        }
    }
}
