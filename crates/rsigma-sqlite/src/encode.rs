//! Value encoding: one match value → SQL operator and operand.
//!
//! The encoder knows nothing about columns or rewrites. It decides which
//! operator a `(kind, value)` pair maps to and renders the right-hand side.
//! Lists of values are expanded by the compiler, one encoding per value.

use std::fmt;

use crate::ast::MatchKind;
use crate::config::BackendConfig;
use crate::error::{ConvertError, Result};
use crate::field::{Column, resolve_column};
use crate::value::{SigmaString, SigmaValue, SpecialChar, StringPart};

const LIKE_WILDCARD_MULTI: char = '%';
const LIKE_WILDCARD_SINGLE: char = '_';

// =============================================================================
// Predicate atoms
// =============================================================================

/// SQL comparison operators emitted by this backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Like,
    Regexp,
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
    IsNull,
    IsNotNull,
}

impl Operator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Operator::Like => "LIKE",
            Operator::Regexp => "REGEXP",
            Operator::Eq => "=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
        }
    }

    /// Whether the operator takes a right-hand operand.
    pub fn is_binary(&self) -> bool {
        !matches!(self, Operator::IsNull | Operator::IsNotNull)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A string literal, rendered single-quoted.
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Column(Column),
    /// No operand (`IS NULL`, `IS NOT NULL`).
    None,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Text(s) => f.write_str(&quote_string(s)),
            Operand::Integer(n) => write!(f, "{n}"),
            Operand::Float(n) => write!(f, "{n}"),
            Operand::Bool(b) => write!(f, "{b}"),
            Operand::Column(c) => write!(f, "{c}"),
            Operand::None => Ok(()),
        }
    }
}

/// A single column comparison, the leaf of every compiled predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub column: Column,
    pub operator: Operator,
    pub operand: Operand,
}

impl Comparison {
    pub fn new(column: Column, operator: Operator, operand: Operand) -> Self {
        Comparison {
            column,
            operator,
            operand,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operator.is_binary() {
            write!(f, "{} {} {}", self.column, self.operator, self.operand)
        } else {
            write!(f, "{} {}", self.column, self.operator)
        }
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Encode one value of a field match into `(operator, operand)`.
///
/// `cidr` is not handled here: it is only convertible through a rewrite hook,
/// so reaching the encoder with it is `UnsupportedMatchKind`.
pub fn encode_value(
    kind: MatchKind,
    value: &SigmaValue,
    config: &BackendConfig,
) -> Result<(Operator, Operand)> {
    match kind {
        MatchKind::Equals | MatchKind::Wildcard => encode_equals(kind, value),
        MatchKind::Contains => encode_wrapped(kind, value, true, true),
        MatchKind::StartsWith => encode_wrapped(kind, value, false, true),
        MatchKind::EndsWith => encode_wrapped(kind, value, true, false),
        MatchKind::Regex => {
            let pattern = value.as_text().ok_or_else(|| {
                ConvertError::IncompatibleValue("null value for regular expression".into())
            })?;
            Ok((Operator::Regexp, Operand::Text(pattern)))
        }
        MatchKind::Lt => Ok((Operator::Lt, numeric_operand(kind, value)?)),
        MatchKind::Lte => Ok((Operator::Lte, numeric_operand(kind, value)?)),
        MatchKind::Gt => Ok((Operator::Gt, numeric_operand(kind, value)?)),
        MatchKind::Gte => Ok((Operator::Gte, numeric_operand(kind, value)?)),
        MatchKind::Exists => {
            if exists_expectation(value)? {
                Ok((Operator::IsNotNull, Operand::None))
            } else {
                Ok((Operator::IsNull, Operand::None))
            }
        }
        MatchKind::FieldRef => match value {
            SigmaValue::String(s) => Ok((
                Operator::Eq,
                Operand::Column(resolve_column(&s.original, config)),
            )),
            other => Err(ConvertError::IncompatibleValue(format!(
                "fieldref requires a field name, got: {other}"
            ))),
        },
        MatchKind::Cidr | MatchKind::Expand => Err(ConvertError::UnsupportedMatchKind(kind)),
    }
}

fn encode_equals(kind: MatchKind, value: &SigmaValue) -> Result<(Operator, Operand)> {
    Ok(match value {
        SigmaValue::String(s) => (Operator::Like, Operand::Text(like_pattern(s))),
        SigmaValue::Integer(n) => (Operator::Eq, Operand::Integer(*n)),
        SigmaValue::Float(n) => (Operator::Eq, finite_float(kind, *n)?),
        SigmaValue::Bool(b) => (Operator::Eq, Operand::Bool(*b)),
        SigmaValue::Null => (Operator::IsNull, Operand::None),
    })
}

/// `contains`/`startswith`/`endswith`: add the implied wildcards, then LIKE.
fn encode_wrapped(
    kind: MatchKind,
    value: &SigmaValue,
    leading: bool,
    trailing: bool,
) -> Result<(Operator, Operand)> {
    let s = match value {
        SigmaValue::String(s) => s.clone(),
        SigmaValue::Integer(_) | SigmaValue::Float(_) => {
            SigmaString::from_raw(&value.to_string())
        }
        SigmaValue::Bool(_) | SigmaValue::Null => {
            return Err(ConvertError::IncompatibleValue(format!(
                "{kind} requires a string value, got: {value}"
            )));
        }
    };
    let pattern = like_pattern(&s.with_wildcards(leading, trailing));
    Ok((Operator::Like, Operand::Text(pattern)))
}

fn numeric_operand(kind: MatchKind, value: &SigmaValue) -> Result<Operand> {
    match value {
        SigmaValue::Integer(n) => Ok(Operand::Integer(*n)),
        SigmaValue::Float(n) => finite_float(kind, *n),
        SigmaValue::String(s) => {
            let text = s.original.trim();
            if let Ok(n) = text.parse::<i64>() {
                Ok(Operand::Integer(n))
            } else if let Ok(n) = text.parse::<f64>() {
                finite_float(kind, n)
            } else {
                Err(ConvertError::IncompatibleValue(format!(
                    "{kind} requires a numeric value, got: {text}"
                )))
            }
        }
        other => Err(ConvertError::IncompatibleValue(format!(
            "{kind} requires a numeric value, got: {other}"
        ))),
    }
}

/// SQL has no literal for infinities or NaN.
fn finite_float(kind: MatchKind, n: f64) -> Result<Operand> {
    if n.is_finite() {
        Ok(Operand::Float(n))
    } else {
        Err(ConvertError::IncompatibleValue(format!(
            "{kind} requires a finite number, got: {n}"
        )))
    }
}

/// `exists: true|yes` checks presence; `false|no` checks absence.
fn exists_expectation(value: &SigmaValue) -> Result<bool> {
    match value {
        SigmaValue::Bool(b) => Ok(*b),
        SigmaValue::String(s) => match s.original.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Ok(true),
            "false" | "no" => Ok(false),
            other => Err(ConvertError::IncompatibleValue(format!(
                "exists requires a boolean, got: {other}"
            ))),
        },
        other => Err(ConvertError::IncompatibleValue(format!(
            "exists requires a boolean, got: {other}"
        ))),
    }
}

/// Translate a Sigma wildcard string into a LIKE pattern.
///
/// `*` becomes `%` and `?` becomes `_`; plain text is kept as-is.
pub fn like_pattern(s: &SigmaString) -> String {
    let mut pattern = String::with_capacity(s.original.len());
    for part in &s.parts {
        match part {
            StringPart::Plain(text) => pattern.push_str(text),
            StringPart::Special(SpecialChar::WildcardMulti) => pattern.push(LIKE_WILDCARD_MULTI),
            StringPart::Special(SpecialChar::WildcardSingle) => {
                pattern.push(LIKE_WILDCARD_SINGLE)
            }
        }
    }
    pattern
}

/// Render a SQL string literal, doubling embedded single quotes.
pub fn quote_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
