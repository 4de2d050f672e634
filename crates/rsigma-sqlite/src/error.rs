//! Conversion error types.

use thiserror::Error;

use crate::ast::MatchKind;

/// Errors that can occur while converting a rule into SQL.
///
/// Every variant is terminal for the rule being converted. Batch conversion
/// reports them per rule without aborting the remaining rules.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// A match modifier has no translation for this backend.
    #[error("unsupported match kind: {0}")]
    UnsupportedMatchKind(MatchKind),

    /// A CIDR value could not be parsed, or its prefix is outside 0–32.
    #[error("malformed CIDR '{0}'")]
    MalformedCidr(String),

    /// A well-formed CIDR value that cannot be expressed as a LIKE prefix.
    #[error("unsupported CIDR '{0}': only octet-aligned IPv4 prefixes can be converted")]
    UnsupportedCidr(String),

    /// A node with no children (or a field match with no values) reached the compiler.
    #[error("empty condition: {0}")]
    EmptyConditionTree(String),

    /// A value type is incompatible with the match kind.
    #[error("incompatible value for match kind: {0}")]
    IncompatibleValue(String),

    /// A detection referenced in a condition was not found.
    #[error("unknown detection identifier: {0}")]
    UnknownDetection(String),

    /// A selector quantifier other than `1`/`any`/`all`.
    #[error("unsupported quantifier '{0} of': only '1 of' and 'all of' can be converted")]
    UnsupportedQuantifier(u64),

    /// The backend configuration is invalid.
    #[error("invalid backend configuration: {0}")]
    InvalidConfig(String),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ConvertError>;
