//! Backend configuration.
//!
//! A [`BackendConfig`] is built once, either programmatically or from YAML,
//! and is read-only for the lifetime of the backend.
//!
//! ```rust
//! use rsigma_sqlite::{BackendConfig, OutputFormat};
//!
//! let config = BackendConfig::from_yaml_str(r#"
//! table: logs
//! reverse_indexed_fields:
//!   - CommandLine
//! format: json
//! "#).unwrap();
//!
//! assert_eq!(config.table, "logs");
//! assert!(config.is_reverse_indexed("CommandLine"));
//! assert_eq!(config.format, OutputFormat::Json);
//! ```

use std::collections::HashSet;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};

const DEFAULT_REVERSE_FUNCTION: &str = "REV";
const DEFAULT_QUOTE: char = '`';
const DEFAULT_QUOTE_PATTERN: &str = r"\s";
const IDENTIFIER_QUOTES: [char; 2] = ['`', '"'];

// =============================================================================
// Output format
// =============================================================================

/// Rendering strategy applied to each compiled rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `SELECT * FROM <table> WHERE <predicate>`, one statement per condition.
    #[default]
    Default,
    /// The bare predicate, one per condition.
    Fragment,
    /// One JSON document per rule carrying metadata and its statements.
    Json,
}

// =============================================================================
// Identifier quoting
// =============================================================================

/// When and how column identifiers are quoted.
#[derive(Debug, Clone)]
pub struct IdentifierQuoting {
    quote: char,
    pattern: Regex,
}

impl IdentifierQuoting {
    /// Quote with `quote` every identifier in which `pattern` finds a match.
    ///
    /// `quote` must be an SQLite identifier quote, a backtick or a double
    /// quote. A single quote would turn column references into string
    /// literals.
    pub fn new(quote: char, pattern: &str) -> Result<Self> {
        if !IDENTIFIER_QUOTES.contains(&quote) {
            return Err(ConvertError::InvalidConfig(format!(
                "quote character {quote:?} is not an identifier quote (expected '`' or '\"')"
            )));
        }
        let pattern = Regex::new(pattern).map_err(|e| {
            ConvertError::InvalidConfig(format!("invalid quoting pattern '{pattern}': {e}"))
        })?;
        Ok(IdentifierQuoting { quote, pattern })
    }

    pub fn quote_char(&self) -> char {
        self.quote
    }

    pub fn needs_quoting(&self, ident: &str) -> bool {
        self.pattern.is_match(ident)
    }
}

impl Default for IdentifierQuoting {
    fn default() -> Self {
        IdentifierQuoting {
            quote: DEFAULT_QUOTE,
            pattern: Regex::new(DEFAULT_QUOTE_PATTERN).expect("default quoting pattern is valid"),
        }
    }
}

// =============================================================================
// Backend configuration
// =============================================================================

/// Immutable configuration of a SQL backend instance.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Table queried by every generated statement.
    pub table: String,
    /// Fields backed by a reversed-string index.
    pub reverse_indexed_fields: HashSet<String>,
    /// SQL function applied to a reverse-indexed column (`REV` by default).
    pub reverse_function: String,
    pub quoting: IdentifierQuoting,
    pub format: OutputFormat,
}

impl BackendConfig {
    pub fn new(table: impl Into<String>) -> Self {
        BackendConfig {
            table: table.into(),
            reverse_indexed_fields: HashSet::new(),
            reverse_function: DEFAULT_REVERSE_FUNCTION.to_string(),
            quoting: IdentifierQuoting::default(),
            format: OutputFormat::Default,
        }
    }

    pub fn with_reverse_indexed_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reverse_indexed_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_reverse_function(mut self, function: impl Into<String>) -> Self {
        self.reverse_function = function.into();
        self
    }

    pub fn with_quoting(mut self, quoting: IdentifierQuoting) -> Self {
        self.quoting = quoting;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn is_reverse_indexed(&self, field: &str) -> bool {
        self.reverse_indexed_fields.contains(field)
    }

    /// Check the settings that end up verbatim in generated SQL.
    ///
    /// Runs on every YAML load and on backend construction.
    pub fn validate(&self) -> Result<()> {
        if self.table.trim().is_empty() {
            return Err(ConvertError::InvalidConfig("table name must not be empty".into()));
        }
        if !is_sql_function_name(&self.reverse_function) {
            return Err(ConvertError::InvalidConfig(format!(
                "reverse function '{}' is not a valid SQL function name",
                self.reverse_function
            )));
        }
        Ok(())
    }

    /// Parse a configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let raw: RawConfig = serde_yaml::from_str(yaml)?;
        raw.build()
    }

    /// Load a configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }
}

// =============================================================================
// YAML representation
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    table: String,
    #[serde(default)]
    reverse_indexed_fields: Vec<String>,
    #[serde(default = "default_reverse_function")]
    reverse_function: String,
    #[serde(default)]
    quoting: RawQuoting,
    #[serde(default)]
    format: OutputFormat,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawQuoting {
    quote: char,
    pattern: String,
}

impl Default for RawQuoting {
    fn default() -> Self {
        RawQuoting {
            quote: DEFAULT_QUOTE,
            pattern: DEFAULT_QUOTE_PATTERN.to_string(),
        }
    }
}

fn default_reverse_function() -> String {
    DEFAULT_REVERSE_FUNCTION.to_string()
}

impl RawConfig {
    fn build(self) -> Result<BackendConfig> {
        let quoting = IdentifierQuoting::new(self.quoting.quote, &self.quoting.pattern)?;
        let config = BackendConfig::new(self.table)
            .with_reverse_indexed_fields(self.reverse_indexed_fields)
            .with_reverse_function(self.reverse_function)
            .with_quoting(quoting)
            .with_format(self.format);
        config.validate()?;
        Ok(config)
    }
}

fn is_sql_function_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_yaml() {
        let config = BackendConfig::from_yaml_str("table: events").unwrap();
        assert_eq!(config.table, "events");
        assert!(config.reverse_indexed_fields.is_empty());
        assert_eq!(config.reverse_function, "REV");
        assert_eq!(config.quoting.quote_char(), '`');
        assert!(config.quoting.needs_quoting("field name"));
        assert!(!config.quoting.needs_quoting("field_name"));
        assert_eq!(config.format, OutputFormat::Default);
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
table: logs
reverse_indexed_fields: [fieldA, fieldC]
reverse_function: reverse
quoting:
  quote: '"'
  pattern: '[^\w]'
format: fragment
"#;
        let config = BackendConfig::from_yaml_str(yaml).unwrap();
        assert!(config.is_reverse_indexed("fieldA"));
        assert!(config.is_reverse_indexed("fieldC"));
        assert!(!config.is_reverse_indexed("fieldB"));
        assert_eq!(config.reverse_function, "reverse");
        assert_eq!(config.quoting.quote_char(), '"');
        assert!(config.quoting.needs_quoting("event.id"));
        assert_eq!(config.format, OutputFormat::Fragment);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = BackendConfig::from_yaml_str("table: logs\ntabel: typo").unwrap_err();
        assert!(matches!(err, ConvertError::Yaml(_)), "got: {err}");
    }

    #[test]
    fn test_empty_table_rejected() {
        let err = BackendConfig::from_yaml_str("table: ''").unwrap_err();
        assert!(matches!(err, ConvertError::InvalidConfig(_)), "got: {err}");
    }

    #[test]
    fn test_invalid_reverse_function_rejected() {
        let err = BackendConfig::from_yaml_str("table: logs\nreverse_function: 'REV('").unwrap_err();
        assert!(matches!(err, ConvertError::InvalidConfig(_)), "got: {err}");
    }

    #[test]
    fn test_invalid_quoting_pattern_rejected() {
        let yaml = "table: logs\nquoting:\n  pattern: '[unclosed'";
        let err = BackendConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidConfig(_)), "got: {err}");
    }

    #[test]
    fn test_single_quote_rejected_as_identifier_quote() {
        let yaml = "table: logs\nquoting:\n  quote: \"'\"";
        let err = BackendConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidConfig(_)), "got: {err}");

        let err = IdentifierQuoting::new('[', r"\s").unwrap_err();
        assert!(matches!(err, ConvertError::InvalidConfig(_)), "got: {err}");
        assert!(IdentifierQuoting::new('"', r"\s").is_ok());
    }

    #[test]
    fn test_validate_programmatic_config() {
        assert!(BackendConfig::new("logs").validate().is_ok());

        for config in [
            BackendConfig::new(""),
            BackendConfig::new("   "),
            BackendConfig::new("logs").with_reverse_function("drop table"),
            BackendConfig::new("logs").with_reverse_function(""),
        ] {
            let err = config.validate().unwrap_err();
            assert!(matches!(err, ConvertError::InvalidConfig(_)), "got: {err}");
        }
    }

    #[test]
    fn test_output_format_names() {
        let config = BackendConfig::from_yaml_str("table: logs\nformat: json").unwrap();
        assert_eq!(config.format, OutputFormat::Json);
        assert!(BackendConfig::from_yaml_str("table: logs\nformat: format1").is_err());
    }
}
