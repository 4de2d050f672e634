//! Query assembly and output formats.

use serde::Serialize;

use crate::ast::Level;
use crate::config::{BackendConfig, OutputFormat};
use crate::error::Result;
use crate::rule::Rule;

/// Wrap a WHERE fragment into the fixed table-query skeleton.
pub fn render_statement(table: &str, fragment: &str) -> String {
    format!("SELECT * FROM {table} WHERE {fragment}")
}

/// JSON document emitted per rule by [`OutputFormat::Json`].
#[derive(Debug, Serialize)]
struct JsonQuery<'a> {
    title: &'a str,
    id: Option<&'a str>,
    level: Option<Level>,
    rule: Vec<String>,
}

/// Package the compiled fragments of one rule according to the configured
/// output format.
///
/// `fragments` holds one WHERE fragment per rule condition, in condition
/// order. `Default` yields one statement per fragment, `Fragment` returns them
/// unchanged, and `Json` yields a single document.
pub fn render_rule(
    rule: &Rule,
    fragments: Vec<String>,
    config: &BackendConfig,
) -> Result<Vec<String>> {
    match config.format {
        OutputFormat::Default => Ok(statements(&config.table, &fragments)),
        OutputFormat::Fragment => Ok(fragments),
        OutputFormat::Json => {
            let doc = JsonQuery {
                title: &rule.title,
                id: rule.id.as_deref(),
                level: rule.level,
                rule: statements(&config.table, &fragments),
            };
            Ok(vec![serde_json::to_string(&doc)?])
        }
    }
}

fn statements(table: &str, fragments: &[String]) -> Vec<String> {
    fragments
        .iter()
        .map(|f| render_statement(table, f))
        .collect()
}
