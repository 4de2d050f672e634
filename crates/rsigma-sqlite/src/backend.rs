//! The SQLite backend: configuration plus rewrite hooks, converting
//! condition trees and rules into query strings.

use rayon::prelude::*;

use crate::ast::ConditionNode;
use crate::compiler::{Compiler, Predicate};
use crate::config::{BackendConfig, OutputFormat};
use crate::error::Result;
use crate::query::{render_rule, render_statement};
use crate::rewrite::{Rewrite, sqlite_rewrites};
use crate::rule::Rule;

/// Converts Sigma condition trees into SQLite queries.
///
/// The backend is immutable after construction and can be shared across
/// threads.
///
/// # Example
///
/// ```rust
/// use rsigma_sqlite::{BackendConfig, ConditionNode, SqliteBackend};
///
/// let backend = SqliteBackend::new(
///     BackendConfig::new("logs").with_reverse_indexed_fields(["CommandLine"]),
/// )
/// .unwrap();
/// let node = ConditionNode::and([
///     ConditionNode::eq("CommandLine", "*whoami"),
///     ConditionNode::eq("User", "admin"),
/// ]);
///
/// assert_eq!(
///     backend.convert_condition(&node).unwrap(),
///     "SELECT * FROM logs WHERE REV(CommandLine) LIKE 'imaohw%' AND User LIKE 'admin'"
/// );
/// ```
#[derive(Debug)]
pub struct SqliteBackend {
    config: BackendConfig,
    rewrites: Vec<Box<dyn Rewrite>>,
}

impl SqliteBackend {
    /// Create a backend with the SQLite rewrite hooks registered.
    ///
    /// Fails with `InvalidConfig` when the configuration does not pass
    /// [`BackendConfig::validate`].
    pub fn new(config: BackendConfig) -> Result<Self> {
        config.validate()?;
        Ok(SqliteBackend {
            config,
            rewrites: sqlite_rewrites(),
        })
    }

    /// Replace the registered rewrite hooks. Hooks are consulted in order.
    pub fn with_rewrites(mut self, rewrites: Vec<Box<dyn Rewrite>>) -> Self {
        self.rewrites = rewrites;
        self
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Compile a condition tree into its structured predicate.
    pub fn compile(&self, node: &ConditionNode) -> Result<Predicate> {
        Compiler::new(&self.config, &self.rewrites).compile(node)
    }

    /// Convert a single condition tree.
    ///
    /// Returns the bare predicate under [`OutputFormat::Fragment`] and a full
    /// `SELECT` statement otherwise.
    pub fn convert_condition(&self, node: &ConditionNode) -> Result<String> {
        let fragment = self.compile(node)?.to_string();
        Ok(match self.config.format {
            OutputFormat::Fragment => fragment,
            OutputFormat::Default | OutputFormat::Json => {
                render_statement(&self.config.table, &fragment)
            }
        })
    }

    /// Convert a rule into its output strings, one per condition for the
    /// statement formats or a single JSON document.
    pub fn convert_rule(&self, rule: &Rule) -> Result<Vec<String>> {
        let fragments = rule
            .resolve_conditions()?
            .iter()
            .map(|node| self.compile(node).map(|p| p.to_string()))
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "converted rule '{}' into {} condition(s)",
            rule.title,
            fragments.len()
        );
        render_rule(rule, fragments, &self.config)
    }

    /// Convert a batch of rules, stopping at the first failing rule.
    pub fn convert(&self, rules: &[Rule]) -> Result<Vec<String>> {
        let mut queries = Vec::new();
        for rule in rules {
            queries.extend(self.convert_rule(rule)?);
        }
        Ok(queries)
    }

    /// Convert a batch of rules in parallel.
    ///
    /// Returns one result per rule in input order; a failing rule does not
    /// affect the others.
    pub fn convert_each(&self, rules: &[Rule]) -> Vec<Result<Vec<String>>> {
        rules
            .par_iter()
            .map(|rule| {
                let result = self.convert_rule(rule);
                if let Err(e) = &result {
                    log::warn!("skipping rule '{}': {e}", rule.title);
                }
                result
            })
            .collect()
    }
}
