//! # rsigma-sqlite
//!
//! SQLite query backend for Sigma detection rules.
//!
//! This crate turns already-parsed Sigma condition trees into SQL `WHERE`
//! predicates and wraps them in `SELECT * FROM <table> WHERE ...` statements.
//!
//! ## Architecture
//!
//! - **Rule resolution** ([`rule`]): named detections and condition
//!   expressions (`selection and not filter`, `1 of sel*`) are resolved into a
//!   plain [`ConditionNode`] tree.
//! - **Compilation** ([`compiler`]): the tree is compiled into a [`Predicate`].
//!   Each field/value pair is offered to the backend's [`Rewrite`] hooks
//!   (reverse-indexed suffix search, CIDR prefixes) before falling back to the
//!   value encoder ([`encode`]).
//! - **Assembly** ([`query`]): predicates are rendered per [`OutputFormat`].
//!
//! ## Quick Start
//!
//! ```rust
//! use rsigma_sqlite::{
//!     BackendConfig, ConditionExpr, ConditionNode, MatchKind, Rule, SelectorPattern,
//!     SqliteBackend,
//! };
//!
//! let backend = SqliteBackend::new(BackendConfig::new("events"))?;
//!
//! let rule = Rule::new("Whoami Execution")
//!     .with_detection(
//!         "selection_img",
//!         ConditionNode::field("Image", MatchKind::EndsWith, ["\\whoami.exe"]),
//!     )
//!     .with_detection("selection_net", ConditionNode::cidr("SourceIp", "10.0.0.0/8"))
//!     .with_condition(ConditionExpr::all_of(SelectorPattern::pattern("selection_*")));
//!
//! let queries = backend.convert_rule(&rule)?;
//! assert_eq!(
//!     queries,
//!     vec!["SELECT * FROM events WHERE Image LIKE '%\\whoami.exe' AND SourceIp LIKE '10.%'"]
//! );
//! # Ok::<(), rsigma_sqlite::ConvertError>(())
//! ```

pub mod ast;
pub mod backend;
pub mod compiler;
pub mod config;
pub mod encode;
pub mod error;
pub mod field;
pub mod query;
pub mod rewrite;
pub mod rule;
pub mod value;

// Re-export the most commonly used types at crate root
pub use ast::{ConditionNode, FieldMatch, Level, MatchKind};
pub use backend::SqliteBackend;
pub use compiler::{Compiler, Predicate};
pub use config::{BackendConfig, IdentifierQuoting, OutputFormat};
pub use encode::{Comparison, Operand, Operator, encode_value};
pub use error::{ConvertError, Result};
pub use field::{Column, resolve_column};
pub use query::render_statement;
pub use rewrite::{CidrPrefix, ReverseSuffix, Rewrite, sqlite_rewrites};
pub use rule::{ConditionExpr, Quantifier, Rule, SelectorPattern};
pub use value::{SigmaString, SigmaValue};
