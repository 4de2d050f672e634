#![allow(dead_code)]

use rsigma_sqlite::{BackendConfig, ConditionExpr, ConditionNode, Rule, SqliteBackend};

pub const TABLE_NAME: &str = "table";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Backend over `table` with `fieldA` reverse-indexed.
pub fn sqlite_backend() -> SqliteBackend {
    init_logging();
    SqliteBackend::new(BackendConfig::new(TABLE_NAME).with_reverse_indexed_fields(["fieldA"]))
        .unwrap()
}

pub fn backend_with(config: BackendConfig) -> SqliteBackend {
    init_logging();
    SqliteBackend::new(config).unwrap()
}

/// A rule with a single detection named `sel` used as its condition.
pub fn single_selection_rule(title: &str, node: ConditionNode) -> Rule {
    Rule::new(title)
        .with_detection("sel", node)
        .with_condition(ConditionExpr::ident("sel"))
}

pub fn statement(fragment: &str) -> String {
    format!("SELECT * FROM {TABLE_NAME} WHERE {fragment}")
}
