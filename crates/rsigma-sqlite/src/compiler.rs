//! Compile condition trees into SQL predicates.
//!
//! The compiler walks a [`ConditionNode`] tree and produces a [`Predicate`],
//! a structured intermediate whose `Display` is the WHERE fragment. Field
//! matches are offered to the rewrite hooks first and fall back to the value
//! encoder; boolean nodes map one-to-one onto predicate nodes.
//!
//! Parentheses are decided at render time from operator precedence
//! (`NOT` > `AND` > `OR`): a child is grouped only when its top-level
//! operator binds looser than its parent's.

use std::fmt;

use crate::ast::{ConditionNode, FieldMatch};
use crate::config::BackendConfig;
use crate::encode::{Comparison, encode_value};
use crate::error::{ConvertError, Result};
use crate::field::resolve_column;
use crate::rewrite::Rewrite;
use crate::value::SigmaValue;

// =============================================================================
// Compiled predicate
// =============================================================================

/// A compiled SQL boolean expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Comparison(Comparison),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

/// Binding strength of a predicate's top-level operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Or,
    And,
    Not,
    Atom,
}

impl Predicate {
    fn precedence(&self) -> Precedence {
        match self {
            Predicate::Or(_) => Precedence::Or,
            Predicate::And(_) => Precedence::And,
            Predicate::Not(_) => Precedence::Not,
            Predicate::Comparison(_) => Precedence::Atom,
        }
    }

    fn write_operand(&self, f: &mut fmt::Formatter<'_>, parent: Precedence) -> fmt::Result {
        if self.precedence() < parent {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }

    fn write_joined(
        f: &mut fmt::Formatter<'_>,
        operands: &[Predicate],
        separator: &str,
        parent: Precedence,
    ) -> fmt::Result {
        for (i, operand) in operands.iter().enumerate() {
            if i > 0 {
                f.write_str(separator)?;
            }
            operand.write_operand(f, parent)?;
        }
        Ok(())
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Comparison(c) => write!(f, "{c}"),
            Predicate::And(args) => Self::write_joined(f, args, " AND ", Precedence::And),
            Predicate::Or(args) => Self::write_joined(f, args, " OR ", Precedence::Or),
            Predicate::Not(arg) => {
                f.write_str("NOT ")?;
                arg.write_operand(f, Precedence::Not)
            }
        }
    }
}

// =============================================================================
// Compiler
// =============================================================================

/// Compiles condition trees against one configuration and hook list.
pub struct Compiler<'a> {
    config: &'a BackendConfig,
    rewrites: &'a [Box<dyn Rewrite>],
}

impl<'a> Compiler<'a> {
    pub fn new(config: &'a BackendConfig, rewrites: &'a [Box<dyn Rewrite>]) -> Self {
        Compiler { config, rewrites }
    }

    /// Compile a condition tree into a predicate.
    pub fn compile(&self, node: &ConditionNode) -> Result<Predicate> {
        match node {
            ConditionNode::And(children) => {
                let compiled = self.compile_children(children, "AND")?;
                Ok(collapse(compiled, Predicate::And))
            }
            ConditionNode::Or(children) => {
                let compiled = self.compile_children(children, "OR")?;
                Ok(collapse(compiled, Predicate::Or))
            }
            ConditionNode::Not(child) => Ok(Predicate::Not(Box::new(self.compile(child)?))),
            ConditionNode::Match(field_match) => self.compile_field_match(field_match),
        }
    }

    fn compile_children(&self, children: &[ConditionNode], op: &str) -> Result<Vec<Predicate>> {
        if children.is_empty() {
            return Err(ConvertError::EmptyConditionTree(format!(
                "{op} node without children"
            )));
        }
        children.iter().map(|c| self.compile(c)).collect()
    }

    /// One comparison per value, OR-linked.
    fn compile_field_match(&self, field_match: &FieldMatch) -> Result<Predicate> {
        if field_match.values.is_empty() {
            return Err(ConvertError::EmptyConditionTree(format!(
                "field '{}' has no values",
                field_match.field
            )));
        }
        let comparisons = field_match
            .values
            .iter()
            .map(|value| self.compile_value(field_match, value).map(Predicate::Comparison))
            .collect::<Result<Vec<_>>>()?;
        Ok(collapse(comparisons, Predicate::Or))
    }

    fn compile_value(&self, field_match: &FieldMatch, value: &SigmaValue) -> Result<Comparison> {
        let FieldMatch { field, kind, .. } = field_match;

        for hook in self.rewrites {
            if let Some(comparison) = hook.rewrite(field, *kind, value, self.config)? {
                log::trace!("rewrite '{}' applied to field '{field}'", hook.name());
                return Ok(comparison);
            }
        }

        let (operator, operand) = encode_value(*kind, value, self.config)?;
        Ok(Comparison::new(
            resolve_column(field, self.config),
            operator,
            operand,
        ))
    }
}

/// A single operand stands for itself; more are combined with `ctor`.
fn collapse(mut operands: Vec<Predicate>, ctor: fn(Vec<Predicate>) -> Predicate) -> Predicate {
    if operands.len() == 1 {
        operands.remove(0)
    } else {
        ctor(operands)
    }
}

// =============================================================================
// Tests
// =============================================================================


// =============================================================================
// Property-based tests
// =============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::ast::MatchKind;
    use crate::rewrite::sqlite_rewrites;
    use proptest::prelude::*;

    fn leaf() -> impl Strategy<Value = ConditionNode> {
        (
            prop::sample::select(vec!["fieldA", "fieldB", "field name"]),
            prop::collection::vec("[a-z]{1,6}\\*?", 1..4),
        )
            .prop_map(|(field, values)| ConditionNode::field(field, MatchKind::Equals, values))
    }

    fn tree() -> impl Strategy<Value = ConditionNode> {
        leaf().prop_recursive(4, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 1..4).prop_map(ConditionNode::And),
                prop::collection::vec(inner.clone(), 1..4).prop_map(ConditionNode::Or),
                inner.prop_map(ConditionNode::not),
            ]
        })
    }

    fn render(node: &ConditionNode) -> String {
        let config = BackendConfig::new("logs").with_reverse_indexed_fields(["fieldA"]);
        let rewrites = sqlite_rewrites();
        Compiler::new(&config, &rewrites)
            .compile(node)
            .unwrap()
            .to_string()
    }

    // -------------------------------------------------------------------------
    // 1. Compiling the same tree twice yields byte-identical output
    // -------------------------------------------------------------------------
    proptest! {
        #[test]
        fn compilation_is_deterministic(node in tree()) {
            prop_assert_eq!(render(&node), render(&node));
        }
    }

    // -------------------------------------------------------------------------
    // 2. Parentheses are always balanced
    // -------------------------------------------------------------------------
    proptest! {
        #[test]
        fn parentheses_balanced(node in tree()) {
            let sql = render(&node);
            let mut depth = 0i32;
            for c in sql.chars() {
                match c {
                    '(' => depth += 1,
                    ')' => depth -= 1,
                    _ => {}
                }
                prop_assert!(depth >= 0, "unbalanced: {}", sql);
            }
            prop_assert_eq!(depth, 0, "unbalanced: {}", sql);
        }
    }

    // -------------------------------------------------------------------------
    // 3. A pure OR tree of leaves never needs parentheses
    // -------------------------------------------------------------------------
    proptest! {
        #[test]
        fn or_of_leaves_has_no_grouping(
            leaves in prop::collection::vec(leaf(), 1..5),
        ) {
            let sql = render(&ConditionNode::Or(leaves));
            prop_assert!(!sql.contains('('), "unexpected grouping: {}", sql);
        }
    }
}
