//! Detection rules and condition resolution.
//!
//! A [`Rule`] keeps its named detections in declaration order together with
//! one or more [`ConditionExpr`]s referencing them by name. Before compiling,
//! each condition is resolved into a plain [`ConditionNode`] tree: identifiers
//! are replaced by their detection and selectors (`1 of selection_*`,
//! `all of them`) are expanded into an Or/And over the matching detections.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::ast::{ConditionNode, Level};
use crate::error::{ConvertError, Result};

// =============================================================================
// Condition expressions
// =============================================================================

/// A parsed rule condition referencing detections by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConditionExpr {
    And(Vec<ConditionExpr>),
    Or(Vec<ConditionExpr>),
    Not(Box<ConditionExpr>),
    /// Reference to a named detection.
    Identifier(String),
    /// Quantified selector: `1 of selection_*`, `all of them`, etc.
    Selector {
        quantifier: Quantifier,
        pattern: SelectorPattern,
    },
}

impl ConditionExpr {
    pub fn ident(name: impl Into<String>) -> Self {
        ConditionExpr::Identifier(name.into())
    }

    /// `1 of <pattern>`
    pub fn any_of(pattern: SelectorPattern) -> Self {
        ConditionExpr::Selector {
            quantifier: Quantifier::Any,
            pattern,
        }
    }

    /// `all of <pattern>`
    pub fn all_of(pattern: SelectorPattern) -> Self {
        ConditionExpr::Selector {
            quantifier: Quantifier::All,
            pattern,
        }
    }
}

impl fmt::Display for ConditionExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionExpr::And(args) => {
                let parts: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "({})", parts.join(" and "))
            }
            ConditionExpr::Or(args) => {
                let parts: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "({})", parts.join(" or "))
            }
            ConditionExpr::Not(arg) => write!(f, "not {arg}"),
            ConditionExpr::Identifier(id) => f.write_str(id),
            ConditionExpr::Selector {
                quantifier,
                pattern,
            } => write!(f, "{quantifier} of {pattern}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Quantifier {
    /// `1 of ...` or `any of ...`
    Any,
    /// `all of ...`
    All,
    /// `N of ...`
    Count(u64),
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantifier::Any => write!(f, "1"),
            Quantifier::All => write!(f, "all"),
            Quantifier::Count(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SelectorPattern {
    /// Every detection whose name does not start with `_`.
    Them,
    /// `selection_*`, `*_filter`, or an exact name.
    Pattern(String),
}

impl SelectorPattern {
    pub fn pattern(pattern: impl Into<String>) -> Self {
        SelectorPattern::Pattern(pattern.into())
    }
}

impl fmt::Display for SelectorPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorPattern::Them => write!(f, "them"),
            SelectorPattern::Pattern(p) => f.write_str(p),
        }
    }
}

// =============================================================================
// Rule
// =============================================================================

/// A detection rule ready for conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub title: String,
    pub id: Option<String>,
    pub level: Option<Level>,
    pub detections: IndexMap<String, ConditionNode>,
    pub conditions: Vec<ConditionExpr>,
}

impl Rule {
    pub fn new(title: impl Into<String>) -> Self {
        Rule {
            title: title.into(),
            id: None,
            level: None,
            detections: IndexMap::new(),
            conditions: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    /// Add a named detection. Re-using a name replaces the earlier detection
    /// in place.
    pub fn with_detection(mut self, name: impl Into<String>, node: ConditionNode) -> Self {
        self.detections.insert(name.into(), node);
        self
    }

    pub fn with_condition(mut self, condition: ConditionExpr) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Resolve every condition into a condition tree, in condition order.
    pub fn resolve_conditions(&self) -> Result<Vec<ConditionNode>> {
        if self.conditions.is_empty() {
            return Err(ConvertError::EmptyConditionTree(format!(
                "rule '{}' has no condition",
                self.title
            )));
        }
        self.conditions
            .iter()
            .map(|c| resolve_condition(c, &self.detections))
            .collect()
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Replace detection references in `expr` with the detections themselves.
pub fn resolve_condition(
    expr: &ConditionExpr,
    detections: &IndexMap<String, ConditionNode>,
) -> Result<ConditionNode> {
    match expr {
        ConditionExpr::Identifier(name) => detections
            .get(name)
            .cloned()
            .ok_or_else(|| ConvertError::UnknownDetection(name.clone())),

        ConditionExpr::And(exprs) => Ok(ConditionNode::And(
            exprs
                .iter()
                .map(|e| resolve_condition(e, detections))
                .collect::<Result<_>>()?,
        )),

        ConditionExpr::Or(exprs) => Ok(ConditionNode::Or(
            exprs
                .iter()
                .map(|e| resolve_condition(e, detections))
                .collect::<Result<_>>()?,
        )),

        ConditionExpr::Not(inner) => Ok(ConditionNode::not(resolve_condition(inner, detections)?)),

        ConditionExpr::Selector {
            quantifier,
            pattern,
        } => {
            let matching: Vec<ConditionNode> = detections
                .iter()
                .filter(|(name, _)| match pattern {
                    SelectorPattern::Them => !name.starts_with('_'),
                    SelectorPattern::Pattern(pat) => pattern_matches(pat, name),
                })
                .map(|(_, node)| node.clone())
                .collect();

            if matching.is_empty() {
                return Err(ConvertError::EmptyConditionTree(format!(
                    "'{quantifier} of {pattern}' matches no detection"
                )));
            }

            match quantifier {
                Quantifier::Any | Quantifier::Count(1) => Ok(ConditionNode::Or(matching)),
                Quantifier::All => Ok(ConditionNode::And(matching)),
                Quantifier::Count(n) => Err(ConvertError::UnsupportedQuantifier(*n)),
            }
        }
    }
}

/// Check if a detection name matches a selector pattern (supports `*` wildcard).
fn pattern_matches(pattern: &str, name: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    if let Some(prefix) = pattern.strip_suffix('*') {
        return name.starts_with(prefix);
    }
    if let Some(suffix) = pattern.strip_prefix('*') {
        return name.ends_with(suffix);
    }
    pattern == name
}
