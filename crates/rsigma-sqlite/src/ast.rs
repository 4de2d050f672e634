//! Condition tree types consumed by the compiler.
//!
//! A rule parser (or any other producer) hands the backend a tree of
//! [`ConditionNode`]s whose leaves are already-resolved [`FieldMatch`]es.
//! The compiler only reads these nodes.

use std::fmt;

use serde::Serialize;

use crate::value::SigmaValue;

// =============================================================================
// Match kinds
// =============================================================================

/// How a field is compared against its values.
///
/// Mirrors the Sigma field modifiers that survive processing pipelines. The
/// string-shaped modifiers (`contains`, `startswith`, `endswith`) are kept
/// distinct so backend rewrites can see the intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Equals,
    Wildcard,
    Contains,
    StartsWith,
    EndsWith,
    Regex,
    Cidr,
    Lt,
    Lte,
    Gt,
    Gte,
    Exists,
    FieldRef,
    Expand,
}

impl MatchKind {
    /// Parse a Sigma modifier identifier (`re`, `cidr`, `endswith`, ...).
    ///
    /// The empty string stands for a field without modifiers.
    pub fn from_modifier(s: &str) -> Option<Self> {
        match s {
            "" | "equals" => Some(MatchKind::Equals),
            "wildcard" => Some(MatchKind::Wildcard),
            "contains" => Some(MatchKind::Contains),
            "startswith" => Some(MatchKind::StartsWith),
            "endswith" => Some(MatchKind::EndsWith),
            "re" => Some(MatchKind::Regex),
            "cidr" => Some(MatchKind::Cidr),
            "lt" => Some(MatchKind::Lt),
            "lte" => Some(MatchKind::Lte),
            "gt" => Some(MatchKind::Gt),
            "gte" => Some(MatchKind::Gte),
            "exists" => Some(MatchKind::Exists),
            "fieldref" => Some(MatchKind::FieldRef),
            "expand" => Some(MatchKind::Expand),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::Equals => "equals",
            MatchKind::Wildcard => "wildcard",
            MatchKind::Contains => "contains",
            MatchKind::StartsWith => "startswith",
            MatchKind::EndsWith => "endswith",
            MatchKind::Regex => "re",
            MatchKind::Cidr => "cidr",
            MatchKind::Lt => "lt",
            MatchKind::Lte => "lte",
            MatchKind::Gt => "gt",
            MatchKind::Gte => "gte",
            MatchKind::Exists => "exists",
            MatchKind::FieldRef => "fieldref",
            MatchKind::Expand => "expand",
        }
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Condition tree
// =============================================================================

/// A leaf comparing one field against one or more values.
///
/// Multiple values mean "the field matches any of them".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldMatch {
    pub field: String,
    pub kind: MatchKind,
    pub values: Vec<SigmaValue>,
}

impl FieldMatch {
    pub fn new<V: Into<SigmaValue>>(
        field: impl Into<String>,
        kind: MatchKind,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        FieldMatch {
            field: field.into(),
            kind,
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Boolean condition tree handed to the compiler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ConditionNode {
    And(Vec<ConditionNode>),
    Or(Vec<ConditionNode>),
    Not(Box<ConditionNode>),
    Match(FieldMatch),
}

impl ConditionNode {
    pub fn and(children: impl IntoIterator<Item = ConditionNode>) -> Self {
        ConditionNode::And(children.into_iter().collect())
    }

    pub fn or(children: impl IntoIterator<Item = ConditionNode>) -> Self {
        ConditionNode::Or(children.into_iter().collect())
    }

    pub fn not(child: ConditionNode) -> Self {
        ConditionNode::Not(Box::new(child))
    }

    /// A field match leaf.
    pub fn field<V: Into<SigmaValue>>(
        field: impl Into<String>,
        kind: MatchKind,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        ConditionNode::Match(FieldMatch::new(field, kind, values))
    }

    /// A single-value `equals` leaf, the most common shape.
    pub fn eq(field: impl Into<String>, value: impl Into<SigmaValue>) -> Self {
        let value: SigmaValue = value.into();
        ConditionNode::field(field, MatchKind::Equals, [value])
    }

    /// A single-value `re` leaf. The pattern is kept verbatim.
    pub fn regex(field: impl Into<String>, pattern: &str) -> Self {
        ConditionNode::field(field, MatchKind::Regex, [SigmaValue::raw(pattern)])
    }

    /// A single-value `cidr` leaf.
    pub fn cidr(field: impl Into<String>, network: &str) -> Self {
        ConditionNode::field(field, MatchKind::Cidr, [SigmaValue::raw(network)])
    }
}

// =============================================================================
// Rule metadata
// =============================================================================

/// Severity level of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Informational,
    Low,
    Medium,
    High,
    Critical,
}

impl Level {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "informational" => Some(Level::Informational),
            "low" => Some(Level::Low),
            "medium" => Some(Level::Medium),
            "high" => Some(Level::High),
            "critical" => Some(Level::Critical),
            _ => None,
        }
    }
}
