//! Synthetic rule generators for rsigma-sqlite benchmarks.
//!
//! All generators are seeded for reproducibility.

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rsigma_sqlite::{ConditionExpr, ConditionNode, Level, MatchKind, Rule, SelectorPattern};

/// Fixed seed for reproducible benchmarks.
const SEED: u64 = 0xDEAD_BEEF_CAFE;

pub fn rng() -> StdRng {
    StdRng::seed_from_u64(SEED)
}

// ---------------------------------------------------------------------------
// Field / value pools
// ---------------------------------------------------------------------------

pub const REVERSE_INDEXED_FIELDS: &[&str] = &["CommandLine", "Image", "TargetFilename"];

const FIELD_NAMES: &[&str] = &[
    "CommandLine",
    "ParentCommandLine",
    "Image",
    "ParentImage",
    "TargetFilename",
    "User",
    "EventType",
    "Service Name",
    "Registry Key",
];

const STRING_VALUES: &[&str] = &[
    "whoami",
    "cmd.exe",
    "powershell.exe",
    "mimikatz",
    "lsass.exe",
    "rundll32.exe",
    "certutil.exe",
    "mshta.exe",
];

const NETWORKS: &[&str] = &["10.0.0.0/8", "192.168.0.0/16", "172.16.4.0/24"];

const LEVELS: &[Level] = &[Level::Low, Level::Medium, Level::High, Level::Critical];

// ---------------------------------------------------------------------------
// Rule generators
// ---------------------------------------------------------------------------

fn gen_field_match(rng: &mut StdRng) -> ConditionNode {
    let field = FIELD_NAMES[rng.random_range(0..FIELD_NAMES.len())];
    let num_values = rng.random_range(1..=3);
    let values: Vec<String> = (0..num_values)
        .map(|_| {
            let val = STRING_VALUES[rng.random_range(0..STRING_VALUES.len())];
            match rng.random_range(0..4u8) {
                0 => format!("*\\{val}"),
                1 => format!("{val}*"),
                2 => format!("*{val}*"),
                _ => val.to_string(),
            }
        })
        .collect();

    let kind = match rng.random_range(0..6u8) {
        0 => MatchKind::Contains,
        1 => MatchKind::EndsWith,
        _ => MatchKind::Equals,
    };
    ConditionNode::field(field, kind, values)
}

/// Generate a single realistic rule with a selection and an optional filter.
pub fn gen_single_rule(rng: &mut StdRng, id: usize) -> Rule {
    let num_items = rng.random_range(1..=4);
    let mut items: Vec<ConditionNode> = (0..num_items).map(|_| gen_field_match(rng)).collect();
    if rng.random_bool(0.2) {
        let net = NETWORKS[rng.random_range(0..NETWORKS.len())];
        items.push(ConditionNode::cidr("SourceIp", net));
    }

    let mut rule = Rule::new(format!("Bench Rule {id}"))
        .with_id(format!("bench-rule-{id:06}"))
        .with_level(LEVELS[rng.random_range(0..LEVELS.len())])
        .with_detection("selection", ConditionNode::And(items));

    let condition = if rng.random_bool(0.3) {
        rule = rule.with_detection("filter", gen_field_match(rng));
        ConditionExpr::And(vec![
            ConditionExpr::ident("selection"),
            ConditionExpr::Not(Box::new(ConditionExpr::ident("filter"))),
        ])
    } else {
        ConditionExpr::ident("selection")
    };
    rule.with_condition(condition)
}

/// Generate a rule whose condition selects over many detections.
pub fn gen_selector_rule(rng: &mut StdRng, id: usize, detections: usize) -> Rule {
    let mut rule = Rule::new(format!("Selector Rule {id}"));
    for i in 0..detections {
        rule = rule.with_detection(format!("selection_{i}"), gen_field_match(rng));
    }
    rule.with_condition(ConditionExpr::any_of(SelectorPattern::pattern("selection_*")))
}

pub fn gen_n_rules(n: usize) -> Vec<Rule> {
    let mut rng = rng();
    (0..n).map(|i| gen_single_rule(&mut rng, i)).collect()
}
