use std::collections::HashMap;

use crate::error::{Result, ValidatorError};
use crate::matcher::PatternMatcher;
use crate::registry::{Rule, RuleRegistry, RuleSet};
use crate::types::TextRule;

/// Compile text rules into a RuleRegistry.
///
/// Rules are grouped by source in first-appearance order. Every pattern is
/// compiled here, so an invalid one fails the whole table up front.
pub fn compile(rules: &[TextRule]) -> Result<RuleRegistry> {
    let mut sets: Vec<(String, Vec<Rule>)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for rule in rules {
        let compiled = compile_rule(rule)?;
        let pos = *positions.entry(rule.source.as_str()).or_insert_with(|| {
            sets.push((rule.source.clone(), Vec::new()));
            sets.len() - 1
        });
        sets[pos].1.push(compiled);
    }

    RuleRegistry::from_sets(
        sets.into_iter()
            .map(|(name, rules)| RuleSet::new(name, rules))
            .collect(),
    )
}

/// Compile a single rule
fn compile_rule(rule: &TextRule) -> Result<Rule> {
    let matcher = PatternMatcher::new(&rule.pattern).map_err(|e| ValidatorError::InvalidRule {
        source_name: rule.source.clone(),
        pattern: rule.pattern.clone(),
        line: rule.line_num,
        error: e,
    })?;

    Ok(Rule {
        matcher,
        line_num: rule.line_num,
    })
}
