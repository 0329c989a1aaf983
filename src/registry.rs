//! Rule registry.
//!
//! Holds the immutable table of source key -> ordered rule list.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::compile::compile;
use crate::error::{Result, ValidatorError};
use crate::matcher::{PatternMatcher, UrlMatcher};
use crate::parser::{parse_rules, parse_rules_from_file, parse_rules_json, parse_rules_json_from_file};
use crate::types::TextRule;

/// Rule table compiled into the binary
pub const BUILTIN_RULES: &str = include_str!("../rules/default.rules");

/// A compiled rule ready for matching
#[derive(Debug, Clone)]
pub struct Rule {
    /// Start-anchored pattern matcher
    pub matcher: PatternMatcher,
    /// Line number in the rule table, if the rule came from text
    pub line_num: Option<usize>,
}

impl Rule {
    /// The pattern as written in the rule table
    pub fn pattern(&self) -> &str {
        self.matcher.as_str()
    }
}

impl UrlMatcher for Rule {
    fn matches(&self, url: &str) -> bool {
        self.matcher.matches(url)
    }
}

/// The rules of one source. A URL matches the set if any rule matches it.
#[derive(Debug, Clone)]
pub struct RuleSet {
    name: String,
    rules: Vec<Rule>,
}

impl RuleSet {
    pub(crate) fn new(name: impl Into<String>, rules: Vec<Rule>) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule in declaration order that matches the URL
    pub fn first_match(&self, url: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.matches(url))
    }
}

impl UrlMatcher for RuleSet {
    fn matches(&self, url: &str) -> bool {
        self.rules.iter().any(|rule| rule.matches(url))
    }
}

/// Immutable mapping from source key to its rule set.
///
/// Sources keep the order in which they were first declared.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    sets: Vec<RuleSet>,
    index: HashMap<String, usize>,
}

impl RuleRegistry {
    /// Build a registry from compiled rule sets.
    ///
    /// Sets must have distinct names and at least one rule each.
    pub(crate) fn from_sets(sets: Vec<RuleSet>) -> Result<Self> {
        let mut index = HashMap::with_capacity(sets.len());
        for (i, set) in sets.iter().enumerate() {
            if set.is_empty() {
                return Err(ValidatorError::EmptySource(set.name.clone()));
            }
            if index.insert(set.name.clone(), i).is_some() {
                return Err(ValidatorError::ParseError(format!(
                    "duplicate source '{}'",
                    set.name
                )));
            }
        }

        let registry = Self { sets, index };
        debug!(
            sources = registry.len(),
            rules = registry.rule_count(),
            "rule registry built"
        );
        Ok(registry)
    }

    /// Registry with the built-in rule table
    pub fn builtin() -> Result<Self> {
        Self::from_text(BUILTIN_RULES)
    }

    /// Build a registry from a text rule table
    pub fn from_text(text: &str) -> Result<Self> {
        compile(&parse_rules(text)?)
    }

    /// Build a registry from a text rule table file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading rule table");
        compile(&parse_rules_from_file(path)?)
    }

    /// Build a registry from a JSON rule table
    pub fn from_json_str(text: &str) -> Result<Self> {
        compile(&parse_rules_json(text)?)
    }

    /// Build a registry from a JSON rule table file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading JSON rule table");
        compile(&parse_rules_json_from_file(path)?)
    }

    /// All known source keys, in declaration order
    pub fn list_sources(&self) -> Vec<&str> {
        self.sets.iter().map(|set| set.name.as_str()).collect()
    }

    pub fn contains(&self, source: &str) -> bool {
        self.index.contains_key(source)
    }

    /// Rules for a source, or `UnknownSource`
    pub fn rules_for(&self, source: &str) -> Result<&RuleSet> {
        self.index
            .get(source)
            .map(|&i| &self.sets[i])
            .ok_or_else(|| ValidatorError::UnknownSource {
                name: source.to_string(),
                available: self.list_sources().into_iter().map(String::from).collect(),
            })
    }

    /// Number of sources
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Total number of rules across all sources
    pub fn rule_count(&self) -> usize {
        self.sets.iter().map(RuleSet::len).sum()
    }
}

/// Programmatic registry construction.
///
/// ```rust
/// use url_validator::RegistryBuilder;
///
/// let registry = RegistryBuilder::new()
///     .source("shop", [r"https://shop\.com/item/\d+$"])
///     .build()
///     .unwrap();
/// assert_eq!(registry.list_sources(), vec!["shop"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    rules: Vec<TextRule>,
    declared: Vec<String>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add patterns for a source. Calling this again for the same source appends.
    pub fn source<I, S>(mut self, name: &str, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.declared.iter().any(|d| d == name) {
            self.declared.push(name.to_string());
        }
        self.rules
            .extend(patterns.into_iter().map(|p| TextRule::new(name, p)));
        self
    }

    /// Compile every pattern; fails on the first invalid one
    pub fn build(self) -> Result<RuleRegistry> {
        if let Some(empty) = self
            .declared
            .iter()
            .find(|name| !self.rules.iter().any(|r| &r.source == *name))
        {
            return Err(ValidatorError::EmptySource(empty.clone()));
        }
        compile(&self.rules)
    }
}
