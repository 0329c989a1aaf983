//! Batch URL classification.
//!
//! Splits a batch into valid and invalid URLs for one source. The source is
//! looked up before any URL is evaluated, so an unknown source never yields a
//! partial result.

use crate::error::Result;
use crate::matcher::UrlMatcher;
use crate::registry::{Rule, RuleRegistry};
use crate::types::{Classification, Partition};

impl RuleRegistry {
    /// Partition `urls` by whether any rule of `source` matches them.
    pub fn classify<I, S>(&self, source: &str, urls: I) -> Result<Classification>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str> + Into<String>,
    {
        let set = self.rules_for(source)?;

        let mut result = Classification::default();
        for url in urls {
            let partition = if set.matches(url.as_ref()) {
                Partition::Valid
            } else {
                Partition::Invalid
            };
            result.push(partition, url.into());
        }
        Ok(result)
    }

    /// The first rule of `source`, in declaration order, that accepts `url`.
    pub fn explain(&self, source: &str, url: &str) -> Result<Option<&Rule>> {
        Ok(self.rules_for(source)?.first_match(url))
    }
}

/// Partition `urls` for `source` against `registry`.
pub fn classify<I, S>(registry: &RuleRegistry, source: &str, urls: I) -> Result<Classification>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str> + Into<String>,
{
    registry.classify(source, urls)
}
