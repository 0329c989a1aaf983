use regex::Regex;

use super::UrlMatcher;

/// Pattern matcher - a regular expression matched from the start of a URL.
///
/// The pattern must match at offset 0 but may stop before the end of the URL,
/// unless the pattern itself ends with `$`.
///
/// A URL ending in a single `\n` also matches when the URL without that
/// newline matches, so `$` accepts a trailing newline the way the deployed
/// rule tables expect.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    pattern: String,
    regex: Regex,
}

impl PatternMatcher {
    /// Compile a pattern. The pattern text is compiled as written.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as written in the rule table
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    // Leftmost-first search reports a match at offset 0 whenever one exists.
    fn matches_at_start(&self, text: &str) -> bool {
        self.regex.find(text).is_some_and(|m| m.start() == 0)
    }
}

impl UrlMatcher for PatternMatcher {
    fn matches(&self, url: &str) -> bool {
        self.matches_at_start(url)
            || url
                .strip_suffix('\n')
                .is_some_and(|trimmed| self.matches_at_start(trimmed))
    }
}
