mod pattern;

pub use pattern::PatternMatcher;

/// Trait for URL matchers
pub trait UrlMatcher: Send + Sync {
    /// Check if the URL matches this matcher
    fn matches(&self, url: &str) -> bool;
}
