//! URL Validator - classify batches of URLs against per-source pattern rules
//!
//! A [`RuleRegistry`] maps source keys to ordered lists of rules. Each rule is a
//! regular expression matched from the start of a URL. Classifying a batch for a
//! source puts every URL that any rule accepts into `valid` and the rest into
//! `invalid`, keeping input order and duplicates.
//!
//! # Example
//!
//! ```rust
//! use url_validator::RuleRegistry;
//!
//! let rules_text = r"
//! [shop_reviews]
//! https://www\.shop\.com/reviews/\d+$
//! https://www\.shop\.com/reviews/\d+\?page=\d+$
//! ";
//!
//! let registry = RuleRegistry::from_text(rules_text).unwrap();
//!
//! let result = registry
//!     .classify(
//!         "shop_reviews",
//!         ["https://www.shop.com/reviews/12", "https://www.shop.com/cart"],
//!     )
//!     .unwrap();
//!
//! assert_eq!(result.valid, vec!["https://www.shop.com/reviews/12"]);
//! assert_eq!(result.invalid, vec!["https://www.shop.com/cart"]);
//! ```
//!
//! # Rule Table Syntax
//!
//! ```text
//! # comment
//! [source_key]
//! pattern
//! pattern
//! file: other.rules
//! ```
//!
//! | Line | Meaning |
//! |------|---------|
//! | `# ...` | Comment (whole line only) |
//! | `[key]` | Start the rules of source `key` |
//! | `file: path` | Include another rule file |
//! | `=pattern` | Pattern for the current source, taken verbatim |
//! | anything else | Pattern for the current source |
//!
//! The same table can be given as JSON: `{"source_key": ["pattern", ...]}`.

pub mod classifier;
pub mod compile;
pub mod error;
pub mod export;
pub mod matcher;
pub mod parser;
pub mod registry;
pub mod types;

// Re-export commonly used items
pub use classifier::classify;
pub use compile::compile;
pub use error::{Result, ValidatorError};
pub use export::{export_file_name, read_url_column, render_partition_csv, URL_COLUMN};
pub use matcher::{PatternMatcher, UrlMatcher};
pub use parser::{parse_rules, parse_rules_from_file, parse_rules_json, parse_rules_json_from_file};
pub use registry::{RegistryBuilder, Rule, RuleRegistry, RuleSet, BUILTIN_RULES};
pub use types::{Classification, Partition, TextRule};
