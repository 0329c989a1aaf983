use serde::Serialize;

/// Parsed text rule before compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRule {
    /// Source key the rule belongs to
    pub source: String,
    /// Regular expression, matched from the start of a URL
    pub pattern: String,
    /// Line number in the original text (for error reporting)
    pub line_num: Option<usize>,
}

impl TextRule {
    pub fn new(source: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            pattern: pattern.into(),
            line_num: None,
        }
    }

    pub fn at_line(mut self, line_num: usize) -> Self {
        self.line_num = Some(line_num);
        self
    }
}

/// One side of a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    Valid,
    Invalid,
}

impl Partition {
    /// Column header used when the partition is exported as a table
    pub fn header(&self) -> &'static str {
        match self {
            Partition::Valid => "Valid URLs",
            Partition::Invalid => "Invalid URLs",
        }
    }

    /// Prefix for exported file names
    pub fn file_stem(&self) -> &'static str {
        match self {
            Partition::Valid => "valid_urls",
            Partition::Invalid => "invalid_urls",
        }
    }
}

/// Result of classifying a batch of URLs.
///
/// Every input URL lands in exactly one of the two lists, and each list keeps
/// the relative input order. Duplicates are preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub valid: Vec<String>,
    pub invalid: Vec<String>,
}

impl Classification {
    pub fn valid_count(&self) -> usize {
        self.valid.len()
    }

    pub fn invalid_count(&self) -> usize {
        self.invalid.len()
    }

    /// Number of URLs that were classified
    pub fn total(&self) -> usize {
        self.valid.len() + self.invalid.len()
    }

    pub fn get(&self, partition: Partition) -> &[String] {
        match partition {
            Partition::Valid => &self.valid,
            Partition::Invalid => &self.invalid,
        }
    }

    /// Split into `(valid, invalid)`
    pub fn into_parts(self) -> (Vec<String>, Vec<String>) {
        (self.valid, self.invalid)
    }

    pub(crate) fn push(&mut self, partition: Partition, url: String) {
        match partition {
            Partition::Valid => self.valid.push(url),
            Partition::Invalid => self.invalid.push(url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_labels() {
        assert_eq!(Partition::Valid.header(), "Valid URLs");
        assert_eq!(Partition::Invalid.header(), "Invalid URLs");
        assert_eq!(Partition::Valid.file_stem(), "valid_urls");
        assert_eq!(Partition::Invalid.file_stem(), "invalid_urls");
    }

    #[test]
    fn test_classification_counts() {
        let mut c = Classification::default();
        c.push(Partition::Valid, "a".into());
        c.push(Partition::Invalid, "b".into());
        c.push(Partition::Valid, "c".into());

        assert_eq!(c.valid_count(), 2);
        assert_eq!(c.invalid_count(), 1);
        assert_eq!(c.total(), 3);
        assert_eq!(c.get(Partition::Invalid), ["b".to_string()]);

        let (valid, invalid) = c.into_parts();
        assert_eq!(valid, vec!["a", "c"]);
        assert_eq!(invalid, vec!["b"]);
    }

    #[test]
    fn test_classification_serializes_as_table() {
        let c = Classification {
            valid: vec!["a".into()],
            invalid: vec![],
        };
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, r#"{"valid":["a"],"invalid":[]}"#);
        assert_eq!(serde_json::to_string(&Partition::Invalid).unwrap(), r#""invalid""#);
    }

    #[test]
    fn test_text_rule_line() {
        let rule = TextRule::new("shop", "https://").at_line(3);
        assert_eq!(rule.line_num, Some(3));
        assert_eq!(rule.source, "shop");
    }
}
