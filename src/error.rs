use thiserror::Error;

/// URL validator error types
#[derive(Error, Debug)]
pub enum ValidatorError {
    #[error("Parse error at line {line}: {message}")]
    ParseErrorAtLine { line: usize, message: String },

    #[error("Parse error: {0}")]
    ParseError(String),

    /// The requested source key has no registered rule set.
    #[error("Invalid source '{name}'. Available sources are: {available:?}")]
    UnknownSource { name: String, available: Vec<String> },

    /// A rule pattern failed to compile as a regular expression.
    #[error("{}", invalid_rule_message(.source_name, .pattern, .line, .error))]
    InvalidRule {
        source_name: String,
        pattern: String,
        line: Option<usize>,
        #[source]
        error: regex::Error,
    },

    #[error("Source '{0}' has no rules")]
    EmptySource(String),

    #[error("The CSV input must contain a column named 'url'")]
    MissingUrlColumn,

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

fn invalid_rule_message(
    source_name: &str,
    pattern: &str,
    line: &Option<usize>,
    error: &regex::Error,
) -> String {
    match line {
        Some(line) => format!(
            "Invalid rule for source '{source_name}' at line {line}: '{pattern}': {error}"
        ),
        None => format!("Invalid rule for source '{source_name}': '{pattern}': {error}"),
    }
}

impl ValidatorError {
    /// Whether this error comes from the rule table rather than from a request.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ValidatorError::ParseErrorAtLine { .. }
                | ValidatorError::ParseError(_)
                | ValidatorError::InvalidRule { .. }
                | ValidatorError::EmptySource(_)
                | ValidatorError::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ValidatorError>;
