use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ValidatorError, Result};
use crate::types::TextRule;

/// Regex pattern for section headers
/// Format: [source_key]
static SECTION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[([\w.\-]+)\]$").expect("SECTION_PATTERN: hardcoded regex is invalid")
});

/// Maximum nesting depth for `file:` include directives.
const MAX_INCLUDE_DEPTH: usize = 10;

/// Parse a rule table from text.
///
/// ```text
/// # comment
/// [source_key]
/// https:\/\/example\.com\/item\/\d+
/// [hH]ttps:\/\/example\.com\/
/// =[0-9]+\.example\.com
/// file: more.rules
/// ```
///
/// A line starting with `=` is always a pattern: the `=` is dropped and the
/// rest is taken verbatim. Use it for patterns that would otherwise read as a
/// `[key]` header, a `#` comment, a `file:` include, or that start with `=`.
/// Other lines starting with `[` that are not a `[key]` header are patterns.
///
/// Relative `file:` includes are resolved against the current directory.
pub fn parse_rules(text: &str) -> Result<Vec<TextRule>> {
    parse_rules_inner(text, None, 0)
}

fn parse_rules_inner(text: &str, base_dir: Option<&Path>, depth: usize) -> Result<Vec<TextRule>> {
    if depth > MAX_INCLUDE_DEPTH {
        return Err(ValidatorError::ParseError(format!(
            "file include depth exceeds maximum ({MAX_INCLUDE_DEPTH}), possible circular include"
        )));
    }

    let mut rules: Vec<TextRule> = Vec::new();
    let mut section: Option<String> = None;
    let mut declared: Vec<String> = Vec::new();

    for (line_num, raw) in text.lines().enumerate() {
        let line_num = line_num + 1; // 1-based line numbers

        if let Some(pattern) = raw.trim_start().strip_prefix('=') {
            let source = current_section(&section, line_num, raw)?;
            rules.push(TextRule::new(source, pattern).at_line(line_num));
            continue;
        }

        let line = raw.trim();

        // Patterns may contain '#', so only whole-line comments are stripped
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(path) = line.strip_prefix("file:") {
            let path = resolve_include(path.trim(), base_dir);
            let file_rules = parse_rules_from_file_inner(&path, depth + 1)?;
            rules.extend(file_rules);
            continue;
        }

        if let Some(captures) = SECTION_PATTERN.captures(line) {
            let name = captures[1].to_string();
            if !declared.contains(&name) {
                declared.push(name.clone());
            }
            section = Some(name);
            continue;
        }

        let source = current_section(&section, line_num, line)?;
        rules.push(TextRule::new(source, line).at_line(line_num));
    }

    if let Some(empty) = declared
        .into_iter()
        .find(|name| !rules.iter().any(|r| &r.source == name))
    {
        return Err(ValidatorError::EmptySource(empty));
    }

    Ok(rules)
}

fn current_section<'a>(section: &'a Option<String>, line_num: usize, line: &str) -> Result<&'a str> {
    section
        .as_deref()
        .ok_or_else(|| ValidatorError::ParseErrorAtLine {
            line: line_num,
            message: format!("Pattern outside of a [source] section: {}", line.trim()),
        })
}

fn resolve_include(path: &str, base_dir: Option<&Path>) -> PathBuf {
    let path = Path::new(path);
    match base_dir {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    }
}

/// Parse a rule table from a file.
///
/// Relative `file:` includes are resolved against the including file's directory.
pub fn parse_rules_from_file(path: impl AsRef<Path>) -> Result<Vec<TextRule>> {
    parse_rules_from_file_inner(path.as_ref(), 0)
}

fn parse_rules_from_file_inner(path: &Path, depth: usize) -> Result<Vec<TextRule>> {
    let text = fs::read_to_string(path).map_err(|e| {
        ValidatorError::ParseError(format!(
            "Failed to read rules file '{}': {}",
            path.display(),
            e
        ))
    })?;
    parse_rules_inner(&text, path.parent(), depth)
}

/// Parse a JSON rule table: an object mapping source key to an array of patterns.
///
/// Sources come out in key order; patterns keep their array order.
pub fn parse_rules_json(text: &str) -> Result<Vec<TextRule>> {
    let table: BTreeMap<String, Vec<String>> = serde_json::from_str(text)?;

    let mut rules = Vec::new();
    for (source, patterns) in table {
        if patterns.is_empty() {
            return Err(ValidatorError::EmptySource(source));
        }
        rules.extend(
            patterns
                .into_iter()
                .map(|pattern| TextRule::new(source.as_str(), pattern)),
        );
    }
    Ok(rules)
}

/// Parse a JSON rule table from a file.
pub fn parse_rules_json_from_file(path: impl AsRef<Path>) -> Result<Vec<TextRule>> {
    let text = fs::read_to_string(path.as_ref())?;
    parse_rules_json(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_pattern_regex_compiles() {
        assert!(SECTION_PATTERN.is_match("[shop_reviews]"));
        assert!(SECTION_PATTERN.is_match("[shop.v2-eu]"));
        assert!(!SECTION_PATTERN.is_match("[has space]"));
    }

    #[test]
    fn test_parse_single_section() {
        let text = r"
[shop]
https:\/\/shop\.com\/item\/\d+
";
        let rules = parse_rules(text).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].source, "shop");
        assert_eq!(rules[0].pattern, r"https:\/\/shop\.com\/item\/\d+");
        assert_eq!(rules[0].line_num, Some(3));
    }

    #[test]
    fn test_parse_multiple_sections_keep_order() {
        let text = r"
# Reviews
[reviews]
https://a\.com/r/\d+
https://b\.com/r/\d+

# Listings
[listings]
https://a\.com/l/.+
";
        let rules = parse_rules(text).unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0].source, "reviews");
        assert_eq!(rules[1].source, "reviews");
        assert_eq!(rules[1].pattern, r"https://b\.com/r/\d+");
        assert_eq!(rules[2].source, "listings");
    }

    #[test]
    fn test_parse_hash_inside_pattern() {
        let text = "[shop]\nhttps://shop\\.com/#/item";
        let rules = parse_rules(text).unwrap();
        assert_eq!(rules[0].pattern, "https://shop\\.com/#/item");
    }

    #[test]
    fn test_parse_pattern_before_section() {
        let text = "https://shop\\.com";
        let err = parse_rules(text).unwrap_err();
        assert!(matches!(err, ValidatorError::ParseErrorAtLine { line: 1, .. }));
    }

    #[test]
    fn test_parse_bracket_line_without_section() {
        // Not a [key] header, so it is a pattern with no section to belong to
        let text = "[bad header]\nhttps://";
        let err = parse_rules(text).unwrap_err();
        assert!(matches!(err, ValidatorError::ParseErrorAtLine { line: 1, .. }));
    }

    #[test]
    fn test_parse_pattern_starting_with_character_class() {
        let text = "[s]\n[hH]ttps://a\\.com/\n[^x]+\\.org/\n";
        let rules = parse_rules(text).unwrap();
        assert_eq!(rules.len(), 2);
        assert!(rules.iter().all(|r| r.source == "s"));
        assert_eq!(rules[0].pattern, "[hH]ttps://a\\.com/");
        assert_eq!(rules[1].pattern, "[^x]+\\.org/");
    }

    #[test]
    fn test_parse_escaped_patterns() {
        let text = "[s]\nhttps://a\\.com/\n=[0-9]\n  =# not a comment\n=file: not an include\n==x\n";
        let rules = parse_rules(text).unwrap();
        let patterns: Vec<&str> = rules.iter().map(|r| r.pattern.as_str()).collect();
        assert_eq!(
            patterns,
            vec![
                "https://a\\.com/",
                "[0-9]",
                "# not a comment",
                "file: not an include",
                "=x"
            ]
        );
        assert!(rules.iter().all(|r| r.source == "s"));
        assert_eq!(rules[2].line_num, Some(4));
    }

    #[test]
    fn test_parse_escaped_pattern_outside_section() {
        let err = parse_rules("=[0-9]").unwrap_err();
        assert!(matches!(err, ValidatorError::ParseErrorAtLine { line: 1, .. }));
    }

    #[test]
    fn test_parse_section_without_patterns() {
        let text = "[a]\nhttps://a\n[b]\n# nothing here\n";
        let err = parse_rules(text).unwrap_err();
        assert!(matches!(err, ValidatorError::EmptySource(ref s) if s == "b"));
    }

    #[test]
    fn test_parse_repeated_section_appends() {
        let text = "[a]\nx\n[b]\ny\n[a]\nz";
        let rules = parse_rules(text).unwrap();
        let a: Vec<&str> = rules
            .iter()
            .filter(|r| r.source == "a")
            .map(|r| r.pattern.as_str())
            .collect();
        assert_eq!(a, vec!["x", "z"]);
    }

    #[test]
    fn test_parse_file_directive() {
        use std::io::Write;
        let dir = std::env::temp_dir()
            .join(format!("url_validator_test_include_{}", std::process::id()));
        let _ = fs::create_dir_all(&dir);
        let file_path = dir.join("extra.rules");
        let mut f = fs::File::create(&file_path).unwrap();
        writeln!(f, "[extra]").unwrap();
        writeln!(f, "https://extra\\.com/").unwrap();
        drop(f);

        let text = format!(
            "[main]\nhttps://main\\.com/\nfile: {}\nhttps://main\\.org/",
            file_path.display()
        );
        let rules = parse_rules(&text).unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0].source, "main");
        assert_eq!(rules[1].source, "extra");
        // the include does not change the including file's current section
        assert_eq!(rules[2].source, "main");
        assert_eq!(rules[2].pattern, "https://main\\.org/");

        let _ = fs::remove_file(&file_path);
        let _ = fs::remove_dir(&dir);
    }

    #[test]
    fn test_parse_file_relative_include() {
        use std::io::Write;
        let dir = std::env::temp_dir()
            .join(format!("url_validator_test_relative_{}", std::process::id()));
        let _ = fs::create_dir_all(&dir);

        let mut f = fs::File::create(dir.join("child.rules")).unwrap();
        writeln!(f, "[child]\nhttps://child\\.com/").unwrap();
        drop(f);

        let parent = dir.join("parent.rules");
        let mut f = fs::File::create(&parent).unwrap();
        writeln!(f, "[parent]\nhttps://parent\\.com/\nfile: child.rules").unwrap();
        drop(f);

        let rules = parse_rules_from_file(&parent).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1].source, "child");

        let _ = fs::remove_file(dir.join("child.rules"));
        let _ = fs::remove_file(&parent);
        let _ = fs::remove_dir(&dir);
    }

    #[test]
    fn test_parse_file_directive_not_found() {
        let text = "file: /nonexistent/path/url.rules";
        let result = parse_rules(text);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_file_circular_include() {
        use std::io::Write;
        let dir = std::env::temp_dir()
            .join(format!("url_validator_test_circular_{}", std::process::id()));
        let _ = fs::create_dir_all(&dir);

        let file_a = dir.join("a.rules");
        let file_b = dir.join("b.rules");

        let mut f = fs::File::create(&file_a).unwrap();
        writeln!(f, "[a]\nhttps://a\\.com/").unwrap();
        writeln!(f, "file: {}", file_b.display()).unwrap();
        drop(f);

        let mut f = fs::File::create(&file_b).unwrap();
        writeln!(f, "[b]\nhttps://b\\.com/").unwrap();
        writeln!(f, "file: {}", file_a.display()).unwrap();
        drop(f);

        let result = parse_rules_from_file(&file_a);
        assert!(result.is_err(), "Circular file include should return error");
        let err_msg = format!("{}", result.unwrap_err());
        assert!(
            err_msg.contains("include") || err_msg.contains("depth"),
            "Error should mention include depth issue, got: {}",
            err_msg
        );

        let _ = fs::remove_file(&file_a);
        let _ = fs::remove_file(&file_b);
        let _ = fs::remove_dir(&dir);
    }

    #[test]
    fn test_parse_json_table() {
        let text = r#"{
            "zeta": ["https://z\\.com/1", "https://z\\.com/2"],
            "alpha": ["https://a\\.com/"]
        }"#;
        let rules = parse_rules_json(text).unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0].source, "alpha");
        assert_eq!(rules[1].pattern, "https://z\\.com/1");
        assert_eq!(rules[2].pattern, "https://z\\.com/2");
        assert!(rules.iter().all(|r| r.line_num.is_none()));
    }

    #[test]
    fn test_parse_json_empty_source() {
        let err = parse_rules_json(r#"{"empty": []}"#).unwrap_err();
        assert!(matches!(err, ValidatorError::EmptySource(ref s) if s == "empty"));
    }

    #[test]
    fn test_parse_json_malformed() {
        let err = parse_rules_json(r#"{"a": "not a list"}"#).unwrap_err();
        assert!(matches!(err, ValidatorError::Json(_)));
    }
}
