//! Category rules: ordered `(pattern, tag)` pairs per engine.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Tag assigned when no rule matches.
pub const FALLBACK_TAG: &str = "other";

/// Configuration form of a rule, before compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub pattern: String,
    pub tag: String,
}

impl RuleSpec {
    pub fn new(pattern: impl Into<String>, tag: impl Into<String>) -> Self {
        Self { pattern: pattern.into(), tag: tag.into() }
    }
}

/// A compiled rule.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    pattern: Regex,
    tag: String,
}

impl CategoryRule {
    /// Compile a rule.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPattern` if the regex does not compile.
    pub fn compile(spec: &RuleSpec) -> Result<Self, Error> {
        let pattern = Regex::new(&spec.pattern)
            .map_err(|e| Error::InvalidPattern { pattern: spec.pattern.clone(), reason: e.to_string() })?;
        Ok(Self { pattern, tag: spec.tag.clone() })
    }

    /// Unanchored, case-sensitive search.
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Built-in rules for the tellurium SED-ML runner.
pub fn tellurium_rules() -> Vec<RuleSpec> {
    vec![
        RuleSpec::new("^Unable to support algebraic rules.", "algebraic"),
        RuleSpec::new("^Unable to support delay differential equations.", "delay"),
        RuleSpec::new("^Unknown ASTNode type of", "ASTNode"),
        RuleSpec::new(
            "^Mutable stochiometry for species which appear multiple times in a single reaction",
            "stochiometry",
        ),
        RuleSpec::new("^'float' object is not callable", "float"),
        RuleSpec::new("is not a named SpeciesReference", "SpeciesRef"),
        RuleSpec::new("reset", "reset"),
    ]
}

/// Built-in rules for an engine name, if any.
pub fn builtin_rules(engine: &str) -> Option<Vec<RuleSpec>> {
    match engine {
        "tellurium" => Some(tellurium_rules()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_and_match() {
        let rule = CategoryRule::compile(&RuleSpec::new("^Unknown ASTNode", "ASTNode")).unwrap();
        assert!(rule.matches("Unknown ASTNode type of 12"));
        assert!(!rule.matches("error: Unknown ASTNode type of 12"));
        assert_eq!(rule.tag(), "ASTNode");
    }

    #[test]
    fn test_match_is_search_not_full_match() {
        let rule = CategoryRule::compile(&RuleSpec::new("reset", "reset")).unwrap();
        assert!(rule.matches("event reset not supported"));
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let rule = CategoryRule::compile(&RuleSpec::new("reset", "reset")).unwrap();
        assert!(!rule.matches("RESET"));
    }

    #[test]
    fn test_invalid_pattern() {
        let result = CategoryRule::compile(&RuleSpec::new("(unclosed", "x"));
        assert!(matches!(result, Err(Error::InvalidPattern { pattern, .. }) if pattern == "(unclosed"));
    }

    #[test]
    fn test_builtin_tellurium_rules_compile() {
        let rules = builtin_rules("tellurium").unwrap();
        assert_eq!(rules.len(), 7);
        for spec in &rules {
            CategoryRule::compile(spec).unwrap();
        }
        assert!(builtin_rules("copasi").is_none());
    }
}
