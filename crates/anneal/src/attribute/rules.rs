//! Validation rule parsing and compilation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::value::{AttributeValue, TypeTag};

/// A compiled validation rule.
///
/// Rules are a closed set evaluated by match; a rule name that makes no
/// sense for the column's tag (e.g. `non-negative` on a string column)
/// simply does not compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompiledRule {
    /// A value must be present.
    NonNull,
    /// A numeric value must be >= 0.
    NonNegative,
    /// A string value must be non-empty.
    NonEmpty,
}

impl CompiledRule {
    /// Check a present value against this rule.
    pub fn accepts(&self, value: &AttributeValue) -> bool {
        match self {
            // Presence was already established by the caller.
            CompiledRule::NonNull => true,
            CompiledRule::NonNegative => value.as_f64().is_some_and(|v| v >= 0.0),
            CompiledRule::NonEmpty => value.as_text().is_some_and(|s| !s.is_empty()),
        }
    }
}

/// Parse a comma-separated rule spec into its canonical name set.
pub fn parse_rule_names(spec: &str) -> BTreeSet<String> {
    spec.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Compile the rule list for a column.
///
/// `required` contributes the non-null rule whether or not it appears in the
/// spec. Unknown rule names stay in the parsed set but compile to nothing.
/// Compilation is a pure function of (names, required, tag), so recompiling
/// is idempotent.
pub fn compile_rules(names: &BTreeSet<String>, required: bool, tag: TypeTag) -> Vec<CompiledRule> {
    let mut rules = Vec::new();

    if required || names.contains("required") {
        rules.push(CompiledRule::NonNull);
    }
    if names.contains("non-negative") && tag.is_numeric() {
        rules.push(CompiledRule::NonNegative);
    }
    if names.contains("non-empty") && tag == TypeTag::String {
        rules.push(CompiledRule::NonEmpty);
    }

    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rule_names() {
        let names = parse_rule_names("required, Non-Negative ,,non-empty");
        assert_eq!(names.len(), 3);
        assert!(names.contains("required"));
        assert!(names.contains("non-negative"));
        assert!(names.contains("non-empty"));
    }

    #[test]
    fn test_compile_skips_mismatched_tag() {
        let names = parse_rule_names("non-negative,non-empty");

        let numeric = compile_rules(&names, false, TypeTag::Double);
        assert_eq!(numeric, vec![CompiledRule::NonNegative]);

        let string = compile_rules(&names, false, TypeTag::String);
        assert_eq!(string, vec![CompiledRule::NonEmpty]);
    }

    #[test]
    fn test_required_flag_adds_non_null() {
        let names = BTreeSet::new();
        let rules = compile_rules(&names, true, TypeTag::Integer);
        assert_eq!(rules, vec![CompiledRule::NonNull]);
    }

    #[test]
    fn test_compilation_is_idempotent() {
        let names = parse_rule_names("required,non-negative");
        let a = compile_rules(&names, true, TypeTag::Integer);
        let b = compile_rules(&names, true, TypeTag::Integer);
        assert_eq!(a, b);
    }

    #[test]
    fn test_non_negative_rule() {
        assert!(CompiledRule::NonNegative.accepts(&AttributeValue::Double(0.0)));
        assert!(!CompiledRule::NonNegative.accepts(&AttributeValue::Double(-0.1)));
        assert!(!CompiledRule::NonNegative.accepts(&AttributeValue::Text("x".into())));
    }

    #[test]
    fn test_non_empty_rule() {
        assert!(CompiledRule::NonEmpty.accepts(&AttributeValue::Text("x".into())));
        assert!(!CompiledRule::NonEmpty.accepts(&AttributeValue::Text("".into())));
    }
}
