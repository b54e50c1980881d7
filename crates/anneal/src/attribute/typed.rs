//! One column's typed value plus metadata and validation state.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{AnnealError, Result};

use super::rules::{compile_rules, parse_rule_names, CompiledRule};
use super::value::{AttributeValue, TypeTag};

/// A single attribute: declared tag, optional typed value, default,
/// validation rules, and arbitrary metadata.
///
/// The invariant maintained by every setter: a present value is always
/// exactly of the declared tag, and the compiled rule list always reflects
/// the current rule spec and `required` flag, never partially stale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypedAttribute {
    name: String,
    tag: TypeTag,
    value: Option<AttributeValue>,
    default_value: Option<AttributeValue>,
    required: bool,
    /// Parse pattern for temporal tags.
    format: Option<String>,
    description: String,
    /// Raw comma-separated rule spec, as supplied.
    rules: String,
    parsed_rules: BTreeSet<String>,
    compiled: Vec<CompiledRule>,
    metadata: IndexMap<String, AttributeValue>,
    last_updated: DateTime<Utc>,
    /// One-hot indicator map, present only after categorical encoding.
    /// Takes precedence over the scalar value at persistence time.
    encoded_values: Option<IndexMap<String, i32>>,
}

impl TypedAttribute {
    /// Create an attribute with the given name and declared tag.
    pub fn new(name: impl Into<String>, tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            tag,
            value: None,
            default_value: None,
            required: false,
            format: None,
            description: String::new(),
            rules: String::new(),
            parsed_rules: BTreeSet::new(),
            compiled: Vec::new(),
            metadata: IndexMap::new(),
            last_updated: Utc::now(),
            encoded_values: None,
        }
    }

    /// Set the initial value. Fails on tag disagreement.
    pub fn with_value(mut self, value: AttributeValue) -> Result<Self> {
        self.set_value(value)?;
        Ok(self)
    }

    /// Set the default value. Fails on tag disagreement.
    pub fn with_default(mut self, default: AttributeValue) -> Result<Self> {
        if default.tag() != self.tag {
            return Err(AnnealError::TypeMismatch {
                attribute: self.name.clone(),
                expected: self.tag,
                actual: default.tag(),
            });
        }
        self.default_value = Some(default);
        Ok(self)
    }

    /// Set the temporal parse pattern.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the rule spec (builder form of [`set_rules`](Self::set_rules)).
    pub fn with_rules(mut self, spec: impl Into<String>) -> Self {
        self.set_rules(spec);
        self
    }

    /// Set the required flag (builder form).
    pub fn with_required(mut self, required: bool) -> Self {
        self.set_required(required);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    pub fn value(&self) -> Option<&AttributeValue> {
        self.value.as_ref()
    }

    pub fn default_value(&self) -> Option<&AttributeValue> {
        self.default_value.as_ref()
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parsed_rules(&self) -> &BTreeSet<String> {
        &self.parsed_rules
    }

    pub fn metadata(&self) -> &IndexMap<String, AttributeValue> {
        &self.metadata
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    pub fn encoded_values(&self) -> Option<&IndexMap<String, i32>> {
        self.encoded_values.as_ref()
    }

    /// Replace the value. Fails when the payload's tag disagrees with the
    /// declared tag; stamps `last_updated` on success.
    pub fn set_value(&mut self, value: AttributeValue) -> Result<()> {
        if value.tag() != self.tag {
            return Err(AnnealError::TypeMismatch {
                attribute: self.name.clone(),
                expected: self.tag,
                actual: value.tag(),
            });
        }
        self.value = Some(value);
        self.last_updated = Utc::now();
        Ok(())
    }

    /// Remove the value, leaving the attribute absent.
    pub fn clear_value(&mut self) {
        self.value = None;
        self.last_updated = Utc::now();
    }

    /// Attach metadata under the given key.
    pub fn insert_metadata(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.metadata.insert(key.into(), value);
        self.last_updated = Utc::now();
    }

    /// Attach the one-hot indicator map produced by categorical encoding.
    pub fn set_encoded_values(&mut self, encoded: IndexMap<String, i32>) {
        self.encoded_values = Some(encoded);
        self.last_updated = Utc::now();
    }

    /// Replace the rule spec, re-deriving the parsed name set and
    /// recompiling the rule list in one step.
    pub fn set_rules(&mut self, spec: impl Into<String>) {
        self.rules = spec.into();
        self.recompile();
    }

    /// Change the required flag; recompiles so the non-null rule tracks it.
    pub fn set_required(&mut self, required: bool) {
        self.required = required;
        self.recompile();
    }

    fn recompile(&mut self) {
        self.parsed_rules = parse_rule_names(&self.rules);
        self.compiled = compile_rules(&self.parsed_rules, self.required, self.tag);
    }

    /// Fill the value from the default only when currently absent; never
    /// overwrites a present value.
    pub fn apply_default_value(&mut self) {
        if self.value.is_none() {
            if let Some(default) = self.default_value.clone() {
                self.value = Some(default);
                self.last_updated = Utc::now();
            }
        }
    }

    /// True iff a value is present and every compiled rule accepts it.
    ///
    /// An absent value always fails, independent of `required`: the flag
    /// only adds the non-null rule, which presence already satisfies.
    pub fn apply_validation_rules(&self) -> bool {
        match &self.value {
            None => false,
            Some(value) => self.compiled.iter().all(|rule| rule.accepts(value)),
        }
    }
}
