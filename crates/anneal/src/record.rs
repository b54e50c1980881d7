//! Records: one row's identifier plus its attribute map.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attribute::TypedAttribute;

/// A single record: an opaque identifier and an insertion-ordered map of
/// attributes keyed by attribute name.
///
/// Records are created by extraction collaborators, rebuilt during cleaning
/// (cleaning never mutates its input), and read-only during schema
/// synthesis and persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    id: String,
    attributes: IndexMap<String, TypedAttribute>,
}

impl Record {
    /// Create a record. A blank or whitespace-only id is replaced with a
    /// generated v4 UUID so the upsert key is always usable.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let id = if id.trim().is_empty() {
            Uuid::new_v4().to_string()
        } else {
            id
        };
        Self {
            id,
            attributes: IndexMap::new(),
        }
    }

    /// Create a record with a generated identifier.
    pub fn with_generated_id() -> Self {
        Self::new(String::new())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn attributes(&self) -> &IndexMap<String, TypedAttribute> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&TypedAttribute> {
        self.attributes.get(name)
    }

    /// Insert an attribute, keyed by its name. Replaces any existing
    /// attribute with the same name.
    pub fn insert(&mut self, attribute: TypedAttribute) {
        self.attributes
            .insert(attribute.name().to_string(), attribute);
    }

    /// Remove an attribute by name.
    pub fn remove(&mut self, name: &str) -> Option<TypedAttribute> {
        self.attributes.shift_remove(name)
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }
}
