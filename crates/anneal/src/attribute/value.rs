//! The closed type-tag space and its typed payload union.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Declared type of an attribute.
///
/// This is the entire declared-type name space: every column carries exactly
/// one of these tags, and coercion is a match over the tag rather than a
/// runtime lookup by type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    Integer,
    Long,
    Float,
    Double,
    Boolean,
    String,
    Instant,
    LocalDateTime,
    Object,
}

impl TypeTag {
    /// Resolve a declared type name. Unknown names yield `None`, never an
    /// error: a record with an unrecognized declared type simply coerces to
    /// absent downstream.
    pub fn parse(name: &str) -> Option<TypeTag> {
        match name.trim() {
            "Integer" => Some(TypeTag::Integer),
            "Long" => Some(TypeTag::Long),
            "Float" => Some(TypeTag::Float),
            "Double" => Some(TypeTag::Double),
            "Boolean" => Some(TypeTag::Boolean),
            "String" => Some(TypeTag::String),
            "Instant" => Some(TypeTag::Instant),
            "LocalDateTime" => Some(TypeTag::LocalDateTime),
            "Object" => Some(TypeTag::Object),
            _ => None,
        }
    }

    /// Returns true if this tag is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TypeTag::Integer | TypeTag::Long | TypeTag::Float | TypeTag::Double
        )
    }

    /// Returns true if this tag is temporal.
    pub fn is_temporal(&self) -> bool {
        matches!(self, TypeTag::Instant | TypeTag::LocalDateTime)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A typed attribute value.
///
/// The variant always agrees with the attribute's declared [`TypeTag`];
/// setters on `TypedAttribute` enforce this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Text(String),
    Instant(DateTime<Utc>),
    LocalDateTime(NaiveDateTime),
    Object(serde_json::Value),
}

impl AttributeValue {
    /// The tag this payload belongs to.
    pub fn tag(&self) -> TypeTag {
        match self {
            AttributeValue::Int(_) => TypeTag::Integer,
            AttributeValue::Long(_) => TypeTag::Long,
            AttributeValue::Float(_) => TypeTag::Float,
            AttributeValue::Double(_) => TypeTag::Double,
            AttributeValue::Bool(_) => TypeTag::Boolean,
            AttributeValue::Text(_) => TypeTag::String,
            AttributeValue::Instant(_) => TypeTag::Instant,
            AttributeValue::LocalDateTime(_) => TypeTag::LocalDateTime,
            AttributeValue::Object(_) => TypeTag::Object,
        }
    }

    /// Extract a numeric payload as `f64`. `None` for non-numeric variants.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Int(v) => Some(*v as f64),
            AttributeValue::Long(v) => Some(*v as f64),
            AttributeValue::Float(v) => Some(*v as f64),
            AttributeValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract a string payload. `None` for non-string variants.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Cast a cleaned numeric back into the column's declared subtype.
    ///
    /// Integer subtypes truncate (saturating `as` casts); `None` for
    /// non-numeric tags.
    pub fn from_f64(tag: TypeTag, value: f64) -> Option<AttributeValue> {
        match tag {
            TypeTag::Integer => Some(AttributeValue::Int(value as i32)),
            TypeTag::Long => Some(AttributeValue::Long(value as i64)),
            TypeTag::Float => Some(AttributeValue::Float(value as f32)),
            TypeTag::Double => Some(AttributeValue::Double(value)),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Int(v) => write!(f, "{}", v),
            AttributeValue::Long(v) => write!(f, "{}", v),
            AttributeValue::Float(v) => write!(f, "{}", v),
            AttributeValue::Double(v) => write!(f, "{}", v),
            AttributeValue::Bool(v) => write!(f, "{}", v),
            AttributeValue::Text(s) => write!(f, "{}", s),
            AttributeValue::Instant(t) => write!(f, "{}", t),
            AttributeValue::LocalDateTime(t) => write!(f, "{}", t),
            AttributeValue::Object(v) => write!(f, "{}", v),
        }
    }
}
