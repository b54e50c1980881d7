//! Storage collaborator traits and the bind-parameter value union.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::attribute::AttributeValue;
use crate::error::Result;

/// A bind parameter for a parameterized statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    Null,
    Int(i64),
    Double(f64),
    Bool(bool),
    Text(String),
    Timestamp(NaiveDateTime),
}

impl From<&AttributeValue> for SqlValue {
    fn from(value: &AttributeValue) -> Self {
        match value {
            AttributeValue::Int(v) => SqlValue::Int(*v as i64),
            AttributeValue::Long(v) => SqlValue::Int(*v),
            AttributeValue::Float(v) => SqlValue::Double(*v as f64),
            AttributeValue::Double(v) => SqlValue::Double(*v),
            AttributeValue::Bool(v) => SqlValue::Bool(*v),
            AttributeValue::Text(s) => SqlValue::Text(s.clone()),
            AttributeValue::Instant(t) => SqlValue::Timestamp(t.naive_utc()),
            AttributeValue::LocalDateTime(t) => SqlValue::Timestamp(*t),
            AttributeValue::Object(v) => SqlValue::Text(v.to_string()),
        }
    }
}

/// One column of an existing table, as reported by the schema catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Declared SQL type text, e.g. `varchar(255)`.
    pub sql_type: String,
    /// Declared character width, where the type has one. Feeds the
    /// row-width budget.
    pub char_width: Option<u64>,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        let sql_type = sql_type.into();
        let char_width = declared_char_width(&sql_type);
        Self {
            name: name.into(),
            sql_type,
            char_width,
        }
    }
}

/// Extract the declared width from a `varchar(n)`/`char(n)` type string.
fn declared_char_width(sql_type: &str) -> Option<u64> {
    let lower = sql_type.to_lowercase();
    let rest = lower
        .strip_prefix("varchar(")
        .or_else(|| lower.strip_prefix("char("))?;
    rest.strip_suffix(')')?.parse().ok()
}

/// Relational storage: single-statement execution plus batched
/// parameterized execution.
///
/// A batch is atomic: the statement is executed once per bind row inside a
/// single transaction scope, or not at all.
pub trait RelationalStore {
    /// Execute one statement (DDL or DML) with no parameters.
    fn execute(&mut self, sql: &str) -> Result<usize>;

    /// Execute one parameterized statement once per bind row, as a single
    /// atomic batch. Returns the total number of affected rows.
    fn execute_batch(&mut self, sql: &str, rows: &[Vec<SqlValue>]) -> Result<usize>;
}

/// Schema catalog: list the columns of a table.
pub trait SchemaCatalog {
    /// Columns of `table`, or an empty list when the table does not exist.
    fn columns_of(&mut self, table: &str) -> Result<Vec<ColumnDescriptor>>;
}
