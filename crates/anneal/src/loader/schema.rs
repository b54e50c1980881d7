//! Schema synthesis: column planning, DDL generation, and evolution of an
//! existing table under the row-width budget.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::attribute::{AttributeValue, TypeTag, TypedAttribute};
use crate::record::Record;

use super::store::ColumnDescriptor;

static NON_IDENT: Lazy<Regex> = Lazy::new(|| Regex::new("[^A-Za-z0-9_]").unwrap());

/// MySQL's maximum declared byte width per row.
pub const ROW_WIDTH_BUDGET: u64 = 65_535;

/// Strip a table name down to `[A-Za-z0-9_]`.
pub fn sanitize_table_name(name: &str) -> String {
    NON_IDENT.replace_all(name, "").into_owned()
}

/// Sanitize a column name: spaces become underscores first, then anything
/// outside `[A-Za-z0-9_]` is stripped.
pub fn sanitize_column_name(name: &str) -> String {
    NON_IDENT
        .replace_all(&name.replace(' ', "_"), "")
        .into_owned()
}

/// Where a planned column's bind value comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ColumnSource {
    /// The record identifier, the upsert key.
    Id,
    /// An attribute's scalar value.
    Plain(String),
    /// One entry of an attribute's one-hot indicator map.
    Encoded { attribute: String, category: String },
}

/// One column of the destination table, as planned from a slice.
#[derive(Debug, Clone)]
pub(crate) struct PlannedColumn {
    pub name: String,
    pub sql_type: String,
    pub source: ColumnSource,
}

impl PlannedColumn {
    /// Declared character width this column contributes to the row budget.
    pub fn char_width(&self) -> u64 {
        ColumnDescriptor::new(&self.name, &self.sql_type)
            .char_width
            .unwrap_or(0)
    }
}

/// The destination column set for a slice: the record id plus the union of
/// every record's plain values and one-hot entries, in first-seen order.
#[derive(Debug, Clone)]
pub(crate) struct ColumnPlan {
    pub columns: Vec<PlannedColumn>,
}

impl ColumnPlan {
    pub fn from_slice(slice: &[Record]) -> Self {
        let mut columns = vec![PlannedColumn {
            name: "id".to_string(),
            sql_type: "VARCHAR(255)".to_string(),
            source: ColumnSource::Id,
        }];

        for record in slice {
            for attr in record.attributes().values() {
                match attr.encoded_values() {
                    Some(encoded) => {
                        for category in encoded.keys() {
                            let name =
                                sanitize_column_name(&format!("{}_{}", attr.name(), category));
                            push_unique(
                                &mut columns,
                                PlannedColumn {
                                    name,
                                    sql_type: "INT".to_string(),
                                    source: ColumnSource::Encoded {
                                        attribute: attr.name().to_string(),
                                        category: category.clone(),
                                    },
                                },
                            );
                        }
                    }
                    None => {
                        let name = sanitize_column_name(attr.name());
                        push_unique(
                            &mut columns,
                            PlannedColumn {
                                name,
                                sql_type: infer_sql_type(attr),
                                source: ColumnSource::Plain(attr.name().to_string()),
                            },
                        );
                    }
                }
            }
        }

        Self { columns }
    }
}

/// Keep the first occurrence of a sanitized name; duplicates are dropped
/// with a warning.
fn push_unique(columns: &mut Vec<PlannedColumn>, column: PlannedColumn) {
    if let Some(existing) = columns.iter().find(|c| c.name == column.name) {
        if existing.source != column.source {
            warn!(
                column = column.name,
                "duplicate sanitized column name, keeping first occurrence"
            );
        }
        return;
    }
    columns.push(column);
}

/// Infer a SQL type from an attribute's first value, falling back to its
/// declared tag when the column never carries a value.
fn infer_sql_type(attr: &TypedAttribute) -> String {
    match attr.value() {
        Some(value) => sql_type_of_value(value),
        None => sql_type_of_tag(attr.tag()),
    }
}

fn sql_type_of_value(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Int(_) => "INT".to_string(),
        AttributeValue::Long(_) => "BIGINT".to_string(),
        AttributeValue::Bool(_) => "TINYINT(1)".to_string(),
        AttributeValue::Float(_) | AttributeValue::Double(_) => "DECIMAL(10,2)".to_string(),
        AttributeValue::Text(s) if s.len() <= 255 => "VARCHAR(255)".to_string(),
        AttributeValue::Text(_) => "TEXT".to_string(),
        AttributeValue::Instant(_) | AttributeValue::LocalDateTime(_) => "TIMESTAMP".to_string(),
        AttributeValue::Object(_) => "TEXT".to_string(),
    }
}

fn sql_type_of_tag(tag: TypeTag) -> String {
    match tag {
        TypeTag::Integer => "INT".to_string(),
        TypeTag::Long => "BIGINT".to_string(),
        TypeTag::Boolean => "TINYINT(1)".to_string(),
        TypeTag::Float | TypeTag::Double => "DECIMAL(10,2)".to_string(),
        TypeTag::String => "VARCHAR(255)".to_string(),
        TypeTag::Instant | TypeTag::LocalDateTime => "TIMESTAMP".to_string(),
        TypeTag::Object => "TEXT".to_string(),
    }
}

/// Best-effort type for an existing column, from name-substring heuristics.
/// Used only by the opt-in adjustment pass; it can narrow a column and
/// truncate data, which is why it is off by default.
pub(crate) fn heuristic_sql_type(column: &str) -> &'static str {
    let lower = column.to_lowercase();
    if lower.contains("id") {
        "INT"
    } else if lower.contains("price") {
        "DECIMAL(10,2)"
    } else if lower.contains("created_at") {
        "TIMESTAMP"
    } else if lower.starts_with("is_") {
        "TINYINT(1)"
    } else {
        "TEXT"
    }
}

/// Render the CREATE TABLE statement for a planned column set. The id
/// column is the primary key so the batch upsert has its uniqueness
/// constraint.
pub(crate) fn create_table_sql(table: &str, plan: &ColumnPlan) -> String {
    let defs: Vec<String> = plan
        .columns
        .iter()
        .map(|col| match col.source {
            ColumnSource::Id => format!("{} {} PRIMARY KEY", col.name, col.sql_type),
            _ => format!("{} {}", col.name, col.sql_type),
        })
        .collect();
    format!("CREATE TABLE {} ({})", table, defs.join(", "))
}

/// Which columns of the plan are not yet present in the table.
pub(crate) fn missing_columns<'a>(
    plan: &'a ColumnPlan,
    existing: &[ColumnDescriptor],
) -> Vec<&'a PlannedColumn> {
    plan.columns
        .iter()
        .filter(|col| !existing.iter().any(|e| e.name == col.name))
        .collect()
}

/// Sum of declared character widths across existing columns.
pub(crate) fn declared_row_width(existing: &[ColumnDescriptor]) -> u64 {
    existing.iter().filter_map(|c| c.char_width).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn attr(name: &str, value: AttributeValue) -> TypedAttribute {
        let tag = value.tag();
        TypedAttribute::new(name, tag).with_value(value).unwrap()
    }

    #[test]
    fn test_sanitize_names() {
        assert_eq!(sanitize_table_name("user profiles!"), "userprofiles");
        assert_eq!(sanitize_column_name("user id"), "user_id");
        assert_eq!(sanitize_column_name("price ($)"), "price_");
    }

    #[test]
    fn test_type_inference_rule() {
        assert_eq!(sql_type_of_value(&AttributeValue::Int(1)), "INT");
        assert_eq!(sql_type_of_value(&AttributeValue::Long(1)), "BIGINT");
        assert_eq!(sql_type_of_value(&AttributeValue::Bool(true)), "TINYINT(1)");
        assert_eq!(sql_type_of_value(&AttributeValue::Double(9.99)), "DECIMAL(10,2)");
        assert_eq!(
            sql_type_of_value(&AttributeValue::Text("short".into())),
            "VARCHAR(255)"
        );
        assert_eq!(
            sql_type_of_value(&AttributeValue::Text("x".repeat(256))),
            "TEXT"
        );
    }

    #[test]
    fn test_plan_includes_id_first() {
        let mut record = Record::new("r1");
        record.insert(attr("age", AttributeValue::Int(30)));
        let plan = ColumnPlan::from_slice(&[record]);

        assert_eq!(plan.columns[0].name, "id");
        assert_eq!(plan.columns[0].source, ColumnSource::Id);
        assert_eq!(plan.columns[1].name, "age");
    }

    #[test]
    fn test_plan_expands_encoded_values() {
        let mut color = TypedAttribute::new("color", TypeTag::String);
        let mut encoded = IndexMap::new();
        encoded.insert("red".to_string(), 1);
        encoded.insert("blue".to_string(), 0);
        color.set_encoded_values(encoded);

        let mut record = Record::new("r1");
        record.insert(color);
        let plan = ColumnPlan::from_slice(&[record]);

        let names: Vec<&str> = plan.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "color_red", "color_blue"]);
        assert!(plan.columns[1..].iter().all(|c| c.sql_type == "INT"));
    }

    #[test]
    fn test_duplicate_sanitized_names_keep_first() {
        let mut record = Record::new("r1");
        record.insert(attr("user id", AttributeValue::Int(1)));
        record.insert(attr("user_id", AttributeValue::Text("abc".into())));
        let plan = ColumnPlan::from_slice(&[record]);

        assert_eq!(plan.columns.len(), 2);
        assert_eq!(plan.columns[1].name, "user_id");
        assert_eq!(plan.columns[1].sql_type, "INT");
    }

    #[test]
    fn test_create_table_sql() {
        let mut record = Record::new("r1");
        record.insert(attr("user id", AttributeValue::Int(1)));
        record.insert(attr("price", AttributeValue::Double(9.99)));
        record.insert(attr("is_active", AttributeValue::Bool(true)));
        let plan = ColumnPlan::from_slice(&[record]);

        assert_eq!(
            create_table_sql("people", &plan),
            "CREATE TABLE people (id VARCHAR(255) PRIMARY KEY, \
             user_id INT, price DECIMAL(10,2), is_active TINYINT(1))"
        );
    }

    #[test]
    fn test_heuristic_types() {
        assert_eq!(heuristic_sql_type("user_id"), "INT");
        assert_eq!(heuristic_sql_type("unit_price"), "DECIMAL(10,2)");
        assert_eq!(heuristic_sql_type("created_at"), "TIMESTAMP");
        assert_eq!(heuristic_sql_type("is_active"), "TINYINT(1)");
        assert_eq!(heuristic_sql_type("notes"), "TEXT");
    }

    #[test]
    fn test_declared_row_width() {
        let existing = vec![
            ColumnDescriptor::new("id", "varchar(255)"),
            ColumnDescriptor::new("n", "int"),
            ColumnDescriptor::new("label", "varchar(100)"),
        ];
        assert_eq!(declared_row_width(&existing), 355);
    }
}
