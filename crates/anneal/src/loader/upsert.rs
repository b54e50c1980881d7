//! Parameterized batch upsert construction.

use crate::record::Record;

use super::schema::{ColumnPlan, ColumnSource};
use super::store::SqlValue;

/// Build the one batch upsert for a slice: the statement text (with `?`
/// placeholders and `ON DUPLICATE KEY UPDATE col=VALUES(col)` for every
/// column) plus one bind row per record. Records missing a column bind
/// `Null`.
pub(crate) fn build_upsert(
    table: &str,
    plan: &ColumnPlan,
    slice: &[Record],
) -> (String, Vec<Vec<SqlValue>>) {
    let names: Vec<&str> = plan.columns.iter().map(|c| c.name.as_str()).collect();
    let placeholders = vec!["?"; names.len()].join(", ");
    let updates: Vec<String> = names
        .iter()
        .map(|name| format!("{name}=VALUES({name})"))
        .collect();

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) ON DUPLICATE KEY UPDATE {}",
        table,
        names.join(", "),
        placeholders,
        updates.join(", ")
    );

    let rows = slice
        .iter()
        .map(|record| {
            plan.columns
                .iter()
                .map(|col| bind_value(record, &col.source))
                .collect()
        })
        .collect();

    (sql, rows)
}

fn bind_value(record: &Record, source: &ColumnSource) -> SqlValue {
    match source {
        ColumnSource::Id => SqlValue::Text(record.id().to_string()),
        ColumnSource::Plain(attribute) => record
            .attribute(attribute)
            .and_then(|attr| attr.value())
            .map(SqlValue::from)
            .unwrap_or(SqlValue::Null),
        ColumnSource::Encoded {
            attribute,
            category,
        } => record
            .attribute(attribute)
            .and_then(|attr| attr.encoded_values())
            .and_then(|encoded| encoded.get(category))
            .map(|v| SqlValue::Int(*v as i64))
            .unwrap_or(SqlValue::Null),
    }
}
