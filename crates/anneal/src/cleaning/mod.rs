//! Column statistical cleaning over a batch of records.
//!
//! Attributes are grouped by name into columns, each column routed by its
//! declared tag into the numeric or categorical pipeline, and the records
//! are rebuilt from the cleaned columns. Cleaning is pure: the input batch
//! is never mutated, so no pipeline stage can alias another's column.

mod categorical;
mod numeric;

use indexmap::IndexMap;

use crate::attribute::{TypeTag, TypedAttribute};
use crate::error::{AnnealError, Result};
use crate::record::Record;

/// One attribute within a column, tagged with the index of the record it
/// came from so the batch can be reassembled after cleaning.
pub(crate) type ColumnEntry = (usize, TypedAttribute);

/// Clean a batch of records and return the rebuilt batch.
///
/// Every column routes into exactly one of two streams: numeric
/// (Integer/Long/Float/Double) or categorical (String). Any other declared
/// tag fails the whole batch. Attributes rejected as outliers are removed
/// from their records entirely.
pub fn clean_batch(records: &[Record]) -> Result<Vec<Record>> {
    if records.is_empty() {
        return Ok(Vec::new());
    }

    // Columns keyed by attribute name, in first-seen order.
    let mut columns: IndexMap<String, Vec<ColumnEntry>> = IndexMap::new();
    for (idx, record) in records.iter().enumerate() {
        for attr in record.attributes().values() {
            columns
                .entry(attr.name().to_string())
                .or_default()
                .push((idx, attr.clone()));
        }
    }

    let mut cleaned_records: Vec<Record> = records.iter().map(|r| Record::new(r.id())).collect();

    for (name, column) in columns {
        let tag = column[0].1.tag();
        let cleaned = if tag.is_numeric() {
            numeric::clean_column(&name, column)?
        } else if tag == TypeTag::String {
            categorical::clean_column(&name, column)?
        } else {
            return Err(AnnealError::UnsupportedColumnType { column: name, tag });
        };

        for (idx, attr) in cleaned {
            cleaned_records[idx].insert(attr);
        }
    }

    Ok(cleaned_records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttributeValue;

    fn record_with(id: &str, entries: &[(&str, TypeTag, Option<AttributeValue>)]) -> Record {
        let mut record = Record::new(id);
        for (name, tag, value) in entries {
            let mut attr = TypedAttribute::new(*name, *tag);
            if let Some(v) = value.clone() {
                attr.set_value(v).unwrap();
            }
            record.insert(attr);
        }
        record
    }

    #[test]
    fn test_empty_batch_is_noop() {
        assert!(clean_batch(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_input_batch_is_not_mutated() {
        let records = vec![record_with(
            "r1",
            &[("color", TypeTag::String, Some(AttributeValue::Text("red!".into())))],
        )];
        let cleaned = clean_batch(&records).unwrap();

        assert_eq!(
            records[0].attribute("color").unwrap().value(),
            Some(&AttributeValue::Text("red!".into()))
        );
        assert_eq!(
            cleaned[0].attribute("color").unwrap().value(),
            Some(&AttributeValue::Text("red".into()))
        );
    }

    #[test]
    fn test_outlier_attribute_removed_from_record() {
        let heights = [175.0, 180.0, 185.0, 190.0, 300.0, -100.0];
        let records: Vec<Record> = heights
            .iter()
            .enumerate()
            .map(|(i, h)| {
                record_with(
                    &format!("r{i}"),
                    &[("height", TypeTag::Double, Some(AttributeValue::Double(*h)))],
                )
            })
            .collect();

        // Sorted quartiles give fences [152.5, 212.5]: 300 and -100 are
        // rejected and their records lose the attribute.
        let cleaned = clean_batch(&records).unwrap();
        assert!(cleaned[4].attribute("height").is_none());
        assert!(cleaned[5].attribute("height").is_none());
        assert!(cleaned[3].attribute("height").is_some());
    }

    #[test]
    fn test_unsupported_tag_fails_batch() {
        let records = vec![record_with(
            "r1",
            &[("active", TypeTag::Boolean, Some(AttributeValue::Bool(true)))],
        )];
        assert!(matches!(
            clean_batch(&records),
            Err(AnnealError::UnsupportedColumnType {
                tag: TypeTag::Boolean,
                ..
            })
        ));
    }

    #[test]
    fn test_mixed_columns_route_independently() {
        let records = vec![
            record_with(
                "r1",
                &[
                    ("score", TypeTag::Double, Some(AttributeValue::Double(1.0))),
                    ("color", TypeTag::String, Some(AttributeValue::Text("red".into()))),
                ],
            ),
            record_with(
                "r2",
                &[
                    ("score", TypeTag::Double, Some(AttributeValue::Double(3.0))),
                    ("color", TypeTag::String, Some(AttributeValue::Text("blue".into()))),
                ],
            ),
        ];

        let cleaned = clean_batch(&records).unwrap();
        assert!(cleaned[0].attribute("score").unwrap().value().is_some());
        assert!(cleaned[0].attribute("color").unwrap().encoded_values().is_some());
        assert_eq!(cleaned[0].id(), "r1");
        assert_eq!(cleaned[1].id(), "r2");
    }
}
