//! Categorical column cleaning: character cleanup, mode imputation, and
//! one-hot encoding.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::attribute::{AttributeValue, TypeTag};
use crate::error::{AnnealError, Result};

use super::ColumnEntry;

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new("[^A-Za-z0-9]").unwrap());

/// Clean one categorical column: strip non-alphanumeric characters, impute
/// absent values with the column mode, one-hot encode, then re-validate.
pub(crate) fn clean_column(name: &str, column: Vec<ColumnEntry>) -> Result<Vec<ColumnEntry>> {
    for (_, attr) in &column {
        if attr.tag() != TypeTag::String {
            return Err(AnnealError::NonStringColumn {
                column: name.to_string(),
            });
        }
    }

    let mut column = column;
    strip_non_alnum(&mut column);
    let categories = impute_mode(name, &mut column);
    encode_one_hot(&mut column, &categories);

    for (_, attr) in &mut column {
        attr.apply_default_value();
        if !attr.apply_validation_rules() {
            return Err(AnnealError::ValidationFailure {
                attribute: name.to_string(),
            });
        }
    }

    Ok(column)
}

/// Strip characters outside `[A-Za-z0-9]` from every present value.
fn strip_non_alnum(column: &mut [ColumnEntry]) {
    for (_, attr) in column.iter_mut() {
        if let Some(text) = attr.value().and_then(|v| v.as_text()) {
            let stripped = NON_ALNUM.replace_all(text, "").into_owned();
            let _ = attr.set_value(AttributeValue::Text(stripped));
        }
    }
}

/// Replace absent values with the column mode and return the distinct
/// category set in first-seen order.
///
/// Tie-break: counts accumulate in record-scan order and a candidate only
/// replaces the mode when its count is strictly greater, so the first value
/// encountered wins ties. A column with no present values stays absent.
fn impute_mode(name: &str, column: &mut [ColumnEntry]) -> Vec<String> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for (_, attr) in column.iter() {
        if let Some(text) = attr.value().and_then(|v| v.as_text()) {
            *counts.entry(text.to_string()).or_insert(0) += 1;
        }
    }

    let mode = counts
        .iter()
        .fold(None::<(&String, usize)>, |best, (value, &count)| match best {
            Some((_, best_count)) if count <= best_count => best,
            _ => Some((value, count)),
        })
        .map(|(value, _)| value.clone());

    match mode {
        Some(mode) => {
            for (_, attr) in column.iter_mut() {
                if attr.value().is_none() {
                    let _ = attr.set_value(AttributeValue::Text(mode.clone()));
                }
            }
        }
        None => {
            if !column.is_empty() {
                warn!(column = name, "no present values to impute mode from");
            }
        }
    }

    counts.into_keys().collect()
}

/// Attach a one-hot indicator map over the category set to every attribute:
/// category -> 1 when equal to the attribute's value, 0 otherwise.
fn encode_one_hot(column: &mut [ColumnEntry], categories: &[String]) {
    for (_, attr) in column.iter_mut() {
        let value = attr.value().and_then(|v| v.as_text()).map(str::to_string);
        let encoded: IndexMap<String, i32> = categories
            .iter()
            .map(|category| {
                let hit = value.as_deref() == Some(category.as_str());
                (category.clone(), if hit { 1 } else { 0 })
            })
            .collect();
        attr.set_encoded_values(encoded);
    }
}
