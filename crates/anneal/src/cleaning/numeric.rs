//! Numeric column cleaning: outlier rejection, imputation, normalization.

use tracing::warn;

use crate::attribute::AttributeValue;
use crate::error::{AnnealError, Result};

use super::ColumnEntry;

/// Tukey fence multiplier.
const IQR_MULTIPLIER: f64 = 1.5;

/// Clean one numeric column, in strict order: reject outliers, impute
/// absent values with the surviving mean, normalize to z-scores, then
/// re-validate every attribute.
///
/// Returns a new column; fenced-out attributes are removed entirely so they
/// cannot reappear via imputation.
pub(crate) fn clean_column(name: &str, column: Vec<ColumnEntry>) -> Result<Vec<ColumnEntry>> {
    for (_, attr) in &column {
        if !attr.tag().is_numeric() {
            return Err(AnnealError::NonNumericColumn {
                column: name.to_string(),
            });
        }
    }

    let mut column = reject_outliers(column);
    impute_mean(name, &mut column);
    normalize(&mut column);

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

/// Drop attributes outside the Tukey fences.
///
/// Quartiles use the fixed positional rule: after sorting the n present
/// values, q1 is the value at index n/4 and q3 the value at index 3n/4
/// (integer division, not interpolation). Runs before imputation so
/// rejected values cannot pollute the mean.
fn reject_outliers(column: Vec<ColumnEntry>) -> Vec<ColumnEntry> {
    let mut sorted = present_values(&column);
    if sorted.is_empty() {
        return column;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    let q1 = sorted[n / 4];
    let q3 = sorted[3 * n / 4];
    let iqr = q3 - q1;
    let lower = q1 - IQR_MULTIPLIER * iqr;
    let upper = q3 + IQR_MULTIPLIER * iqr;

    column
        .into_iter()
        .filter(|(_, attr)| match attr.value().and_then(|v| v.as_f64()) {
            Some(v) => v >= lower && v <= upper,
            None => true,
        })
        .collect()
}

/// Fill absent values with the arithmetic mean of the present ones, cast to
/// each attribute's declared numeric subtype. A fully-absent column stays
/// absent; that is a warning, not a failure.
fn impute_mean(name: &str, column: &mut [ColumnEntry]) {
    let present = present_values(column);
    if present.is_empty() {
        if column.iter().any(|(_, attr)| attr.value().is_none()) {
            warn!(column = name, "no present values to impute from, leaving column absent");
        }
        return;
    }

    let mean = present.iter().sum::<f64>() / present.len() as f64;
    for (_, attr) in column.iter_mut() {
        if attr.value().is_none() {
            if let Some(value) = AttributeValue::from_f64(attr.tag(), mean) {
                // Tag agreement holds by construction.
                let _ = attr.set_value(value);
            }
        }
    }
}

/// Replace each present value with its z-score under the population
/// standard deviation. Zero deviation or an empty column is a no-op.
fn normalize(column: &mut [ColumnEntry]) {
    let present = present_values(column);
    if present.is_empty() {
        return;
    }

    let n = present.len() as f64;
    let mean = present.iter().sum::<f64>() / n;
    let variance = present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();
    if std == 0.0 {
        return;
    }

    for (_, attr) in column.iter_mut() {
        if let Some(v) = attr.value().and_then(|v| v.as_f64()) {
            if let Some(value) = AttributeValue::from_f64(attr.tag(), (v - mean) / std) {
                let _ = attr.set_value(value);
            }
        }
    }
}

fn present_values(column: &[ColumnEntry]) -> Vec<f64> {
    column
        .iter()
        .filter_map(|(_, attr)| attr.value().and_then(|v| v.as_f64()))
        .collect()
}
