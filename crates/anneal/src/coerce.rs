//! String-to-typed-value coercion over the declared type space.
//!
//! Coercion is deliberately soft: malformed source data degrades to
//! "missing" rather than aborting the pipeline. The only signals are
//! `tracing` warnings.

use chrono::NaiveDateTime;
use tracing::warn;

use crate::attribute::{AttributeValue, TypeTag};

/// Convert a raw extracted string into a typed value for the given tag.
///
/// Policy:
/// - null-ish input (empty or whitespace-only) is absent, not an error;
/// - unparsable numeric/boolean/temporal input is absent and logged;
/// - temporal tags with no format pattern are absent; the coder never
///   guesses a default pattern;
/// - `Object` accepts any input: valid JSON parses, anything else is kept
///   as a JSON string.
pub fn coerce(raw: &str, tag: TypeTag, format: Option<&str>) -> Option<AttributeValue> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    match tag {
        TypeTag::Integer => parse_numeric(trimmed, tag, |s| {
            s.parse::<i32>().ok().map(AttributeValue::Int)
        }),
        TypeTag::Long => parse_numeric(trimmed, tag, |s| {
            s.parse::<i64>().ok().map(AttributeValue::Long)
        }),
        TypeTag::Float => parse_numeric(trimmed, tag, |s| {
            s.parse::<f32>().ok().map(AttributeValue::Float)
        }),
        TypeTag::Double => parse_numeric(trimmed, tag, |s| {
            s.parse::<f64>().ok().map(AttributeValue::Double)
        }),
        TypeTag::Boolean => match trimmed.to_lowercase().as_str() {
            "true" => Some(AttributeValue::Bool(true)),
            "false" => Some(AttributeValue::Bool(false)),
            _ => {
                warn!(value = trimmed, "unparsable boolean, treating as absent");
                None
            }
        },
        TypeTag::String => Some(AttributeValue::Text(raw.to_string())),
        TypeTag::Instant => parse_temporal(trimmed, format)
            .map(|naive| AttributeValue::Instant(naive.and_utc())),
        TypeTag::LocalDateTime => {
            parse_temporal(trimmed, format).map(AttributeValue::LocalDateTime)
        }
        TypeTag::Object => Some(AttributeValue::Object(
            serde_json::from_str(trimmed)
                .unwrap_or_else(|_| serde_json::Value::String(raw.to_string())),
        )),
    }
}

fn parse_numeric<F>(trimmed: &str, tag: TypeTag, parse: F) -> Option<AttributeValue>
where
    F: Fn(&str) -> Option<AttributeValue>,
{
    let parsed = parse(trimmed);
    if parsed.is_none() {
        warn!(value = trimmed, %tag, "unparsable numeric, treating as absent");
    }
    parsed
}

fn parse_temporal(trimmed: &str, format: Option<&str>) -> Option<NaiveDateTime> {
    let pattern = format?;
    match NaiveDateTime::parse_from_str(trimmed, pattern) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!(
                value = trimmed,
                pattern,
                error = %err,
                "unparsable temporal value, treating as absent"
            );
            None
        }
    }
}
