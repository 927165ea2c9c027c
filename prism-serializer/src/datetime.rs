// prism_serializer/src/datetime.rs
//
// Parsing and rendering for the datetime field. Unlike every other
// conversion this one never fails on input: anything that cannot be read
// as a date is handed back unchanged.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike};
use serde_json::Value as JsonValue;

use crate::error::{Result, SerializeError};
use crate::value::Value;

// Tried after RFC 3339; `%z` covers basic offsets such as `+0000`
const AWARE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Reject strftime templates chrono cannot render.
pub fn validate_format(format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(SerializeError::InvalidFormat(format.to_string()));
    }
    Ok(())
}

/// Read an ISO-8601 style string into a date value.
pub fn parse(text: &str) -> Option<Value> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(Value::DateTime(dt));
    }
    for format in AWARE_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(Value::DateTime(dt));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Value::NaiveDateTime(dt));
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(Value::Date)
}

/// ISO-8601 rendering; `None` for non-date values.
pub fn isoformat(value: &Value) -> Option<String> {
    match value {
        Value::DateTime(dt) => Some(isoformat_aware(dt)),
        Value::NaiveDateTime(dt) => Some(isoformat_naive(dt)),
        Value::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        _ => None,
    }
}

fn isoformat_naive(dt: &NaiveDateTime) -> String {
    // Fractional seconds only when present, always as microseconds
    if dt.nanosecond() == 0 {
        dt.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

fn isoformat_aware(dt: &DateTime<FixedOffset>) -> String {
    format!("{}{}", isoformat_naive(&dt.naive_local()), dt.format("%:z"))
}

/// Render with a strftime template. `None` when the template needs
/// components the value does not have (e.g. `%z` on a naive value).
fn render_with(value: &Value, format: &str) -> Option<String> {
    let mut out = String::new();
    let written = match value {
        Value::DateTime(dt) => write!(out, "{}", dt.format(format)),
        Value::NaiveDateTime(dt) => write!(out, "{}", dt.format(format)),
        Value::Date(d) => write!(out, "{}", d.format(format)),
        _ => return None,
    };
    written.ok().map(|_| out)
}

/// Conversion used by the datetime field.
pub fn to_value(raw: Value, format: Option<&str>) -> Result<JsonValue> {
    let parsed = match &raw {
        Value::Null => return Ok(JsonValue::Null),
        Value::Str(text) => parse(text),
        Value::DateTime(_) | Value::NaiveDateTime(_) | Value::Date(_) => Some(raw.clone()),
        _ => None,
    };
    let Some(parsed) = parsed else {
        return raw.into_json();
    };
    let rendered = match format {
        Some(format) => render_with(&parsed, format),
        None => isoformat(&parsed),
    };
    match rendered {
        Some(text) => Ok(JsonValue::String(text)),
        None => raw.into_json(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn test_parse_variants() {
        assert!(matches!(
            parse("2022-01-01T12:00:00Z"),
            Some(Value::DateTime(_))
        ));
        assert!(matches!(
            parse("2022-01-01 12:00:00+02:00"),
            Some(Value::DateTime(_))
        ));
        assert!(matches!(
            parse("2022-01-01T12:00:00.250"),
            Some(Value::NaiveDateTime(_))
        ));
        assert!(matches!(parse("2022-01-01"), Some(Value::Date(_))));
        assert!(parse("invalid datetime").is_none());
    }

    #[test]
    fn test_parse_basic_offset() {
        let Some(Value::DateTime(dt)) = parse("2022-01-01T12:00:00+0000") else {
            panic!("basic offset not parsed");
        };
        assert_eq!(isoformat_aware(&dt), "2022-01-01T12:00:00+00:00");

        let Some(Value::DateTime(dt)) = parse("2022-01-01 12:00:00.5-0530") else {
            panic!("basic offset with fraction not parsed");
        };
        assert_eq!(dt.offset().local_minus_utc(), -(5 * 3600 + 30 * 60));
    }

    #[test]
    fn test_isoformat() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let aware = offset.with_ymd_and_hms(2022, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(
            isoformat(&Value::DateTime(aware)).unwrap(),
            "2022-01-01T12:00:00+02:00"
        );

        let naive = NaiveDate::from_ymd_opt(2022, 1, 1)
            .unwrap()
            .and_hms_micro_opt(8, 30, 0, 1500)
            .unwrap();
        assert_eq!(
            isoformat(&Value::NaiveDateTime(naive)).unwrap(),
            "2022-01-01T08:30:00.001500"
        );
    }

    #[test]
    fn test_naive_value_with_offset_template_passes_through() {
        let naive = NaiveDate::from_ymd_opt(2022, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        // No offset to render, so the input comes back unchanged
        let out = to_value(Value::NaiveDateTime(naive), Some("%z")).unwrap();
        assert_eq!(out, JsonValue::String("2022-01-01T00:00:00".to_string()));
    }

    #[test]
    fn test_non_date_values_pass_through() {
        assert_eq!(to_value(Value::Int(5), None).unwrap(), JsonValue::from(5));
    }

    #[test]
    fn test_validate_format() {
        assert!(validate_format("%m/%d/%Y %I:%M %p").is_ok());
        assert!(matches!(
            validate_format("%Q"),
            Err(SerializeError::InvalidFormat(_))
        ));
    }
}
