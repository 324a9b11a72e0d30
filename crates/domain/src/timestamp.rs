use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};

/// A timestamp found in an upstream document together with the raw value
/// it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTimestamp {
    pub at: DateTime<Utc>,
    pub field: &'static str,
    pub raw: String,
}

/// Parses RFC 3339 timestamps and the offset-less variants the request
/// source emits. Offset-less values are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Consults `candidates` in order and returns the first field holding a
/// parseable timestamp. Fields that are absent, empty or unparseable are
/// passed over.
pub fn resolve_timestamp(
    fields: &Map<String, Value>,
    candidates: &[&'static str],
) -> Option<ResolvedTimestamp> {
    candidates.iter().find_map(|field| {
        let raw = fields.get(*field)?.as_str()?;
        parse_timestamp(raw).map(|at| ResolvedTimestamp {
            at,
            field,
            raw: raw.to_string(),
        })
    })
}

/// Reads a unix timestamp in seconds, given either as a json number or as a
/// numeric string.
pub fn from_unix_seconds(value: &Value) -> Option<DateTime<Utc>> {
    let seconds = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    if seconds <= 0 {
        return None;
    }
    Utc.timestamp_opt(seconds, 0).single()
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("Expected an object"),
        }
    }

    #[test]
    fn parses_supported_formats() {
        let expected = Utc.with_ymd_and_hms(2023, 4, 1, 12, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2023-04-01T12:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2023-04-01T12:30:00.000Z"), Some(expected));
        assert_eq!(parse_timestamp("2023-04-01T14:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-04-01T12:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-04-01 12:30:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2023-04-01"),
            Some(Utc.with_ymd_and_hms(2023, 4, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("   "), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2023-13-45T00:00:00Z"), None);
    }

    #[test]
    fn resolves_first_parseable_candidate() {
        let doc = fields(json!({
            "mediaAddedAt": "not a date",
            "mediaAddedDate": "2022-01-02T03:04:05Z",
        }));
        let resolved = resolve_timestamp(&doc, &["mediaAddedAt", "mediaAddedDate"])
            .expect("To resolve the fallback field");
        assert_eq!(resolved.field, "mediaAddedDate");
        assert_eq!(resolved.raw, "2022-01-02T03:04:05Z");
        assert_eq!(resolved.at, Utc.with_ymd_and_hms(2022, 1, 2, 3, 4, 5).unwrap());
    }

    #[test]
    fn candidate_order_wins_over_document_order() {
        let doc = fields(json!({
            "b": "2020-01-01T00:00:00Z",
            "a": "2021-01-01T00:00:00Z",
        }));
        let resolved = resolve_timestamp(&doc, &["a", "b"]).unwrap();
        assert_eq!(resolved.field, "a");
    }

    #[test]
    fn nothing_resolves_from_missing_or_null_fields() {
        let doc = fields(json!({ "mediaAddedAt": null, "other": 5 }));
        assert!(resolve_timestamp(&doc, &["mediaAddedAt", "mediaAddedDate"]).is_none());
    }

    #[test]
    fn unix_seconds_from_numbers_and_strings() {
        let expected = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(from_unix_seconds(&json!(1_700_000_000)), Some(expected));
        assert_eq!(from_unix_seconds(&json!("1700000000")), Some(expected));
        assert_eq!(from_unix_seconds(&json!("abc")), None);
        assert_eq!(from_unix_seconds(&json!(0)), None);
        assert_eq!(from_unix_seconds(&Value::Null), None);
    }
}
