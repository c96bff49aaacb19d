//! Lenient timestamp coercion.
//!
//! Stored documents carry timestamps in whatever shape the writer produced:
//! RFC 3339 strings, bare dates, epoch milliseconds, or the document store's
//! native `{seconds, nanoseconds}` object. Everything is normalised to
//! `DateTime<Utc>` on read and written back as RFC 3339. A `null` or blank
//! value reads as the current time.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Millis(i64),
    FloatMillis(f64),
    Native {
        seconds: i64,
        #[serde(default)]
        nanoseconds: u32,
    },
    AdminNative {
        #[serde(rename = "_seconds")]
        seconds: i64,
        #[serde(rename = "_nanoseconds", default)]
        nanoseconds: u32,
    },
}

impl RawTimestamp {
    fn coerce(self) -> Option<DateTime<Utc>> {
        match self {
            RawTimestamp::Text(text) => parse_lenient(&text),
            RawTimestamp::Millis(ms) => Utc.timestamp_millis_opt(ms).single(),
            RawTimestamp::FloatMillis(ms) => Utc.timestamp_millis_opt(ms as i64).single(),
            RawTimestamp::Native {
                seconds,
                nanoseconds,
            }
            | RawTimestamp::AdminNative {
                seconds,
                nanoseconds,
            } => Utc.timestamp_opt(seconds, nanoseconds).single(),
        }
    }
}

/// Parses a textual timestamp, accepting RFC 3339, naive ISO date-times
/// (interpreted as UTC) and bare `YYYY-MM-DD` dates (UTC midnight).
pub fn parse_lenient(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawTimestamp>::deserialize(deserializer)? {
        None => Ok(Utc::now()),
        Some(RawTimestamp::Text(text)) if text.trim().is_empty() => Ok(Utc::now()),
        Some(raw) => raw
            .coerce()
            .ok_or_else(|| serde::de::Error::custom("unrecognised timestamp representation")),
    }
}
