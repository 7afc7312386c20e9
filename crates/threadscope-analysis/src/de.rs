//! Lenient field deserializers for scraped dumps.
//!
//! Dumps come from different exporters: timestamps may be epoch seconds or
//! RFC 3339 strings, and booleans may be `true`, `True` or `1`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Int(i64),
    Float(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBool {
    Bool(bool),
    Int(i64),
    Text(String),
}

pub(crate) fn opt_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<RawTimestamp>::deserialize(deserializer)? else {
        return Ok(None);
    };

    let parsed = match raw {
        RawTimestamp::Int(secs) => DateTime::from_timestamp(secs, 0),
        #[allow(clippy::cast_possible_truncation)]
        RawTimestamp::Float(secs) => DateTime::from_timestamp(secs.trunc() as i64, 0),
        RawTimestamp::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
                Some(dt.with_timezone(&Utc))
            } else if let Ok(dt) =
                chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
            {
                Some(dt.and_utc())
            } else {
                return Err(serde::de::Error::custom(format!(
                    "unrecognized timestamp '{text}'"
                )));
            }
        }
    };

    parsed
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom("timestamp out of range"))
}

pub(crate) fn opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawBool>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawBool::Bool(b)) => Ok(Some(b)),
        Some(RawBool::Int(n)) => Ok(Some(n != 0)),
        Some(RawBool::Text(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "true" | "t" | "yes" | "1" => Ok(Some(true)),
            "false" | "f" | "no" | "0" => Ok(Some(false)),
            other => Err(serde::de::Error::custom(format!(
                "unrecognized boolean '{other}'"
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "super::opt_timestamp")]
        at: Option<chrono::DateTime<chrono::Utc>>,
        #[serde(default, deserialize_with = "super::opt_bool")]
        flag: Option<bool>,
    }

    #[test]
    fn epoch_seconds_and_rfc3339_agree() {
        let a: Probe = serde_json::from_str(r#"{"at": 1700000000}"#).unwrap();
        let b: Probe = serde_json::from_str(r#"{"at": 1700000000.75}"#).unwrap();
        let c: Probe = serde_json::from_str(r#"{"at": "2023-11-14T22:13:20Z"}"#).unwrap();
        assert_eq!(a.at, b.at);
        assert_eq!(a.at, c.at);
    }

    #[test]
    fn missing_and_null_fields_are_none() {
        let p: Probe = serde_json::from_str(r#"{"at": null}"#).unwrap();
        assert!(p.at.is_none());
        assert!(p.flag.is_none());
    }

    #[test]
    fn python_style_booleans_are_accepted() {
        let p: Probe = serde_json::from_str(r#"{"flag": "True"}"#).unwrap();
        assert_eq!(p.flag, Some(true));
        let p: Probe = serde_json::from_str(r#"{"flag": 0}"#).unwrap();
        assert_eq!(p.flag, Some(false));
    }

    #[test]
    fn garbage_timestamp_is_an_error() {
        assert!(serde_json::from_str::<Probe>(r#"{"at": "yesterday"}"#).is_err());
    }
}
