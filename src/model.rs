// Snapshots of the records returned by the server. The command layer only
// reads these for display; every change goes through a resource service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, with = "timestamp")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp")]
    pub updated: Option<DateTime<Utc>>,
}

/// A mailbox in a domain. The password is write-only and never returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, with = "timestamp")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp")]
    pub updated: Option<DateTime<Utc>>,
}

/// One recipient mapping of an alias. An alias name with several recipients
/// is represented by several `Alias` values sharing `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, with = "timestamp")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp")]
    pub updated: Option<DateTime<Utc>>,
}

/// A BCC rule of an account, incoming or outgoing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bcc {
    #[serde(default)]
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, with = "timestamp")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp")]
    pub updated: Option<DateTime<Utc>>,
}

/// Tokens issued by a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub auth_token: String,
    pub refresh_token: String,
}

/// Lenient (de)serialization of optional timestamps: RFC3339, ISO-8601
/// without offset (taken as UTC) or Unix seconds/milliseconds.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    pub fn serialize<S>(dt: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match dt {
            Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            String(String),
            Number(i64),
        }

        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::String(s)) if s.is_empty() => Ok(None),
            Some(Raw::String(s)) => parse_str(&s)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp: '{s}'"))),
            Some(Raw::Number(n)) => from_unix(n)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid Unix timestamp: {n}"))),
        }
    }

    fn parse_str(s: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .map(|naive| Utc.from_utc_datetime(&naive))
    }

    // Values past 10^11 can only be milliseconds for any realistic date.
    fn from_unix(n: i64) -> Option<DateTime<Utc>> {
        if n.abs() >= 100_000_000_000 {
            DateTime::from_timestamp_millis(n)
        } else {
            DateTime::from_timestamp(n, 0)
        }
    }
}
