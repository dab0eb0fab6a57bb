use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// Treats an empty query-string value (`?classId=`) as absent.
pub fn deserialize_optional_uuid<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => Uuid::parse_str(&s)
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Same as [`deserialize_optional_uuid`] for `YYYY-MM-DD` dates.
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Query {
        #[serde(default, deserialize_with = "deserialize_optional_uuid")]
        id: Option<Uuid>,
        #[serde(default, deserialize_with = "deserialize_optional_date")]
        day: Option<NaiveDate>,
    }

    #[test]
    fn test_empty_values_are_none() {
        let q: Query = serde_json::from_str(r#"{"id":"","day":""}"#).unwrap();
        assert!(q.id.is_none());
        assert!(q.day.is_none());
    }

    #[test]
    fn test_missing_values_are_none() {
        let q: Query = serde_json::from_str("{}").unwrap();
        assert!(q.id.is_none());
        assert!(q.day.is_none());
    }

    #[test]
    fn test_values_parse() {
        let q: Query = serde_json::from_str(
            r#"{"id":"12345678-1234-1234-1234-123456789abc","day":"2024-01-10"}"#,
        )
        .unwrap();
        assert!(q.id.is_some());
        assert_eq!(q.day, NaiveDate::from_ymd_opt(2024, 1, 10));
    }

    #[test]
    fn test_bad_date_is_rejected() {
        assert!(serde_json::from_str::<Query>(r#"{"day":"10/01/2024"}"#).is_err());
    }
}
