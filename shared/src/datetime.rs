//! Date and timestamp encodings used on the wire between the services.
//!
//! Timestamps travel as `YYYY-MM-DD_HH-MM-SS` and dates as `YYYY-MM-DD`.
//! All timestamps are naive UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

pub fn format_datetime(datetime: &NaiveDateTime) -> String {
    datetime.format(DATETIME_FORMAT).to_string()
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_datetime(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
}

pub fn parse_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
}

/// Accepts either a bare date (read as midnight) or a full wire timestamp.
pub fn parse_date_or_datetime(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    if value.len() == 10 {
        parse_date(value).map(start_of_day)
    } else {
        parse_datetime(value)
    }
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Last whole second of the day, 23:59:59.
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    start_of_day(date) + end_of_day_offset()
}

pub fn end_of_day_offset() -> TimeDelta {
    TimeDelta::hours(23) + TimeDelta::minutes(59) + TimeDelta::seconds(59)
}

/// Convert an epoch timestamp in milliseconds to naive UTC, truncated to the second.
pub fn millis_to_datetime(millis: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(millis.div_euclid(1000), 0).map(|dt| dt.naive_utc())
}

/// Serde adapter for `NaiveDateTime` fields in the wire format.
pub mod wire_format {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(datetime: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_datetime(datetime))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_datetime(&raw).map_err(serde::de::Error::custom)
    }

    /// Same encoding for optional fields.
    pub mod option {
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(datetime: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match datetime {
                Some(datetime) => super::serialize(datetime, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw: Option<String> = Option::deserialize(deserializer)?;
            raw.map(|value| super::super::parse_datetime(&value).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
