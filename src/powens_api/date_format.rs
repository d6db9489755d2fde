//! Powens sends datetimes without timezone, either space or `T` separated.

use chrono::{DateTime, NaiveDateTime};
use serde::{de::Error as _, Deserialize, Deserializer};

pub fn parse_datetime(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|datetime| datetime.naive_local()))
}

pub mod optional_datetime {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        let value: Option<String> = Option::deserialize(deserializer)?;
        value
            .map(|value| {
                parse_datetime(&value)
                    .map_err(|err| D::Error::custom(format!("Invalid datetime {value:?}: {err}")))
            })
            .transpose()
    }
}
