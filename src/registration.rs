use crate::club::Club;
use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Timestamp layout used in the backing file (local time, second precision)
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A submission that passed validation but has not been stored yet.
///
/// Only the store turns this into a [`Registration`], which is where the
/// registration timestamp comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegistration {
    pub name: String,
    pub email: String,
    pub club: Club,
}

/// One stored registration
///
/// Serialized field names match the persisted file layout:
/// `name`, `email`, `club`, `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub club: Club,

    #[serde(rename = "date", with = "date_format")]
    pub registered_at: NaiveDateTime,
}

impl Registration {
    /// Stamp a validated submission with the given time
    pub fn stamp(new: NewRegistration, registered_at: NaiveDateTime) -> Self {
        Registration {
            name: new.name,
            email: new.email,
            club: new.club,
            registered_at,
        }
    }

    /// Stamp a validated submission with the current local time
    pub fn stamp_now(new: NewRegistration) -> Self {
        let now = Local::now().naive_local();
        // Whole seconds only, so the in-memory value equals what a reload reads back
        Self::stamp(new, now.with_nanosecond(0).unwrap_or(now))
    }

    /// Case-insensitive substring match over name, email and club id.
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.email.to_lowercase().contains(needle)
            || self.club.id().contains(needle)
    }

    pub fn date_string(&self) -> String {
        self.registered_at.format(DATE_FORMAT).to_string()
    }
}

mod date_format {
    use super::DATE_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}
