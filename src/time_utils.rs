// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time parsing and formatting.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, SubsecRound, TimeDelta, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a `YYYY-MM-DD` calendar day.
pub fn parse_calendar_day(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Parse a date as sent by clients: either a bare `YYYY-MM-DD` (midnight UTC)
/// or a full RFC3339 timestamp. The result is truncated to whole seconds so
/// stored values sort lexically in time order.
pub fn parse_date_input(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Some(day) = parse_calendar_day(raw) {
        return Some(day.and_time(NaiveTime::MIN).and_utc());
    }

    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).trunc_subsecs(0))
}

/// Half-open `[start, end)` UTC range covering a whole calendar day.
pub fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(NaiveTime::MIN).and_utc();
    (start, start + TimeDelta::days(1))
}

/// Minutes after midnight for a time-of-day label.
///
/// Accepts `HH:MM` (24h) and `H:MM AM`/`H:MM PM`. Returns `None` for anything
/// else, in which case callers fall back to comparing the raw text.
pub fn parse_time_of_day(raw: &str) -> Option<u32> {
    let raw = raw.trim().to_ascii_uppercase();

    let (clock, meridiem) = if let Some(rest) = raw.strip_suffix("AM") {
        (rest.trim_end(), Some(false))
    } else if let Some(rest) = raw.strip_suffix("PM") {
        (rest.trim_end(), Some(true))
    } else {
        (raw.as_str(), None)
    };

    let (hours, minutes) = clock.split_once(':')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if minutes > 59 {
        return None;
    }

    let hours = match meridiem {
        None if hours <= 23 => hours,
        Some(pm) if (1..=12).contains(&hours) => (hours % 12) + if pm { 12 } else { 0 },
        _ => return None,
    };

    Some(hours * 60 + minutes)
}

/// Serde adapter for record timestamps (`createdAt` and friends).
///
/// Always writes six fractional digits, so the stored strings order the same
/// way as the instants they encode; chrono's default drops trailing zero
/// groups, which breaks that within a second. Reading accepts any RFC3339.
pub mod fixed_precision {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(deserializer)
    }

    pub mod option {
        use chrono::{DateTime, SecondsFormat, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => {
                    serializer.serialize_some(&value.to_rfc3339_opts(SecondsFormat::Micros, true))
                }
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<DateTime<Utc>>::deserialize(deserializer)
        }
    }
}
