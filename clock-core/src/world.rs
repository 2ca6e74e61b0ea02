//! World clock records and their offset arithmetic.
//!
//! Cities carry a fixed UTC offset in minutes; there is no timezone
//! database here. Offsets are shown as a signed hours:minutes difference
//! from local time.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::wallclock::WallTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct City {
    pub name: &'static str,
    pub timezone: &'static str,
    pub offset_minutes: i32,
    pub country_code: &'static str,
}

const fn city(name: &'static str, timezone: &'static str, offset_minutes: i32, country_code: &'static str) -> City {
    City {
        name,
        timezone,
        offset_minutes,
        country_code,
    }
}

pub const CITIES: [City; 15] = [
    city("New York", "America/New_York", -4 * 60, "US"),
    city("London", "Europe/London", 60, "GB"),
    city("Tokyo", "Asia/Tokyo", 9 * 60, "JP"),
    city("Sydney", "Australia/Sydney", 10 * 60, "AU"),
    city("Los Angeles", "America/Los_Angeles", -7 * 60, "US"),
    city("Paris", "Europe/Paris", 2 * 60, "FR"),
    city("Dubai", "Asia/Dubai", 4 * 60, "AE"),
    city("Singapore", "Asia/Singapore", 8 * 60, "SG"),
    city("Berlin", "Europe/Berlin", 2 * 60, "DE"),
    city("Mumbai", "Asia/Kolkata", 5 * 60 + 30, "IN"),
    city("Toronto", "America/Toronto", -4 * 60, "CA"),
    city("Mexico City", "America/Mexico_City", -5 * 60, "MX"),
    city("Cairo", "Africa/Cairo", 3 * 60, "EG"),
    city("Moscow", "Europe/Moscow", 3 * 60, "RU"),
    city("Bangkok", "Asia/Bangkok", 7 * 60, "TH"),
];

/// Exact, case-insensitive catalog lookup.
pub fn find_city(name: &str) -> Option<&'static City> {
    let name = name.trim();
    CITIES.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

/// Catalog entries whose name contains `query`, case-insensitive.
pub fn search_cities(query: &str) -> impl Iterator<Item = &'static City> {
    let query = query.trim().to_lowercase();
    CITIES
        .iter()
        .filter(move |c| c.name.to_lowercase().contains(&query))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DayRelation {
    Yesterday,
    Today,
    Tomorrow,
}

impl fmt::Display for DayRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            DayRelation::Yesterday => "Yesterday",
            DayRelation::Today => "Today",
            DayRelation::Tomorrow => "Tomorrow",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldClock {
    pub id: u64,
    pub city: String,
    pub timezone: String,
    pub offset_minutes: i32,
}

impl WorldClock {
    pub fn from_city(city: &City) -> Self {
        Self {
            id: 0,
            city: city.name.to_string(),
            timezone: city.timezone.to_string(),
            offset_minutes: city.offset_minutes,
        }
    }

    pub fn wall_time(&self, now_ms: u64) -> WallTime {
        WallTime::at_offset(now_ms, self.offset_minutes)
    }

    pub fn offset_label(&self, local_offset_minutes: i32) -> String {
        offset_label(self.offset_minutes.saturating_sub(local_offset_minutes))
    }

    pub fn day_relation(&self, now_ms: u64, local_offset_minutes: i32) -> DayRelation {
        let here = WallTime::at_offset(now_ms, local_offset_minutes).day_number;
        let there = self.wall_time(now_ms).day_number;
        match there.cmp(&here) {
            std::cmp::Ordering::Less => DayRelation::Yesterday,
            std::cmp::Ordering::Equal => DayRelation::Today,
            std::cmp::Ordering::Greater => DayRelation::Tomorrow,
        }
    }
}

/// `Local time`, `+5h 30m`, `-4h`, `-0h 30m`.
pub fn offset_label(diff_minutes: i32) -> String {
    if diff_minutes == 0 {
        return "Local time".to_string();
    }
    let sign = if diff_minutes > 0 { '+' } else { '-' };
    let abs = diff_minutes.unsigned_abs();
    let (h, m) = (abs / 60, abs % 60);
    if m > 0 {
        format!("{sign}{h}h {m}m")
    } else {
        format!("{sign}{h}h")
    }
}
