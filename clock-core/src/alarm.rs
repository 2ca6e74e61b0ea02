//! Alarm records as the storage layer persists them.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::wallclock::WallTime;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AlarmTimeError {
    #[error("expected HH:MM, got {0:?}")]
    Malformed(String),

    #[error("{0:?} is not a valid time of day")]
    OutOfRange(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown weekday {0:?}")]
pub struct WeekdayError(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Weekday of a day counted from 1970-01-01, which was a Thursday.
    pub fn from_days_since_epoch(days: i64) -> Self {
        Self::ALL[(days + 3).rem_euclid(7) as usize]
    }

    /// Zero-based position with Monday first.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn tag(self) -> &'static str {
        match self {
            Weekday::Mon => "mon",
            Weekday::Tue => "tue",
            Weekday::Wed => "wed",
            Weekday::Thu => "thu",
            Weekday::Fri => "fri",
            Weekday::Sat => "sat",
            Weekday::Sun => "sun",
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
            Weekday::Sat => "Sat",
            Weekday::Sun => "Sun",
        }
    }

    fn full_name_lower(self) -> &'static str {
        match self {
            Weekday::Mon => "monday",
            Weekday::Tue => "tuesday",
            Weekday::Wed => "wednesday",
            Weekday::Thu => "thursday",
            Weekday::Fri => "friday",
            Weekday::Sat => "saturday",
            Weekday::Sun => "sunday",
        }
    }
}

impl FromStr for Weekday {
    type Err = WeekdayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|day| lower.len() >= 3 && day.full_name_lower().starts_with(&lower))
            .ok_or_else(|| WeekdayError(s.to_string()))
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A 24-hour local time of day with minute resolution, written `HH:MM`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AlarmTime {
    hour: u8,
    minute: u8,
}

impl AlarmTime {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    /// Clamp out-of-range parts to 23:59 instead of rejecting them.
    pub(crate) fn saturating(hour: u8, minute: u8) -> Self {
        Self {
            hour: hour.min(23),
            minute: minute.min(59),
        }
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }
}

impl FromStr for AlarmTime {
    type Err = AlarmTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 5
            && bytes[2] == b':'
            && [0, 1, 3, 4].iter().all(|&i| bytes[i].is_ascii_digit());
        if !well_formed {
            return Err(AlarmTimeError::Malformed(s.to_string()));
        }
        let digit = |i: usize| bytes[i] - b'0';
        let hour = digit(0) * 10 + digit(1);
        let minute = digit(3) * 10 + digit(4);
        Self::new(hour, minute).ok_or_else(|| AlarmTimeError::OutOfRange(s.to_string()))
    }
}

impl TryFrom<String> for AlarmTime {
    type Error = AlarmTimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AlarmTime> for String {
    fn from(value: AlarmTime) -> Self {
        value.to_string()
    }
}

impl fmt::Display for AlarmTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// A persisted alarm. An empty `days` set makes it a one-time alarm that
/// disables itself after firing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alarm {
    pub id: u64,
    pub time: AlarmTime,
    #[serde(default)]
    pub days: BTreeSet<Weekday>,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    #[serde(default)]
    pub vibrate: bool,
    #[serde(default)]
    pub crescendo_mode: bool,
    #[serde(default)]
    pub challenge_to_dismiss: bool,
}

impl Alarm {
    /// An enabled one-time alarm. The id is assigned when the alarm is
    /// added to a collection.
    pub fn new(time: AlarmTime) -> Self {
        Self {
            id: 0,
            time,
            days: BTreeSet::new(),
            enabled: true,
            label: None,
            sound: None,
            vibrate: false,
            crescendo_mode: false,
            challenge_to_dismiss: false,
        }
    }

    pub fn with_days(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        self.days = days.into_iter().collect();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn is_one_time(&self) -> bool {
        self.days.is_empty()
    }

    /// Whether this alarm should ring at the given local wall time.
    pub fn matches(&self, now: &WallTime) -> bool {
        self.enabled
            && self.time == now.minute_key()
            && (self.is_one_time() || self.days.contains(&now.weekday))
    }

    /// Notification body: the label, or the time when there is none.
    pub fn notification_body(&self) -> String {
        match self.label.as_deref() {
            Some(label) if !label.trim().is_empty() => label.to_string(),
            _ => format!("It's {}", self.time),
        }
    }

    pub fn days_summary(&self) -> String {
        days_summary(&self.days)
    }
}

/// Human summary of a repeat-day set.
pub fn days_summary(days: &BTreeSet<Weekday>) -> String {
    use Weekday::*;
    let weekdays: BTreeSet<Weekday> = [Mon, Tue, Wed, Thu, Fri].into_iter().collect();
    let weekend: BTreeSet<Weekday> = [Sat, Sun].into_iter().collect();
    match days.len() {
        0 => "Once".to_string(),
        7 => "Every day".to_string(),
        _ if *days == weekdays => "Weekdays".to_string(),
        _ if *days == weekend => "Weekends".to_string(),
        _ => days
            .iter()
            .map(|day| day.short_name())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_alarm_time() {
        let t: AlarmTime = "07:05".parse().unwrap();
        assert_eq!((t.hour(), t.minute()), (7, 5));
        assert_eq!(t.to_string(), "07:05");
        assert_eq!("23:59".parse::<AlarmTime>().unwrap().to_string(), "23:59");
    }

    #[test]
    fn test_reject_bad_alarm_time() {
        assert!(matches!("7:05".parse::<AlarmTime>(), Err(AlarmTimeError::Malformed(_))));
        assert!(matches!("07-05".parse::<AlarmTime>(), Err(AlarmTimeError::Malformed(_))));
        assert!(matches!("0a:05".parse::<AlarmTime>(), Err(AlarmTimeError::Malformed(_))));
        assert!(matches!("24:00".parse::<AlarmTime>(), Err(AlarmTimeError::OutOfRange(_))));
        assert!(matches!("12:60".parse::<AlarmTime>(), Err(AlarmTimeError::OutOfRange(_))));
    }

    #[test]
    fn test_weekday_parse() {
        assert_eq!("mon".parse::<Weekday>().unwrap(), Weekday::Mon);
        assert_eq!("Thursday".parse::<Weekday>().unwrap(), Weekday::Thu);
        assert_eq!("SAT".parse::<Weekday>().unwrap(), Weekday::Sat);
        assert!("t".parse::<Weekday>().is_err());
        assert!("funday".parse::<Weekday>().is_err());
    }

    #[test]
    fn test_weekday_from_epoch_days() {
        assert_eq!(Weekday::from_days_since_epoch(0), Weekday::Thu);
        assert_eq!(Weekday::from_days_since_epoch(4), Weekday::Mon);
        assert_eq!(Weekday::from_days_since_epoch(-1), Weekday::Wed);
    }

    #[test]
    fn test_alarm_json_shape() {
        let alarm = Alarm::new("06:30".parse().unwrap())
            .with_days([Weekday::Sat, Weekday::Mon])
            .with_label("gym");
        let json = serde_json::to_value(&alarm).unwrap();
        assert_eq!(json["time"], "06:30");
        assert_eq!(json["days"], serde_json::json!(["mon", "sat"]));
        assert_eq!(json["crescendoMode"], false);

        let back: Alarm = serde_json::from_value(json).unwrap();
        assert_eq!(back, alarm);
    }

    #[test]
    fn test_alarm_json_rejects_bad_time() {
        let raw = r#"{"id":1,"time":"25:00","days":[],"enabled":true}"#;
        assert!(serde_json::from_str::<Alarm>(raw).is_err());
    }

    #[test]
    fn test_alarm_json_minimal_record() {
        let raw = r#"{"id":4,"time":"08:00","enabled":false}"#;
        let alarm: Alarm = serde_json::from_str(raw).unwrap();
        assert!(alarm.is_one_time());
        assert!(!alarm.vibrate);
        assert_eq!(alarm.label, None);
    }

    #[test]
    fn test_notification_body() {
        let alarm = Alarm::new("07:00".parse().unwrap());
        assert_eq!(alarm.notification_body(), "It's 07:00");
        assert_eq!(alarm.with_label("Wake up").notification_body(), "Wake up");
    }

    #[test]
    fn test_days_summary() {
        use Weekday::*;
        let alarm = Alarm::new("07:00".parse().unwrap());
        assert_eq!(alarm.days_summary(), "Once");
        assert_eq!(alarm.clone().with_days(Weekday::ALL).days_summary(), "Every day");
        assert_eq!(alarm.clone().with_days([Mon, Tue, Wed, Thu, Fri]).days_summary(), "Weekdays");
        assert_eq!(alarm.clone().with_days([Sun, Sat]).days_summary(), "Weekends");
        assert_eq!(alarm.with_days([Fri, Mon]).days_summary(), "Mon, Fri");
    }
}
