//! Duration display strings.

const MS_PER_HOUR: u64 = 3_600_000;
const MS_PER_MINUTE: u64 = 60_000;
const MS_PER_SECOND: u64 = 1_000;

/// Format milliseconds as `HH:MM:SS`, or `HH:MM:SS.CC` with centiseconds.
///
/// Hours are not wrapped at 24; a 100 hour duration renders as `100:00:00`.
pub fn format_time(ms: u64, with_subsecond: bool) -> String {
    let h = ms / MS_PER_HOUR;
    let m = (ms % MS_PER_HOUR) / MS_PER_MINUTE;
    let s = (ms % MS_PER_MINUTE) / MS_PER_SECOND;
    if with_subsecond {
        let cs = (ms % MS_PER_SECOND) / 10;
        format!("{:02}:{:02}:{:02}.{:02}", h, m, s, cs)
    } else {
        format!("{:02}:{:02}:{:02}", h, m, s)
    }
}

/// Format milliseconds as "HH:MM:SS"
pub fn format_hms(ms: u64) -> String {
    format_time(ms, false)
}

/// Format milliseconds as "HH:MM:SS.cs" (centiseconds)
pub fn format_hms_cs(ms: u64) -> String {
    format_time(ms, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(61_000), "00:01:01");
        assert_eq!(format_hms(3_661_000), "01:01:01");
    }

    #[test]
    fn test_format_hms_cs() {
        assert_eq!(format_hms_cs(0), "00:00:00.00");
        assert_eq!(format_hms_cs(12_340), "00:00:12.34");
        assert_eq!(format_time(3_661_050, true), "01:01:01.05");
    }

    #[test]
    fn test_subsecond_truncates() {
        // 999 ms is 99 centiseconds, never rounded up into the next second
        assert_eq!(format_time(59_999, true), "00:00:59.99");
        assert_eq!(format_time(59_999, false), "00:00:59");
    }

    #[test]
    fn test_hours_not_wrapped() {
        assert_eq!(format_time(100 * MS_PER_HOUR, false), "100:00:00");
        assert_eq!(format_time(24 * MS_PER_HOUR + 5_000, false), "24:00:05");
    }
}
