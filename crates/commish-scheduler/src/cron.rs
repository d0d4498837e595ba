//! Lightweight cron expression parser.
//! Supports: "MIN HOUR DOM MON DOW" (5-field, no seconds)
//! Field syntax: *, */N, N, N-M, comma lists. DOW: 0 or 7 = Sunday.
//!
//! All of the league's cadences are day-of-week based ("every Tuesday at
//! 9am", "every day but Tuesday"), so unlike a minimal minute/hour parser the
//! day fields are honored.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};

/// Parsed cron expression as sets of matching values.
#[derive(Debug, Clone)]
struct CronFields {
    minutes: Vec<u32>,
    hours: Vec<u32>,
    days_of_month: Vec<u32>,
    months: Vec<u32>,
    days_of_week: Vec<u32>,
    dom_restricted: bool,
    dow_restricted: bool,
}

impl CronFields {
    fn parse(expression: &str) -> Option<Self> {
        let parts: Vec<&str> = expression.split_whitespace().collect();
        if parts.len() != 5 {
            tracing::warn!(
                "Invalid cron expression: '{}' (need 5 fields: MIN HOUR DOM MON DOW)",
                expression
            );
            return None;
        }

        let minutes = parse_field(parts[0], 0, 59)?;
        let hours = parse_field(parts[1], 0, 23)?;
        let days_of_month = parse_field(parts[2], 1, 31)?;
        let months = parse_field(parts[3], 1, 12)?;
        // 7 is an alias for Sunday; normalize into 0..=6.
        let days_of_week: Vec<u32> = parse_field(parts[4], 0, 7)?
            .into_iter()
            .map(|d| d % 7)
            .collect();

        Some(Self {
            minutes,
            hours,
            days_of_month,
            months,
            days_of_week,
            dom_restricted: parts[2] != "*",
            dow_restricted: parts[4] != "*",
        })
    }

    /// Vixie-cron day rule: when both day fields are restricted, a day
    /// matches if EITHER field matches; otherwise both must match (and the
    /// wildcard one always does).
    fn day_matches(&self, candidate: DateTime<Utc>) -> bool {
        let dom_ok = self.days_of_month.contains(&candidate.day());
        let dow_ok = self
            .days_of_week
            .contains(&candidate.weekday().num_days_from_sunday());
        if self.dom_restricted && self.dow_restricted {
            dom_ok || dow_ok
        } else {
            dom_ok && dow_ok
        }
    }

    fn matches(&self, candidate: DateTime<Utc>) -> bool {
        self.months.contains(&candidate.month())
            && self.day_matches(candidate)
            && self.hours.contains(&candidate.hour())
            && self.minutes.contains(&candidate.minute())
    }
}

/// Compute the next fire time strictly after `after`, or None if the
/// expression is invalid or never matches within the next year.
pub fn next_run_after(expression: &str, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let fields = CronFields::parse(expression)?;

    let mut candidate = (after + Duration::minutes(1))
        .with_second(0)
        .and_then(|c| c.with_nanosecond(0))
        .unwrap_or(after);

    // Scan forward up to a year, skipping whole days that can't match.
    let horizon = after + Duration::days(366);
    while candidate <= horizon {
        if !(fields.months.contains(&candidate.month()) && fields.day_matches(candidate)) {
            candidate = (candidate + Duration::days(1))
                .with_hour(0)
                .and_then(|c| c.with_minute(0))
                .unwrap_or(candidate + Duration::days(1));
            continue;
        }
        if fields.matches(candidate) {
            return Some(candidate);
        }
        candidate += Duration::minutes(1);
    }

    None
}

/// Parse a cron field into a sorted list of matching values.
fn parse_field(field: &str, min: u32, max: u32) -> Option<Vec<u32>> {
    if field == "*" {
        return Some((min..=max).collect());
    }

    // */N: every N
    if let Some(step) = field.strip_prefix("*/") {
        let n: u32 = step.parse().ok()?;
        if n == 0 {
            return None;
        }
        return Some((min..=max).step_by(n as usize).collect());
    }

    // Comma-separated values and ranges: "0,15,30", "1-5", "0,2-4,6"
    let mut values = Vec::new();
    for piece in field.split(',') {
        let piece = piece.trim();
        if let Some((lo, hi)) = piece.split_once('-') {
            let lo: u32 = lo.parse().ok()?;
            let hi: u32 = hi.parse().ok()?;
            if lo > hi || lo < min || hi > max {
                return None;
            }
            values.extend(lo..=hi);
        } else {
            let n: u32 = piece.parse().ok()?;
            if n < min || n > max {
                return None;
            }
            values.push(n);
        }
    }
    values.sort_unstable();
    values.dedup();
    Some(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Weekday};

    #[test]
    fn every_hour() {
        let after = Utc.with_ymd_and_hms(2026, 2, 22, 10, 30, 0).unwrap();
        let next = next_run_after("0 * * * *", after).unwrap();
        assert_eq!(next.hour(), 11);
        assert_eq!(next.minute(), 0);
    }

    #[test]
    fn specific_time_same_day() {
        let after = Utc.with_ymd_and_hms(2026, 2, 22, 7, 0, 0).unwrap();
        let next = next_run_after("0 8 * * *", after).unwrap();
        assert_eq!(next.hour(), 8);
        assert_eq!(next.minute(), 0);
        assert_eq!(next.day(), 22);
    }

    #[test]
    fn tuesday_nine_am() {
        // 2026-02-22 is a Sunday; next Tuesday is the 24th.
        let after = Utc.with_ymd_and_hms(2026, 2, 22, 12, 0, 0).unwrap();
        let next = next_run_after("0 9 * * 2", after).unwrap();
        assert_eq!(next.weekday(), Weekday::Tue);
        assert_eq!(next.day(), 24);
        assert_eq!(next.hour(), 9);
    }

    #[test]
    fn every_day_but_tuesday() {
        // Fired on Monday the 23rd at 9am; the next match skips Tuesday and
        // lands on Wednesday the 25th.
        let after = Utc.with_ymd_and_hms(2026, 2, 23, 9, 0, 0).unwrap();
        let next = next_run_after("0 9 * * 0,1,3,4,5,6", after).unwrap();
        assert_eq!(next.weekday(), Weekday::Wed);
        assert_eq!(next.day(), 25);
    }

    #[test]
    fn twice_daily_hours_list() {
        let after = Utc.with_ymd_and_hms(2026, 2, 22, 10, 0, 0).unwrap();
        let next = next_run_after("0 10,22 * * *", after).unwrap();
        assert_eq!(next.hour(), 22);
        assert_eq!(next.day(), 22);
        let after_next = next_run_after("0 10,22 * * *", next).unwrap();
        assert_eq!(after_next.hour(), 10);
        assert_eq!(after_next.day(), 23);
    }

    #[test]
    fn every_15_minutes() {
        let after = Utc.with_ymd_and_hms(2026, 2, 22, 10, 2, 0).unwrap();
        let next = next_run_after("*/15 * * * *", after).unwrap();
        assert_eq!(next.minute(), 15);
    }

    #[test]
    fn sunday_alias_seven() {
        let after = Utc.with_ymd_and_hms(2026, 2, 23, 0, 0, 0).unwrap();
        let with_zero = next_run_after("0 9 * * 0", after).unwrap();
        let with_seven = next_run_after("0 9 * * 7", after).unwrap();
        assert_eq!(with_zero, with_seven);
        assert_eq!(with_zero.weekday(), Weekday::Sun);
    }

    #[test]
    fn day_of_month() {
        let after = Utc.with_ymd_and_hms(2026, 2, 22, 0, 0, 0).unwrap();
        let next = next_run_after("30 6 1 * *", after).unwrap();
        assert_eq!(next.day(), 1);
        assert_eq!(next.month(), 3);
        assert_eq!(next.hour(), 6);
        assert_eq!(next.minute(), 30);
    }

    #[test]
    fn weekday_range() {
        // Saturday the 28th; "1-5" lands on Monday March 2nd.
        let after = Utc.with_ymd_and_hms(2026, 2, 28, 12, 0, 0).unwrap();
        let next = next_run_after("0 9 * * 1-5", after).unwrap();
        assert_eq!(next.weekday(), Weekday::Mon);
        assert_eq!(next.month(), 3);
        assert_eq!(next.day(), 2);
    }

    #[test]
    fn invalid_expressions() {
        let after = Utc::now();
        assert!(next_run_after("bad", after).is_none());
        assert!(next_run_after("0 8 * *", after).is_none());
        assert!(next_run_after("61 * * * *", after).is_none());
        assert!(next_run_after("0 9 * * 8", after).is_none());
    }
}
