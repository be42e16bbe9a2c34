//! Schedule parsing and next-fire computation.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, TimeZone};

use crate::application::errors::ScheduleError;
use crate::domain::entities::Schedule;

/// A validated schedule, ready to drive a timer
#[derive(Debug, Clone)]
pub enum Cadence {
    Interval(Duration),
    Calendar(Box<cron::Schedule>),
}

impl Cadence {
    /// Validate a declared schedule.
    ///
    /// Calendar expressions use the classic five fields
    /// (`minute hour day-of-month month day-of-week`, day-of-week 0-6 from
    /// Sunday), the `@hourly`/`@daily`/`@weekly`/`@monthly`/`@yearly`
    /// shorthands, or `@every <duration>`.
    pub fn parse(schedule: &Schedule) -> Result<Self, ScheduleError> {
        match schedule {
            Schedule::Every(interval) if interval.is_zero() => Err(ScheduleError::ZeroInterval),
            Schedule::Every(interval) => Ok(Cadence::Interval(*interval)),
            Schedule::Calendar(expr) => parse_calendar(expr),
        }
    }

    /// Next calendar firing strictly after `after`; `None` for intervals or
    /// expressions with no future match
    pub fn next_after<Tz: TimeZone>(&self, after: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        match self {
            Cadence::Interval(_) => None,
            Cadence::Calendar(schedule) => schedule.after(after).next(),
        }
    }
}

fn parse_calendar(expr: &str) -> Result<Cadence, ScheduleError> {
    let expr = expr.trim();
    let invalid = |reason: String| ScheduleError::Calendar {
        expr: expr.to_string(),
        reason,
    };

    if let Some(rest) = expr.strip_prefix("@every") {
        let interval = parse_interval(rest.trim())?;
        return Ok(Cadence::Interval(interval));
    }

    let normalized = if expr.starts_with('@') {
        expr.to_string()
    } else {
        let fields: Vec<&str> = expr.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(invalid(format!("expected 5 fields, found {}", fields.len())));
        }
        let day_of_week = translate_day_of_week(fields[4]).map_err(invalid)?;
        // The cron crate wants `sec min hour dom month dow year`
        format!(
            "0 {} {} {} {} {} *",
            fields[0], fields[1], fields[2], fields[3], day_of_week
        )
    };

    cron::Schedule::from_str(&normalized)
        .map(|schedule| Cadence::Calendar(Box::new(schedule)))
        .map_err(|e| invalid(e.to_string()))
}

/// Shift numeric day-of-week values from 0-6 (Sunday first) to the cron
/// crate's 1-7. Names, wildcards and step sizes pass through untouched.
fn translate_day_of_week(field: &str) -> Result<String, String> {
    let shift = |value: &str| -> Result<String, String> {
        if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
            return Ok(value.to_string());
        }
        match value.parse::<u8>() {
            Ok(day) if day <= 6 => Ok((day + 1).to_string()),
            _ => Err(format!("day-of-week {} out of range 0-6", value)),
        }
    };

    field
        .split(',')
        .map(|item| {
            let (range, step) = match item.split_once('/') {
                Some((range, step)) => (range, Some(step)),
                None => (item, None),
            };
            let range = range
                .split('-')
                .map(shift)
                .collect::<Result<Vec<_>, _>>()?
                .join("-");
            Ok(match step {
                Some(step) => format!("{}/{}", range, step),
                None => range,
            })
        })
        .collect::<Result<Vec<_>, String>>()
        .map(|items| items.join(","))
}

/// Parse `90s`, `15m`, `1h30m`, `2d` or `500ms` into a duration.
pub fn parse_interval(input: &str) -> Result<Duration, ScheduleError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ScheduleError::Interval(input.to_string()));
    }

    let mut total = Duration::ZERO;
    let mut rest = input;

    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits == 0 {
            return Err(ScheduleError::Interval(input.to_string()));
        }
        let value: u64 = rest[..digits]
            .parse()
            .map_err(|_| ScheduleError::Interval(input.to_string()))?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let unit = match &rest[..unit_len] {
            "ms" => Some(Duration::from_millis(value)),
            "s" => Some(Duration::from_secs(value)),
            "m" => value.checked_mul(60).map(Duration::from_secs),
            "h" => value.checked_mul(3_600).map(Duration::from_secs),
            "d" => value.checked_mul(86_400).map(Duration::from_secs),
            _ => return Err(ScheduleError::Interval(input.to_string())),
        };
        rest = &rest[unit_len..];
        total = unit
            .and_then(|unit| total.checked_add(unit))
            .ok_or_else(|| ScheduleError::Interval(input.to_string()))?;
    }

    if total.is_zero() {
        return Err(ScheduleError::ZeroInterval);
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike, Utc, Weekday};

    fn calendar(expr: &str) -> Cadence {
        Cadence::parse(&Schedule::Calendar(expr.to_string())).unwrap()
    }

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_interval("15m").unwrap(), Duration::from_secs(900));
        assert_eq!(parse_interval("1h30m").unwrap(), Duration::from_secs(5_400));
        assert_eq!(parse_interval("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_interval("2d").unwrap(), Duration::from_secs(172_800));

        assert!(parse_interval("").is_err());
        assert!(parse_interval("15").is_err());
        assert!(parse_interval("m15").is_err());
        assert!(parse_interval("5w").is_err());
        assert!(matches!(parse_interval("0s"), Err(ScheduleError::ZeroInterval)));
    }

    #[test]
    fn test_huge_interval_is_rejected() {
        assert!(matches!(parse_interval("999999999999999d"), Err(ScheduleError::Interval(_))));
        assert!(matches!(
            parse_interval("18446744073709551615s1s"),
            Err(ScheduleError::Interval(_))
        ));
        assert!(matches!(
            parse_interval("99999999999999999999s"),
            Err(ScheduleError::Interval(_))
        ));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let err = Cadence::parse(&Schedule::Every(Duration::ZERO)).unwrap_err();
        assert!(matches!(err, ScheduleError::ZeroInterval));
    }

    #[test]
    fn test_every_expression_becomes_interval() {
        match calendar("@every 15m") {
            Cadence::Interval(d) => assert_eq!(d, Duration::from_secs(900)),
            other => panic!("expected interval, got {other:?}"),
        }
    }

    #[test]
    fn test_advent_of_code_unlock_schedule() {
        let cadence = calendar("0 5 1-25 DEC *");

        let before = Utc.with_ymd_and_hms(2018, 11, 30, 12, 0, 0).unwrap();
        let next = cadence.next_after(&before).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2018, 12, 1, 5, 0, 0).unwrap());

        let last_day = Utc.with_ymd_and_hms(2018, 12, 25, 5, 0, 0).unwrap();
        let next = cadence.next_after(&last_day).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2019, 12, 1, 5, 0, 0).unwrap());
    }

    #[test]
    fn test_day_of_month_list() {
        let cadence = calendar("30 12 1,15 * *");
        let after = Utc.with_ymd_and_hms(2020, 3, 2, 0, 0, 0).unwrap();

        let next = cadence.next_after(&after).unwrap();
        assert_eq!((next.day(), next.hour(), next.minute()), (15, 12, 30));
    }

    #[test]
    fn test_day_of_week_starts_on_sunday() {
        // 2020-03-02 is a Monday
        let after = Utc.with_ymd_and_hms(2020, 3, 2, 0, 0, 0).unwrap();

        let sunday = calendar("0 9 * * 0").next_after(&after).unwrap();
        assert_eq!(sunday.weekday(), Weekday::Sun);

        let weekdays = calendar("0 9 * * 1-5").next_after(&after).unwrap();
        assert_eq!(weekdays.weekday(), Weekday::Mon);
        assert_eq!(weekdays.hour(), 9);
    }

    #[test]
    fn test_shorthand_expressions() {
        let after = Utc.with_ymd_and_hms(2020, 3, 2, 10, 30, 0).unwrap();
        let next = calendar("@hourly").next_after(&after).unwrap();
        assert_eq!((next.hour(), next.minute()), (11, 0));
    }

    #[test]
    fn test_malformed_expressions_are_rejected() {
        for expr in ["", "* * *", "61 * * * *", "0 5 1-25 FOO *", "0 9 * * 9", "@fortnightly"] {
            let result = Cadence::parse(&Schedule::Calendar(expr.to_string()));
            assert!(result.is_err(), "expected '{}' to be rejected", expr);
        }
    }

    #[test]
    fn test_translate_day_of_week() {
        assert_eq!(translate_day_of_week("*").unwrap(), "*");
        assert_eq!(translate_day_of_week("0").unwrap(), "1");
        assert_eq!(translate_day_of_week("1-5").unwrap(), "2-6");
        assert_eq!(translate_day_of_week("0,6").unwrap(), "1,7");
        assert_eq!(translate_day_of_week("*/2").unwrap(), "*/2");
        assert_eq!(translate_day_of_week("MON-FRI").unwrap(), "MON-FRI");
        assert!(translate_day_of_week("7").is_err());
    }
}
