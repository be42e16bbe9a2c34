//! Star arithmetic for Advent of Code events

use chrono::{DateTime, Datelike, TimeZone, Utc};

use super::leaderboard::Star;

/// The first Advent of Code event
pub const FIRST_YEAR: i32 = 2015;

/// Puzzles unlock at 05:00 UTC, one per day from December 1st to 25th
const UNLOCK_HOUR_UTC: u32 = 5;
const LAST_DAY: u32 = 25;

fn unlock_time(year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, UNLOCK_HOUR_UTC, 0, 0).single()
}

/// Every event year that has started by `now`
pub fn valid_years<Tz: TimeZone>(now: &DateTime<Tz>) -> Vec<i32> {
    let mut last = now.year();
    let first_unlock = unlock_time(last, 12, 1);

    if first_unlock.map_or(true, |start| now.with_timezone(&Utc) < start) {
        last -= 1;
    }

    (FIRST_YEAR..=last).collect()
}

/// Stars that could have been collected by `now`, either in one year or
/// across every valid year
pub fn available_stars<Tz: TimeZone>(now: &DateTime<Tz>, only_year: Option<i32>) -> u32 {
    let years = match only_year {
        Some(year) => vec![year],
        None => valid_years(now),
    };

    let now_utc = now.with_timezone(&Utc);
    let mut stars = 0;

    for year in years {
        if year < now.year() {
            stars += LAST_DAY * 2;
            continue;
        }

        if now.month() < 12 {
            continue;
        }

        let day = now.day().min(LAST_DAY);
        stars += day * 2;

        let locked = unlock_time(now.year(), now.month(), day).map_or(false, |at| at > now_utc);
        if now.day() <= LAST_DAY && locked {
            stars -= 2;
        }
    }

    stars
}

/// Stars in `a` that are missing from `b`
pub fn difference(a: &[Star], b: &[Star]) -> Vec<Star> {
    a.iter()
        .filter(|s1| {
            !b.iter()
                .any(|s2| s1.year == s2.year && s1.day == s2.day && s1.part == s2.part)
        })
        .cloned()
        .collect()
}
