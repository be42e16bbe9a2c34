//! Announcement texts for leaderboard changes

use chrono::{DateTime, TimeZone};

use crate::application::format::{join_with_and, pluralize};
use super::leaderboard::{sort_by_date, Leaderboard, Star};
use super::stars::{available_stars, difference};

fn stars_label(count: u32) -> String {
    pluralize(count as usize, "star", "stars")
}

fn percentage(stars: u32, available: u32) -> f64 {
    if available == 0 {
        return 0.0;
    }
    f64::from(stars) / f64::from(available) * 100.0
}

/// `Day 1 Part 1 (2018)_ and _Day 1 Part 2 (2018)`, oldest first
pub fn change_message(stars: &[Star]) -> String {
    let mut stars = stars.to_vec();
    sort_by_date(&mut stars);

    let labels: Vec<String> = stars
        .iter()
        .map(|s| format!("Day {} Part {} ({})", s.day, s.part, s.year))
        .collect();

    join_with_and(&labels, "_, _", "_ and _")
}

/// One line per member, in rank order
pub fn leaderboard_message<Tz: TimeZone>(board: &Leaderboard, now: &DateTime<Tz>) -> String {
    let available = available_stars(now, board.year);

    board
        .members
        .iter()
        .map(|m| {
            format!(
                "*{}.* _{}_ with *{} {}* ({:.2}%) collected.\n",
                m.position,
                m.name,
                m.total_stars,
                stars_label(m.total_stars),
                percentage(m.total_stars, available)
            )
        })
        .collect()
}

/// Stars earned between two refreshes of the same board
pub fn changes<Tz: TimeZone>(before: &Leaderboard, after: &Leaderboard, now: &DateTime<Tz>) -> Vec<String> {
    let available = available_stars(now, after.year);
    let mut messages = Vec::new();

    for ours in &after.members {
        let Some(theirs) = before.member(ours.id) else {
            continue;
        };
        if ours.total_stars == theirs.total_stars {
            continue;
        }

        let earned = difference(&ours.stars, &theirs.stars);
        if earned.is_empty() {
            continue;
        }

        let count = earned.len() as u32;
        let mut message = format!(
            "_{}_ earned *{} {}* by completing _{}_",
            ours.name,
            count,
            stars_label(count),
            change_message(&earned)
        );

        if theirs.position > ours.position {
            message.push_str(&format!(", moving up to *position {}*", ours.position));
        } else if theirs.position < ours.position {
            message.push_str(&format!(", moving down to *position {}*", ours.position));
        } else {
            message.push_str(&format!(", staying at *position {}*", ours.position));
        }

        message.push_str(&format!(
            " with *{} {}* ({:.2}%)!",
            ours.total_stars,
            stars_label(ours.total_stars),
            percentage(ours.total_stars, available)
        ));
        messages.push(message);
    }

    messages
}

/// Members present after but not before
pub fn joined<Tz: TimeZone>(before: &Leaderboard, after: &Leaderboard, now: &DateTime<Tz>) -> Vec<String> {
    let available = available_stars(now, after.year);

    after
        .members
        .iter()
        .filter(|m| before.member(m.id).is_none())
        .map(|m| {
            format!(
                "Noot! Noot! _{}_ has joined our ranks, starting at position *{}* with *{} {}* ({:.2}%) collected.",
                m.name,
                m.position,
                m.total_stars,
                stars_label(m.total_stars),
                percentage(m.total_stars, available)
            )
        })
        .collect()
}

/// Members present before but not after
pub fn left(before: &Leaderboard, after: &Leaderboard) -> Vec<String> {
    before
        .members
        .iter()
        .filter(|m| after.member(m.id).is_none())
        .map(|m| {
            format!(
                "Noot! Noot! It seems like _{}_ has left our ranks. The leaderboards have been recalculated.",
                m.name
            )
        })
        .collect()
}

pub fn new_day(year: i32, day: u32) -> String {
    format!(
        "Noot! Noot! <https://adventofcode.com/{year}/day/{day}|Day {day} of {year} is now available!> \
         Please keep spoilers to a minimum and instead use a thread on this very message to discuss \
         today's challenge. Happy coding!"
    )
}
