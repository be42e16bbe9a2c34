//! Leaderboard model, ranking and merging

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::api::{ApiResponse, MemberResponse};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Star {
    pub completed_at: DateTime<Utc>,
    pub day: u32,
    pub part: u32,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: i64,
    pub global_score: i64,
    pub local_score: i64,
    pub last_star_at: DateTime<Utc>,
    pub name: String,
    pub position: usize,
    pub stars: Vec<Star>,
    pub total_stars: u32,
}

impl Member {
    fn from_response(year: i32, response: &MemberResponse) -> Self {
        let id = response.id.as_i64();
        let mut stars: Vec<Star> = response
            .completion_day_level
            .iter()
            .flat_map(|(day, parts)| {
                parts.iter().filter_map(move |(part, star)| {
                    let ts = star.get_star_ts.as_ref()?.as_i64();
                    Some(Star {
                        completed_at: timestamp(ts),
                        day: *day,
                        part: *part,
                        year,
                    })
                })
            })
            .collect();
        sort_by_date(&mut stars);

        Self {
            id,
            global_score: response.global_score,
            local_score: response.local_score,
            last_star_at: timestamp(response.last_star_ts.as_ref().map_or(0, |ts| ts.as_i64())),
            name: response
                .name
                .clone()
                .unwrap_or_else(|| format!("(anonymous user #{})", id)),
            position: 0,
            stars,
            total_stars: response.stars,
        }
    }
}

fn timestamp(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 0).unwrap_or_default()
}

/// Order stars by year, day, then part
pub fn sort_by_date(stars: &mut [Star]) {
    stars.sort_by_key(|s| (s.year, s.day, s.part));
}

/// One year's leaderboard, or the global one when `year` is `None`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Leaderboard {
    pub year: Option<i32>,
    pub members: Vec<Member>,
}

impl Leaderboard {
    pub fn new(year: Option<i32>) -> Self {
        Self {
            year,
            members: Vec::new(),
        }
    }

    pub fn from_response(year: i32, response: &ApiResponse) -> Self {
        let mut board = Self {
            year: Some(year),
            members: response
                .members
                .values()
                .map(|m| Member::from_response(year, m))
                .collect(),
        };
        board.sort();
        board
    }

    /// Combine per-year boards into the global one
    pub fn merge(boards: &[Leaderboard]) -> Self {
        let mut merged: BTreeMap<i64, Member> = BTreeMap::new();

        for member in boards.iter().flat_map(|b| &b.members) {
            let entry = merged.entry(member.id).or_insert_with(|| Member {
                id: member.id,
                global_score: 0,
                local_score: 0,
                last_star_at: DateTime::<Utc>::default(),
                name: member.name.clone(),
                position: 0,
                stars: Vec::new(),
                total_stars: 0,
            });

            entry.global_score += member.global_score;
            entry.local_score += member.local_score;
            entry.stars.extend(member.stars.iter().cloned());
            entry.total_stars += member.total_stars;
            if entry.last_star_at < member.last_star_at {
                entry.last_star_at = member.last_star_at;
            }
        }

        let mut board = Self {
            year: None,
            members: merged.into_values().collect(),
        };
        board.sort();
        board
    }

    /// Rank by stars (most first), then earliest last star, then name.
    /// Members with equal stars share a position.
    pub fn sort(&mut self) {
        self.members.sort_by(|a, b| {
            b.total_stars
                .cmp(&a.total_stars)
                .then_with(|| a.last_star_at.cmp(&b.last_star_at))
                .then_with(|| a.name.cmp(&b.name))
        });

        let mut position = 1;
        let mut skip = 0;
        for i in 0..self.members.len() {
            if i != 0 && self.members[i].total_stars < self.members[i - 1].total_stars {
                position += skip;
                skip = 0;
            }
            self.members[i].position = position;
            skip += 1;
        }
    }

    pub fn member(&self, id: i64) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub fn star(year: i32, day: u32, part: u32) -> Star {
        Star {
            completed_at: Utc.with_ymd_and_hms(year, 12, day, 6, 0, 0).unwrap(),
            day,
            part,
            year,
        }
    }

    pub fn member(id: i64, name: &str, stars: Vec<Star>, last_hour: u32) -> Member {
        Member {
            id,
            global_score: 0,
            local_score: 0,
            last_star_at: Utc.with_ymd_and_hms(2018, 12, 1, last_hour, 0, 0).unwrap(),
            name: name.to_string(),
            position: 0,
            total_stars: stars.len() as u32,
            stars,
        }
    }

    fn positions(board: &Leaderboard) -> Vec<(String, usize)> {
        board
            .members
            .iter()
            .map(|m| (m.name.clone(), m.position))
            .collect()
    }

    #[test]
    fn test_sort_ranks_with_shared_positions() {
        let mut board = Leaderboard {
            year: Some(2018),
            members: vec![
                member(1, "Carol", vec![star(2018, 1, 1)], 8),
                member(2, "Alice", vec![star(2018, 1, 1), star(2018, 1, 2)], 9),
                member(3, "Bob", vec![star(2018, 1, 1), star(2018, 1, 2)], 7),
                member(4, "Dave", vec![star(2018, 1, 1)], 8),
                member(5, "Eve", vec![], 0),
            ],
        };

        board.sort();

        assert_eq!(
            positions(&board),
            vec![
                ("Bob".to_string(), 1),
                ("Alice".to_string(), 1),
                ("Carol".to_string(), 3),
                ("Dave".to_string(), 3),
                ("Eve".to_string(), 5),
            ]
        );
    }

    #[test]
    fn test_merge_sums_across_years() {
        let y2017 = Leaderboard {
            year: Some(2017),
            members: vec![member(1, "Alice", vec![star(2017, 1, 1)], 6)],
        };
        let y2018 = Leaderboard {
            year: Some(2018),
            members: vec![
                member(1, "Alice", vec![star(2018, 1, 1), star(2018, 1, 2)], 9),
                member(2, "Bob", vec![star(2018, 1, 1)], 7),
            ],
        };

        let global = Leaderboard::merge(&[y2017, y2018]);

        assert_eq!(global.year, None);
        let alice = global.member(1).unwrap();
        assert_eq!(alice.total_stars, 3);
        assert_eq!(alice.stars.len(), 3);
        assert_eq!(alice.position, 1);
        assert_eq!(alice.last_star_at, Utc.with_ymd_and_hms(2018, 12, 1, 9, 0, 0).unwrap());
        assert_eq!(global.member(2).unwrap().position, 2);
    }

    #[test]
    fn test_from_response() {
        let json = r#"{"members": {
            "7": {"id": "7", "name": "Alice", "stars": 2, "last_star_ts": 1543651200,
                  "completion_day_level": {"2": {"1": {"get_star_ts": 1543651200}}, "1": {"1": {"get_star_ts": 1543640000}}}},
            "8": {"id": 8, "name": null, "stars": 0, "last_star_ts": 0, "completion_day_level": {}}
        }}"#;
        let response: ApiResponse = serde_json::from_str(json).unwrap();

        let board = Leaderboard::from_response(2018, &response);

        assert_eq!(board.members[0].name, "Alice");
        assert_eq!(board.members[0].position, 1);
        let days: Vec<u32> = board.members[0].stars.iter().map(|s| s.day).collect();
        assert_eq!(days, vec![1, 2]);
        assert_eq!(board.members[1].name, "(anonymous user #8)");
    }
}
