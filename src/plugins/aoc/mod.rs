//! Advent of Code - tracks a private leaderboard across every event year

pub mod api;
pub mod leaderboard;
pub mod messages;
pub mod stars;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use regex_lite::Regex;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::application::errors::{CommandError, PluginError};
use crate::application::execution::fan_out;
use crate::application::runtime::Session;
use crate::domain::entities::{Command, InboundMessage, Task};
use crate::domain::traits::{Author, Plugin};
use crate::infrastructure::config::Config;
use super::{builtin_author, BUILTIN_VERSION};
use api::{AocClient, ApiResponse};
use leaderboard::Leaderboard;

const LEADERBOARD_PATTERN: &str = r"^!leaderboard(?: (\d{4}))?$";
const REFRESH_INTERVAL: Duration = Duration::from_secs(15 * 60);
const NEW_DAY_SCHEDULE: &str = "0 5 1-25 DEC *";

fn default_timeout() -> u64 {
    10
}

fn default_base_url() -> String {
    "https://adventofcode.com".to_string()
}

/// The `aoc` config section
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AocConfig {
    /// Value of the `session` cookie
    pub session: String,
    /// Owner id of the private leaderboard
    pub owner: u64,
    /// Channel announcements go to, and the only one commands answer in
    pub channel: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Default)]
struct State {
    leaderboards: Vec<Leaderboard>,
    global: Leaderboard,
}

impl State {
    /// Start tracking every year not seen before
    fn track_years(&mut self, years: &[i32]) {
        for &year in years {
            if !self.leaderboards.iter().any(|b| b.year == Some(year)) {
                self.leaderboards.push(Leaderboard::new(Some(year)));
            }
        }
    }

    fn years(&self) -> Vec<i32> {
        self.leaderboards.iter().filter_map(|b| b.year).collect()
    }

    /// Replace every board that was fetched and rebuild the global one.
    /// Returns the announcements for what changed.
    fn apply<Tz: TimeZone>(
        &mut self,
        results: Vec<(i32, Result<ApiResponse, CommandError>)>,
        now: &DateTime<Tz>,
    ) -> Vec<String> {
        let mut announcements = Vec::new();

        for (year, result) in results {
            let response = match result {
                Ok(response) => response,
                Err(e) => {
                    error!(plugin = "Advent of Code", year, error = %e, "Failed to refresh leaderboard");
                    continue;
                }
            };

            let Some(board) = self.leaderboards.iter_mut().find(|b| b.year == Some(year)) else {
                continue;
            };

            let fresh = Leaderboard::from_response(year, &response);
            if !board.members.is_empty() {
                announcements.extend(messages::changes(board, &fresh, now));
            }
            *board = fresh;
        }

        let global = Leaderboard::merge(&self.leaderboards);
        if !self.global.members.is_empty() {
            announcements.extend(messages::joined(&self.global, &global, now));
            announcements.extend(messages::left(&self.global, &global));
        }
        self.global = global;

        announcements
    }
}

struct Inner {
    channel: String,
    client: AocClient,
    fan_out_limit: usize,
    state: Mutex<State>,
}

impl Inner {
    async fn refresh(&self, session: &Session) {
        let now = Utc::now();

        let announcements = {
            let mut state = self.state.lock().await;
            state.track_years(&stars::valid_years(&now));

            let years = state.years();
            let client = &self.client;
            let responses = fan_out(self.fan_out_limit, years.clone(), move |year| client.leaderboard(year)).await;

            state.apply(years.into_iter().zip(responses).collect(), &now)
        };

        info!(
            plugin = "Advent of Code",
            announcements = announcements.len(),
            "Leaderboards refreshed"
        );

        for text in announcements {
            session.say(&text, &self.channel).await;
        }
    }

    fn restricted(&self, message: &InboundMessage) -> Option<String> {
        (message.channel != self.channel).then(|| {
            format!(
                "Noot! Noot! That command is only available in <#{}>!",
                self.channel
            )
        })
    }

    async fn post_leaderboard(&self, session: &Session, message: &InboundMessage, year: Option<i32>) {
        if let Some(text) = self.restricted(message) {
            session.reply(message, &text).await;
            return;
        }

        let board = {
            let state = self.state.lock().await;
            match year {
                None => Ok(messages::leaderboard_message(&state.global, &Utc::now())),
                Some(year) => state
                    .leaderboards
                    .iter()
                    .find(|b| b.year == Some(year))
                    .map(|board| messages::leaderboard_message(board, &Utc::now()))
                    .ok_or_else(|| format!("Noot! Noot! {} does not have a leaderboard!", year)),
            }
        };

        match board {
            Ok(text) if text.is_empty() => {}
            Ok(text) => session.say(&text, &message.channel).await,
            Err(text) => session.reply(message, &text).await,
        }
    }
}

pub struct AdventOfCode {
    commands: Vec<Command>,
    tasks: Vec<Task>,
}

impl AdventOfCode {
    pub fn new(config: &AocConfig, fan_out_limit: usize) -> Result<Self, PluginError> {
        let client = AocClient::new(config).map_err(|e| PluginError::Construction {
            name: "aoc".to_string(),
            reason: e.to_string(),
        })?;

        let inner = Arc::new(Inner {
            channel: config.channel.clone(),
            client,
            fan_out_limit,
            state: Mutex::new(State::default()),
        });

        let trigger = Regex::new(LEADERBOARD_PATTERN).map_err(|e| PluginError::Trigger {
            pattern: LEADERBOARD_PATTERN.to_string(),
            reason: e.to_string(),
        })?;

        let leaderboard = {
            let inner = Arc::clone(&inner);
            let year_trigger = trigger.clone();
            Command::with_trigger(
                "Prints either the global leaderboard, or the leaderboard for a specific year.",
                trigger,
                move |session: Arc<Session>, message: InboundMessage| {
                    let inner = Arc::clone(&inner);
                    let year = year_trigger
                        .captures(&message.text)
                        .and_then(|caps| caps.get(1))
                        .and_then(|m| m.as_str().parse::<i32>().ok());
                    async move {
                        inner.post_leaderboard(&session, &message, year).await;
                        Ok::<(), CommandError>(())
                    }
                },
            )
        };

        let refresh = {
            let inner = Arc::clone(&inner);
            Command::new(
                "Forces a refresh of all leaderboards.",
                "^!refresh$",
                move |session: Arc<Session>, message: InboundMessage| {
                    let inner = Arc::clone(&inner);
                    async move {
                        match inner.restricted(&message) {
                            Some(text) => session.reply(&message, &text).await,
                            None => inner.refresh(&session).await,
                        }
                        Ok::<(), CommandError>(())
                    }
                },
            )?
        };

        let refresh_task = {
            let inner = Arc::clone(&inner);
            Task::every(REFRESH_INTERVAL, move |session: Arc<Session>| {
                let inner = Arc::clone(&inner);
                async move {
                    inner.refresh(&session).await;
                    Ok::<(), CommandError>(())
                }
            })
        };

        let new_day_task = {
            let channel = config.channel.clone();
            Task::calendar(NEW_DAY_SCHEDULE, move |session: Arc<Session>| {
                let channel = channel.clone();
                async move {
                    let today = Local::now();
                    session.say(&messages::new_day(today.year(), today.day()), &channel).await;
                    Ok::<(), CommandError>(())
                }
            })
        };

        Ok(Self {
            commands: vec![leaderboard, refresh],
            tasks: vec![refresh_task, new_day_task],
        })
    }
}

pub fn factory(config: &Config) -> Result<Arc<dyn Plugin>, PluginError> {
    let section: AocConfig = config
        .section("aoc")
        .map_err(|e| PluginError::Construction {
            name: "aoc".to_string(),
            reason: e.to_string(),
        })?
        .ok_or_else(|| PluginError::Construction {
            name: "aoc".to_string(),
            reason: "missing 'aoc' config section".to_string(),
        })?;

    Ok(Arc::new(AdventOfCode::new(&section, config.runtime.fan_out_limit)?))
}

impl Plugin for AdventOfCode {
    fn name(&self) -> &str {
        "Advent of Code"
    }

    fn author(&self) -> Author {
        builtin_author()
    }

    fn version(&self) -> &str {
        BUILTIN_VERSION
    }

    fn commands(&self) -> &[Command] {
        &self.commands
    }

    fn tasks(&self) -> &[Task] {
        &self.tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Schedule;
    use crate::plugins::testing::session_with;

    const CONFIG: &str = "aoc:\n  session: abc\n  owner: 42\n  channel: CAOC\n";

    fn response(members: &[(i64, &str, &[(u32, u32)])]) -> ApiResponse {
        let members: serde_json::Map<String, serde_json::Value> = members
            .iter()
            .map(|(id, name, stars)| {
                let mut days = serde_json::Map::new();
                for (day, part) in stars.iter() {
                    let entry = days
                        .entry(day.to_string())
                        .or_insert_with(|| serde_json::json!({}));
                    entry[part.to_string()] =
                        serde_json::json!({ "get_star_ts": 1_543_640_000 + i64::from(*day) * 60 + i64::from(*part) });
                }
                let member = serde_json::json!({
                    "id": id,
                    "name": name,
                    "stars": stars.len(),
                    "last_star_ts": 1_543_640_000 + id,
                    "completion_day_level": days,
                });
                (id.to_string(), member)
            })
            .collect();

        serde_json::from_value(serde_json::json!({ "members": members })).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2018, 12, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_first_refresh_is_silent() {
        let mut state = State::default();
        state.track_years(&[2017, 2018]);
        state.track_years(&[2018]);
        assert_eq!(state.years(), vec![2017, 2018]);

        let announcements = state.apply(
            vec![
                (2017, Ok(response(&[(1, "Alice", &[(1, 1)])]))),
                (2018, Ok(response(&[(1, "Alice", &[(1, 1)]), (2, "Bob", &[])]))),
            ],
            &now(),
        );

        assert!(announcements.is_empty());
        assert_eq!(state.global.member(1).unwrap().total_stars, 2);
        assert_eq!(state.global.members.len(), 2);
    }

    #[test]
    fn test_refresh_announces_changes_and_membership() {
        let mut state = State::default();
        state.track_years(&[2018]);
        state.apply(
            vec![(2018, Ok(response(&[(1, "Alice", &[(1, 1)]), (2, "Bob", &[])])))],
            &now(),
        );

        let announcements = state.apply(
            vec![(2018, Ok(response(&[(1, "Alice", &[(1, 1), (1, 2)]), (3, "Carol", &[])])))],
            &now(),
        );

        assert_eq!(
            announcements,
            vec![
                "_Alice_ earned *1 star* by completing _Day 1 Part 2 (2018)_, \
                 staying at *position 1* with *2 stars* (100.00%)!"
                    .to_string(),
                "Noot! Noot! _Carol_ has joined our ranks, starting at position *2* with *0 stars* (0.00%) collected."
                    .to_string(),
                "Noot! Noot! It seems like _Bob_ has left our ranks. The leaderboards have been recalculated."
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_failed_fetch_keeps_previous_board() {
        let mut state = State::default();
        state.track_years(&[2018]);
        state.apply(vec![(2018, Ok(response(&[(1, "Alice", &[(1, 1)])])))], &now());

        let announcements = state.apply(
            vec![(2018, Err(CommandError::Upstream("login page".to_string())))],
            &now(),
        );

        assert!(announcements.is_empty());
        assert_eq!(state.leaderboards[0].members.len(), 1);
        assert_eq!(state.global.members.len(), 1);
    }

    #[test]
    fn test_factory_requires_section() {
        assert!(factory(&Config::default()).is_err());

        let plugin = factory(&Config::parse(CONFIG).unwrap()).unwrap();
        assert_eq!(plugin.name(), "Advent of Code");
        assert_eq!(plugin.commands().len(), 2);
        assert_eq!(plugin.tasks()[0].schedule(), &Schedule::Every(REFRESH_INTERVAL));
        assert_eq!(
            plugin.tasks()[1].schedule(),
            &Schedule::Calendar(NEW_DAY_SCHEDULE.to_string())
        );
    }

    #[tokio::test]
    async fn test_commands_are_channel_restricted() {
        let plugin = factory(&Config::parse(CONFIG).unwrap()).unwrap();
        let (session, transport) = session_with(vec![]);

        for (command, text) in plugin.commands().iter().zip(["!leaderboard", "!refresh"]) {
            assert!(command.matches(text));
            command
                .handler()
                .execute(Arc::clone(&session), InboundMessage::new("U1", "CGENERAL", text))
                .await
                .unwrap();
        }

        assert_eq!(
            transport.texts(),
            vec![
                "<@U1>: Noot! Noot! That command is only available in <#CAOC>!",
                "<@U1>: Noot! Noot! That command is only available in <#CAOC>!",
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_year() {
        let plugin = factory(&Config::parse(CONFIG).unwrap()).unwrap();
        let (session, transport) = session_with(vec![]);
        let command = &plugin.commands()[0];
        assert!(command.matches("!leaderboard 2014"));
        assert!(!command.matches("!leaderboard 14"));

        command
            .handler()
            .execute(Arc::clone(&session), InboundMessage::new("U1", "CAOC", "!leaderboard 2014"))
            .await
            .unwrap();

        assert_eq!(
            transport.texts(),
            vec!["<@U1>: Noot! Noot! 2014 does not have a leaderboard!"]
        );
    }
}
