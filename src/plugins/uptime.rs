//! Uptime - time since start and since the current connection

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::errors::{CommandError, PluginError};
use crate::application::format::format_duration_short;
use crate::application::runtime::Session;
use crate::domain::entities::{Command, InboundMessage};
use crate::domain::traits::{Author, Plugin};
use crate::infrastructure::config::Config;
use super::{builtin_author, BUILTIN_VERSION};

pub struct Uptime {
    commands: Vec<Command>,
}

fn since(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    format_duration_short((now - then).to_std().unwrap_or_default())
}

/// Uptime sentence for the given instants
pub fn uptime_message(started_at: DateTime<Utc>, connected_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match connected_at {
        Some(connected_at) => format!(
            "My current uptime is {}, and I've been connected for {}.",
            since(started_at, now),
            since(connected_at, now)
        ),
        None => format!(
            "My current uptime is {}, and I haven't connected yet.",
            since(started_at, now)
        ),
    }
}

impl Uptime {
    pub fn new() -> Result<Self, PluginError> {
        let command = Command::new(
            "Reports my current uptime.",
            "^!uptime$",
            |session: Arc<Session>, message: InboundMessage| async move {
                let text = uptime_message(session.started_at(), session.connected_at(), Utc::now());
                session.reply(&message, &text).await;
                Ok::<(), CommandError>(())
            },
        )?;

        Ok(Self {
            commands: vec![command],
        })
    }
}

pub fn factory(_config: &Config) -> Result<Arc<dyn Plugin>, PluginError> {
    Ok(Arc::new(Uptime::new()?))
}

impl Plugin for Uptime {
    fn name(&self) -> &str {
        "Uptime"
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_uptime_message() {
        let started = Utc.with_ymd_and_hms(2018, 12, 1, 5, 0, 0).unwrap();
        let connected = Utc.with_ymd_and_hms(2018, 12, 1, 6, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2018, 12, 1, 6, 5, 30).unwrap();

        assert_eq!(
            uptime_message(started, Some(connected), now),
            "My current uptime is 1h 5m, and I've been connected for 5m 30s."
        );
        assert_eq!(
            uptime_message(started, None, now),
            "My current uptime is 1h 5m, and I haven't connected yet."
        );
    }
}
