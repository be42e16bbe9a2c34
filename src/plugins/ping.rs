//! Ping - reports the latest latency sample

use std::sync::Arc;

use crate::application::errors::{CommandError, PluginError};
use crate::application::format::format_duration_short;
use crate::application::runtime::Session;
use crate::domain::entities::{Command, InboundMessage};
use crate::domain::traits::{Author, Plugin};
use crate::infrastructure::config::Config;
use super::{builtin_author, BUILTIN_VERSION};

pub struct Ping {
    commands: Vec<Command>,
}

impl Ping {
    pub fn new() -> Result<Self, PluginError> {
        let command = Command::new(
            "Reports my current latency towards Slack.",
            "^!ping$",
            |session: Arc<Session>, message: InboundMessage| async move {
                let text = format!(
                    "My current latency towards Slack is {}.",
                    format_duration_short(session.latency())
                );
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
    Ok(Arc::new(Ping::new()?))
}

impl Plugin for Ping {
    fn name(&self) -> &str {
        "Ping"
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
