//! Help - lists every loaded plugin and its commands

use std::sync::Arc;

use crate::application::errors::{CommandError, PluginError};
use crate::application::runtime::Session;
use crate::domain::entities::{Command, InboundMessage};
use crate::domain::traits::{Author, Plugin};
use crate::infrastructure::config::Config;
use super::{builtin_author, BUILTIN_VERSION};

pub struct Help {
    commands: Vec<Command>,
}

/// Trigger pattern without its `^`/`$` anchors
fn display_trigger(pattern: &str) -> &str {
    let pattern = pattern.strip_prefix('^').unwrap_or(pattern);
    pattern.strip_suffix('$').unwrap_or(pattern)
}

/// Code block listing each plugin with its commands
pub fn help_output(plugins: &[Arc<dyn Plugin>]) -> String {
    let sections: Vec<String> = plugins
        .iter()
        .map(|plugin| {
            let mut section = format!("{} ({}):\n", plugin.name(), plugin.version());
            for command in plugin.commands() {
                section.push_str(&format!(
                    "{}: {}\n",
                    display_trigger(command.pattern()),
                    command.description()
                ));
            }
            section
        })
        .collect();

    format!(
        "Here's a list of all available commands:\n\n```\n{}```\n",
        sections.join("\n")
    )
}

impl Help {
    pub fn new() -> Result<Self, PluginError> {
        let command = Command::new(
            "Lists all available commands.",
            "^!help$",
            |session: Arc<Session>, message: InboundMessage| async move {
                let text = help_output(session.plugins());
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
    Ok(Arc::new(Help::new()?))
}

impl Plugin for Help {
    fn name(&self) -> &str {
        "Help"
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
    use crate::plugins::ping::Ping;
    use crate::plugins::testing::session_with;

    #[test]
    fn test_display_trigger() {
        assert_eq!(display_trigger("^!help$"), "!help");
        assert_eq!(display_trigger("^!leaderboard(?: (\\d{4}))?$"), "!leaderboard(?: (\\d{4}))?");
        assert_eq!(display_trigger("(?:^|\\D)!(\\w+-\\d+)"), "(?:^|\\D)!(\\w+-\\d+)");
    }

    #[test]
    fn test_help_output() {
        let plugins: Vec<Arc<dyn Plugin>> = vec![
            Arc::new(Help::new().unwrap()),
            Arc::new(Ping::new().unwrap()),
        ];

        let expected = format!(
            "Here's a list of all available commands:\n\n```\n\
             Help ({v}):\n!help: Lists all available commands.\n\n\
             Ping ({v}):\n!ping: Reports my current latency towards Slack.\n```\n",
            v = BUILTIN_VERSION
        );
        assert_eq!(help_output(&plugins), expected);
    }

    #[tokio::test]
    async fn test_help_replies_with_loaded_plugins() {
        let help: Arc<dyn Plugin> = Arc::new(Help::new().unwrap());
        let (session, transport) = session_with(vec![Arc::clone(&help)]);

        help.commands()[0]
            .handler()
            .execute(Arc::clone(&session), InboundMessage::new("U1", "C1", "!help"))
            .await
            .unwrap();

        let texts = transport.texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].starts_with("<@U1>: Here's a list of all available commands:"));
        assert!(texts[0].contains("!help: Lists all available commands."));
    }
}
