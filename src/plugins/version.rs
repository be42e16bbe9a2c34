//! Version - reports the running build

use std::sync::Arc;

use crate::application::errors::{CommandError, PluginError};
use crate::application::runtime::Session;
use crate::domain::entities::{Command, InboundMessage};
use crate::domain::traits::{Author, Plugin};
use crate::infrastructure::config::Config;
use super::{builtin_author, BUILTIN_VERSION};

pub struct Version {
    commands: Vec<Command>,
}

impl Version {
    pub fn new() -> Result<Self, PluginError> {
        let command = Command::new(
            "Reports the version of myself I'm currently running.",
            "^!version$",
            |session: Arc<Session>, message: InboundMessage| async move {
                let text = format!(
                    "I'm currently running {} {}, built at {}.",
                    session.name(),
                    session.friendly_version(),
                    session.built_at().format("%Y-%m-%d %H:%M:%S UTC")
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
    Ok(Arc::new(Version::new()?))
}

impl Plugin for Version {
    fn name(&self) -> &str {
        "Version"
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

    use crate::plugins::testing::session_with;

    #[tokio::test]
    async fn test_version_reply() {
        let plugin = Version::new().unwrap();
        let (session, transport) = session_with(vec![]);

        plugin.commands()[0]
            .handler()
            .execute(Arc::clone(&session), InboundMessage::new("U1", "C1", "!version"))
            .await
            .unwrap();

        let texts = transport.texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].starts_with("<@U1>: I'm currently running Pingu development build, built at "));
    }
}
