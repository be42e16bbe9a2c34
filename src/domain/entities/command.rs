use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use regex_lite::Regex;

use crate::application::errors::{CommandError, PluginError};
use crate::application::runtime::Session;
use super::InboundMessage;

/// Behaviour bound to a command trigger
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn execute(&self, session: Arc<Session>, message: InboundMessage) -> Result<(), CommandError>;
}

#[async_trait]
impl<F, Fut> CommandHandler for F
where
    F: Fn(Arc<Session>, InboundMessage) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), CommandError>> + Send + 'static,
{
    async fn execute(&self, session: Arc<Session>, message: InboundMessage) -> Result<(), CommandError> {
        (self)(session, message).await
    }
}

/// A plugin command: a compiled trigger plus the handler it fires.
///
/// The trigger is compiled once when the command is built and never changes
/// afterwards; commands are cheap to clone because the handler is shared.
#[derive(Clone)]
pub struct Command {
    description: String,
    trigger: Regex,
    handler: Arc<dyn CommandHandler>,
}

impl Command {
    pub fn new<H>(description: impl Into<String>, pattern: &str, handler: H) -> Result<Self, PluginError>
    where
        H: CommandHandler + 'static,
    {
        let trigger = Regex::new(pattern).map_err(|e| PluginError::Trigger {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self::with_trigger(description, trigger, handler))
    }

    /// Build a command around an already compiled trigger
    pub fn with_trigger<H>(description: impl Into<String>, trigger: Regex, handler: H) -> Self
    where
        H: CommandHandler + 'static,
    {
        Self {
            description: description.into(),
            trigger,
            handler: Arc::new(handler),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn trigger(&self) -> &Regex {
        &self.trigger
    }

    pub fn pattern(&self) -> &str {
        self.trigger.as_str()
    }

    pub fn matches(&self, text: &str) -> bool {
        self.trigger.is_match(text)
    }

    pub fn handler(&self) -> Arc<dyn CommandHandler> {
        Arc::clone(&self.handler)
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("description", &self.description)
            .field("trigger", &self.trigger.as_str())
            .finish()
    }
}
