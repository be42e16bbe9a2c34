//! Command router - Runs every command whose trigger matches inbound text

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::application::execution::run_isolated;
use crate::application::runtime::Session;
use crate::domain::entities::InboundMessage;
use crate::infrastructure::plugins::PluginRegistry;

/// Routes inbound messages to plugin commands.
///
/// Every matching command runs, in registry then declaration order, one after
/// the other. Each invocation is isolated in its own task and bounded by the
/// handler timeout, so a failing or hanging handler only affects itself.
pub struct CommandRouter {
    registry: Arc<PluginRegistry>,
    handler_timeout: Duration,
}

impl CommandRouter {
    pub fn new(registry: Arc<PluginRegistry>, handler_timeout: Duration) -> Self {
        Self {
            registry,
            handler_timeout,
        }
    }

    /// Dispatch one message. Returns how many commands were triggered.
    pub async fn dispatch(&self, session: &Arc<Session>, message: &InboundMessage) -> usize {
        let mut triggered = 0;

        for plugin in self.registry.plugins() {
            for command in plugin.commands() {
                if !command.matches(&message.text) {
                    continue;
                }

                info!(plugin = plugin.name(), trigger = command.pattern(), "Command triggered");
                triggered += 1;

                let handler = command.handler();
                let session = Arc::clone(session);
                let message = message.clone();

                let outcome = run_isolated(Some(self.handler_timeout), async move {
                    handler.execute(session, message).await
                })
                .await;

                if let Err(e) = outcome {
                    warn!(
                        plugin = plugin.name(),
                        trigger = command.pattern(),
                        error = %e,
                        "Command failed"
                    );
                }
            }
        }

        triggered
    }
}
