//! Event loop - Consumes transport events in order and drives dispatch and scheduling

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::application::errors::BotError;
use crate::application::messaging::CommandRouter;
use crate::application::runtime::Session;
use crate::application::scheduling::TaskScheduler;
use crate::domain::entities::TransportEvent;

const EVENT_BUFFER: usize = 256;

/// Connection state as seen by the event loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Tunables for handler execution
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    /// Upper bound for one command handler invocation
    pub handler_timeout: Duration,
    /// Upper bound for one task execution during the catch-up pass
    pub catch_up_timeout: Duration,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            handler_timeout: Duration::from_secs(30),
            catch_up_timeout: Duration::from_secs(60),
        }
    }
}

/// The bot runtime.
///
/// Events are handled strictly one at a time in arrival order. Command
/// handlers and catch-up tasks run isolated from the loop; periodic task
/// firings run on their own tasks.
pub struct Runtime {
    session: Arc<Session>,
    router: CommandRouter,
    scheduler: TaskScheduler,
    state: ConnectionState,
}

impl Runtime {
    /// Build a runtime around a session. Fails if any task schedule is malformed.
    pub fn new(session: Arc<Session>, options: RuntimeOptions) -> Result<Self, BotError> {
        let registry = Arc::clone(session.registry());
        let scheduler =
            TaskScheduler::new(&registry)?.with_catch_up_timeout(options.catch_up_timeout);
        let router = CommandRouter::new(registry, options.handler_timeout);

        debug!(
            plugins = session.plugins().len(),
            tasks = scheduler.len(),
            "Runtime initialized"
        );

        Ok(Self {
            session,
            router,
            scheduler,
            state: ConnectionState::Disconnected,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Apply one transport event.
    ///
    /// Only an authentication failure is returned as an error; everything
    /// else is logged and absorbed.
    pub async fn handle(&mut self, event: TransportEvent) -> Result<(), BotError> {
        match event {
            TransportEvent::Connected => {
                self.session.mark_connected(Utc::now());
                info!(name = self.session.name(), "Connection established");

                if self.state == ConnectionState::Connected {
                    debug!("Connected while already connected, restarting timers");
                }
                self.scheduler.stop();
                self.scheduler.catch_up(&self.session).await;
                self.scheduler.start(&self.session);
                self.state = ConnectionState::Connected;
            }
            TransportEvent::Disconnected => {
                warn!("Connection lost");
                self.scheduler.stop();
                self.state = ConnectionState::Disconnected;
            }
            TransportEvent::Latency(latency) => {
                self.session.record_latency(latency);
            }
            TransportEvent::InvalidAuth => {
                error!("Authentication failed");
                self.scheduler.stop();
                self.state = ConnectionState::Disconnected;
                return Err(BotError::Auth("the platform rejected the credentials".to_string()));
            }
            TransportEvent::Message(message) => {
                let triggered = self.router.dispatch(&self.session, &message).await;
                if triggered > 0 {
                    debug!(channel = %message.channel, triggered, "Message dispatched");
                }
            }
        }

        Ok(())
    }

    /// Consume events until the channel closes or authentication fails
    pub async fn process(&mut self, mut events: mpsc::Receiver<TransportEvent>) -> Result<(), BotError> {
        while let Some(event) = events.recv().await {
            self.handle(event).await?;
        }
        self.scheduler.stop();
        Ok(())
    }

    /// Connect the transport and run until it finishes or authentication fails
    pub async fn run(mut self) -> Result<(), BotError> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let transport = self.session.transport();
        info!(transport = transport.name(), "Starting transport");

        let pump = tokio::spawn(async move { transport.run(tx).await });

        let outcome = self.process(rx).await;
        if outcome.is_err() {
            pump.abort();
        }

        match pump.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) if outcome.is_ok() => return Err(e.into()),
            Ok(Err(e)) => debug!(error = %e, "Transport stopped"),
            Err(e) if e.is_cancelled() => {}
            Err(e) => return Err(BotError::Internal(format!("transport task failed: {}", e))),
        }

        outcome
    }
}
