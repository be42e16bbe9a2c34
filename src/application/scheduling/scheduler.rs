//! Task scheduler - runs plugin tasks on their schedules while connected

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::application::errors::ScheduleError;
use crate::application::execution::run_isolated;
use crate::application::runtime::Session;
use crate::domain::entities::Task;
use crate::infrastructure::plugins::PluginRegistry;
use super::Cadence;

/// One registered task
struct Entry {
    plugin: String,
    task: Task,
    cadence: Cadence,
}

/// Holds every declared task and at most one timer registration per task.
///
/// Timers only run between `start` and `stop`. Stopping cancels future
/// firings; executions already in progress run to completion.
pub struct TaskScheduler {
    entries: Vec<Arc<Entry>>,
    timers: Option<CancellationToken>,
    catch_up_timeout: Option<Duration>,
}

impl TaskScheduler {
    /// Register every task of every plugin, in registry then declaration order.
    /// A malformed schedule fails the whole registration.
    pub fn new(registry: &PluginRegistry) -> Result<Self, ScheduleError> {
        let mut entries = Vec::new();

        for plugin in registry.plugins() {
            for task in plugin.tasks() {
                let cadence = Cadence::parse(task.schedule())?;
                debug!(plugin = plugin.name(), schedule = ?task.schedule(), "Task registered");
                entries.push(Arc::new(Entry {
                    plugin: plugin.name().to_string(),
                    task: task.clone(),
                    cadence,
                }));
            }
        }

        Ok(Self {
            entries,
            timers: None,
            catch_up_timeout: None,
        })
    }

    /// Bound each catch-up execution, since the event loop waits for it
    pub fn with_catch_up_timeout(mut self, timeout: Duration) -> Self {
        self.catch_up_timeout = Some(timeout);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_running(&self) -> bool {
        self.timers.is_some()
    }

    /// Run every task once, sequentially, in registration order.
    /// Failures are logged and do not stop the pass.
    pub async fn catch_up(&self, session: &Arc<Session>) {
        for entry in &self.entries {
            let handler = entry.task.handler();
            let session = Arc::clone(session);

            match run_isolated(self.catch_up_timeout, async move { handler.execute(session).await }).await {
                Ok(()) => info!(plugin = %entry.plugin, "Task executed"),
                Err(e) => error!(plugin = %entry.plugin, error = %e, "Task failed"),
            }
        }
    }

    /// Start one timer per task. Does nothing if timers are already running.
    pub fn start(&mut self, session: &Arc<Session>) {
        if self.timers.is_some() {
            return;
        }

        let token = CancellationToken::new();
        for entry in &self.entries {
            let entry = Arc::clone(entry);
            let session = Arc::clone(session);
            let token = token.child_token();

            match entry.cadence.clone() {
                Cadence::Interval(every) => {
                    tokio::spawn(drive_interval(entry, every, session, token));
                }
                Cadence::Calendar(_) => {
                    tokio::spawn(drive_calendar(entry, session, token));
                }
            }
        }

        debug!(tasks = self.entries.len(), "Scheduler started");
        self.timers = Some(token);
    }

    /// Cancel all future firings
    pub fn stop(&mut self) {
        if let Some(token) = self.timers.take() {
            token.cancel();
            debug!("Scheduler stopped");
        }
    }
}

impl Drop for TaskScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn drive_interval(entry: Arc<Entry>, every: Duration, session: Arc<Session>, token: CancellationToken) {
    let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => fire(&entry, &session),
        }
    }
}

async fn drive_calendar(entry: Arc<Entry>, session: Arc<Session>, token: CancellationToken) {
    let mut last: Option<DateTime<Local>> = None;

    loop {
        let now = Local::now();
        // Never compute from before the previous firing, the clock may lag the timer
        let from = match last {
            Some(previous) if previous > now => previous,
            _ => now,
        };

        let Some(next) = entry.cadence.next_after(&from) else {
            debug!(plugin = %entry.plugin, "Calendar schedule has no future firings");
            break;
        };
        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);

        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(wait) => {
                last = Some(next);
                fire(&entry, &session);
            }
        }
    }
}

/// Run one firing on its own task so slow handlers never delay the timers
fn fire(entry: &Arc<Entry>, session: &Arc<Session>) {
    let entry = Arc::clone(entry);
    let handler = entry.task.handler();
    let session = Arc::clone(session);

    tokio::spawn(async move {
        match run_isolated(None, async move { handler.execute(session).await }).await {
            Ok(()) => info!(plugin = %entry.plugin, "Task executed"),
            Err(e) => error!(plugin = %entry.plugin, error = %e, "Task failed"),
        }
    });
}
