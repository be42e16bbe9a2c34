use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::application::errors::CommandError;
use crate::application::runtime::Session;

/// Behaviour run on a schedule
#[async_trait]
pub trait TaskHandler: Send + Sync {
    async fn execute(&self, session: Arc<Session>) -> Result<(), CommandError>;
}

#[async_trait]
impl<F, Fut> TaskHandler for F
where
    F: Fn(Arc<Session>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), CommandError>> + Send + 'static,
{
    async fn execute(&self, session: Arc<Session>) -> Result<(), CommandError> {
        (self)(session).await
    }
}

/// When a task fires
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    /// Fires every `Duration`, first firing one interval after the timers start
    Every(Duration),
    /// Calendar expression: `min hour dom month dow`, `@daily`, `@every 15m`, ...
    Calendar(String),
}

/// A scheduled plugin task. Holds no state of its own.
#[derive(Clone)]
pub struct Task {
    schedule: Schedule,
    handler: Arc<dyn TaskHandler>,
}

impl Task {
    pub fn new<H>(schedule: Schedule, handler: H) -> Self
    where
        H: TaskHandler + 'static,
    {
        Self {
            schedule,
            handler: Arc::new(handler),
        }
    }

    pub fn every<H>(interval: Duration, handler: H) -> Self
    where
        H: TaskHandler + 'static,
    {
        Self::new(Schedule::Every(interval), handler)
    }

    pub fn calendar<H>(expr: impl Into<String>, handler: H) -> Self
    where
        H: TaskHandler + 'static,
    {
        Self::new(Schedule::Calendar(expr.into()), handler)
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn handler(&self) -> Arc<dyn TaskHandler> {
        Arc::clone(&self.handler)
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("schedule", &self.schedule)
            .finish()
    }
}
