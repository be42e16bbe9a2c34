//! Session - the handle plugins use to read runtime state and send messages

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use crate::application::runtime::BuildInfo;
use crate::domain::entities::{Attachment, InboundMessage};
use crate::domain::traits::{Plugin, Transport};
use crate::infrastructure::plugins::PluginRegistry;

const NEVER_CONNECTED: i64 = 0;

/// Runtime state shared with every command and task handler.
///
/// `connected_at` and `latency` are written only by the event loop and read
/// through atomics, so handlers always see a consistent point-in-time value.
pub struct Session {
    name: String,
    build: BuildInfo,
    started_at: DateTime<Utc>,
    connected_at_micros: AtomicI64,
    latency_nanos: AtomicU64,
    registry: Arc<PluginRegistry>,
    transport: Arc<dyn Transport>,
}

impl Session {
    pub fn new(
        name: impl Into<String>,
        build: BuildInfo,
        registry: Arc<PluginRegistry>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            name: name.into(),
            build,
            started_at: Utc::now(),
            connected_at_micros: AtomicI64::new(NEVER_CONNECTED),
            latency_nanos: AtomicU64::new(0),
            registry,
            transport,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        self.build.version()
    }

    pub fn friendly_version(&self) -> String {
        self.build.friendly_version()
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.build.built_at()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Time the current connection was established, `None` before the first one
    pub fn connected_at(&self) -> Option<DateTime<Utc>> {
        match self.connected_at_micros.load(Ordering::Acquire) {
            NEVER_CONNECTED => None,
            micros => DateTime::from_timestamp_micros(micros),
        }
    }

    /// Most recent latency sample reported by the transport
    pub fn latency(&self) -> Duration {
        Duration::from_nanos(self.latency_nanos.load(Ordering::Acquire))
    }

    /// Loaded plugins in registry order
    pub fn plugins(&self) -> &[Arc<dyn Plugin>] {
        self.registry.plugins()
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    pub(crate) fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    /// Record a new connection. The stored value never moves backwards.
    pub(crate) fn mark_connected(&self, at: DateTime<Utc>) {
        self.connected_at_micros
            .fetch_max(at.timestamp_micros().max(1), Ordering::AcqRel);
    }

    pub(crate) fn record_latency(&self, latency: Duration) {
        let nanos = u64::try_from(latency.as_nanos()).unwrap_or(u64::MAX);
        self.latency_nanos.store(nanos, Ordering::Release);
    }

    /// Send a message to a channel. Delivery failures are logged, not returned.
    pub async fn say(&self, text: &str, channel: &str) {
        debug!(channel, "Sending message");
        if let Err(e) = self.transport.send_text(channel, text).await {
            error!(channel, error = %e, "Failed to send message");
        }
    }

    /// Mention the sender of `message` and answer in its channel
    pub async fn reply(&self, message: &InboundMessage, text: &str) {
        let text = format!("<@{}>: {}", message.user, text);
        self.say(&text, &message.channel).await;
    }

    /// Send structured attachments. Delivery failures are logged, not returned.
    pub async fn send_attachments(&self, attachments: &[Attachment], channel: &str) {
        if let Err(e) = self.transport.send_attachments(channel, attachments).await {
            error!(channel, error = %e, "Failed to send attachments");
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("name", &self.name)
            .field("version", &self.build.version())
            .field("started_at", &self.started_at)
            .field("connected_at", &self.connected_at())
            .field("latency", &self.latency())
            .field("plugins", &self.registry.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::memory::{MemoryTransport, Outbound};
    use chrono::TimeZone;

    fn session(transport: Arc<MemoryTransport>) -> Session {
        Session::new(
            "Pingu",
            BuildInfo::new("dev", Utc::now()),
            Arc::new(PluginRegistry::default()),
            transport,
        )
    }

    #[test]
    fn test_connected_at_is_monotonic() {
        let session = session(Arc::new(MemoryTransport::new()));
        assert_eq!(session.connected_at(), None);

        let first = Utc.with_ymd_and_hms(2018, 12, 1, 5, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2018, 12, 2, 5, 0, 0).unwrap();

        session.mark_connected(first);
        assert_eq!(session.connected_at(), Some(first));

        session.mark_connected(second);
        assert_eq!(session.connected_at(), Some(second));

        session.mark_connected(first);
        assert_eq!(session.connected_at(), Some(second));
    }

    #[test]
    fn test_latency_is_last_write_wins() {
        let session = session(Arc::new(MemoryTransport::new()));
        assert_eq!(session.latency(), Duration::ZERO);

        for millis in [120, 80, 300] {
            session.record_latency(Duration::from_millis(millis));
        }
        assert_eq!(session.latency(), Duration::from_millis(300));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_latency_with_concurrent_readers() {
        use std::sync::atomic::AtomicBool;

        const SAMPLES: u64 = 2_000;

        let session = Arc::new(session(Arc::new(MemoryTransport::new())));
        let done = Arc::new(AtomicBool::new(false));

        let readers: Vec<_> = (0..3)
            .map(|_| {
                let session = Arc::clone(&session);
                let done = Arc::clone(&done);
                tokio::spawn(async move {
                    while !done.load(Ordering::Acquire) {
                        let latency = session.latency();
                        // Every read is a whole sample, never a torn value
                        assert_eq!(latency.subsec_nanos() % 1_000, 0);
                        assert!(latency <= Duration::from_micros(SAMPLES));
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        for micros in 1..=SAMPLES {
            session.record_latency(Duration::from_micros(micros));
            if micros % 100 == 0 {
                tokio::task::yield_now().await;
            }
        }
        done.store(true, Ordering::Release);

        for reader in readers {
            reader.await.unwrap();
        }
        assert_eq!(session.latency(), Duration::from_micros(SAMPLES));
    }

    #[tokio::test]
    async fn test_reply_mentions_sender() {
        let transport = Arc::new(MemoryTransport::new());
        let session = session(Arc::clone(&transport));
        let message = InboundMessage::new("U123", "C42", "!ping");

        session.reply(&message, "Noot! Noot!").await;

        assert_eq!(
            transport.sent(),
            vec![Outbound::Text {
                channel: "C42".to_string(),
                text: "<@U123>: Noot! Noot!".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_send_failures_are_swallowed() {
        let transport = Arc::new(MemoryTransport::new().failing());
        let session = session(Arc::clone(&transport));

        session.say("hello", "C1").await;
        session.send_attachments(&[Attachment::new("x")], "C1").await;

        assert!(transport.sent().is_empty());
    }
}
