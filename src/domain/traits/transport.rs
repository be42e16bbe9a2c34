use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::application::errors::TransportError;
use crate::domain::entities::{Attachment, TransportEvent};

/// Transport trait - abstraction for the messaging platform connection
#[async_trait]
pub trait Transport: Send + Sync {
    /// Manage the connection, pushing events in arrival order until the
    /// receiver goes away or the transport gives up
    async fn run(&self, events: mpsc::Sender<TransportEvent>) -> Result<(), TransportError>;

    /// Send a plain text message to a channel
    async fn send_text(&self, channel: &str, text: &str) -> Result<(), TransportError>;

    /// Send a structured payload to a channel
    async fn send_attachments(&self, channel: &str, attachments: &[Attachment]) -> Result<(), TransportError>;

    /// Short name for logs
    fn name(&self) -> &str;
}
