//! Console adapter for development/testing

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use crate::application::errors::TransportError;
use crate::domain::entities::{Attachment, InboundMessage, TransportEvent};
use crate::domain::traits::Transport;

/// Sender and channel used for every console line
pub const CONSOLE_IDENTITY: &str = "console";

/// Console transport for local development.
///
/// Reports a connection immediately, then turns every stdin line into an
/// inbound message. End of input ends the transport.
pub struct ConsoleTransport {
    name: String,
}

impl ConsoleTransport {
    pub fn new() -> Self {
        Self {
            name: CONSOLE_IDENTITY.to_string(),
        }
    }
}

impl Default for ConsoleTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Render attachments the way a chat client would roughly show them
pub fn render_attachments(attachments: &[Attachment]) -> String {
    attachments
        .iter()
        .map(|a| {
            let mut lines = Vec::new();
            if let Some(pretext) = &a.pretext {
                lines.push(pretext.clone());
            }
            if let Some(author) = &a.author_name {
                lines.push(format!("  {}", author));
            }
            match &a.text {
                Some(text) => lines.push(format!("  {}", text)),
                None => lines.push(format!("  {}", a.fallback)),
            }
            lines.join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn run(&self, events: mpsc::Sender<TransportEvent>) -> Result<(), TransportError> {
        tracing::info!("Starting console transport (dev mode)");

        if events.send(TransportEvent::Connected).await.is_err() {
            return Ok(());
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?
        {
            let text = line.trim();
            if text.is_empty() {
                continue;
            }

            let message = InboundMessage::new(CONSOLE_IDENTITY, CONSOLE_IDENTITY, text);
            if events.send(TransportEvent::Message(message)).await.is_err() {
                return Ok(());
            }
        }

        tracing::info!("End of console input");
        let _ = events.send(TransportEvent::Disconnected).await;
        Ok(())
    }

    async fn send_text(&self, channel: &str, text: &str) -> Result<(), TransportError> {
        println!("[{}] {}", channel, text);
        Ok(())
    }

    async fn send_attachments(&self, channel: &str, attachments: &[Attachment]) -> Result<(), TransportError> {
        println!("[{}] {}", channel, render_attachments(attachments));
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_attachments() {
        let attachments = vec![
            Attachment::new("ABC-1: Broken")
                .with_pretext("Issue ABC-1")
                .with_author("Jane", None)
                .with_text("Broken build"),
            Attachment::new("ABC-2: Fallback only"),
        ];

        assert_eq!(
            render_attachments(&attachments),
            "Issue ABC-1\n  Jane\n  Broken build\n  ABC-2: Fallback only"
        );
    }
}
