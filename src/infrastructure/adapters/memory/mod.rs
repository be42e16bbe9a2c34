//! In-memory adapter - Scripted events and recorded sends, for tests and dry runs

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::application::errors::TransportError;
use crate::domain::entities::{Attachment, TransportEvent};
use crate::domain::traits::Transport;

/// One recorded outbound send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Text { channel: String, text: String },
    Attachments { channel: String, attachments: Vec<Attachment> },
}

/// Transport that replays a fixed event script and records every send
#[derive(Default)]
pub struct MemoryTransport {
    script: Mutex<Vec<TransportEvent>>,
    sent: Mutex<Vec<Outbound>>,
    failing: bool,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events emitted, in order, by `run`
    pub fn with_events(self, events: Vec<TransportEvent>) -> Self {
        Self {
            script: Mutex::new(events),
            ..self
        }
    }

    /// Make every send fail
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Everything sent so far
    pub fn sent(&self) -> Vec<Outbound> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    /// Text of every plain message sent so far
    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|o| match o {
                Outbound::Text { text, .. } => Some(text),
                Outbound::Attachments { .. } => None,
            })
            .collect()
    }

    fn record(&self, outbound: Outbound) -> Result<(), TransportError> {
        if self.failing {
            return Err(TransportError::Api("send rejected".to_string()));
        }
        self.sent
            .lock()
            .map_err(|_| TransportError::Api("send log poisoned".to_string()))?
            .push(outbound);
        Ok(())
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn run(&self, events: mpsc::Sender<TransportEvent>) -> Result<(), TransportError> {
        let script = match self.script.lock() {
            Ok(mut script) => std::mem::take(&mut *script),
            Err(_) => return Err(TransportError::Closed),
        };

        for event in script {
            if events.send(event).await.is_err() {
                break;
            }
        }
        Ok(())
    }

    async fn send_text(&self, channel: &str, text: &str) -> Result<(), TransportError> {
        self.record(Outbound::Text {
            channel: channel.to_string(),
            text: text.to_string(),
        })
    }

    async fn send_attachments(&self, channel: &str, attachments: &[Attachment]) -> Result<(), TransportError> {
        self.record(Outbound::Attachments {
            channel: channel.to_string(),
            attachments: attachments.to_vec(),
        })
    }

    fn name(&self) -> &str {
        "memory"
    }
}
