//! Socket Mode envelopes and their mapping to transport events

use serde::{Deserialize, Serialize};

use crate::domain::entities::InboundMessage;

/// Socket Mode envelope wrapper
#[derive(Debug, Clone, Deserialize)]
pub struct SocketModeEnvelope {
    /// Absent on `hello` and `disconnect`
    #[serde(default)]
    pub envelope_id: Option<String>,
    #[serde(rename = "type")]
    pub envelope_type: String,
    #[serde(default)]
    pub payload: Option<EventPayload>,
    /// Set on `disconnect`
    #[serde(default)]
    pub reason: Option<String>,
}

/// Events API callback payload
#[derive(Debug, Clone, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pub team_id: Option<String>,
    /// Kept raw, only message events are decoded further
    #[serde(default)]
    pub event: Option<serde_json::Value>,
}

/// The subset of a `message` event the bot reads
#[derive(Debug, Clone, Deserialize)]
pub struct MessageEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
}

impl MessageEvent {
    /// Edits, joins and bot posts all carry a subtype
    pub fn is_plain_user_message(&self) -> bool {
        self.event_type == "message" && self.subtype.is_none() && self.bot_id.is_none()
    }
}

/// Acknowledgment sent back for every envelope with an id
#[derive(Debug, Clone, Serialize)]
pub struct SocketModeAck {
    pub envelope_id: String,
}

/// What the connection loop should do with one envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    Hello,
    Disconnect(Option<String>),
    Message(InboundMessage),
    Ignored,
}

impl SocketModeEnvelope {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn ack(&self) -> Option<SocketModeAck> {
        self.envelope_id.as_ref().map(|id| SocketModeAck {
            envelope_id: id.clone(),
        })
    }

    /// Classify the envelope. Messages posted by `own_user` are ignored.
    pub fn classify(self, own_user: Option<&str>) -> Envelope {
        match self.envelope_type.as_str() {
            "hello" => Envelope::Hello,
            "disconnect" => Envelope::Disconnect(self.reason),
            "events_api" => {
                let Some(event) = self
                    .payload
                    .and_then(|p| p.event)
                    .and_then(|raw| serde_json::from_value::<MessageEvent>(raw).ok())
                else {
                    return Envelope::Ignored;
                };
                if !event.is_plain_user_message() {
                    return Envelope::Ignored;
                }
                match (event.user, event.channel) {
                    (Some(user), Some(channel)) if Some(user.as_str()) != own_user => {
                        Envelope::Message(InboundMessage::new(user, channel, event.text))
                    }
                    _ => Envelope::Ignored,
                }
            }
            _ => Envelope::Ignored,
        }
    }
}
