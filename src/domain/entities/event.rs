use std::time::Duration;

use super::InboundMessage;

/// Lifecycle and message events emitted by a transport, in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Connected,
    Disconnected,
    Latency(Duration),
    InvalidAuth,
    Message(InboundMessage),
}
