//! Slack adapter - Socket Mode events in, Web API messages out

pub mod events;

use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, error, info, warn};

use crate::application::errors::TransportError;
use crate::domain::entities::{Attachment, TransportEvent};
use crate::domain::traits::Transport;
use events::{Envelope, SocketModeEnvelope};

const SLACK_API: &str = "https://slack.com/api";

/// Connection tunables
#[derive(Debug, Clone)]
pub struct SlackOptions {
    pub reconnect_delay: Duration,
    pub ping_interval: Duration,
    pub api_base: String,
}

impl Default for SlackOptions {
    fn default() -> Self {
        Self {
            reconnect_delay: Duration::from_secs(5),
            ping_interval: Duration::from_secs(30),
            api_base: SLACK_API.to_string(),
        }
    }
}

/// Why one websocket session ended
enum SessionEnd {
    /// Slack asked for a reconnect, or the socket closed
    Closed,
    /// The runtime dropped the event receiver
    ReceiverGone,
}

/// Slack transport using Socket Mode
pub struct SlackTransport {
    client: reqwest::Client,
    bot_token: String,
    app_token: String,
    options: SlackOptions,
}

impl SlackTransport {
    pub fn new(bot_token: impl Into<String>, app_token: impl Into<String>) -> Result<Self, TransportError> {
        Self::with_options(bot_token, app_token, SlackOptions::default())
    }

    pub fn with_options(
        bot_token: impl Into<String>,
        app_token: impl Into<String>,
        options: SlackOptions,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            bot_token: bot_token.into(),
            app_token: app_token.into(),
            options,
        })
    }

    /// Call a Web API method and check its `ok` flag
    async fn api_call(
        &self,
        method: &str,
        token: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, TransportError> {
        let response: serde_json::Value = self
            .client
            .post(format!("{}/{}", self.options.api_base, method))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?
            .json()
            .await?;

        if response.get("ok").and_then(|v| v.as_bool()) == Some(true) {
            return Ok(response);
        }

        let error = response
            .get("error")
            .and_then(|e| e.as_str())
            .unwrap_or("unknown")
            .to_string();

        match error.as_str() {
            "invalid_auth" | "not_authed" | "account_inactive" | "token_revoked" => {
                Err(TransportError::Auth(format!("{} failed: {}", method, error)))
            }
            _ => Err(TransportError::Api(format!("{} failed: {}", method, error))),
        }
    }

    /// Returns the bot's own user id
    async fn test_auth(&self) -> Result<Option<String>, TransportError> {
        debug!("Testing Slack authentication");
        let response = self.api_call("auth.test", &self.bot_token, &json!({})).await?;

        let user_id = response
            .get("user_id")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        if let Some(user_id) = &user_id {
            info!(user = %user_id, "Authenticated with Slack");
        }
        Ok(user_id)
    }

    async fn open_connection(&self) -> Result<String, TransportError> {
        let response = self
            .api_call("apps.connections.open", &self.app_token, &json!({}))
            .await?;

        response
            .get("url")
            .and_then(|u| u.as_str())
            .map(str::to_string)
            .ok_or_else(|| TransportError::Api("Missing url in apps.connections.open response".to_string()))
    }

    /// Wait out the reconnect delay. `false` if the runtime went away meanwhile.
    async fn pause(&self, events: &mpsc::Sender<TransportEvent>) -> bool {
        tokio::select! {
            _ = events.closed() => false,
            _ = tokio::time::sleep(self.options.reconnect_delay) => true,
        }
    }

    /// Run one websocket session until it closes
    async fn connect_and_run(
        &self,
        url: &str,
        own_user: Option<&str>,
        events: &mpsc::Sender<TransportEvent>,
        connected: &mut bool,
    ) -> Result<SessionEnd, TransportError> {
        let (ws_stream, _) = connect_async(url).await?;
        let (mut write, mut read) = ws_stream.split();

        let first_ping = Instant::now() + self.options.ping_interval;
        let mut ping = tokio::time::interval_at(first_ping, self.options.ping_interval);
        ping.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut ping_sent: Option<Instant> = None;

        loop {
            tokio::select! {
                _ = events.closed() => return Ok(SessionEnd::ReceiverGone),
                _ = ping.tick() => {
                    ping_sent = Some(Instant::now());
                    write.send(WsMessage::Ping(Vec::new())).await?;
                }
                msg = read.next() => {
                    let event = match msg {
                        Some(Ok(WsMessage::Text(text))) => {
                            let envelope = match SocketModeEnvelope::parse(&text) {
                                Ok(envelope) => envelope,
                                Err(e) => {
                                    warn!(error = %e, "Failed to parse Socket Mode envelope");
                                    continue;
                                }
                            };

                            if let Some(ack) = envelope.ack() {
                                let ack = serde_json::to_string(&ack)
                                    .map_err(|e| TransportError::Api(e.to_string()))?;
                                write.send(WsMessage::Text(ack)).await?;
                            }

                            match envelope.classify(own_user) {
                                Envelope::Hello => {
                                    *connected = true;
                                    Some(TransportEvent::Connected)
                                }
                                Envelope::Disconnect(reason) => {
                                    info!(reason = reason.as_deref().unwrap_or("none"), "Slack requested a reconnect");
                                    return Ok(SessionEnd::Closed);
                                }
                                Envelope::Message(message) => Some(TransportEvent::Message(message)),
                                Envelope::Ignored => None,
                            }
                        }
                        Some(Ok(WsMessage::Ping(data))) => {
                            write.send(WsMessage::Pong(data)).await?;
                            None
                        }
                        Some(Ok(WsMessage::Pong(_))) => {
                            ping_sent.take().map(|sent| TransportEvent::Latency(sent.elapsed()))
                        }
                        Some(Ok(WsMessage::Close(_))) | None => {
                            info!("WebSocket closed by server");
                            return Ok(SessionEnd::Closed);
                        }
                        Some(Ok(_)) => None,
                        Some(Err(e)) => return Err(e.into()),
                    };

                    if let Some(event) = event {
                        if events.send(event).await.is_err() {
                            return Ok(SessionEnd::ReceiverGone);
                        }
                    }
                }
            }
        }
    }
}

#[async_trait]
impl Transport for SlackTransport {
    async fn run(&self, events: mpsc::Sender<TransportEvent>) -> Result<(), TransportError> {
        let own_user = loop {
            match self.test_auth().await {
                Ok(user) => break user,
                Err(TransportError::Auth(reason)) => {
                    error!(%reason, "Slack rejected the bot token");
                    let _ = events.send(TransportEvent::InvalidAuth).await;
                    return Ok(());
                }
                Err(e) => {
                    warn!(error = %e, delay = ?self.options.reconnect_delay, "Slack authentication check failed");
                    if !self.pause(&events).await {
                        return Ok(());
                    }
                }
            }
        };

        loop {
            let url = match self.open_connection().await {
                Ok(url) => url,
                Err(TransportError::Auth(reason)) => {
                    error!(%reason, "Slack rejected the app token");
                    let _ = events.send(TransportEvent::InvalidAuth).await;
                    return Ok(());
                }
                Err(e) => {
                    warn!(error = %e, delay = ?self.options.reconnect_delay, "Failed to open Socket Mode connection");
                    if !self.pause(&events).await {
                        return Ok(());
                    }
                    continue;
                }
            };

            info!("Connecting to Socket Mode");
            let mut connected = false;
            let outcome = self
                .connect_and_run(&url, own_user.as_deref(), &events, &mut connected)
                .await;

            if let Ok(SessionEnd::ReceiverGone) = outcome {
                return Ok(());
            }
            if let Err(e) = &outcome {
                warn!(error = %e, "Socket Mode connection error");
            }

            if connected && events.send(TransportEvent::Disconnected).await.is_err() {
                return Ok(());
            }

            info!(delay = ?self.options.reconnect_delay, "Reconnecting");
            if !self.pause(&events).await {
                return Ok(());
            }
        }
    }

    async fn send_text(&self, channel: &str, text: &str) -> Result<(), TransportError> {
        let body = json!({
            "channel": channel,
            "text": text,
            "link_names": true,
            "unfurl_links": false,
            "unfurl_media": true,
        });
        self.api_call("chat.postMessage", &self.bot_token, &body).await?;
        Ok(())
    }

    async fn send_attachments(&self, channel: &str, attachments: &[Attachment]) -> Result<(), TransportError> {
        let body = json!({
            "channel": channel,
            "attachments": attachments,
            "link_names": true,
            "unfurl_links": false,
            "unfurl_media": true,
        });
        self.api_call("chat.postMessage", &self.bot_token, &body).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "slack"
    }
}
