//! Drone push stream over Socket.IO (Engine.IO v4, WebSocket transport).
//!
//! Only the frames the monitoring backend actually sends are understood:
//! the Engine.IO handshake, ping/pong, namespace connect/disconnect and
//! `42[...]` events. Decoded events are forwarded to the dashboard on an mpsc
//! channel; the dashboard never touches the socket.

use crate::application::dashboard_service::PushEvent;
use crate::domain::industry::DroneState;
use crate::domain::reading::Reading;
use crate::error::{MonitorError, Result};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

pub const DRONE_STATE_EVENT: &str = "drone_state";
pub const DRONE_UPDATE_EVENT: &str = "drone_update";

/// One decoded WebSocket text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Open { ping_interval_ms: Option<u64> },
    Close,
    Ping,
    Pong,
    Connect,
    Disconnect,
    Event(PushEvent),
    Ignored,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Handshake {
    ping_interval: Option<u64>,
}

pub fn decode_frame(text: &str) -> Result<Frame> {
    let mut chars = text.chars();
    let Some(engine_type) = chars.next() else {
        return Ok(Frame::Ignored);
    };
    let rest = chars.as_str();

    match engine_type {
        '0' => {
            let handshake: Handshake = serde_json::from_str(rest)?;
            Ok(Frame::Open {
                ping_interval_ms: handshake.ping_interval,
            })
        }
        '1' => Ok(Frame::Close),
        '2' => Ok(Frame::Ping),
        '3' => Ok(Frame::Pong),
        '4' => decode_packet(rest),
        _ => Ok(Frame::Ignored),
    }
}

fn decode_packet(packet: &str) -> Result<Frame> {
    let mut chars = packet.chars();
    let Some(packet_type) = chars.next() else {
        return Ok(Frame::Ignored);
    };
    let rest = chars.as_str();

    match packet_type {
        '0' => Ok(Frame::Connect),
        '1' => Ok(Frame::Disconnect),
        '2' => decode_event(rest),
        _ => Ok(Frame::Ignored),
    }
}

fn decode_event(body: &str) -> Result<Frame> {
    // Namespaced packets ("/admin,[...]") are not ours
    if body.starts_with('/') {
        return Ok(Frame::Ignored);
    }
    // Skip an optional ack id before the payload array
    let start = body.find('[').unwrap_or(body.len());
    let (name, payload): (String, serde_json::Value) = serde_json::from_str(&body[start..])?;

    let event = match name.as_str() {
        DRONE_STATE_EVENT => PushEvent::Drone(serde_json::from_value::<DroneState>(payload)?),
        DRONE_UPDATE_EVENT => PushEvent::Reading(serde_json::from_value::<Reading>(payload)?),
        _ => return Ok(Frame::Ignored),
    };
    Ok(Frame::Event(event))
}

/// WebSocket endpoint for a Socket.IO server given as an http(s) URL.
pub fn socket_endpoint(server_url: &str) -> String {
    let base = server_url.trim_end_matches('/');
    let base = if let Some(host) = base.strip_prefix("https://") {
        format!("wss://{}", host)
    } else if let Some(host) = base.strip_prefix("http://") {
        format!("ws://{}", host)
    } else {
        base.to_string()
    };
    format!("{}/socket.io/?EIO=4&transport=websocket", base)
}

pub struct PushStreamClient {
    url: String,
    reconnect_delay: Duration,
}

impl PushStreamClient {
    pub fn new(server_url: &str, reconnect_delay: Duration) -> Self {
        Self {
            url: socket_endpoint(server_url),
            reconnect_delay,
        }
    }

    /// Keep a connection open, reconnecting after `reconnect_delay` whenever it
    /// drops. Returns once the receiving side of `events` is gone.
    pub async fn run(self, events: mpsc::Sender<PushEvent>) {
        loop {
            match self.connect_once(&events).await {
                Ok(()) => tracing::info!(url = %self.url, "push stream closed"),
                Err(e) => tracing::warn!(url = %self.url, error = %e, "push stream failed"),
            }

            if events.send(PushEvent::Disconnected).await.is_err() {
                break;
            }
            tokio::time::sleep(self.reconnect_delay).await;
        }
    }

    async fn connect_once(&self, events: &mpsc::Sender<PushEvent>) -> Result<()> {
        let (ws_stream, _) = connect_async(self.url.as_str()).await?;
        tracing::info!(url = %self.url, "push stream socket open");
        let (mut write, mut read) = ws_stream.split();

        while let Some(message) = read.next().await {
            let text = match message? {
                Message::Text(text) => text,
                Message::Close(_) => break,
                _ => continue,
            };

            let frame = match decode_frame(&text) {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::warn!(error = %e, "dropping malformed push frame");
                    continue;
                }
            };

            match frame {
                Frame::Open { ping_interval_ms } => {
                    tracing::debug!(?ping_interval_ms, "engine.io handshake");
                    write.send(Message::Text("40".into())).await?;
                }
                Frame::Ping => write.send(Message::Text("3".into())).await?,
                Frame::Connect => forward(events, PushEvent::Connected).await?,
                Frame::Event(event) => forward(events, event).await?,
                Frame::Disconnect | Frame::Close => break,
                Frame::Pong | Frame::Ignored => {}
            }
        }

        Ok(())
    }
}

async fn forward(events: &mpsc::Sender<PushEvent>, event: PushEvent) -> Result<()> {
    events
        .send(event)
        .await
        .map_err(|_| MonitorError::Io(std::io::Error::other("push event receiver dropped")))
}
