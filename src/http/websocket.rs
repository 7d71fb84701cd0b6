//! Live scan log stream.
//!
//! # Data Flow
//! ```text
//! AuditLog broadcast ──── {"type":"log","data":entry} ────→ WebSocket client
//! ```
//!
//! # Design Decisions
//! - Only stored entries are pushed; there is no replay of history
//! - A lagging client skips entries instead of slowing the writer
//! - Client frames are ignored except Close

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::audit::LogEntry;
use crate::http::server::AppState;

#[derive(Debug, Serialize)]
struct LogFrame<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    data: &'a LogEntry,
}

pub async fn log_stream(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    // Subscribe before the upgrade completes so nothing stored in between is missed.
    let feed = state.audit.subscribe();
    ws.on_upgrade(move |socket| forward_entries(socket, feed))
}

async fn forward_entries(mut socket: WebSocket, mut feed: broadcast::Receiver<LogEntry>) {
    tracing::debug!("Log stream opened");

    loop {
        tokio::select! {
            event = feed.recv() => match event {
                Ok(entry) => {
                    let frame = LogFrame { kind: "log", data: &entry };
                    let text = match serde_json::to_string(&frame) {
                        Ok(text) => text,
                        Err(err) => {
                            tracing::warn!(error = %err, id = entry.id, "Failed to encode log frame");
                            continue;
                        }
                    };
                    if socket.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Log stream client lagging, entries skipped");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::debug!("Log stream closed");
}
