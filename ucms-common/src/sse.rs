//! Server-Sent Events (SSE) utilities
//!
//! Shared SSE helpers for UCMS services.

use axum::response::sse::Event;
use serde::Serialize;
use std::time::Duration;
use tracing::warn;

/// Interval between heartbeat comments on long-lived streams
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Build a named SSE event carrying a JSON payload
///
/// Returns `None` (and logs) if the payload cannot be serialized; callers
/// skip the event rather than tearing down the stream.
pub fn json_event<T: Serialize>(event_name: &str, payload: &T) -> Option<Event> {
    match serde_json::to_string(payload) {
        Ok(data) => Some(Event::default().event(event_name).data(data)),
        Err(e) => {
            warn!("SSE: Failed to serialize {} event: {}", event_name, e);
            None
        }
    }
}

/// Comment-only heartbeat line (`:heartbeat`)
pub fn heartbeat_event() -> Event {
    Event::default().comment("heartbeat")
}
