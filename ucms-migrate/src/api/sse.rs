//! Server-Sent Events (SSE) for migration progress
//!
//! On connect the full state goes out as an `init` event. Afterwards every
//! actor transition becomes an `update` event carrying only the newly appended
//! log lines. A `:heartbeat` comment is sent every 30 seconds.
//!
//! The actor subscription lives inside the stream: when the client goes away
//! axum drops the stream, which unsubscribes exactly once.

use crate::models::MigrationUpdate;
use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info};
use ucms_common::sse::{heartbeat_event, json_event, HEARTBEAT_INTERVAL};

/// GET /admin/migration/events
pub async fn migration_event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, mut rx) = mpsc::unbounded_channel::<MigrationUpdate>();

    // Snapshot and subscription are taken atomically so no update is lost or
    // duplicated between `init` and the first `update`.
    let (snapshot, subscription) = state.actor().subscribe_with_snapshot(move |state, new_logs| {
        tx.send(state.to_update(new_logs))
            .map_err(|_| anyhow::anyhow!("SSE client disconnected"))
    });

    info!(
        subscribers = state.actor().subscriber_count(),
        "New SSE client connected to migration events"
    );

    let stream = async_stream::stream! {
        let _subscription = subscription;

        if let Some(event) = json_event("init", &snapshot) {
            yield Ok(event);
        }

        let mut heartbeat = interval_at(Instant::now() + HEARTBEAT_INTERVAL, HEARTBEAT_INTERVAL);

        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    debug!("SSE: Sending heartbeat");
                    yield Ok(heartbeat_event());
                }

                update = rx.recv() => {
                    match update {
                        Some(update) => {
                            if let Some(event) = json_event("update", &update) {
                                yield Ok(event);
                            }
                        }
                        None => break,
                    }
                }
            }
        }

        debug!("SSE: Migration event stream ended");
    };

    Sse::new(stream)
}
