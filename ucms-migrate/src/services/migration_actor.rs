//! Migration state actor
//!
//! Single authority over [`MigrationState`]. Every transition runs
//! synchronously under one lock and performs no I/O; accepted `Start` events
//! hand back a [`MigrationEffect`] that the caller schedules itself.
//!
//! Subscribers are called under the same lock, in registration order, with the
//! post-transition snapshot and exactly the log lines that transition
//! appended. Delivery is at-most-once: a subscriber whose callback returns an
//! error is dropped and never called again. Callbacks must not call back into
//! the actor.

use crate::models::{
    MigrationEffect, MigrationEvent, MigrationOperation, MigrationResults, MigrationState,
    MigrationStatus,
};
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Subscriber callback
pub type Subscriber =
    Arc<dyn Fn(&MigrationState, &[String]) -> anyhow::Result<()> + Send + Sync>;

/// Result of [`MigrationActor::send`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SendOutcome {
    /// Work the caller must run, only set for an accepted `Start`
    pub effect: Option<MigrationEffect>,
    /// `true` only for an accepted `Start`
    pub started: bool,
}

/// How a transition treated its event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Applied {
    /// State changed; subscribers are notified
    Changed,
    /// Event accepted but nothing to do (RESET while idle)
    Unchanged,
    /// Event refused by the status guard
    Rejected,
}

struct Inner {
    state: MigrationState,
    subscribers: Vec<(u64, Subscriber)>,
    next_subscriber_id: u64,
}

impl Inner {
    fn notify(&mut self, new_logs: &[String]) {
        let state = &self.state;
        self.subscribers.retain(|(id, subscriber)| match subscriber(state, new_logs) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(subscriber = id, error = %e, "Dropping migration subscriber");
                false
            }
        });
    }

    fn add_subscriber(&mut self, subscriber: Subscriber) -> u64 {
        let id = self.next_subscriber_id;
        self.next_subscriber_id += 1;
        self.subscribers.push((id, subscriber));
        id
    }
}

/// Handle to the process-wide migration state machine
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct MigrationActor {
    inner: Arc<Mutex<Inner>>,
}

impl MigrationActor {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: MigrationState::default(),
                subscribers: Vec::new(),
                next_subscriber_id: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Apply one event
    pub fn send(&self, event: MigrationEvent) -> SendOutcome {
        self.apply(event).0
    }

    fn apply(&self, event: MigrationEvent) -> (SendOutcome, Applied) {
        let mut inner = self.lock();
        // START replaces the previous run's log wholesale
        let previous_len = match event {
            MigrationEvent::Start(_) => 0,
            _ => inner.state.logs.len(),
        };

        let (outcome, applied) = transition(&mut inner.state, event);

        if applied == Applied::Changed {
            let new_logs = inner.state.logs[previous_len.min(inner.state.logs.len())..].to_vec();
            for line in &new_logs {
                tracing::info!(target: "migration", "{}", line);
            }
            inner.notify(&new_logs);
        }

        (outcome, applied)
    }

    /// Immutable snapshot of the current state
    pub fn state(&self) -> MigrationState {
        self.lock().state.clone()
    }

    pub fn is_running(&self) -> bool {
        self.lock().state.status == MigrationStatus::Running
    }

    /// Log lines from `cursor` on, plus the cursor to pass next time
    pub fn logs_since(&self, cursor: usize) -> (Vec<String>, usize) {
        let inner = self.lock();
        let logs = &inner.state.logs;
        let from = cursor.min(logs.len());
        (logs[from..].to_vec(), logs.len())
    }

    /// Register a listener for every state change
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&MigrationState, &[String]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = self.lock().add_subscriber(Arc::new(callback));
        Subscription::new(Arc::downgrade(&self.inner), id)
    }

    /// Snapshot and subscription taken atomically
    ///
    /// No transition can fall between the snapshot and the first notification.
    pub fn subscribe_with_snapshot<F>(&self, callback: F) -> (MigrationState, Subscription)
    where
        F: Fn(&MigrationState, &[String]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        let snapshot = inner.state.clone();
        let id = inner.add_subscriber(Arc::new(callback));
        drop(inner);
        (snapshot, Subscription::new(Arc::downgrade(&self.inner), id))
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Start an operation
    pub fn start(&self, operation: MigrationOperation) -> SendOutcome {
        self.send(MigrationEvent::Start(operation))
    }

    /// Append a log line (ignored unless running)
    pub fn log(&self, message: impl Into<String>) {
        self.send(MigrationEvent::Log(message.into()));
    }

    pub fn complete(&self, result: MigrationResults) {
        self.send(MigrationEvent::Complete(result));
    }

    pub fn fail(&self, error: impl Into<String>) {
        self.send(MigrationEvent::Fail(error.into()));
    }

    /// Return to idle; `false` while an operation is running
    pub fn reset(&self) -> bool {
        self.apply(MigrationEvent::Reset).1 != Applied::Rejected
    }
}

impl Default for MigrationActor {
    fn default() -> Self {
        Self::new()
    }
}

/// Unsubscribes on [`Subscription::unsubscribe`] or drop, whichever comes first
pub struct Subscription {
    actor: Weak<Mutex<Inner>>,
    id: u64,
    active: bool,
}

impl Subscription {
    fn new(actor: Weak<Mutex<Inner>>, id: u64) -> Self {
        Self {
            actor,
            id,
            active: true,
        }
    }

    /// Remove the listener; repeated calls do nothing
    pub fn unsubscribe(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        if let Some(inner) = self.actor.upgrade() {
            let mut inner = inner.lock().unwrap_or_else(|e| e.into_inner());
            inner.subscribers.retain(|(id, _)| *id != self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

fn log_line(message: &str) -> String {
    format!("[{}] {}", Utc::now().format("%H:%M:%S"), message)
}

/// Transition table
fn transition(state: &mut MigrationState, event: MigrationEvent) -> (SendOutcome, Applied) {
    let running = state.status == MigrationStatus::Running;
    let ignored = (SendOutcome::default(), Applied::Rejected);

    match event {
        MigrationEvent::Start(operation) => {
            if running {
                return ignored;
            }
            *state = MigrationState {
                status: MigrationStatus::Running,
                logs: vec![log_line(&format!("=== {} Started ===", operation.label()))],
                started_at: Some(Utc::now()),
                completed_at: None,
                result: None,
                error: None,
            };
            (
                SendOutcome {
                    effect: Some(operation.effect()),
                    started: true,
                },
                Applied::Changed,
            )
        }
        MigrationEvent::Log(message) => {
            if !running {
                return ignored;
            }
            state.logs.push(log_line(&message));
            (SendOutcome::default(), Applied::Changed)
        }
        MigrationEvent::Complete(result) => {
            if !running {
                return ignored;
            }
            state.status = MigrationStatus::Completed;
            state.completed_at = Some(Utc::now());
            state.result = Some(result);
            state.error = None;
            state.logs.push(log_line("=== Operation Complete ==="));
            (SendOutcome::default(), Applied::Changed)
        }
        MigrationEvent::Fail(error) => {
            if !running {
                return ignored;
            }
            state.status = MigrationStatus::Error;
            state.completed_at = Some(Utc::now());
            state.result = None;
            state.logs.push(log_line(&format!("=== Operation Failed: {} ===", error)));
            state.error = Some(error);
            (SendOutcome::default(), Applied::Changed)
        }
        MigrationEvent::Reset => match state.status {
            MigrationStatus::Running => ignored,
            MigrationStatus::Idle => (SendOutcome::default(), Applied::Unchanged),
            MigrationStatus::Completed | MigrationStatus::Error => {
                *state = MigrationState::default();
                (SendOutcome::default(), Applied::Changed)
            }
        },
    }
}
