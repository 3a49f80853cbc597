//! Migration state machine types
//!
//! A single [`MigrationState`] lives for the whole process, owned by the
//! migration actor. Status progresses:
//!
//! IDLE → RUNNING → COMPLETED | ERROR → (RESET) → IDLE
//!
//! Serialized with camelCase keys and lowercase status names; this is the
//! payload contract of the admin console.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Migration lifecycle discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationStatus {
    /// Nothing has run since start-up or the last reset
    Idle,
    /// An operation is in flight
    Running,
    /// Last operation finished (possibly with per-item errors)
    Completed,
    /// Last operation hit an infrastructure-level failure
    Error,
}

impl MigrationStatus {
    /// Completed or Error
    pub fn is_terminal(self) -> bool {
        matches!(self, MigrationStatus::Completed | MigrationStatus::Error)
    }
}

/// Selects which routine a START runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationOperation {
    /// Clone the legacy repository and import members, articles, projects, images
    #[default]
    Migrate,
    /// Null out image URLs that do not point at object storage
    Cleanup,
    /// Delete every migrated row
    Delete,
}

impl MigrationOperation {
    /// Human-readable label used in the opening log line
    pub fn label(self) -> &'static str {
        match self {
            MigrationOperation::Migrate => "Data Migration",
            MigrationOperation::Cleanup => "Image URL Cleanup",
            MigrationOperation::Delete => "Delete All Data",
        }
    }

    /// Effect the caller must execute once this operation is accepted
    pub fn effect(self) -> MigrationEffect {
        match self {
            MigrationOperation::Migrate => MigrationEffect::RunMigration,
            MigrationOperation::Cleanup => MigrationEffect::RunCleanup,
            MigrationOperation::Delete => MigrationEffect::RunDelete,
        }
    }
}

impl std::fmt::Display for MigrationOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MigrationOperation::Migrate => write!(f, "migrate"),
            MigrationOperation::Cleanup => write!(f, "cleanup"),
            MigrationOperation::Delete => write!(f, "delete"),
        }
    }
}

/// Asynchronous work the caller must schedule after a successful START
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationEffect {
    RunMigration,
    RunCleanup,
    RunDelete,
}

/// Closed set of events accepted by the migration actor
#[derive(Debug, Clone, PartialEq)]
pub enum MigrationEvent {
    Start(MigrationOperation),
    Log(String),
    Complete(MigrationResults),
    Fail(String),
    Reset,
}

/// Per-entity count triple produced by every worker
///
/// Cleanup runs report cleaned rows as `created`; delete runs report deleted
/// rows as `created`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationTally {
    pub created: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl MigrationTally {
    /// Tally with only a created count (cleanup/delete reporting)
    pub fn created_only(created: usize) -> Self {
        Self {
            created,
            ..Self::default()
        }
    }

    /// Total items looked at
    pub fn total(&self) -> usize {
        self.created + self.skipped + self.errors
    }

    /// Summary line, e.g. `Members: 3 created, 1 skipped, 0 errors`
    pub fn summary(&self, label: &str) -> String {
        format!(
            "{}: {} created, {} skipped, {} errors",
            label, self.created, self.skipped, self.errors
        )
    }
}

/// Aggregate of the four per-entity tallies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationResults {
    pub members: MigrationTally,
    pub articles: MigrationTally,
    pub projects: MigrationTally,
    pub images: MigrationTally,
}

impl MigrationResults {
    /// Sum of per-item errors across all entities
    pub fn total_errors(&self) -> usize {
        self.members.errors + self.articles.errors + self.projects.errors + self.images.errors
    }
}

/// Snapshot of the migration state machine
///
/// Invariant: when `status` is terminal exactly one of `result`/`error` is
/// set; otherwise both are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationState {
    pub status: MigrationStatus,
    pub logs: Vec<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<MigrationResults>,
    pub error: Option<String>,
}

impl Default for MigrationState {
    fn default() -> Self {
        Self {
            status: MigrationStatus::Idle,
            logs: Vec::new(),
            started_at: None,
            completed_at: None,
            result: None,
            error: None,
        }
    }
}

impl MigrationState {
    /// Incremental view for push clients: everything but the full log
    pub fn to_update(&self, new_logs: &[String]) -> MigrationUpdate {
        MigrationUpdate {
            status: self.status,
            started_at: self.started_at,
            completed_at: self.completed_at,
            result: self.result,
            error: self.error.clone(),
            new_logs: new_logs.to_vec(),
        }
    }
}

/// Payload of an `update` stream event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationUpdate {
    pub status: MigrationStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<MigrationResults>,
    pub error: Option<String>,
    pub new_logs: Vec<String>,
}
