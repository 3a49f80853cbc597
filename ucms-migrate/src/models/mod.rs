//! Data models for ucms-migrate
//!
//! - Migration state machine types (state, events, effects, tallies)
//! - Legacy frontmatter shapes and destination records

pub mod migration_state;
pub mod content;

pub use migration_state::{
    MigrationEffect, MigrationEvent, MigrationOperation, MigrationResults, MigrationState,
    MigrationStatus, MigrationTally, MigrationUpdate,
};
pub use content::{
    ArticleFrontmatter, MemberFrontmatter, NewArticle, NewMember, NewProject, ProjectCategory,
    ProjectFrontmatter,
};
