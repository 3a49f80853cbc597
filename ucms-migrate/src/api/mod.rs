//! HTTP API handlers for ucms-migrate
//!
//! Public: `/health`. Everything under `/admin` passes the admin token gate.

pub mod auth;
pub mod health;
pub mod migration;
pub mod sse;

pub use auth::admin_auth;
pub use health::health_routes;
pub use migration::migration_routes;
pub use sse::migration_event_stream;
