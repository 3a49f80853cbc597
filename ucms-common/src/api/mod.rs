//! API module for shared HTTP API functionality
//!
//! This module contains ONLY pure functions and shared types. Each service
//! wraps them with framework-specific middleware (Axum, etc.).

pub mod auth;

pub use auth::{bearer_token, verify_admin_token, AuthError};
