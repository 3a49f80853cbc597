//! # UCMS Common Library
//!
//! Shared code for UCMS services including:
//! - Error types
//! - Configuration file and data folder resolution
//! - Bearer-token authorization helpers
//! - Server-Sent Events helpers

pub mod api;
pub mod config;
pub mod error;
pub mod sse;

pub use error::{Error, Result};
