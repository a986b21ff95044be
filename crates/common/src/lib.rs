//! Airport Booking Common Library
//!
//! Shared code for the booking services including:
//! - Database models, write payloads and the repository
//! - Seat allocation and the order transaction
//! - Read-model projection of entities per operation
//! - Error types and handling
//! - Configuration management
//! - Authentication utilities
//! - Media storage
//! - Metrics and observability

pub mod auth;
pub mod booking;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod pagination;
pub mod projection;
pub mod storage;
pub mod timestamp;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::{DbPool, Repository};
pub use errors::{AppError, Result};
pub use projection::{Project, ViewShape};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
