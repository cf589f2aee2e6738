//! Shared Module
//!
//! Cross-cutting concerns and shared utilities.

pub mod error;
pub mod indexes;

// APIs
pub mod health_api;

// Re-export commonly used items
pub use error::{PlatformError, Result};
pub use health_api::health_router;
