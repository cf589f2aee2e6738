//! Gatherly Platform
//!
//! Event store access layer for the community-events platform:
//! - Event document schema (owner identity, membership set, schema-flexible
//!   extra fields)
//! - Visibility and membership queries (upcoming, latest, search, joined,
//!   managed)
//! - Mutations (create, join, update, delete) against one collection
//!
//! ## Module Organization (Aggregate-based)
//!
//! Each aggregate contains:
//! - `entity` - Domain entities
//! - `repository` - Data access
//! - `api` - REST endpoints

pub mod event;

// Shared infrastructure
pub mod shared;

// Re-export common types from shared
pub use shared::error::{PlatformError, Result};

// Re-export main entity types for convenience
pub use event::entity::{Event, OwnerClaim};

// Re-export repositories
pub use event::repository::EventRepository;

// Re-export API surface
pub use event::api::{events_router, EventsState};
