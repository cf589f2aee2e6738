//! Event Aggregate
//!
//! Community events: schema, queries, and REST endpoints.

pub mod entity;
pub mod repository;
pub mod api;

// Re-export main types
pub use entity::{Event, OwnerClaim};
pub use repository::EventRepository;
pub use api::{events_router, EventsState};
