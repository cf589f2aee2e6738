//! Gatherly Common
//!
//! Cross-service utilities shared by the Gatherly binaries.

pub mod logging;
