//! Response models for the admin API
//!
//! DTOs serialized as the bodies of admin HTTP responses.

pub mod responses;

// Re-export commonly used types
pub use responses::{EntriesResponse, HealthResponse, StatsResponse};
