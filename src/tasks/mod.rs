//! Background Tasks Module
//!
//! Contains background tasks that run periodically during proxy operation.
//!
//! # Tasks
//! - Stats reporter: Logs cache statistics at configured intervals

mod reporter;

pub use reporter::spawn_stats_reporter;
