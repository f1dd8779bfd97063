//! Admin Module
//!
//! Read-only HTTP API for inspecting the proxy's cache.
//!
//! # Endpoints
//! - `GET /stats` - Cache statistics
//! - `GET /cache` - Occupied cache slots
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
