//! Caching Proxy - A forwarding HTTP/1.0 proxy
//!
//! Relays GET requests to origin servers and keeps small responses in a
//! fixed-size, clock-evicted cache shared by all connections.

pub mod admin;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod proxy;
pub mod server;
pub mod tasks;

pub use admin::AdminState;
pub use cache::SharedCache;
pub use config::{Cli, Config};
pub use error::{CacheError, ProxyError};
pub use tasks::spawn_stats_reporter;
