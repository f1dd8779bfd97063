//! Configuration Module
//!
//! Command-line arguments plus tunables loaded from environment variables.

use std::env;

use clap::Parser;

use crate::cache::{MAX_CACHE_ENTRIES, MAX_OBJECT_SIZE};

// == Command Line ==
/// Forwarding HTTP/1.0 proxy with a small response cache.
///
/// Argument errors print usage to stderr and exit with status 2.
#[derive(Debug, Parser)]
#[command(name = "caching_proxy", version, about, long_about = None)]
pub struct Cli {
    /// Port to listen on
    pub port: u16,
}

/// Proxy configuration parameters.
///
/// Everything except the listening port can be tuned via environment
/// variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Proxy listening port
    pub listen_port: u16,
    /// Responses of this many bytes or more are not cached
    pub max_object_size: usize,
    /// Number of cache slots
    pub max_cache_entries: usize,
    /// Port of the admin HTTP API, disabled when None
    pub admin_port: Option<u16>,
    /// Seconds between cache statistics log lines, 0 disables
    pub stats_interval: u64,
}

impl Config {
    /// Builds the configuration for a proxy listening on `listen_port`,
    /// reading the remaining values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_OBJECT_SIZE` - Per-response cache cap in bytes (default: 102400)
    /// - `MAX_CACHE_ENTRIES` - Cache slot count (default: 10)
    /// - `ADMIN_PORT` - Admin API port (default: disabled)
    /// - `STATS_INTERVAL` - Stats log interval in seconds (default: 0, off)
    ///
    /// Zero or unparsable sizes fall back to their defaults.
    pub fn from_env(listen_port: u16) -> Self {
        Self {
            listen_port,
            max_object_size: positive_var("MAX_OBJECT_SIZE").unwrap_or(MAX_OBJECT_SIZE),
            max_cache_entries: positive_var("MAX_CACHE_ENTRIES").unwrap_or(MAX_CACHE_ENTRIES),
            admin_port: env::var("ADMIN_PORT").ok().and_then(|v| v.parse().ok()),
            stats_interval: env::var("STATS_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
        }
    }

    pub fn from_cli(cli: &Cli) -> Self {
        Self::from_env(cli.port)
    }
}

fn positive_var(name: &str) -> Option<usize> {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|&v| v > 0)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_port: 8080,
            max_object_size: MAX_OBJECT_SIZE,
            max_cache_entries: MAX_CACHE_ENTRIES,
            admin_port: None,
            stats_interval: 0,
        }
    }
}
