//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{SlotInfo, StatsSnapshot};

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of successful inserts
    pub inserts: u64,
    /// Number of inserts that overwrote an occupied slot
    pub evictions: u64,
    /// Responses too large to cache
    pub rejected: u64,
    /// Current number of occupied slots
    pub total_entries: usize,
    /// Slot count
    pub capacity: usize,
    /// Largest cacheable response, exclusive
    pub max_object_size: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from a cache statistics snapshot
    pub fn new(stats: &StatsSnapshot, max_object_size: usize) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            inserts: stats.inserts,
            evictions: stats.evictions,
            rejected: stats.rejected,
            total_entries: stats.total_entries,
            capacity: stats.capacity,
            max_object_size,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the cache listing endpoint (GET /cache)
#[derive(Debug, Clone, Serialize)]
pub struct EntriesResponse {
    /// Slot the next eviction sweep starts from
    pub cursor: usize,
    /// Occupied slots in index order
    pub entries: Vec<SlotInfo>,
}

impl EntriesResponse {
    pub fn new(cursor: usize, entries: Vec<SlotInfo>) -> Self {
        Self { cursor, entries }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_response_hit_rate() {
        let stats = StatsSnapshot {
            hits: 80,
            misses: 20,
            capacity: 10,
            ..StatsSnapshot::default()
        };
        let resp = StatsResponse::new(&stats, 102_400);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.max_object_size, 102_400);
    }

    #[test]
    fn test_stats_response_zero_requests() {
        let resp = StatsResponse::new(&StatsSnapshot::default(), 1);
        assert_eq!(resp.hit_rate, 0.0);
    }

    #[test]
    fn test_entries_response_serialize() {
        let resp = EntriesResponse::new(
            3,
            vec![SlotInfo {
                slot: 0,
                url: "http://origin/page".to_string(),
                size: 42,
                used: true,
            }],
        );
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["cursor"], 3);
        assert_eq!(json["entries"][0]["url"], "http://origin/page");
        assert_eq!(json["entries"][0]["size"], 42);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
