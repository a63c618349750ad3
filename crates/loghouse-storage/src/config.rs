//! Storage Configuration
//!
//! This module defines configuration for the log engine.
//!
//! ## SegmentConfig
//!
//! Controls when the active segment rolls and how large index arenas are:
//!
//! - **max_store_bytes**: roll the segment when its store reaches this size
//!   (default: 1024)
//! - **max_index_bytes**: roll the segment when its index reaches this size;
//!   also the length the index file is pre-grown to before memory-mapping
//!   (default: 1024)
//! - **initial_offset**: base offset of the first segment when the log
//!   starts empty (default: 0)
//!
//! Small payloads hit the index threshold first; large payloads hit the
//! store threshold first. Either one triggers rollover.
//!
//! ## Usage
//!
//! ```ignore
//! use loghouse_storage::{LogConfig, SegmentConfig};
//!
//! // Production config
//! let config = LogConfig {
//!     segment: SegmentConfig {
//!         max_store_bytes: 64 * 1024 * 1024,
//!         max_index_bytes: 8 * 1024 * 1024,
//!         ..Default::default()
//!     },
//! };
//!
//! // Test config (tiny segments to exercise rollover)
//! let config = LogConfig {
//!     segment: SegmentConfig {
//!         max_store_bytes: 1024,
//!         max_index_bytes: 36, // three entries per segment
//!         initial_offset: 0,
//!     },
//! };
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// Segment sizing and placement
    #[serde(default)]
    pub segment: SegmentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentConfig {
    /// Maximum store file size in bytes before rolling (default: 1024)
    #[serde(default = "default_max_store_bytes")]
    pub max_store_bytes: u64,

    /// Maximum index size in bytes before rolling; also the pre-grown
    /// memory-map length (default: 1024)
    #[serde(default = "default_max_index_bytes")]
    pub max_index_bytes: u64,

    /// Base offset of the first segment when the log starts empty
    /// (default: 0)
    #[serde(default = "default_initial_offset")]
    pub initial_offset: u64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            max_store_bytes: default_max_store_bytes(),
            max_index_bytes: default_max_index_bytes(),
            initial_offset: default_initial_offset(),
        }
    }
}

fn default_max_store_bytes() -> u64 {
    1024
}

fn default_max_index_bytes() -> u64 {
    1024
}

fn default_initial_offset() -> u64 {
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---------------------------------------------------------------
    // Defaults
    // ---------------------------------------------------------------

    #[test]
    fn test_default_values() {
        let config = LogConfig::default();
        assert_eq!(config.segment.max_store_bytes, 1024);
        assert_eq!(config.segment.max_index_bytes, 1024);
        assert_eq!(config.segment.initial_offset, 0);
    }

    // ---------------------------------------------------------------
    // Serde
    // ---------------------------------------------------------------

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: LogConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.segment.max_store_bytes, 1024);
        assert_eq!(config.segment.max_index_bytes, 1024);
        assert_eq!(config.segment.initial_offset, 0);
    }

    #[test]
    fn test_partial_json_fills_missing_fields() {
        let config: LogConfig =
            serde_json::from_str(r#"{"segment":{"max_store_bytes":4096}}"#).unwrap();
        assert_eq!(config.segment.max_store_bytes, 4096);
        assert_eq!(config.segment.max_index_bytes, 1024);
        assert_eq!(config.segment.initial_offset, 0);
    }

    #[test]
    fn test_roundtrip() {
        let config = LogConfig {
            segment: SegmentConfig {
                max_store_bytes: 32,
                max_index_bytes: 36,
                initial_offset: 7,
            },
        };
        let json = serde_json::to_string(&config).unwrap();
        let decoded: LogConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.segment.max_store_bytes, 32);
        assert_eq!(decoded.segment.max_index_bytes, 36);
        assert_eq!(decoded.segment.initial_offset, 7);
    }
}
