//! Configuration types for the attribution engine

use serde::{Deserialize, Serialize};

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Regions to scan when region enumeration fails
    ///
    /// Region enumeration failure is never fatal; it only risks
    /// under-scanning. This set must contain at least two regions.
    #[serde(default = "default_fallback_regions")]
    pub fallback_regions: Vec<String>,

    /// Maximum number of concurrent DNS lookups during the reverse-DNS
    /// fallback pass
    ///
    /// The pending set is bounded by input size, so this caps the DNS
    /// fan-out rather than the classifier fan-out (which is bounded by
    /// regions × classifiers).
    #[serde(default = "default_dns_workers")]
    pub dns_workers: usize,

    /// Capacity of the internal event channel
    ///
    /// When full, new engine events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// Log transient per-unit query failures at `warn` instead of `debug`
    ///
    /// Passed explicitly rather than read from process-wide state so the
    /// engine stays independently testable.
    #[serde(default)]
    pub verbose: bool,
}

impl EngineConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self {
            fallback_regions: default_fallback_regions(),
            dns_workers: default_dns_workers(),
            event_channel_capacity: default_event_channel_capacity(),
            verbose: false,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.fallback_regions.len() < 2 {
            return Err(crate::Error::config(
                "at least two fallback regions are required",
            ));
        }
        if self.fallback_regions.iter().any(|r| r.is_empty()) {
            return Err(crate::Error::config("fallback region names cannot be empty"));
        }
        if self.dns_workers == 0 {
            return Err(crate::Error::config("dns_workers must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("event_channel_capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_fallback_regions() -> Vec<String> {
    vec!["us-east-1".to_string(), "us-west-1".to_string()]
}

fn default_dns_workers() -> usize {
    8
}

fn default_event_channel_capacity() -> usize {
    1000
}
