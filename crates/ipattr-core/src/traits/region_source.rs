// # Region Source Trait
//
// Defines the interface for enumerating the regions to scan.

use async_trait::async_trait;

/// Trait for region enumeration
///
/// Produced once per run and consumed read-only by every classifier
/// invocation. Enumeration failure is never fatal: the engine substitutes
/// its configured fallback set and continues, at the cost of possibly
/// under-scanning.
#[async_trait]
pub trait RegionSource: Send + Sync {
    /// List the live regions
    async fn list_regions(&self) -> crate::Result<Vec<String>>;

    /// Short name for logs and diagnostics
    fn name(&self) -> &'static str;
}
