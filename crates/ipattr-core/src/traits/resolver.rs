// # Resolver Trait
//
// Defines the interface for DNS resolution, both directions:
//
// - reverse (address → PTR names): the engine's last-resort fallback for
//   addresses no classifier recognized
// - forward (name → addresses): used by name-based classifiers such as
//   the load balancer one, whose inventory only exposes DNS names
//
// ## Implementations
//
// - hickory-resolver based: `ipattr-dns` crate

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for DNS resolver implementations
///
/// Every lookup is independently fallible and slow; callers must isolate
/// failures per lookup rather than aborting a batch on the first error.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Reverse-resolve an address to its PTR names
    ///
    /// An empty vector (no PTR record) and an error are distinct but both
    /// non-fatal outcomes.
    async fn reverse(&self, address: IpAddr) -> crate::Result<Vec<String>>;

    /// Forward-resolve a hostname to its addresses
    async fn lookup(&self, name: &str) -> crate::Result<Vec<IpAddr>>;
}
