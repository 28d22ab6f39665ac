// # Classifier Trait
//
// Defines the interface for one kind of remote inventory lookup.
//
// ## Implementations
//
// - AWS (instances, Elastic IPs, load balancers): `ipattr-aws` crate
// - Future: other cloud providers, CMDB lookups, etc.
//
// ## Usage
//
// ```rust,ignore
// use ipattr_core::Classifier;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let classifier = /* Classifier implementation */;
//
//     let batch = vec!["54.1.2.3".parse()?];
//     let matches = classifier.classify("us-east-1", &batch).await?;
//
//     for (address, attribution) in matches {
//         println!("{address} -> {}", attribution.kind);
//     }
//     Ok(())
// }
// ```

use crate::record::Attribution;
use async_trait::async_trait;
use std::collections::HashMap;
use std::net::IpAddr;

/// Partial result of one classification query: the subset of the batch
/// this source could attribute
pub type Classification = HashMap<IpAddr, Attribution>;

/// Trait for classifier implementations
///
/// A classifier performs one remote query per invocation, against the
/// *entire* batch of target addresses, and returns attributions for
/// whatever subset it recognizes. Returning an empty map and returning an
/// error are both normal, expected outcomes; the engine records errors as
/// diagnostics and moves on.
///
/// # Thread Safety
///
/// Implementations must be safe to invoke concurrently with every other
/// classifier instance. The batch is the only shared input and it is
/// read-only; classifiers must not share mutable state between
/// invocations.
///
/// # Responsibilities
///
/// - Query with the whole batch in one remote round-trip, not per address
/// - Tag every record produced with its own kind and the queried region
/// - Never block indefinitely (put a timeout on the remote call)
/// - Never retry: the engine runs each (region, classifier) unit once
///
/// Coordination — which regions to query, merging, de-duplication, the
/// reverse-DNS fallback — is owned by the engine, not by classifiers.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Query one region for attributions of the given batch
    ///
    /// # Parameters
    ///
    /// - `region`: the region to query
    /// - `batch`: every input address still of interest, read-only
    ///
    /// # Returns
    ///
    /// - `Ok(classification)`: zero or more (address → attribution) pairs;
    ///   an empty map means "nothing of mine here", not an error
    /// - `Err(Error)`: the query itself failed; the engine records it as a
    ///   diagnostic and continues with sibling units
    async fn classify(&self, region: &str, batch: &[IpAddr]) -> crate::Result<Classification>;

    /// Short name for logs and diagnostics (e.g. "public-instance")
    fn name(&self) -> &'static str;
}
