// # ipattr-core
//
// Core library for the concurrent IP attribution engine.
//
// Given a batch of IP addresses seen in logs or alerts, the engine works
// out what owns each one: an EC2 instance, an Elastic IP, a load
// balancer, or failing all of that, whatever reverse DNS says.
//
// ## Architecture Overview
//
// - **Classifier**: trait for one kind of remote inventory lookup
// - **RegionSource**: trait for enumerating the regions to scan
// - **Resolver**: trait for forward/reverse DNS
// - **AttributionEngine**: runs every classifier across every region
//   concurrently, merges first-writer-wins, falls back to reverse DNS
//
// ## Design Principles
//
// 1. **Partial-failure tolerance**: any unit may fail without taking the
//    batch with it; errors are collected as diagnostics
// 2. **Batch queries**: one remote round-trip per (region, classifier),
//    never per address
// 3. **Bounded fan-out**: concurrency proportional to regions × services,
//    with a fixed cap on DNS lookups
// 4. **Complete accounting**: every input address appears in the report
//    exactly once
// 5. **Library-first**: the binary is a thin wiring layer; everything is
//    driven through these types

pub mod config;
pub mod engine;
pub mod error;
pub mod record;
pub mod table;
pub mod traits;

// Re-export core types for convenience
pub use config::EngineConfig;
pub use engine::{AttributionEngine, EngineEvent};
pub use error::{Error, Result};
pub use record::{Attribution, AttributionKind, AttributionReport, Diagnostic, ReportEntry};
pub use table::AttributionTable;
pub use traits::{Classification, Classifier, RegionSource, Resolver};
