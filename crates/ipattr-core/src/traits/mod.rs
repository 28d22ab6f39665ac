//! Core traits for the attribution engine
//!
//! This module defines the abstract interfaces over the remote
//! collaborators:
//!
//! - [`Classifier`]: one kind of remote inventory lookup
//! - [`RegionSource`]: enumerate the regions to scan
//! - [`Resolver`]: forward and reverse DNS

pub mod classifier;
pub mod region_source;
pub mod resolver;

pub use classifier::{Classification, Classifier};
pub use region_source::RegionSource;
pub use resolver::Resolver;
