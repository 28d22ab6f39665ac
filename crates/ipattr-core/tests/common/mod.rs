//! Test doubles and common utilities for engine contract tests
//!
//! Minimal counting doubles for the classifier, region-source, and
//! resolver boundaries. Counters are shared via `Arc`, so tests keep a
//! clone of the double and inspect it after the run.

#![allow(dead_code)]

use async_trait::async_trait;
use ipattr_core::error::{Error, Result};
use ipattr_core::traits::{Classification, Classifier, RegionSource, Resolver};
use ipattr_core::Attribution;
use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Parse helper
pub fn addr(s: &str) -> IpAddr {
    s.parse().expect("valid test address")
}

/// A classifier backed by a static dataset, scoped to one region
///
/// Returns the intersection of the batch and its dataset when queried in
/// its region, and an empty map in every other region.
pub struct StaticClassifier {
    name: &'static str,
    region: String,
    records: HashMap<IpAddr, Attribution>,
    call_count: Arc<AtomicUsize>,
    regions_queried: Arc<Mutex<Vec<String>>>,
}

impl StaticClassifier {
    pub fn new(
        name: &'static str,
        region: impl Into<String>,
        records: HashMap<IpAddr, Attribution>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name,
            region: region.into(),
            records,
            call_count: Arc::new(AtomicUsize::new(0)),
            regions_queried: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn regions_queried(&self) -> Vec<String> {
        self.regions_queried.lock().unwrap().clone()
    }
}

#[async_trait]
impl Classifier for StaticClassifier {
    async fn classify(&self, region: &str, batch: &[IpAddr]) -> Result<Classification> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.regions_queried
            .lock()
            .unwrap()
            .push(region.to_string());

        if region != self.region {
            return Ok(Classification::new());
        }
        Ok(batch
            .iter()
            .filter_map(|a| self.records.get(a).map(|r| (*a, r.clone())))
            .collect())
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// A classifier whose query always (or only in one region) fails
pub struct FailingClassifier {
    name: &'static str,
    fail_region: Option<String>,
    call_count: Arc<AtomicUsize>,
}

impl FailingClassifier {
    /// Fails in every region
    pub fn always(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            fail_region: None,
            call_count: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Fails only in the given region, returns no matches elsewhere
    pub fn in_region(name: &'static str, region: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name,
            fail_region: Some(region.into()),
            call_count: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Classifier for FailingClassifier {
    async fn classify(&self, region: &str, _batch: &[IpAddr]) -> Result<Classification> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        match &self.fail_region {
            Some(fail_region) if region != fail_region => Ok(Classification::new()),
            _ => Err(Error::classifier(format!(
                "{} query refused in {region}",
                self.name
            ))),
        }
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// A region source returning a fixed list
pub struct StaticRegions {
    regions: Vec<String>,
}

impl StaticRegions {
    pub fn new(regions: &[&str]) -> Box<Self> {
        Box::new(Self {
            regions: regions.iter().map(|r| r.to_string()).collect(),
        })
    }
}

#[async_trait]
impl RegionSource for StaticRegions {
    async fn list_regions(&self) -> Result<Vec<String>> {
        Ok(self.regions.clone())
    }

    fn name(&self) -> &'static str {
        "static-regions"
    }
}

/// A region source whose enumeration always fails
pub struct FailingRegions;

impl FailingRegions {
    pub fn new() -> Box<Self> {
        Box::new(Self)
    }
}

#[async_trait]
impl RegionSource for FailingRegions {
    async fn list_regions(&self) -> Result<Vec<String>> {
        Err(Error::region_source("enumeration unavailable"))
    }

    fn name(&self) -> &'static str {
        "failing-regions"
    }
}

/// A resolver backed by a static PTR map, with per-address failure
/// injection and per-address call counting
pub struct MockResolver {
    ptr: HashMap<IpAddr, Vec<String>>,
    failing: HashSet<IpAddr>,
    reverse_calls: Arc<Mutex<HashMap<IpAddr, usize>>>,
}

impl MockResolver {
    pub fn new(ptr: HashMap<IpAddr, Vec<String>>) -> Arc<Self> {
        Arc::new(Self {
            ptr,
            failing: HashSet::new(),
            reverse_calls: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    pub fn with_failures(
        ptr: HashMap<IpAddr, Vec<String>>,
        failing: impl IntoIterator<Item = IpAddr>,
    ) -> Arc<Self> {
        Arc::new(Self {
            ptr,
            failing: failing.into_iter().collect(),
            reverse_calls: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// How many times `reverse()` was called for this address
    pub fn reverse_calls(&self, address: &IpAddr) -> usize {
        self.reverse_calls
            .lock()
            .unwrap()
            .get(address)
            .copied()
            .unwrap_or(0)
    }

    /// Total reverse lookups across all addresses
    pub fn total_reverse_calls(&self) -> usize {
        self.reverse_calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl Resolver for MockResolver {
    async fn reverse(&self, address: IpAddr) -> Result<Vec<String>> {
        *self
            .reverse_calls
            .lock()
            .unwrap()
            .entry(address)
            .or_insert(0) += 1;

        if self.failing.contains(&address) {
            return Err(Error::resolver(format!("lookup failed for {address}")));
        }
        Ok(self.ptr.get(&address).cloned().unwrap_or_default())
    }

    async fn lookup(&self, _name: &str) -> Result<Vec<IpAddr>> {
        Ok(Vec::new())
    }
}
