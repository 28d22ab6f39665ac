//! Core attribution engine
//!
//! The AttributionEngine is responsible for:
//! - Enumerating regions via RegionSource (with a fallback set)
//! - Running every Classifier against every region concurrently
//! - Merging results first-writer-wins into the attribution table
//! - Reverse-resolving whatever no classifier recognized
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐
//! │ RegionSource │── regions ──┐
//! └──────────────┘             │
//!                              ▼
//!                    ┌───────────────────┐
//!                    │ AttributionEngine │
//!                    └───────────────────┘
//!                              │ one unit per (region × classifier)
//!         ┌────────────────────┼────────────────────┐
//!         ▼                    ▼                    ▼
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Classifier A │ ... │ Classifier D │     │   Resolver   │
//! │  (region r)  │     │  (region r)  │     │  (fallback)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! ## Run Flow
//!
//! 1. Enumerate regions (failure → configured fallback set)
//! 2. Dispatch all (region × classifier) units, each with the whole batch
//! 3. Merge results as units finish; first writer wins per address
//! 4. Wait for every unit to terminate, success or failure
//! 5. Reverse-DNS the still-pending addresses, one lookup each
//! 6. Emit a report covering every input address exactly once
//!
//! A failing unit is recorded as a diagnostic and never cancels sibling
//! units or discards results already gathered.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::record::{Attribution, AttributionKind, AttributionReport, Diagnostic, ReportEntry};
use crate::table::AttributionTable;
use crate::traits::{Classification, Classifier, RegionSource, Resolver};
use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Events emitted by the AttributionEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Run started; all units dispatched
    Started {
        addresses: usize,
        regions: usize,
        units: usize,
    },

    /// One (region, classifier) unit finished its query
    UnitCompleted {
        region: String,
        classifier: &'static str,
        matched: usize,
    },

    /// One (region, classifier) unit failed; siblings keep running
    UnitFailed {
        region: String,
        classifier: &'static str,
        error: String,
    },

    /// An address got its winning attribution
    Attributed {
        address: IpAddr,
        kind: AttributionKind,
    },

    /// A second source resolved an already-attributed address; discarded
    DuplicateDiscarded {
        address: IpAddr,
        kind: AttributionKind,
    },

    /// Reverse-DNS pass started for unresolved addresses
    FallbackStarted { pending: usize },

    /// Run finished
    Finished {
        attributed: usize,
        reverse_dns: usize,
        diagnostics: usize,
    },
}

/// Core attribution engine
///
/// The engine orchestrates the entire classify → merge → fallback flow
/// for one batch of addresses. A run is one pass: no retries, no resume,
/// no state carried between runs.
///
/// ## Concurrency
///
/// One concurrent unit per (region × classifier) pair, so the fan-out is
/// proportional to regions × services, not to input size. Merging happens
/// at the join point, serializing all table writes on the engine task;
/// [`AttributionTable::insert_first`] makes the first-writer-wins policy
/// explicit. Which source wins when two units resolve the same address is
/// non-deterministic by design.
///
/// ## Partial-failure tolerance
///
/// The defining property of this engine: every launched unit runs to
/// termination, failures are collected as diagnostics, and the result is
/// always "best-effort table + diagnostics", never "nothing because one
/// part failed".
pub struct AttributionEngine {
    /// Classifier set, one remote inventory each
    classifiers: Vec<Arc<dyn Classifier>>,

    /// Region enumeration
    region_source: Box<dyn RegionSource>,

    /// DNS resolver for the reverse fallback
    resolver: Arc<dyn Resolver>,

    /// Engine settings
    config: EngineConfig,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl AttributionEngine {
    /// Create a new attribution engine
    ///
    /// # Parameters
    ///
    /// - `classifiers`: classifier implementations, queried per region
    /// - `region_source`: region enumeration implementation
    /// - `resolver`: DNS resolver for the reverse fallback
    /// - `config`: engine configuration
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields
    /// engine events
    pub fn new(
        classifiers: Vec<Arc<dyn Classifier>>,
        region_source: Box<dyn RegionSource>,
        resolver: Arc<dyn Resolver>,
        config: EngineConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let engine = Self {
            classifiers,
            region_source,
            resolver,
            config,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Attribute a batch of addresses
    ///
    /// Does not return until every launched unit has terminated and every
    /// unresolved address has been through the reverse-DNS fallback. The
    /// report accounts for each distinct input address exactly once, in
    /// input order; duplicates in the batch are collapsed before dispatch.
    ///
    /// An empty batch is a valid no-op producing an empty report.
    pub async fn resolve(&self, batch: &[IpAddr]) -> Result<AttributionReport> {
        let input = dedupe(batch);
        if input.is_empty() {
            debug!("empty batch, nothing to do");
            return Ok(AttributionReport::default());
        }

        let mut diagnostics = Vec::new();
        let regions = self.scan_regions(&mut diagnostics).await;

        let mut table = AttributionTable::new();
        self.run_classifiers(&input, &regions, &mut table, &mut diagnostics)
            .await;

        let pending: Vec<IpAddr> = input
            .iter()
            .copied()
            .filter(|a| !table.contains(a))
            .collect();
        self.emit_event(EngineEvent::FallbackStarted {
            pending: pending.len(),
        });
        if !pending.is_empty() {
            info!(pending = pending.len(), "reverse-resolving unattributed addresses");
            self.reverse_pass(&pending, &mut table, &mut diagnostics)
                .await;
        }

        let entries: Vec<ReportEntry> = input
            .iter()
            .map(|&address| ReportEntry {
                address,
                // Every pending address was given a reverse-DNS record
                // above; this default only covers a panicked lookup task.
                attribution: table
                    .take(&address)
                    .unwrap_or_else(|| Attribution::reverse_dns(None)),
            })
            .collect();

        let attributed = entries
            .iter()
            .filter(|e| !e.attribution.is_reverse_dns())
            .count();
        self.emit_event(EngineEvent::Finished {
            attributed,
            reverse_dns: entries.len() - attributed,
            diagnostics: diagnostics.len(),
        });
        info!(
            addresses = entries.len(),
            attributed,
            diagnostics = diagnostics.len(),
            "attribution run finished"
        );

        Ok(AttributionReport {
            entries,
            diagnostics,
        })
    }

    /// Enumerate regions, substituting the fallback set on failure
    async fn scan_regions(&self, diagnostics: &mut Vec<Diagnostic>) -> Vec<String> {
        match self.region_source.list_regions().await {
            Ok(regions) if !regions.is_empty() => {
                debug!(count = regions.len(), "enumerated regions");
                regions
            }
            Ok(_) => {
                self.transient(format!(
                    "{} returned no regions, using fallback set",
                    self.region_source.name()
                ));
                diagnostics.push(Diagnostic {
                    region: None,
                    source: self.region_source.name().to_string(),
                    message: "region enumeration returned no regions".to_string(),
                });
                self.config.fallback_regions.clone()
            }
            Err(e) => {
                self.transient(format!(
                    "region enumeration failed ({e}), using fallback set"
                ));
                diagnostics.push(Diagnostic {
                    region: None,
                    source: self.region_source.name().to_string(),
                    message: e.to_string(),
                });
                self.config.fallback_regions.clone()
            }
        }
    }

    /// Dispatch one unit per (region × classifier) pair and merge results
    /// as they arrive
    async fn run_classifiers(
        &self,
        input: &[IpAddr],
        regions: &[String],
        table: &mut AttributionTable,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let batch: Arc<[IpAddr]> = input.into();
        let input_set: HashSet<IpAddr> = input.iter().copied().collect();

        let mut units: JoinSet<(String, &'static str, Result<Classification>)> = JoinSet::new();
        for region in regions {
            for classifier in &self.classifiers {
                let classifier = Arc::clone(classifier);
                let region = region.clone();
                let batch = Arc::clone(&batch);
                units.spawn(async move {
                    let outcome = classifier.classify(&region, &batch).await;
                    (region, classifier.name(), outcome)
                });
            }
        }

        self.emit_event(EngineEvent::Started {
            addresses: input.len(),
            regions: regions.len(),
            units: units.len(),
        });
        info!(
            addresses = input.len(),
            regions = regions.len(),
            units = units.len(),
            "dispatched classification units"
        );

        // All table writes happen here, serialized at the join point.
        while let Some(joined) = units.join_next().await {
            match joined {
                Ok((region, classifier, Ok(classification))) => {
                    let matched = classification.len();
                    for (address, attribution) in classification {
                        if !input_set.contains(&address) {
                            debug!(%address, classifier, "discarding record outside the batch");
                            continue;
                        }
                        let kind = attribution.kind;
                        if table.insert_first(address, attribution) {
                            debug!(%address, %kind, %region, "attributed");
                            self.emit_event(EngineEvent::Attributed { address, kind });
                        } else {
                            debug!(%address, %kind, %region, "already attributed, record discarded");
                            self.emit_event(EngineEvent::DuplicateDiscarded { address, kind });
                        }
                    }
                    self.emit_event(EngineEvent::UnitCompleted {
                        region,
                        classifier,
                        matched,
                    });
                }
                Ok((region, classifier, Err(e))) => {
                    self.transient(format!("{classifier} failed in {region}: {e}"));
                    self.emit_event(EngineEvent::UnitFailed {
                        region: region.clone(),
                        classifier,
                        error: e.to_string(),
                    });
                    diagnostics.push(Diagnostic {
                        region: Some(region),
                        source: classifier.to_string(),
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    warn!("classification unit panicked: {e}");
                    diagnostics.push(Diagnostic {
                        region: None,
                        source: "engine".to_string(),
                        message: format!("classification unit panicked: {e}"),
                    });
                }
            }
        }
    }

    /// Reverse-resolve pending addresses, one lookup each, capped by the
    /// configured worker count
    ///
    /// A failed lookup yields an explicit empty reverse-DNS record; no
    /// address is ever dropped and no failure aborts the pass.
    async fn reverse_pass(
        &self,
        pending: &[IpAddr],
        table: &mut AttributionTable,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let semaphore = Arc::new(Semaphore::new(self.config.dns_workers));
        let mut lookups: JoinSet<(IpAddr, Result<Vec<String>>)> = JoinSet::new();

        for &address in pending {
            let resolver = Arc::clone(&self.resolver);
            let semaphore = Arc::clone(&semaphore);
            lookups.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("semaphore never closed");
                (address, resolver.reverse(address).await)
            });
        }

        while let Some(joined) = lookups.join_next().await {
            match joined {
                Ok((address, Ok(names))) => {
                    let ptr = names.into_iter().next();
                    debug!(%address, ptr = ptr.as_deref().unwrap_or(""), "reverse lookup");
                    table.insert_first(address, Attribution::reverse_dns(ptr));
                }
                Ok((address, Err(e))) => {
                    self.transient(format!("reverse lookup for {address} failed: {e}"));
                    diagnostics.push(Diagnostic {
                        region: None,
                        source: "reverse-dns".to_string(),
                        message: format!("{address}: {e}"),
                    });
                    table.insert_first(address, Attribution::reverse_dns(None));
                }
                Err(e) => {
                    warn!("reverse lookup task panicked: {e}");
                    diagnostics.push(Diagnostic {
                        region: None,
                        source: "reverse-dns".to_string(),
                        message: format!("lookup task panicked: {e}"),
                    });
                }
            }
        }
    }

    /// Log a transient, non-fatal failure at the level the caller asked for
    fn transient(&self, message: String) {
        if self.config.verbose {
            warn!("{message}");
        } else {
            debug!("{message}");
        }
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        // Non-blocking: a slow or absent consumer must not stall the run.
        if self.event_tx.try_send(event).is_err() {
            warn!("event channel full, dropping event");
        }
    }
}

/// Collapse duplicate input addresses, preserving first-seen order
fn dedupe(batch: &[IpAddr]) -> Vec<IpAddr> {
    let mut seen = HashSet::new();
    batch
        .iter()
        .copied()
        .filter(|a| seen.insert(*a))
        .collect()
}
