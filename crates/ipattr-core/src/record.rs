//! Attribution data model
//!
//! An [`Attribution`] is the immutable result of a successful
//! classification. It is created once by a classifier (or by the
//! reverse-DNS fallback) and never mutated afterwards; ownership sits in
//! the engine's result table until the report is handed out.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// What kind of resource an address was attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionKind {
    /// EC2 instance (matched on public or private address)
    #[serde(rename = "ec2_instance")]
    Instance,
    /// Elastic IP allocation
    #[serde(rename = "eip")]
    ElasticIp,
    /// Load balancer (matched via its DNS name)
    #[serde(rename = "elb")]
    LoadBalancer,
    /// Nothing in any inventory; reverse DNS is all we know
    #[serde(rename = "unknown")]
    ReverseDns,
}

impl AttributionKind {
    /// Stable name used in line output and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributionKind::Instance => "ec2_instance",
            AttributionKind::ElasticIp => "eip",
            AttributionKind::LoadBalancer => "elb",
            AttributionKind::ReverseDns => "unknown",
        }
    }
}

impl std::fmt::Display for AttributionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of attributing one address to one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    /// Resource kind
    #[serde(rename = "type")]
    pub kind: AttributionKind,

    /// Region the owning resource lives in; absent for reverse-DNS results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Resource identifier (instance id, allocation id, LB ARN)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Resource name, or the PTR name for reverse-DNS results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Attribution {
    /// An EC2 instance attribution
    pub fn instance(region: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: AttributionKind::Instance,
            region: Some(region.into()),
            id: Some(id.into()),
            name: None,
        }
    }

    /// An Elastic IP attribution
    pub fn elastic_ip(region: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: AttributionKind::ElasticIp,
            region: Some(region.into()),
            id: Some(id.into()),
            name: None,
        }
    }

    /// A load balancer attribution
    pub fn load_balancer(
        region: impl Into<String>,
        id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            kind: AttributionKind::LoadBalancer,
            region: Some(region.into()),
            id: Some(id.into()),
            name: Some(name.into()),
        }
    }

    /// A reverse-DNS result; `name` is `None` when the lookup failed or
    /// returned nothing
    pub fn reverse_dns(name: Option<String>) -> Self {
        Self {
            kind: AttributionKind::ReverseDns,
            region: None,
            id: None,
            name: name.filter(|n| !n.is_empty()),
        }
    }

    /// True if this came from the reverse-DNS fallback rather than a
    /// classifier
    pub fn is_reverse_dns(&self) -> bool {
        self.kind == AttributionKind::ReverseDns
    }

    /// True if we learned nothing at all about the address
    pub fn is_bare_unknown(&self) -> bool {
        self.is_reverse_dns() && self.name.is_none()
    }
}

/// Diagnostic recorded for a failed unit of work
///
/// Unit failures are collected, never fatal: one failing query must not
/// prevent sibling units from completing or discard results already
/// gathered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Region the failing unit was scoped to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Which component failed (classifier name, "region-source", "reverse-dns")
    pub source: String,

    /// The underlying error, stringified
    pub message: String,
}

/// One address of the final report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// The input address
    pub address: IpAddr,

    /// What we learned about it
    pub attribution: Attribution,
}

/// Final output of an engine run
///
/// Entries appear in input order and account for every input address
/// exactly once: attributed, reverse-DNS-named, or explicitly unknown.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttributionReport {
    /// One entry per distinct input address, in input order
    pub entries: Vec<ReportEntry>,

    /// All unit errors observed during the run
    pub diagnostics: Vec<Diagnostic>,
}

impl AttributionReport {
    /// Look up the attribution for an address
    pub fn get(&self, address: &IpAddr) -> Option<&Attribution> {
        self.entries
            .iter()
            .find(|e| e.address == *address)
            .map(|e| &e.attribution)
    }

    /// Number of addresses attributed by a classifier
    pub fn attributed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| !e.attribution.is_reverse_dns())
            .count()
    }

    /// Number of addresses about which nothing could be learned
    pub fn bare_unknown_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.attribution.is_bare_unknown())
            .count()
    }
}
