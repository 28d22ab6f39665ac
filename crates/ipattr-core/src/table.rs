//! Shared result table with first-writer-wins insertion
//!
//! The same address can legitimately show up in more than one service's
//! inventory (an instance's public IP is also returned by the Elastic IP
//! query). The table resolves that race with an explicit insert-if-absent:
//! the first record recorded for an address is kept, later records for the
//! same address are discarded. Which source wins under a race is
//! intentionally unspecified; that exactly one record survives is not.

use crate::record::Attribution;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::net::IpAddr;

/// Address → attribution mapping built incrementally during a run
#[derive(Debug, Default)]
pub struct AttributionTable {
    records: HashMap<IpAddr, Attribution>,
}

impl AttributionTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert if no record exists for `address` yet
    ///
    /// Returns `true` if the record was stored, `false` if the address
    /// already had a winner and the new record was discarded.
    pub fn insert_first(&mut self, address: IpAddr, attribution: Attribution) -> bool {
        match self.records.entry(address) {
            Entry::Vacant(slot) => {
                slot.insert(attribution);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Whether a record exists for the address
    pub fn contains(&self, address: &IpAddr) -> bool {
        self.records.contains_key(address)
    }

    /// Get the record for an address, if resolved
    pub fn get(&self, address: &IpAddr) -> Option<&Attribution> {
        self.records.get(address)
    }

    /// Number of resolved addresses
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if nothing has been resolved yet
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Remove and return the record for an address
    pub fn take(&mut self, address: &IpAddr) -> Option<Attribution> {
        self.records.remove(address)
    }
}
