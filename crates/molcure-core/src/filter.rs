//! Reference sets and cross-dataset membership filtering
//!
//! A reference set remembers only which canonical keys a dataset contains.
//! The filter answers "is this key known to any reference?" so that a target
//! dataset can be reduced to structures that are new.

use std::collections::HashSet;
use std::io::BufRead;

use crate::canonical::{CanonicalFormComputer, CanonicalKey};
use crate::error::Result;
use crate::index::DeduplicationIndex;
use crate::report::{ReferenceReport, RunCounters};
use crate::scan::{scan_records, Disposition};

/// Read-only set of canonical keys from one reference dataset
#[derive(Debug, Clone)]
pub struct ReferenceSet {
    name: String,
    keys: HashSet<CanonicalKey>,
    report: ReferenceReport,
}

impl ReferenceSet {
    /// Stream a reference dataset with the same per-line procedure used for
    /// curation and keep its key set.
    pub fn build<R, C>(
        name: &str,
        reader: R,
        canonicalizer: &C,
        header_sentinel: &str,
    ) -> Result<Self>
    where
        R: BufRead,
        C: CanonicalFormComputer + ?Sized,
    {
        let mut index = DeduplicationIndex::new();
        let mut counters = RunCounters::default();
        scan_records(
            name,
            reader,
            canonicalizer,
            header_sentinel,
            &mut counters,
            |key, record| {
                index.insert(key, &record.external_id);
                Disposition::Inserted
            },
        )?;
        counters.distinct_retained = index.size() as u64;
        tracing::info!(
            "Reference '{}': {} distinct keys from {} records ({} exceptions)",
            name,
            index.size(),
            counters.processed,
            counters.exceptions
        );
        Ok(Self::from_index(name, index, &counters))
    }

    /// Keep the key set of `index`; frequencies and ids are dropped.
    pub fn from_index(name: &str, index: DeduplicationIndex, counters: &RunCounters) -> Self {
        let report = ReferenceReport::new(name, counters, index.size());
        Self {
            name: name.to_string(),
            keys: index.into_keys().collect(),
            report,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn size(&self) -> usize {
        self.keys.len()
    }

    pub fn report(&self) -> &ReferenceReport {
        &self.report
    }
}

/// Membership test over any number of reference sets
#[derive(Debug, Clone, Default)]
pub struct CrossDatasetFilter {
    references: Vec<ReferenceSet>,
}

impl CrossDatasetFilter {
    pub fn new(references: Vec<ReferenceSet>) -> Self {
        Self { references }
    }

    /// A filter that knows nothing; every key passes.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether `key` occurs in at least one reference set
    pub fn is_known(&self, key: &str) -> bool {
        self.references.iter().any(|r| r.contains(key))
    }

    /// Name of the first reference set containing `key`
    pub fn known_by(&self, key: &str) -> Option<&str> {
        self.references
            .iter()
            .find(|r| r.contains(key))
            .map(ReferenceSet::name)
    }

    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    /// Sum of reference set sizes (keys shared between references count twice)
    pub fn total_keys(&self) -> usize {
        self.references.iter().map(ReferenceSet::size).sum()
    }

    pub fn references(&self) -> &[ReferenceSet] {
        &self.references
    }
}
