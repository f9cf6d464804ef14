//! Run counters and human-readable run summaries

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RecordErrorKind;
use crate::pipeline::RunState;

/// Operating mode of a curation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Group stereoisomers of a single dataset
    Flatten,
    /// Drop records known to reference datasets, then group
    FilterAndFlatten,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Flatten => write!(f, "flatten"),
            RunMode::FilterAndFlatten => write!(f, "filter and flatten"),
        }
    }
}

/// Recovered exceptions broken down by kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionCounts {
    pub malformed: u64,
    pub parse: u64,
    pub canonicalization: u64,
}

/// Counters for one pass over a dataset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounters {
    /// Records read, including those that failed (blank and header lines excluded)
    pub processed: u64,
    pub exceptions: u64,
    pub filtered_by_reference: u64,
    pub distinct_retained: u64,
    pub headers_skipped: u64,
    pub exception_kinds: ExceptionCounts,
}

impl RunCounters {
    pub(crate) fn record_exception(&mut self, kind: RecordErrorKind) {
        self.exceptions += 1;
        match kind {
            RecordErrorKind::Malformed => self.exception_kinds.malformed += 1,
            RecordErrorKind::Parse => self.exception_kinds.parse += 1,
            RecordErrorKind::Canonicalization => self.exception_kinds.canonicalization += 1,
        }
    }

    /// Records that reached the deduplication index
    pub fn inserted(&self) -> u64 {
        self.processed
            .saturating_sub(self.exceptions)
            .saturating_sub(self.filtered_by_reference)
    }

    /// Distinct entries as a share of processed records, in percent
    pub fn retained_percent(&self) -> f64 {
        percent(self.distinct_retained, self.processed)
    }

    pub fn exception_percent(&self) -> f64 {
        percent(self.exceptions, self.processed)
    }

    pub fn filtered_percent(&self) -> f64 {
        percent(self.filtered_by_reference, self.processed)
    }
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// Statistics of one reference set build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceReport {
    pub name: String,
    pub processed: u64,
    pub exceptions: u64,
    pub headers_skipped: u64,
    pub distinct_keys: u64,
}

impl ReferenceReport {
    pub(crate) fn new(name: &str, counters: &RunCounters, distinct_keys: usize) -> Self {
        Self {
            name: name.to_string(),
            processed: counters.processed,
            exceptions: counters.exceptions,
            headers_skipped: counters.headers_skipped,
            distinct_keys: distinct_keys as u64,
        }
    }
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub name: String,
    pub mode: RunMode,
    pub state: RunState,
    pub counters: RunCounters,
    pub references: Vec<ReferenceReport>,
    pub output: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.counters;
        writeln!(
            f,
            "Run '{}' ({}) finished in {:.3} s",
            self.name,
            self.mode,
            self.elapsed_ms() as f64 / 1000.0
        )?;
        writeln!(f, "  Records processed:      {}", c.processed)?;
        writeln!(
            f,
            "  Exceptions:             {} ({:.2} %) [malformed {}, parse {}, canonicalization {}]",
            c.exceptions,
            c.exception_percent(),
            c.exception_kinds.malformed,
            c.exception_kinds.parse,
            c.exception_kinds.canonicalization
        )?;
        if self.mode == RunMode::FilterAndFlatten {
            writeln!(
                f,
                "  Filtered by reference:  {} ({:.2} %)",
                c.filtered_by_reference,
                c.filtered_percent()
            )?;
        }
        writeln!(
            f,
            "  Distinct entries:       {} ({:.2} % of processed)",
            c.distinct_retained,
            c.retained_percent()
        )?;
        writeln!(f, "  Header lines skipped:   {}", c.headers_skipped)?;
        for reference in &self.references {
            writeln!(
                f,
                "  Reference '{}': {} processed, {} exceptions, {} distinct keys",
                reference.name, reference.processed, reference.exceptions, reference.distinct_keys
            )?;
        }
        write!(f, "  Output: {}", self.output.display())
    }
}
