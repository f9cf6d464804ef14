//! molcure-core - Canonical-form curation of structure datasets
//!
//! Streams line-oriented structure datasets and reduces them by structural
//! identity:
//!
//! - **Flatten**: collapse stereoisomers that share a canonical key into one
//!   entry carrying the first-seen id and an occurrence count
//! - **Filter**: drop target records whose canonical key occurs in any
//!   reference dataset, then flatten what remains
//!
//! Individual bad records are counted and logged, never fatal. A run whose
//! input is missing is reported as skipped.
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//! use molcure_core::{CrossDatasetFilter, CurationPipeline, PipelineSettings, SmilesCanonicalizer};
//!
//! let pipeline = CurationPipeline::new(SmilesCanonicalizer::new(), PipelineSettings::default());
//! let input = "SMILES ID\nN[C@@H](C)C(=O)O ala1\nN[C@H](C)C(=O)O ala2\nCCO eth1\n";
//! let curated = pipeline
//!     .curate_reader("demo", Cursor::new(input), &CrossDatasetFilter::empty())
//!     .unwrap();
//!
//! assert_eq!(curated.counters.processed, 3);
//! assert_eq!(curated.index.size(), 2);
//! ```

pub mod canonical;
pub mod config;
pub mod error;
pub mod filter;
pub mod index;
pub mod output;
pub mod pipeline;
pub mod record;
pub mod report;
mod scan;

pub use canonical::{CanonicalFormComputer, CanonicalFormError, CanonicalKey};
#[cfg(feature = "smiles")]
pub use canonical::SmilesCanonicalizer;
pub use config::{CanonicalConfig, ConfigError, CurationConfig, InputConfig, OutputConfig};
pub use error::{CurationError, RecordError, RecordErrorKind, Result, UNIDENTIFIED};
pub use filter::{CrossDatasetFilter, ReferenceSet};
pub use index::{DeduplicationIndex, IndexEntry};
pub use output::write_index;
pub use pipeline::{
    Curated, CurationPipeline, CurationRequest, PipelineSettings, RunOutcome, RunState,
};
pub use record::{parse_line, Line, Record, DEFAULT_HEADER_SENTINEL};
pub use report::{ExceptionCounts, ReferenceReport, RunCounters, RunMode, RunReport};
