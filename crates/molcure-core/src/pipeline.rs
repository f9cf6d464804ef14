//! Curation pipeline
//!
//! A run moves through `NotStarted → BuildingReferences → Streaming →
//! Finalizing → Done`. Reference building only happens when the request
//! names reference datasets. A run whose declared input is absent ends in
//! `Skipped` before anything is read or written.
//!
//! Records are processed strictly in input order: the representative id
//! kept for each canonical key is the first one seen.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalFormComputer;
use crate::config::ConfigError;
use crate::error::{CurationError, Result};
use crate::filter::{CrossDatasetFilter, ReferenceSet};
use crate::index::DeduplicationIndex;
use crate::output;
use crate::record::DEFAULT_HEADER_SENTINEL;
use crate::report::{RunCounters, RunMode, RunReport};
use crate::scan::{scan_records, Disposition};

/// Lifecycle of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    NotStarted,
    BuildingReferences,
    Streaming,
    Finalizing,
    Done,
    Skipped,
}

/// Settings shared by every run of a pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Lines containing this token are treated as headers
    pub header_sentinel: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            header_sentinel: DEFAULT_HEADER_SENTINEL.to_string(),
        }
    }
}

/// One curation run: a target dataset, optional references, and where to write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurationRequest {
    pub name: String,
    pub target: PathBuf,
    #[serde(default)]
    pub references: Vec<PathBuf>,
    pub output: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<PathBuf>,
}

impl CurationRequest {
    /// Group stereoisomers of `target` without reference filtering.
    pub fn flatten(
        name: impl Into<String>,
        target: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            references: Vec::new(),
            output: output.into(),
            summary: None,
        }
    }

    /// Drop records of `target` known to any of `references`, then group.
    pub fn filter<I, P>(
        name: impl Into<String>,
        target: impl Into<PathBuf>,
        references: I,
        output: impl Into<PathBuf>,
    ) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            references: references.into_iter().map(Into::into).collect(),
            ..Self::flatten(name, target, output)
        }
    }

    pub fn with_summary(mut self, summary: impl Into<PathBuf>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn mode(&self) -> RunMode {
        if self.references.is_empty() {
            RunMode::Flatten
        } else {
            RunMode::FilterAndFlatten
        }
    }

    /// Target first, then references in declaration order
    pub fn declared_inputs(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.target.as_path())
            .chain(self.references.iter().map(PathBuf::as_path))
    }

    /// Reject requests that would overwrite one of their own inputs.
    ///
    /// Paths are compared after lexical normalization (`./a.txt` and
    /// `data/../a.txt` both name `a.txt`). Symlinks are not resolved.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::InvalidValue("run name must not be empty".to_string()));
        }
        let inputs: Vec<PathBuf> = self.declared_inputs().map(lexical_normal).collect();
        let output = lexical_normal(&self.output);
        let summary = self.summary.as_deref().map(lexical_normal);
        let overwrites_input = inputs.contains(&output)
            || summary
                .as_ref()
                .is_some_and(|summary| *summary == output || inputs.contains(summary));
        if overwrites_input {
            return Err(ConfigError::InvalidValue(format!(
                "run '{}' would overwrite one of its inputs",
                self.name
            )));
        }
        Ok(())
    }
}

/// Drop `.` components and fold `..` into a preceding normal component
fn lexical_normal(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir if matches!(parts.last(), Some(Component::Normal(_))) => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.iter().collect()
}

/// How a run ended without a fatal error
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Completed(RunReport),
    /// A declared input was absent; nothing was read or written
    Skipped { name: String, missing: PathBuf },
}

impl RunOutcome {
    pub fn report(&self) -> Option<&RunReport> {
        match self {
            RunOutcome::Completed(report) => Some(report),
            RunOutcome::Skipped { .. } => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, RunOutcome::Skipped { .. })
    }

    pub fn state(&self) -> RunState {
        match self {
            RunOutcome::Completed(report) => report.state,
            RunOutcome::Skipped { .. } => RunState::Skipped,
        }
    }
}

/// Result of streaming one target dataset
#[derive(Debug, Clone)]
pub struct Curated {
    pub index: DeduplicationIndex,
    pub counters: RunCounters,
}

/// Logs every state change of a run
struct StateTracker<'a> {
    run: &'a str,
    state: RunState,
}

impl<'a> StateTracker<'a> {
    fn new(run: &'a str) -> Self {
        Self {
            run,
            state: RunState::NotStarted,
        }
    }

    fn advance(&mut self, next: RunState) {
        tracing::debug!("Run '{}': {:?} -> {:?}", self.run, self.state, next);
        self.state = next;
    }
}

/// Drives curation runs with one canonicalizer
pub struct CurationPipeline<C> {
    canonicalizer: C,
    settings: PipelineSettings,
}

impl<C: CanonicalFormComputer> CurationPipeline<C> {
    pub fn new(canonicalizer: C, settings: PipelineSettings) -> Self {
        Self {
            canonicalizer,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn canonicalizer(&self) -> &C {
        &self.canonicalizer
    }

    /// Execute one run end to end.
    ///
    /// A missing input yields `Ok(RunOutcome::Skipped)`. Errors are returned
    /// only for unreadable inputs, unwritable outputs, and invalid requests.
    pub fn run(&self, request: &CurationRequest) -> Result<RunOutcome> {
        request.validate()?;

        let mut tracker = StateTracker::new(&request.name);
        match self.execute(request, &mut tracker) {
            Ok(report) => Ok(RunOutcome::Completed(report)),
            Err(CurationError::MissingInputFile(missing)) => {
                tracker.advance(RunState::Skipped);
                tracing::info!(
                    "Run '{}' skipped: input file not found: {}",
                    request.name,
                    missing.display()
                );
                Ok(RunOutcome::Skipped {
                    name: request.name.clone(),
                    missing,
                })
            }
            Err(error) => {
                tracing::error!(
                    "Run '{}' aborted during {:?}: {}",
                    request.name,
                    tracker.state,
                    error
                );
                Err(error)
            }
        }
    }

    fn execute(
        &self,
        request: &CurationRequest,
        tracker: &mut StateTracker<'_>,
    ) -> Result<RunReport> {
        let started_at = Utc::now();

        if let Some(missing) = request.declared_inputs().find(|path| !path.exists()) {
            return Err(CurationError::MissingInputFile(missing.to_path_buf()));
        }

        let mode = request.mode();
        tracing::info!("Run '{}' started ({})", request.name, mode);

        let filter = if request.references.is_empty() {
            CrossDatasetFilter::empty()
        } else {
            tracker.advance(RunState::BuildingReferences);
            let mut references = Vec::with_capacity(request.references.len());
            for path in &request.references {
                let reader = open_input(path)?;
                let name = path.display().to_string();
                references.push(self.build_reference_set(&name, reader)?);
            }
            CrossDatasetFilter::new(references)
        };

        tracker.advance(RunState::Streaming);
        let reader = open_input(&request.target)?;
        let source_name = request.target.display().to_string();
        let curated = self.curate_reader(&source_name, reader, &filter)?;

        tracker.advance(RunState::Finalizing);
        output::write_index_file(&request.output, &curated.index)?;

        let report = RunReport {
            name: request.name.clone(),
            mode,
            state: RunState::Done,
            counters: curated.counters,
            references: filter.references().iter().map(|r| r.report().clone()).collect(),
            output: request.output.clone(),
            started_at,
            finished_at: Utc::now(),
        };
        if let Some(summary) = &request.summary {
            output::write_summary_file(summary, &report)?;
        }

        tracker.advance(RunState::Done);
        tracing::info!("{}", report);
        Ok(report)
    }

    /// Stream a reference dataset into a membership-only set.
    pub fn build_reference_set<R: BufRead>(&self, name: &str, reader: R) -> Result<ReferenceSet> {
        ReferenceSet::build(
            name,
            reader,
            &self.canonicalizer,
            &self.settings.header_sentinel,
        )
    }

    /// Stream a target dataset, dropping keys known to `filter` and grouping the rest.
    pub fn curate_reader<R: BufRead>(
        &self,
        source_name: &str,
        reader: R,
        filter: &CrossDatasetFilter,
    ) -> Result<Curated> {
        let mut index = DeduplicationIndex::new();
        let mut counters = RunCounters::default();

        scan_records(
            source_name,
            reader,
            &self.canonicalizer,
            &self.settings.header_sentinel,
            &mut counters,
            |key, record| match filter.known_by(key.as_str()) {
                Some(reference) => {
                    tracing::debug!(
                        "{}: {} (ID: {}) is known to '{}'",
                        source_name,
                        key,
                        record.external_id,
                        reference
                    );
                    Disposition::Filtered
                }
                None => {
                    index.insert(key, &record.external_id);
                    Disposition::Inserted
                }
            },
        )?;

        counters.distinct_retained = index.size() as u64;
        Ok(Curated { index, counters })
    }
}

fn open_input(path: &Path) -> Result<BufReader<File>> {
    File::open(path).map(BufReader::new).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            CurationError::MissingInputFile(path.to_path_buf())
        } else {
            CurationError::InputRead {
                source_name: path.display().to_string(),
                source,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::{CanonicalFormError, CanonicalKey};
    use std::io::Cursor;

    type KeyFn = fn(&str) -> std::result::Result<CanonicalKey, CanonicalFormError>;

    fn pipeline() -> CurationPipeline<KeyFn> {
        fn lowercase(notation: &str) -> std::result::Result<CanonicalKey, CanonicalFormError> {
            Ok(CanonicalKey::new(notation.to_lowercase()))
        }
        CurationPipeline::new(lowercase as KeyFn, PipelineSettings::default())
    }

    #[test]
    fn test_mode_follows_references() {
        let flatten = CurationRequest::flatten("a", "in.txt", "out.txt");
        assert_eq!(flatten.mode(), RunMode::Flatten);

        let filter = CurationRequest::filter("b", "in.txt", ["ref1.txt", "ref2.txt"], "out.txt");
        assert_eq!(filter.mode(), RunMode::FilterAndFlatten);
        let inputs: Vec<&Path> = filter.declared_inputs().collect();
        assert_eq!(
            inputs,
            vec![Path::new("in.txt"), Path::new("ref1.txt"), Path::new("ref2.txt")]
        );
    }

    #[test]
    fn test_validate_rejects_overwriting_inputs() {
        assert!(CurationRequest::flatten("a", "in.txt", "in.txt").validate().is_err());
        assert!(CurationRequest::filter("a", "in.txt", ["ref.txt"], "ref.txt")
            .validate()
            .is_err());
        assert!(CurationRequest::flatten("a", "in.txt", "out.txt")
            .with_summary("in.txt")
            .validate()
            .is_err());
        assert!(CurationRequest::flatten(" ", "in.txt", "out.txt").validate().is_err());
        assert!(CurationRequest::flatten("a", "in.txt", "./in.txt").validate().is_err());
        let through_parent =
            CurationRequest::filter("a", "data/in.txt", ["data/ref.txt"], "data/../data/ref.txt");
        assert!(through_parent.validate().is_err());
        assert!(CurationRequest::flatten("a", "in.txt", "out.txt")
            .with_summary("./out.txt")
            .validate()
            .is_err());
        assert!(CurationRequest::flatten("a", "data/in.txt", "in.txt").validate().is_ok());
        assert!(CurationRequest::flatten("a", "in.txt", "out.txt")
            .with_summary("summary.txt")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_curate_reader_filters_known_keys() {
        let pipeline = pipeline();
        let reference = pipeline
            .build_reference_set("ref", Cursor::new("CCO r1\n"))
            .unwrap();
        let filter = CrossDatasetFilter::new(vec![reference]);

        let curated = pipeline
            .curate_reader("target", Cursor::new("cco t1\nCCN t2\nccn t3\n"), &filter)
            .unwrap();
        assert_eq!(curated.counters.processed, 3);
        assert_eq!(curated.counters.filtered_by_reference, 1);
        assert_eq!(curated.counters.distinct_retained, 1);
        let entry = curated.index.get("ccn").unwrap();
        assert_eq!(entry.representative_id, "t2");
        assert_eq!(entry.frequency, 2);
    }

    #[test]
    fn test_missing_input_is_skipped() {
        let request = CurationRequest::flatten(
            "missing",
            "/nonexistent/molcure/input.txt",
            "/nonexistent/molcure/output.txt",
        );
        let outcome = pipeline().run(&request).unwrap();
        assert!(outcome.is_skipped());
        assert_eq!(outcome.state(), RunState::Skipped);
        assert!(outcome.report().is_none());
    }
}
