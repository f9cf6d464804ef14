//! Command execution and summary printing

use std::error::Error;
use std::path::{Path, PathBuf};

use molcure_core::{CurationConfig, CurationPipeline, RunOutcome, SmilesCanonicalizer};
use serde_json::json;

use crate::cli::{Cli, Command, RunArgs};

/// Completed and skipped run counts of a batch
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchTally {
    pub completed: usize,
    pub skipped: usize,
}

pub fn execute(cli: &Cli) -> Result<(), Box<dyn Error>> {
    match &cli.command {
        Command::Flatten { run } => {
            let outcome = run_single(run, &[])?;
            print_outcome(&outcome, cli.json)?;
        }
        Command::Filter { run, references } => {
            let outcome = run_single(run, references)?;
            print_outcome(&outcome, cli.json)?;
        }
        Command::Batch { config } => {
            run_batch(config, |outcome| print_outcome(outcome, cli.json))?;
        }
    }
    Ok(())
}

fn run_single(args: &RunArgs, references: &[PathBuf]) -> Result<RunOutcome, Box<dyn Error>> {
    let canonicalizer = SmilesCanonicalizer::new().with_largest_fragment(!args.keep_all_fragments);
    let pipeline = CurationPipeline::new(canonicalizer, args.settings());
    Ok(pipeline.run(&args.request(references))?)
}

/// Run every declared run in order.
///
/// Skipped runs do not stop the batch; the first fatal error does.
pub fn run_batch<F>(config_path: &Path, mut on_outcome: F) -> Result<BatchTally, Box<dyn Error>>
where
    F: FnMut(&RunOutcome) -> Result<(), Box<dyn Error>>,
{
    let config = CurationConfig::load(config_path)?;
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new(""));
    let pipeline = CurationPipeline::new(config.canonicalizer(), config.pipeline_settings());

    let mut tally = BatchTally::default();
    for request in config.requests(base_dir) {
        let outcome = pipeline.run(&request)?;
        if outcome.is_skipped() {
            tally.skipped += 1;
        } else {
            tally.completed += 1;
        }
        on_outcome(&outcome)?;
    }

    tracing::info!(
        "Batch {} finished: {} completed, {} skipped",
        config_path.display(),
        tally.completed,
        tally.skipped
    );
    Ok(tally)
}

fn print_outcome(outcome: &RunOutcome, as_json: bool) -> Result<(), Box<dyn Error>> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(&outcome_json(outcome)?)?);
        return Ok(());
    }
    match outcome {
        RunOutcome::Completed(report) => println!("{}", report),
        RunOutcome::Skipped { name, missing } => println!(
            "Run '{}' skipped: input file not found: {}",
            name,
            missing.display()
        ),
    }
    Ok(())
}

fn outcome_json(outcome: &RunOutcome) -> serde_json::Result<serde_json::Value> {
    match outcome {
        RunOutcome::Completed(report) => serde_json::to_value(report),
        RunOutcome::Skipped { name, missing } => Ok(json!({
            "name": name,
            "state": "skipped",
            "missing": missing,
        })),
    }
}
