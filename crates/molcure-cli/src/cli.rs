//! Command-line arguments

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use molcure_core::{CurationRequest, PipelineSettings, DEFAULT_HEADER_SENTINEL};

/// Stereoisomer grouping and cross-dataset curation of structure datasets
#[derive(Parser, Debug)]
#[command(name = "molcure", author, version, about, long_about = None)]
pub struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Write log lines to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Print run summaries as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Group stereoisomers of one dataset
    Flatten {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Drop records known to reference datasets, then group the rest
    Filter {
        #[command(flatten)]
        run: RunArgs,

        /// Reference dataset (repeat for several)
        #[arg(short, long = "reference", required = true)]
        references: Vec<PathBuf>,
    },

    /// Execute the runs declared in a configuration file, in order
    Batch {
        /// TOML (or .json) configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Options shared by single-run commands
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Dataset to curate
    pub target: PathBuf,

    /// Curated output file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Also write the run summary to this file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Run name for logs and summaries (default: target file stem)
    #[arg(long)]
    pub name: Option<String>,

    /// Lines containing this token are skipped as headers
    #[arg(long, default_value = DEFAULT_HEADER_SENTINEL)]
    pub header_sentinel: String,

    /// Reject multi-fragment structures instead of keeping the largest fragment
    #[arg(long)]
    pub keep_all_fragments: bool,
}

impl RunArgs {
    pub fn request(&self, references: &[PathBuf]) -> CurationRequest {
        let name = self
            .name
            .clone()
            .unwrap_or_else(|| default_run_name(&self.target));
        let mut request =
            CurationRequest::filter(name, &self.target, references.iter(), &self.output);
        request.summary = self.summary.clone();
        request
    }

    pub fn settings(&self) -> PipelineSettings {
        PipelineSettings {
            header_sentinel: self.header_sentinel.clone(),
        }
    }
}

fn default_run_name(target: &Path) -> String {
    target
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "run".to_string())
}
