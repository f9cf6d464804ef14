//! Curated dataset and summary files

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::{CurationError, Result};
use crate::index::DeduplicationIndex;
use crate::report::RunReport;

/// Write one `<key> <representative id> <frequency>` line per index entry.
pub fn write_index<W: Write>(writer: W, index: &DeduplicationIndex) -> io::Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(writer);

    for (key, entry) in index.entries() {
        let frequency = entry.frequency.to_string();
        csv_writer.write_record([
            key.as_str(),
            entry.representative_id.as_str(),
            frequency.as_str(),
        ])?;
    }
    csv_writer.flush()
}

pub(crate) fn write_index_file(path: &Path, index: &DeduplicationIndex) -> Result<()> {
    write_file(path, |writer| write_index(writer, index))
}

pub(crate) fn write_summary_file(path: &Path, report: &RunReport) -> Result<()> {
    write_file(path, |writer| writeln!(writer, "{}", report))
}

fn write_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let output_error = |source| CurationError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(output_error)?;
    }
    let mut writer = BufWriter::new(File::create(path).map_err(output_error)?);
    write(&mut writer).map_err(output_error)?;
    writer.flush().map_err(output_error)?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}
