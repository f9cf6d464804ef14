//! Test fixture loading and dataset helpers

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use molcure_core::{CurationPipeline, PipelineSettings, SmilesCanonicalizer};

/// Get the path to a fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_fixtures")
        .join(name)
}

/// Copy fixture files into `dir`, returning the copied paths
#[allow(dead_code)]
pub fn copy_fixtures(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let target = dir.join(name);
            fs::copy(fixture_path(name), &target)
                .unwrap_or_else(|_| panic!("Failed to copy fixture: {}", name));
            target
        })
        .collect()
}

/// Write a dataset file with one line per entry
#[allow(dead_code)]
pub fn write_dataset(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut text = lines.join("\n");
    text.push('\n');
    fs::write(&path, text).unwrap_or_else(|_| panic!("Failed to write dataset: {}", name));
    path
}

/// Parse a curated output file into key -> (representative id, frequency)
#[allow(dead_code)]
pub fn read_output(path: &Path) -> HashMap<String, (String, u64)> {
    let text = fs::read_to_string(path)
        .unwrap_or_else(|_| panic!("Failed to read output: {}", path.display()));
    text.lines()
        .map(|line| {
            let fields: Vec<&str> = line.split(' ').collect();
            assert_eq!(fields.len(), 3, "unexpected output line: {}", line);
            let frequency = fields[2].parse().expect("frequency");
            (fields[0].to_string(), (fields[1].to_string(), frequency))
        })
        .collect()
}

/// Pipeline with the SMILES canonicalizer and default settings
#[allow(dead_code)]
pub fn smiles_pipeline() -> CurationPipeline<SmilesCanonicalizer> {
    CurationPipeline::new(SmilesCanonicalizer::new(), PipelineSettings::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_path() {
        let path = fixture_path("stereoisomers.txt");
        assert!(path.ends_with("test_fixtures/stereoisomers.txt"));
        assert!(path.exists());
    }
}
