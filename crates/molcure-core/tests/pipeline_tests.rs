//! End-to-end curation runs over files

mod common;

use std::io::Cursor;

use common::fixtures::{copy_fixtures, read_output, smiles_pipeline, write_dataset};
use molcure_core::{
    CanonicalFormComputer, CrossDatasetFilter, CurationConfig, CurationError, CurationRequest,
    RunMode, RunOutcome, RunState, SmilesCanonicalizer,
};
use rstest::rstest;
use tempfile::TempDir;

fn key(notation: &str) -> String {
    SmilesCanonicalizer::new()
        .canonical_key(notation)
        .unwrap()
        .into_string()
}

fn completed(outcome: RunOutcome) -> molcure_core::RunReport {
    match outcome {
        RunOutcome::Completed(report) => report,
        RunOutcome::Skipped { missing, .. } => {
            panic!("run skipped, missing {}", missing.display())
        }
    }
}

// === Grouping ===

#[test]
fn test_equivalent_notations_group_under_first_id() {
    let dir = TempDir::new().unwrap();
    let target = write_dataset(dir.path(), "in.txt", &["CCO id1", "OCC id2", "CCN id3"]);
    let output = dir.path().join("out.txt");

    let report = completed(
        smiles_pipeline()
            .run(&CurationRequest::flatten("grouping", &target, &output))
            .unwrap(),
    );

    let curated = read_output(&output);
    assert_eq!(curated.len(), 2);
    assert_eq!(curated[&key("CCO")], ("id1".to_string(), 2));
    assert_eq!(curated[&key("CCN")], ("id3".to_string(), 1));
    assert_eq!(report.counters.processed, 3);
    assert_eq!(report.counters.distinct_retained, 2);
    assert_eq!(report.state, RunState::Done);
    assert_eq!(report.mode, RunMode::Flatten);
}

#[test]
fn test_malformed_line_is_counted_and_skipped() {
    let pipeline = smiles_pipeline();
    let input = "CCO id1\nonlyonefield\nCCN id2\n";
    let curated = pipeline
        .curate_reader("mixed", Cursor::new(input), &CrossDatasetFilter::empty())
        .unwrap();

    assert_eq!(curated.counters.processed, 3);
    assert_eq!(curated.counters.exceptions, 1);
    assert_eq!(curated.counters.exception_kinds.malformed, 1);
    assert_eq!(curated.index.size(), 2);
    assert!(curated.index.contains(&key("CCN")));
}

#[rstest]
#[case("N[C@@H](C)C(=O)O", "N[C@H](C)C(=O)O")]
#[case("F/C=C/F", "F/C=C\\F")]
#[case("C[C@H]1CC[C@@H](C)CC1", "C[C@@H]1CC[C@@H](C)CC1")]
#[case("[C@@H](O)(N)C", "C(O)(N)C")]
#[case("CCO.Cl", "OCC")]
#[case("[H][C@@](N)(C)C(=O)O", "N[C@H](C)C(=O)O")]
#[case("C1=CC=CC=C1", "c1ccccc1")]
fn test_stereoisomers_collapse(#[case] first: &str, #[case] second: &str) {
    let input = format!("{} a\n{} b\n", first, second);
    let curated = smiles_pipeline()
        .curate_reader("pair", Cursor::new(input), &CrossDatasetFilter::empty())
        .unwrap();
    assert_eq!(curated.index.size(), 1);
    let (_, entry) = curated.index.entries().next().unwrap();
    assert_eq!(entry.representative_id, "a");
    assert_eq!(entry.frequency, 2);
}

#[test]
fn test_input_order_changes_only_representatives() {
    let lines = ["CCO id1", "OCC id2", "CCN id3", "NCC id4", "c1ccccc1 id5"];
    let forward = lines.join("\n");
    let backward: Vec<&str> = lines.iter().rev().copied().collect();
    let backward = backward.join("\n");

    let pipeline = smiles_pipeline();
    let filter = CrossDatasetFilter::empty();
    let a = pipeline
        .curate_reader("forward", Cursor::new(forward), &filter)
        .unwrap();
    let b = pipeline
        .curate_reader("backward", Cursor::new(backward), &filter)
        .unwrap();

    assert_eq!(a.index.size(), b.index.size());
    for (k, entry) in a.index.entries() {
        let other = b.index.get(k.as_str()).unwrap();
        assert_eq!(entry.frequency, other.frequency);
    }
    assert_eq!(a.index.get(&key("CCO")).unwrap().representative_id, "id1");
    assert_eq!(b.index.get(&key("CCO")).unwrap().representative_id, "id2");
}

// === Reference filtering ===

#[test]
fn test_reference_match_is_filtered() {
    let dir = TempDir::new().unwrap();
    let reference = write_dataset(dir.path(), "ref.txt", &["SMILES ID", "CCO ref1"]);
    let target = write_dataset(dir.path(), "target.txt", &["OCC idX", "CCN idY"]);
    let output = dir.path().join("novel.txt");

    let request = CurationRequest::filter("novel", &target, [&reference], &output);
    let report = completed(smiles_pipeline().run(&request).unwrap());

    let curated = read_output(&output);
    assert!(!curated.values().any(|(id, _)| id == "idX"));
    assert_eq!(curated.len(), 1);
    assert_eq!(report.counters.filtered_by_reference, 1);
    assert_eq!(report.mode, RunMode::FilterAndFlatten);
    assert_eq!(report.references.len(), 1);
    assert_eq!(report.references[0].distinct_keys, 1);
    assert_eq!(report.references[0].headers_skipped, 1);
}

#[rstest]
#[case("C1=CN=CC=C1", "n1ccccc1")]
#[case("Cc1ccccc1", "CC1=CC=CC=C1")]
#[case("[H]OC", "CO")]
fn test_reference_notation_does_not_matter(#[case] reference: &str, #[case] target: &str) {
    let pipeline = smiles_pipeline();
    let reference_set = pipeline
        .build_reference_set("known", Cursor::new(format!("{} ref1\n", reference)))
        .unwrap();
    let filter = CrossDatasetFilter::new(vec![reference_set]);

    let input = format!("{} t1\nCCN t2\n", target);
    let curated = pipeline
        .curate_reader("target", Cursor::new(input), &filter)
        .unwrap();

    assert_eq!(curated.counters.filtered_by_reference, 1);
    assert_eq!(curated.index.size(), 1);
    assert!(curated.index.contains(&key("CCN")));
}

#[test]
fn test_fixture_datasets() {
    let dir = TempDir::new().unwrap();
    let paths = copy_fixtures(dir.path(), &["stereoisomers.txt", "reference.txt"]);
    let pipeline = smiles_pipeline();

    let flat_output = dir.path().join("flat.txt");
    let flat = completed(
        pipeline
            .run(&CurationRequest::flatten("flat", &paths[0], &flat_output))
            .unwrap(),
    );
    assert_eq!(flat.counters.processed, 12);
    assert_eq!(flat.counters.exceptions, 3);
    assert_eq!(flat.counters.exception_kinds.malformed, 1);
    assert_eq!(flat.counters.exception_kinds.parse, 1);
    assert_eq!(flat.counters.exception_kinds.canonicalization, 1);
    assert_eq!(flat.counters.headers_skipped, 1);
    assert_eq!(flat.counters.distinct_retained, 4);

    let curated = read_output(&flat_output);
    assert_eq!(curated[&key("NC(C)C(=O)O")], ("ALA-L".to_string(), 3));
    assert_eq!(curated[&key("CC=CC")], ("BUT-E".to_string(), 3));
    assert_eq!(curated[&key("c1ccccc1")], ("BENZ".to_string(), 1));
    assert_eq!(curated[&key("OCC1OC(O)C(O)C(O)C1O")], ("GLC-A".to_string(), 2));

    let novel_output = dir.path().join("novel.txt");
    let novel = completed(
        pipeline
            .run(&CurationRequest::filter(
                "novel",
                &paths[0],
                [&paths[1]],
                &novel_output,
            ))
            .unwrap(),
    );
    assert_eq!(novel.counters.filtered_by_reference, 3);
    assert_eq!(novel.counters.distinct_retained, 3);
    let curated = read_output(&novel_output);
    assert!(!curated.contains_key(&key("NC(C)C(=O)O")));
    let total: u64 = curated.values().map(|(_, frequency)| frequency).sum();
    assert_eq!(
        total,
        novel.counters.processed - novel.counters.exceptions - novel.counters.filtered_by_reference
    );
}

// === Skipped and fatal runs ===

#[rstest]
#[case::missing_target(true)]
#[case::missing_reference(false)]
fn test_missing_input_skips_run(#[case] target_missing: bool) {
    let dir = TempDir::new().unwrap();
    let present = write_dataset(dir.path(), "present.txt", &["CCO id1"]);
    let absent = dir.path().join("absent.txt");
    let output = dir.path().join("out.txt");

    let request = if target_missing {
        CurationRequest::filter("skip", &absent, [&present], &output)
    } else {
        CurationRequest::filter("skip", &present, [&absent], &output)
    };
    let outcome = smiles_pipeline().run(&request).unwrap();

    match outcome {
        RunOutcome::Skipped { name, missing } => {
            assert_eq!(name, "skip");
            assert_eq!(missing, absent);
        }
        RunOutcome::Completed(_) => panic!("run should have been skipped"),
    }
    assert!(!output.exists());
}

#[test]
fn test_unwritable_output_is_fatal() {
    let dir = TempDir::new().unwrap();
    let target = write_dataset(dir.path(), "in.txt", &["CCO id1"]);
    let output = dir.path().join("taken");
    std::fs::create_dir(&output).unwrap();

    let result = smiles_pipeline().run(&CurationRequest::flatten("fatal", &target, &output));
    assert!(matches!(result, Err(CurationError::OutputWrite { .. })));
}

#[test]
fn test_summary_file_is_written() {
    let dir = TempDir::new().unwrap();
    let target = write_dataset(dir.path(), "in.txt", &["SMILES ID", "CCO id1", "OCC id2"]);
    let output = dir.path().join("out.txt");
    let summary = dir.path().join("logs").join("summary.txt");

    let request = CurationRequest::flatten("summarized", &target, &output).with_summary(&summary);
    completed(smiles_pipeline().run(&request).unwrap());

    let text = std::fs::read_to_string(&summary).unwrap();
    assert!(text.contains("Run 'summarized' (flatten)"));
    assert!(text.contains("Records processed:      2"));
    assert!(text.contains("Distinct entries:       1 (50.00 % of processed)"));
    assert!(text.contains("Header lines skipped:   1"));
}

// === Batch configuration ===

#[test]
fn test_batch_config_runs_in_order() {
    let dir = TempDir::new().unwrap();
    copy_fixtures(
        dir.path(),
        &["batch.toml", "stereoisomers.txt", "reference.txt"],
    );
    let config = CurationConfig::load(&dir.path().join("batch.toml")).unwrap();
    let pipeline = molcure_core::CurationPipeline::new(
        config.canonicalizer(),
        config.pipeline_settings(),
    );

    let outcomes: Vec<RunOutcome> = config
        .requests(dir.path())
        .iter()
        .map(|request| pipeline.run(request).unwrap())
        .collect();

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].state(), RunState::Done);
    assert!(outcomes[1].is_skipped());
    assert_eq!(outcomes[2].state(), RunState::Done);

    let curated_dir = dir.path().join("curated");
    assert!(curated_dir.join("stereoisomers_flat.txt").exists());
    assert!(curated_dir.join("stereoisomers_flat_summary.txt").exists());
    assert!(curated_dir.join("stereoisomers_novel.txt").exists());
    assert!(!curated_dir.join("never_written.txt").exists());
}
