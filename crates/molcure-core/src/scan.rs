//! The per-line loop shared by reference builds and target curation

use std::io::BufRead;

use crate::canonical::{CanonicalFormComputer, CanonicalKey};
use crate::error::{CurationError, RecordError, Result};
use crate::record::{decode_line, parse_line, Line, Record};
use crate::report::RunCounters;

/// What the caller did with a successfully canonicalized record
pub(crate) enum Disposition {
    Inserted,
    Filtered,
}

/// Stream `reader` line by line, handing each canonical key to `on_key`.
///
/// Per-record failures are counted and logged; only a failing read ends
/// the scan early.
pub(crate) fn scan_records<R, C, F>(
    source_name: &str,
    mut reader: R,
    canonicalizer: &C,
    header_sentinel: &str,
    counters: &mut RunCounters,
    mut on_key: F,
) -> Result<()>
where
    R: BufRead,
    C: CanonicalFormComputer + ?Sized,
    F: FnMut(CanonicalKey, &Record) -> Disposition,
{
    let mut buf = Vec::new();
    let mut line_number = 0u64;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| CurationError::InputRead {
                source_name: source_name.to_string(),
                source,
            })?;
        if read == 0 {
            break;
        }
        line_number += 1;

        let record = match decode_line(&buf).and_then(|line| parse_line(line, header_sentinel)) {
            Ok(Line::Blank) => continue,
            Ok(Line::Header) => {
                counters.headers_skipped += 1;
                continue;
            }
            Ok(Line::Record(record)) => record,
            Err(error) => {
                counters.processed += 1;
                absorb(source_name, line_number, &error, counters);
                continue;
            }
        };

        counters.processed += 1;
        match canonicalizer.canonical_key(&record.structure) {
            Ok(key) => {
                if let Disposition::Filtered = on_key(key, &record) {
                    counters.filtered_by_reference += 1;
                }
            }
            Err(error) => {
                let error = RecordError::from_canonical(error, &record.external_id);
                absorb(source_name, line_number, &error, counters);
            }
        }
    }

    Ok(())
}

fn absorb(source_name: &str, line_number: u64, error: &RecordError, counters: &mut RunCounters) {
    tracing::warn!(
        "{} line {}: {} (ID: {})",
        source_name,
        line_number,
        error,
        error.identifier()
    );
    counters.record_exception(error.kind());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::CanonicalFormError;
    use std::io::Cursor;

    fn identity(notation: &str) -> std::result::Result<CanonicalKey, CanonicalFormError> {
        if notation.starts_with('!') {
            Err(CanonicalFormError::Parse(format!("bad notation {}", notation)))
        } else {
            Ok(CanonicalKey::new(notation))
        }
    }

    #[test]
    fn test_counts_every_kind_of_line() {
        let input = "SMILES ID\nCCO a\n\n!x b\nlonely\nCCN c\n";
        let mut counters = RunCounters::default();
        let mut seen = Vec::new();
        scan_records(
            "test",
            Cursor::new(input),
            &identity,
            "SMILES",
            &mut counters,
            |key, record| {
                seen.push((key.into_string(), record.external_id.clone()));
                Disposition::Inserted
            },
        )
        .unwrap();

        assert_eq!(counters.headers_skipped, 1);
        assert_eq!(counters.processed, 4);
        assert_eq!(counters.exceptions, 2);
        assert_eq!(counters.exception_kinds.parse, 1);
        assert_eq!(counters.exception_kinds.malformed, 1);
        assert_eq!(
            seen,
            vec![
                ("CCO".to_string(), "a".to_string()),
                ("CCN".to_string(), "c".to_string())
            ]
        );
    }

    #[test]
    fn test_last_line_without_newline() {
        let mut counters = RunCounters::default();
        let mut count = 0;
        scan_records(
            "test",
            Cursor::new("CCO a\r\nCCN b"),
            &identity,
            "SMILES",
            &mut counters,
            |_, _| {
                count += 1;
                Disposition::Filtered
            },
        )
        .unwrap();
        assert_eq!(count, 2);
        assert_eq!(counters.filtered_by_reference, 2);
    }

    #[test]
    fn test_invalid_utf8_is_absorbed() {
        let mut counters = RunCounters::default();
        let input: &[u8] = b"C\xffC a\nCCO b\n";
        scan_records(
            "test",
            input,
            &identity,
            "SMILES",
            &mut counters,
            |_, _| Disposition::Inserted,
        )
        .unwrap();
        assert_eq!(counters.processed, 2);
        assert_eq!(counters.exception_kinds.malformed, 1);
    }
}
