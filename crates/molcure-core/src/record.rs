//! Line-oriented structure records
//!
//! One record per line: `<structure> <id> [<frequency>]`, fields separated
//! by whitespace. Lines containing the header sentinel anywhere are headers.

use crate::error::RecordError;

/// Header sentinel used when none is configured
pub const DEFAULT_HEADER_SENTINEL: &str = "SMILES";

/// One dataset record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub structure: String,
    pub external_id: String,
    /// Frequency carried over from an earlier curation pass, if present
    pub prior_frequency: Option<u32>,
}

/// Classification of an input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Empty or whitespace only
    Blank,
    /// Contains the header sentinel
    Header,
    Record(Record),
}

/// Split one input line into a record.
///
/// The sentinel check is a plain substring test and runs before any field
/// splitting. An empty sentinel disables header detection.
pub fn parse_line(line: &str, header_sentinel: &str) -> Result<Line, RecordError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(Line::Blank);
    }
    if !header_sentinel.is_empty() && trimmed.contains(header_sentinel) {
        return Ok(Line::Header);
    }

    let fields: Vec<&str> = trimmed.split_whitespace().collect();
    let id = fields.get(1).copied();
    match fields.as_slice() {
        [structure, external_id] => Ok(Line::Record(Record {
            structure: structure.to_string(),
            external_id: external_id.to_string(),
            prior_frequency: None,
        })),
        [structure, external_id, frequency] => {
            let prior_frequency = match frequency.parse::<u32>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    return Err(RecordError::malformed(
                        id,
                        format!("frequency must be a positive integer, found '{}'", frequency),
                    ))
                }
            };
            Ok(Line::Record(Record {
                structure: structure.to_string(),
                external_id: external_id.to_string(),
                prior_frequency: Some(prior_frequency),
            }))
        }
        _ => Err(RecordError::malformed(
            id,
            format!("expected 2 or 3 fields, found {}", fields.len()),
        )),
    }
}

/// Decode raw line bytes, treating invalid UTF-8 as a malformed record.
pub(crate) fn decode_line(bytes: &[u8]) -> Result<&str, RecordError> {
    std::str::from_utf8(bytes)
        .map_err(|e| RecordError::malformed(None, format!("line is not valid UTF-8: {}", e)))
}
