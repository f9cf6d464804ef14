//! Error types for SMILES parsing and canonicalization

use thiserror::Error;

/// Result type for SMILES operations
pub type SmilesResult<T> = Result<T, SmilesError>;

/// Errors raised while reading or canonicalizing a SMILES string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmilesError {
    #[error("Empty SMILES notation")]
    Empty,

    #[error("Unexpected character '{character}' at position {position}")]
    UnexpectedCharacter { character: char, position: usize },

    #[error("Unknown element: {0}")]
    UnknownElement(String),

    #[error("Malformed bracket atom at position {0}")]
    BracketAtom(usize),

    #[error("Unbalanced branch at position {0}")]
    UnbalancedBranch(usize),

    #[error("Bond symbol without a following atom at position {0}")]
    DanglingBond(usize),

    #[error("Ring closure {0} has no preceding atom")]
    RingWithoutAtom(u16),

    #[error("Unclosed ring closure(s): {0:?}")]
    UnclosedRing(Vec<u16>),

    #[error("Atoms {0} and {1} are bonded more than once")]
    DuplicateBond(usize, usize),

    #[error("Invalid valence on atom {index} ({symbol}): bond order sum {valence}")]
    InvalidValence {
        index: usize,
        symbol: String,
        valence: u8,
    },

    #[error("Empty fragment at position {0}")]
    EmptyFragment(usize),

    #[error("Aromatic atoms {0:?} cannot be given alternating double bonds")]
    Kekulization(Vec<usize>),

    #[error("Structure has {0} disconnected fragments")]
    DisconnectedFragments(usize),
}

impl SmilesError {
    /// Whether the notation was readable but could not be normalized.
    ///
    /// Everything else means the notation itself could not be parsed.
    pub fn is_canonicalization_error(&self) -> bool {
        matches!(
            self,
            SmilesError::InvalidValence { .. }
                | SmilesError::Kekulization(_)
                | SmilesError::DisconnectedFragments(_)
        )
    }
}
