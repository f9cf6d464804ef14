//! Canonical keys and the canonicalization seam
//!
//! The curation pipeline treats a canonical key as an opaque deduplication
//! token. Anything that can turn structure notation into such a token
//! implements [`CanonicalFormComputer`]; plain closures qualify too.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stereochemistry-insensitive identity of a structure
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CanonicalKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for CanonicalKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl Borrow<str> for CanonicalKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Failure to derive a canonical key
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanonicalFormError {
    /// The notation could not be parsed into a structure
    #[error("{0}")]
    Parse(String),

    /// The structure parsed but normalization failed
    #[error("{0}")]
    Canonicalization(String),
}

/// Turns structure notation into a canonical key.
///
/// Implementations must be deterministic: semantically identical structures
/// map to the same key for the lifetime of a run.
pub trait CanonicalFormComputer {
    fn canonical_key(&self, notation: &str) -> Result<CanonicalKey, CanonicalFormError>;
}

impl<F> CanonicalFormComputer for F
where
    F: Fn(&str) -> Result<CanonicalKey, CanonicalFormError>,
{
    fn canonical_key(&self, notation: &str) -> Result<CanonicalKey, CanonicalFormError> {
        self(notation)
    }
}

#[cfg(feature = "smiles")]
pub use self::smiles::SmilesCanonicalizer;

#[cfg(feature = "smiles")]
mod smiles {
    use molcure_smiles::{canonicalize, CanonicalOptions, SmilesError};

    use super::{CanonicalFormComputer, CanonicalFormError, CanonicalKey};

    /// Canonical SMILES backed by `molcure-smiles`
    #[derive(Debug, Clone, Copy)]
    pub struct SmilesCanonicalizer {
        options: CanonicalOptions,
    }

    impl SmilesCanonicalizer {
        pub fn new() -> Self {
            Self {
                options: CanonicalOptions::default(),
            }
        }

        /// Keep only the largest fragment of multi-fragment structures
        /// (salts, solvents) instead of rejecting them.
        pub fn with_largest_fragment(mut self, keep: bool) -> Self {
            self.options.keep_largest_fragment = keep;
            self
        }

        pub fn keeps_largest_fragment(&self) -> bool {
            self.options.keep_largest_fragment
        }
    }

    impl Default for SmilesCanonicalizer {
        fn default() -> Self {
            Self::new()
        }
    }

    impl From<SmilesError> for CanonicalFormError {
        fn from(error: SmilesError) -> Self {
            if error.is_canonicalization_error() {
                CanonicalFormError::Canonicalization(error.to_string())
            } else {
                CanonicalFormError::Parse(error.to_string())
            }
        }
    }

    impl CanonicalFormComputer for SmilesCanonicalizer {
        fn canonical_key(&self, notation: &str) -> Result<CanonicalKey, CanonicalFormError> {
            let smiles = canonicalize(notation, self.options)?;
            Ok(CanonicalKey::from(smiles))
        }
    }
}
