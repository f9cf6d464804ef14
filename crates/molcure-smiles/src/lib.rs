//! molcure-smiles - SMILES notation for structure curation
//!
//! This crate turns SMILES strings into a small molecular graph and writes
//! that graph back out in a canonical, stereo-insensitive form:
//!
//! - **Parsing**: organic subset, bracket atoms, bonds, branches, ring closures
//! - **Normalization**: explicit hydrogens folded, aromaticity perceived from rings
//! - **Canonical form**: invariant refinement plus rank-ordered depth-first writing
//! - **Fragments**: optional reduction to the largest connected fragment
//!
//! # Example
//!
//! ```
//! use molcure_smiles::{canonicalize, CanonicalOptions};
//!
//! let options = CanonicalOptions::default();
//! let a = canonicalize("N[C@@H](C)C(=O)O", options).unwrap();
//! let b = canonicalize("N[C@H](C)C(=O)O", options).unwrap();
//! assert_eq!(a, b);
//!
//! let kekule = canonicalize("C1=CC=CC=C1", options).unwrap();
//! assert_eq!(kekule, canonicalize("c1ccccc1", options).unwrap());
//! ```

pub mod aromatic;
pub mod canon;
pub mod element;
pub mod error;
pub mod graph;
pub mod parser;
pub mod rings;

pub use aromatic::{kekulize, normalize_aromaticity};
pub use canon::{canonical_smiles, canonicalize, CanonicalOptions};
pub use error::{SmilesError, SmilesResult};
pub use graph::{Atom, Bond, BondOrder, Molecule};
pub use parser::parse_smiles;
