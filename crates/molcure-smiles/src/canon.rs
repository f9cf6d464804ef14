//! Stereo-insensitive canonical SMILES
//!
//! The graph is normalized first: plain `[H]` atoms are folded into their
//! neighbor's hydrogen count and aromaticity is re-derived from the rings, so
//! Kekulé and aromatic notations of a structure meet. The canonical form is
//! then produced in three steps:
//!
//! 1. Atom invariants (element, degree, hydrogens, charge, isotope, aromaticity)
//!    are refined against neighbor ranks until the partition stops splitting.
//! 2. Remaining ties are broken one class at a time, re-refining after each break,
//!    until every atom has a unique rank.
//! 3. A depth-first walk from the lowest-ranked atom, visiting neighbors in rank
//!    order, writes the SMILES. Ring-closure digits are reused lowest-first.
//!
//! Chirality and double-bond geometry never reach the graph, so stereoisomers
//! share one canonical form.

use std::cmp::Reverse;

use crate::aromatic::normalize_aromaticity;
use crate::element;
use crate::error::{SmilesError, SmilesResult};
use crate::graph::{BondOrder, Molecule};
use crate::parser::parse_smiles;

/// Options for canonical form generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalOptions {
    /// Keep only the largest fragment of a disconnected structure.
    ///
    /// When disabled, a structure with more than one fragment is rejected
    /// with [`SmilesError::DisconnectedFragments`].
    pub keep_largest_fragment: bool,
}

impl Default for CanonicalOptions {
    fn default() -> Self {
        Self {
            keep_largest_fragment: true,
        }
    }
}

/// Parse `smiles` and return its canonical form.
pub fn canonicalize(smiles: &str, options: CanonicalOptions) -> SmilesResult<String> {
    let mol = parse_smiles(smiles)?;
    canonical_smiles(&mol, options)
}

/// Canonical SMILES for an already parsed molecule.
pub fn canonical_smiles(mol: &Molecule, options: CanonicalOptions) -> SmilesResult<String> {
    mol.check_valences()?;
    let mol = &normalize_aromaticity(&mol.fold_explicit_hydrogens())?;

    let fragments = mol.fragments();
    if fragments.len() <= 1 {
        return Ok(write_connected(mol));
    }
    if !options.keep_largest_fragment {
        return Err(SmilesError::DisconnectedFragments(fragments.len()));
    }

    // Largest by heavy atoms, then by atoms, then the smallest canonical string
    fragments
        .iter()
        .map(|atoms| {
            let fragment = mol.subgraph(atoms);
            let smiles = write_connected(&fragment);
            (
                fragment.heavy_atom_count(),
                fragment.atom_count(),
                Reverse(smiles),
            )
        })
        .max()
        .map(|(_, _, Reverse(smiles))| smiles)
        .ok_or(SmilesError::Empty)
}

fn write_connected(mol: &Molecule) -> String {
    let ranks = canonical_ranks(mol);
    let Some(start) = (0..mol.atom_count()).min_by_key(|&i| ranks[i]) else {
        return String::new();
    };

    let plan = Plan::build(mol, &ranks, start);
    let mut writer = Writer {
        mol,
        ranks: &ranks,
        plan,
        digits_in_use: Vec::new(),
        bond_digits: vec![None; mol.bond_count()],
        out: String::with_capacity(mol.atom_count() * 2),
    };
    writer.write(start);
    writer.out
}

/// Unique canonical rank (0-based) for each atom.
pub(crate) fn canonical_ranks(mol: &Molecule) -> Vec<usize> {
    let n = mol.atom_count();
    let invariants: Vec<u64> = (0..n).map(|i| atom_invariant(mol, i)).collect();
    let mut ranks = refine(mol, dense_ranks(&invariants));

    while class_count(&ranks) < n {
        let Some(tied) = lowest_tied_rank(&ranks) else {
            break;
        };
        let Some(chosen) = ranks.iter().position(|&r| r == tied) else {
            break;
        };
        let split: Vec<usize> = ranks
            .iter()
            .enumerate()
            .map(|(i, &r)| if r == tied && i != chosen { 2 * r + 1 } else { 2 * r })
            .collect();
        ranks = refine(mol, dense_ranks(&split));
    }

    ranks
}

fn atom_invariant(mol: &Molecule, index: usize) -> u64 {
    let atom = &mol.atoms[index];
    let degree = mol.degree(index).min(255) as u64;
    let charge = (i16::from(atom.charge) + 128) as u64;
    let isotope = u64::from(atom.isotope.unwrap_or(0));

    u64::from(atom.atomic_number) << 48
        | degree << 40
        | u64::from(atom.hydrogens) << 32
        | charge << 24
        | isotope << 8
        | u64::from(atom.aromatic)
}

/// Split rank classes by the sorted ranks of neighbors until stable.
fn refine(mol: &Molecule, mut ranks: Vec<usize>) -> Vec<usize> {
    let mut classes = class_count(&ranks);
    loop {
        let keys: Vec<(usize, Vec<(usize, u8)>)> = (0..mol.atom_count())
            .map(|i| {
                let mut around: Vec<(usize, u8)> = mol
                    .neighbors(i)
                    .iter()
                    .map(|&(neighbor, bond)| (ranks[neighbor], mol.bonds[bond].order.code()))
                    .collect();
                around.sort_unstable();
                (ranks[i], around)
            })
            .collect();

        ranks = dense_ranks(&keys);
        let refined = class_count(&ranks);
        if refined == classes {
            return ranks;
        }
        classes = refined;
    }
}

fn dense_ranks<T: Ord>(values: &[T]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].cmp(&values[b]));

    let mut ranks = vec![0; values.len()];
    let mut rank = 0;
    for (position, &index) in order.iter().enumerate() {
        if position > 0 && values[index] != values[order[position - 1]] {
            rank += 1;
        }
        ranks[index] = rank;
    }
    ranks
}

fn class_count(ranks: &[usize]) -> usize {
    ranks.iter().max().map_or(0, |&max| max + 1)
}

fn lowest_tied_rank(ranks: &[usize]) -> Option<usize> {
    let mut counts = vec![0usize; class_count(ranks)];
    for &r in ranks {
        counts[r] += 1;
    }
    counts.iter().position(|&c| c > 1)
}

/// A ring-closure bond as seen from one of its atoms
#[derive(Debug, Clone, Copy)]
struct Closure {
    bond: usize,
    partner: usize,
    opening: bool,
}

/// Spanning tree and ring closures of the canonical walk
struct Plan {
    children: Vec<Vec<(usize, usize)>>,
    closures: Vec<Vec<Closure>>,
}

impl Plan {
    fn build(mol: &Molecule, ranks: &[usize], start: usize) -> Self {
        let mut plan = Self {
            children: vec![Vec::new(); mol.atom_count()],
            closures: vec![Vec::new(); mol.atom_count()],
        };
        let mut visited = vec![false; mol.atom_count()];
        let mut used = vec![false; mol.bond_count()];
        plan.visit(mol, ranks, start, &mut visited, &mut used);
        plan
    }

    fn visit(
        &mut self,
        mol: &Molecule,
        ranks: &[usize],
        atom: usize,
        visited: &mut [bool],
        used: &mut [bool],
    ) {
        visited[atom] = true;

        let mut neighbors = mol.neighbors(atom).to_vec();
        neighbors.sort_by_key(|&(neighbor, _)| ranks[neighbor]);

        for (neighbor, bond) in neighbors {
            if used[bond] {
                continue;
            }
            used[bond] = true;
            if visited[neighbor] {
                // Back edge to an atom written earlier: the ring opens there
                self.closures[neighbor].push(Closure {
                    bond,
                    partner: atom,
                    opening: true,
                });
                self.closures[atom].push(Closure {
                    bond,
                    partner: neighbor,
                    opening: false,
                });
            } else {
                self.children[atom].push((neighbor, bond));
                self.visit(mol, ranks, neighbor, visited, used);
            }
        }
    }
}

struct Writer<'a> {
    mol: &'a Molecule,
    ranks: &'a [usize],
    plan: Plan,
    /// digits_in_use[d - 1] is true while ring digit d is open
    digits_in_use: Vec<bool>,
    bond_digits: Vec<Option<usize>>,
    out: String,
}

impl Writer<'_> {
    fn write(&mut self, atom: usize) {
        self.write_atom(atom);

        let mut closures = std::mem::take(&mut self.plan.closures[atom]);
        closures.sort_by_key(|c| (c.opening, self.ranks[c.partner]));

        let mut released = Vec::new();
        for closure in &closures {
            if closure.opening {
                let digit = self.allocate_digit();
                self.bond_digits[closure.bond] = Some(digit);
                self.write_bond(closure.bond);
                self.write_ring_number(digit);
            } else if let Some(digit) = self.bond_digits[closure.bond] {
                self.write_ring_number(digit);
                released.push(digit);
            }
        }
        // Freed only after this atom so a digit is never closed and reopened in place
        for digit in released {
            self.digits_in_use[digit - 1] = false;
        }

        let children = std::mem::take(&mut self.plan.children[atom]);
        let last = children.len().saturating_sub(1);
        for (i, &(child, bond)) in children.iter().enumerate() {
            if i < last {
                self.out.push('(');
                self.write_bond(bond);
                self.write(child);
                self.out.push(')');
            } else {
                self.write_bond(bond);
                self.write(child);
            }
        }
    }

    fn allocate_digit(&mut self) -> usize {
        match self.digits_in_use.iter().position(|&used| !used) {
            Some(free) => {
                self.digits_in_use[free] = true;
                free + 1
            }
            None => {
                self.digits_in_use.push(true);
                self.digits_in_use.len()
            }
        }
    }

    fn write_ring_number(&mut self, digit: usize) {
        match digit {
            0..=9 => self.out.push_str(&digit.to_string()),
            10..=99 => {
                self.out.push('%');
                self.out.push_str(&digit.to_string());
            }
            _ => {
                self.out.push_str("%(");
                self.out.push_str(&digit.to_string());
                self.out.push(')');
            }
        }
    }

    fn write_bond(&mut self, bond: usize) {
        let bond = &self.mol.bonds[bond];
        let aromatic_pair =
            self.mol.atoms[bond.begin].aromatic && self.mol.atoms[bond.end].aromatic;
        match bond.order {
            BondOrder::Single if aromatic_pair => self.out.push('-'),
            BondOrder::Single => {}
            BondOrder::Double => self.out.push('='),
            BondOrder::Triple => self.out.push('#'),
            BondOrder::Aromatic if aromatic_pair => {}
            BondOrder::Aromatic => self.out.push(':'),
        }
    }

    fn write_atom(&mut self, index: usize) {
        let atom = &self.mol.atoms[index];
        let symbol = if atom.aromatic {
            atom.symbol().to_lowercase()
        } else {
            atom.symbol().to_string()
        };

        if atom.atomic_number == 0
            && atom.charge == 0
            && atom.isotope.is_none()
            && atom.hydrogens == 0
        {
            self.out.push('*');
            return;
        }

        let plain = atom.charge == 0
            && atom.isotope.is_none()
            && element::is_organic_subset(atom.atomic_number)
            && (!atom.aromatic || matches!(atom.atomic_number, 5 | 6 | 7 | 8 | 15 | 16))
            && self.mol.implied_hydrogens(index) == Some(atom.hydrogens);
        if plain {
            self.out.push_str(&symbol);
            return;
        }

        self.out.push('[');
        if let Some(isotope) = atom.isotope {
            self.out.push_str(&isotope.to_string());
        }
        self.out.push_str(&symbol);
        match atom.hydrogens {
            0 => {}
            1 => self.out.push('H'),
            h => {
                self.out.push('H');
                self.out.push_str(&h.to_string());
            }
        }
        match atom.charge {
            0 => {}
            1 => self.out.push('+'),
            -1 => self.out.push('-'),
            c if c > 0 => {
                self.out.push('+');
                self.out.push_str(&c.to_string());
            }
            c => {
                self.out.push('-');
                self.out.push_str(&c.unsigned_abs().to_string());
            }
        }
        self.out.push(']');
    }
}
