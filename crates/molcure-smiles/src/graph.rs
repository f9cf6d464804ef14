//! Molecular graph built from a SMILES string
//!
//! Stereochemistry is not represented: the parser discards chirality marks
//! and directional bonds, so every stereoisomer maps onto the same graph.

use crate::element;
use crate::error::{SmilesError, SmilesResult};

/// Bond order between two atoms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// Contribution to the valence of an atom. Aromatic bonds count as a
    /// sigma bond; the pi contribution is accounted for per atom.
    pub fn valence(self) -> u8 {
        match self {
            BondOrder::Single | BondOrder::Aromatic => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        }
    }

    /// Small integer code used in atom invariants
    pub(crate) fn code(self) -> u8 {
        match self {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            BondOrder::Aromatic => 4,
        }
    }
}

/// An atom of the graph
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    pub atomic_number: u8,
    pub charge: i8,
    pub isotope: Option<u16>,
    pub aromatic: bool,
    /// Total attached hydrogens (explicit for bracket atoms, implied otherwise)
    pub hydrogens: u8,
    /// Whether the atom was written in brackets in the source notation
    pub bracketed: bool,
}

impl Atom {
    pub fn symbol(&self) -> &'static str {
        element::symbol(self.atomic_number).unwrap_or("*")
    }
}

/// A bond between two atoms
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bond {
    pub begin: usize,
    pub end: usize,
    pub order: BondOrder,
}

/// Atoms, bonds, and adjacency lists
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Molecule {
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
    /// adjacency[atom] = (neighbor atom, bond index)
    adjacency: Vec<Vec<(usize, usize)>>,
}

impl Molecule {
    pub fn new(atoms: Vec<Atom>, bonds: Vec<Bond>) -> Self {
        let mut adjacency = vec![Vec::new(); atoms.len()];
        for (index, bond) in bonds.iter().enumerate() {
            adjacency[bond.begin].push((bond.end, index));
            adjacency[bond.end].push((bond.begin, index));
        }
        Self {
            atoms,
            bonds,
            adjacency,
        }
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn heavy_atom_count(&self) -> usize {
        self.atoms.iter().filter(|a| a.atomic_number != 1).count()
    }

    pub fn degree(&self, atom: usize) -> usize {
        self.adjacency[atom].len()
    }

    /// Neighbors of an atom as (neighbor, bond index) pairs
    pub fn neighbors(&self, atom: usize) -> &[(usize, usize)] {
        &self.adjacency[atom]
    }

    /// Sum of bond valences around an atom
    pub fn bond_valence(&self, atom: usize) -> u8 {
        self.adjacency[atom]
            .iter()
            .fold(0u8, |sum, &(_, bond)| {
                sum.saturating_add(self.bonds[bond].order.valence())
            })
    }

    /// Hydrogen count implied by the standard valences of the element.
    ///
    /// Returns `None` for elements outside the organic subset. Aromatic atoms
    /// reserve one valence for the pi system. An exceeded valence yields zero
    /// here; [`Molecule::check_valences`] reports it as an error.
    pub fn implied_hydrogens(&self, atom: usize) -> Option<u8> {
        let a = &self.atoms[atom];
        let valences = element::standard_valences(a.atomic_number);
        if valences.is_empty() {
            return None;
        }
        let used = self.bond_valence(atom).saturating_add(u8::from(a.aromatic));
        // Aromatic atoms only take their lowest valence (thiophene `s` has no H)
        let target = if a.aromatic {
            valences[0]
        } else {
            valences
                .iter()
                .copied()
                .find(|&v| v >= used)
                .unwrap_or(valences[valences.len() - 1])
        };
        Some(target.saturating_sub(used))
    }

    /// Bond index between two atoms, if they are bonded
    pub fn bond_between(&self, a: usize, b: usize) -> Option<usize> {
        self.adjacency[a]
            .iter()
            .find(|&&(neighbor, _)| neighbor == b)
            .map(|&(_, bond)| bond)
    }

    /// Fold plain `[H]` atoms into the hydrogen count of their heavy neighbor.
    ///
    /// Only uncharged, isotope-free hydrogens with a single bond to a non-hydrogen
    /// atom are folded. `[2H]`, `[H+]` and `[H][H]` keep their atoms.
    pub fn fold_explicit_hydrogens(&self) -> Molecule {
        let foldable: Vec<Option<usize>> = (0..self.atom_count())
            .map(|index| self.foldable_into(index))
            .collect();
        if foldable.iter().all(Option::is_none) {
            return self.clone();
        }

        let mut atoms = self.atoms.clone();
        for &heavy in foldable.iter().flatten() {
            atoms[heavy].hydrogens = atoms[heavy].hydrogens.saturating_add(1);
        }

        let kept: Vec<usize> = (0..self.atom_count())
            .filter(|&index| foldable[index].is_none())
            .collect();
        let mut remap = vec![usize::MAX; self.atom_count()];
        for (new_index, &old_index) in kept.iter().enumerate() {
            remap[old_index] = new_index;
        }

        let new_atoms = kept.iter().map(|&i| atoms[i].clone()).collect();
        let new_bonds = self
            .bonds
            .iter()
            .filter(|b| remap[b.begin] != usize::MAX && remap[b.end] != usize::MAX)
            .map(|b| Bond {
                begin: remap[b.begin],
                end: remap[b.end],
                order: b.order,
            })
            .collect();
        Molecule::new(new_atoms, new_bonds)
    }

    fn foldable_into(&self, index: usize) -> Option<usize> {
        let atom = &self.atoms[index];
        if atom.atomic_number != 1
            || atom.charge != 0
            || atom.isotope.is_some()
            || atom.hydrogens != 0
        {
            return None;
        }
        match self.adjacency[index].as_slice() {
            &[(neighbor, bond)]
                if self.bonds[bond].order == BondOrder::Single
                    && self.atoms[neighbor].atomic_number != 1 =>
            {
                Some(neighbor)
            }
            _ => None,
        }
    }

    /// Reject unbracketed atoms whose bonds exceed the largest standard valence.
    pub fn check_valences(&self) -> SmilesResult<()> {
        for (index, atom) in self.atoms.iter().enumerate() {
            if atom.bracketed {
                continue;
            }
            let valences = element::standard_valences(atom.atomic_number);
            let Some(&max) = valences.last() else {
                continue;
            };
            // Aromatic atoms may donate a lone pair instead of a bond
            let used = self.bond_valence(index);
            if used > max {
                return Err(SmilesError::InvalidValence {
                    index,
                    symbol: atom.symbol().to_string(),
                    valence: used,
                });
            }
        }
        Ok(())
    }

    /// Connected components, each listed in ascending atom order.
    ///
    /// Components are ordered by their lowest atom index.
    pub fn fragments(&self) -> Vec<Vec<usize>> {
        let mut component = vec![usize::MAX; self.atom_count()];
        let mut fragments = Vec::new();

        for start in 0..self.atom_count() {
            if component[start] != usize::MAX {
                continue;
            }
            let id = fragments.len();
            let mut members = vec![start];
            let mut stack = vec![start];
            component[start] = id;
            while let Some(atom) = stack.pop() {
                for &(neighbor, _) in &self.adjacency[atom] {
                    if component[neighbor] == usize::MAX {
                        component[neighbor] = id;
                        members.push(neighbor);
                        stack.push(neighbor);
                    }
                }
            }
            members.sort_unstable();
            fragments.push(members);
        }

        fragments
    }

    /// Copy of the induced subgraph over `atoms` (which must be a union of fragments).
    pub fn subgraph(&self, atoms: &[usize]) -> Molecule {
        let mut remap = vec![usize::MAX; self.atom_count()];
        for (new_index, &old_index) in atoms.iter().enumerate() {
            remap[old_index] = new_index;
        }

        let new_atoms = atoms.iter().map(|&i| self.atoms[i].clone()).collect();
        let new_bonds = self
            .bonds
            .iter()
            .filter(|b| remap[b.begin] != usize::MAX && remap[b.end] != usize::MAX)
            .map(|b| Bond {
                begin: remap[b.begin],
                end: remap[b.end],
                order: b.order,
            })
            .collect();

        Molecule::new(new_atoms, new_bonds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carbon() -> Atom {
        Atom {
            atomic_number: 6,
            charge: 0,
            isotope: None,
            aromatic: false,
            hydrogens: 0,
            bracketed: false,
        }
    }

    fn chain(orders: &[BondOrder]) -> Molecule {
        let atoms = vec![carbon(); orders.len() + 1];
        let bonds = orders
            .iter()
            .enumerate()
            .map(|(i, &order)| Bond {
                begin: i,
                end: i + 1,
                order,
            })
            .collect();
        Molecule::new(atoms, bonds)
    }

    #[test]
    fn test_implied_hydrogens() {
        let mol = chain(&[BondOrder::Single, BondOrder::Double]);
        assert_eq!(mol.implied_hydrogens(0), Some(3));
        assert_eq!(mol.implied_hydrogens(1), Some(1));
        assert_eq!(mol.implied_hydrogens(2), Some(2));
    }

    #[test]
    fn test_fold_explicit_hydrogens() {
        let hydrogen = Atom {
            atomic_number: 1,
            bracketed: true,
            ..carbon()
        };
        let mut atoms = vec![hydrogen.clone(), carbon(), hydrogen.clone(), hydrogen];
        atoms[3].isotope = Some(2);
        let bonds = (0..3)
            .filter(|&i| i != 1)
            .map(|i| Bond {
                begin: 1,
                end: i,
                order: BondOrder::Single,
            })
            .collect();
        let mol = Molecule::new(atoms, bonds);

        let folded = mol.fold_explicit_hydrogens();
        // Both plain hydrogens are folded, the deuterium atom is not bonded and stays
        assert_eq!(folded.atom_count(), 2);
        assert_eq!(folded.bond_count(), 0);
        assert_eq!(folded.atoms[0].hydrogens, 2);
        assert_eq!(folded.atoms[1].isotope, Some(2));
    }

    #[test]
    fn test_hydrogen_pair_is_not_folded() {
        let hydrogen = Atom {
            atomic_number: 1,
            bracketed: true,
            ..carbon()
        };
        let mol = Molecule::new(
            vec![hydrogen.clone(), hydrogen],
            vec![Bond {
                begin: 0,
                end: 1,
                order: BondOrder::Single,
            }],
        );
        assert_eq!(mol.fold_explicit_hydrogens().atom_count(), 2);
    }

    #[test]
    fn test_check_valences_rejects_pentavalent_carbon() {
        let atoms = vec![carbon(); 6];
        let bonds = (1..6)
            .map(|i| Bond {
                begin: 0,
                end: i,
                order: BondOrder::Single,
            })
            .collect();
        let mol = Molecule::new(atoms, bonds);
        assert!(matches!(
            mol.check_valences(),
            Err(SmilesError::InvalidValence { index: 0, .. })
        ));
    }

    #[test]
    fn test_fragments_and_subgraph() {
        let mut atoms = vec![carbon(); 4];
        atoms[3].atomic_number = 8;
        let bonds = vec![
            Bond {
                begin: 0,
                end: 2,
                order: BondOrder::Single,
            },
            Bond {
                begin: 1,
                end: 3,
                order: BondOrder::Single,
            },
        ];
        let mol = Molecule::new(atoms, bonds);
        let fragments = mol.fragments();
        assert_eq!(fragments, vec![vec![0, 2], vec![1, 3]]);

        let sub = mol.subgraph(&fragments[1]);
        assert_eq!(sub.atom_count(), 2);
        assert_eq!(sub.bond_count(), 1);
        assert_eq!(sub.atoms[1].atomic_number, 8);
    }
}
