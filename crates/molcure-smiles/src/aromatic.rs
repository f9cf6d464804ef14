//! Aromaticity normalization
//!
//! Lowercase (aromatic) input is first turned into an alternating single and
//! double bond structure. Aromaticity is then perceived on that structure the
//! same way for every input, so `c1ccccc1` and `C1=CC=CC=C1` end up as the same
//! graph.
//!
//! A ring is aromatic when its pi electron count is 4n + 2. Each ring atom
//! contributes:
//!
//! - 1 for a double bond inside the ring, or to an atom of an already aromatic
//!   ring (fused systems)
//! - 0 for a carbon with an exocyclic double bond to N, O or S, and for `[C+]`
//!   or trivalent boron
//! - 2 for a lone pair (pyrrole-type N or P, O, S, Se, Te, `[C-]`)
//!
//! Any other atom (sp3 carbon, triple bonds) makes the ring non-aromatic.

use crate::element;
use crate::error::{SmilesError, SmilesResult};
use crate::graph::{Bond, BondOrder, Molecule};
use crate::rings::{ring_bonds, smallest_rings};

/// Re-derive aromatic atoms and bonds from the ring structure.
pub fn normalize_aromaticity(mol: &Molecule) -> SmilesResult<Molecule> {
    let kekule = kekulize(mol)?;
    Ok(perceive(&kekule))
}

/// Replace aromatic bonds with single and double bonds.
///
/// Fails with [`SmilesError::Kekulization`] when the aromatic atoms that need
/// a double bond cannot all be paired.
pub fn kekulize(mol: &Molecule) -> SmilesResult<Molecule> {
    if !mol.atoms.iter().any(|a| a.aromatic)
        && !mol.bonds.iter().any(|b| b.order == BondOrder::Aromatic)
    {
        return Ok(mol.clone());
    }

    let needs_double: Vec<bool> = (0..mol.atom_count())
        .map(|index| needs_pi_bond(mol, index))
        .collect();

    let mut partner = vec![None; mol.atom_count()];
    if !pair_atoms(mol, &needs_double, &mut partner) {
        let unpaired = (0..mol.atom_count())
            .filter(|&i| needs_double[i])
            .collect();
        return Err(SmilesError::Kekulization(unpaired));
    }

    let bonds = mol
        .bonds
        .iter()
        .map(|bond| {
            let order = match bond.order {
                BondOrder::Aromatic if partner[bond.begin] == Some(bond.end) => BondOrder::Double,
                BondOrder::Aromatic => BondOrder::Single,
                order => order,
            };
            Bond { order, ..bond.clone() }
        })
        .collect();
    let atoms = mol
        .atoms
        .iter()
        .map(|atom| {
            let mut atom = atom.clone();
            atom.aromatic = false;
            atom
        })
        .collect();

    Ok(Molecule::new(atoms, bonds))
}

/// Valence an aromatic-capable element reaches at the given charge
fn target_valence(atomic_number: u8, charge: i8) -> Option<i16> {
    let charge = i16::from(charge);
    match atomic_number {
        5 => Some(3 - charge),
        6 => Some(4 - charge.abs()),
        7 | 15 | 33 => Some(3 + charge),
        8 | 16 | 34 | 52 => Some(2 + charge),
        _ => None,
    }
}

/// Whether an aromatic atom has exactly one valence left for a ring double bond
fn needs_pi_bond(mol: &Molecule, index: usize) -> bool {
    let atom = &mol.atoms[index];
    if !atom.aromatic {
        return false;
    }
    let has_double = mol.neighbors(index).iter().any(|&(_, bond)| {
        matches!(mol.bonds[bond].order, BondOrder::Double | BondOrder::Triple)
    });
    if has_double {
        return false;
    }

    let used = i16::from(mol.bond_valence(index)) + i16::from(atom.hydrogens);
    target_valence(atom.atomic_number, atom.charge) == Some(used + 1)
}

/// Perfect matching of the atoms needing a double bond, over aromatic bonds.
///
/// Always extends the atom with the fewest open choices, backtracking on a
/// dead end. Ring systems are small enough for this to stay fast.
fn pair_atoms(mol: &Molecule, needs: &[bool], partner: &mut [Option<usize>]) -> bool {
    let choices = |atom: usize, partner: &[Option<usize>]| -> Vec<usize> {
        mol.neighbors(atom)
            .iter()
            .filter(|&&(neighbor, bond)| {
                needs[neighbor]
                    && partner[neighbor].is_none()
                    && mol.bonds[bond].order == BondOrder::Aromatic
            })
            .map(|&(neighbor, _)| neighbor)
            .collect()
    };

    let next = (0..mol.atom_count())
        .filter(|&i| needs[i] && partner[i].is_none())
        .map(|i| (choices(i, &*partner), i))
        .min_by_key(|(options, i)| (options.len(), *i));
    let Some((options, atom)) = next else {
        return true;
    };

    for neighbor in options {
        partner[atom] = Some(neighbor);
        partner[neighbor] = Some(atom);
        if pair_atoms(mol, needs, partner) {
            return true;
        }
        partner[atom] = None;
        partner[neighbor] = None;
    }
    false
}

/// Mark every ring (of the smallest set) with 4n + 2 pi electrons aromatic.
fn perceive(mol: &Molecule) -> Molecule {
    let rings = smallest_rings(mol);
    let mut aromatic_atoms = vec![false; mol.atom_count()];
    let mut aromatic_bonds = vec![false; mol.bond_count()];
    let mut done = vec![false; rings.len()];

    loop {
        let mut changed = false;
        for (index, ring) in rings.iter().enumerate() {
            if done[index] {
                continue;
            }
            let bonds = ring_bonds(mol, ring);
            if bonds.len() != ring.len() {
                done[index] = true;
                continue;
            }
            let electrons = ring
                .iter()
                .map(|&atom| pi_electrons(mol, atom, &bonds, &aromatic_bonds))
                .sum::<Option<u32>>();
            if electrons.is_some_and(|e| e % 4 == 2) {
                for &atom in ring {
                    aromatic_atoms[atom] = true;
                }
                for &bond in &bonds {
                    aromatic_bonds[bond] = true;
                }
                done[index] = true;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let atoms = mol
        .atoms
        .iter()
        .zip(&aromatic_atoms)
        .map(|(atom, &aromatic)| {
            let mut atom = atom.clone();
            atom.aromatic = aromatic;
            atom
        })
        .collect();
    let bonds = mol
        .bonds
        .iter()
        .zip(&aromatic_bonds)
        .map(|(bond, &aromatic)| Bond {
            order: if aromatic { BondOrder::Aromatic } else { bond.order },
            ..bond.clone()
        })
        .collect();
    Molecule::new(atoms, bonds)
}

fn pi_electrons(
    mol: &Molecule,
    index: usize,
    ring_bonds: &[usize],
    aromatic_bonds: &[bool],
) -> Option<u32> {
    let atom = &mol.atoms[index];
    if !element::can_be_aromatic(atom.atomic_number) {
        return None;
    }

    let mut exocyclic_double = None;
    for &(neighbor, bond) in mol.neighbors(index) {
        match mol.bonds[bond].order {
            BondOrder::Triple => return None,
            BondOrder::Double if ring_bonds.contains(&bond) || aromatic_bonds[bond] => {
                return Some(1)
            }
            BondOrder::Double => exocyclic_double = Some(mol.atoms[neighbor].atomic_number),
            _ => {}
        }
    }

    let sigma = mol.degree(index) + usize::from(atom.hydrogens);
    match (atom.atomic_number, atom.charge, exocyclic_double) {
        (6, 0, Some(7 | 8 | 16)) => Some(0),
        (_, _, Some(_)) => None,
        (6, -1, None) => Some(2),
        (6, 1, None) | (5, 0, None) => Some(0),
        (7 | 15 | 33, 0, None) if sigma == 3 => Some(2),
        (8 | 16 | 34 | 52, 0, None) if sigma == 2 => Some(2),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_smiles;

    fn normalized(smiles: &str) -> Molecule {
        normalize_aromaticity(&parse_smiles(smiles).unwrap()).unwrap()
    }

    fn aromatic_count(mol: &Molecule) -> usize {
        mol.atoms.iter().filter(|a| a.aromatic).count()
    }

    #[test]
    fn test_kekulize_benzene() {
        let mol = kekulize(&parse_smiles("c1ccccc1").unwrap()).unwrap();
        let doubles = mol
            .bonds
            .iter()
            .filter(|b| b.order == BondOrder::Double)
            .count();
        assert_eq!(doubles, 3);
        assert!(mol.atoms.iter().all(|a| !a.aromatic));
    }

    #[test]
    fn test_kekulize_pyrrole_keeps_nh_single() {
        let mol = kekulize(&parse_smiles("c1cc[nH]c1").unwrap()).unwrap();
        let nitrogen = 3;
        assert!(mol
            .neighbors(nitrogen)
            .iter()
            .all(|&(_, b)| mol.bonds[b].order == BondOrder::Single));
    }

    #[test]
    fn test_unpairable_aromatic_atoms() {
        // Pyrrole nitrogen without its hydrogen
        let err = kekulize(&parse_smiles("c1ccnc1").unwrap()).unwrap_err();
        assert!(matches!(err, SmilesError::Kekulization(_)));
        assert!(err.is_canonicalization_error());
    }

    #[test]
    fn test_perceived_rings() {
        assert_eq!(aromatic_count(&normalized("C1=CC=CC=C1")), 6);
        assert_eq!(aromatic_count(&normalized("C1=CNC=C1")), 5);
        assert_eq!(aromatic_count(&normalized("C1=COC=C1")), 5);
        assert_eq!(aromatic_count(&normalized("O=C1C=CC=CN1")), 6);
        assert_eq!(aromatic_count(&normalized("C1=CC=C2C=CC=CC2=C1")), 10);
    }

    #[test]
    fn test_non_aromatic_rings() {
        assert_eq!(aromatic_count(&normalized("C1=CCC=C1")), 0);
        assert_eq!(aromatic_count(&normalized("O=C1C=CC(=O)C=C1")), 0);
        assert_eq!(aromatic_count(&normalized("C1=CC=CC=CC=C1")), 0);
        assert_eq!(aromatic_count(&normalized("C1CCCCC1")), 0);
    }

    #[test]
    fn test_biphenyl_link_stays_single() {
        let mol = normalized("c1ccccc1-c1ccccc1");
        assert_eq!(aromatic_count(&mol), 12);
        let link = mol.bond_between(5, 6).unwrap();
        assert_eq!(mol.bonds[link].order, BondOrder::Single);
    }
}
