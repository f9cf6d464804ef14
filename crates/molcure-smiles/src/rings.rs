//! Smallest set of smallest rings

use std::collections::VecDeque;

use crate::graph::Molecule;

/// Smallest set of smallest rings, each ring listed as atoms in walk order.
///
/// Rings are ordered by size. The number of rings equals the cyclomatic
/// number of the graph whenever enough distinct shortest rings exist.
pub fn smallest_rings(mol: &Molecule) -> Vec<Vec<usize>> {
    let expected = (mol.bond_count() + mol.fragments().len()).saturating_sub(mol.atom_count());
    if expected == 0 {
        return Vec::new();
    }

    let in_ring = ring_atoms(mol);
    let mut rings: Vec<Vec<usize>> = Vec::new();
    for (index, bond) in mol.bonds.iter().enumerate() {
        if !in_ring[bond.begin] || !in_ring[bond.end] {
            continue;
        }
        if let Some(mut ring) = shortest_path(mol, bond.begin, bond.end, index, &in_ring) {
            normalize(&mut ring);
            if !rings.contains(&ring) {
                rings.push(ring);
            }
        }
    }

    rings.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    rings.truncate(expected);
    rings
}

/// Bond indices around a ring, closing bond last
pub fn ring_bonds(mol: &Molecule, ring: &[usize]) -> Vec<usize> {
    ring.iter()
        .zip(ring.iter().cycle().skip(1))
        .filter_map(|(&a, &b)| mol.bond_between(a, b))
        .collect()
}

/// Atoms left after repeatedly pruning atoms of degree one or less
fn ring_atoms(mol: &Molecule) -> Vec<bool> {
    let mut degree: Vec<usize> = (0..mol.atom_count()).map(|i| mol.degree(i)).collect();
    let mut removed = vec![false; mol.atom_count()];
    let mut queue: VecDeque<usize> = (0..mol.atom_count()).filter(|&i| degree[i] <= 1).collect();

    while let Some(atom) = queue.pop_front() {
        if removed[atom] {
            continue;
        }
        removed[atom] = true;
        for &(neighbor, _) in mol.neighbors(atom) {
            if !removed[neighbor] {
                degree[neighbor] -= 1;
                if degree[neighbor] <= 1 {
                    queue.push_back(neighbor);
                }
            }
        }
    }

    removed.into_iter().map(|r| !r).collect()
}

/// Breadth-first path between the ends of `excluded`, avoiding that bond
fn shortest_path(
    mol: &Molecule,
    start: usize,
    end: usize,
    excluded: usize,
    in_ring: &[bool],
) -> Option<Vec<usize>> {
    let mut parent = vec![usize::MAX; mol.atom_count()];
    let mut seen = vec![false; mol.atom_count()];
    let mut queue = VecDeque::from([start]);
    seen[start] = true;

    while let Some(atom) = queue.pop_front() {
        if atom == end {
            let mut path = vec![end];
            let mut node = end;
            while node != start {
                node = parent[node];
                path.push(node);
            }
            path.reverse();
            return Some(path);
        }
        for &(neighbor, bond) in mol.neighbors(atom) {
            if bond != excluded && in_ring[neighbor] && !seen[neighbor] {
                seen[neighbor] = true;
                parent[neighbor] = atom;
                queue.push_back(neighbor);
            }
        }
    }
    None
}

/// Rotate to the lowest atom first, then walk toward its lower neighbor.
fn normalize(ring: &mut [usize]) {
    let Some(lowest) = ring
        .iter()
        .enumerate()
        .min_by_key(|&(_, &atom)| atom)
        .map(|(position, _)| position)
    else {
        return;
    };
    ring.rotate_left(lowest);
    if ring.len() > 2 && ring[ring.len() - 1] < ring[1] {
        ring[1..].reverse();
    }
}
