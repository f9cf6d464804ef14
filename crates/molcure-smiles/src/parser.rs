//! SMILES string parser
//!
//! Reads the organic subset, the `*` wildcard, bracket atoms, bonds, branches,
//! ring closures and fragment separators. Tetrahedral marks (`@`, `@@`, `@TH1`, ...) and
//! directional bonds (`/`, `\`) are consumed without being recorded.

use std::collections::BTreeMap;

use crate::element;
use crate::error::{SmilesError, SmilesResult};
use crate::graph::{Atom, Bond, BondOrder, Molecule};

/// Parse a SMILES string into a stereo-free molecular graph.
pub fn parse_smiles(smiles: &str) -> SmilesResult<Molecule> {
    if smiles.trim().is_empty() {
        return Err(SmilesError::Empty);
    }

    let mut parser = Parser::new(smiles);
    parser.parse()?;
    parser.finish()
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    /// Open ring closures: number -> (atom, bond order written at the opening)
    rings: BTreeMap<u16, (usize, Option<BondOrder>)>,
    branches: Vec<usize>,
    prev_atom: Option<usize>,
    pending_bond: Option<BondOrder>,
    /// Position of the pending bond symbol, for error reporting
    pending_pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
            atoms: Vec::new(),
            bonds: Vec::new(),
            rings: BTreeMap::new(),
            branches: Vec::new(),
            prev_atom: None,
            pending_bond: None,
            pending_pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn unexpected(&self, ch: u8) -> SmilesError {
        SmilesError::UnexpectedCharacter {
            character: ch as char,
            position: self.pos,
        }
    }

    fn set_bond(&mut self, order: BondOrder) -> SmilesResult<()> {
        if self.pending_bond.is_some() {
            return Err(SmilesError::DanglingBond(self.pending_pos));
        }
        self.pending_pos = self.pos;
        self.pending_bond = Some(order);
        self.pos += 1;
        Ok(())
    }

    fn parse(&mut self) -> SmilesResult<()> {
        while let Some(ch) = self.peek() {
            match ch {
                b'(' => {
                    let prev = self.prev_atom.ok_or(SmilesError::UnbalancedBranch(self.pos))?;
                    if self.pending_bond.is_some() {
                        return Err(SmilesError::DanglingBond(self.pending_pos));
                    }
                    self.branches.push(prev);
                    self.pos += 1;
                }
                b')' => {
                    if self.pending_bond.is_some() {
                        return Err(SmilesError::DanglingBond(self.pending_pos));
                    }
                    let prev = self
                        .branches
                        .pop()
                        .ok_or(SmilesError::UnbalancedBranch(self.pos))?;
                    self.prev_atom = Some(prev);
                    self.pos += 1;
                }
                b'-' => self.set_bond(BondOrder::Single)?,
                b'=' => self.set_bond(BondOrder::Double)?,
                b'#' => self.set_bond(BondOrder::Triple)?,
                b':' => self.set_bond(BondOrder::Aromatic)?,
                b'/' | b'\\' => {
                    // Directional single bond; geometry is discarded
                    self.set_bond(BondOrder::Single)?;
                }
                b'%' => {
                    self.pos += 1;
                    let number = self.two_digit_ring_number()?;
                    self.ring_closure(number)?;
                }
                b'0'..=b'9' => {
                    self.pos += 1;
                    self.ring_closure(u16::from(ch - b'0'))?;
                }
                b'[' => self.bracket_atom()?,
                b'.' => {
                    if self.pending_bond.is_some() {
                        return Err(SmilesError::DanglingBond(self.pending_pos));
                    }
                    if !self.branches.is_empty() {
                        return Err(SmilesError::UnbalancedBranch(self.pos));
                    }
                    if self.prev_atom.is_none() {
                        return Err(SmilesError::EmptyFragment(self.pos));
                    }
                    self.prev_atom = None;
                    self.pos += 1;
                }
                b'*' => {
                    self.pos += 1;
                    self.push_atom(wildcard())?;
                }
                _ if is_organic_start(ch) => self.organic_atom()?,
                _ => return Err(self.unexpected(ch)),
            }
        }
        Ok(())
    }

    fn organic_atom(&mut self) -> SmilesResult<()> {
        let start = self.pos;
        let ch = self.advance().ok_or(SmilesError::Empty)?;
        let aromatic = ch.is_ascii_lowercase();

        let symbol = match (ch, self.peek()) {
            (b'C', Some(b'l')) => {
                self.pos += 1;
                "Cl"
            }
            (b'B', Some(b'r')) => {
                self.pos += 1;
                "Br"
            }
            (b'B' | b'b', _) => "B",
            (b'C' | b'c', _) => "C",
            (b'N' | b'n', _) => "N",
            (b'O' | b'o', _) => "O",
            (b'P' | b'p', _) => "P",
            (b'S' | b's', _) => "S",
            (b'F', _) => "F",
            (b'I', _) => "I",
            _ => {
                return Err(SmilesError::UnexpectedCharacter {
                    character: ch as char,
                    position: start,
                })
            }
        };

        let atomic_number =
            element::atomic_number(symbol).ok_or_else(|| SmilesError::UnknownElement(symbol.into()))?;

        self.push_atom(Atom {
            atomic_number,
            charge: 0,
            isotope: None,
            aromatic,
            hydrogens: 0,
            bracketed: false,
        })
    }

    fn bracket_atom(&mut self) -> SmilesResult<()> {
        let start = self.pos;
        self.pos += 1; // '['

        let isotope = match self.number() {
            Some(n) => Some(u16::try_from(n).map_err(|_| SmilesError::BracketAtom(start))?),
            None => None,
        };

        let first = self.advance().ok_or(SmilesError::BracketAtom(start))?;
        let (atomic_number, aromatic) = if first == b'*' {
            (0, false)
        } else {
            self.bracket_element(first, start)?
        };

        self.skip_chirality();

        let mut hydrogens = 0u8;
        if self.peek() == Some(b'H') {
            self.pos += 1;
            hydrogens = match self.number() {
                Some(n) => u8::try_from(n).map_err(|_| SmilesError::BracketAtom(start))?,
                None => 1,
            };
        }

        let charge = self.charge(start)?;

        // Atom class, e.g. [CH3:1]
        if self.peek() == Some(b':') {
            self.pos += 1;
            if self.number().is_none() {
                return Err(SmilesError::BracketAtom(start));
            }
        }

        if self.advance() != Some(b']') {
            return Err(SmilesError::BracketAtom(start));
        }

        self.push_atom(Atom {
            atomic_number,
            charge,
            isotope,
            aromatic,
            hydrogens,
            bracketed: true,
        })
    }

    fn bracket_element(&mut self, first: u8, start: usize) -> SmilesResult<(u8, bool)> {
        if !first.is_ascii_alphabetic() {
            return Err(SmilesError::BracketAtom(start));
        }
        let aromatic = first.is_ascii_lowercase();
        let upper = first.to_ascii_uppercase() as char;

        // Prefer a two-letter symbol when the second letter names a real element
        let mut symbol = upper.to_string();
        if let Some(next) = self.peek() {
            if next.is_ascii_lowercase() {
                let candidate = format!("{}{}", upper, next as char);
                if element::atomic_number(&candidate).is_some() {
                    symbol = candidate;
                    self.pos += 1;
                }
            }
        }

        let atomic_number = element::atomic_number(&symbol)
            .ok_or_else(|| SmilesError::UnknownElement(symbol.clone()))?;
        if aromatic && !element::can_be_aromatic(atomic_number) {
            return Err(SmilesError::UnknownElement(symbol.to_lowercase()));
        }
        Ok((atomic_number, aromatic))
    }

    fn skip_chirality(&mut self) {
        while self.peek() == Some(b'@') {
            self.pos += 1;
        }
        let class = (self.peek(), self.peek_at(1));
        if matches!(
            class,
            (Some(b'T'), Some(b'H'))
                | (Some(b'A'), Some(b'L'))
                | (Some(b'S'), Some(b'P'))
                | (Some(b'T'), Some(b'B'))
                | (Some(b'O'), Some(b'H'))
        ) && self.peek_at(2).is_some_and(|c| c.is_ascii_digit())
        {
            self.pos += 2;
            self.number();
        }
    }

    fn charge(&mut self, start: usize) -> SmilesResult<i8> {
        let sign: i8 = match self.peek() {
            Some(b'+') => 1,
            Some(b'-') => -1,
            _ => return Ok(0),
        };
        let symbol = self.peek();
        self.pos += 1;

        if let Some(n) = self.number() {
            let magnitude = i8::try_from(n).map_err(|_| SmilesError::BracketAtom(start))?;
            return Ok(sign * magnitude);
        }

        let mut magnitude = 1i8;
        while self.peek() == symbol {
            self.pos += 1;
            magnitude = magnitude
                .checked_add(1)
                .ok_or(SmilesError::BracketAtom(start))?;
        }
        Ok(sign * magnitude)
    }

    fn number(&mut self) -> Option<u32> {
        let mut value: u32 = 0;
        let mut found = false;
        while let Some(ch) = self.peek() {
            if !ch.is_ascii_digit() {
                break;
            }
            value = value.saturating_mul(10).saturating_add(u32::from(ch - b'0'));
            found = true;
            self.pos += 1;
        }
        found.then_some(value)
    }

    fn two_digit_ring_number(&mut self) -> SmilesResult<u16> {
        match (self.peek(), self.peek_at(1)) {
            (Some(d1), Some(d2)) if d1.is_ascii_digit() && d2.is_ascii_digit() => {
                self.pos += 2;
                Ok(u16::from(d1 - b'0') * 10 + u16::from(d2 - b'0'))
            }
            (Some(ch), _) if !ch.is_ascii_digit() => Err(self.unexpected(ch)),
            _ => Err(SmilesError::UnexpectedCharacter {
                character: '%',
                position: self.pos.saturating_sub(1),
            }),
        }
    }

    fn ring_closure(&mut self, number: u16) -> SmilesResult<()> {
        let current = self
            .prev_atom
            .ok_or(SmilesError::RingWithoutAtom(number))?;

        match self.rings.remove(&number) {
            Some((open_atom, open_order)) => {
                let order = match (self.pending_bond.take(), open_order) {
                    (Some(a), Some(b)) if a != b => {
                        return Err(SmilesError::DanglingBond(self.pending_pos))
                    }
                    (Some(order), _) | (None, Some(order)) => order,
                    (None, None) => self.default_order(open_atom, current),
                };
                self.add_bond(open_atom, current, order)
            }
            None => {
                let order = self.pending_bond.take();
                self.rings.insert(number, (current, order));
                Ok(())
            }
        }
    }

    fn default_order(&self, a: usize, b: usize) -> BondOrder {
        if self.atoms[a].aromatic && self.atoms[b].aromatic {
            BondOrder::Aromatic
        } else {
            BondOrder::Single
        }
    }

    fn push_atom(&mut self, atom: Atom) -> SmilesResult<()> {
        if self.prev_atom.is_none() && self.pending_bond.is_some() {
            return Err(SmilesError::DanglingBond(self.pending_pos));
        }
        let index = self.atoms.len();
        self.atoms.push(atom);
        if let Some(prev) = self.prev_atom {
            let order = self
                .pending_bond
                .take()
                .unwrap_or_else(|| self.default_order(prev, index));
            self.add_bond(prev, index, order)?;
        }
        self.pending_bond = None;
        self.prev_atom = Some(index);
        Ok(())
    }

    fn add_bond(&mut self, a: usize, b: usize, order: BondOrder) -> SmilesResult<()> {
        let exists = self
            .bonds
            .iter()
            .any(|bond| (bond.begin == a && bond.end == b) || (bond.begin == b && bond.end == a));
        if a == b || exists {
            return Err(SmilesError::DuplicateBond(a.min(b), a.max(b)));
        }
        self.bonds.push(Bond {
            begin: a,
            end: b,
            order,
        });
        Ok(())
    }

    fn finish(self) -> SmilesResult<Molecule> {
        if self.pending_bond.is_some() {
            return Err(SmilesError::DanglingBond(self.pending_pos));
        }
        if !self.branches.is_empty() {
            return Err(SmilesError::UnbalancedBranch(self.input.len()));
        }
        if !self.rings.is_empty() {
            return Err(SmilesError::UnclosedRing(self.rings.keys().copied().collect()));
        }
        if self.atoms.is_empty() {
            return Err(SmilesError::Empty);
        }
        if self.prev_atom.is_none() {
            // Trailing '.'
            return Err(SmilesError::EmptyFragment(self.input.len()));
        }

        let mut mol = Molecule::new(self.atoms, self.bonds);
        for index in 0..mol.atom_count() {
            if !mol.atoms[index].bracketed {
                if let Some(h) = mol.implied_hydrogens(index) {
                    mol.atoms[index].hydrogens = h;
                }
            }
        }
        Ok(mol)
    }
}

/// Unknown or unspecified atom, atomic number 0
fn wildcard() -> Atom {
    Atom {
        atomic_number: 0,
        charge: 0,
        isotope: None,
        aromatic: false,
        hydrogens: 0,
        bracketed: false,
    }
}

fn is_organic_start(ch: u8) -> bool {
    matches!(
        ch,
        b'B' | b'C' | b'N' | b'O' | b'P' | b'S' | b'F' | b'I' | b'b' | b'c' | b'n' | b'o' | b'p' | b's'
    )
}
