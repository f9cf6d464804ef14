//! Element symbols and the standard valences of the organic subset.

const SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh",
    "Fl", "Mc", "Lv", "Ts", "Og",
];

/// Symbols that may be written in lowercase (aromatic) form inside brackets.
const AROMATIC_SYMBOLS: [&str; 9] = ["B", "C", "N", "O", "P", "S", "Se", "As", "Te"];

/// Look up the atomic number for an element symbol (case-sensitive, e.g. `"Cl"`).
pub fn atomic_number(symbol: &str) -> Option<u8> {
    SYMBOLS
        .iter()
        .position(|s| *s == symbol)
        .map(|i| (i + 1) as u8)
}

/// Element symbol for an atomic number.
pub fn symbol(atomic_number: u8) -> Option<&'static str> {
    match atomic_number {
        0 => None,
        n => SYMBOLS.get(n as usize - 1).copied(),
    }
}

/// Whether the element may carry an aromatic (lowercase) symbol.
pub fn can_be_aromatic(atomic_number: u8) -> bool {
    symbol(atomic_number).is_some_and(|s| AROMATIC_SYMBOLS.contains(&s))
}

/// Standard valences for organic subset elements, ascending.
///
/// Empty for elements outside the organic subset; such atoms must be
/// written in brackets and never receive implied hydrogens.
pub fn standard_valences(atomic_number: u8) -> &'static [u8] {
    match atomic_number {
        5 => &[3],
        6 => &[4],
        7 => &[3, 5],
        8 => &[2],
        15 => &[3, 5],
        16 => &[2, 4, 6],
        9 | 17 | 35 | 53 => &[1],
        _ => &[],
    }
}

/// Whether an element belongs to the SMILES organic subset.
pub fn is_organic_subset(atomic_number: u8) -> bool {
    !standard_valences(atomic_number).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_round_trip() {
        assert_eq!(atomic_number("C"), Some(6));
        assert_eq!(atomic_number("Cl"), Some(17));
        assert_eq!(atomic_number("Og"), Some(118));
        assert_eq!(symbol(35), Some("Br"));
        assert_eq!(symbol(0), None);
        assert_eq!(symbol(119), None);
    }

    #[test]
    fn test_unknown_symbol() {
        assert_eq!(atomic_number("Xx"), None);
        assert_eq!(atomic_number("cl"), None);
    }

    #[test]
    fn test_organic_subset() {
        assert!(is_organic_subset(6));
        assert!(is_organic_subset(53));
        assert!(!is_organic_subset(26));
        assert!(can_be_aromatic(34));
        assert!(!can_be_aromatic(17));
    }
}
