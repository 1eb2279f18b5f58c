use std::collections::BTreeMap;

use thiserror::Error;
use tracing::*;

use crate::{BondOrder, Element};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SmilesError {
    #[error("Branch start '(' at position {0} (followed by {1}) without a current atom")]
    BranchNoCurrentAtom(usize, String),
    #[error("Branch end ')' at position {0} (followed by {1}) without a matching '('")]
    BranchEndNoStart(usize, String),
    #[error("Ring closure '{0}' at position {1} without a current atom")]
    RingClosureNoCurrentAtom(char, usize),
    #[error("Unclosed bracket '[' at position {0}")]
    UnclosedBracket(usize),
    #[error("Unknown element '{0}' at position {1}")]
    UnknownElement(String, usize),
    #[error("Ring closure {0} was never closed")]
    UnclosedRing(u8),
}

/// One atom of a parsed line-notation fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentAtom {
    pub element: Element,
    pub aromatic: bool,
    pub charge: i8,
    pub hydrogens: Option<u8>,
    pub isotope: Option<u16>,
}

impl FragmentAtom {
    fn new(element: Element, aromatic: bool) -> Self {
        Self {
            element,
            aromatic,
            charge: 0,
            hydrogens: None,
            isotope: None,
        }
    }
}

/// Atoms in reading order, bonds as `(from, to, order)` over those indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmilesFragment {
    pub atoms: Vec<FragmentAtom>,
    pub bonds: Vec<(usize, usize, BondOrder)>,
}

impl SmilesFragment {
    fn add_atom(&mut self, atom: FragmentAtom, previous: Option<usize>, bond: Option<BondOrder>) -> usize {
        let id = self.atoms.len();
        let aromatic = atom.aromatic;
        self.atoms.push(atom);
        if let Some(prev) = previous {
            self.bonds.push((prev, id, self.bond_to_use(prev, aromatic, bond)));
        }
        id
    }

    fn bond_to_use(&self, prev: usize, aromatic: bool, explicit: Option<BondOrder>) -> BondOrder {
        match explicit {
            Some(order) => order,
            None if self.atoms[prev].aromatic && aromatic => BondOrder::Aromatic,
            None => BondOrder::Single,
        }
    }
}

fn organic_element(symbol: &str) -> Option<(Element, bool)> {
    Some(match symbol {
        "B" => (Element::B, false),
        "C" => (Element::C, false),
        "N" => (Element::N, false),
        "O" => (Element::O, false),
        "P" => (Element::P, false),
        "S" => (Element::S, false),
        "F" => (Element::F, false),
        "Cl" => (Element::Cl, false),
        "Br" => (Element::Br, false),
        "I" => (Element::I, false),
        "b" => (Element::B, true),
        "c" => (Element::C, true),
        "n" => (Element::N, true),
        "o" => (Element::O, true),
        "p" => (Element::P, true),
        "s" => (Element::S, true),
        "se" => (Element::Se, true),
        _ => return None,
    })
}

/// Parses the inside of `[...]`: isotope, symbol, H-count and charge.
fn parse_bracket_atom(content: &str, position: usize) -> Result<FragmentAtom, SmilesError> {
    let chars: Vec<char> = content.chars().collect();
    let mut i = 0;

    let mut isotope = String::new();
    while i < chars.len() && chars[i].is_ascii_digit() {
        isotope.push(chars[i]);
        i += 1;
    }

    let mut symbol = String::new();
    if i < chars.len() && chars[i].is_ascii_alphabetic() {
        symbol.push(chars[i]);
        i += 1;
        if i < chars.len() && chars[i].is_ascii_lowercase() {
            symbol.push(chars[i]);
            i += 1;
        }
    }
    let (element, aromatic) = if symbol.chars().next().map(|c| c.is_lowercase()).unwrap_or(false) {
        // Aromatic bracket atoms: [nH], [se], [o+] ...
        let base = symbol[..1].to_uppercase() + &symbol[1..];
        match Element::from_symbol(&base) {
            Some(e) => (e, true),
            None => {
                let e = Element::from_symbol(&symbol[..1].to_uppercase())
                    .ok_or_else(|| SmilesError::UnknownElement(symbol.clone(), position))?;
                i -= symbol.len() - 1;
                (e, true)
            }
        }
    } else {
        match Element::from_symbol(&symbol) {
            Some(e) => (e, false),
            None if symbol.len() == 2 => {
                let e = Element::from_symbol(&symbol[..1])
                    .ok_or_else(|| SmilesError::UnknownElement(symbol.clone(), position))?;
                i -= 1;
                (e, false)
            }
            None => return Err(SmilesError::UnknownElement(symbol, position)),
        }
    };

    let mut atom = FragmentAtom::new(element, aromatic);
    atom.isotope = isotope.parse().ok();
    atom.hydrogens = Some(0);

    while i < chars.len() {
        match chars[i] {
            '@' => i += 1,
            'H' => {
                i += 1;
                let mut digits = String::new();
                while i < chars.len() && chars[i].is_ascii_digit() {
                    digits.push(chars[i]);
                    i += 1;
                }
                atom.hydrogens = Some(digits.parse().unwrap_or(1));
            }
            sign @ ('+' | '-') => {
                i += 1;
                let unit: i8 = if sign == '+' { 1 } else { -1 };
                let mut digits = String::new();
                while i < chars.len() && chars[i].is_ascii_digit() {
                    digits.push(chars[i]);
                    i += 1;
                }
                if digits.is_empty() {
                    atom.charge += unit;
                } else {
                    atom.charge = unit * digits.parse::<i8>().unwrap_or(1);
                }
            }
            ':' => {
                // Atom class; not carried over.
                i = chars.len();
            }
            _ => return Err(SmilesError::UnknownElement(content.to_string(), position)),
        }
    }
    Ok(atom)
}

/// Parses an organic-subset line-notation string into a fragment.
///
/// Stereo marks (`@`, `/`, `\`) are accepted and dropped.
pub fn parse_smiles(smiles: &str) -> Result<SmilesFragment, SmilesError> {
    let mut fragment = SmilesFragment::default();
    let mut current_atom: Option<usize> = None;
    let mut bond_type: Option<BondOrder> = None;
    let mut branch_stack: Vec<usize> = Vec::new();
    let mut ring_map: BTreeMap<u8, (usize, Option<BondOrder>)> = BTreeMap::new();

    let chars: Vec<char> = smiles.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '(' => {
                let atom = current_atom
                    .ok_or_else(|| SmilesError::BranchNoCurrentAtom(i, smiles[i..].to_string()))?;
                branch_stack.push(atom);
                i += 1;
            }
            ')' => {
                current_atom = branch_stack.pop();
                if current_atom.is_none() {
                    return Err(SmilesError::BranchEndNoStart(i, smiles[i..].to_string()));
                }
                i += 1;
            }
            '-' | '=' | '#' | ':' => {
                bond_type = Some(match c {
                    '-' => BondOrder::Single,
                    '=' => BondOrder::Double,
                    '#' => BondOrder::Triple,
                    _ => BondOrder::Aromatic,
                });
                i += 1;
            }
            '%' | '0'..='9' => {
                let (ring_number, width) = if c == '%' {
                    let digits: String = chars.iter().skip(i + 1).take(2).collect();
                    match digits.parse::<u8>() {
                        Ok(n) if digits.len() == 2 => (n, 3),
                        _ => return Err(SmilesError::RingClosureNoCurrentAtom(c, i)),
                    }
                } else {
                    (c.to_digit(10).unwrap_or(0) as u8, 1)
                };
                let current = current_atom.ok_or(SmilesError::RingClosureNoCurrentAtom(c, i))?;
                match ring_map.remove(&ring_number) {
                    Some((start_atom, opening_bond)) => {
                        let explicit = bond_type.or(opening_bond);
                        let aromatic = fragment.atoms[current].aromatic;
                        let order = fragment.bond_to_use(start_atom, aromatic, explicit);
                        fragment.bonds.push((current, start_atom, order));
                    }
                    None => {
                        ring_map.insert(ring_number, (current, bond_type));
                    }
                }
                bond_type = None;
                i += width;
            }
            '[' => {
                let end = chars[i..]
                    .iter()
                    .position(|&x| x == ']')
                    .map(|rel| i + rel)
                    .ok_or(SmilesError::UnclosedBracket(i))?;
                let content: String = chars[i + 1..end].iter().collect();
                let atom = parse_bracket_atom(&content, i)?;
                current_atom = Some(fragment.add_atom(atom, current_atom, bond_type.take()));
                i = end + 1;
            }
            '@' | '/' | '\\' => {
                i += 1;
            }
            '.' => {
                current_atom = None;
                bond_type = None;
                i += 1;
            }
            _ => {
                // Two-letter symbols first (Cl, Br, se), then single letters.
                let two: String = chars.iter().skip(i).take(2).collect();
                let (symbol_len, (element, aromatic)) = match organic_element(&two) {
                    Some(found) if two.len() == 2 => (2, found),
                    _ => match organic_element(&c.to_string()) {
                        Some(found) => (1, found),
                        None => return Err(SmilesError::UnknownElement(c.to_string(), i)),
                    },
                };
                let atom = FragmentAtom::new(element, aromatic);
                current_atom = Some(fragment.add_atom(atom, current_atom, bond_type.take()));
                i += symbol_len;
            }
        }
    }

    if let Some((&ring, _)) = ring_map.iter().next() {
        return Err(SmilesError::UnclosedRing(ring));
    }
    trace!(
        "Parsed fragment '{}': {} atoms, {} bonds",
        smiles,
        fragment.atoms.len(),
        fragment.bonds.len()
    );
    Ok(fragment)
}
