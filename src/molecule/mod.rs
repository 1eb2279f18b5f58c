use std::fmt::{Display, Formatter, Result as FmtResult};

use petgraph::graph::{NodeIndex, UnGraph};

mod builder;
pub use builder::*;

pub mod rings;

mod von_baeyer;
pub use von_baeyer::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Element {
    H,
    B,
    C,
    N,
    O,
    F,
    Si,
    P,
    S,
    Cl,
    Ge,
    As,
    Se,
    Br,
    Sn,
    Te,
    I,
}

impl Element {
    pub fn symbol(&self) -> &'static str {
        match self {
            Element::H => "H",
            Element::B => "B",
            Element::C => "C",
            Element::N => "N",
            Element::O => "O",
            Element::F => "F",
            Element::Si => "Si",
            Element::P => "P",
            Element::S => "S",
            Element::Cl => "Cl",
            Element::Ge => "Ge",
            Element::As => "As",
            Element::Se => "Se",
            Element::Br => "Br",
            Element::Sn => "Sn",
            Element::Te => "Te",
            Element::I => "I",
        }
    }

    pub fn atomic_number(&self) -> u8 {
        match self {
            Element::H => 1,
            Element::B => 5,
            Element::C => 6,
            Element::N => 7,
            Element::O => 8,
            Element::F => 9,
            Element::Si => 14,
            Element::P => 15,
            Element::S => 16,
            Element::Cl => 17,
            Element::Ge => 32,
            Element::As => 33,
            Element::Se => 34,
            Element::Br => 35,
            Element::Sn => 50,
            Element::Te => 52,
            Element::I => 53,
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "H" => Element::H,
            "B" => Element::B,
            "C" => Element::C,
            "N" => Element::N,
            "O" => Element::O,
            "F" => Element::F,
            "Si" => Element::Si,
            "P" => Element::P,
            "S" => Element::S,
            "Cl" => Element::Cl,
            "Ge" => Element::Ge,
            "As" => Element::As,
            "Se" => Element::Se,
            "Br" => Element::Br,
            "Sn" => Element::Sn,
            "Te" => Element::Te,
            "I" => Element::I,
            _ => return None,
        })
    }

    /// Elements a substituent may be attached to.
    pub fn accepts_substituents(&self) -> bool {
        matches!(
            self,
            Element::C | Element::N | Element::S | Element::P | Element::Si
        )
    }

    /// Seniority for replacement and Hantzsch-Widman numbering; lower is cited first.
    pub fn replacement_seniority(&self) -> u8 {
        match self {
            Element::O => 1,
            Element::S => 2,
            Element::Se => 3,
            Element::Te => 4,
            Element::N => 5,
            Element::P => 6,
            Element::As => 7,
            Element::Si => 8,
            Element::Ge => 9,
            Element::Sn => 10,
            Element::B => 11,
            _ => u8::MAX,
        }
    }

    pub fn is_heteroatom(&self) -> bool {
        !matches!(self, Element::C | Element::H)
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondStereo {
    #[default]
    None,
    Up,
    Down,
    Either,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chirality {
    Clockwise,
    CounterClockwise,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    pub id: usize,
    pub element: Element,
    pub charge: i8,
    /// Explicit hydrogen count; `None` leaves it implicit.
    pub hydrogens: Option<u8>,
    pub isotope: Option<u16>,
    pub aromatic: bool,
    pub chirality: Option<Chirality>,
    pub atom_class: Option<u32>,
}

impl Atom {
    pub fn new(id: usize, element: Element) -> Self {
        Self {
            id,
            element,
            charge: 0,
            hydrogens: None,
            isotope: None,
            aromatic: false,
            chirality: None,
            atom_class: None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        self.element.symbol()
    }

    pub fn atomic_number(&self) -> u8 {
        self.element.atomic_number()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bond {
    pub atom1: usize,
    pub atom2: usize,
    pub order: BondOrder,
    pub stereo: BondStereo,
}

impl Bond {
    pub fn joins(&self, a: usize, b: usize) -> bool {
        (self.atom1 == a && self.atom2 == b) || (self.atom1 == b && self.atom2 == a)
    }

    pub fn other(&self, atom: usize) -> Option<usize> {
        if self.atom1 == atom {
            Some(self.atom2)
        } else if self.atom2 == atom {
            Some(self.atom1)
        } else {
            None
        }
    }
}

/// The frozen result of a build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Molecule {
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
}

impl Molecule {
    pub fn neighbors(&self, atom: usize) -> Vec<usize> {
        self.bonds.iter().filter_map(|b| b.other(atom)).collect()
    }

    pub fn bond_between(&self, a: usize, b: usize) -> Option<&Bond> {
        self.bonds.iter().find(|bond| bond.joins(a, b))
    }

    pub fn degree(&self, atom: usize) -> usize {
        self.bonds.iter().filter(|b| b.other(atom).is_some()).count()
    }

    pub fn heavy_atom_count(&self) -> usize {
        self.atoms.iter().filter(|a| a.element != Element::H).count()
    }

    pub fn count_element(&self, element: Element) -> usize {
        self.atoms.iter().filter(|a| a.element == element).count()
    }

    pub fn neighbors_with(&self, atom: usize, element: Element) -> Vec<usize> {
        self.neighbors(atom)
            .into_iter()
            .filter(|&n| self.atoms[n].element == element)
            .collect()
    }

    /// Rebuilds a petgraph view of the molecule, node `i` being atom `i`.
    pub fn to_graph(&self) -> UnGraph<Element, BondOrder> {
        let mut graph = UnGraph::new_undirected();
        for atom in &self.atoms {
            graph.add_node(atom.element);
        }
        for bond in &self.bonds {
            graph.add_edge(
                NodeIndex::new(bond.atom1),
                NodeIndex::new(bond.atom2),
                bond.order,
            );
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_round_trip_symbols() {
        for element in [Element::C, Element::Cl, Element::Si, Element::Se] {
            assert_eq!(Element::from_symbol(element.symbol()), Some(element));
        }
        assert_eq!(Element::from_symbol("Xx"), None);
        assert_eq!(Element::Br.atomic_number(), 35);
    }

    #[test]
    fn test_substitutable_elements() {
        assert!(Element::C.accepts_substituents());
        assert!(Element::Si.accepts_substituents());
        assert!(!Element::O.accepts_substituents());
        assert!(!Element::Cl.accepts_substituents());
    }
}
