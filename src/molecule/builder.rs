use std::collections::{BTreeSet, VecDeque};

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use tracing::*;

use super::*;
use crate::SmilesFragment;

/// How far the de-aromatization cascade looks past the atom that lost aromaticity.
const CASCADE_DEPTH: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BondData {
    order: BondOrder,
    stereo: BondStereo,
}

/// Owns every atom and bond of one molecule under construction.
///
/// Atom ids are the petgraph node indices; nodes are never removed, so ids stay
/// dense and in insertion order until [`MoleculeBuilder::build`] freezes them.
#[derive(Debug, Clone, Default)]
pub struct MoleculeBuilder {
    graph: UnGraph<Atom, BondData>,
}

impl MoleculeBuilder {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::new_undirected(),
        }
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn node(&self, id: usize) -> Option<NodeIndex> {
        (id < self.graph.node_count()).then(|| NodeIndex::new(id))
    }

    fn edge(&self, a: usize, b: usize) -> Option<EdgeIndex> {
        self.graph.find_edge(self.node(a)?, self.node(b)?)
    }

    pub fn atom(&self, id: usize) -> Option<&Atom> {
        self.node(id).map(|n| &self.graph[n])
    }

    pub fn element(&self, id: usize) -> Option<Element> {
        self.atom(id).map(|a| a.element)
    }

    pub fn is_aromatic(&self, id: usize) -> bool {
        self.atom(id).map(|a| a.aromatic).unwrap_or(false)
    }

    pub fn add_atom(&mut self, element: Element) -> usize {
        let id = self.graph.node_count();
        self.graph.add_node(Atom::new(id, element));
        id
    }

    pub fn add_aromatic_atom(&mut self, element: Element) -> usize {
        let id = self.add_atom(element);
        self.graph[NodeIndex::new(id)].aromatic = true;
        id
    }

    pub fn add_carbon(&mut self) -> usize {
        self.add_atom(Element::C)
    }

    /// A saturated carbon chain, returned in locant order.
    pub fn add_chain(&mut self, length: usize) -> Vec<usize> {
        let chain: Vec<usize> = (0..length).map(|_| self.add_carbon()).collect();
        for pair in chain.windows(2) {
            self.add_bond(pair[0], pair[1], BondOrder::Single);
        }
        chain
    }

    /// Bonds the last atom of `atoms` back to the first.
    pub fn close_ring(&mut self, atoms: &[usize], order: BondOrder) -> Option<usize> {
        match atoms {
            [first, .., last] if atoms.len() > 2 => self.add_bond(*last, *first, order),
            _ => None,
        }
    }

    /// Adds a bond and returns its index.
    ///
    /// Unknown atoms, self-bonds and duplicate bonds are rejected. An aromatic order
    /// between atoms that are not both aromatic is stored as single.
    pub fn add_bond(&mut self, a: usize, b: usize, order: BondOrder) -> Option<usize> {
        let (na, nb) = (self.node(a)?, self.node(b)?);
        if a == b || self.graph.find_edge(na, nb).is_some() {
            warn!("Refusing bond {} - {}: self-bond or already bonded", a, b);
            return None;
        }
        let order = if order == BondOrder::Aromatic && !(self.is_aromatic(a) && self.is_aromatic(b))
        {
            BondOrder::Single
        } else {
            order
        };
        let edge = self.graph.add_edge(
            na,
            nb,
            BondData {
                order,
                stereo: BondStereo::None,
            },
        );
        Some(edge.index())
    }

    /// Adds a new atom bonded to `anchor`.
    pub fn attach_atom(&mut self, anchor: usize, element: Element, order: BondOrder) -> Option<usize> {
        self.node(anchor)?;
        let atom = self.add_atom(element);
        self.add_bond(anchor, atom, order);
        Some(atom)
    }

    pub fn bond_order(&self, a: usize, b: usize) -> Option<BondOrder> {
        self.edge(a, b).map(|e| self.graph[e].order)
    }

    pub fn bond_stereo(&self, a: usize, b: usize) -> Option<BondStereo> {
        self.edge(a, b).map(|e| self.graph[e].stereo)
    }

    pub fn set_bond_order(&mut self, a: usize, b: usize, order: BondOrder) -> bool {
        if order == BondOrder::Aromatic && !(self.is_aromatic(a) && self.is_aromatic(b)) {
            return false;
        }
        match self.edge(a, b) {
            Some(e) => {
                self.graph[e].order = order;
                true
            }
            None => false,
        }
    }

    pub fn set_bond_stereo(&mut self, a: usize, b: usize, stereo: BondStereo) -> bool {
        match self.edge(a, b) {
            Some(e) => {
                self.graph[e].stereo = stereo;
                true
            }
            None => false,
        }
    }

    /// Neighbor ids in ascending order.
    pub fn neighbors(&self, atom: usize) -> Vec<usize> {
        let Some(node) = self.node(atom) else {
            return Vec::new();
        };
        let set: BTreeSet<usize> = self.graph.neighbors(node).map(|n| n.index()).collect();
        set.into_iter().collect()
    }

    /// `(neighbor, order)` pairs in ascending neighbor order.
    pub fn bonds_of(&self, atom: usize) -> Vec<(usize, BondOrder)> {
        let Some(node) = self.node(atom) else {
            return Vec::new();
        };
        let mut bonds: Vec<(usize, BondOrder)> = self
            .graph
            .edges(node)
            .map(|e| {
                let other = if e.source() == node { e.target() } else { e.source() };
                (other.index(), e.weight().order)
            })
            .collect();
        bonds.sort_by_key(|(n, _)| *n);
        bonds
    }

    pub fn single_bond_count(&self, atom: usize) -> usize {
        self.bonds_of(atom)
            .iter()
            .filter(|(_, order)| *order == BondOrder::Single)
            .count()
    }

    fn update_atom(&mut self, id: usize, f: impl FnOnce(&mut Atom)) -> bool {
        match self.node(id) {
            Some(n) => {
                f(&mut self.graph[n]);
                true
            }
            None => false,
        }
    }

    pub fn replace_element(&mut self, id: usize, element: Element) -> bool {
        self.update_atom(id, |a| a.element = element)
    }

    pub fn set_charge(&mut self, id: usize, charge: i8) -> bool {
        self.update_atom(id, |a| a.charge = charge)
    }

    pub fn set_hydrogens(&mut self, id: usize, hydrogens: Option<u8>) -> bool {
        self.update_atom(id, |a| a.hydrogens = hydrogens)
    }

    pub fn set_chirality(&mut self, id: usize, chirality: Option<Chirality>) -> bool {
        self.update_atom(id, |a| a.chirality = chirality)
    }

    /// True for a carbon carrying a double bond to oxygen or sulfur.
    pub fn is_carbonyl_carbon(&self, atom: usize) -> bool {
        self.element(atom) == Some(Element::C)
            && self.bonds_of(atom).iter().any(|&(n, order)| {
                order == BondOrder::Double
                    && matches!(self.element(n), Some(Element::O) | Some(Element::S))
            })
    }

    /// Puts `=O` (or `=S`) on `atom`, de-aromatizing it first.
    pub fn add_carbonyl(&mut self, atom: usize, element: Element) -> Option<usize> {
        self.node(atom)?;
        self.dearomatize(atom);
        let oxygen = self.attach_atom(atom, element, BondOrder::Double)?;
        // The new carbonyl may break conjugation of heteroatoms next to it.
        self.cascade_from(atom);
        Some(oxygen)
    }

    fn clear_aromatic(&mut self, atom: usize) {
        let Some(node) = self.node(atom) else {
            return;
        };
        self.graph[node].aromatic = false;
        let edges: Vec<EdgeIndex> = self.graph.edges(node).map(|e| e.id()).collect();
        for edge in edges {
            if self.graph[edge].order == BondOrder::Aromatic {
                self.graph[edge].order = BondOrder::Single;
            }
        }
    }

    fn aromatic_bond_count(&self, atom: usize) -> usize {
        self.bonds_of(atom)
            .iter()
            .filter(|(_, order)| *order == BondOrder::Aromatic)
            .count()
    }

    fn conjugation_broken(&self, atom: usize) -> bool {
        let carbonyls = self
            .neighbors(atom)
            .into_iter()
            .filter(|&n| self.is_carbonyl_carbon(n))
            .count();
        self.aromatic_bond_count(atom) == 0 || carbonyls >= 2
    }

    /// Removes aromaticity from `atom` and from nearby heteroatoms that lose
    /// their conjugation because of it.
    ///
    /// This is a bounded neighborhood scan, not a Hückel analysis: only aromatic
    /// heteroatoms within [`CASCADE_DEPTH`] bonds are re-examined.
    pub fn dearomatize(&mut self, atom: usize) {
        if !self.is_aromatic(atom) {
            return;
        }
        self.clear_aromatic(atom);
        self.cascade_from(atom);
    }

    fn cascade_from(&mut self, start: usize) {
        let mut queue = VecDeque::from([(start, 0usize)]);
        let mut seen = BTreeSet::from([start]);
        while let Some((current, depth)) = queue.pop_front() {
            if depth >= CASCADE_DEPTH {
                continue;
            }
            for neighbor in self.neighbors(current) {
                if !seen.insert(neighbor) {
                    continue;
                }
                let hetero = self
                    .element(neighbor)
                    .map(|e| e.is_heteroatom())
                    .unwrap_or(false);
                if hetero && self.is_aromatic(neighbor) && self.conjugation_broken(neighbor) {
                    debug!("Cascade de-aromatizes heteroatom {}", neighbor);
                    self.clear_aromatic(neighbor);
                }
                queue.push_back((neighbor, depth + 1));
            }
        }
    }

    /// Adds hydrogen across `atom`: it loses aromaticity and its multiple bonds
    /// to skeleton neighbors become single. Terminal heteroatoms (C=O, C=S, C=N) stay.
    pub fn saturate_atom(&mut self, atom: usize) {
        self.dearomatize(atom);
        for (neighbor, order) in self.bonds_of(atom) {
            let terminal_hetero = self.neighbors(neighbor).len() == 1
                && self.element(neighbor).map(|e| e.is_heteroatom()).unwrap_or(false);
            if matches!(order, BondOrder::Double | BondOrder::Triple) && !terminal_hetero {
                self.set_bond_order(atom, neighbor, BondOrder::Single);
            }
        }
    }

    /// Turns every double or aromatic bond between members of `ring` into a single bond.
    pub fn convert_ring_double_bonds_to_single(&mut self, ring: &[usize]) {
        for &atom in ring {
            if let Some(node) = self.node(atom) {
                self.graph[node].aromatic = false;
            }
        }
        for (i, &a) in ring.iter().enumerate() {
            for &b in &ring[i + 1..] {
                if let Some(edge) = self.edge(a, b) {
                    if matches!(
                        self.graph[edge].order,
                        BondOrder::Double | BondOrder::Aromatic
                    ) {
                        self.graph[edge].order = BondOrder::Single;
                    }
                }
            }
        }
        // Bonds leaving the ring from a now non-aromatic member can't stay aromatic.
        for &atom in ring {
            for (neighbor, order) in self.bonds_of(atom) {
                if order == BondOrder::Aromatic {
                    self.set_bond_order(atom, neighbor, BondOrder::Single);
                }
            }
        }
    }

    /// Copies a parsed fragment into this builder, returning the new id of each fragment atom.
    pub fn import_fragment(&mut self, fragment: &SmilesFragment) -> Vec<usize> {
        let mapping: Vec<usize> = fragment
            .atoms
            .iter()
            .map(|atom| {
                let id = self.add_atom(atom.element);
                self.update_atom(id, |a| {
                    a.aromatic = atom.aromatic;
                    a.charge = atom.charge;
                    a.hydrogens = atom.hydrogens;
                    a.isotope = atom.isotope;
                });
                id
            })
            .collect();
        for &(a, b, order) in &fragment.bonds {
            if let (Some(&a), Some(&b)) = (mapping.get(a), mapping.get(b)) {
                self.add_bond(a, b, order);
            }
        }
        debug!(
            "Imported fragment of {} atoms and {} bonds",
            fragment.atoms.len(),
            fragment.bonds.len()
        );
        mapping
    }

    /// Freezes the graph into a [`Molecule`].
    pub fn build(self) -> Molecule {
        let atoms = self
            .graph
            .node_indices()
            .map(|n| self.graph[n].clone())
            .collect();
        let bonds = self
            .graph
            .edge_references()
            .map(|e| Bond {
                atom1: e.source().index(),
                atom2: e.target().index(),
                order: e.weight().order,
                stereo: e.weight().stereo,
            })
            .collect();
        Molecule { atoms, bonds }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn benzene_ring(builder: &mut MoleculeBuilder) -> Vec<usize> {
        let ring: Vec<usize> = (0..6).map(|_| builder.add_aromatic_atom(Element::C)).collect();
        for pair in ring.windows(2) {
            builder.add_bond(pair[0], pair[1], BondOrder::Aromatic);
        }
        builder.close_ring(&ring, BondOrder::Aromatic);
        ring
    }

    #[test]
    fn test_ids_are_dense_and_ordered() {
        let mut builder = MoleculeBuilder::new();
        let chain = builder.add_chain(4);
        assert_eq!(chain, vec![0, 1, 2, 3]);
        let molecule = builder.build();
        for (i, atom) in molecule.atoms.iter().enumerate() {
            assert_eq!(atom.id, i);
        }
        assert_eq!(molecule.bonds.len(), 3);
    }

    #[test]
    fn test_rejects_bad_bonds() {
        let mut builder = MoleculeBuilder::new();
        let a = builder.add_carbon();
        let b = builder.add_carbon();
        assert!(builder.add_bond(a, b, BondOrder::Single).is_some());
        assert!(builder.add_bond(a, b, BondOrder::Single).is_none());
        assert!(builder.add_bond(a, a, BondOrder::Single).is_none());
        assert!(builder.add_bond(a, 42, BondOrder::Single).is_none());
    }

    #[test]
    fn test_aromatic_bond_needs_aromatic_ends() {
        let mut builder = MoleculeBuilder::new();
        let a = builder.add_aromatic_atom(Element::C);
        let b = builder.add_carbon();
        builder.add_bond(a, b, BondOrder::Aromatic);
        assert_eq!(builder.bond_order(a, b), Some(BondOrder::Single));
    }

    #[test]
    fn test_carbonyl_dearomatizes_atom() {
        let mut builder = MoleculeBuilder::new();
        let ring = benzene_ring(&mut builder);
        let oxygen = builder.add_carbonyl(ring[0], Element::O).unwrap();
        assert!(!builder.is_aromatic(ring[0]));
        assert_eq!(builder.bond_order(ring[0], ring[1]), Some(BondOrder::Single));
        assert_eq!(builder.bond_order(ring[0], ring[5]), Some(BondOrder::Single));
        assert_eq!(builder.bond_order(ring[0], oxygen), Some(BondOrder::Double));
        assert!(builder.is_aromatic(ring[2]));
    }

    #[test]
    fn test_cascade_reaches_nitrogen_between_carbonyls() {
        // Five-membered aromatic ring C1-N2-C3-C4-C5.
        let mut builder = MoleculeBuilder::new();
        let ring = vec![
            builder.add_aromatic_atom(Element::C),
            builder.add_aromatic_atom(Element::N),
            builder.add_aromatic_atom(Element::C),
            builder.add_aromatic_atom(Element::C),
            builder.add_aromatic_atom(Element::C),
        ];
        for pair in ring.windows(2) {
            builder.add_bond(pair[0], pair[1], BondOrder::Aromatic);
        }
        builder.close_ring(&ring, BondOrder::Aromatic);

        builder.add_carbonyl(ring[0], Element::O);
        assert!(builder.is_aromatic(ring[1]), "one carbonyl leaves N conjugated");
        builder.add_carbonyl(ring[2], Element::O);
        assert!(!builder.is_aromatic(ring[1]));
        assert_eq!(builder.bond_order(ring[1], ring[2]), Some(BondOrder::Single));
    }

    #[test]
    fn test_saturate_keeps_exocyclic_carbonyl() {
        let mut builder = MoleculeBuilder::new();
        let ring = builder.add_chain(3);
        builder.set_bond_order(ring[0], ring[1], BondOrder::Double);
        let oxygen = builder.attach_atom(ring[1], Element::O, BondOrder::Double).unwrap();
        builder.saturate_atom(ring[1]);
        assert_eq!(builder.bond_order(ring[0], ring[1]), Some(BondOrder::Single));
        assert_eq!(builder.bond_order(ring[1], oxygen), Some(BondOrder::Double));
    }

    #[test]
    fn test_convert_ring_double_bonds() {
        let mut builder = MoleculeBuilder::new();
        let ring = benzene_ring(&mut builder);
        builder.convert_ring_double_bonds_to_single(&ring);
        let molecule = builder.build();
        assert!(molecule.atoms.iter().all(|a| !a.aromatic));
        assert!(molecule.bonds.iter().all(|b| b.order == BondOrder::Single));
    }
}
