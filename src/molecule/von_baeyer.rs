use tracing::*;

use super::{BondOrder, Element, MoleculeBuilder};

/// A bridge beyond the main bicycle, e.g. the `1^{3,7}` of `tricyclo[3.3.1.1^{3,7}]decane`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecondaryBridge {
    pub length: usize,
    pub from: u32,
    pub to: u32,
}

fn allocate(builder: &mut MoleculeBuilder, count: usize, heteroatoms: &[(u32, Element)]) -> Vec<usize> {
    (1..=count as u32)
        .map(|locant| {
            let element = heteroatoms
                .iter()
                .find(|(l, _)| *l == locant)
                .map(|(_, e)| *e)
                .unwrap_or(Element::C);
            builder.add_atom(element)
        })
        .collect()
}

fn link(builder: &mut MoleculeBuilder, path: &[usize]) {
    for pair in path.windows(2) {
        builder.add_bond(pair[0], pair[1], BondOrder::Single);
    }
}

/// Atom count of a Von Baeyer system, or `None` if it overflows.
pub fn von_baeyer_size(main: [usize; 3], secondary: &[SecondaryBridge]) -> Option<usize> {
    let [a, b, c] = main;
    let main_count = a.checked_add(b)?.checked_add(c)?.checked_add(2)?;
    secondary
        .iter()
        .try_fold(main_count, |total, bridge| total.checked_add(bridge.length))
}

/// Atom count of `spiro[small.large]`, or `None` if it overflows.
pub fn spiro_size(rings: [usize; 2]) -> Option<usize> {
    rings[0].checked_add(rings[1])?.checked_add(1)
}

/// Builds a saturated bridged polycycle from Von Baeyer bridge lengths.
///
/// `main` holds the three main bridges in citation order. Atoms are numbered
/// from main bridgehead 1 around the largest bridge to the second bridgehead,
/// back around the second bridge, then across the smallest bridge. Secondary
/// bridge atoms continue the numbering, starting next to the higher anchor.
/// Returns `None` when the bridges don't describe a valid system.
pub fn von_baeyer(
    builder: &mut MoleculeBuilder,
    main: [usize; 3],
    secondary: &[SecondaryBridge],
    heteroatoms: &[(u32, Element)],
) -> Option<Vec<usize>> {
    let [a, b, c] = main;
    if a == 0 || b == 0 || a < b || b < c {
        warn!("Invalid main bridges {:?}", main);
        return None;
    }
    let Some(total) = von_baeyer_size(main, secondary) else {
        warn!("Von Baeyer bridges {:?} are too large", main);
        return None;
    };
    let main_count = a + b + c + 2;
    for bridge in secondary {
        let anchors_ok = bridge.from >= 1
            && bridge.to >= 1
            && bridge.from != bridge.to
            && (bridge.from.max(bridge.to) as usize) <= total;
        if !anchors_ok {
            warn!("Invalid secondary bridge {:?}", bridge);
            return None;
        }
    }

    let atoms = allocate(builder, total, heteroatoms);
    let at = |locant: usize| atoms[locant - 1];
    let first = 1;
    let second = a + 2;

    // First bridgehead through the largest bridge to the second bridgehead.
    let path: Vec<usize> = (first..=second).map(at).collect();
    link(builder, &path);

    // Back to the first bridgehead through the second bridge.
    let mut path: Vec<usize> = (second..=a + b + 2).map(at).collect();
    path.push(at(first));
    link(builder, &path);

    // The smallest bridge, possibly a direct bond.
    let mut path = vec![at(first)];
    path.extend((a + b + 3..=main_count).map(at));
    path.push(at(second));
    link(builder, &path);

    let mut next = main_count + 1;
    for bridge in secondary {
        let high = bridge.from.max(bridge.to) as usize;
        let low = bridge.from.min(bridge.to) as usize;
        let mut path = vec![at(high)];
        path.extend((next..next + bridge.length).map(at));
        path.push(at(low));
        link(builder, &path);
        next += bridge.length;
    }

    debug!(
        "Built Von Baeyer system {:?} with {} secondary bridges: {} atoms",
        main,
        secondary.len(),
        total
    );
    Some(atoms)
}

/// Builds a monospiro system `spiro[small.large]`, numbered from the atom next to
/// the spiro atom in the first ring, through the spiro atom, around the second ring.
pub fn spiro(
    builder: &mut MoleculeBuilder,
    rings: [usize; 2],
    heteroatoms: &[(u32, Element)],
) -> Option<Vec<usize>> {
    let [small, large] = rings;
    if small < 2 || large < 2 {
        warn!("Invalid spiro rings {:?}", rings);
        return None;
    }
    let Some(total) = spiro_size(rings) else {
        warn!("Spiro rings {:?} are too large", rings);
        return None;
    };
    let atoms = allocate(builder, total, heteroatoms);
    let spiro_atom = small;

    link(builder, &atoms[..=spiro_atom]);
    builder.add_bond(atoms[spiro_atom], atoms[0], BondOrder::Single);

    link(builder, &atoms[spiro_atom..]);
    builder.add_bond(atoms[total - 1], atoms[spiro_atom], BondOrder::Single);

    debug!("Built spiro system {:?}: {} atoms", rings, total);
    Some(atoms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn degree(builder: &MoleculeBuilder, atom: usize) -> usize {
        builder.neighbors(atom).len()
    }

    #[test]
    fn test_norbornane() {
        let mut builder = MoleculeBuilder::new();
        let atoms = von_baeyer(&mut builder, [2, 2, 1], &[], &[]).unwrap();
        assert_eq!(atoms.len(), 7);
        assert_eq!(builder.bond_count(), 8);
        assert_eq!(degree(&builder, atoms[0]), 3);
        assert_eq!(degree(&builder, atoms[3]), 3);
        assert!(builder.bond_order(atoms[6], atoms[0]).is_some());
        assert!(builder.bond_order(atoms[6], atoms[3]).is_some());
    }

    #[test]
    fn test_heteroatom_at_allocation() {
        let mut builder = MoleculeBuilder::new();
        let atoms = von_baeyer(&mut builder, [2, 2, 1], &[], &[(7, Element::O)]).unwrap();
        assert_eq!(builder.element(atoms[6]), Some(Element::O));
        assert_eq!(degree(&builder, atoms[6]), 2);
    }

    #[test]
    fn test_zero_bridge_is_direct_bond() {
        let mut builder = MoleculeBuilder::new();
        let atoms = von_baeyer(&mut builder, [4, 4, 0], &[], &[]).unwrap();
        assert_eq!(atoms.len(), 10);
        assert!(builder.bond_order(atoms[0], atoms[5]).is_some());
        assert_eq!(builder.bond_count(), 11);
    }

    #[test]
    fn test_adamantane() {
        let mut builder = MoleculeBuilder::new();
        let bridge = SecondaryBridge {
            length: 1,
            from: 3,
            to: 7,
        };
        let atoms = von_baeyer(&mut builder, [3, 3, 1], &[bridge], &[]).unwrap();
        assert_eq!(atoms.len(), 10);
        assert_eq!(builder.bond_count(), 12);
        for bridgehead in [1, 3, 5, 7] {
            assert_eq!(degree(&builder, atoms[bridgehead - 1]), 3, "C{bridgehead}");
        }
        assert!(builder.bond_order(atoms[9], atoms[6]).is_some());
        assert!(builder.bond_order(atoms[9], atoms[2]).is_some());
    }

    #[test]
    fn test_rejects_bad_bridges() {
        let mut builder = MoleculeBuilder::new();
        assert!(von_baeyer(&mut builder, [1, 2, 0], &[], &[]).is_none());
        let bridge = SecondaryBridge {
            length: 1,
            from: 3,
            to: 30,
        };
        assert!(von_baeyer(&mut builder, [3, 3, 1], &[bridge], &[]).is_none());
        assert_eq!(builder.atom_count(), 0);
    }

    #[test]
    fn test_spiro_decane() {
        let mut builder = MoleculeBuilder::new();
        let atoms = spiro(&mut builder, [4, 5], &[]).unwrap();
        assert_eq!(atoms.len(), 10);
        assert_eq!(builder.bond_count(), 11);
        assert_eq!(degree(&builder, atoms[4]), 4);
        assert!(builder.bond_order(atoms[4], atoms[0]).is_some());
        assert!(builder.bond_order(atoms[9], atoms[4]).is_some());
    }
}
