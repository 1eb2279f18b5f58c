use iupac_graph::*;
use petgraph::algo::connected_components;

fn build(name: &str) -> BuildOutcome {
    match parse_name(name) {
        Ok(outcome) => outcome,
        Err(e) => panic!("{}", e),
    }
}

fn atoms_of(molecule: &Molecule, element: Element) -> Vec<usize> {
    molecule
        .atoms
        .iter()
        .filter(|a| a.element == element)
        .map(|a| a.id)
        .collect()
}

fn order(molecule: &Molecule, a: usize, b: usize) -> Option<BondOrder> {
    molecule.bond_between(a, b).map(|bond| bond.order)
}

#[test]
fn test_tertiary_alcohol() {
    let molecule = build("2-methylpropan-2-ol").molecule;
    assert_eq!(molecule.heavy_atom_count(), 5);
    let center = (0..molecule.atoms.len())
        .find(|&a| molecule.degree(a) == 4)
        .unwrap();
    let neighbors = molecule.neighbors(center);
    let carbons = neighbors
        .iter()
        .filter(|&&n| molecule.atoms[n].element == Element::C)
        .count();
    assert_eq!(carbons, 3);
    assert_eq!(molecule.neighbors_with(center, Element::O).len(), 1);
}

#[test]
fn test_methyl_butanoate() {
    let outcome = build("methyl butanoate");
    let molecule = &outcome.molecule;
    assert!(outcome.warnings.is_empty());
    assert_eq!(molecule.count_element(Element::C), 5);
    assert_eq!(molecule.count_element(Element::O), 2);

    let carbonyl = atoms_of(molecule, Element::C)
        .into_iter()
        .find(|&c| {
            molecule
                .neighbors_with(c, Element::O)
                .iter()
                .any(|&o| order(molecule, c, o) == Some(BondOrder::Double))
        })
        .unwrap();
    let ether_oxygen = molecule
        .neighbors_with(carbonyl, Element::O)
        .into_iter()
        .find(|&o| order(molecule, carbonyl, o) == Some(BondOrder::Single))
        .unwrap();
    let methyl = molecule
        .neighbors(ether_oxygen)
        .into_iter()
        .find(|&n| n != carbonyl)
        .unwrap();
    assert_eq!(molecule.degree(methyl), 1);
    assert_eq!(molecule.neighbors_with(carbonyl, Element::C).len(), 1);
    assert!(molecule.atoms.iter().all(|a| a.charge == 0));
}

#[test]
fn test_para_diamine() {
    let molecule = build("benzene-1,4-diamine").molecule;
    let mut anchors: Vec<usize> = atoms_of(&molecule, Element::N)
        .into_iter()
        .map(|n| molecule.neighbors(n)[0])
        .collect();
    anchors.sort_unstable();
    assert_eq!(anchors, vec![0, 3]);
}

#[test]
fn test_n_n_dimethylethanamine() {
    let molecule = build("N,N-dimethylethanamine").molecule;
    assert_eq!(molecule.heavy_atom_count(), 5);
    let nitrogen = atoms_of(&molecule, Element::N)[0];
    assert_eq!(molecule.neighbors_with(nitrogen, Element::C).len(), 3);
    // The ethane chain carries nothing but the nitrogen.
    assert_eq!(molecule.degree(0), 2);
    assert_eq!(molecule.degree(1), 1);
}

#[test]
fn test_no_parent_is_fatal() {
    let err = parse_name("chloro").unwrap_err();
    assert_eq!(err.reason, FailureReason::NoParentChain);
    assert_eq!(err.name, "chloro");
}

#[test]
fn test_out_of_grammar_fails() {
    let err = parse_name("2-methylqqq").unwrap_err();
    assert!(matches!(err.reason, FailureReason::Tokenize { position: 2, .. }));
}

#[test]
fn test_trichloromethane() {
    let molecule = build("trichloromethane").molecule;
    assert_eq!(molecule.count_element(Element::Cl), 3);
    assert_eq!(molecule.neighbors_with(0, Element::Cl).len(), 3);
}

#[test]
fn test_bad_locant_is_skipped() {
    let outcome = build("7-chlorohexane");
    assert_eq!(outcome.molecule.heavy_atom_count(), 6);
    assert!(matches!(
        outcome.warnings.as_slice(),
        [BuildWarning::LocantOutOfRange { locant: 7, length: 6, .. }]
    ));
}

#[test]
fn test_diesters() {
    let outcome = build("diethyl butanedioate");
    assert!(outcome.warnings.is_empty());
    assert_eq!(outcome.molecule.heavy_atom_count(), 12);
    assert_eq!(outcome.molecule.count_element(Element::O), 4);

    let outcome = build("dimethyl malonate");
    assert_eq!(outcome.molecule.heavy_atom_count(), 9);
    assert!(outcome.molecule.atoms.iter().all(|a| a.charge == 0));
}

#[test]
fn test_aromatic_and_branched_esters() {
    let molecule = build("ethyl benzoate").molecule;
    assert_eq!(molecule.heavy_atom_count(), 11);
    assert_eq!(molecule.atoms.iter().filter(|a| a.aromatic).count(), 6);

    let molecule = build("propan-2-yl acetate").molecule;
    assert_eq!(molecule.heavy_atom_count(), 7);
    let ester_oxygen = atoms_of(&molecule, Element::O)
        .into_iter()
        .find(|&o| molecule.degree(o) == 2)
        .unwrap();
    let branch = molecule
        .neighbors(ester_oxygen)
        .into_iter()
        .find(|&n| molecule.degree(n) == 3 && molecule.neighbors_with(n, Element::O).len() == 1)
        .unwrap();
    assert_eq!(molecule.neighbors_with(branch, Element::C).len(), 2);
}

#[test]
fn test_ether() {
    let molecule = build("propan-2-yloxybenzene").molecule;
    assert_eq!(molecule.heavy_atom_count(), 10);
    let oxygen = atoms_of(&molecule, Element::O)[0];
    assert_eq!(molecule.degree(oxygen), 2);
}

#[test]
fn test_n_substituted_amides_and_amines() {
    let molecule = build("N-methylacetamide").molecule;
    assert_eq!(molecule.heavy_atom_count(), 5);
    let nitrogen = atoms_of(&molecule, Element::N)[0];
    assert_eq!(molecule.degree(nitrogen), 2);

    let molecule = build("N,N-dimethylformamide").molecule;
    let nitrogen = atoms_of(&molecule, Element::N)[0];
    assert_eq!(molecule.degree(nitrogen), 3);

    let molecule = build("N,N'-dimethylethane-1,2-diamine").molecule;
    for nitrogen in atoms_of(&molecule, Element::N) {
        assert_eq!(molecule.degree(nitrogen), 2);
    }

    // Ring parents take the plain route and still put the N-prefix on nitrogen.
    let molecule = build("N-methylbenzamide").molecule;
    assert_eq!(molecule.heavy_atom_count(), 10);
    let nitrogen = atoms_of(&molecule, Element::N)[0];
    assert_eq!(molecule.degree(nitrogen), 2);
}

#[test]
fn test_von_baeyer_and_spiro() {
    let molecule = build("bicyclo[2.2.1]heptane").molecule;
    assert_eq!(molecule.atoms.len(), 7);
    assert_eq!(molecule.bonds.len(), 8);

    let molecule = build("7-oxabicyclo[2.2.1]heptane").molecule;
    let oxygen = atoms_of(&molecule, Element::O)[0];
    assert_eq!(molecule.degree(oxygen), 2);

    let molecule = build("tricyclo[3.3.1.1^{3,7}]decane").molecule;
    assert_eq!(molecule.atoms.len(), 10);
    assert_eq!(molecule.bonds.len(), 12);

    let molecule = build("spiro[4.5]decane").molecule;
    assert_eq!(molecule.bonds.len(), 11);
    assert_eq!((0..10).filter(|&a| molecule.degree(a) == 4).count(), 1);
}

#[test]
fn test_hydro_prefixes() {
    let molecule = build("1,2,3,4-tetrahydronaphthalene").molecule;
    assert_eq!(molecule.atoms.len(), 10);
    assert_eq!(molecule.atoms.iter().filter(|a| a.aromatic).count(), 6);
}

#[test]
fn test_stereo_descriptors() {
    let molecule = build("(2R)-butan-2-ol").molecule;
    assert_eq!(molecule.atoms[1].chirality, Some(Chirality::Clockwise));

    let molecule = build("(E)-but-2-ene").molecule;
    let stereo = |a, b| molecule.bond_between(a, b).map(|bond| bond.stereo);
    assert_eq!(stereo(0, 1), Some(BondStereo::Up));
    assert_eq!(stereo(2, 3), Some(BondStereo::Up));
}

#[test]
fn test_nested_substituents() {
    let molecule = build("2-(4-chlorophenyl)propan-2-ol").molecule;
    assert_eq!(molecule.heavy_atom_count(), 11);

    let name = "2-{[(tert-butyldimethylsilyl)oxy]methyl}pyridine";
    let molecule = build(name).molecule;
    assert_eq!(molecule.heavy_atom_count(), 15);
    let silicon = atoms_of(&molecule, Element::Si)[0];
    assert_eq!(molecule.degree(silicon), 4);
}

#[test]
fn test_nesting_depth_limit() {
    let name = "2-{[(tert-butyldimethylsilyl)oxy]methyl}pyridine";
    let builder = GraphBuilder::with_config(BuilderConfig { max_nesting_depth: 2 });
    let err = builder.build(name, tokenize(name).unwrap()).unwrap_err();
    assert_eq!(err.reason, FailureReason::NestingTooDeep(2));
}

#[test]
fn test_ring_acid() {
    let molecule = build("cyclohexanecarboxylic acid").molecule;
    assert_eq!(molecule.heavy_atom_count(), 9);
}

#[test]
fn test_built_graphs_are_connected() {
    for name in [
        "2-methylpropan-2-ol",
        "ethyl benzoate",
        "propan-2-yloxybenzene",
        "N,N-dimethylformamide",
        "spiro[4.5]decane",
        "2-(4-chlorophenyl)propan-2-ol",
    ] {
        let graph = build(name).molecule.to_graph();
        assert_eq!(connected_components(&graph), 1, "{}", name);
    }
}

#[test]
fn test_added_hydrogen_ketones() {
    for name in ["pyridin-2(1H)-one", "quinolin-2(1H)-one"] {
        let outcome = build(name);
        assert!(outcome.warnings.is_empty(), "{}: {:?}", name, outcome.warnings);
        let molecule = &outcome.molecule;
        let oxygen = atoms_of(molecule, Element::O)[0];
        let carbonyl = molecule.neighbors(oxygen)[0];
        assert_eq!(molecule.atoms[carbonyl].element, Element::C, "{}", name);
        assert_eq!(order(molecule, carbonyl, oxygen), Some(BondOrder::Double));
        let nitrogen = atoms_of(molecule, Element::N)[0];
        assert_eq!(molecule.atoms[nitrogen].hydrogens, Some(1), "{}", name);
        assert!(molecule.bond_between(carbonyl, nitrogen).is_some());
    }
}

#[test]
fn test_bridge_sizes_must_match_the_stem() {
    for name in [
        "bicyclo[2.2.2]heptane",
        "bicyclo[2000000.1.1]heptane",
        "bicyclo[18446744073709551615.1.1]heptane",
    ] {
        let err = parse_name(name).unwrap_err();
        assert_eq!(err.reason, FailureReason::NoParentChain, "{}", name);
    }
    assert_eq!(build("bicyclo[2.2.2]octane").molecule.atoms.len(), 8);
}

#[test]
fn test_suffix_on_ring_heteroatom_is_refused() {
    let outcome = build("oxan-1-ol");
    assert_eq!(outcome.molecule.count_element(Element::O), 1);
    assert!(matches!(
        outcome.warnings.as_slice(),
        [BuildWarning::RefusedElement { .. }]
    ));
}

#[test]
fn test_numbered_n_locants() {
    let molecule = build("N1,N1-dimethylethane-1,2-diamine").molecule;
    let mut degrees: Vec<usize> = atoms_of(&molecule, Element::N)
        .into_iter()
        .map(|n| molecule.degree(n))
        .collect();
    degrees.sort_unstable();
    assert_eq!(degrees, vec![1, 3]);

    let molecule = build("N1,N2-dimethylethane-1,2-diamine").molecule;
    for nitrogen in atoms_of(&molecule, Element::N) {
        assert_eq!(molecule.degree(nitrogen), 2);
    }
}
