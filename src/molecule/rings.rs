//! Named ring constructors.
//!
//! Every constructor returns its atoms in locant order: locant `n` is index `n - 1`.
//! Fusion atoms of fused systems (4a, 8a, ...) carry no plain number and are
//! appended after the numbered positions.

use tracing::*;

use super::{BondOrder, Element, MoleculeBuilder};

const C: Element = Element::C;
const N: Element = Element::N;
const O: Element = Element::O;
const S: Element = Element::S;
const SE: Element = Element::Se;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingBonding {
    Aromatic,
    Saturated,
}

/// A single ring described by its heteroatom positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Monocycle {
    pub size: usize,
    pub heteroatoms: &'static [(u32, Element)],
    pub bonding: RingBonding,
    /// Locant of a pyrrole-type nitrogen carrying hydrogen.
    pub indicated_hydrogen: Option<u32>,
    /// For partly unsaturated rings, each `l` makes bond `l`-`l+1` double.
    pub double_bonds: &'static [u32],
}

/// A fused polycycle as an explicit atom and bond list in locant order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FusedSystem {
    pub elements: &'static [Element],
    pub bonds: &'static [(usize, usize)],
    /// Indices of sp3 / non-aromatic members.
    pub non_aromatic: &'static [usize],
    pub double_bonds: &'static [(usize, usize)],
    pub indicated_hydrogen: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingTemplate {
    Mono(Monocycle),
    Fused(&'static FusedSystem),
}

impl RingTemplate {
    pub fn size(&self) -> usize {
        match self {
            RingTemplate::Mono(m) => m.size,
            RingTemplate::Fused(f) => f.elements.len(),
        }
    }

    pub fn is_aromatic(&self) -> bool {
        match self {
            RingTemplate::Mono(m) => m.bonding == RingBonding::Aromatic,
            RingTemplate::Fused(f) => f.non_aromatic.len() < f.elements.len(),
        }
    }

    pub fn heteroatom_count(&self) -> usize {
        match self {
            RingTemplate::Mono(m) => m.heteroatoms.len(),
            RingTemplate::Fused(f) => f.elements.iter().filter(|e| e.is_heteroatom()).count(),
        }
    }
}

const fn aromatic(size: usize, heteroatoms: &'static [(u32, Element)]) -> RingTemplate {
    RingTemplate::Mono(Monocycle {
        size,
        heteroatoms,
        bonding: RingBonding::Aromatic,
        indicated_hydrogen: None,
        double_bonds: &[],
    })
}

const fn aromatic_nh(size: usize, heteroatoms: &'static [(u32, Element)], nh: u32) -> RingTemplate {
    RingTemplate::Mono(Monocycle {
        size,
        heteroatoms,
        bonding: RingBonding::Aromatic,
        indicated_hydrogen: Some(nh),
        double_bonds: &[],
    })
}

const fn saturated(size: usize, heteroatoms: &'static [(u32, Element)]) -> RingTemplate {
    RingTemplate::Mono(Monocycle {
        size,
        heteroatoms,
        bonding: RingBonding::Saturated,
        indicated_hydrogen: None,
        double_bonds: &[],
    })
}

// Two fused six-membered rings: 1..8, then 4a (8) and 8a (9).
const BICYCLO_6_6: &[(usize, usize)] = &[
    (0, 1), (1, 2), (2, 3), (3, 8), (8, 9), (9, 0),
    (8, 4), (4, 5), (5, 6), (6, 7), (7, 9),
];

// Five-membered ring fused to benzene: 1,2,3, 4..7, then 3a (7) and 7a (8).
const BICYCLO_5_6: &[(usize, usize)] = &[
    (0, 1), (1, 2), (2, 7), (7, 8), (8, 0),
    (7, 3), (3, 4), (4, 5), (5, 6), (6, 8),
];

const fn benzo6(elements: &'static [Element]) -> FusedSystem {
    FusedSystem {
        elements,
        bonds: BICYCLO_6_6,
        non_aromatic: &[],
        double_bonds: &[],
        indicated_hydrogen: None,
    }
}

const fn benzo5(elements: &'static [Element], nh: Option<usize>) -> FusedSystem {
    FusedSystem {
        elements,
        bonds: BICYCLO_5_6,
        non_aromatic: &[],
        double_bonds: &[],
        indicated_hydrogen: nh,
    }
}

static NAPHTHALENE: FusedSystem = benzo6(&[C, C, C, C, C, C, C, C, C, C]);
static QUINOLINE: FusedSystem = benzo6(&[N, C, C, C, C, C, C, C, C, C]);
static ISOQUINOLINE: FusedSystem = benzo6(&[C, N, C, C, C, C, C, C, C, C]);
static QUINOXALINE: FusedSystem = benzo6(&[N, C, C, N, C, C, C, C, C, C]);
static QUINAZOLINE: FusedSystem = benzo6(&[N, C, N, C, C, C, C, C, C, C]);
static CINNOLINE: FusedSystem = benzo6(&[N, N, C, C, C, C, C, C, C, C]);
static PHTHALAZINE: FusedSystem = benzo6(&[C, N, N, C, C, C, C, C, C, C]);
static PTERIDINE: FusedSystem = benzo6(&[N, C, N, C, N, C, C, N, C, C]);

static INDOLE: FusedSystem = benzo5(&[N, C, C, C, C, C, C, C, C], Some(0));
static ISOINDOLE: FusedSystem = benzo5(&[C, N, C, C, C, C, C, C, C], Some(1));
static INDAZOLE: FusedSystem = benzo5(&[N, N, C, C, C, C, C, C, C], Some(0));
static BENZIMIDAZOLE: FusedSystem = benzo5(&[N, C, N, C, C, C, C, C, C], Some(0));
static BENZOXAZOLE: FusedSystem = benzo5(&[O, C, N, C, C, C, C, C, C], None);
static BENZOTHIAZOLE: FusedSystem = benzo5(&[S, C, N, C, C, C, C, C, C], None);
static BENZOFURAN: FusedSystem = benzo5(&[O, C, C, C, C, C, C, C, C], None);
static BENZOTHIOPHENE: FusedSystem = benzo5(&[S, C, C, C, C, C, C, C, C], None);

static INDENE: FusedSystem = FusedSystem {
    elements: &[C, C, C, C, C, C, C, C, C],
    bonds: BICYCLO_5_6,
    non_aromatic: &[0, 1, 2],
    double_bonds: &[(1, 2)],
    indicated_hydrogen: None,
};

static INDOLINE: FusedSystem = FusedSystem {
    elements: &[N, C, C, C, C, C, C, C, C],
    bonds: BICYCLO_5_6,
    non_aromatic: &[0, 1, 2],
    double_bonds: &[],
    indicated_hydrogen: None,
};

static BENZODIOXOLE: FusedSystem = FusedSystem {
    elements: &[O, C, O, C, C, C, C, C, C],
    bonds: BICYCLO_5_6,
    non_aromatic: &[0, 1, 2],
    double_bonds: &[],
    indicated_hydrogen: None,
};

// 1..8, then 3a (8) and 8a (9).
static AZULENE: FusedSystem = FusedSystem {
    elements: &[C, C, C, C, C, C, C, C, C, C],
    bonds: &[
        (0, 1), (1, 2), (2, 8), (8, 9), (9, 0),
        (8, 3), (3, 4), (4, 5), (5, 6), (6, 7), (7, 9),
    ],
    non_aromatic: &[],
    double_bonds: &[],
    indicated_hydrogen: None,
};

// Purine numbers its fusion atoms (4 and 5), so every position has a plain locant.
static PURINE: FusedSystem = FusedSystem {
    elements: &[N, C, N, C, C, C, N, C, N],
    bonds: &[
        (0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0),
        (3, 8), (8, 7), (7, 6), (6, 4),
    ],
    non_aromatic: &[],
    double_bonds: &[],
    indicated_hydrogen: Some(8),
};

// 1..8, N9, then 4a (9), 4b (10), 8a (11), 9a (12).
static CARBAZOLE: FusedSystem = FusedSystem {
    elements: &[C, C, C, C, C, C, C, C, N, C, C, C, C],
    bonds: &[
        (0, 1), (1, 2), (2, 3), (3, 9), (9, 12), (12, 0),
        (9, 10), (10, 11), (11, 8), (8, 12),
        (10, 4), (4, 5), (5, 6), (6, 7), (7, 11),
    ],
    non_aromatic: &[],
    double_bonds: &[],
    indicated_hydrogen: Some(8),
};

// 1..10, then 4a (10), 8a (11), 9a (12), 10a (13).
static ANTHRACENE: FusedSystem = FusedSystem {
    elements: &[C, C, C, C, C, C, C, C, C, C, C, C, C, C],
    bonds: &[
        (0, 1), (1, 2), (2, 3), (3, 10), (10, 12), (12, 0),
        (8, 12), (10, 9), (9, 13), (13, 11), (11, 8),
        (13, 4), (4, 5), (5, 6), (6, 7), (7, 11),
    ],
    non_aromatic: &[],
    double_bonds: &[],
    indicated_hydrogen: None,
};

// 1..10, then 4a (10), 4b (11), 8a (12), 10a (13).
static PHENANTHRENE: FusedSystem = FusedSystem {
    elements: &[C, C, C, C, C, C, C, C, C, C, C, C, C, C],
    bonds: &[
        (0, 1), (1, 2), (2, 3), (3, 10), (10, 13), (13, 0),
        (10, 11), (11, 12), (12, 8), (8, 9), (9, 13),
        (11, 4), (4, 5), (5, 6), (6, 7), (7, 12),
    ],
    non_aromatic: &[],
    double_bonds: &[],
    indicated_hydrogen: None,
};

/// Every ring name [`template`] knows, in canonical spelling.
pub const NAMED_RINGS: &[&str] = &[
    "benzene", "pyridine", "pyridazine", "pyrimidine", "pyrazine", "triazine", "tetrazine",
    "furan", "thiophene", "selenophene", "pyrrole", "imidazole", "pyrazole", "oxazole",
    "isoxazole", "thiazole", "isothiazole", "triazole", "tetrazole", "oxadiazole",
    "thiadiazole", "oxirane", "thiirane", "aziridine", "diaziridine", "oxetane", "thietane",
    "azetidine", "oxolane", "thiolane", "pyrrolidine", "imidazolidine", "pyrazolidine",
    "oxazolidine", "thiazolidine", "dioxolane", "oxane", "thiane", "piperidine", "piperazine",
    "morpholine", "thiomorpholine", "dioxane", "azepane", "oxepane", "pyran", "naphthalene",
    "quinoline", "isoquinoline", "quinoxaline", "quinazoline", "cinnoline", "phthalazine",
    "pteridine", "indole", "isoindole", "indazole", "benzimidazole", "benzoxazole",
    "benzothiazole", "benzofuran", "benzothiophene", "indene", "indoline", "benzodioxole",
    "azulene", "purine", "carbazole", "anthracene", "phenanthrene",
];

/// Looks up the template for a canonical ring name.
pub fn template(name: &str) -> Option<RingTemplate> {
    Some(match name {
        "benzene" => aromatic(6, &[]),
        "pyridine" => aromatic(6, &[(1, N)]),
        "pyridazine" => aromatic(6, &[(1, N), (2, N)]),
        "pyrimidine" => aromatic(6, &[(1, N), (3, N)]),
        "pyrazine" => aromatic(6, &[(1, N), (4, N)]),
        "triazine" => aromatic(6, &[(1, N), (3, N), (5, N)]),
        "tetrazine" => aromatic(6, &[(1, N), (2, N), (4, N), (5, N)]),
        "furan" => aromatic(5, &[(1, O)]),
        "thiophene" => aromatic(5, &[(1, S)]),
        "selenophene" => aromatic(5, &[(1, SE)]),
        "pyrrole" => aromatic_nh(5, &[(1, N)], 1),
        "imidazole" => aromatic_nh(5, &[(1, N), (3, N)], 1),
        "pyrazole" => aromatic_nh(5, &[(1, N), (2, N)], 1),
        "oxazole" => aromatic(5, &[(1, O), (3, N)]),
        "isoxazole" => aromatic(5, &[(1, O), (2, N)]),
        "thiazole" => aromatic(5, &[(1, S), (3, N)]),
        "isothiazole" => aromatic(5, &[(1, S), (2, N)]),
        "triazole" => aromatic_nh(5, &[(1, N), (2, N), (4, N)], 1),
        "tetrazole" => aromatic_nh(5, &[(1, N), (2, N), (3, N), (4, N)], 1),
        "oxadiazole" => aromatic(5, &[(1, O), (3, N), (4, N)]),
        "thiadiazole" => aromatic(5, &[(1, S), (3, N), (4, N)]),
        "oxirane" => saturated(3, &[(1, O)]),
        "thiirane" => saturated(3, &[(1, S)]),
        "aziridine" => saturated(3, &[(1, N)]),
        "diaziridine" => saturated(3, &[(1, N), (2, N)]),
        "oxetane" => saturated(4, &[(1, O)]),
        "thietane" => saturated(4, &[(1, S)]),
        "azetidine" => saturated(4, &[(1, N)]),
        "oxolane" => saturated(5, &[(1, O)]),
        "thiolane" => saturated(5, &[(1, S)]),
        "pyrrolidine" => saturated(5, &[(1, N)]),
        "imidazolidine" => saturated(5, &[(1, N), (3, N)]),
        "pyrazolidine" => saturated(5, &[(1, N), (2, N)]),
        "oxazolidine" => saturated(5, &[(1, O), (3, N)]),
        "thiazolidine" => saturated(5, &[(1, S), (3, N)]),
        "dioxolane" => saturated(5, &[(1, O), (3, O)]),
        "oxane" => saturated(6, &[(1, O)]),
        "thiane" => saturated(6, &[(1, S)]),
        "piperidine" => saturated(6, &[(1, N)]),
        "piperazine" => saturated(6, &[(1, N), (4, N)]),
        "morpholine" => saturated(6, &[(1, O), (4, N)]),
        "thiomorpholine" => saturated(6, &[(1, S), (4, N)]),
        "dioxane" => saturated(6, &[(1, O), (4, O)]),
        "azepane" => saturated(7, &[(1, N)]),
        "oxepane" => saturated(7, &[(1, O)]),
        "pyran" => RingTemplate::Mono(Monocycle {
            size: 6,
            heteroatoms: &[(1, O)],
            bonding: RingBonding::Saturated,
            indicated_hydrogen: None,
            double_bonds: &[3, 5],
        }),
        "naphthalene" => RingTemplate::Fused(&NAPHTHALENE),
        "quinoline" => RingTemplate::Fused(&QUINOLINE),
        "isoquinoline" => RingTemplate::Fused(&ISOQUINOLINE),
        "quinoxaline" => RingTemplate::Fused(&QUINOXALINE),
        "quinazoline" => RingTemplate::Fused(&QUINAZOLINE),
        "cinnoline" => RingTemplate::Fused(&CINNOLINE),
        "phthalazine" => RingTemplate::Fused(&PHTHALAZINE),
        "pteridine" => RingTemplate::Fused(&PTERIDINE),
        "indole" => RingTemplate::Fused(&INDOLE),
        "isoindole" => RingTemplate::Fused(&ISOINDOLE),
        "indazole" => RingTemplate::Fused(&INDAZOLE),
        "benzimidazole" => RingTemplate::Fused(&BENZIMIDAZOLE),
        "benzoxazole" => RingTemplate::Fused(&BENZOXAZOLE),
        "benzothiazole" => RingTemplate::Fused(&BENZOTHIAZOLE),
        "benzofuran" => RingTemplate::Fused(&BENZOFURAN),
        "benzothiophene" => RingTemplate::Fused(&BENZOTHIOPHENE),
        "indene" => RingTemplate::Fused(&INDENE),
        "indoline" => RingTemplate::Fused(&INDOLINE),
        "benzodioxole" => RingTemplate::Fused(&BENZODIOXOLE),
        "azulene" => RingTemplate::Fused(&AZULENE),
        "purine" => RingTemplate::Fused(&PURINE),
        "carbazole" => RingTemplate::Fused(&CARBAZOLE),
        "anthracene" => RingTemplate::Fused(&ANTHRACENE),
        "phenanthrene" => RingTemplate::Fused(&PHENANTHRENE),
        _ => return None,
    })
}

/// Builds a named ring.
///
/// `heteroatom_locants` renumbers the heteroatoms of a monocycle (e.g. the
/// `1,2,4` of `1,2,4-oxadiazole`); they are assigned in seniority order and the
/// override is ignored unless its length matches the heteroatom count.
pub fn build_named(
    builder: &mut MoleculeBuilder,
    name: &str,
    heteroatom_locants: Option<&[u32]>,
) -> Option<Vec<usize>> {
    let ring = match template(name)? {
        RingTemplate::Mono(mono) => {
            let heteroatoms = match heteroatom_locants {
                Some(locants) if locants.len() == mono.heteroatoms.len() && !locants.is_empty() => {
                    renumber_heteroatoms(mono.heteroatoms, locants)
                }
                _ => mono.heteroatoms.to_vec(),
            };
            monocycle(
                builder,
                mono.size,
                &heteroatoms,
                mono.bonding,
                mono.indicated_hydrogen,
                mono.double_bonds,
            )
        }
        RingTemplate::Fused(system) => fused(builder, system),
    };
    debug!("Built ring '{}' with {} atoms", name, ring.len());
    Some(ring)
}

fn renumber_heteroatoms(heteroatoms: &[(u32, Element)], locants: &[u32]) -> Vec<(u32, Element)> {
    let mut elements: Vec<Element> = heteroatoms.iter().map(|(_, e)| *e).collect();
    elements.sort_by_key(|e| e.replacement_seniority());
    let mut locants = locants.to_vec();
    locants.sort_unstable();
    locants.into_iter().zip(elements).collect()
}

/// A ring of `size` atoms with heteroatoms at the given 1-based locants.
pub fn monocycle(
    builder: &mut MoleculeBuilder,
    size: usize,
    heteroatoms: &[(u32, Element)],
    bonding: RingBonding,
    indicated_hydrogen: Option<u32>,
    double_bonds: &[u32],
) -> Vec<usize> {
    let element_at = |locant: u32| {
        heteroatoms
            .iter()
            .find(|(l, _)| *l == locant)
            .map(|(_, e)| *e)
            .unwrap_or(Element::C)
    };
    let ring: Vec<usize> = (1..=size as u32)
        .map(|locant| match bonding {
            RingBonding::Aromatic => builder.add_aromatic_atom(element_at(locant)),
            RingBonding::Saturated => builder.add_atom(element_at(locant)),
        })
        .collect();
    let order = match bonding {
        RingBonding::Aromatic => BondOrder::Aromatic,
        RingBonding::Saturated => BondOrder::Single,
    };
    for pair in ring.windows(2) {
        builder.add_bond(pair[0], pair[1], order);
    }
    builder.close_ring(&ring, order);
    for &locant in double_bonds {
        let a = ring[(locant as usize - 1) % size];
        let b = ring[locant as usize % size];
        builder.set_bond_order(a, b, BondOrder::Double);
    }
    if let Some(locant) = indicated_hydrogen {
        builder.set_hydrogens(ring[locant as usize - 1], Some(1));
    }
    ring
}

/// Hantzsch-Widman ring: heteroatoms placed by locant, aromatic (`-ole`, `-ine`)
/// or saturated (`-olane`, `-inane`). An aromatic five-membered ring with
/// nitrogen but no oxygen or sulfur carries hydrogen on its first nitrogen.
pub fn hantzsch_widman(
    builder: &mut MoleculeBuilder,
    size: usize,
    heteroatoms: &[(u32, Element)],
    aromatic: bool,
) -> Vec<usize> {
    let bonding = if aromatic {
        RingBonding::Aromatic
    } else {
        RingBonding::Saturated
    };
    let pyrrole_like = aromatic
        && size == 5
        && heteroatoms.iter().all(|(_, e)| *e == Element::N)
        && !heteroatoms.is_empty();
    let nh = if pyrrole_like {
        heteroatoms.iter().map(|(l, _)| *l).min()
    } else {
        None
    };
    monocycle(builder, size, heteroatoms, bonding, nh, &[])
}

/// A saturated carbocycle.
pub fn cycloalkane(builder: &mut MoleculeBuilder, size: usize) -> Vec<usize> {
    monocycle(builder, size, &[], RingBonding::Saturated, None, &[])
}

pub fn fused(builder: &mut MoleculeBuilder, system: &FusedSystem) -> Vec<usize> {
    let atoms: Vec<usize> = system
        .elements
        .iter()
        .enumerate()
        .map(|(i, &element)| {
            if system.non_aromatic.contains(&i) {
                builder.add_atom(element)
            } else {
                builder.add_aromatic_atom(element)
            }
        })
        .collect();
    for &(a, b) in system.bonds {
        builder.add_bond(atoms[a], atoms[b], BondOrder::Aromatic);
    }
    for &(a, b) in system.double_bonds {
        builder.set_bond_order(atoms[a], atoms[b], BondOrder::Double);
    }
    if let Some(h) = system.indicated_hydrogen {
        builder.set_hydrogens(atoms[h], Some(1));
    }
    atoms
}

pub fn benzene(builder: &mut MoleculeBuilder) -> Vec<usize> {
    hantzsch_widman(builder, 6, &[], true)
}

pub fn pyridine(builder: &mut MoleculeBuilder) -> Vec<usize> {
    hantzsch_widman(builder, 6, &[(1, N)], true)
}

pub fn naphthalene(builder: &mut MoleculeBuilder) -> Vec<usize> {
    fused(builder, &NAPHTHALENE)
}
