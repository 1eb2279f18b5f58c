use std::collections::VecDeque;

use tracing::*;

use crate::applicator::release_hydrogen;
use crate::*;

/// Atoms the suffix pass leaves for later stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuffixOutcome {
    /// Single-bonded `-oate` oxygens waiting for an ester alkyl.
    pub ester_oxygens: VecDeque<usize>,
    /// Nitrogens of amide, amine, imine and sulfonamide groups, in locant order.
    pub nitrogens: Vec<usize>,
}

/// The bond between locant `locant` and the next position; on rings the last
/// position wraps back to the first.
fn locant_bond(builder: &MoleculeBuilder, skeleton: &[usize], locant: i64) -> Option<(usize, usize)> {
    let a = locant_to_atom_index(locant, skeleton)?;
    let b = match locant_to_atom_index(locant + 1, skeleton) {
        Some(b) => b,
        None => {
            let first = *skeleton.first()?;
            builder.bond_order(a, first)?;
            first
        }
    };
    builder.bond_order(a, b).map(|_| (a, b))
}

/// Applies `-ene` and `-yne` suffixes as double and triple bonds along `skeleton`.
pub fn apply_unsaturation(builder: &mut MoleculeBuilder, session: &mut Session, tokens: &[Token], skeleton: &[usize]) {
    for (i, token) in tokens.iter().enumerate() {
        let order = match token.suffix_kind() {
            Some(SuffixKind::Ene) => BondOrder::Double,
            Some(SuffixKind::Yne) => BondOrder::Triple,
            _ => continue,
        };
        for locant in placement_for(tokens, i).targets() {
            match locant_bond(builder, skeleton, locant) {
                Some((a, b)) => {
                    builder.set_bond_order(a, b, order);
                    trace!("{:?} bond at locant {}", order, locant);
                }
                None => session.warn(BuildWarning::UnplacedUnsaturation {
                    token: token.text.clone(),
                    locant,
                }),
            }
        }
    }
}

/// Default positions for an unlocanted suffix: chain termini for the acid family.
fn default_targets(kind: SuffixKind, count: usize, cyclic: bool, length: usize) -> Vec<i64> {
    if kind.is_acid_family() && !cyclic {
        (0..count)
            .map(|k| if k % 2 == 0 { 1 } else { length as i64 })
            .collect()
    } else {
        vec![1; count]
    }
}

/// Applies the principal characteristic groups (`-ol`, `-one`, `-oic acid`, ...).
///
/// Markers (`-yl`, `-ylidene`, `-oyl`, the ether `oxy`) and unsaturation are
/// left to their own stages.
pub fn apply_suffixes(
    builder: &mut MoleculeBuilder,
    session: &mut Session,
    tokens: &[Token],
    skeleton: &[usize],
    cyclic: bool,
) -> SuffixOutcome {
    let mut outcome = SuffixOutcome::default();
    for (i, token) in tokens.iter().enumerate() {
        let Some(payload) = token.suffix() else {
            continue;
        };
        let kind = payload.kind;
        if kind.is_unsaturation() || kind.is_marker() {
            continue;
        }
        let mut placement = placement_for(tokens, i);
        let diacid = payload.implied.as_ref().map(|acyl| acyl.diacid).unwrap_or(false);
        if diacid && !placement.multiplied {
            placement.count = 2;
        }
        let targets = if placement.positions.is_empty() {
            default_targets(kind, placement.count, cyclic, skeleton.len())
        } else {
            placement.targets()
        };
        let adds_carbon = payload.adds_carbon || (cyclic && kind.is_acid_family());
        for locant in targets {
            let Some(atom) = locant_to_atom_index(locant, skeleton) else {
                session.warn(BuildWarning::LocantOutOfRange {
                    token: token.text.clone(),
                    locant,
                    length: skeleton.len(),
                });
                continue;
            };
            let Some(element) = builder.element(atom) else {
                continue;
            };
            if !anchor_accepts(kind, element, adds_carbon) {
                session.warn(BuildWarning::RefusedElement {
                    token: token.text.clone(),
                    element: element.symbol().to_string(),
                    atom,
                });
                continue;
            }
            apply_group(builder, &mut outcome, kind, atom, adds_carbon);
            debug!("Suffix '{}' at locant {}", token.text, locant);
        }
    }
    outcome
}

/// Groups that double-bond to their anchor (`-one`, `-imine`, an in-chain
/// `-al` or acid) need a carbon; the rest take any substitutable atom.
fn anchor_accepts(kind: SuffixKind, element: Element, adds_carbon: bool) -> bool {
    let needs_carbon = match kind {
        SuffixKind::One | SuffixKind::Imine => true,
        _ => kind.is_acid_family() && !adds_carbon,
    };
    if needs_carbon {
        element == Element::C
    } else {
        element.accepts_substituents()
    }
}

fn attach(builder: &mut MoleculeBuilder, anchor: usize, element: Element, order: BondOrder) -> Option<usize> {
    release_hydrogen(builder, anchor, order);
    if order != BondOrder::Single {
        builder.dearomatize(anchor);
    }
    builder.attach_atom(anchor, element, order)
}

fn apply_group(builder: &mut MoleculeBuilder, outcome: &mut SuffixOutcome, kind: SuffixKind, atom: usize, adds_carbon: bool) {
    let carbon = if adds_carbon && kind.is_acid_family() {
        match attach(builder, atom, Element::C, BondOrder::Single) {
            Some(carbon) => carbon,
            None => return,
        }
    } else {
        atom
    };
    match kind {
        SuffixKind::Ol => {
            attach(builder, atom, Element::O, BondOrder::Single);
        }
        SuffixKind::Thiol => {
            attach(builder, atom, Element::S, BondOrder::Single);
        }
        SuffixKind::One => {
            release_hydrogen(builder, atom, BondOrder::Double);
            builder.add_carbonyl(atom, Element::O);
        }
        SuffixKind::Al => {
            builder.add_carbonyl(carbon, Element::O);
        }
        SuffixKind::OicAcid => {
            builder.add_carbonyl(carbon, Element::O);
            builder.attach_atom(carbon, Element::O, BondOrder::Single);
        }
        SuffixKind::Oate => {
            builder.add_carbonyl(carbon, Element::O);
            if let Some(oxygen) = builder.attach_atom(carbon, Element::O, BondOrder::Single) {
                outcome.ester_oxygens.push_back(oxygen);
            }
        }
        SuffixKind::Amide => {
            builder.add_carbonyl(carbon, Element::O);
            if let Some(nitrogen) = builder.attach_atom(carbon, Element::N, BondOrder::Single) {
                outcome.nitrogens.push(nitrogen);
            }
        }
        SuffixKind::Nitrile => {
            builder.attach_atom(carbon, Element::N, BondOrder::Triple);
        }
        SuffixKind::Amine => {
            if let Some(nitrogen) = attach(builder, atom, Element::N, BondOrder::Single) {
                outcome.nitrogens.push(nitrogen);
            }
        }
        SuffixKind::Imine => {
            if let Some(nitrogen) = attach(builder, atom, Element::N, BondOrder::Double) {
                outcome.nitrogens.push(nitrogen);
            }
        }
        SuffixKind::SulfonicAcid | SuffixKind::Sulfonamide => {
            let Some(sulfur) = attach(builder, atom, Element::S, BondOrder::Single) else {
                return;
            };
            builder.attach_atom(sulfur, Element::O, BondOrder::Double);
            builder.attach_atom(sulfur, Element::O, BondOrder::Double);
            if kind == SuffixKind::SulfonicAcid {
                builder.attach_atom(sulfur, Element::O, BondOrder::Single);
            } else if let Some(nitrogen) = builder.attach_atom(sulfur, Element::N, BondOrder::Single) {
                outcome.nitrogens.push(nitrogen);
            }
        }
        SuffixKind::Ene | SuffixKind::Yne | SuffixKind::Yl | SuffixKind::Ylidene | SuffixKind::Oyl | SuffixKind::Oxy => {}
    }
}

/// Ester oxygens no alkyl claimed become carboxylate anions.
pub fn close_ester_oxygens(builder: &mut MoleculeBuilder, ester_oxygens: &mut VecDeque<usize>) {
    for oxygen in ester_oxygens.drain(..) {
        debug!("Unclaimed ester oxygen {} becomes a carboxylate", oxygen);
        builder.set_charge(oxygen, -1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molecule::rings;
    use crate::rules::rules;

    fn with_session<T>(name: &str, f: impl FnOnce(&mut Session, &[Token]) -> T) -> T {
        let tokens = tokenize(name).unwrap();
        let registry = Registry::standard();
        let mut session = Session::new(name, rules(), &registry, 16);
        f(&mut session, &tokens)
    }

    #[test]
    fn test_unsaturation_positions() {
        with_session("buta-1,3-diene", |session, tokens| {
            let mut builder = MoleculeBuilder::new();
            let chain = builder.add_chain(4);
            apply_unsaturation(&mut builder, session, tokens, &chain);
            assert_eq!(builder.bond_order(chain[0], chain[1]), Some(BondOrder::Double));
            assert_eq!(builder.bond_order(chain[1], chain[2]), Some(BondOrder::Single));
            assert_eq!(builder.bond_order(chain[2], chain[3]), Some(BondOrder::Double));
        });
        with_session("hex-6-ene", |session, tokens| {
            let mut builder = MoleculeBuilder::new();
            let chain = builder.add_chain(6);
            apply_unsaturation(&mut builder, session, tokens, &chain);
            assert!(matches!(
                session.warnings.as_slice(),
                [BuildWarning::UnplacedUnsaturation { locant: 6, .. }]
            ));
        });
    }

    #[test]
    fn test_ring_unsaturation_wraps() {
        with_session("cyclohex-6-ene", |session, tokens| {
            let mut builder = MoleculeBuilder::new();
            let ring = rings::cycloalkane(&mut builder, 6);
            apply_unsaturation(&mut builder, session, tokens, &ring);
            assert_eq!(builder.bond_order(ring[5], ring[0]), Some(BondOrder::Double));
        });
    }

    #[test]
    fn test_diol_and_acid_termini() {
        with_session("pentane-2,4-diol", |session, tokens| {
            let mut builder = MoleculeBuilder::new();
            let chain = builder.add_chain(5);
            apply_suffixes(&mut builder, session, tokens, &chain, false);
            assert_eq!(builder.neighbors(chain[1]).len(), 3);
            assert_eq!(builder.neighbors(chain[3]).len(), 3);
        });
        with_session("hexanedioic acid", |session, tokens| {
            let mut builder = MoleculeBuilder::new();
            let chain = builder.add_chain(6);
            apply_suffixes(&mut builder, session, tokens, &chain, false);
            assert!(builder.is_carbonyl_carbon(chain[0]));
            assert!(builder.is_carbonyl_carbon(chain[5]));
        });
    }

    #[test]
    fn test_ring_acid_adds_carbon() {
        with_session("cyclohexanecarboxylic acid", |session, tokens| {
            let mut builder = MoleculeBuilder::new();
            let ring = rings::cycloalkane(&mut builder, 6);
            apply_suffixes(&mut builder, session, tokens, &ring, true);
            assert_eq!(builder.atom_count(), 9);
            assert!(!builder.is_carbonyl_carbon(ring[0]));
        });
    }

    #[test]
    fn test_oate_queues_oxygen_and_amide_reports_nitrogen() {
        with_session("butanoate", |session, tokens| {
            let mut builder = MoleculeBuilder::new();
            let chain = builder.add_chain(4);
            let mut outcome = apply_suffixes(&mut builder, session, tokens, &chain, false);
            assert_eq!(outcome.ester_oxygens.len(), 1);
            let oxygen = outcome.ester_oxygens[0];
            close_ester_oxygens(&mut builder, &mut outcome.ester_oxygens);
            assert_eq!(builder.atom(oxygen).map(|a| a.charge), Some(-1));
        });
        with_session("ethanamide", |session, tokens| {
            let mut builder = MoleculeBuilder::new();
            let chain = builder.add_chain(2);
            let outcome = apply_suffixes(&mut builder, session, tokens, &chain, false);
            assert_eq!(outcome.nitrogens.len(), 1);
            assert_eq!(builder.neighbors(outcome.nitrogens[0]), vec![chain[0]]);
        });
    }

    #[test]
    fn test_suffix_refuses_ring_heteroatoms() {
        with_session("oxan-1-ol", |session, tokens| {
            let mut builder = MoleculeBuilder::new();
            let ring = rings::build_named(&mut builder, "oxane", None).unwrap();
            apply_suffixes(&mut builder, session, tokens, &ring, true);
            assert_eq!(builder.atom_count(), 6);
            assert!(matches!(
                session.warnings.as_slice(),
                [BuildWarning::RefusedElement { atom: 0, .. }]
            ));
        });
        with_session("pyridin-1-one", |session, tokens| {
            let mut builder = MoleculeBuilder::new();
            let ring = rings::pyridine(&mut builder);
            apply_suffixes(&mut builder, session, tokens, &ring, true);
            assert_eq!(builder.atom_count(), 6);
            assert_eq!(session.warnings.len(), 1);
        });
    }

    #[test]
    fn test_aromatic_ketone_dearomatizes() {
        with_session("pyridin-2-one", |session, tokens| {
            let mut builder = MoleculeBuilder::new();
            let ring = rings::pyridine(&mut builder);
            apply_suffixes(&mut builder, session, tokens, &ring, true);
            assert!(!builder.is_aromatic(ring[1]));
            assert!(builder.is_carbonyl_carbon(ring[1]));
        });
    }
}
