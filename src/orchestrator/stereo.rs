use tracing::*;

use crate::*;

/// Where an uncited descriptor lands: the atom or bond at the first locanted suffix.
fn suffix_locant(tokens: &[Token]) -> Option<i64> {
    tokens.iter().enumerate().find_map(|(i, token)| {
        token.suffix()?;
        placement_for(tokens, i).positions.first().map(|&p| p as i64)
    })
}

fn double_bond_at(builder: &MoleculeBuilder, skeleton: &[usize], locant: i64) -> Option<(usize, usize)> {
    let a = locant_to_atom_index(locant, skeleton)?;
    let b = locant_to_atom_index(locant + 1, skeleton)?;
    (builder.bond_order(a, b) == Some(BondOrder::Double)).then_some((a, b))
}

/// The first carbon with three or more single bonds.
fn first_stereocenter(builder: &MoleculeBuilder, skeleton: &[usize]) -> Option<usize> {
    skeleton
        .iter()
        .copied()
        .find(|&atom| builder.element(atom) == Some(Element::C) && builder.single_bond_count(atom) >= 3)
}

fn first_double_bond(builder: &MoleculeBuilder, skeleton: &[usize]) -> Option<(usize, usize)> {
    skeleton
        .windows(2)
        .map(|pair| (pair[0], pair[1]))
        .find(|&(a, b)| builder.bond_order(a, b) == Some(BondOrder::Double))
}

fn tetrahedral_target(
    builder: &MoleculeBuilder,
    tokens: &[Token],
    skeleton: &[usize],
    cited: Option<u32>,
) -> Option<usize> {
    match cited {
        Some(locant) => locant_to_atom_index(locant as i64, skeleton),
        None => suffix_locant(tokens)
            .and_then(|locant| locant_to_atom_index(locant, skeleton))
            .or_else(|| first_stereocenter(builder, skeleton)),
    }
}

fn double_bond_target(
    builder: &MoleculeBuilder,
    tokens: &[Token],
    skeleton: &[usize],
    cited: Option<u32>,
) -> Option<(usize, usize)> {
    match cited {
        Some(locant) => double_bond_at(builder, skeleton, locant as i64),
        None => suffix_locant(tokens)
            .and_then(|locant| double_bond_at(builder, skeleton, locant))
            .or_else(|| first_double_bond(builder, skeleton)),
    }
}

/// Marks the bonds flanking `a=b`: `Up/Up` for E, `Up/Down` for Z.
fn mark_double_bond(builder: &mut MoleculeBuilder, (a, b): (usize, usize), descriptor: StereoDescriptor) -> bool {
    let before = builder.neighbors(a).into_iter().find(|&n| n != b);
    let after = builder.neighbors(b).into_iter().find(|&n| n != a);
    let (Some(before), Some(after)) = (before, after) else {
        return false;
    };
    let second = if descriptor == StereoDescriptor::E {
        BondStereo::Up
    } else {
        BondStereo::Down
    };
    builder.set_bond_stereo(before, a, BondStereo::Up) && builder.set_bond_stereo(b, after, second)
}

/// Applies `(2R,3E)`-style descriptors.
///
/// Cited locants are used as written. An uncited descriptor goes to the first
/// locanted suffix position; failing that, R/S take the first carbon with three
/// single bonds and E/Z the first double bond. Several uncited R/S descriptors
/// therefore all land on the same atom.
pub fn apply_stereo(
    builder: &mut MoleculeBuilder,
    session: &mut Session,
    tokens: &[Token],
    skeleton: &[usize],
) {
    for token in tokens.iter().filter(|t| t.is(TokenKind::Stereo)) {
        for citation in token.stereo() {
            let placed = if citation.descriptor.is_tetrahedral() {
                match tetrahedral_target(builder, tokens, skeleton, citation.locant) {
                    Some(atom) => {
                        let chirality = match citation.descriptor {
                            StereoDescriptor::R => Chirality::Clockwise,
                            _ => Chirality::CounterClockwise,
                        };
                        debug!("{:?} at atom {}", citation.descriptor, atom);
                        builder.set_chirality(atom, Some(chirality))
                    }
                    None => false,
                }
            } else {
                match double_bond_target(builder, tokens, skeleton, citation.locant) {
                    Some(bond) => {
                        debug!("{:?} across {:?}", citation.descriptor, bond);
                        mark_double_bond(builder, bond, citation.descriptor)
                    }
                    None => false,
                }
            };
            if !placed {
                let locant = citation.locant.map(|l| l.to_string()).unwrap_or_default();
                session.warn(BuildWarning::UnplacedStereo {
                    descriptor: format!("{}{:?}", locant, citation.descriptor),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::rules;

    fn stereo_of(
        name: &str,
        build: impl FnOnce(&mut MoleculeBuilder) -> Vec<usize>,
    ) -> (MoleculeBuilder, Vec<usize>, Vec<BuildWarning>) {
        let tokens = tokenize(name).unwrap();
        let registry = Registry::standard();
        let mut session = Session::new(name, rules(), &registry, 16);
        let mut builder = MoleculeBuilder::new();
        let skeleton = build(&mut builder);
        apply_stereo(&mut builder, &mut session, &tokens, &skeleton);
        (builder, skeleton, session.warnings)
    }

    fn butan_2_ol(builder: &mut MoleculeBuilder) -> Vec<usize> {
        let chain = builder.add_chain(4);
        builder.attach_atom(chain[1], Element::O, BondOrder::Single);
        chain
    }

    #[test]
    fn test_cited_tetrahedral() {
        let (builder, chain, warnings) = stereo_of("(2R)-butan-2-ol", butan_2_ol);
        assert_eq!(builder.atom(chain[1]).and_then(|a| a.chirality), Some(Chirality::Clockwise));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_uncited_uses_suffix_locant() {
        let (builder, chain, _) = stereo_of("(S)-butan-2-ol", butan_2_ol);
        assert_eq!(
            builder.atom(chain[1]).and_then(|a| a.chirality),
            Some(Chirality::CounterClockwise)
        );
    }

    #[test]
    fn test_uncited_falls_back_to_first_branch_carbon() {
        let (builder, chain, _) = stereo_of("(R)-2-chlorobutane", |builder| {
            let chain = builder.add_chain(4);
            builder.attach_atom(chain[1], Element::Cl, BondOrder::Single);
            chain
        });
        assert_eq!(builder.atom(chain[1]).and_then(|a| a.chirality), Some(Chirality::Clockwise));
    }

    #[test]
    fn test_repeated_uncited_descriptors_share_an_atom() {
        let (builder, chain, _) = stereo_of("(R,S)-2,3-dichlorobutane", |builder| {
            let chain = builder.add_chain(4);
            builder.attach_atom(chain[1], Element::Cl, BondOrder::Single);
            builder.attach_atom(chain[2], Element::Cl, BondOrder::Single);
            chain
        });
        // Known limitation: both land on C2, C3 stays unassigned.
        assert_eq!(
            builder.atom(chain[1]).and_then(|a| a.chirality),
            Some(Chirality::CounterClockwise)
        );
        assert_eq!(builder.atom(chain[2]).and_then(|a| a.chirality), None);
    }

    #[test]
    fn test_double_bond_descriptors() {
        let but_2_ene = |builder: &mut MoleculeBuilder| {
            let chain = builder.add_chain(4);
            builder.set_bond_order(chain[1], chain[2], BondOrder::Double);
            chain
        };
        let (builder, chain, _) = stereo_of("(E)-but-2-ene", but_2_ene);
        assert_eq!(builder.bond_stereo(chain[0], chain[1]), Some(BondStereo::Up));
        assert_eq!(builder.bond_stereo(chain[2], chain[3]), Some(BondStereo::Up));

        let (builder, chain, _) = stereo_of("(2Z)-but-2-ene", but_2_ene);
        assert_eq!(builder.bond_stereo(chain[2], chain[3]), Some(BondStereo::Down));
    }

    #[test]
    fn test_unplaceable_descriptor_warns() {
        let (_, _, warnings) = stereo_of("(2E)-butane", |builder| builder.add_chain(4));
        assert!(matches!(warnings.as_slice(), [BuildWarning::UnplacedStereo { .. }]));
    }
}
