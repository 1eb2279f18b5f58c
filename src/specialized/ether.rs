use tracing::*;

use crate::*;

/// `propan-2-yloxybenzene`: the tokens before the `oxy` connector build the
/// alkyl group, the tokens after it the main chain, joined through a new oxygen.
///
/// A locant written first, right before the alkyl parent, places the oxygen on
/// the main chain; otherwise it goes to position 1.
pub(crate) fn build_ether(
    builder: &mut MoleculeBuilder,
    session: &mut Session,
    tokens: &[Token],
    connector: usize,
) -> Result<ParentSkeleton, FailureReason> {
    let (alkyl_side, rest) = tokens.split_at(connector);
    let main_side = rest.get(1..).unwrap_or_default();
    let (locant, alkyl_side) = match alkyl_side {
        [first, second, ..] if first.is(TokenKind::Locant) && second.is(TokenKind::Parent) => {
            let locant = first.positions().first().map(|&p| p as i64).unwrap_or(1);
            (locant, &alkyl_side[1..])
        }
        _ => (1, alkyl_side),
    };

    let main = assemble(builder, session, main_side, StageOptions::default())?;
    let alkyl = in_stage("ether", || build_tokens(builder, session, alkyl_side, 1))?;
    let Some(alkyl) = alkyl else {
        let name = session.name;
        let token = match (alkyl_side.first(), alkyl_side.last()) {
            (Some(first), Some(last)) => name.get(first.position..last.end()).unwrap_or_default(),
            _ => "",
        };
        session.warn(BuildWarning::Unbuildable {
            token: token.to_string(),
        });
        return Ok(main);
    };
    let Some(anchor) = locant_to_atom_index(locant, &main.atoms) else {
        session.warn(BuildWarning::LocantOutOfRange {
            token: tokens[connector].text.clone(),
            locant,
            length: main.atoms.len(),
        });
        return Ok(main);
    };
    release_hydrogen(builder, anchor, BondOrder::Single);
    if let Some(oxygen) = builder.attach_atom(anchor, Element::O, BondOrder::Single) {
        builder.add_bond(oxygen, alkyl.attachment_point, BondOrder::Single);
        debug!("Ether oxygen {} joins main locant {} to the alkyl side", oxygen, locant);
    }
    Ok(main)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::rules;

    fn ether(name: &str) -> (MoleculeBuilder, Result<ParentSkeleton, FailureReason>, Vec<BuildWarning>) {
        let tokens = preprocess(name, tokenize(name).unwrap());
        let connector = tokens
            .iter()
            .position(|t| t.suffix_kind() == Some(SuffixKind::Oxy))
            .unwrap();
        let registry = Registry::standard();
        let mut session = Session::new(name, rules(), &registry, 16);
        let mut builder = MoleculeBuilder::new();
        let result = build_ether(&mut builder, &mut session, &tokens, connector);
        (builder, result, session.warnings)
    }

    #[test]
    fn test_isopropyl_phenyl_ether() {
        let (builder, result, warnings) = ether("propan-2-yloxybenzene");
        let main = result.unwrap();
        assert!(warnings.is_empty());
        assert_eq!(builder.atom_count(), 10);
        let oxygen = builder
            .neighbors(main.atoms[0])
            .into_iter()
            .find(|&n| builder.element(n) == Some(Element::O))
            .unwrap();
        let alkyl_carbon = builder
            .neighbors(oxygen)
            .into_iter()
            .find(|&n| n != main.atoms[0])
            .unwrap();
        // The secondary carbon of the propyl group.
        assert_eq!(builder.neighbors(alkyl_carbon).len(), 3);
    }

    #[test]
    fn test_main_side_needs_a_parent() {
        let tokens = tokenize("propan-2-yloxy").unwrap();
        let registry = Registry::standard();
        let mut session = Session::new("propan-2-yloxy", rules(), &registry, 16);
        let mut builder = MoleculeBuilder::new();
        assert_eq!(
            build_ether(&mut builder, &mut session, &tokens, 3),
            Err(FailureReason::NoParentChain)
        );
    }
}
