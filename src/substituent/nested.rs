use tracing::*;

use crate::*;

/// Builds the fragment of a parenthesized substituent from its nested tokens.
///
/// `depth` is the bracket depth of `token`; going past the session's limit
/// fails the whole name with [`FailureReason::NestingTooDeep`]. `Ok(None)` means
/// no pattern could build the group, which callers treat as a skip.
pub fn build_nested(
    builder: &mut MoleculeBuilder,
    session: &mut Session,
    token: &Token,
    depth: usize,
) -> Result<Option<Fragment>, FailureReason> {
    build_tokens(builder, session, token.nested_tokens(), depth)
}

/// Runs the pattern registry over a token slice.
///
/// Each matching pattern is tried in priority order against a snapshot of the
/// builder; a pattern that gives up leaves no atoms or warnings behind.
pub fn build_tokens(
    builder: &mut MoleculeBuilder,
    session: &mut Session,
    tokens: &[Token],
    depth: usize,
) -> Result<Option<Fragment>, FailureReason> {
    if depth > session.max_depth {
        error!("'{}' nests deeper than {} levels", session.name, session.max_depth);
        return Err(FailureReason::NestingTooDeep(session.max_depth));
    }
    if tokens.is_empty() {
        return Ok(None);
    }
    let ctx = TokenContext::new(tokens);
    let registry = session.registry;
    let rules = session.rules;
    for pattern in registry.matching(&ctx, rules) {
        let snapshot = builder.clone();
        let warned = session.warnings.len();
        let span = debug_span!("strategy", strategy = pattern.name(), depth);
        let _enter = span.enter();
        match pattern.build(builder, session, &ctx, depth)? {
            Some(fragment) => {
                debug!(
                    strategy = pattern.name(),
                    "Built {} atoms, attached at {}",
                    fragment.atoms.len(),
                    fragment.attachment_point
                );
                return Ok(Some(fragment));
            }
            None => {
                trace!(strategy = pattern.name(), "Gave up; trying the next pattern");
                *builder = snapshot;
                session.warnings.truncate(warned);
            }
        }
    }
    Ok(None)
}

/// True if a nested group ends in `-ylidene` and so bonds with a double bond.
pub fn is_ylidene_group(token: &Token) -> bool {
    token
        .nested_tokens()
        .iter()
        .any(|t| t.suffix_kind() == Some(SuffixKind::Ylidene))
        || token
            .nested_tokens()
            .last()
            .map(|t| attachment_order(t.canonical()) == BondOrder::Double)
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::rules;

    fn build(name: &str, index: usize, max_depth: usize) -> (MoleculeBuilder, Result<Option<Fragment>, FailureReason>) {
        let tokens = tokenize(name).unwrap();
        let registry = Registry::standard();
        let mut session = Session::new(name, rules(), &registry, max_depth);
        let mut builder = MoleculeBuilder::new();
        let result = build_nested(&mut builder, &mut session, &tokens[index], 1);
        (builder, result)
    }

    #[test]
    fn test_substituted_phenyl_fragment() {
        let (builder, result) = build("1-(4-chlorophenyl)ethanol", 1, 16);
        let fragment = result.unwrap().unwrap();
        assert_eq!(builder.atom_count(), 7);
        let chlorine = (0..builder.atom_count())
            .find(|&a| builder.element(a) == Some(Element::Cl))
            .unwrap();
        let ring_carbon = builder.neighbors(chlorine)[0];
        // Para to the attachment point: three bonds away around the ring.
        assert!(!builder.neighbors(fragment.attachment_point).contains(&ring_carbon));
        assert!(builder.is_aromatic(fragment.attachment_point));
    }

    #[test]
    fn test_silyl_ether_fragment() {
        let (builder, result) = build("2-{[(tert-butyldimethylsilyl)oxy]methyl}pyridine", 1, 16);
        let fragment = result.unwrap().unwrap();
        assert_eq!(builder.element(fragment.attachment_point), Some(Element::C));
        let oxygen = builder.neighbors(fragment.attachment_point)[0];
        assert_eq!(builder.element(oxygen), Some(Element::O));
        let silicon = (0..builder.atom_count())
            .find(|&a| builder.element(a) == Some(Element::Si))
            .unwrap();
        assert_eq!(builder.neighbors(silicon).len(), 4);
        // methyl + O + Si + 2 methyls + tert-butyl
        assert_eq!(builder.atom_count(), 9);
    }

    #[test]
    fn test_chain_yl_attaches_at_locant() {
        let (builder, result) = build("2-(propan-2-yl)phenol", 1, 16);
        let fragment = result.unwrap().unwrap();
        assert_eq!(builder.atom_count(), 3);
        assert_eq!(builder.neighbors(fragment.attachment_point).len(), 2);
    }

    #[test]
    fn test_depth_limit_fails() {
        let (_, result) = build("1-(4-chlorophenyl)ethanol", 1, 0);
        assert_eq!(result, Err(FailureReason::NestingTooDeep(0)));
    }

    #[test]
    fn test_unknown_shape_is_a_skip() {
        let tokens = vec![Token::new("2", 0, TokenPayload::Locant(vec![LocantValue::Numeric(2)]))];
        let registry = Registry::standard();
        let mut session = Session::new("2", rules(), &registry, 16);
        let mut builder = MoleculeBuilder::new();
        assert_eq!(build_tokens(&mut builder, &mut session, &tokens, 1), Ok(None));
        assert_eq!(builder.atom_count(), 0);
    }

    #[test]
    fn test_ylidene_groups_double_bond() {
        let tokens = tokenize("2-(propan-2-ylidene)cyclohexan-1-one").unwrap();
        assert!(is_ylidene_group(&tokens[1]));
        let tokens = tokenize("2-(propan-2-yl)phenol").unwrap();
        assert!(!is_ylidene_group(&tokens[1]));
    }
}
