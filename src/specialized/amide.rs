use tracing::*;

use crate::*;

/// True if the `N` prefix at `index` is followed by a substituent before the name moves on.
fn has_substituent(tokens: &[Token], index: usize) -> bool {
    tokens[index + 1..]
        .iter()
        .take_while(|t| !(t.is(TokenKind::Parent) || t.is(TokenKind::Suffix) || t.is_n_prefix()))
        .any(|t| t.is(TokenKind::Substituent))
}

/// `N,N-dimethylacetamide`, `N-ethylpropan-1-amine`.
///
/// Every `N` prefix must carry a substituent; the shared stages do the rest,
/// with the `N`-bound substituents going to the nitrogens the suffix made.
pub(crate) fn build_n_substituted(
    builder: &mut MoleculeBuilder,
    session: &mut Session,
    tokens: &[Token],
    form: &'static str,
) -> Result<ParentSkeleton, FailureReason> {
    for (i, token) in tokens.iter().enumerate() {
        if token.is_n_prefix() && !has_substituent(tokens, i) {
            error!("'{}': '{}' names no substituent", session.name, token.text);
            return Err(FailureReason::MissingNPrefix(form));
        }
    }
    assemble(builder, session, tokens, StageOptions::default())
}

/// The nitrogen copy `copy` of an `N`-bound substituent lands on.
///
/// Primes pick the nitrogen (`N` is the first, `N'` the second); copies past the
/// cited primes reuse the last one, so `N,N-dimethyl` puts both on one nitrogen
/// and `N,N'-dimethyl` spreads them over two.
fn nitrogen_slot(primes: &[u8], copy: usize) -> usize {
    primes
        .get(copy)
        .or_else(|| primes.last())
        .map(|&p| p as usize)
        .unwrap_or(0)
}

/// Attaches deferred `N`-bound substituents to the suffix nitrogens.
pub(crate) fn attach_n_substituents(
    builder: &mut MoleculeBuilder,
    session: &mut Session,
    tokens: &[Token],
    deferred: &[usize],
    nitrogens: &[usize],
) -> Result<(), FailureReason> {
    for &index in deferred {
        let token = &tokens[index];
        let placement = placement_for(tokens, index);
        let primes = placement.n_prefix.clone().unwrap_or_default();
        let order = bond_order_for(token);
        for copy in 0..placement.count {
            let Some(&nitrogen) = nitrogens.get(nitrogen_slot(&primes, copy)) else {
                session.warn(BuildWarning::NoNitrogen {
                    token: token.text.clone(),
                });
                break;
            };
            let Some(fragment) = build_substituent(builder, session, token, 0)? else {
                break;
            };
            bond_fragment(builder, nitrogen, &fragment, order);
            debug!("'{}' on nitrogen {}", token.text, nitrogen);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nitrogen_slots() {
        assert_eq!(nitrogen_slot(&[0, 0], 1), 0);
        assert_eq!(nitrogen_slot(&[0, 1], 1), 1);
        assert_eq!(nitrogen_slot(&[1], 2), 1);
        assert_eq!(nitrogen_slot(&[], 0), 0);
    }

    #[test]
    fn test_missing_n_substituent() {
        let name = "N-ethanamine";
        let tokens = vec![
            Token::new("N", 0, TokenPayload::Prefix(PrefixPayload::NLocant { primes: vec![0] })),
            Token::new(
                "ethan",
                2,
                TokenPayload::Parent(ParentPayload::Fragment {
                    canonical: "eth".to_string(),
                    fragment_smiles: None,
                    atom_count: 2,
                }),
            ),
            Token::new(
                "amine",
                7,
                TokenPayload::Suffix(SuffixPayload {
                    kind: SuffixKind::Amine,
                    adds_carbon: false,
                    implied: None,
                }),
            ),
        ];
        let registry = Registry::standard();
        let mut session = Session::new(name, crate::rules::rules(), &registry, 16);
        let mut builder = MoleculeBuilder::new();
        assert_eq!(
            build_n_substituted(&mut builder, &mut session, &tokens, "amine"),
            Err(FailureReason::MissingNPrefix("amine"))
        );
    }
}
