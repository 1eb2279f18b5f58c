use tracing::*;

use crate::molecule::rings;
use crate::*;

/// Rewrites the token stream before any atoms are built.
///
/// - `N-methyl` tokens split into an `N` prefix and the substituent.
/// - Adjacent alkane stems (`penta` + `decane`) merge into one composite parent.
/// - A multiplier glued to a ring name folds into it when the result is a
///   known ring (`di` + `oxane` is `dioxane`).
/// - A `<parent>-<locant>-yl` run followed by more name becomes one nested
///   substituent (`propan-2-yl acetate`).
/// - An implied acyl word (`acetate`, `benzoate`) with no parent in the name
///   gets a parent of its own.
pub fn preprocess(name: &str, tokens: Vec<Token>) -> Vec<Token> {
    let tokens = normalize(tokens);
    let tokens = promote_yl_groups(name, tokens);
    synthesize_implied_parent(tokens)
}

fn normalize(tokens: Vec<Token>) -> Vec<Token> {
    let tokens = tokens
        .into_iter()
        .map(|mut token| {
            if let Some(nested) = token.nested.take() {
                token.nested = Some(normalize(nested));
            }
            token
        })
        .collect();
    let tokens = split_n_substituted(resolve_numbered_nitrogens(tokens));
    fold_ring_multipliers(merge_composite_parents(tokens))
}

/// Turns `N1,N4` into nitrogen slots: the index of each cited locant among the
/// positions of the next nitrogen-bearing suffix.
fn resolve_numbered_nitrogens(mut tokens: Vec<Token>) -> Vec<Token> {
    for i in 0..tokens.len() {
        let Some(PrefixPayload::NumberedN { locants }) = tokens[i].prefix() else {
            continue;
        };
        let locants = locants.clone();
        let positions = tokens
            .iter()
            .enumerate()
            .skip(i + 1)
            .find(|(_, t)| t.suffix_kind().map(|k| k.makes_nitrogen()).unwrap_or(false))
            .map(|(j, _)| placement_for(&tokens, j).positions)
            .unwrap_or_default();
        let primes = locants
            .iter()
            .map(|locant| match positions.iter().position(|p| p == locant) {
                Some(slot) => slot as u8,
                None => {
                    warn!("N{} names no nitrogen-bearing position; using the first", locant);
                    0
                }
            })
            .collect();
        trace!("'{}' resolves to nitrogen slots {:?}", tokens[i].text, primes);
        tokens[i].payload = TokenPayload::Prefix(PrefixPayload::NLocant { primes });
    }
    tokens
}

fn split_n_substituted(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        let split = match token.prefix() {
            Some(PrefixPayload::NSubstituted { primes, substituent }) => token
                .text
                .find('-')
                .map(|dash| (dash, primes.clone(), substituent.clone())),
            _ => None,
        };
        let Some((dash, primes, canonical)) = split else {
            out.push(token);
            continue;
        };
        trace!("Splitting '{}'", token.text);
        out.push(Token::new(
            &token.text[..dash],
            token.position,
            TokenPayload::Prefix(PrefixPayload::NLocant { primes }),
        ));
        out.push(Token::new(
            &token.text[dash + 1..],
            token.position + dash + 1,
            TokenPayload::Substituent { canonical },
        ));
    }
    out
}

fn is_alkane_parent(token: &Token) -> bool {
    token.length > 0
        && token
            .parent()
            .map(|p| p.fragment_smiles().is_none() && rings::template(&p.canonical()).is_none())
            .unwrap_or(false)
}

fn composite(first: &Token, second: &Token) -> Option<Token> {
    if !(is_alkane_parent(first) && is_alkane_parent(second) && first.end() == second.position) {
        return None;
    }
    let (head, tail) = (first.parent()?, second.parent()?);
    let mut parts = match head {
        ParentPayload::Composite { parts, .. } => parts.clone(),
        ParentPayload::Fragment { canonical, .. } => vec![canonical.clone()],
    };
    parts.push(tail.canonical());
    let atom_count = head.atom_count() + tail.atom_count();
    debug!("Composite parent {:?} of {} atoms", parts, atom_count);
    Some(Token::new(
        format!("{}{}", first.text, second.text),
        first.position,
        TokenPayload::Parent(ParentPayload::Composite { parts, atom_count }),
    ))
}

fn merge_composite_parents(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if let Some(merged) = out.last().and_then(|previous| composite(previous, &token)) {
            if let Some(previous) = out.last_mut() {
                *previous = merged;
            }
            continue;
        }
        out.push(token);
    }
    out
}

fn folded_ring(multiplier: &Token, ring: &Token) -> Option<Token> {
    if !multiplier.is(TokenKind::Multiplier) || multiplier.end() != ring.position {
        return None;
    }
    let canonical = format!("{}{}", multiplier.text.to_ascii_lowercase(), ring.parent()?.canonical());
    let template = rings::template(&canonical)?;
    debug!("Folded '{}' into ring '{}'", multiplier.text, canonical);
    Some(Token::new(
        format!("{}{}", multiplier.text, ring.text),
        multiplier.position,
        TokenPayload::Parent(ParentPayload::Fragment {
            canonical,
            fragment_smiles: None,
            atom_count: template.size(),
        }),
    ))
}

fn fold_ring_multipliers(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if let Some(folded) = out.last().and_then(|previous| folded_ring(previous, &token)) {
            if let Some(previous) = out.last_mut() {
                *previous = folded;
            }
            continue;
        }
        out.push(token);
    }
    out
}

/// First index of the parent word that ends in the `yl` at `k`, if it should be promoted.
fn yl_group_start(name: &str, tokens: &[Token], k: usize) -> Option<usize> {
    let yl = &tokens[k];
    if !matches!(yl.suffix_kind(), Some(SuffixKind::Yl) | Some(SuffixKind::Ylidene)) {
        return None;
    }
    if tokens.get(k + 1)?.suffix_kind() == Some(SuffixKind::Oxy) {
        return None;
    }
    let spaced = name
        .get(yl.end()..)
        .map(|rest| rest.starts_with(char::is_whitespace))
        .unwrap_or(false);
    let start = if spaced {
        let word_start = name
            .get(..yl.position)
            .and_then(|before| before.rfind(char::is_whitespace))
            .map(|i| i + 1)
            .unwrap_or(0);
        tokens[..k].iter().position(|t| t.position >= word_start)?
    } else {
        // Only the parent's own prefixes, locants and unsaturation.
        let mut start = k;
        let mut seen_parent = false;
        while start > 0 {
            let token = &tokens[start - 1];
            match token.kind() {
                TokenKind::Parent => seen_parent = true,
                TokenKind::Prefix if !token.is_n_prefix() => {}
                TokenKind::Locant | TokenKind::Multiplier | TokenKind::Suffix if !seen_parent => {}
                _ => break,
            }
            start -= 1;
        }
        start
    };
    tokens[start..k]
        .iter()
        .any(|t| t.is(TokenKind::Parent))
        .then_some(start)
}

fn promote_yl_groups(name: &str, mut tokens: Vec<Token>) -> Vec<Token> {
    let mut k = 0;
    while k < tokens.len() {
        let Some(start) = yl_group_start(name, &tokens, k) else {
            k += 1;
            continue;
        };
        let group: Vec<Token> = tokens.drain(start..=k).collect();
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            break;
        };
        let (from, to) = (first.position, last.end());
        let text = name.get(from..to).unwrap_or_default().to_string();
        debug!("Promoting '{}' to a substituent", text);
        let token = Token::new(
            text.clone(),
            from,
            TokenPayload::Substituent {
                canonical: text.to_ascii_lowercase(),
            },
        )
        .with_nested(group);
        tokens.insert(start, token);
        k = start + 1;
    }
    tokens
}

fn synthesize_implied_parent(mut tokens: Vec<Token>) -> Vec<Token> {
    if tokens.iter().any(|t| t.is(TokenKind::Parent)) {
        return tokens;
    }
    let implied = tokens.iter().enumerate().find_map(|(i, t)| {
        let acyl = t.suffix()?.implied.as_ref()?;
        Some((i, t.position, acyl.clone()))
    });
    let Some((index, position, acyl)) = implied else {
        return tokens;
    };
    trace!("Implied parent '{}' of {} atoms", acyl.stem, acyl.atom_count);
    let parent = Token::new(
        "",
        position,
        TokenPayload::Parent(ParentPayload::Fragment {
            canonical: acyl.stem,
            fragment_smiles: acyl.fragment_smiles,
            atom_count: acyl.atom_count,
        }),
    );
    tokens.insert(index, parent);
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepared(name: &str) -> Vec<Token> {
        preprocess(name, tokenize(name).unwrap())
    }

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind()).collect()
    }

    #[test]
    fn test_n_substituted_split() {
        let tokens = prepared("N-methylacetamide");
        assert_eq!(tokens[0].n_locant_primes(), Some(&[0u8][..]));
        assert_eq!(tokens[0].text, "N");
        assert_eq!(tokens[1].canonical(), "methyl");
        assert_eq!(tokens[1].position, 2);
        assert_eq!(
            kinds(&tokens),
            vec![TokenKind::Prefix, TokenKind::Substituent, TokenKind::Parent, TokenKind::Suffix]
        );
    }

    #[test]
    fn test_numbered_nitrogens_resolve_to_slots() {
        let tokens = prepared("N1,N1-dimethylethane-1,2-diamine");
        assert_eq!(tokens[0].n_locant_primes(), Some(&[0u8, 0][..]));
        let tokens = prepared("N1,N4-diethylbutane-1,4-diamine");
        assert_eq!(tokens[0].n_locant_primes(), Some(&[0u8, 1][..]));
    }

    #[test]
    fn test_composite_parent() {
        let tokens = prepared("pentadecane");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].parent().map(|p| p.atom_count()), Some(15));
    }

    #[test]
    fn test_ring_multiplier_fold() {
        let tokens = prepared("1,4-dioxane");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].parent().map(|p| p.canonical()), Some("dioxane".to_string()));
        // A multiplier that makes no known ring is left alone.
        let tokens = prepared("2,6-dimethylpyridine");
        assert_eq!(tokens[1].multiplier_count(), Some(2));
    }

    #[test]
    fn test_yl_promotion() {
        let tokens = prepared("propan-2-yl acetate");
        assert_eq!(tokens[0].canonical(), "propan-2-yl");
        assert_eq!(tokens[0].nested_tokens().len(), 3);
        assert_eq!(tokens[1].parent().map(|p| p.canonical()), Some("acet".to_string()));
        assert_eq!(tokens[2].suffix_kind(), Some(SuffixKind::Oate));

        let tokens = prepared("propan-2-yloxybenzene");
        assert!(tokens.iter().all(|t| t.nested.is_none()));
    }

    #[test]
    fn test_implied_parent_only_when_missing() {
        let tokens = prepared("ethyl benzoate");
        let parent = tokens.iter().find_map(|t| t.parent()).unwrap();
        assert_eq!(parent.fragment_smiles(), Some("c1ccccc1"));
        let tokens = prepared("butanoic acid");
        assert_eq!(tokens.iter().filter(|t| t.is(TokenKind::Parent)).count(), 1);
    }
}
