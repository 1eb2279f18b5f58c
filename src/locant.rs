use crate::*;

/// Maps a 1-based locant onto a skeleton in locant order.
///
/// Returns `None` for locants below 1 or past the end of `chain`.
pub fn locant_to_atom_index(locant: i64, chain: &[usize]) -> Option<usize> {
    if locant < 1 {
        return None;
    }
    let index = usize::try_from(locant - 1).ok()?;
    chain.get(index).copied()
}

/// Where and how many times a substituent, suffix or prefix applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    /// Cited positions, in citation order. Empty when no locant was given.
    pub positions: Vec<u32>,
    /// How many copies to place.
    pub count: usize,
    /// Whether a multiplier fixed `count`.
    pub multiplied: bool,
    /// Prime counts of an `N`/`N'` prefix, when the token is N-bound.
    pub n_prefix: Option<Vec<u8>>,
    /// The multiplier asked for more positions than were cited.
    pub mismatch: bool,
}

impl Placement {
    /// Positions to use: the cited ones, or position 1 repeated `count` times.
    pub fn targets(&self) -> Vec<i64> {
        if self.positions.is_empty() {
            vec![1; self.count]
        } else {
            self.positions.iter().take(self.count).map(|&p| p as i64).collect()
        }
    }

    pub fn is_n_bound(&self) -> bool {
        self.n_prefix.is_some()
    }
}

fn blocks(token: &Token) -> bool {
    match token.kind() {
        TokenKind::Substituent | TokenKind::Parent | TokenKind::Suffix => true,
        TokenKind::Prefix => !token.is_n_prefix(),
        _ => false,
    }
}

/// Resolves the nearest preceding locant and multiplier for `tokens[index]`.
///
/// An intervening substituent, parent, suffix or (non-`N`) prefix stops the
/// backward scan. If a multiplier wants more positions than the nearest locant
/// gives, earlier locant lists are concatenated in front until the counts match.
pub fn placement_for(tokens: &[Token], index: usize) -> Placement {
    let mut placement = Placement {
        count: 1,
        ..Placement::default()
    };
    let mut multiplier = None;
    let mut j = index;
    while j > 0 {
        j -= 1;
        let token = &tokens[j];
        if let Some(primes) = token.n_locant_primes() {
            placement.n_prefix = Some(primes.to_vec());
            break;
        }
        match token.kind() {
            TokenKind::Multiplier if multiplier.is_none() && placement.positions.is_empty() => {
                multiplier = token.multiplier_count();
            }
            TokenKind::Locant => {
                let positions = token.positions();
                if !positions.is_empty() {
                    placement.positions = positions;
                    break;
                }
            }
            TokenKind::Stereo => {}
            _ if blocks(token) => {
                j = 0;
                break;
            }
            _ => {}
        }
    }

    match multiplier {
        Some(count) => {
            placement.count = count;
            placement.multiplied = true;
        }
        None => placement.count = placement.positions.len().max(1),
    }

    // Extend with earlier locant lists until the multiplier is satisfied.
    if placement.multiplied
        && !placement.positions.is_empty()
        && placement.positions.len() < placement.count
    {
        while j > 0 && placement.positions.len() < placement.count {
            j -= 1;
            let token = &tokens[j];
            if token.is(TokenKind::Parent) {
                break;
            }
            if token.is(TokenKind::Locant) {
                let mut earlier = token.positions();
                earlier.extend(placement.positions.iter().copied());
                placement.positions = earlier;
            }
        }
        placement.mismatch = placement.positions.len() != placement.count;
    } else if placement.multiplied
        && !placement.positions.is_empty()
        && placement.positions.len() > placement.count
    {
        placement.mismatch = true;
    }
    placement
}
