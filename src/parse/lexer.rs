use nom::{
    branch::alt,
    character::complete::{char, digit1, one_of},
    combinator::{all_consuming, map, map_res, opt},
    multi::{many0, many0_count, separated_list1},
    sequence::{delimited, pair, preceded, separated_pair, terminated, tuple},
    IResult,
};
use tracing::*;

use crate::rules::{rules, Rule, RulesTable};
use crate::*;

const VON_BAEYER_WORDS: &[&str] = &["bicyclo", "tricyclo", "tetracyclo", "pentacyclo"];
const VOWELS: &[u8] = b"aeiouy";

// -----------------------------------------------------------------------
// Basic parsers
// -----------------------------------------------------------------------

fn parse_u32(input: &str) -> IResult<&str, u32> {
    map_res(digit1, |digits: &str| digits.parse::<u32>())(input)
}

fn parse_usize(input: &str) -> IResult<&str, usize> {
    map_res(digit1, |digits: &str| digits.parse::<usize>())(input)
}

fn primes(input: &str) -> IResult<&str, u8> {
    map(many0_count(one_of("'′")), |n| n as u8)(input)
}

fn numeric_locant(input: &str) -> IResult<&str, LocantValue> {
    map(
        tuple((parse_u32, primes, opt(char('H')))),
        |(n, _, h)| match h {
            Some(_) => LocantValue::IndicatedHydrogen(n),
            None => LocantValue::Numeric(n),
        },
    )(input)
}

fn heteroatom_locant(input: &str) -> IResult<&str, LocantValue> {
    map(pair(one_of("NOSP"), primes), |(symbol, primes)| {
        LocantValue::Heteroatom { symbol, primes }
    })(input)
}

fn numbered_heteroatom_locant(input: &str) -> IResult<&str, LocantValue> {
    map(pair(one_of("NOSP"), parse_u32), |(symbol, number)| {
        LocantValue::NumberedHeteroatom { symbol, number }
    })(input)
}

/// The `(1H)` of `2(1H)`.
fn added_hydrogen(input: &str) -> IResult<&str, LocantValue> {
    map(
        delimited(char('('), terminated(parse_u32, char('H')), char(')')),
        LocantValue::AddedHydrogen,
    )(input)
}

/// `2,4`, `1H`, `2(1H)`, `N,N'`, `N1,N4`, `2,N`.
fn locant_list(input: &str) -> IResult<&str, Vec<LocantValue>> {
    map(
        pair(
            separated_list1(
                char(','),
                alt((numeric_locant, numbered_heteroatom_locant, heteroatom_locant)),
            ),
            opt(added_hydrogen),
        ),
        |(mut values, added)| {
            values.extend(added);
            values
        },
    )(input)
}

fn stereo_citation(input: &str) -> IResult<&str, StereoCitation> {
    map(pair(opt(parse_u32), one_of("RSEZ")), |(locant, d)| StereoCitation {
        locant,
        descriptor: match d {
            'R' => StereoDescriptor::R,
            'S' => StereoDescriptor::S,
            'E' => StereoDescriptor::E,
            _ => StereoDescriptor::Z,
        },
    })(input)
}

/// The inside of `(2R,3S)` or `(E)`.
fn stereo_group(input: &str) -> IResult<&str, Vec<StereoCitation>> {
    all_consuming(separated_list1(char(','), stereo_citation))(input)
}

fn anchor_pair(input: &str) -> IResult<&str, (u32, u32)> {
    separated_pair(parse_u32, char(','), parse_u32)(input)
}

/// `^{3,7}`, `^(3,7)`, `^3,7` or `(3,7)`.
fn bridge_anchors(input: &str) -> IResult<&str, (u32, u32)> {
    alt((
        preceded(
            char('^'),
            alt((
                delimited(char('{'), anchor_pair, char('}')),
                delimited(char('('), anchor_pair, char(')')),
                anchor_pair,
            )),
        ),
        delimited(char('('), anchor_pair, char(')')),
    ))(input)
}

fn secondary_bridge(input: &str) -> IResult<&str, SecondaryBridge> {
    map(
        preceded(char('.'), pair(parse_usize, bridge_anchors)),
        |(length, (from, to))| SecondaryBridge { length, from, to },
    )(input)
}

/// `[3.3.1.1^{3,7}]`
fn von_baeyer_bracket(input: &str) -> IResult<&str, ([usize; 3], Vec<SecondaryBridge>)> {
    map(
        delimited(
            char('['),
            tuple((
                parse_usize,
                preceded(char('.'), parse_usize),
                preceded(char('.'), parse_usize),
                many0(secondary_bridge),
            )),
            char(']'),
        ),
        |(a, b, c, secondary)| ([a, b, c], secondary),
    )(input)
}

/// `[4.5]`
fn spiro_bracket(input: &str) -> IResult<&str, [usize; 2]> {
    map(
        delimited(
            char('['),
            separated_pair(parse_usize, char('.'), parse_usize),
            char(']'),
        ),
        |(a, b)| [a, b],
    )(input)
}

// -----------------------------------------------------------------------
// Word scanning
// -----------------------------------------------------------------------

/// One way to read the text at a position: the tokens it produces and how far it reaches.
#[derive(Debug, Clone)]
struct Candidate {
    len: usize,
    priority: u8,
    tokens: Vec<Token>,
}

/// A matched alkane stem, split into its parts for composites (`penta` + `dec`).
#[derive(Debug, Clone)]
struct Stem {
    parts: Vec<(String, usize)>,
}

impl Stem {
    fn len(&self) -> usize {
        self.parts.iter().map(|(s, _)| s.len()).sum()
    }

    fn text(&self) -> String {
        self.parts.iter().map(|(s, _)| s.as_str()).collect()
    }

    fn is_composite(&self) -> bool {
        self.parts.len() > 1
    }
}

fn parent_payload(canonical: &str, atom_count: usize) -> TokenPayload {
    TokenPayload::Parent(ParentPayload::Fragment {
        canonical: canonical.to_string(),
        fragment_smiles: None,
        atom_count,
    })
}

fn substituent_payload(canonical: impl Into<String>) -> TokenPayload {
    TokenPayload::Substituent {
        canonical: canonical.into(),
    }
}

fn suffix_payload(kind: SuffixKind, adds_carbon: bool) -> TokenPayload {
    TokenPayload::Suffix(SuffixPayload {
        kind,
        adds_carbon,
        implied: None,
    })
}

struct Lexer<'a> {
    name: &'a str,
    lower: String,
    rules: &'a RulesTable,
}

impl<'a> Lexer<'a> {
    fn new(name: &'a str, rules: &'a RulesTable) -> Self {
        Self {
            name,
            lower: name.to_ascii_lowercase(),
            rules,
        }
    }

    fn error(&self, position: usize, end: usize) -> FailureReason {
        let text = self.name.get(position..end).unwrap_or_default().to_string();
        warn!("Cannot tokenize '{}' at position {} of '{}'", text, position, self.name);
        FailureReason::Tokenize { position, text }
    }

    /// Alkane stems (simple or composite) that start `text`.
    fn stems(&self, text: &str) -> Vec<Stem> {
        let mut stems = Vec::new();
        for entry in self.rules.entries() {
            match &entry.rule {
                Rule::Alkane(n) if text.starts_with(entry.alias.as_str()) => {
                    stems.push(Stem {
                        parts: vec![(entry.alias.clone(), *n)],
                    });
                }
                Rule::AlkaneUnit(u) if text.starts_with(entry.alias.as_str()) => {
                    let rest = &text[entry.alias.len()..];
                    for tens in self.rules.entries() {
                        if let Rule::AlkaneTens(t) = tens.rule {
                            if rest.starts_with(tens.alias.as_str()) {
                                stems.push(Stem {
                                    parts: vec![(entry.alias.clone(), *u), (tens.alias.clone(), t)],
                                });
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        stems
    }

    /// Builds the tokens for a stem used as a parent, with `ending` appended to the last part.
    fn stem_parents(&self, stem: &Stem, position: usize, ending: &str) -> Vec<Token> {
        let last = stem.parts.len() - 1;
        let mut at = position;
        let mut tokens = Vec::new();
        for (i, (part, count)) in stem.parts.iter().enumerate() {
            let len = part.len() + if i == last { ending.len() } else { 0 };
            tokens.push(Token::new(&self.name[at..at + len], at, parent_payload(part, *count)));
            at += len;
        }
        tokens
    }

    fn stem_candidates(&self, position: usize, end: usize) -> Vec<Candidate> {
        let rest = &self.lower[position..end];
        let mut found = Vec::new();
        for stem in self.stems(rest) {
            let len = stem.len();
            let after = &rest[len..];
            let priority = if stem.is_composite() { 5 } else { 6 };
            let stem_text = stem.text();
            let mut single = |len: usize, payload: TokenPayload| {
                found.push(Candidate {
                    len,
                    priority,
                    tokens: vec![Token::new(&self.name[position..position + len], position, payload)],
                });
            };

            if after.starts_with("ylidene") {
                single(len + 7, substituent_payload(format!("{stem_text}ylidene")));
            }
            if after.starts_with("yl") {
                single(len + 2, substituent_payload(format!("{stem_text}yl")));
            }
            if after.starts_with("oxy") {
                single(len + 3, substituent_payload(format!("{stem_text}oxy")));
            }
            if after.starts_with("anoyl") {
                single(len + 5, substituent_payload(format!("{stem_text}anoyl")));
            }

            let ending = if let Some(tail) = after.strip_prefix("ane") {
                // Keep the `e` of `-ane` only before a consonant, a separator or the end.
                match tail.as_bytes().first() {
                    Some(c) if VOWELS.contains(c) => Some("an"),
                    _ => Some("ane"),
                }
            } else if after.starts_with("an") {
                Some("an")
            } else if after.starts_with("a-") {
                Some("a")
            } else if after.is_empty()
                || after.starts_with('-')
                || after.starts_with("en")
                || after.starts_with("yn")
            {
                Some("")
            } else {
                None
            };
            if let Some(ending) = ending {
                found.push(Candidate {
                    len: len + ending.len(),
                    priority,
                    tokens: self.stem_parents(&stem, position, ending),
                });
            }
        }
        found
    }

    fn bracket_prefix_candidates(&self, position: usize, end: usize) -> Vec<Candidate> {
        let rest = &self.lower[position..end];
        let mut found = Vec::new();
        for word in VON_BAEYER_WORDS {
            if let Some(bracket) = rest.strip_prefix(word) {
                let original = &self.name[position + word.len()..end];
                if let Ok((leftover, (main, secondary))) = von_baeyer_bracket(original) {
                    let len = word.len() + bracket.len() - leftover.len();
                    found.push(Candidate {
                        len,
                        priority: 9,
                        tokens: vec![Token::new(
                            &self.name[position..position + len],
                            position,
                            TokenPayload::Prefix(PrefixPayload::VonBaeyer { main, secondary }),
                        )],
                    });
                }
            }
        }
        if let Some(bracket) = rest.strip_prefix("spiro") {
            let original = &self.name[position + 5..end];
            if let Ok((leftover, rings)) = spiro_bracket(original) {
                let len = 5 + bracket.len() - leftover.len();
                found.push(Candidate {
                    len,
                    priority: 9,
                    tokens: vec![Token::new(
                        &self.name[position..position + len],
                        position,
                        TokenPayload::Prefix(PrefixPayload::Spiro { rings }),
                    )],
                });
            }
        }
        found
    }

    /// True if a heteroatom replacement prefix may stand before `after`.
    fn heteroatom_prefix_allowed(&self, after: &str) -> bool {
        !self.stems(after).is_empty()
            || after.starts_with("cyclo")
            || after.starts_with("spiro")
            || VON_BAEYER_WORDS.iter().any(|w| after.starts_with(w))
            || self.rules.prefix_matches(after).any(|e| match &e.rule {
                Rule::Heteroatom { .. } => true,
                Rule::Multiplier(_) => {
                    let tail = &after[e.alias.len()..];
                    self.rules
                        .prefix_matches(tail)
                        .any(|h| matches!(h.rule, Rule::Heteroatom { .. }))
                }
                _ => false,
            })
    }

    fn candidates(&self, position: usize, end: usize, previous: Option<&Token>) -> Vec<Candidate> {
        let rest = &self.lower[position..end];
        let mut found = self.bracket_prefix_candidates(position, end);
        found.extend(self.stem_candidates(position, end));

        let single = |len: usize, priority: u8, payload: TokenPayload| Candidate {
            len,
            priority,
            tokens: vec![Token::new(&self.name[position..position + len], position, payload)],
        };

        if let Some(after) = rest.strip_prefix("cyclo") {
            for stem in self.stems(after) {
                if after[stem.len()..].starts_with("yl") && !after[stem.len()..].starts_with("ylidene") {
                    let len = 5 + stem.len() + 2;
                    found.push(single(len, 7, substituent_payload(format!("cyclo{}yl", stem.text()))));
                }
            }
            found.push(single(5, 4, TokenPayload::Prefix(PrefixPayload::Cyclo)));
        }
        if rest.starts_with("hydro") {
            found.push(single(5, 4, TokenPayload::Prefix(PrefixPayload::Hydro)));
        }

        let after_yl = previous.and_then(|t| t.suffix_kind()) == Some(SuffixKind::Yl);
        for entry in self.rules.prefix_matches(rest) {
            let len = entry.alias.len();
            let candidate = match &entry.rule {
                Rule::Multiplier(count) => single(len, 2, TokenPayload::Multiplier { count: *count, group: false }),
                Rule::GroupMultiplier(count) => {
                    single(len, 2, TokenPayload::Multiplier { count: *count, group: true })
                }
                Rule::Heteroatom { element, .. } => {
                    if !self.heteroatom_prefix_allowed(&rest[len..]) {
                        continue;
                    }
                    single(len, 3, TokenPayload::Prefix(PrefixPayload::Heteroatom(*element)))
                }
                Rule::Substituent { canonical, .. } if canonical == "oxy" && after_yl => {
                    single(len, 8, suffix_payload(SuffixKind::Oxy, false))
                }
                Rule::Substituent { canonical, .. } => single(len, 7, substituent_payload(canonical.clone())),
                Rule::Suffix { kind, adds_carbon } => single(len, 4, suffix_payload(*kind, *adds_carbon)),
                Rule::Ring(ring) => single(
                    len,
                    6,
                    TokenPayload::Parent(ParentPayload::Fragment {
                        canonical: ring.canonical.clone(),
                        fragment_smiles: ring.smiles.clone(),
                        atom_count: ring.atom_count,
                    }),
                ),
                Rule::ImpliedAcyl(acyl) => single(
                    len,
                    8,
                    TokenPayload::Suffix(SuffixPayload {
                        kind: acyl.kind,
                        adds_carbon: acyl.smiles.is_some(),
                        implied: Some(ImpliedAcyl {
                            stem: acyl.stem.clone(),
                            atom_count: acyl.atom_count,
                            fragment_smiles: acyl.smiles.clone(),
                            diacid: acyl.diacid,
                        }),
                    }),
                ),
                Rule::Alkane(_) | Rule::AlkaneUnit(_) | Rule::AlkaneTens(_) => continue,
            };
            found.push(candidate);
        }

        found.sort_by(|a, b| (b.len, b.priority).cmp(&(a.len, a.priority)));
        found
    }

    /// True if something can be read at `position`.
    fn can_continue(&self, position: usize, end: usize, previous: Option<&Token>) -> bool {
        match self.lower[position..end].chars().next() {
            Some(c) if c.is_ascii_alphabetic() => !self.candidates(position, end, previous).is_empty(),
            _ => true,
        }
    }

    /// The longest reading at `position` that leaves readable text behind it.
    fn word(&self, position: usize, end: usize, previous: Option<&Token>) -> Option<Candidate> {
        self.candidates(position, end, previous).into_iter().find(|c| {
            let next = position + c.len;
            let last = c.tokens.last();
            self.can_continue(next, end, last)
        })
    }

    fn matching_close(&self, open: usize, end: usize) -> Option<usize> {
        let bytes = self.name.as_bytes();
        let mut stack = Vec::new();
        for i in open..end {
            match bytes[i] {
                b'(' => stack.push(b')'),
                b'[' => stack.push(b']'),
                b'{' => stack.push(b'}'),
                close @ (b')' | b']' | b'}') => {
                    if stack.pop() != Some(close) {
                        return None;
                    }
                    if stack.is_empty() {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn group(&self, position: usize, end: usize) -> Result<(Token, usize), FailureReason> {
        let close = self
            .matching_close(position, end)
            .ok_or_else(|| self.error(position, end))?;
        let inner = &self.name[position + 1..close];
        let text = &self.name[position..=close];
        if let Ok((_, citations)) = stereo_group(inner) {
            trace!("Stereo group '{}'", text);
            return Ok((Token::new(text, position, TokenPayload::Stereo(citations)), close + 1));
        }
        let nested = self.lex_span(position + 1, close)?;
        let token = Token::new(text, position, substituent_payload(inner.to_ascii_lowercase()))
            .with_nested(nested)
            .parenthesized();
        Ok((token, close + 1))
    }

    /// `N,N-`, `N'-`, or `N-methyl` glued together.
    fn heteroatom_locants(&self, position: usize, end: usize) -> Option<(Token, usize)> {
        let (leftover, values) = locant_list(&self.name[position..end]).ok()?;
        if !leftover.starts_with('-') {
            return None;
        }
        let consumed = end - position - leftover.len();
        let text = &self.name[position..position + consumed];
        let numbered: Option<Vec<u32>> = values
            .iter()
            .map(|v| match v {
                LocantValue::NumberedHeteroatom { symbol: 'N', number } => Some(*number),
                _ => None,
            })
            .collect();
        if let Some(locants) = numbered {
            let payload = TokenPayload::Prefix(PrefixPayload::NumberedN { locants });
            return Some((Token::new(text, position, payload), position + consumed));
        }
        let n_primes: Option<Vec<u8>> = values
            .iter()
            .map(|v| match v {
                LocantValue::Heteroatom { symbol: 'N', primes } => Some(*primes),
                _ => None,
            })
            .collect();
        let Some(n_primes) = n_primes else {
            return Some((Token::new(text, position, TokenPayload::Locant(values)), position + consumed));
        };

        let word_start = position + consumed + 1;
        if n_primes.len() == 1 {
            if let Some(word) = self.word(word_start, end, None) {
                if let [Token {
                    payload: TokenPayload::Substituent { canonical },
                    ..
                }] = word.tokens.as_slice()
                {
                    let word_end = word_start + word.len;
                    let token = Token::new(
                        &self.name[position..word_end],
                        position,
                        TokenPayload::Prefix(PrefixPayload::NSubstituted {
                            primes: n_primes,
                            substituent: canonical.clone(),
                        }),
                    );
                    return Some((token, word_end));
                }
            }
        }
        let token = Token::new(
            text,
            position,
            TokenPayload::Prefix(PrefixPayload::NLocant { primes: n_primes }),
        );
        Some((token, position + consumed))
    }

    fn lex_span(&self, start: usize, end: usize) -> Result<Vec<Token>, FailureReason> {
        let mut tokens: Vec<Token> = Vec::new();
        let mut position = start;
        while position < end {
            let Some(c) = self.name[position..end].chars().next() else {
                break;
            };
            if c.is_whitespace() || c == '-' || c == ',' {
                position += c.len_utf8();
                continue;
            }
            if matches!(c, '(' | '[' | '{') {
                let (token, next) = self.group(position, end)?;
                tokens.push(token);
                position = next;
                continue;
            }
            if c.is_ascii_digit() {
                let (leftover, values) =
                    locant_list(&self.name[position..end]).map_err(|_| self.error(position, end))?;
                let consumed = end - position - leftover.len();
                tokens.push(Token::new(
                    &self.name[position..position + consumed],
                    position,
                    TokenPayload::Locant(values),
                ));
                position += consumed;
                continue;
            }
            if matches!(c, 'N' | 'O' | 'S' | 'P') {
                if let Some((token, next)) = self.heteroatom_locants(position, end) {
                    tokens.push(token);
                    position = next;
                    continue;
                }
            }
            if c.is_ascii_alphabetic() {
                let word = self
                    .word(position, end, tokens.last())
                    .ok_or_else(|| self.error(position, end))?;
                position += word.len;
                tokens.extend(word.tokens);
                continue;
            }
            return Err(self.error(position, end));
        }
        Ok(tokens)
    }
}

/// Splits a systematic name into typed tokens.
pub fn tokenize(name: &str) -> Result<Vec<Token>, FailureReason> {
    let tokens = Lexer::new(name, rules()).lex_span(0, name.len())?;
    debug!("Tokenized '{}' into {} tokens", name, tokens.len());
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind()).collect()
    }

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_simple_alcohol() {
        let tokens = tokenize("2-methylpropan-2-ol").unwrap();
        assert_eq!(texts(&tokens), vec!["2", "methyl", "propan", "2", "ol"]);
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Locant,
                TokenKind::Substituent,
                TokenKind::Parent,
                TokenKind::Locant,
                TokenKind::Suffix
            ]
        );
        assert_eq!(tokens[2].position, 8);
        assert_eq!(tokens[2].parent().map(|p| p.atom_count()), Some(3));
    }

    #[test]
    fn test_ane_keeps_e_before_consonant() {
        let tokens = tokenize("propane-1,2-diol").unwrap();
        assert_eq!(texts(&tokens), vec!["propane", "1,2", "di", "ol"]);
        let tokens = tokenize("butanoic acid").unwrap();
        assert_eq!(texts(&tokens), vec!["butan", "oic acid"]);
        let tokens = tokenize("dimethyl butanedioate").unwrap();
        assert_eq!(texts(&tokens), vec!["di", "methyl", "butane", "di", "oate"]);
    }

    #[test]
    fn test_composite_stem_yields_two_parents() {
        let tokens = tokenize("pentadecane").unwrap();
        assert_eq!(texts(&tokens), vec!["penta", "decane"]);
        assert_eq!(tokens[1].position, 5);
        assert_eq!(kinds(&tokens), vec![TokenKind::Parent, TokenKind::Parent]);
    }

    #[test]
    fn test_elided_parent_and_unsaturation() {
        let tokens = tokenize("buta-1,3-diene").unwrap();
        assert_eq!(texts(&tokens), vec!["buta", "1,3", "di", "ene"]);
        assert_eq!(tokens[0].kind(), TokenKind::Parent);
        let tokens = tokenize("hexa-1,3-diene").unwrap();
        assert_eq!(tokens[0].kind(), TokenKind::Parent);
    }

    #[test]
    fn test_n_locants() {
        let tokens = tokenize("N,N'-dimethylethane-1,2-diamine").unwrap();
        assert_eq!(tokens[0].n_locant_primes(), Some(&[0u8, 1][..]));
        let tokens = tokenize("N-methylacetamide").unwrap();
        assert_eq!(
            tokens[0].prefix(),
            Some(&PrefixPayload::NSubstituted {
                primes: vec![0],
                substituent: "methyl".to_string()
            })
        );
        let implied = tokens[1].suffix().and_then(|s| s.implied.clone()).unwrap();
        assert_eq!(implied.stem, "acet");
    }

    #[test]
    fn test_numbered_n_locants() {
        let tokens = tokenize("N1,N1-dimethylethane-1,2-diamine").unwrap();
        assert_eq!(
            tokens[0].prefix(),
            Some(&PrefixPayload::NumberedN { locants: vec![1, 1] })
        );
        assert_eq!(texts(&tokens)[..3], ["N1,N1", "di", "methyl"]);
    }

    #[test]
    fn test_added_hydrogen_stays_on_the_locant() {
        let tokens = tokenize("pyridin-2(1H)-one").unwrap();
        assert_eq!(texts(&tokens), vec!["pyridin", "2(1H)", "one"]);
        assert_eq!(tokens[1].positions(), vec![2]);
        assert_eq!(tokens[1].added_hydrogen().collect::<Vec<_>>(), vec![1]);
        assert_eq!(tokens[1].indicated_hydrogen(), None);
    }

    #[test]
    fn test_stereo_and_nested_groups() {
        let tokens = tokenize("(2R)-butan-2-ol").unwrap();
        assert_eq!(
            tokens[0].stereo(),
            &[StereoCitation {
                locant: Some(2),
                descriptor: StereoDescriptor::R
            }]
        );
        let tokens = tokenize("2-(4-chlorophenyl)propan-2-ol").unwrap();
        assert!(tokens[1].in_parens);
        assert_eq!(texts(tokens[1].nested_tokens()), vec!["4", "chloro", "phenyl"]);
    }

    #[test]
    fn test_mixed_brackets_nest() {
        let tokens = tokenize("2-{[(tert-butyldimethylsilyl)oxy]methyl}pyridine").unwrap();
        let outer = tokens[1].nested_tokens();
        assert_eq!(texts(outer)[1], "methyl");
        let middle = outer[0].nested_tokens();
        assert_eq!(middle[1].canonical(), "oxy");
        let inner = middle[0].nested_tokens();
        assert_eq!(texts(inner), vec!["tert-butyl", "di", "methyl", "silyl"]);
        assert!(tokenize("2-(methyl]propane").is_err());
    }

    #[test]
    fn test_von_baeyer_and_spiro_prefixes() {
        let tokens = tokenize("7-oxabicyclo[2.2.1]heptane").unwrap();
        assert_eq!(tokens[1].prefix(), Some(&PrefixPayload::Heteroatom(Element::O)));
        assert_eq!(
            tokens[2].prefix(),
            Some(&PrefixPayload::VonBaeyer {
                main: [2, 2, 1],
                secondary: vec![]
            })
        );
        let tokens = tokenize("tricyclo[3.3.1.1^{3,7}]decane").unwrap();
        assert_eq!(
            tokens[0].prefix(),
            Some(&PrefixPayload::VonBaeyer {
                main: [3, 3, 1],
                secondary: vec![SecondaryBridge {
                    length: 1,
                    from: 3,
                    to: 7
                }]
            })
        );
        let tokens = tokenize("spiro[4.5]decane").unwrap();
        assert_eq!(tokens[0].prefix(), Some(&PrefixPayload::Spiro { rings: [4, 5] }));
    }

    #[test]
    fn test_ether_connector_after_yl() {
        let tokens = tokenize("propan-2-yloxybenzene").unwrap();
        assert_eq!(tokens[3].suffix_kind(), Some(SuffixKind::Oxy));
        let tokens = tokenize("ethoxyethane").unwrap();
        assert_eq!(tokens[0].canonical(), "ethoxy");
    }

    #[test]
    fn test_hydro_and_indicated_hydrogen() {
        let tokens = tokenize("2,3-dihydro-1H-indene").unwrap();
        assert_eq!(tokens[2].prefix(), Some(&PrefixPayload::Hydro));
        assert_eq!(tokens[3].indicated_hydrogen(), Some(1));
        assert_eq!(tokens[4].parent().map(|p| p.canonical()), Some("indene".to_string()));
    }

    #[test]
    fn test_multiplier_before_ring() {
        let tokens = tokenize("1,4-dioxane").unwrap();
        assert_eq!(texts(&tokens), vec!["1,4", "di", "oxane"]);
    }

    #[test]
    fn test_unknown_text_fails() {
        assert_eq!(
            tokenize("2-methylqqq"),
            Err(FailureReason::Tokenize {
                position: 2,
                text: "methylqqq".to_string()
            })
        );
    }
}
