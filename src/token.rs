use crate::{Element, SecondaryBridge};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenKind {
    Locant,
    Multiplier,
    Substituent,
    Parent,
    Suffix,
    Stereo,
    Prefix,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocantValue {
    Numeric(u32),
    /// `N`, `N'`, `O`, ...
    Heteroatom { symbol: char, primes: u8 },
    /// `N1`, `N4`: a heteroatom named by the position it hangs from.
    NumberedHeteroatom { symbol: char, number: u32 },
    /// `1H`, `2H`, ...
    IndicatedHydrogen(u32),
    /// The `1H` of `2(1H)`: hydrogen added at a position next to the cited one.
    AddedHydrogen(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StereoDescriptor {
    R,
    S,
    E,
    Z,
}

impl StereoDescriptor {
    pub fn is_tetrahedral(&self) -> bool {
        matches!(self, StereoDescriptor::R | StereoDescriptor::S)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StereoCitation {
    pub locant: Option<u32>,
    pub descriptor: StereoDescriptor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentPayload {
    Fragment {
        /// Canonical stem or ring name (`prop`, `pyridine`).
        canonical: String,
        fragment_smiles: Option<String>,
        atom_count: usize,
    },
    /// Several stems merged into one parent, e.g. `penta` + `decane`.
    Composite { parts: Vec<String>, atom_count: usize },
}

impl ParentPayload {
    pub fn canonical(&self) -> String {
        match self {
            ParentPayload::Fragment { canonical, .. } => canonical.clone(),
            ParentPayload::Composite { parts, .. } => parts.concat(),
        }
    }

    pub fn fragment_smiles(&self) -> Option<&str> {
        match self {
            ParentPayload::Fragment { fragment_smiles, .. } => fragment_smiles.as_deref(),
            ParentPayload::Composite { .. } => None,
        }
    }

    pub fn atom_count(&self) -> usize {
        match self {
            ParentPayload::Fragment { atom_count, .. } | ParentPayload::Composite { atom_count, .. } => {
                *atom_count
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuffixKind {
    Ene,
    Yne,
    Ol,
    One,
    Al,
    OicAcid,
    Oate,
    Amide,
    Amine,
    Imine,
    Nitrile,
    Thiol,
    SulfonicAcid,
    Sulfonamide,
    Yl,
    Ylidene,
    Oyl,
    /// The connector of `propan-2-yloxy`.
    Oxy,
}

impl SuffixKind {
    pub fn is_unsaturation(&self) -> bool {
        matches!(self, SuffixKind::Ene | SuffixKind::Yne)
    }

    /// Markers shape substituents and ethers; the suffix applicator skips them.
    pub fn is_marker(&self) -> bool {
        matches!(
            self,
            SuffixKind::Yl | SuffixKind::Ylidene | SuffixKind::Oyl | SuffixKind::Oxy
        )
    }

    /// Suffixes whose groups carry a nitrogen that `N` locants can cite.
    pub fn makes_nitrogen(&self) -> bool {
        matches!(
            self,
            SuffixKind::Amide | SuffixKind::Amine | SuffixKind::Imine | SuffixKind::Sulfonamide
        )
    }

    /// Suffixes that consume a chain terminus (or add a carbon on rings).
    pub fn is_acid_family(&self) -> bool {
        matches!(
            self,
            SuffixKind::OicAcid
                | SuffixKind::Oate
                | SuffixKind::Amide
                | SuffixKind::Al
                | SuffixKind::Nitrile
        )
    }
}

/// The acyl parent spelled inside an ester word such as `acetate` or `benzoate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpliedAcyl {
    pub stem: String,
    pub atom_count: usize,
    pub fragment_smiles: Option<String>,
    pub diacid: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixPayload {
    pub kind: SuffixKind,
    /// `carboxylic acid`, `carbaldehyde`, ...: the functional carbon is not in the parent.
    pub adds_carbon: bool,
    pub implied: Option<ImpliedAcyl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefixPayload {
    /// `N`, `N,N`, `N,N'`: one entry per cited nitrogen, holding its prime count.
    NLocant { primes: Vec<u8> },
    /// `N-methyl` glued into one token; split during preprocessing.
    NSubstituted { primes: Vec<u8>, substituent: String },
    /// `N1,N1`: nitrogens cited by the locant they hang from; resolved to
    /// [`PrefixPayload::NLocant`] during preprocessing.
    NumberedN { locants: Vec<u32> },
    Cyclo,
    Hydro,
    Heteroatom(Element),
    VonBaeyer {
        main: [usize; 3],
        secondary: Vec<SecondaryBridge>,
    },
    Spiro { rings: [usize; 2] },
}

/// Per-kind token data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenPayload {
    Locant(Vec<LocantValue>),
    Multiplier { count: usize, group: bool },
    Substituent { canonical: String },
    Parent(ParentPayload),
    Suffix(SuffixPayload),
    Stereo(Vec<StereoCitation>),
    Prefix(PrefixPayload),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// Byte offset into the full name.
    pub position: usize,
    pub length: usize,
    pub payload: TokenPayload,
    pub nested: Option<Vec<Token>>,
    pub in_parens: bool,
}

impl Token {
    pub fn new(text: impl Into<String>, position: usize, payload: TokenPayload) -> Self {
        let text = text.into();
        Self {
            length: text.len(),
            text,
            position,
            payload,
            nested: None,
            in_parens: false,
        }
    }

    pub fn with_nested(mut self, nested: Vec<Token>) -> Self {
        self.nested = Some(nested);
        self
    }

    pub fn parenthesized(mut self) -> Self {
        self.in_parens = true;
        self
    }

    pub fn kind(&self) -> TokenKind {
        match self.payload {
            TokenPayload::Locant(_) => TokenKind::Locant,
            TokenPayload::Multiplier { .. } => TokenKind::Multiplier,
            TokenPayload::Substituent { .. } => TokenKind::Substituent,
            TokenPayload::Parent(_) => TokenKind::Parent,
            TokenPayload::Suffix(_) => TokenKind::Suffix,
            TokenPayload::Stereo(_) => TokenKind::Stereo,
            TokenPayload::Prefix(_) => TokenKind::Prefix,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    pub fn end(&self) -> usize {
        self.position + self.length
    }

    pub fn locant_values(&self) -> &[LocantValue] {
        match &self.payload {
            TokenPayload::Locant(values) => values,
            _ => &[],
        }
    }

    /// Plain numeric positions of a LOCANT token.
    pub fn positions(&self) -> Vec<u32> {
        self.locant_values()
            .iter()
            .filter_map(|v| match v {
                LocantValue::Numeric(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    pub fn indicated_hydrogen(&self) -> Option<u32> {
        self.locant_values().iter().find_map(|v| match v {
            LocantValue::IndicatedHydrogen(n) => Some(*n),
            _ => None,
        })
    }

    pub fn added_hydrogen(&self) -> impl Iterator<Item = u32> + '_ {
        self.locant_values().iter().filter_map(|v| match v {
            LocantValue::AddedHydrogen(n) => Some(*n),
            _ => None,
        })
    }

    pub fn multiplier_count(&self) -> Option<usize> {
        match self.payload {
            TokenPayload::Multiplier { count, .. } => Some(count),
            _ => None,
        }
    }

    /// Canonical substituent name, or the raw text for other kinds.
    pub fn canonical(&self) -> &str {
        match &self.payload {
            TokenPayload::Substituent { canonical } => canonical,
            _ => &self.text,
        }
    }

    pub fn parent(&self) -> Option<&ParentPayload> {
        match &self.payload {
            TokenPayload::Parent(p) => Some(p),
            _ => None,
        }
    }

    pub fn suffix(&self) -> Option<&SuffixPayload> {
        match &self.payload {
            TokenPayload::Suffix(s) => Some(s),
            _ => None,
        }
    }

    pub fn suffix_kind(&self) -> Option<SuffixKind> {
        self.suffix().map(|s| s.kind)
    }

    pub fn prefix(&self) -> Option<&PrefixPayload> {
        match &self.payload {
            TokenPayload::Prefix(p) => Some(p),
            _ => None,
        }
    }

    pub fn stereo(&self) -> &[StereoCitation] {
        match &self.payload {
            TokenPayload::Stereo(citations) => citations,
            _ => &[],
        }
    }

    /// Prime counts of an `N`-locant prefix.
    pub fn n_locant_primes(&self) -> Option<&[u8]> {
        match self.prefix() {
            Some(PrefixPayload::NLocant { primes }) => Some(primes),
            _ => None,
        }
    }

    pub fn is_n_prefix(&self) -> bool {
        self.n_locant_primes().is_some()
    }

    pub fn nested_tokens(&self) -> &[Token] {
        self.nested.as_deref().unwrap_or(&[])
    }
}

/// A read-only view of a token slice split by kind.
///
/// Every token of the slice appears in exactly one partition.
#[derive(Debug, Clone)]
pub struct TokenContext<'a> {
    pub tokens: &'a [Token],
    pub locants: Vec<&'a Token>,
    pub multipliers: Vec<&'a Token>,
    pub substituents: Vec<&'a Token>,
    pub parents: Vec<&'a Token>,
    pub suffixes: Vec<&'a Token>,
    pub stereo: Vec<&'a Token>,
    pub prefixes: Vec<&'a Token>,
}

impl<'a> TokenContext<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        let mut ctx = Self {
            tokens,
            locants: Vec::new(),
            multipliers: Vec::new(),
            substituents: Vec::new(),
            parents: Vec::new(),
            suffixes: Vec::new(),
            stereo: Vec::new(),
            prefixes: Vec::new(),
        };
        for token in tokens {
            match token.kind() {
                TokenKind::Locant => ctx.locants.push(token),
                TokenKind::Multiplier => ctx.multipliers.push(token),
                TokenKind::Substituent => ctx.substituents.push(token),
                TokenKind::Parent => ctx.parents.push(token),
                TokenKind::Suffix => ctx.suffixes.push(token),
                TokenKind::Stereo => ctx.stereo.push(token),
                TokenKind::Prefix => ctx.prefixes.push(token),
            }
        }
        ctx
    }

    pub fn partition(&self, kind: TokenKind) -> &[&'a Token] {
        match kind {
            TokenKind::Locant => &self.locants,
            TokenKind::Multiplier => &self.multipliers,
            TokenKind::Substituent => &self.substituents,
            TokenKind::Parent => &self.parents,
            TokenKind::Suffix => &self.suffixes,
            TokenKind::Stereo => &self.stereo,
            TokenKind::Prefix => &self.prefixes,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Index of `token` within the slice, by identity.
    pub fn index_of(&self, token: &Token) -> Option<usize> {
        self.tokens.iter().position(|t| std::ptr::eq(t, token))
    }

    pub fn has_suffix(&self, kind: SuffixKind) -> bool {
        self.suffixes.iter().any(|s| s.suffix_kind() == Some(kind))
    }

    pub fn last(&self) -> Option<&'a Token> {
        self.tokens.last()
    }

    pub fn has_n_prefix(&self) -> bool {
        self.prefixes.iter().any(|p| p.is_n_prefix())
    }
}
