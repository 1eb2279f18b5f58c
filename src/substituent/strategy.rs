use tracing::*;

use crate::rules::RulesTable;
use crate::*;

/// Shapes of compound substituents, each with a builder.
///
/// Several patterns are narrower forms of later ones (a silyl-oxy-alkyl is also
/// a branched alkyl), so they are tried strictly by descending priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    SilylOxyAlkyl,
    AlkoxyCarbonyl,
    AcylAmino,
    SulfonylCompound,
    SilylCompound,
    SilylOxy,
    Phenoxy,
    AlkylOxyMethoxy,
    MultiLevelAlkoxy,
    Acyl,
    SpiroSubstituent,
    RingYl,
    ChainYl,
    SubstitutedPhenyl,
    AminoCompound,
    BranchedAlkyl,
    SimpleGroup,
    GenericSubstitutedBase,
}

const SULFUR_LINKERS: &[&str] = &["sulfonyl", "sulfinyl", "sulfanyl", "thio"];

fn last_substituent<'a>(ctx: &TokenContext<'a>) -> Option<&'a Token> {
    ctx.last().filter(|t| t.is(TokenKind::Substituent))
}

fn last_is(ctx: &TokenContext, canonical: &str) -> bool {
    last_substituent(ctx).map(|t| t.canonical() == canonical).unwrap_or(false)
}

/// The tokens before the last one.
fn head<'a>(ctx: &TokenContext<'a>) -> &'a [Token] {
    &ctx.tokens[..ctx.tokens.len().saturating_sub(1)]
}

fn has_head_substituent(ctx: &TokenContext) -> bool {
    head(ctx).iter().any(|t| t.is(TokenKind::Substituent))
}

fn mentions_silyl(token: &Token) -> bool {
    token.canonical().ends_with("silyl") || token.nested_tokens().iter().any(mentions_silyl)
}

fn is_alkoxy(rules: &RulesTable, token: &Token) -> bool {
    token.nested.is_none() && rules.alkoxy_length(token.canonical()).is_some()
}

fn is_oxy_like(rules: &RulesTable, token: &Token) -> bool {
    let canonical = token.canonical();
    is_alkoxy(rules, token)
        || matches!(canonical, "phenoxy" | "benzyloxy" | "isopropoxy" | "tert-butoxy")
        || token.nested_tokens().last().map(|t| t.canonical() == "oxy").unwrap_or(false)
}

fn is_acyl(rules: &RulesTable, token: &Token) -> bool {
    let canonical = token.canonical();
    rules.acyl_length(canonical).is_some()
        || matches!(canonical, "acetyl" | "formyl" | "benzoyl")
        || token
            .nested_tokens()
            .last()
            .map(|t| t.canonical() == "carbonyl" || t.suffix_kind() == Some(SuffixKind::Oyl))
            .unwrap_or(false)
}

fn is_alkyl_like(rules: &RulesTable, token: &Token) -> bool {
    let canonical = token.canonical();
    token.nested.is_none()
        && (is_alkyl(rules, canonical)
            || (canonical.starts_with("cyclo") && canonical.ends_with("yl"))
            || matches!(canonical, "isopropyl" | "tert-butyl" | "sec-butyl" | "isobutyl" | "benzyl"))
}

/// True if [`build_framework`] knows the name.
fn is_simple_name(rules: &RulesTable, canonical: &str) -> bool {
    rules.substituent_smiles(canonical).is_some()
        || rules.alkyl_length(canonical).is_some()
        || rules.alkoxy_length(canonical).is_some()
        || rules.acyl_length(canonical).is_some()
        || canonical
            .strip_suffix("ylidene")
            .and_then(|s| rules.stem_length(s))
            .is_some()
        || canonical
            .strip_prefix("cyclo")
            .and_then(|s| s.strip_suffix("yl"))
            .and_then(|s| rules.stem_length(s))
            .is_some()
}

fn yl_suffix_index(ctx: &TokenContext) -> Option<usize> {
    ctx.tokens
        .iter()
        .position(|t| matches!(t.suffix_kind(), Some(SuffixKind::Yl) | Some(SuffixKind::Ylidene)))
}

/// The fragment for one token: nested groups recurse, plain names use the simple builder.
fn token_framework(
    builder: &mut MoleculeBuilder,
    session: &mut Session,
    token: &Token,
    depth: usize,
) -> Result<Option<Framework>, FailureReason> {
    if token.nested.is_some() {
        return Ok(build_nested(builder, session, token, depth + 1)?.map(|fragment| Framework {
            skeleton: fragment.atoms.clone(),
            fragment,
        }));
    }
    Ok(build_framework(builder, session.rules, token.canonical()))
}

/// A slice of tokens read as one fragment.
fn slice_fragment(
    builder: &mut MoleculeBuilder,
    session: &mut Session,
    tokens: &[Token],
    depth: usize,
) -> Result<Option<Fragment>, FailureReason> {
    match tokens {
        [] => Ok(None),
        [single] if single.is(TokenKind::Substituent) => {
            Ok(token_framework(builder, session, single, depth)?.map(|f| f.fragment))
        }
        _ => build_tokens(builder, session, tokens, depth),
    }
}

/// Builds the last token as the base and hangs every earlier substituent on its skeleton.
fn decorated_base(
    builder: &mut MoleculeBuilder,
    session: &mut Session,
    ctx: &TokenContext,
    depth: usize,
) -> Result<Option<Fragment>, FailureReason> {
    let Some(base) = last_substituent(ctx) else {
        return Ok(None);
    };
    let Some(framework) = token_framework(builder, session, base, depth)? else {
        return Ok(None);
    };
    decorate(builder, session, head(ctx), &framework.skeleton, depth)?;
    Ok(Some(framework.fragment))
}

/// Builds a `<parent>-<locant>-yl` group, attached at the cited locant.
fn parent_yl(
    builder: &mut MoleculeBuilder,
    session: &mut Session,
    ctx: &TokenContext,
    depth: usize,
) -> Result<Option<Fragment>, FailureReason> {
    let Some(yl) = yl_suffix_index(ctx) else {
        return Ok(None);
    };
    let Some(parent) = build_parent(builder, session, ctx) else {
        return Ok(None);
    };
    apply_unsaturation(builder, session, ctx.tokens, &parent.atoms);
    let target = placement_for(ctx.tokens, yl).targets().first().copied().unwrap_or(1);
    let Some(attachment) = locant_to_atom_index(target, &parent.atoms) else {
        session.warn(BuildWarning::LocantOutOfRange {
            token: ctx.tokens[yl].text.clone(),
            locant: target,
            length: parent.atoms.len(),
        });
        return Ok(None);
    };
    decorate(builder, session, ctx.tokens, &parent.atoms, depth)?;
    apply_hydro(builder, ctx.tokens, &parent.atoms);
    Ok(Some(Fragment::new(parent.atoms, attachment)))
}

/// `R-oxy`: a new oxygen carrying whatever the earlier tokens build.
fn oxy_linked(
    builder: &mut MoleculeBuilder,
    session: &mut Session,
    ctx: &TokenContext,
    depth: usize,
) -> Result<Option<Fragment>, FailureReason> {
    let Some(rest) = slice_fragment(builder, session, head(ctx), depth)? else {
        return Ok(None);
    };
    let oxygen = builder.add_atom(Element::O);
    builder.add_bond(oxygen, rest.attachment_point, BondOrder::Single);
    let mut atoms = vec![oxygen];
    atoms.extend(rest.atoms);
    Ok(Some(Fragment::new(atoms, oxygen)))
}

/// A central atom (Si, N) carrying every earlier substituent.
fn centered(
    builder: &mut MoleculeBuilder,
    session: &mut Session,
    ctx: &TokenContext,
    element: Element,
    depth: usize,
) -> Result<Option<Fragment>, FailureReason> {
    let center = builder.add_atom(element);
    decorate(builder, session, head(ctx), &[center], depth)?;
    Ok(Some(Fragment::new(vec![center], center)))
}

impl Pattern {
    pub const ALL: [Pattern; 18] = [
        Pattern::SilylOxyAlkyl,
        Pattern::AlkoxyCarbonyl,
        Pattern::AcylAmino,
        Pattern::SulfonylCompound,
        Pattern::SilylCompound,
        Pattern::SilylOxy,
        Pattern::Phenoxy,
        Pattern::AlkylOxyMethoxy,
        Pattern::MultiLevelAlkoxy,
        Pattern::Acyl,
        Pattern::SpiroSubstituent,
        Pattern::RingYl,
        Pattern::ChainYl,
        Pattern::SubstitutedPhenyl,
        Pattern::AminoCompound,
        Pattern::BranchedAlkyl,
        Pattern::SimpleGroup,
        Pattern::GenericSubstitutedBase,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Pattern::SilylOxyAlkyl => "silyl-oxy-alkyl",
            Pattern::AlkoxyCarbonyl => "alkoxy-carbonyl",
            Pattern::AcylAmino => "acyl-amino",
            Pattern::SulfonylCompound => "sulfonyl-compound",
            Pattern::SilylCompound => "silyl-compound",
            Pattern::SilylOxy => "silyl-oxy",
            Pattern::Phenoxy => "phenoxy",
            Pattern::AlkylOxyMethoxy => "alkyl-oxy-methoxy",
            Pattern::MultiLevelAlkoxy => "multi-level-alkoxy",
            Pattern::Acyl => "acyl",
            Pattern::SpiroSubstituent => "spiro-substituent",
            Pattern::RingYl => "ring-yl",
            Pattern::ChainYl => "chain-yl",
            Pattern::SubstitutedPhenyl => "substituted-phenyl",
            Pattern::AminoCompound => "amino-compound",
            Pattern::BranchedAlkyl => "branched-alkyl",
            Pattern::SimpleGroup => "simple-group",
            Pattern::GenericSubstitutedBase => "generic-substituted-base",
        }
    }

    pub fn priority(&self) -> u32 {
        match self {
            Pattern::SilylOxyAlkyl => 100,
            Pattern::AlkoxyCarbonyl => 95,
            Pattern::AcylAmino => 90,
            Pattern::SulfonylCompound => 85,
            Pattern::SilylCompound => 80,
            Pattern::SilylOxy => 78,
            Pattern::Phenoxy => 70,
            Pattern::AlkylOxyMethoxy => 66,
            Pattern::MultiLevelAlkoxy => 65,
            Pattern::Acyl => 60,
            Pattern::SpiroSubstituent => 55,
            Pattern::RingYl => 50,
            Pattern::ChainYl => 45,
            Pattern::SubstitutedPhenyl => 40,
            Pattern::AminoCompound => 35,
            Pattern::BranchedAlkyl => 30,
            Pattern::SimpleGroup => 10,
            Pattern::GenericSubstitutedBase => 5,
        }
    }

    pub fn matches(&self, ctx: &TokenContext, rules: &RulesTable) -> bool {
        let Some(last) = ctx.last() else {
            return false;
        };
        let last_sub = last_substituent(ctx);
        match self {
            Pattern::SilylOxyAlkyl => {
                last_sub.map(|t| is_alkyl_like(rules, t)).unwrap_or(false)
                    && head(ctx).iter().any(|t| {
                        t.nested_tokens().last().map(|l| l.canonical() == "oxy").unwrap_or(false)
                            && mentions_silyl(t)
                    })
            }
            Pattern::AlkoxyCarbonyl => {
                last_is(ctx, "carbonyl")
                    && head(ctx)
                        .iter()
                        .rev()
                        .find(|t| t.is(TokenKind::Substituent))
                        .map(|t| is_oxy_like(rules, t))
                        .unwrap_or(false)
            }
            Pattern::AcylAmino => {
                last_is(ctx, "amino")
                    && head(ctx)
                        .iter()
                        .rev()
                        .find(|t| t.is(TokenKind::Substituent))
                        .map(|t| is_acyl(rules, t))
                        .unwrap_or(false)
            }
            Pattern::SulfonylCompound => {
                last_sub.map(|t| SULFUR_LINKERS.contains(&t.canonical())).unwrap_or(false)
                    && has_head_substituent(ctx)
            }
            Pattern::SilylCompound => last_is(ctx, "silyl") && has_head_substituent(ctx),
            Pattern::SilylOxy => last_is(ctx, "oxy") && head(ctx).iter().any(mentions_silyl),
            Pattern::Phenoxy => last_is(ctx, "phenoxy") && has_head_substituent(ctx),
            Pattern::AlkylOxyMethoxy => {
                let tokens = ctx.tokens;
                tokens.len() >= 3
                    && last_sub.map(|t| is_alkoxy(rules, t)).unwrap_or(false)
                    && tokens[tokens.len() - 2].canonical() == "oxy"
            }
            Pattern::MultiLevelAlkoxy => {
                last_sub.map(|t| is_alkoxy(rules, t)).unwrap_or(false) && has_head_substituent(ctx)
            }
            Pattern::Acyl => {
                (last_sub.map(|t| is_acyl(rules, t)).unwrap_or(false) && has_head_substituent(ctx))
                    || (ctx.has_suffix(SuffixKind::Oyl) && !ctx.parents.is_empty())
            }
            Pattern::SpiroSubstituent => {
                yl_suffix_index(ctx).is_some()
                    && ctx
                        .prefixes
                        .iter()
                        .any(|p| matches!(p.prefix(), Some(PrefixPayload::Spiro { .. })))
            }
            Pattern::RingYl => yl_suffix_index(ctx).is_some() && names_ring(ctx),
            Pattern::ChainYl => yl_suffix_index(ctx).is_some() && !ctx.parents.is_empty(),
            Pattern::SubstitutedPhenyl => last_is(ctx, "phenyl") && has_head_substituent(ctx),
            Pattern::AminoCompound => last_is(ctx, "amino") && has_head_substituent(ctx),
            Pattern::BranchedAlkyl => last_sub.map(|t| is_alkyl_like(rules, t)).unwrap_or(false),
            Pattern::SimpleGroup => {
                ctx.len() == 1
                    && last.is(TokenKind::Substituent)
                    && (last.nested.is_some() || is_simple_name(rules, last.canonical()))
            }
            Pattern::GenericSubstitutedBase => last_sub.is_some(),
        }
    }

    pub fn build(
        &self,
        builder: &mut MoleculeBuilder,
        session: &mut Session,
        ctx: &TokenContext,
        depth: usize,
    ) -> Result<Option<Fragment>, FailureReason> {
        match self {
            Pattern::SilylOxyAlkyl
            | Pattern::MultiLevelAlkoxy
            | Pattern::Phenoxy
            | Pattern::SubstitutedPhenyl
            | Pattern::BranchedAlkyl
            | Pattern::GenericSubstitutedBase => decorated_base(builder, session, ctx, depth),
            Pattern::AlkoxyCarbonyl => {
                let Some(alkoxy) = slice_fragment(builder, session, head(ctx), depth)? else {
                    return Ok(None);
                };
                let carbon = builder.add_carbon();
                let Some(oxygen) = builder.add_carbonyl(carbon, Element::O) else {
                    return Ok(None);
                };
                builder.add_bond(carbon, alkoxy.attachment_point, BondOrder::Single);
                let mut atoms = vec![carbon, oxygen];
                atoms.extend(alkoxy.atoms);
                Ok(Some(Fragment::new(atoms, carbon)))
            }
            Pattern::AcylAmino => {
                let Some(acyl) = slice_fragment(builder, session, head(ctx), depth)? else {
                    return Ok(None);
                };
                let nitrogen = builder.add_atom(Element::N);
                builder.add_bond(nitrogen, acyl.attachment_point, BondOrder::Single);
                let mut atoms = vec![nitrogen];
                atoms.extend(acyl.atoms);
                Ok(Some(Fragment::new(atoms, nitrogen)))
            }
            Pattern::SulfonylCompound => {
                let Some(linker) = last_substituent(ctx) else {
                    return Ok(None);
                };
                let Some(sulfur) = build_simple(builder, session.rules, linker.canonical()) else {
                    return Ok(None);
                };
                let Some(rest) = slice_fragment(builder, session, head(ctx), depth)? else {
                    return Ok(None);
                };
                builder.add_bond(sulfur.attachment_point, rest.attachment_point, BondOrder::Single);
                let mut atoms = sulfur.atoms;
                atoms.extend(rest.atoms);
                Ok(Some(Fragment::new(atoms, sulfur.attachment_point)))
            }
            Pattern::SilylCompound => centered(builder, session, ctx, Element::Si, depth),
            Pattern::AminoCompound => centered(builder, session, ctx, Element::N, depth),
            Pattern::SilylOxy => oxy_linked(builder, session, ctx, depth),
            Pattern::AlkylOxyMethoxy => {
                let tokens = ctx.tokens;
                let Some(base) = last_substituent(ctx) else {
                    return Ok(None);
                };
                let Some(alkoxy) = token_framework(builder, session, base, depth)? else {
                    return Ok(None);
                };
                let Some(rest) = slice_fragment(builder, session, &tokens[..tokens.len() - 2], depth)? else {
                    return Ok(None);
                };
                let Some(bridge) = builder.attach_atom(alkoxy.skeleton[0], Element::O, BondOrder::Single) else {
                    return Ok(None);
                };
                builder.add_bond(bridge, rest.attachment_point, BondOrder::Single);
                let mut atoms = alkoxy.fragment.atoms;
                atoms.push(bridge);
                atoms.extend(rest.atoms);
                Ok(Some(Fragment::new(atoms, alkoxy.fragment.attachment_point)))
            }
            Pattern::Acyl => {
                if last_substituent(ctx).is_some() {
                    return decorated_base(builder, session, ctx, depth);
                }
                let Some(parent) = build_parent(builder, session, ctx) else {
                    return Ok(None);
                };
                apply_unsaturation(builder, session, ctx.tokens, &parent.atoms);
                let carbon = parent.atoms[0];
                if builder.add_carbonyl(carbon, Element::O).is_none() {
                    return Ok(None);
                }
                decorate(builder, session, ctx.tokens, &parent.atoms, depth)?;
                Ok(Some(Fragment::new(parent.atoms, carbon)))
            }
            Pattern::SpiroSubstituent | Pattern::RingYl | Pattern::ChainYl => {
                parent_yl(builder, session, ctx, depth)
            }
            Pattern::SimpleGroup => match ctx.last() {
                Some(token) => Ok(token_framework(builder, session, token, depth)?.map(|f| f.fragment)),
                None => Ok(None),
            },
        }
    }
}

/// Patterns in the order they are tried.
#[derive(Debug, Clone)]
pub struct Registry {
    patterns: Vec<Pattern>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}

impl Registry {
    /// Every pattern, highest priority first.
    pub fn standard() -> Self {
        Self::with_patterns(Pattern::ALL.to_vec())
    }

    pub fn with_patterns(mut patterns: Vec<Pattern>) -> Self {
        // Stable: equal priorities keep registration order.
        patterns.sort_by(|a, b| b.priority().cmp(&a.priority()));
        Self { patterns }
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn first_match(&self, ctx: &TokenContext, rules: &RulesTable) -> Option<Pattern> {
        let found = self.patterns.iter().copied().find(|p| p.matches(ctx, rules));
        if let Some(pattern) = found {
            trace!(strategy = pattern.name(), "Matched {} tokens", ctx.len());
        }
        found
    }

    /// Every matching pattern, in priority order.
    pub fn matching<'r>(
        &'r self,
        ctx: &'r TokenContext<'r>,
        rules: &'r RulesTable,
    ) -> impl Iterator<Item = Pattern> + 'r {
        self.patterns.iter().copied().filter(move |p| p.matches(ctx, rules))
    }
}
