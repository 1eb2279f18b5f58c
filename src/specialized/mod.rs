use crate::*;

mod amide;
pub(crate) use amide::*;

mod ester;
use ester::*;

mod ether;
use ether::*;

/// Name shapes that need their own assembly route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SpecialForm {
    /// `propan-2-yloxybenzene`: split at the `oxy` connector token.
    Ether { connector: usize },
    /// Anything with an `-oate` group.
    Ester,
    /// An acyclic amide or amine with `N`-prefixed substituents.
    NSubstituted(&'static str),
    Plain,
}

impl SpecialForm {
    pub fn detect(tokens: &[Token]) -> Self {
        if let Some(connector) = tokens
            .iter()
            .position(|t| t.suffix_kind() == Some(SuffixKind::Oxy))
        {
            return SpecialForm::Ether { connector };
        }
        let ctx = TokenContext::new(tokens);
        if ctx.has_suffix(SuffixKind::Oate) {
            return SpecialForm::Ester;
        }
        if ctx.has_n_prefix() && !names_ring(&ctx) {
            if ctx.has_suffix(SuffixKind::Amide) {
                return SpecialForm::NSubstituted("amide");
            }
            if ctx.has_suffix(SuffixKind::Amine) {
                return SpecialForm::NSubstituted("amine");
            }
        }
        SpecialForm::Plain
    }
}

pub(crate) fn build_special(
    builder: &mut MoleculeBuilder,
    session: &mut Session,
    tokens: &[Token],
    form: SpecialForm,
) -> Result<ParentSkeleton, FailureReason> {
    match form {
        SpecialForm::Ether { connector } => build_ether(builder, session, tokens, connector),
        SpecialForm::Ester => build_ester(builder, session, tokens),
        SpecialForm::NSubstituted(form) => build_n_substituted(builder, session, tokens, form),
        SpecialForm::Plain => assemble(builder, session, tokens, StageOptions::default()),
    }
}
