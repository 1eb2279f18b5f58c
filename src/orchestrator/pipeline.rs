use tracing::*;

use crate::specialized::attach_n_substituents;
use crate::*;

/// Runs `f` inside a `stage` span.
pub(crate) fn in_stage<T>(name: &'static str, f: impl FnOnce() -> T) -> T {
    let span = debug_span!("stage", name);
    let _enter = span.enter();
    f()
}

/// Which special handling the shared stages need.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct StageOptions {
    pub ester_form: bool,
}

/// Builds the parent and runs every later stage over it.
pub(crate) fn assemble(
    builder: &mut MoleculeBuilder,
    session: &mut Session,
    tokens: &[Token],
    options: StageOptions,
) -> Result<ParentSkeleton, FailureReason> {
    let ctx = TokenContext::new(tokens);
    let parent = in_stage("parent", || build_parent(builder, session, &ctx)).ok_or_else(|| {
        error!("No buildable parent in '{}'", session.name);
        FailureReason::NoParentChain
    })?;
    assemble_on(builder, session, tokens, parent, options)
}

/// Unsaturation, suffixes, substituents, `N`-substituents, hydro and stereo over a built parent.
pub(crate) fn assemble_on(
    builder: &mut MoleculeBuilder,
    session: &mut Session,
    tokens: &[Token],
    parent: ParentSkeleton,
    options: StageOptions,
) -> Result<ParentSkeleton, FailureReason> {
    in_stage("unsaturation", || {
        apply_unsaturation(builder, session, tokens, &parent.atoms)
    });
    let mut outcome = in_stage("suffixes", || {
        apply_suffixes(builder, session, tokens, &parent.atoms, parent.cyclic)
    });
    let deferred = in_stage("substituents", || {
        let mut pass = Substitution::new(tokens, &parent.atoms, 0).deferring_n_bound();
        if options.ester_form {
            pass = pass.in_ester_form();
        }
        pass.apply(builder, session, &mut outcome.ester_oxygens)
    })?;
    in_stage("n-substituents", || {
        attach_n_substituents(builder, session, tokens, &deferred, &outcome.nitrogens)
    })?;
    close_ester_oxygens(builder, &mut outcome.ester_oxygens);
    in_stage("hydro", || apply_hydro(builder, tokens, &parent.atoms));
    in_stage("stereo", || apply_stereo(builder, session, tokens, &parent.atoms));
    Ok(parent)
}

/// Saturates the atoms cited by `hydro` prefixes and moves indicated hydrogen (`2H-`).
pub fn apply_hydro(builder: &mut MoleculeBuilder, tokens: &[Token], skeleton: &[usize]) {
    for (i, token) in tokens.iter().enumerate() {
        if token.prefix() == Some(&PrefixPayload::Hydro) {
            for locant in placement_for(tokens, i).positions {
                match locant_to_atom_index(locant as i64, skeleton) {
                    Some(atom) => builder.saturate_atom(atom),
                    None => warn!("Hydro locant {} is off the skeleton", locant),
                }
            }
        }
        if let Some(locant) = token.indicated_hydrogen() {
            move_indicated_hydrogen(builder, skeleton, locant);
        }
        for locant in token.added_hydrogen() {
            add_hydrogen(builder, skeleton, locant);
        }
    }
}

/// `pyridin-2(1H)-one`: a ring nitrogen keeps an explicit `H`; a carbon is saturated.
fn add_hydrogen(builder: &mut MoleculeBuilder, skeleton: &[usize], locant: u32) {
    let Some(atom) = locant_to_atom_index(locant as i64, skeleton) else {
        warn!("Added hydrogen locant {} is off the skeleton", locant);
        return;
    };
    match builder.element(atom) {
        Some(Element::N) => {
            builder.set_hydrogens(atom, Some(1));
        }
        Some(Element::C) => builder.saturate_atom(atom),
        _ => {}
    }
    trace!("Added hydrogen on locant {}", locant);
}

/// `2H-tetrazole`: the ring `NH` sits at the cited nitrogen instead of the template's.
fn move_indicated_hydrogen(builder: &mut MoleculeBuilder, skeleton: &[usize], locant: u32) {
    let Some(target) = locant_to_atom_index(locant as i64, skeleton) else {
        return;
    };
    let aromatic_nitrogen = |builder: &MoleculeBuilder, atom: usize| {
        builder.element(atom) == Some(Element::N) && builder.is_aromatic(atom)
    };
    if !aromatic_nitrogen(builder, target) {
        return;
    }
    for &atom in skeleton {
        if atom != target
            && aromatic_nitrogen(builder, atom)
            && builder.atom(atom).and_then(|a| a.hydrogens) == Some(1)
        {
            builder.set_hydrogens(atom, None);
        }
    }
    builder.set_hydrogens(target, Some(1));
    trace!("Indicated hydrogen on locant {}", locant);
}
