use tracing::*;

use crate::molecule::rings;
use crate::*;

/// The principal chain or ring, in locant order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentSkeleton {
    pub atoms: Vec<usize>,
    pub cyclic: bool,
}

impl ParentSkeleton {
    fn chain(atoms: Vec<usize>) -> Self {
        Self { atoms, cyclic: false }
    }

    fn ring(atoms: Vec<usize>) -> Self {
        Self { atoms, cyclic: true }
    }
}

fn is_ring(token: &Token) -> bool {
    token
        .parent()
        .map(|p| p.fragment_smiles().is_some() || rings::template(&p.canonical()).is_some())
        .unwrap_or(false)
}

/// True if the tokens name a ring system rather than a chain.
pub fn names_ring(ctx: &TokenContext) -> bool {
    ctx.parents.iter().any(|t| is_ring(t))
        || ctx.prefixes.iter().any(|p| {
            matches!(
                p.prefix(),
                Some(PrefixPayload::Cyclo) | Some(PrefixPayload::VonBaeyer { .. }) | Some(PrefixPayload::Spiro { .. })
            )
        })
}

/// Picks the parent token: any ring beats the longest chain.
pub fn select_parent<'a>(ctx: &TokenContext<'a>) -> Option<&'a Token> {
    if let Some(ring) = ctx.parents.iter().find(|t| is_ring(t)) {
        return Some(ring);
    }
    ctx.parents
        .iter()
        .copied()
        .reduce(|best, t| match (best.parent(), t.parent()) {
            (Some(b), Some(c)) if c.atom_count() > b.atom_count() => t,
            _ => best,
        })
}

/// Heteroatom replacement prefixes (`2-oxa`, `1,4-dioxa`) with their locants.
fn replacement_atoms(ctx: &TokenContext) -> Vec<(u32, Element)> {
    let mut heteroatoms = Vec::new();
    for (i, token) in ctx.tokens.iter().enumerate() {
        let Some(PrefixPayload::Heteroatom(element)) = token.prefix() else {
            continue;
        };
        for locant in placement_for(ctx.tokens, i).targets() {
            if let Ok(locant) = u32::try_from(locant) {
                heteroatoms.push((locant, *element));
            }
        }
    }
    heteroatoms
}

/// A locant written directly before a ring name renumbers its heteroatoms (`1,2,4-oxadiazole`).
fn ring_heteroatom_locants(ctx: &TokenContext, parent: &Token, expected: usize) -> Option<Vec<u32>> {
    let index = ctx.index_of(parent)?;
    let before = ctx.tokens.get(index.checked_sub(1)?)?;
    let positions = before.positions();
    (before.is(TokenKind::Locant) && expected > 0 && positions.len() == expected).then_some(positions)
}

fn replace_heteroatoms(builder: &mut MoleculeBuilder, atoms: &[usize], heteroatoms: &[(u32, Element)]) {
    for &(locant, element) in heteroatoms {
        match locant_to_atom_index(locant as i64, atoms) {
            Some(atom) => {
                builder.replace_element(atom, element);
            }
            None => warn!("Replacement {} at locant {} is off the skeleton", element, locant),
        }
    }
}

/// Builds the parent skeleton: Von Baeyer and spiro systems, named rings,
/// `cyclo` rings, then plain chains.
///
/// Returns `None` if the tokens name no buildable parent.
pub fn build_parent(builder: &mut MoleculeBuilder, session: &mut Session, ctx: &TokenContext) -> Option<ParentSkeleton> {
    let heteroatoms = replacement_atoms(ctx);
    for prefix in &ctx.prefixes {
        let size = match prefix.prefix() {
            Some(PrefixPayload::VonBaeyer { main, secondary }) => von_baeyer_size(*main, secondary),
            Some(PrefixPayload::Spiro { rings }) => spiro_size(*rings),
            _ => continue,
        };
        let stem = select_parent(ctx).and_then(|t| t.parent()).map(|p| p.atom_count());
        if size.is_none() || size != stem {
            warn!(
                "'{}' brackets {:?} atoms but the stem names {:?}",
                prefix.text, size, stem
            );
            return None;
        }
        match prefix.prefix() {
            Some(PrefixPayload::VonBaeyer { main, secondary }) => {
                let atoms = von_baeyer(builder, *main, secondary, &heteroatoms)?;
                debug!("Von Baeyer parent {:?} with {} atoms", main, atoms.len());
                return Some(ParentSkeleton::ring(atoms));
            }
            Some(PrefixPayload::Spiro { rings }) => {
                let atoms = spiro(builder, *rings, &heteroatoms)?;
                debug!("Spiro parent {:?} with {} atoms", rings, atoms.len());
                return Some(ParentSkeleton::ring(atoms));
            }
            _ => {}
        }
    }

    let token = select_parent(ctx)?;
    let payload = token.parent()?;
    let canonical = payload.canonical();
    if let Some(template) = rings::template(&canonical) {
        let locants = ring_heteroatom_locants(ctx, token, template.heteroatom_count());
        let atoms = rings::build_named(builder, &canonical, locants.as_deref())?;
        return Some(ParentSkeleton::ring(atoms));
    }
    if let Some(smiles) = payload.fragment_smiles() {
        let fragment = match parse_smiles(smiles) {
            Ok(fragment) => fragment,
            Err(e) => {
                warn!("Bad parent fragment '{}' for '{}': {}", smiles, session.name, e);
                return None;
            }
        };
        return Some(ParentSkeleton::ring(builder.import_fragment(&fragment)));
    }

    let length = payload.atom_count();
    if length == 0 {
        return None;
    }
    if ctx.prefixes.iter().any(|p| p.prefix() == Some(&PrefixPayload::Cyclo)) {
        if length < 3 {
            warn!("'cyclo{}' is too small for a ring", canonical);
            return None;
        }
        let atoms = rings::cycloalkane(builder, length);
        replace_heteroatoms(builder, &atoms, &heteroatoms);
        debug!("Cyclic parent of {} atoms", length);
        return Some(ParentSkeleton::ring(atoms));
    }
    let atoms = builder.add_chain(length);
    replace_heteroatoms(builder, &atoms, &heteroatoms);
    debug!("Chain parent '{}' of {} atoms", canonical, length);
    Some(ParentSkeleton::chain(atoms))
}
