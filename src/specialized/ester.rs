use tracing::*;

use crate::*;

/// `methyl butanoate`, `ethyl benzoate`, `diethyl butanedioate`.
///
/// The acyl parent carries the `-oate` oxygens; words followed by a space are
/// the alkyl groups that close them. Aromatic acyl parents spelled inside the
/// ester word (`benzoate`) are spliced in from their fragment.
pub(crate) fn build_ester(
    builder: &mut MoleculeBuilder,
    session: &mut Session,
    tokens: &[Token],
) -> Result<ParentSkeleton, FailureReason> {
    let options = StageOptions { ester_form: true };
    let ctx = TokenContext::new(tokens);
    let implied_ring = ctx
        .parents
        .iter()
        .find(|t| t.length == 0)
        .and_then(|t| t.parent()?.fragment_smiles());
    let Some(smiles) = implied_ring else {
        return assemble(builder, session, tokens, options);
    };
    let fragment = parse_smiles(smiles)?;
    let atoms = in_stage("parent", || builder.import_fragment(&fragment));
    debug!("Acyl parent '{}' spliced in as {} atoms", smiles, atoms.len());
    let parent = ParentSkeleton { atoms, cyclic: true };
    assemble_on(builder, session, tokens, parent, options)
}
