use tracing::*;

use crate::molecule::rings;
use crate::rules::RulesTable;
use crate::*;

/// A fragment together with the atoms its own locants count along.
///
/// For `ethoxy` the attachment is the oxygen but locant 2 is the second carbon;
/// for `benzyl` the locants number the ring, not the methylene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framework {
    pub fragment: Fragment,
    pub skeleton: Vec<usize>,
}

/// How a simple substituent bonds to its parent.
pub fn attachment_order(canonical: &str) -> BondOrder {
    if matches!(canonical, "oxo" | "imino" | "methylidene") || canonical.ends_with("ylidene") {
        BondOrder::Double
    } else {
        BondOrder::Single
    }
}

/// True for plain alkyl names (`methyl`, `pentadecyl`).
pub fn is_alkyl(rules: &RulesTable, canonical: &str) -> bool {
    rules.alkyl_length(canonical).is_some()
}

fn chain_framework(builder: &mut MoleculeBuilder, length: usize) -> Framework {
    let chain = builder.add_chain(length);
    Framework {
        fragment: Fragment::new(chain.clone(), chain[0]),
        skeleton: chain,
    }
}

fn smiles_framework(builder: &mut MoleculeBuilder, smiles: &str) -> Option<Framework> {
    let fragment = match parse_smiles(smiles) {
        Ok(fragment) => fragment,
        Err(e) => {
            warn!("Bad substituent fragment '{}': {}", smiles, e);
            return None;
        }
    };
    let atoms = builder.import_fragment(&fragment);
    let attachment = *atoms.first()?;
    // Aryl-bearing groups number along their ring.
    let skeleton = match atoms.iter().position(|&a| builder.is_aromatic(a)) {
        Some(start) => atoms[start..].to_vec(),
        None => atoms.clone(),
    };
    Some(Framework {
        fragment: Fragment::new(atoms, attachment),
        skeleton,
    })
}

/// Builds a single-token substituent: rules-table groups, alkyl, alkylidene,
/// alkoxy, acyl and cycloalkyl names.
pub fn build_framework(builder: &mut MoleculeBuilder, rules: &RulesTable, canonical: &str) -> Option<Framework> {
    if let Some(smiles) = rules.substituent_smiles(canonical) {
        return smiles_framework(builder, smiles);
    }
    if let Some(n) = rules.alkyl_length(canonical) {
        return Some(chain_framework(builder, n));
    }
    if let Some(n) = canonical.strip_suffix("ylidene").and_then(|stem| rules.stem_length(stem)) {
        return Some(chain_framework(builder, n));
    }
    if let Some(n) = rules.alkoxy_length(canonical) {
        let oxygen = builder.add_atom(Element::O);
        let chain = builder.add_chain(n);
        builder.add_bond(oxygen, chain[0], BondOrder::Single);
        let mut atoms = vec![oxygen];
        atoms.extend(&chain);
        return Some(Framework {
            fragment: Fragment::new(atoms, oxygen),
            skeleton: chain,
        });
    }
    if let Some(n) = rules.acyl_length(canonical) {
        let mut framework = chain_framework(builder, n);
        let oxygen = builder.add_carbonyl(framework.skeleton[0], Element::O)?;
        framework.fragment.atoms.push(oxygen);
        return Some(framework);
    }
    if let Some(n) = canonical
        .strip_prefix("cyclo")
        .and_then(|rest| rest.strip_suffix("yl"))
        .and_then(|stem| rules.stem_length(stem))
    {
        if n < 3 {
            return None;
        }
        let ring = rings::cycloalkane(builder, n);
        return Some(Framework {
            fragment: Fragment::new(ring.clone(), ring[0]),
            skeleton: ring,
        });
    }
    None
}

/// [`build_framework`] without the locant skeleton.
pub fn build_simple(builder: &mut MoleculeBuilder, rules: &RulesTable, canonical: &str) -> Option<Fragment> {
    let framework = build_framework(builder, rules, canonical)?;
    trace!("Simple substituent '{}' -> {} atoms", canonical, framework.fragment.atoms.len());
    Some(framework.fragment)
}
