use std::collections::VecDeque;

use tracing::*;

use crate::*;

const SULFUR_LINKERS: &[&str] = &["sulfanyl", "thio", "sulfonyl", "sulfinyl"];

/// One pass of substituent tokens over a skeleton.
#[derive(Debug, Clone, Copy)]
pub struct Substitution<'t> {
    tokens: &'t [Token],
    skeleton: &'t [usize],
    depth: usize,
    defer_n_bound: bool,
    ester_form: bool,
}

/// Hangs every substituent of `tokens` on `skeleton`, with no ester or `N` handling.
pub fn decorate(
    builder: &mut MoleculeBuilder,
    session: &mut Session,
    tokens: &[Token],
    skeleton: &[usize],
    depth: usize,
) -> Result<(), FailureReason> {
    Substitution::new(tokens, skeleton, depth)
        .apply(builder, session, &mut VecDeque::new())
        .map(|_| ())
}

/// Removes explicit hydrogens from `atom` to make room for a new bond.
pub(crate) fn release_hydrogen(builder: &mut MoleculeBuilder, atom: usize, order: BondOrder) {
    if let Some(Some(hydrogens)) = builder.atom(atom).map(|a| a.hydrogens) {
        let used = match order {
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            _ => 1,
        };
        builder.set_hydrogens(atom, Some(hydrogens.saturating_sub(used)));
    }
}

/// Bonds a built fragment to `anchor`.
pub(crate) fn bond_fragment(builder: &mut MoleculeBuilder, anchor: usize, fragment: &Fragment, order: BondOrder) {
    if order != BondOrder::Single {
        builder.dearomatize(anchor);
    }
    release_hydrogen(builder, anchor, order);
    builder.add_bond(anchor, fragment.attachment_point, order);
}

/// Builds the fragment for one substituent token sitting at bracket depth `depth`.
///
/// Failures are recorded as warnings and come back as `Ok(None)`.
pub(crate) fn build_substituent(
    builder: &mut MoleculeBuilder,
    session: &mut Session,
    token: &Token,
    depth: usize,
) -> Result<Option<Fragment>, FailureReason> {
    if token.nested.is_some() {
        let fragment = build_nested(builder, session, token, depth + 1)?;
        if fragment.is_none() {
            session.warn(BuildWarning::Unbuildable {
                token: token.text.clone(),
            });
        }
        return Ok(fragment);
    }
    let fragment = build_simple(builder, session.rules, token.canonical());
    if fragment.is_none() {
        session.warn(BuildWarning::UnrecognizedSubstituent {
            token: token.text.clone(),
        });
    }
    Ok(fragment)
}

pub(crate) fn bond_order_for(token: &Token) -> BondOrder {
    if token.nested.is_some() {
        if is_ylidene_group(token) {
            BondOrder::Double
        } else {
            BondOrder::Single
        }
    } else {
        attachment_order(token.canonical())
    }
}

impl<'t> Substitution<'t> {
    pub fn new(tokens: &'t [Token], skeleton: &'t [usize], depth: usize) -> Self {
        Self {
            tokens,
            skeleton,
            depth,
            defer_n_bound: false,
            ester_form: false,
        }
    }

    /// Leave `N`-prefixed substituents for the nitrogen pass.
    pub fn deferring_n_bound(mut self) -> Self {
        self.defer_n_bound = true;
        self
    }

    /// Words followed by a space are ester alkyls even when no oxygen is left for them.
    pub fn in_ester_form(mut self) -> Self {
        self.ester_form = true;
        self
    }

    /// Applies every substituent token, returning the indices of deferred `N`-bound ones.
    ///
    /// Ester alkyl words (`methyl` in `methyl butanoate`) consume `ester_oxygens`
    /// front to back instead of attaching to the skeleton.
    pub fn apply(
        &self,
        builder: &mut MoleculeBuilder,
        session: &mut Session,
        ester_oxygens: &mut VecDeque<usize>,
    ) -> Result<Vec<usize>, FailureReason> {
        let mut deferred = Vec::new();
        let mut i = 0;
        while i < self.tokens.len() {
            let token = &self.tokens[i];
            if !token.is(TokenKind::Substituent) {
                i += 1;
                continue;
            }
            let placement = placement_for(self.tokens, i);
            if placement.is_n_bound() && self.defer_n_bound {
                trace!("Deferring N-bound '{}'", token.text);
                deferred.push(i);
                i += 1;
                continue;
            }
            if self.is_ester_alkyl(session, token, ester_oxygens) {
                self.attach_ester_alkyl(builder, session, token, &placement, ester_oxygens)?;
                i += 1;
                continue;
            }
            if let Some(linker) = self.absorbing_linker(session, i) {
                self.attach_absorbed(builder, session, token, linker, &placement)?;
                i += 2;
                continue;
            }
            self.attach(builder, session, token, &placement)?;
            i += 1;
        }
        Ok(deferred)
    }

    fn is_ester_alkyl(&self, session: &Session, token: &Token, ester_oxygens: &VecDeque<usize>) -> bool {
        if self.depth > 0 || (ester_oxygens.is_empty() && !self.ester_form) {
            return false;
        }
        session
            .name
            .get(token.end()..)
            .map(|rest| rest.starts_with(char::is_whitespace))
            .unwrap_or(false)
    }

    fn attach_ester_alkyl(
        &self,
        builder: &mut MoleculeBuilder,
        session: &mut Session,
        token: &Token,
        placement: &Placement,
        ester_oxygens: &mut VecDeque<usize>,
    ) -> Result<(), FailureReason> {
        for _ in 0..placement.count {
            let Some(oxygen) = ester_oxygens.pop_front() else {
                session.warn(BuildWarning::UnusedEsterAlkyl {
                    token: token.text.clone(),
                });
                return Ok(());
            };
            let Some(fragment) = build_substituent(builder, session, token, self.depth)? else {
                ester_oxygens.push_front(oxygen);
                return Ok(());
            };
            builder.set_charge(oxygen, 0);
            builder.add_bond(oxygen, fragment.attachment_point, BondOrder::Single);
            debug!("Ester alkyl '{}' on oxygen {}", token.text, oxygen);
        }
        Ok(())
    }

    /// A sulfur linker right after an alkyl (`methylsulfanyl`) takes the alkyl onto its sulfur.
    fn absorbing_linker(&self, session: &Session, index: usize) -> Option<&'t Token> {
        let token = &self.tokens[index];
        let next = self.tokens.get(index + 1)?;
        let alkyl = token.nested.is_none() && is_alkyl(session.rules, token.canonical());
        let linker = next.is(TokenKind::Substituent)
            && next.nested.is_none()
            && SULFUR_LINKERS.contains(&next.canonical());
        (alkyl && linker).then_some(next)
    }

    fn attach_absorbed(
        &self,
        builder: &mut MoleculeBuilder,
        session: &mut Session,
        alkyl: &Token,
        linker: &Token,
        placement: &Placement,
    ) -> Result<(), FailureReason> {
        self.warn_mismatch(session, alkyl, placement);
        for target in placement.targets() {
            let Some(anchor) = self.anchor(builder, session, alkyl, target) else {
                continue;
            };
            let Some(sulfur) = build_simple(builder, session.rules, linker.canonical()) else {
                return Ok(());
            };
            let Some(chain) = build_simple(builder, session.rules, alkyl.canonical()) else {
                return Ok(());
            };
            builder.add_bond(sulfur.attachment_point, chain.attachment_point, BondOrder::Single);
            bond_fragment(builder, anchor, &sulfur, BondOrder::Single);
            debug!("'{}{}' at locant {}", alkyl.text, linker.text, target);
        }
        Ok(())
    }

    fn warn_mismatch(&self, session: &mut Session, token: &Token, placement: &Placement) {
        if placement.mismatch {
            session.warn(BuildWarning::CountMismatch {
                token: token.text.clone(),
                expected: placement.count,
                found: placement.positions.len(),
            });
        }
    }

    /// Resolves a locant to a skeleton atom that may carry a substituent.
    fn anchor(&self, builder: &MoleculeBuilder, session: &mut Session, token: &Token, locant: i64) -> Option<usize> {
        let Some(atom) = locant_to_atom_index(locant, self.skeleton) else {
            session.warn(BuildWarning::LocantOutOfRange {
                token: token.text.clone(),
                locant,
                length: self.skeleton.len(),
            });
            return None;
        };
        let element = builder.element(atom)?;
        if !element.accepts_substituents() {
            session.warn(BuildWarning::RefusedElement {
                token: token.text.clone(),
                element: element.symbol().to_string(),
                atom,
            });
            return None;
        }
        Some(atom)
    }

    fn attach(
        &self,
        builder: &mut MoleculeBuilder,
        session: &mut Session,
        token: &Token,
        placement: &Placement,
    ) -> Result<(), FailureReason> {
        self.warn_mismatch(session, token, placement);
        let order = bond_order_for(token);
        for target in placement.targets() {
            let Some(anchor) = self.anchor(builder, session, token, target) else {
                continue;
            };
            if token.nested.is_none() && token.canonical() == "oxo" {
                release_hydrogen(builder, anchor, BondOrder::Double);
                builder.add_carbonyl(anchor, Element::O);
                continue;
            }
            let Some(fragment) = build_substituent(builder, session, token, self.depth)? else {
                // Every copy would fail the same way.
                return Ok(());
            };
            bond_fragment(builder, anchor, &fragment, order);
            trace!("'{}' at locant {} (atom {})", token.text, target, anchor);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::rules;

    struct Run {
        builder: MoleculeBuilder,
        chain: Vec<usize>,
        warnings: Vec<BuildWarning>,
    }

    /// Applies the substituents of `name` to a plain chain of `length` carbons.
    fn run(name: &str, length: usize) -> Run {
        let tokens = tokenize(name).unwrap();
        let registry = Registry::standard();
        let mut session = Session::new(name, rules(), &registry, 16);
        let mut builder = MoleculeBuilder::new();
        let chain = builder.add_chain(length);
        Substitution::new(&tokens, &chain, 0)
            .apply(&mut builder, &mut session, &mut VecDeque::new())
            .unwrap();
        Run {
            builder,
            chain,
            warnings: session.warnings,
        }
    }

    fn count(builder: &MoleculeBuilder, element: Element) -> usize {
        (0..builder.atom_count())
            .filter(|&a| builder.element(a) == Some(element))
            .count()
    }

    #[test]
    fn test_multiplier_law() {
        let run = run("trichloromethane", 1);
        assert_eq!(count(&run.builder, Element::Cl), 3);
        assert_eq!(run.builder.neighbors(run.chain[0]).len(), 3);
    }

    #[test]
    fn test_locants_and_blocking() {
        let run = run("2,4-dimethylpentane", 5);
        assert_eq!(run.builder.neighbors(run.chain[1]).len(), 3);
        assert_eq!(run.builder.neighbors(run.chain[3]).len(), 3);
        assert!(run.warnings.is_empty());
    }

    #[test]
    fn test_out_of_range_is_skipped() {
        let run = run("5-chloropropane", 3);
        assert_eq!(count(&run.builder, Element::Cl), 0);
        assert!(matches!(
            run.warnings.as_slice(),
            [BuildWarning::LocantOutOfRange { locant: 5, length: 3, .. }]
        ));
    }

    #[test]
    fn test_refuses_oxygen_anchor() {
        let tokens = tokenize("1-chloromethane").unwrap();
        let registry = Registry::standard();
        let mut session = Session::new("1-chloromethane", rules(), &registry, 16);
        let mut builder = MoleculeBuilder::new();
        let oxygen = builder.add_atom(Element::O);
        decorate(&mut builder, &mut session, &tokens, &[oxygen], 0).unwrap();
        assert_eq!(builder.atom_count(), 1);
        assert!(matches!(
            session.warnings.as_slice(),
            [BuildWarning::RefusedElement { .. }]
        ));
    }

    #[test]
    fn test_sulfanyl_absorbs_alkyl() {
        let run = run("2-methylsulfanylpropane", 3);
        let sulfur = (0..run.builder.atom_count())
            .find(|&a| run.builder.element(a) == Some(Element::S))
            .unwrap();
        assert_eq!(run.builder.neighbors(sulfur).len(), 2);
        assert!(run.builder.neighbors(sulfur).contains(&run.chain[1]));
        assert_eq!(run.builder.atom_count(), 5);
    }

    #[test]
    fn test_oxo_makes_carbonyl() {
        let run = run("3-oxobutane", 4);
        assert!(run.builder.is_carbonyl_carbon(run.chain[2]));
    }

    #[test]
    fn test_nested_groups_recurse() {
        let run = run("2-(2-hydroxyethyl)pentane", 5);
        assert_eq!(count(&run.builder, Element::O), 1);
        assert_eq!(run.builder.atom_count(), 8);
    }

    #[test]
    fn test_ester_alkyl_consumes_oxygen() {
        let name = "methyl butanoate";
        let tokens = tokenize(name).unwrap();
        let registry = Registry::standard();
        let mut session = Session::new(name, rules(), &registry, 16);
        let mut builder = MoleculeBuilder::new();
        let chain = builder.add_chain(4);
        let oxygen = builder.attach_atom(chain[0], Element::O, BondOrder::Single).unwrap();
        let mut queue = VecDeque::from([oxygen]);
        Substitution::new(&tokens, &chain, 0)
            .apply(&mut builder, &mut session, &mut queue)
            .unwrap();
        assert!(queue.is_empty());
        assert_eq!(builder.neighbors(oxygen).len(), 2);
    }

    #[test]
    fn test_n_bound_substituents_are_deferred() {
        let name = "N,N-dimethylethanamine";
        let tokens = tokenize(name).unwrap();
        let registry = Registry::standard();
        let mut session = Session::new(name, rules(), &registry, 16);
        let mut builder = MoleculeBuilder::new();
        let chain = builder.add_chain(2);
        let deferred = Substitution::new(&tokens, &chain, 0)
            .deferring_n_bound()
            .apply(&mut builder, &mut session, &mut VecDeque::new())
            .unwrap();
        assert_eq!(deferred.len(), 1);
        assert_eq!(builder.atom_count(), 2);
    }
}
