use tracing::*;

use crate::rules::rules;
use crate::specialized::{build_special, SpecialForm};
use crate::*;

mod parent;
pub use parent::*;

mod pipeline;
pub use pipeline::*;

mod preprocess;
pub use preprocess::*;

mod stereo;
pub use stereo::*;

/// Limits for one [`GraphBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderConfig {
    /// Deepest bracket nesting accepted before the name fails.
    pub max_nesting_depth: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self { max_nesting_depth: 16 }
    }
}

/// A built molecule and everything that had to be skipped on the way.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub molecule: Molecule,
    pub warnings: Vec<BuildWarning>,
}

/// Turns a token stream into a molecular graph.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    config: BuilderConfig,
    registry: Registry,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::with_config(BuilderConfig::default())
    }

    pub fn with_config(config: BuilderConfig) -> Self {
        Self {
            config,
            registry: Registry::standard(),
        }
    }

    pub fn config(&self) -> BuilderConfig {
        self.config
    }

    /// Builds `name` from its tokens.
    ///
    /// Special forms (ethers, esters, `N`-substituted amides and amines) take
    /// their own route; everything else runs the stages in order: parent,
    /// unsaturation, suffixes, substituents, `N`-substituents, hydro, stereo.
    pub fn build(&self, name: &str, tokens: Vec<Token>) -> Result<BuildOutcome, NameError> {
        let span = info_span!("build", name);
        let _enter = span.enter();

        let tokens = in_stage("preprocess", || preprocess(name, tokens));
        if !tokens.iter().any(|t| t.is(TokenKind::Parent)) {
            error!("'{}' has no parent", name);
            return Err(NameError::new(name, FailureReason::NoParentChain));
        }

        let mut session = Session::new(name, rules(), &self.registry, self.config.max_nesting_depth);
        let mut builder = MoleculeBuilder::new();
        let form = SpecialForm::detect(&tokens);
        debug!("Building '{}' as {:?}", name, form);
        build_special(&mut builder, &mut session, &tokens, form)
            .map_err(|reason| NameError::new(name, reason))?;

        let warnings = session.warnings;
        let molecule = builder.build();
        info!(
            "Built '{}': {} atoms, {} bonds, {} warnings",
            name,
            molecule.atoms.len(),
            molecule.bonds.len(),
            warnings.len()
        );
        Ok(BuildOutcome { molecule, warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(name: &str) -> Result<BuildOutcome, NameError> {
        GraphBuilder::new().build(name, tokenize(name).unwrap())
    }

    #[test]
    fn test_default_config() {
        assert_eq!(GraphBuilder::new().config().max_nesting_depth, 16);
    }

    #[test]
    fn test_no_parent_is_fatal() {
        let err = build("2-chloro").unwrap_err();
        assert_eq!(err.reason, FailureReason::NoParentChain);
        assert_eq!(err.name, "2-chloro");
    }

    #[test]
    fn test_plain_path() {
        let outcome = build("3-methylbut-1-ene").unwrap();
        assert_eq!(outcome.molecule.heavy_atom_count(), 5);
        assert!(outcome.warnings.is_empty());
        let doubles = outcome
            .molecule
            .bonds
            .iter()
            .filter(|b| b.order == BondOrder::Double)
            .count();
        assert_eq!(doubles, 1);
    }

    #[test]
    fn test_depth_limit() {
        let name = "2-{[(tert-butyldimethylsilyl)oxy]methyl}pyridine";
        let builder = GraphBuilder::with_config(BuilderConfig { max_nesting_depth: 2 });
        let err = builder.build(name, tokenize(name).unwrap()).unwrap_err();
        assert_eq!(err.reason, FailureReason::NestingTooDeep(2));
        assert!(build(name).is_ok());
    }
}
