use tracing::*;

use crate::rules::RulesTable;
use crate::*;

mod simple;
pub use simple::*;

mod strategy;
pub use strategy::*;

mod nested;
pub use nested::*;

/// A substituent built into the active builder, waiting to be bonded to its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub atoms: Vec<usize>,
    pub attachment_point: usize,
}

impl Fragment {
    pub fn new(atoms: Vec<usize>, attachment_point: usize) -> Self {
        Self {
            atoms,
            attachment_point,
        }
    }
}

/// Per-name state shared by every builder that runs while one name is assembled.
pub struct Session<'a> {
    pub name: &'a str,
    pub rules: &'a RulesTable,
    pub registry: &'a Registry,
    pub max_depth: usize,
    pub warnings: Vec<BuildWarning>,
}

impl<'a> Session<'a> {
    pub fn new(name: &'a str, rules: &'a RulesTable, registry: &'a Registry, max_depth: usize) -> Self {
        Self {
            name,
            rules,
            registry,
            max_depth,
            warnings: Vec::new(),
        }
    }

    /// Records a recoverable problem.
    pub fn warn(&mut self, warning: BuildWarning) {
        warn!("{}: {}", self.name, warning);
        self.warnings.push(warning);
    }
}
