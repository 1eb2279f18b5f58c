use thiserror::Error;

use crate::SmilesError;

/// Why a name could not be turned into a molecule at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    #[error("no parent chain")]
    NoParentChain,
    #[error("N-substituted {0} has an N-prefix with no substituent")]
    MissingNPrefix(&'static str),
    #[error("substituents nested deeper than {0} levels")]
    NestingTooDeep(usize),
    #[error("unrecognized text '{text}' at position {position}")]
    Tokenize { position: usize, text: String },
    #[error("fragment import failed: {0}")]
    Fragment(#[from] SmilesError),
}

/// A fatal parse failure, carrying the name that failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot build '{name}': {reason}")]
pub struct NameError {
    pub name: String,
    #[source]
    pub reason: FailureReason,
}

impl NameError {
    pub fn new(name: &str, reason: FailureReason) -> Self {
        Self {
            name: name.to_string(),
            reason,
        }
    }
}

/// Something that was skipped while building; the rest of the molecule is still valid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildWarning {
    #[error("locant {locant} is outside a skeleton of {length} atoms; '{token}' skipped there")]
    LocantOutOfRange {
        token: String,
        locant: i64,
        length: usize,
    },
    #[error("'{token}' asks for {expected} positions but {found} locants were given")]
    CountMismatch {
        token: String,
        expected: usize,
        found: usize,
    },
    #[error("nested substituent '{token}' could not be built")]
    Unbuildable { token: String },
    #[error("unrecognized substituent '{token}'")]
    UnrecognizedSubstituent { token: String },
    #[error("refused to put '{token}' on {element} atom {atom}")]
    RefusedElement {
        token: String,
        element: String,
        atom: usize,
    },
    #[error("no nitrogen available for N-substituent '{token}'")]
    NoNitrogen { token: String },
    #[error("unsaturation '{token}' at locant {locant} could not be placed")]
    UnplacedUnsaturation { token: String, locant: i64 },
    #[error("stereo descriptor '{descriptor}' could not be placed")]
    UnplacedStereo { descriptor: String },
    #[error("ester alkyl '{token}' has no open ester oxygen")]
    UnusedEsterAlkyl { token: String },
}
