use std::str::FromStr;

use tracing::Level;

mod error;
pub use error::*;

mod token;
pub use token::*;

mod molecule;
pub use molecule::*;

pub mod rules;

mod parse;
pub use parse::*;

mod locant;
pub use locant::*;

mod substituent;
pub use substituent::*;

mod applicator;
pub use applicator::*;

mod suffix;
pub use suffix::*;

mod specialized;

mod orchestrator;
pub use orchestrator::*;

/// Installs a `fmt` subscriber at `level` (`trace`, `debug`, `info`, `warn`, `error`).
///
/// Unknown levels fall back to `info`. Calling this more than once keeps the first subscriber.
pub fn init_logging(level: &str) {
    let level = Level::from_str(level).unwrap_or(Level::INFO);
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

/// Tokenizes and builds a systematic name with the default configuration.
pub fn parse_name(name: &str) -> Result<BuildOutcome, NameError> {
    let tokens = tokenize(name).map_err(|reason| NameError::new(name, reason))?;
    GraphBuilder::new().build(name, tokens)
}
