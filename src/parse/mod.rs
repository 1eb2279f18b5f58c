mod smiles;
pub use smiles::*;

mod lexer;
pub use lexer::*;
