mod chain;
pub use chain::*;

mod stroke;
pub use stroke::*;
