//! Command implementations for xtask
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod catalog;
mod fire;
mod footprint;

pub use catalog::Catalog;
pub use fire::Fire;
pub use footprint::Footprint;
