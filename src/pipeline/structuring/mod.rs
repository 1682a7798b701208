//! Normalization of the recognition service's free-text answer into a
//! fixed-schema [`ParameterRecord`].
//!
//! Everything in this module is pure and synchronous: no I/O, no shared
//! mutable state, and no failure path. Any input text produces a record.

pub mod types;
pub mod alias;
pub mod parser;
pub mod fluid;
pub mod defaults;
pub mod audit;
pub mod orchestrator;

pub use types::*;
pub use alias::*;
pub use parser::*;
pub use fluid::*;
pub use defaults::*;
pub use audit::*;
pub use orchestrator::*;
