//! # Mimizuku Core
//!
//! Term, triple and binding model shared by the rule parser, the RETE network
//! and the OWL compiler, plus an indexed in-memory graph.

pub mod binding;
pub mod error;
pub mod model;
pub mod store;
pub mod vocabulary;

pub use binding::*;
pub use error::*;
pub use model::*;
pub use store::*;
