//! # 🦉 Mimizuku - RETE Rule Engine for RDF
//!
//! Mimizuku computes the forward-chaining closure of RDF facts under Horn rules.
//! Rules come from N3 documents, JSON rule sets, or OWL ontologies compiled through
//! Description Logic Programs (DLP).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mimizuku::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut engine = ReasoningEngine::new();
//!     engine.load_n3_rules(r#"
//!         @prefix ex: <http://example.org/> .
//!         ex:alice ex:parentOf ex:bob .
//!         ex:bob ex:parentOf ex:carol .
//!         { ?x ex:parentOf ?y . ?y ex:parentOf ?z } => { ?x ex:grandparentOf ?z } .
//!     "#)?;
//!
//!     println!("{}", engine.stats());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`mimizuku-core`**: terms, triples, bindings and the indexed graph
//! - **`mimizuku-rules`**: Horn clauses, Lloyd-Topor normalisation, built-ins, N3 parser
//! - **`mimizuku-rete`**: the RETE network
//! - **`mimizuku-dlp`**: OWL to Horn rule compiler
//! - **`mimizuku-engine`**: orchestration and the shared async reasoner
//!
//! ## Feature Flags
//!
//! - `full` (default): every crate
//! - `core`, `rules`, `rete`, `dlp`, `engine`: the named crate and what it depends on

#[cfg(feature = "mimizuku-core")]
pub use mimizuku_core as core;

#[cfg(feature = "mimizuku-rules")]
pub use mimizuku_rules as rules;

#[cfg(feature = "mimizuku-rete")]
pub use mimizuku_rete as rete;

#[cfg(feature = "mimizuku-dlp")]
pub use mimizuku_dlp as dlp;

#[cfg(feature = "mimizuku-engine")]
pub use mimizuku_engine as engine;

#[cfg(feature = "mimizuku-core")]
pub use mimizuku_core::{vocabulary, Graph, Term, Triple, TripleSource, Variable};

#[cfg(feature = "mimizuku-rules")]
pub use mimizuku_rules::{parse_n3, BuiltinRegistry, Diagnostic, HornRule, Ruleset};

#[cfg(feature = "mimizuku-rete")]
pub use mimizuku_rete::{CancellationFlag, Network, NetworkOptions, NetworkStats};

#[cfg(feature = "mimizuku-dlp")]
pub use mimizuku_dlp::{Compilation, DlpCompiler};

#[cfg(feature = "mimizuku-engine")]
pub use mimizuku_engine::{EngineError, EngineOptions, EngineResult, ReasoningEngine, SharedReasoner};

pub use anyhow;
pub use serde;
pub use serde_json;
pub use tokio;

/// Prelude module for convenient imports
///
/// ```rust
/// use mimizuku::prelude::*;
/// ```
pub mod prelude {
    #[cfg(feature = "mimizuku-core")]
    pub use crate::{Graph, Term, Triple, TripleSource};

    #[cfg(feature = "mimizuku-rules")]
    pub use crate::{HornRule, Ruleset};

    #[cfg(feature = "mimizuku-rete")]
    pub use crate::Network;

    #[cfg(feature = "mimizuku-engine")]
    pub use crate::{EngineOptions, ReasoningEngine, SharedReasoner};
}
