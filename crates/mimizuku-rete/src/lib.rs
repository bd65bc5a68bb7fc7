//! # Mimizuku RETE
//!
//! Forward-chaining RETE network over RDF triples.
//! Alpha nodes test single patterns, beta nodes join partial matches on
//! shared variables, productions assert rule heads back into working memory.

pub mod builder;
pub mod cancel;
pub mod dot;
pub mod error;
pub mod network;
pub mod node;
pub mod options;
pub mod production;
pub mod provenance;
pub mod stats;

pub use builder::{BuildReport, RuleOutcome};
pub use cancel::CancellationFlag;
pub use error::ReteError;
pub use network::{FeedReport, Network};
pub use node::{AlphaId, BetaId, ProductionId};
pub use options::NetworkOptions;
pub use production::Production;
pub use provenance::{Justification, ProvenanceMap};
pub use stats::NetworkStats;
