//! # Mimizuku Engine
//!
//! Reasoning engine orchestration.
//! Loads N3 rules and OWL ontologies into one RETE network and computes closures.

pub mod config;
pub mod engine;
pub mod shared;

pub use config::EngineOptions;
pub use engine::{EngineResult, ProcessingStats, ReasoningEngine};
pub use shared::SharedReasoner;

use mimizuku_core::CoreError;
use mimizuku_dlp::DlpError;
use mimizuku_rete::ReteError;
use mimizuku_rules::RuleError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("Rule error: {0}")]
    Rules(#[from] RuleError),

    #[error("Network error: {0}")]
    Network(#[from] ReteError),

    #[error("Ontology compilation error: {0}")]
    Dlp(#[from] DlpError),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Collaborator failed: {0}")]
    Collaborator(anyhow::Error),
}
