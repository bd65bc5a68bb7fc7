//! # Mimizuku Rules
//!
//! Horn clause model and the front ends that produce it:
//! Lloyd-Topor normalisation of general clauses, N3 rule documents and
//! JSON rule sets, plus the registry of built-in predicates.

pub mod builtins;
pub mod clause;
pub mod lloyd_topor;
pub mod n3;

pub use builtins::*;
pub use clause::*;
pub use lloyd_topor::{normalize, normalize_all, Normalized};
pub use n3::{parse_n3, N3Parser};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rule parsing and loading errors
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("Parse error at line {line}, column {column}: {message}")]
    Parse { line: usize, column: usize, message: String },

    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A recoverable, clause-local problem: the derivation named by `source`
/// was skipped and processing continued
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub source: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new<S: Into<String>, M: Into<String>>(source: S, message: M) -> Self {
        Self { source: source.into(), message: message.into() }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.message)
    }
}
