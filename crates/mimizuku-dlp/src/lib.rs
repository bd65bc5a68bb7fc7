//! # Mimizuku DLP
//!
//! Description Logic Programs: compiles the Horn-expressible part of an OWL
//! ontology into rules for the RETE network.
//!
//! ```text
//! ontology graph ──ClassExpressionReader──▶ ClassExpression
//!                ──th / tb──▶ Clause ──Lloyd-Topor──▶ HornRule
//! ```

pub mod class_expr;
pub mod compiler;
pub mod context;
pub mod mapping;
pub mod semantics;

pub use class_expr::{ClassExpression, ClassExpressionReader, PropertyExpression};
pub use compiler::{Compilation, DlpCompiler};
pub use context::CompilationContext;
pub use semantics::{non_horn_semantics, NON_HORN_SEMANTICS};

use mimizuku_core::CoreError;
use mimizuku_rules::RuleError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DlpError {
    #[error("List error: {0}")]
    List(#[from] CoreError),

    #[error("Restriction without owl:onProperty: {0}")]
    MissingProperty(String),

    #[error("Restriction without a filler: {0}")]
    EmptyRestriction(String),

    #[error("Ambiguous restriction: {0}")]
    AmbiguousRestriction(String),

    #[error("Cyclic class expression through {0}")]
    CyclicExpression(String),

    #[error("Unsupported construct: {0}")]
    Unsupported(String),

    #[error("Rule error: {0}")]
    Rules(#[from] RuleError),
}
