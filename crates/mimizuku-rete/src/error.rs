use mimizuku_core::Triple;
use thiserror::Error;

/// RETE network errors
#[derive(Error, Debug)]
pub enum ReteError {
    #[error("Fact contains variables: {0}")]
    NonGroundFact(Triple),

    #[error("Feed cancelled after {processed} of {total} facts")]
    Cancelled { processed: usize, total: usize },
}
