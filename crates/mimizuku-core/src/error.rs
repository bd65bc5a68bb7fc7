use thiserror::Error;

/// Errors raised by the term model and graph utilities
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Malformed RDF collection at {0}")]
    MalformedList(String),

    #[error("Cyclic RDF collection at {0}")]
    CyclicList(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
