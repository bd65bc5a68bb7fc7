use serde::{Deserialize, Serialize};

/// Network behaviour switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkOptions {
    /// Record a justification for every inferred triple
    pub record_provenance: bool,
    /// Keep every distinct justification, not only the first
    pub record_alternate_justifications: bool,
    /// Label prefix for minted blank nodes; a random one is generated when unset.
    ///
    /// Minted labels have the form `{prefix}_{n}`. A label already present in
    /// working memory is skipped, but fed blanks in that form should be avoided.
    pub blank_prefix: Option<String>,
}

impl Default for NetworkOptions {
    fn default() -> Self {
        Self {
            record_provenance: true,
            record_alternate_justifications: true,
            blank_prefix: None,
        }
    }
}
