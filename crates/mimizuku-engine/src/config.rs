use mimizuku_rete::NetworkOptions;
use serde::{Deserialize, Serialize};

use crate::EngineError;

/// 推論エンジン設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Compile OWL axioms of loaded ontologies into rules
    pub enable_dlp: bool,
    /// Add the fixed OWL semantics supplement when an ontology is loaded
    pub enable_non_horn_semantics: bool,
    /// Register the math/string/log built-in predicates
    pub standard_builtins: bool,
    pub record_provenance: bool,
    pub record_alternate_justifications: bool,
    /// Feed the ontology's own triples as facts during closure computation
    pub feed_ontology_triples: bool,
    /// Label prefix for minted blank nodes
    pub blank_prefix: Option<String>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            enable_dlp: true,
            enable_non_horn_semantics: true,
            standard_builtins: true,
            record_provenance: true,
            record_alternate_justifications: true,
            feed_ontology_triples: true,
            blank_prefix: None,
        }
    }
}

impl EngineOptions {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn network_options(&self) -> NetworkOptions {
        NetworkOptions {
            record_provenance: self.record_provenance,
            record_alternate_justifications: self.record_alternate_justifications,
            blank_prefix: self.blank_prefix.clone(),
        }
    }
}
