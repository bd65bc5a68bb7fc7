//! Provenance of inferred triples

use chrono::{DateTime, Utc};
use mimizuku_core::Triple;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::node::ProductionId;

/// One derivation of a triple: the rule that fired and the facts it matched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Justification {
    pub production: ProductionId,
    /// Label of the rule behind the production
    pub rule: String,
    /// Facts matched by the rule body, in body order
    pub support: Vec<Triple>,
    pub derived_at: DateTime<Utc>,
}

/// Inferred triple -> its justifications, first derivation first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvenanceMap {
    entries: HashMap<Triple, Vec<Justification>>,
}

impl ProvenanceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a justification unless the same (production, support) pair is
    /// already known; with `keep_alternates` off only the first one is kept
    pub fn record(&mut self, triple: &Triple, justification: Justification, keep_alternates: bool) -> bool {
        let entry = self.entries.entry(triple.clone()).or_default();
        if !entry.is_empty() && !keep_alternates {
            return false;
        }
        let known = entry
            .iter()
            .any(|j| j.production == justification.production && j.support == justification.support);
        if known {
            return false;
        }
        entry.push(justification);
        true
    }

    pub fn justifications(&self, triple: &Triple) -> &[Justification] {
        self.entries.get(triple).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_inferred(&self, triple: &Triple) -> bool {
        self.entries.contains_key(triple)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Triple, &Vec<Justification>)> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
