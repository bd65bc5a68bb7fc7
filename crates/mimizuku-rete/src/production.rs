//! Compiled rules (productions) and blank-node minting for existential heads

use std::collections::{BTreeSet, HashMap};

use mimizuku_core::{Term, Triple, Variable};
use mimizuku_rules::HornRule;
use uuid::Uuid;

use crate::node::{BetaId, ProductionId};

/// A rule attached to a terminal beta node
#[derive(Debug, Clone)]
pub struct Production {
    pub id: ProductionId,
    pub label: String,
    pub rule: HornRule,
    /// `None` for empty-body rules, which hold unconditionally
    pub terminal: Option<BetaId>,
    pub fired: u64,
}

impl Production {
    pub fn is_universal_truth(&self) -> bool {
        self.terminal.is_none()
    }
}

/// Order-insensitive identity of a rule: its body and head as sets.
/// Two rules with the same signature collapse onto one production.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleSignature {
    body: BTreeSet<Triple>,
    head: BTreeSet<Triple>,
}

impl RuleSignature {
    pub fn of(rule: &HornRule) -> Self {
        Self { body: rule.body.iter().cloned().collect(), head: rule.head.iter().cloned().collect() }
    }
}

/// Fresh blank identifiers for existential head variables, one per
/// variable per (production, supporting fact set)
#[derive(Debug, Clone)]
pub struct SkolemTable {
    prefix: String,
    counter: u64,
    minted: HashMap<(ProductionId, Vec<Triple>), Vec<(Variable, Term)>>,
}

impl SkolemTable {
    pub fn new(prefix: Option<String>) -> Self {
        let prefix = prefix.unwrap_or_else(|| {
            let id = Uuid::new_v4().simple().to_string();
            format!("sk{}", &id[..8])
        });
        Self { prefix, counter: 0, minted: HashMap::new() }
    }

    /// Blank terms for `existentials`, reusing earlier ones for the same support.
    ///
    /// Labels for which `in_use` holds are skipped.
    pub fn resolve<F>(
        &mut self,
        production: ProductionId,
        support: &[Triple],
        existentials: &[Variable],
        in_use: F,
    ) -> Vec<(Variable, Term)>
    where
        F: Fn(&Term) -> bool,
    {
        let mut key_support = support.to_vec();
        key_support.sort();
        key_support.dedup();

        if let Some(existing) = self.minted.get(&(production, key_support.clone())) {
            return existing.clone();
        }

        let fresh: Vec<(Variable, Term)> = existentials
            .iter()
            .map(|var| (var.clone(), self.next_blank(&in_use)))
            .collect();
        self.minted.insert((production, key_support), fresh.clone());
        fresh
    }

    fn next_blank<F: Fn(&Term) -> bool>(&mut self, in_use: &F) -> Term {
        loop {
            self.counter += 1;
            let blank = Term::blank(format!("{}_{}", self.prefix, self.counter));
            if !in_use(&blank) {
                return blank;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.minted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.minted.is_empty()
    }

    pub fn clear(&mut self) {
        self.minted.clear();
        self.counter = 0;
    }
}
