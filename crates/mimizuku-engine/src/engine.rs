//! Compile → build → feed pipeline

use std::time::Instant;

use chrono::{DateTime, Utc};
use mimizuku_core::{Graph, Triple, TripleSource};
use mimizuku_dlp::{non_horn_semantics, DlpCompiler};
use mimizuku_rete::{BuildReport, CancellationFlag, FeedReport, Network, NetworkStats};
use mimizuku_rules::{parse_n3, BuiltinRegistry, Diagnostic, HornRule, Ruleset};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::EngineOptions;
use crate::EngineError;

/// Closure computation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineResult {
    /// Every triple derived so far, sorted
    pub inferred_triples: Vec<Triple>,
    pub stats: ProcessingStats,
    /// Rules and axioms skipped since the engine was created
    pub diagnostics: Vec<Diagnostic>,
    pub completed_at: DateTime<Utc>,
}

/// Processing statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub rules: usize,
    pub triples_processed: usize,
    pub working_memory: usize,
    pub inferred: usize,
    pub execution_time_ms: u64,
    pub network: NetworkStats,
}

/// Reasoning engine that owns one RETE network
pub struct ReasoningEngine {
    options: EngineOptions,
    network: Network,
    diagnostics: Vec<Diagnostic>,
    semantics_loaded: bool,
}

impl Default for ReasoningEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReasoningEngine {
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    pub fn with_options(options: EngineOptions) -> Self {
        let builtins = if options.standard_builtins {
            BuiltinRegistry::standard()
        } else {
            BuiltinRegistry::new()
        };
        let network = Network::with_options(builtins, options.network_options());
        Self { options, network, diagnostics: Vec::new(), semantics_loaded: false }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.network.cancellation_flag()
    }

    /// Asserted plus inferred triples
    pub fn closure(&self) -> &Graph {
        self.network.working_memory()
    }

    pub fn stats(&self) -> NetworkStats {
        self.network.stats()
    }

    /// Add pre-parsed Horn rules
    pub fn load_rules<I: IntoIterator<Item = HornRule>>(&mut self, rules: I) -> BuildReport {
        let report = self.network.add_rules(rules);
        self.diagnostics.extend(report.dropped.iter().cloned());
        report
    }

    /// Add a rule set: its rules first, then its facts
    pub fn load_ruleset(&mut self, ruleset: Ruleset) -> Result<BuildReport, EngineError> {
        let report = self.load_rules(ruleset.rules);
        if !ruleset.facts.is_empty() {
            self.network.feed(ruleset.facts)?;
        }
        Ok(report)
    }

    /// Parse an N3 rule document and load it
    pub fn load_n3_rules(&mut self, document: &str) -> Result<BuildReport, EngineError> {
        let ruleset = parse_n3(document)?;
        debug!(rules = ruleset.rules.len(), facts = ruleset.facts.len(), "N3 document parsed");
        self.load_ruleset(ruleset)
    }

    /// Compile the OWL axioms of `ontology` into rules
    pub fn load_ontology<S: TripleSource + ?Sized>(&mut self, ontology: &S) -> Result<BuildReport, EngineError> {
        let mut report = BuildReport::default();

        if self.options.enable_non_horn_semantics && !self.semantics_loaded {
            let supplement = non_horn_semantics()?;
            report = self.load_rules(supplement.rules);
            self.semantics_loaded = true;
        }

        if self.options.enable_dlp {
            let compilation = DlpCompiler::new().compile(ontology);
            self.diagnostics.extend(compilation.diagnostics);
            let compiled = self.load_rules(compilation.rules);
            report.added.extend(compiled.added);
            report.duplicates += compiled.duplicates;
            report.dropped.extend(compiled.dropped);
        }

        Ok(report)
    }

    /// Feed ground facts to fixpoint
    pub fn feed<I: IntoIterator<Item = Triple>>(&mut self, facts: I) -> Result<FeedReport, EngineError> {
        Ok(self.network.feed(facts)?)
    }

    /// Load `graph` as an ontology, feed its triples and return the closure
    pub fn compute_closure(&mut self, graph: &Graph) -> Result<EngineResult, EngineError> {
        let started = Instant::now();
        self.load_ontology(graph)?;

        let processed = if self.options.feed_ontology_triples {
            self.network.feed(graph.iter().cloned())?.asserted
        } else {
            0
        };

        let result = self.result(processed, started);
        info!(
            rules = result.stats.rules,
            inferred = result.stats.inferred,
            elapsed_ms = result.stats.execution_time_ms,
            "closure computed"
        );
        Ok(result)
    }

    /// Snapshot of the current closure
    pub fn result(&self, triples_processed: usize, started: Instant) -> EngineResult {
        let network = self.network.stats();
        EngineResult {
            inferred_triples: self.network.inferred().sorted(),
            stats: ProcessingStats {
                rules: network.rules,
                triples_processed,
                working_memory: network.working_memory,
                inferred: network.inferred,
                execution_time_ms: started.elapsed().as_millis() as u64,
                network,
            },
            diagnostics: self.diagnostics.clone(),
            completed_at: Utc::now(),
        }
    }

    /// Forget all facts, keep compiled rules
    pub fn reset(&mut self) {
        self.network.reset();
    }
}
