//! The RETE network: node arena, working memory and token propagation
//!
//! Propagation never recurses. Alpha matches, join activations and rule
//! firings are pushed onto one agenda stack and drained until it is empty,
//! which processes every consequence of a fact before the next top-level
//! fact is looked at.

use std::collections::HashMap;

use chrono::Utc;
use mimizuku_core::{Binding, Graph, Term, Triple, TripleSource};
use mimizuku_rules::BuiltinRegistry;
use tracing::{debug, info, trace, warn};

use crate::cancel::CancellationFlag;
use crate::node::{
    AlphaId, AlphaKey, AlphaNode, BetaId, BetaNode, BuiltinTest, PartialInstantiation, PlanStep, ProductionId,
    RightInput, Side, Token,
};
use crate::options::NetworkOptions;
use crate::production::{Production, RuleSignature, SkolemTable};
use crate::provenance::{Justification, ProvenanceMap};
use crate::stats::NetworkStats;
use crate::ReteError;

#[derive(Debug)]
enum Activation {
    Fact(Triple),
    Left(BetaId, PartialInstantiation),
    Right(BetaId, Token),
    Fire(ProductionId, PartialInstantiation),
}

/// Outcome of one [`Network::feed`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedReport {
    /// Facts newly added to working memory
    pub asserted: usize,
    /// Facts already present, ignored
    pub skipped: usize,
    /// Triples inferred while processing this batch
    pub inferred: usize,
}

pub struct Network {
    pub(crate) options: NetworkOptions,
    pub(crate) builtins: BuiltinRegistry,

    pub(crate) alphas: Vec<AlphaNode>,
    pub(crate) betas: Vec<BetaNode>,
    pub(crate) productions: Vec<Production>,

    pub(crate) alpha_index: HashMap<AlphaKey, AlphaId>,
    /// Ground predicate -> alpha nodes testing it
    pub(crate) predicate_index: HashMap<Term, Vec<AlphaId>>,
    /// Alpha nodes whose predicate is a variable
    pub(crate) wildcard_alphas: Vec<AlphaId>,
    /// Ordered body prefix -> beta node covering it
    pub(crate) prefix_index: HashMap<Vec<PlanStep>, BetaId>,
    pub(crate) terminal_index: HashMap<RuleSignature, ProductionId>,
    pub(crate) universal_truths: Vec<ProductionId>,

    working_memory: Graph,
    inferred: Graph,
    provenance: ProvenanceMap,
    skolem: SkolemTable,
    agenda: Vec<Activation>,
    cancellation: CancellationFlag,

    firings: u64,
    discarded_heads: u64,
}

impl Network {
    pub fn new(builtins: BuiltinRegistry) -> Self {
        Self::with_options(builtins, NetworkOptions::default())
    }

    pub fn with_options(builtins: BuiltinRegistry, options: NetworkOptions) -> Self {
        let skolem = SkolemTable::new(options.blank_prefix.clone());
        Self {
            options,
            builtins,
            alphas: Vec::new(),
            betas: Vec::new(),
            productions: Vec::new(),
            alpha_index: HashMap::new(),
            predicate_index: HashMap::new(),
            wildcard_alphas: Vec::new(),
            prefix_index: HashMap::new(),
            terminal_index: HashMap::new(),
            universal_truths: Vec::new(),
            working_memory: Graph::new(),
            inferred: Graph::new(),
            provenance: ProvenanceMap::new(),
            skolem,
            agenda: Vec::new(),
            cancellation: CancellationFlag::new(),
            firings: 0,
            discarded_heads: 0,
        }
    }

    pub fn options(&self) -> &NetworkOptions {
        &self.options
    }

    pub fn builtins(&self) -> &BuiltinRegistry {
        &self.builtins
    }

    /// Flag checked between top-level facts of every feed
    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancellation.clone()
    }

    pub fn set_cancellation_flag(&mut self, flag: CancellationFlag) {
        self.cancellation = flag;
    }

    /// Asserted and inferred triples
    pub fn working_memory(&self) -> &Graph {
        &self.working_memory
    }

    /// Triples produced by firing only
    pub fn inferred(&self) -> &Graph {
        &self.inferred
    }

    pub fn provenance(&self) -> &ProvenanceMap {
        &self.provenance
    }

    pub fn alpha_nodes(&self) -> &[AlphaNode] {
        &self.alphas
    }

    pub fn beta_nodes(&self) -> &[BetaNode] {
        &self.betas
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, id: ProductionId) -> Option<&Production> {
        self.productions.get(id.0)
    }

    /// Feed ground facts in order, running each to fixpoint before the next.
    ///
    /// The whole batch is rejected up front if any fact holds a variable.
    pub fn feed<I: IntoIterator<Item = Triple>>(&mut self, facts: I) -> Result<FeedReport, ReteError> {
        let facts: Vec<Triple> = facts.into_iter().collect();
        if let Some(bad) = facts.iter().find(|t| t.has_variables()) {
            return Err(ReteError::NonGroundFact(bad.clone()));
        }

        let total = facts.len();
        let inferred_before = self.inferred.len();
        let mut report = FeedReport::default();

        for (processed, fact) in facts.into_iter().enumerate() {
            if self.cancellation.is_cancelled() {
                warn!(processed, total, "feed cancelled");
                return Err(ReteError::Cancelled { processed, total });
            }
            if !self.working_memory.insert(fact.clone()) {
                report.skipped += 1;
                continue;
            }
            report.asserted += 1;
            self.agenda.push(Activation::Fact(fact));
            self.run_agenda();
        }

        report.inferred = self.inferred.len() - inferred_before;
        info!(
            asserted = report.asserted,
            skipped = report.skipped,
            inferred = report.inferred,
            "fixpoint reached"
        );
        Ok(report)
    }

    /// Feed a single fact; `Ok(false)` if it was already known
    pub fn feed_fact(&mut self, fact: Triple) -> Result<bool, ReteError> {
        Ok(self.feed(std::iter::once(fact))?.asserted == 1)
    }

    /// Empty every memory and fact store, keeping the compiled network.
    /// Empty-body rules are asserted again.
    pub fn reset(&mut self) {
        for node in &mut self.betas {
            node.clear_memories();
        }
        for alpha in &mut self.alphas {
            alpha.activations = 0;
        }
        for production in &mut self.productions {
            production.fired = 0;
        }
        self.working_memory.clear();
        self.inferred.clear();
        self.provenance.clear();
        self.skolem.clear();
        self.agenda.clear();
        self.firings = 0;
        self.discarded_heads = 0;
        debug!("network reset");

        let truths = self.universal_truths.clone();
        self.assert_universal_truths(&truths);
    }

    pub fn stats(&self) -> NetworkStats {
        NetworkStats {
            rules: self.productions.len(),
            alpha_nodes: self.alphas.len(),
            beta_nodes: self.betas.len(),
            terminal_nodes: self.betas.iter().filter(|b| b.is_terminal()).count(),
            working_memory: self.working_memory.len(),
            inferred: self.inferred.len(),
            left_memory: self.betas.iter().map(BetaNode::left_len).sum(),
            right_memory: self.betas.iter().map(BetaNode::right_len).sum(),
            firings: self.firings,
            discarded_heads: self.discarded_heads,
            minted_blanks: self.skolem.len(),
        }
    }

    /// Re-propagate all of working memory after the network grew
    pub(crate) fn replay(&mut self) {
        for node in &mut self.betas {
            node.clear_memories();
        }
        let facts: Vec<Triple> = self.working_memory.iter().cloned().collect();
        debug!(facts = facts.len(), "replaying working memory");
        for fact in facts {
            self.agenda.push(Activation::Fact(fact));
            self.run_agenda();
        }
    }

    pub(crate) fn assert_universal_truths(&mut self, productions: &[ProductionId]) {
        for &id in productions {
            self.agenda.push(Activation::Fire(id, PartialInstantiation { support: Vec::new(), binding: Binding::new() }));
            self.run_agenda();
        }
    }

    fn run_agenda(&mut self) {
        while let Some(activation) = self.agenda.pop() {
            match activation {
                Activation::Fact(fact) => self.activate_alphas(&fact),
                Activation::Left(beta, pi) => self.left_activate(beta, pi),
                Activation::Right(beta, token) => self.right_activate(beta, token),
                Activation::Fire(production, pi) => self.fire(production, pi),
            }
        }
    }

    fn activate_alphas(&mut self, fact: &Triple) {
        let mut pending = Vec::new();
        let candidates = self
            .predicate_index
            .get(&fact.predicate)
            .into_iter()
            .flatten()
            .chain(self.wildcard_alphas.iter());

        for &alpha_id in candidates {
            let alpha = &mut self.alphas[alpha_id.0];
            if !alpha.key.matches(fact) {
                continue;
            }
            alpha.activations += 1;
            trace!(alpha = %alpha_id, fact = %fact, "alpha match");

            for edge in &alpha.successors {
                let Some(binding) = Binding::from_match(&edge.pattern, fact) else {
                    continue;
                };
                let token = Token { triple: fact.clone(), binding };
                pending.push(match edge.side {
                    Side::Left => Activation::Left(edge.beta, PartialInstantiation::from_token(token)),
                    Side::Right => Activation::Right(edge.beta, token),
                });
            }
        }

        self.agenda.extend(pending.into_iter().rev());
    }

    fn left_activate(&mut self, beta: BetaId, pi: PartialInstantiation) {
        let node = &mut self.betas[beta.0];
        node.activations += 1;
        trace!(beta = %beta, binding = %pi.binding, "left activation");

        let outputs = match &node.right {
            RightInput::PassThrough => vec![pi],
            RightInput::Alpha(_) => node.insert_left(pi),
            RightInput::Builtin(test) => {
                if evaluate_builtin(&self.builtins, test, &pi.binding) {
                    vec![pi]
                } else {
                    Vec::new()
                }
            }
        };
        self.emit(beta, outputs);
    }

    fn right_activate(&mut self, beta: BetaId, token: Token) {
        let node = &mut self.betas[beta.0];
        node.activations += 1;
        trace!(beta = %beta, fact = %token.triple, "right activation");

        let outputs = node.insert_right(token);
        self.emit(beta, outputs);
    }

    fn emit(&mut self, beta: BetaId, outputs: Vec<PartialInstantiation>) {
        let node = &self.betas[beta.0];
        for pi in outputs {
            for &successor in node.successors.iter().rev() {
                self.agenda.push(Activation::Left(successor, pi.clone()));
            }
            for &production in node.productions.iter().rev() {
                self.agenda.push(Activation::Fire(production, pi.clone()));
            }
        }
    }

    fn fire(&mut self, id: ProductionId, pi: PartialInstantiation) {
        let production = &mut self.productions[id.0];
        production.fired += 1;
        self.firings += 1;

        let mut binding = pi.binding;
        if !production.rule.existentials.is_empty() {
            let memory = &self.working_memory;
            binding.extend(self.skolem.resolve(id, &pi.support, &production.rule.existentials, |blank| {
                memory.mentions(blank)
            }));
        }

        let label = production.label.clone();
        let head = production.rule.head.clone();
        for pattern in &head {
            match pattern.substitute(&binding) {
                Ok(triple) => self.assert_derived(triple, id, &label, &pi.support),
                Err(unbound) => {
                    self.discarded_heads += 1;
                    warn!(rule = %label, pattern = %pattern, ?unbound, "head pattern has unbound variables, discarded");
                }
            }
        }
    }

    fn assert_derived(&mut self, triple: Triple, production: ProductionId, rule: &str, support: &[Triple]) {
        let justification = || Justification {
            production,
            rule: rule.to_string(),
            support: support.to_vec(),
            derived_at: Utc::now(),
        };

        if self.working_memory.contains(&triple) {
            if self.options.record_provenance
                && self.options.record_alternate_justifications
                && self.inferred.contains(&triple)
            {
                self.provenance.record(&triple, justification(), true);
            }
            return;
        }

        self.working_memory.insert(triple.clone());
        self.inferred.insert(triple.clone());
        if self.options.record_provenance {
            self.provenance
                .record(&triple, justification(), self.options.record_alternate_justifications);
        }
        trace!(rule = %rule, triple = %triple, "inferred");
        self.agenda.push(Activation::Fact(triple));
    }
}

fn evaluate_builtin(builtins: &BuiltinRegistry, test: &BuiltinTest, binding: &Binding) -> bool {
    match (test.pattern.subject.resolve(binding), test.pattern.object.resolve(binding)) {
        (Some(subject), Some(object)) => builtins.evaluate(&test.predicate, &subject, &object),
        _ => false,
    }
}

impl std::fmt::Debug for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.stats())
    }
}
