//! Rule compilation: body planning, alpha sharing and beta chain construction

use std::collections::BTreeSet;

use itertools::Itertools;
use mimizuku_core::{Term, Triple, Variable};
use mimizuku_rules::{Diagnostic, HornRule};
use tracing::{debug, info, warn};

use crate::network::Network;
use crate::node::{
    AlphaEdge, AlphaId, AlphaKey, AlphaNode, BetaId, BetaNode, BuiltinTest, LeftInput, PlanStep, ProductionId,
    RightInput, Side,
};
use crate::production::{Production, RuleSignature};

/// What happened to one rule handed to the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    Added(ProductionId),
    /// Same body and head as an existing production
    Duplicate(ProductionId),
    Dropped(Diagnostic),
}

/// Summary of an [`Network::add_rules`] call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub added: Vec<ProductionId>,
    pub duplicates: usize,
    pub dropped: Vec<Diagnostic>,
}

impl BuildReport {
    fn record(&mut self, outcome: RuleOutcome) {
        match outcome {
            RuleOutcome::Added(id) => self.added.push(id),
            RuleOutcome::Duplicate(_) => self.duplicates += 1,
            RuleOutcome::Dropped(diagnostic) => self.dropped.push(diagnostic),
        }
    }
}

enum Attachment {
    Alpha(AlphaId, Triple),
    Builtin(Triple),
}

impl Network {
    /// Compile one rule into the network.
    ///
    /// If facts were already fed, working memory is replayed so the new rule
    /// sees them.
    pub fn add_rule(&mut self, rule: HornRule) -> RuleOutcome {
        let outcome = self.compile(rule);
        if let RuleOutcome::Added(id) = &outcome {
            self.activate_new_productions(&[*id]);
        }
        outcome
    }

    /// Compile a batch of rules, replaying working memory at most once
    pub fn add_rules<I: IntoIterator<Item = HornRule>>(&mut self, rules: I) -> BuildReport {
        let mut report = BuildReport::default();
        for rule in rules {
            report.record(self.compile(rule));
        }
        self.activate_new_productions(&report.added);

        info!(
            added = report.added.len(),
            duplicates = report.duplicates,
            dropped = report.dropped.len(),
            alpha_nodes = self.alphas.len(),
            beta_nodes = self.betas.len(),
            "rules compiled"
        );
        report
    }

    fn activate_new_productions(&mut self, added: &[ProductionId]) {
        let (truths, conditional): (Vec<ProductionId>, Vec<ProductionId>) =
            added.iter().copied().partition(|id| self.productions[id.0].is_universal_truth());

        if !conditional.is_empty() && !self.working_memory().is_empty() {
            self.replay();
        }
        self.assert_universal_truths(&truths);
    }

    fn compile(&mut self, rule: HornRule) -> RuleOutcome {
        if rule.head.is_empty() {
            warn!(rule = %rule.label, "rule has an empty head, dropped");
            return RuleOutcome::Dropped(Diagnostic::new(&rule.label, "rule has an empty head"));
        }

        let plan = match self.plan(&rule) {
            Ok(plan) => plan,
            Err(message) => {
                warn!(rule = %rule.label, reason = %message, "rule dropped");
                return RuleOutcome::Dropped(Diagnostic::new(&rule.label, message));
            }
        };

        let signature = RuleSignature::of(&rule);
        if let Some(&existing) = self.terminal_index.get(&signature) {
            debug!(rule = %rule.label, production = %existing, "duplicate rule, sharing production");
            return RuleOutcome::Duplicate(existing);
        }

        let terminal = if plan.is_empty() {
            None
        } else {
            match self.attach_beta_nodes(&plan) {
                Some(beta) => Some(beta),
                None => {
                    let message = "rule body starts with a built-in";
                    warn!(rule = %rule.label, reason = message, "rule dropped");
                    return RuleOutcome::Dropped(Diagnostic::new(&rule.label, message));
                }
            }
        };

        let id = ProductionId(self.productions.len());
        match terminal {
            Some(beta) => self.betas[beta.0].productions.push(id),
            None => self.universal_truths.push(id),
        }
        debug!(rule = %rule.label, production = %id, terminal = ?terminal, "production added");

        self.productions.push(Production { id, label: rule.label.clone(), rule, terminal, fired: 0 });
        self.terminal_index.insert(signature, id);
        RuleOutcome::Added(id)
    }

    /// Order the body for evaluation.
    ///
    /// Patterns keep their declared order. A built-in is placed right after
    /// the pattern that binds the last of its variables; ground built-ins are
    /// decided here and never reach the network.
    fn plan(&self, rule: &HornRule) -> Result<Vec<PlanStep>, String> {
        let mut plan = Vec::with_capacity(rule.body.len());
        let mut bound: BTreeSet<&Variable> = BTreeSet::new();
        let mut pending: Vec<&Triple> = Vec::new();

        for atom in &rule.body {
            if let Some(predicate) = self.builtin_predicate(atom) {
                if !atom.has_variables() {
                    if self.builtins.evaluate(predicate, &atom.subject, &atom.object) {
                        continue;
                    }
                    return Err(format!("built-in {} never holds", atom));
                }
                if atom.variables().all(|v| bound.contains(v)) {
                    plan.push(PlanStep::Builtin(atom.clone()));
                } else {
                    pending.push(atom);
                }
                continue;
            }

            plan.push(PlanStep::Pattern(atom.clone()));
            bound.extend(atom.variables());

            let (ready, waiting): (Vec<&Triple>, Vec<&Triple>) = pending
                .into_iter()
                .partition(|b| b.variables().all(|v| bound.contains(v)));
            plan.extend(ready.into_iter().cloned().map(PlanStep::Builtin));
            pending = waiting;
        }

        match pending.first() {
            Some(builtin) => Err(format!("built-in {} uses variables no body pattern binds", builtin)),
            None => Ok(plan),
        }
    }

    fn builtin_predicate<'t>(&self, atom: &'t Triple) -> Option<&'t str> {
        match &atom.predicate {
            Term::Iri(iri) if self.builtins.is_builtin(iri.as_str()) => Some(iri.as_str()),
            _ => None,
        }
    }

    fn alpha_for(&mut self, pattern: &Triple) -> AlphaId {
        let key = AlphaKey::of(pattern);
        if let Some(&id) = self.alpha_index.get(&key) {
            debug!(alpha = %id, pattern = %pattern, "reusing alpha node");
            return id;
        }

        let id = AlphaId(self.alphas.len());
        match key.predicate() {
            Some(predicate) => self.predicate_index.entry(predicate.clone()).or_default().push(id),
            None => self.wildcard_alphas.push(id),
        }
        self.alphas.push(AlphaNode {
            id,
            key: key.clone(),
            pattern: pattern.clone(),
            successors: Vec::new(),
            activations: 0,
        });
        self.alpha_index.insert(key, id);
        id
    }

    /// Build the left-deep beta chain for `plan`, reusing the longest prefix
    /// some earlier rule already compiled. Returns the terminal node.
    fn attach_beta_nodes(&mut self, plan: &[PlanStep]) -> Option<BetaId> {
        let (start, mut current) = (1..=plan.len())
            .rev()
            .find_map(|k| self.prefix_index.get(&plan[..k]).map(|&beta| (k, Some(beta))))
            .unwrap_or((0, None));
        if let Some(beta) = current {
            debug!(beta = %beta, shared_steps = start, "reusing beta prefix");
        }

        let attachments: Vec<Attachment> = plan[start..]
            .iter()
            .map(|step| match step {
                PlanStep::Pattern(pattern) => Attachment::Alpha(self.alpha_for(pattern), pattern.clone()),
                PlanStep::Builtin(builtin) => Attachment::Builtin(builtin.clone()),
            })
            .collect();

        let mut bound: BTreeSet<Variable> = plan[..start]
            .iter()
            .filter_map(|step| match step {
                PlanStep::Pattern(pattern) => Some(pattern.variables()),
                PlanStep::Builtin(_) => None,
            })
            .flatten()
            .cloned()
            .collect();

        for (offset, attachment) in attachments.into_iter().enumerate() {
            let id = BetaId(self.betas.len());
            let node = match (current, attachment) {
                (None, Attachment::Alpha(alpha, pattern)) => {
                    let output: BTreeSet<Variable> = pattern.variables().cloned().collect();
                    self.alphas[alpha.0].successors.push(AlphaEdge { beta: id, side: Side::Left, pattern });
                    BetaNode::new(id, LeftInput::Alpha(alpha), RightInput::PassThrough, Vec::new(), output)
                }
                (Some(parent), Attachment::Alpha(alpha, pattern)) => {
                    let own: BTreeSet<Variable> = pattern.variables().cloned().collect();
                    let join_vars = own.intersection(&bound).cloned().sorted().collect();
                    let output = own.union(&bound).cloned().collect();
                    self.alphas[alpha.0].successors.push(AlphaEdge { beta: id, side: Side::Right, pattern });
                    self.betas[parent.0].successors.push(id);
                    BetaNode::new(id, LeftInput::Beta(parent), RightInput::Alpha(alpha), join_vars, output)
                }
                (Some(parent), Attachment::Builtin(pattern)) => {
                    let predicate = match &pattern.predicate {
                        Term::Iri(iri) => iri.as_str().to_string(),
                        other => other.to_string(),
                    };
                    self.betas[parent.0].successors.push(id);
                    let test = BuiltinTest { predicate, pattern };
                    BetaNode::new(id, LeftInput::Beta(parent), RightInput::Builtin(test), Vec::new(), bound.clone())
                }
                (None, Attachment::Builtin(_)) => return None,
            };

            bound.extend(node.output_vars.iter().cloned());
            self.betas.push(node);
            self.prefix_index.insert(plan[..start + offset + 1].to_vec(), id);
            current = Some(id);
        }

        current
    }
}
