//! Rule and clause model
//!
//! [`Formula`] is the general shape produced by the OWL compiler before
//! normalisation; [`HornRule`] is the flat form the network builder consumes.

use itertools::Itertools;
use mimizuku_core::{vocabulary, Term, Triple, Variable};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::RuleError;

/// Condition / conclusion tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Formula {
    Atom(Triple),
    And(Vec<Formula>),
    Or(Vec<Formula>),
    Exists(Vec<Variable>, Box<Formula>),
    /// Nested implication; only meaningful in head position
    Implies { body: Box<Formula>, head: Box<Formula> },
}

impl Formula {
    pub fn atom(subject: Term, predicate: Term, object: Term) -> Self {
        Formula::Atom(Triple::new(subject, predicate, object))
    }

    /// `rdf:type` test for a named class
    pub fn class_atom(individual: Term, class: Term) -> Self {
        Formula::atom(individual, vocabulary::rdf_type(), class)
    }

    /// Conjunction, collapsing the single-element case
    pub fn and(mut parts: Vec<Formula>) -> Self {
        if parts.len() == 1 {
            parts.remove(0)
        } else {
            Formula::And(parts)
        }
    }

    /// Disjunction, collapsing the single-element case
    pub fn or(mut parts: Vec<Formula>) -> Self {
        if parts.len() == 1 {
            parts.remove(0)
        } else {
            Formula::Or(parts)
        }
    }

    pub fn is_empty_conjunction(&self) -> bool {
        matches!(self, Formula::And(parts) if parts.is_empty())
    }

    /// Every atom in the tree, in document order
    pub fn atoms(&self) -> Vec<&Triple> {
        let mut atoms = Vec::new();
        let mut stack = vec![self];
        while let Some(formula) = stack.pop() {
            match formula {
                Formula::Atom(t) => atoms.push(t),
                Formula::And(parts) | Formula::Or(parts) => stack.extend(parts.iter().rev()),
                Formula::Exists(_, inner) => stack.push(inner),
                Formula::Implies { body, head } => {
                    stack.push(head);
                    stack.push(body);
                }
            }
        }
        atoms
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::Atom(t) => write!(f, "{} {} {}", t.subject, t.predicate, t.object),
            Formula::And(parts) => write!(f, "And({})", parts.iter().join(", ")),
            Formula::Or(parts) => write!(f, "Or({})", parts.iter().join(", ")),
            Formula::Exists(vars, inner) => write!(f, "Exists {} ({})", vars.iter().join(" "), inner),
            Formula::Implies { body, head } => write!(f, "({} :- {})", head, body),
        }
    }
}

/// `head :- body` before Lloyd-Topor normalisation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    pub label: String,
    pub head: Formula,
    pub body: Formula,
}

impl Clause {
    pub fn new<S: Into<String>>(label: S, head: Formula, body: Formula) -> Self {
        Self { label: label.into(), head, body }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :- {}", self.head, self.body)
    }
}

/// Pure Horn rule: a conjunctive body of triple patterns (built-in
/// invocations included) and a conjunctive head.
///
/// Blank nodes never survive construction: they become variables, and the
/// head variables that do not occur in the body are recorded as existentials.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HornRule {
    pub label: String,
    pub body: Vec<Triple>,
    pub head: Vec<Triple>,
    #[serde(default)]
    pub existentials: Vec<Variable>,
}

impl HornRule {
    pub fn new<S: Into<String>>(label: S, body: Vec<Triple>, head: Vec<Triple>) -> Self {
        let body: Vec<Triple> = body.iter().map(blanks_to_variables).collect();
        let head: Vec<Triple> = head.iter().map(blanks_to_variables).collect();
        let body_vars: BTreeSet<&Variable> = body.iter().flat_map(Triple::variables).collect();
        let existentials = head
            .iter()
            .flat_map(Triple::variables)
            .filter(|v| !body_vars.contains(v))
            .unique()
            .cloned()
            .collect();

        Self { label: label.into(), body, head, existentials }
    }

    /// Re-derive blank handling and existentials, e.g. after deserialising
    /// a rule whose `existentials` field was omitted or stale
    pub fn normalized(self) -> Self {
        HornRule::new(self.label, self.body, self.head)
    }

    /// Empty-body rule: its head holds unconditionally
    pub fn is_universal_truth(&self) -> bool {
        self.body.is_empty()
    }

    pub fn body_variables(&self) -> BTreeSet<&Variable> {
        self.body.iter().flat_map(Triple::variables).collect()
    }

    pub fn head_variables(&self) -> BTreeSet<&Variable> {
        self.head.iter().flat_map(Triple::variables).collect()
    }

    pub fn is_existential(&self, variable: &Variable) -> bool {
        self.existentials.contains(variable)
    }
}

impl fmt::Display for HornRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let render = |triples: &[Triple]| {
            triples
                .iter()
                .map(|t| format!("{} {} {}", t.subject, t.predicate, t.object))
                .join(" . ")
        };
        write!(f, "{{ {} }} => {{ {} }}", render(&self.body), render(&self.head))
    }
}

fn blanks_to_variables(triple: &Triple) -> Triple {
    let convert = |term: &Term| match term {
        Term::Blank(b) => Term::Variable(Variable::new(format!("_{}", b.0))),
        other => other.clone(),
    };
    Triple::new(convert(&triple.subject), convert(&triple.predicate), convert(&triple.object))
}

/// A parsed rule document: rules, ground facts and the prefixes in scope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ruleset {
    #[serde(default)]
    pub prefixes: BTreeMap<String, String>,
    #[serde(default)]
    pub rules: Vec<HornRule>,
    #[serde(default)]
    pub facts: Vec<Triple>,
}

impl Ruleset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load pre-parsed clauses from JSON
    pub fn from_json(json: &str) -> Result<Self, RuleError> {
        let mut ruleset: Ruleset = serde_json::from_str(json)?;
        ruleset.rules = ruleset.rules.into_iter().map(HornRule::normalized).collect();
        if let Some(fact) = ruleset.facts.iter().find(|t| t.has_variables()) {
            return Err(RuleError::InvalidRule(format!("fact contains variables: {}", fact)));
        }
        Ok(ruleset)
    }

    pub fn to_json(&self) -> Result<String, RuleError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn extend(&mut self, other: Ruleset) {
        self.prefixes.extend(other.prefixes);
        self.rules.extend(other.rules);
        self.facts.extend(other.facts);
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.facts.is_empty()
    }
}
