//! Node arena types: alpha (single pattern) and beta (join) nodes, and the
//! tokens that flow between them

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use mimizuku_core::{Binding, Term, Triple, Variable};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AlphaId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BetaId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductionId(pub usize);

impl fmt::Display for AlphaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}

impl fmt::Display for BetaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

impl fmt::Display for ProductionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Which memory of a beta node an alpha edge feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

/// One position of an [`AlphaKey`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyTerm {
    Ground(Term),
    /// Variable, numbered by first occurrence inside the pattern
    Slot(u8),
}

/// Structural shape of a pattern: ground terms kept, variables replaced by
/// their first-occurrence index. `(?x p ?y)` and `(?a p ?b)` share a key,
/// `(?x p ?x)` does not.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlphaKey([KeyTerm; 3]);

impl AlphaKey {
    pub fn of(pattern: &Triple) -> Self {
        let mut seen: SmallVec<[&Variable; 3]> = SmallVec::new();
        AlphaKey(pattern.terms().map(|term| match term {
            Term::Variable(v) => match seen.iter().position(|s| *s == v) {
                Some(i) => KeyTerm::Slot(i as u8),
                None => {
                    seen.push(v);
                    KeyTerm::Slot((seen.len() - 1) as u8)
                }
            },
            other => KeyTerm::Ground(other.clone()),
        }))
    }

    /// Constant positions equal, repeated slots bound to equal terms
    pub fn matches(&self, fact: &Triple) -> bool {
        let terms = fact.terms();
        let mut slots: SmallVec<[&Term; 3]> = SmallVec::new();
        for (key, term) in self.0.iter().zip(terms) {
            match key {
                KeyTerm::Ground(expected) => {
                    if expected != term {
                        return false;
                    }
                }
                KeyTerm::Slot(i) => match slots.get(*i as usize) {
                    Some(bound) => {
                        if *bound != term {
                            return false;
                        }
                    }
                    None => slots.push(term),
                },
            }
        }
        true
    }

    pub fn predicate(&self) -> Option<&Term> {
        match &self.0[1] {
            KeyTerm::Ground(t) => Some(t),
            KeyTerm::Slot(_) => None,
        }
    }
}

/// Edge from an alpha node into a beta memory. The pattern is the one the
/// attaching rule wrote, so bindings use that rule's variable names.
#[derive(Debug, Clone)]
pub struct AlphaEdge {
    pub beta: BetaId,
    pub side: Side,
    pub pattern: Triple,
}

#[derive(Debug, Clone)]
pub struct AlphaNode {
    pub id: AlphaId,
    pub key: AlphaKey,
    /// Pattern of the first rule that created the node
    pub pattern: Triple,
    pub successors: Vec<AlphaEdge>,
    pub activations: u64,
}

/// A fact that passed an alpha test, with the binding that test produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub triple: Triple,
    pub binding: Binding,
}

/// Accumulated partial match: supporting facts plus merged bindings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialInstantiation {
    pub support: Vec<Triple>,
    pub binding: Binding,
}

impl PartialInstantiation {
    pub fn from_token(token: Token) -> Self {
        Self { support: vec![token.triple], binding: token.binding }
    }

    /// Natural join with a right token; `None` when the bindings disagree
    pub fn join(&self, token: &Token) -> Option<Self> {
        let binding = self.binding.merge(&token.binding)?;
        let mut support = self.support.clone();
        support.push(token.triple.clone());
        Some(Self { support, binding })
    }
}

/// A built-in predicate evaluated against the left binding
#[derive(Debug, Clone)]
pub struct BuiltinTest {
    pub predicate: String,
    pub pattern: Triple,
}

/// What feeds the right side of a beta node
#[derive(Debug, Clone)]
pub enum RightInput {
    /// Single-pattern pass-through: the left alpha node is the only operand
    PassThrough,
    Alpha(AlphaId),
    Builtin(BuiltinTest),
}

/// What feeds the left side of a beta node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeftInput {
    Alpha(AlphaId),
    Beta(BetaId),
}

type JoinKey = Vec<Term>;

#[derive(Debug, Clone)]
pub struct BetaNode {
    pub id: BetaId,
    pub left: LeftInput,
    pub right: RightInput,
    /// Variables shared by both inputs; memories are hashed on their values
    pub join_vars: Vec<Variable>,
    /// Variables bound by every instantiation this node emits
    pub output_vars: BTreeSet<Variable>,
    pub left_memory: HashMap<JoinKey, Vec<PartialInstantiation>>,
    pub right_memory: HashMap<JoinKey, Vec<Token>>,
    pub successors: Vec<BetaId>,
    pub productions: Vec<ProductionId>,
    pub activations: u64,
}

impl BetaNode {
    pub fn new(id: BetaId, left: LeftInput, right: RightInput, join_vars: Vec<Variable>, output_vars: BTreeSet<Variable>) -> Self {
        Self {
            id,
            left,
            right,
            join_vars,
            output_vars,
            left_memory: HashMap::new(),
            right_memory: HashMap::new(),
            successors: Vec::new(),
            productions: Vec::new(),
            activations: 0,
        }
    }

    pub fn is_pass_through(&self) -> bool {
        matches!(self.right, RightInput::PassThrough)
    }

    pub fn is_terminal(&self) -> bool {
        !self.productions.is_empty()
    }

    /// Store a left instantiation; returns the right tokens it joins with
    pub fn insert_left(&mut self, pi: PartialInstantiation) -> Vec<PartialInstantiation> {
        let Some(key) = pi.binding.key_for(&self.join_vars) else {
            return Vec::new();
        };
        let joined = self
            .right_memory
            .get(&key)
            .map(|tokens| tokens.iter().filter_map(|t| pi.join(t)).collect())
            .unwrap_or_default();
        self.left_memory.entry(key).or_default().push(pi);
        joined
    }

    /// Store a right token; returns the left instantiations it joins with
    pub fn insert_right(&mut self, token: Token) -> Vec<PartialInstantiation> {
        let Some(key) = token.binding.key_for(&self.join_vars) else {
            return Vec::new();
        };
        let joined = self
            .left_memory
            .get(&key)
            .map(|pis| pis.iter().filter_map(|pi| pi.join(&token)).collect())
            .unwrap_or_default();
        self.right_memory.entry(key).or_default().push(token);
        joined
    }

    pub fn left_len(&self) -> usize {
        self.left_memory.values().map(Vec::len).sum()
    }

    pub fn right_len(&self) -> usize {
        self.right_memory.values().map(Vec::len).sum()
    }

    pub fn clear_memories(&mut self) {
        self.left_memory.clear();
        self.right_memory.clear();
        self.activations = 0;
    }
}

/// One step of a compiled rule body, in evaluation order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlanStep {
    Pattern(Triple),
    Builtin(Triple),
}

impl PlanStep {
    pub fn triple(&self) -> &Triple {
        match self {
            PlanStep::Pattern(t) | PlanStep::Builtin(t) => t,
        }
    }
}
