//! Variable bindings accumulated while a token travels through the network

use crate::model::{Term, Triple, Variable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Partial function from variables to terms.
///
/// A variable, once bound, never changes value: [`Binding::bind`] refuses a
/// conflicting value and [`Binding::merge`] fails when two bindings disagree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Binding {
    values: BTreeMap<Variable, Term>,
}

impl Binding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, variable: &Variable) -> Option<&Term> {
        self.values.get(variable)
    }

    pub fn contains(&self, variable: &Variable) -> bool {
        self.values.contains_key(variable)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.values.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Term)> {
        self.values.iter()
    }

    /// Bind `variable` to `value`; returns `false` if it is already bound to something else
    pub fn bind(&mut self, variable: Variable, value: Term) -> bool {
        match self.values.get(&variable) {
            Some(existing) => *existing == value,
            None => {
                self.values.insert(variable, value);
                true
            }
        }
    }

    /// Two bindings agree iff every variable present in both maps to the same term
    pub fn agrees_with(&self, other: &Binding) -> bool {
        let (small, large) = if self.len() <= other.len() { (self, other) } else { (other, self) };
        small
            .values
            .iter()
            .all(|(var, value)| large.values.get(var).map_or(true, |v| v == value))
    }

    /// Natural-join union of two bindings, or `None` when they disagree
    pub fn merge(&self, other: &Binding) -> Option<Binding> {
        if !self.agrees_with(other) {
            return None;
        }
        let mut merged = self.clone();
        for (var, value) in &other.values {
            merged.values.entry(var.clone()).or_insert_with(|| value.clone());
        }
        Some(merged)
    }

    /// Values of `variables` in order; `None` if any of them is unbound
    pub fn key_for(&self, variables: &[Variable]) -> Option<Vec<Term>> {
        variables.iter().map(|v| self.values.get(v).cloned()).collect()
    }

    /// Match a ground `fact` against `pattern`, binding the pattern's variables.
    ///
    /// Fails when a constant position differs or when a variable repeated
    /// inside the pattern would have to take two different values.
    pub fn from_match(pattern: &Triple, fact: &Triple) -> Option<Binding> {
        let mut binding = Binding::new();
        for (p, f) in pattern.terms().into_iter().zip(fact.terms()) {
            match p {
                Term::Variable(v) => {
                    if !binding.bind(v.clone(), f.clone()) {
                        return None;
                    }
                }
                constant => {
                    if constant != f {
                        return None;
                    }
                }
            }
        }
        Some(binding)
    }
}

impl FromIterator<(Variable, Term)> for Binding {
    fn from_iter<I: IntoIterator<Item = (Variable, Term)>>(iter: I) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}

impl Extend<(Variable, Term)> for Binding {
    fn extend<I: IntoIterator<Item = (Variable, Term)>>(&mut self, iter: I) {
        for (var, value) in iter {
            self.values.entry(var).or_insert(value);
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (var, value)) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} -> {}", var, value)?;
        }
        write!(f, "}}")
    }
}
