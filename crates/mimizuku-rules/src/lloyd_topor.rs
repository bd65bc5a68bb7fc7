//! Lloyd-Topor normalisation of general clauses into pure Horn rules
//!
//! Rewrites, applied from an explicit worklist until every item has an
//! atomic (or existentially quantified conjunctive) head:
//!
//! - `(H ∧ H') :- B`  becomes `H :- B` and `H' :- B`
//! - `(H :- H') :- B` becomes `H :- B ∧ H'`
//! - `H :- (B ∨ B')`  becomes `H :- B` and `H :- B'`
//!
//! A disjunction left in the head cannot be expressed in Horn form; such
//! clauses are dropped with a [`Diagnostic`]. So are bodies containing more
//! than one (flattened) disjunction, empty disjunctions, and body alternatives
//! that reduce to no atoms at all.

use std::collections::VecDeque;

use mimizuku_core::Triple;
use tracing::{debug, warn};

use crate::clause::{Clause, Formula, HornRule};
use crate::Diagnostic;

/// Output of normalisation: the Horn rules produced and the derivations skipped
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub rules: Vec<HornRule>,
    pub dropped: Vec<Diagnostic>,
}

impl Normalized {
    pub fn merge(&mut self, other: Normalized) {
        self.rules.extend(other.rules);
        self.dropped.extend(other.dropped);
    }
}

struct WorkItem {
    head: Formula,
    body: Formula,
}

/// Normalise one clause
pub fn normalize(clause: &Clause) -> Normalized {
    let mut out = Normalized::default();
    let mut worklist = VecDeque::from([WorkItem { head: clause.head.clone(), body: clause.body.clone() }]);
    let mut emitted = 0usize;

    while let Some(WorkItem { head, body }) = worklist.pop_front() {
        let head_atoms = match head {
            Formula::And(parts) => {
                worklist.extend(parts.into_iter().map(|part| WorkItem { head: part, body: body.clone() }));
                continue;
            }
            Formula::Implies { body: inner_body, head: inner_head } => {
                let body = Formula::and(vec![body, *inner_body]);
                worklist.push_back(WorkItem { head: *inner_head, body });
                continue;
            }
            Formula::Or(_) => {
                drop_clause(&mut out, clause, format!("disjunction in head: {}", head));
                continue;
            }
            Formula::Exists(_, inner) => match conjunctive_atoms(&inner) {
                Some(atoms) => atoms,
                None => {
                    drop_clause(&mut out, clause, format!("existential head is not a conjunction of atoms: {}", inner));
                    continue;
                }
            },
            Formula::Atom(triple) => vec![triple],
        };

        let disjunctions = count_disjunctions(&body, false);
        if disjunctions > 1 {
            drop_clause(&mut out, clause, format!("{} disjunctions in body", disjunctions));
            continue;
        }

        let alternatives = match body_alternatives(&body) {
            Ok(alternatives) => alternatives,
            Err(message) => {
                drop_clause(&mut out, clause, message);
                continue;
            }
        };

        if alternatives.is_empty() {
            drop_clause(&mut out, clause, format!("body can never hold: {}", body));
            continue;
        }

        for body_atoms in alternatives {
            // only a clause written with an empty body is a universal truth
            if body_atoms.is_empty() && !clause.body.is_empty_conjunction() {
                drop_clause(&mut out, clause, format!("body alternative of {} is always true", body));
                continue;
            }
            let label = if emitted == 0 { clause.label.clone() } else { format!("{}#{}", clause.label, emitted) };
            emitted += 1;
            let rule = HornRule::new(label, body_atoms, head_atoms.clone());
            debug!(rule = %rule, "normalized clause");
            out.rules.push(rule);
        }
    }

    out
}

/// Normalise every clause, collecting all rules and diagnostics
pub fn normalize_all<'a, I: IntoIterator<Item = &'a Clause>>(clauses: I) -> Normalized {
    let mut out = Normalized::default();
    for clause in clauses {
        out.merge(normalize(clause));
    }
    out
}

fn drop_clause(out: &mut Normalized, clause: &Clause, message: String) {
    warn!(clause = %clause.label, "{}", message);
    out.dropped.push(Diagnostic::new(clause.label.clone(), message));
}

/// Flatten a head formula made only of atoms and conjunctions
fn conjunctive_atoms(formula: &Formula) -> Option<Vec<Triple>> {
    match formula {
        Formula::Atom(t) => Some(vec![t.clone()]),
        Formula::And(parts) => {
            let mut atoms = Vec::new();
            for part in parts {
                atoms.extend(conjunctive_atoms(part)?);
            }
            Some(atoms)
        }
        Formula::Exists(_, inner) => conjunctive_atoms(inner),
        Formula::Or(_) | Formula::Implies { .. } => None,
    }
}

/// Disjunctions after merging directly nested `Or`s into their parent
fn count_disjunctions(formula: &Formula, parent_is_or: bool) -> usize {
    match formula {
        Formula::Atom(_) => 0,
        Formula::Or(parts) => {
            let own = usize::from(!parent_is_or);
            own + parts.iter().map(|p| count_disjunctions(p, true)).sum::<usize>()
        }
        Formula::And(parts) => parts.iter().map(|p| count_disjunctions(p, false)).sum(),
        Formula::Exists(_, inner) => count_disjunctions(inner, parent_is_or),
        Formula::Implies { body, head } => count_disjunctions(body, false) + count_disjunctions(head, false),
    }
}

/// Expand a body into its conjunctive alternatives
fn body_alternatives(formula: &Formula) -> Result<Vec<Vec<Triple>>, String> {
    match formula {
        Formula::Atom(t) => Ok(vec![vec![t.clone()]]),
        Formula::And(parts) => {
            let mut acc: Vec<Vec<Triple>> = vec![Vec::new()];
            for part in parts {
                let options = body_alternatives(part)?;
                let mut next = Vec::with_capacity(acc.len() * options.len());
                for prefix in &acc {
                    for option in &options {
                        let mut combined = prefix.clone();
                        combined.extend(option.iter().cloned());
                        next.push(combined);
                    }
                }
                acc = next;
            }
            Ok(acc)
        }
        Formula::Or(parts) => {
            let mut acc = Vec::new();
            for part in parts {
                acc.extend(body_alternatives(part)?);
            }
            Ok(acc)
        }
        Formula::Exists(_, inner) => body_alternatives(inner),
        Formula::Implies { .. } => Err(format!("implication in body: {}", formula)),
    }
}
