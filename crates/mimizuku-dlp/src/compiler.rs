//! Axiom compiler: walks the ontology graph shape by shape and emits clauses

use mimizuku_core::vocabulary::{owl, rdf, rdfs};
use mimizuku_core::{rdf_list, Term, Triple, TripleSource};
use mimizuku_rules::{normalize_all, Clause, Diagnostic, Formula, HornRule};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::class_expr::{describe, ClassExpression, ClassExpressionReader, PropertyExpression};
use crate::context::CompilationContext;
use crate::mapping::{tb, th};
use crate::DlpError;

/// Result of compiling one ontology
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Compilation {
    /// Clauses before normalisation
    pub clauses: Vec<Clause>,
    /// Horn rules ready for the network
    pub rules: Vec<HornRule>,
    /// Axioms or derivations that were skipped
    pub diagnostics: Vec<Diagnostic>,
}

/// OWL to Horn compiler
#[derive(Debug, Clone, Copy, Default)]
pub struct DlpCompiler;

impl DlpCompiler {
    pub fn new() -> Self {
        Self
    }

    /// Compile every recognised axiom in `source`.
    ///
    /// Unsupported or malformed axioms are skipped and reported; they never
    /// stop the rest of the ontology from compiling.
    pub fn compile<S: TripleSource + ?Sized>(&self, source: &S) -> Compilation {
        let mut walker = AxiomWalker {
            source,
            reader: ClassExpressionReader::new(source),
            ctx: CompilationContext::new(),
            clauses: Vec::new(),
        };
        walker.class_axioms();
        walker.property_axioms();
        walker.unsupported_axioms();

        let AxiomWalker { ctx, clauses, .. } = walker;
        let normalized = normalize_all(&clauses);
        let mut diagnostics = ctx.into_diagnostics();
        diagnostics.extend(normalized.dropped);

        info!(
            clauses = clauses.len(),
            rules = normalized.rules.len(),
            diagnostics = diagnostics.len(),
            "ontology compiled"
        );
        Compilation { clauses, rules: normalized.rules, diagnostics }
    }
}

struct AxiomWalker<'a, S: TripleSource + ?Sized> {
    source: &'a S,
    reader: ClassExpressionReader<'a, S>,
    ctx: CompilationContext,
    clauses: Vec<Clause>,
}

fn x() -> Term {
    Term::var("x")
}

fn y() -> Term {
    Term::var("y")
}

fn z() -> Term {
    Term::var("z")
}

impl<'a, S: TripleSource + ?Sized> AxiomWalker<'a, S> {
    fn with_predicate(&self, predicate: &str) -> Vec<Triple> {
        self.source
            .triples_matching(None, Some(&Term::iri(predicate)), None)
            .into_iter()
            .cloned()
            .collect()
    }

    fn typed(&self, class: &str) -> Vec<Term> {
        self.source.subjects(&Term::iri(rdf::TYPE), &Term::iri(class))
    }

    fn attempt<F>(&mut self, label: String, f: F)
    where
        F: FnOnce(&mut Self) -> Result<Vec<Clause>, DlpError>,
    {
        match f(self) {
            Ok(clauses) => {
                for clause in clauses {
                    self.push(clause);
                }
            }
            Err(err) => self.ctx.diagnose(label, err.to_string()),
        }
    }

    fn push(&mut self, clause: Clause) {
        if clause.head.is_empty_conjunction() {
            debug!(clause = %clause.label, "nothing to conclude, skipped");
            return;
        }
        if clause.body.is_empty_conjunction() {
            self.ctx.diagnose(clause.label, "owl:Thing cannot be a Horn body");
            return;
        }
        debug!(clause = %clause, "clause emitted");
        self.clauses.push(clause);
    }

    /// `sup(x) :- sub(x)`
    fn inclusion(&mut self, label: &str, sub: &ClassExpression, sup: &ClassExpression) -> Result<Clause, DlpError> {
        let body = tb(&mut self.ctx, sub, &x())?;
        let head = th(&mut self.ctx, sup, &x())?;
        Ok(Clause::new(label, head, body))
    }

    fn class_axioms(&mut self) {
        for axiom in self.with_predicate(rdfs::SUB_CLASS_OF) {
            let label = format!("subClassOf({}, {})", describe(&axiom.subject), describe(&axiom.object));
            self.attempt(label.clone(), |w| {
                let sub = w.reader.read(&axiom.subject)?;
                let sup = w.reader.read(&axiom.object)?;
                Ok(vec![w.inclusion(&label, &sub, &sup)?])
            });
        }

        for axiom in self.with_predicate(owl::EQUIVALENT_CLASS) {
            let (a, b) = (describe(&axiom.subject), describe(&axiom.object));
            let label = format!("equivalentClass({}, {})", a, b);
            self.attempt(label, |w| {
                let left = w.reader.read(&axiom.subject)?;
                let right = w.reader.read(&axiom.object)?;
                Ok(vec![
                    w.inclusion(&format!("equivalentClass({}, {})", a, b), &left, &right)?,
                    w.inclusion(&format!("equivalentClass({}, {})", b, a), &right, &left)?,
                ])
            });
        }

        for axiom in self.with_predicate(owl::INTERSECTION_OF) {
            if axiom.subject.is_blank() {
                continue;
            }
            let label = format!("intersectionOf({})", describe(&axiom.subject));
            self.attempt(label.clone(), |w| {
                let named = ClassExpression::Named(axiom.subject.clone());
                let members = w.read_members(&axiom.object)?;
                let intersection = ClassExpression::IntersectionOf(members);
                Ok(vec![
                    w.inclusion(&label, &intersection, &named)?,
                    w.inclusion(&format!("{}:members", label), &named, &intersection)?,
                ])
            });
        }

        for axiom in self.with_predicate(owl::UNION_OF) {
            if axiom.subject.is_blank() {
                continue;
            }
            let label = format!("unionOf({})", describe(&axiom.subject));
            self.attempt(label.clone(), |w| {
                let named = ClassExpression::Named(axiom.subject.clone());
                let union = ClassExpression::UnionOf(w.read_members(&axiom.object)?);
                Ok(vec![w.inclusion(&label, &union, &named)?])
            });
        }
    }

    fn read_members(&mut self, list: &Term) -> Result<Vec<ClassExpression>, DlpError> {
        rdf_list(self.source, list)?.iter().map(|member| self.reader.read(member)).collect()
    }

    fn property_axioms(&mut self) {
        for axiom in self.with_predicate(owl::INVERSE_OF) {
            if axiom.subject.is_blank() || axiom.object.is_blank() {
                continue;
            }
            let (p, q) = (&axiom.subject, &axiom.object);
            let label = format!("inverseOf({}, {})", describe(p), describe(q));
            let forward = Clause::new(
                label.clone(),
                Formula::atom(x(), q.clone(), y()),
                Formula::atom(y(), p.clone(), x()),
            );
            let backward = Clause::new(label, Formula::atom(y(), p.clone(), x()), Formula::atom(x(), q.clone(), y()));
            self.push(forward);
            self.push(backward);
        }

        for p in self.typed(owl::TRANSITIVE_PROPERTY) {
            let clause = Clause::new(
                format!("TransitiveProperty({})", describe(&p)),
                Formula::atom(x(), p.clone(), z()),
                Formula::and(vec![Formula::atom(x(), p.clone(), y()), Formula::atom(y(), p.clone(), z())]),
            );
            self.push(clause);
        }

        for p in self.typed(owl::SYMMETRIC_PROPERTY) {
            let clause = Clause::new(
                format!("SymmetricProperty({})", describe(&p)),
                Formula::atom(y(), p.clone(), x()),
                Formula::atom(x(), p.clone(), y()),
            );
            self.push(clause);
        }

        for (predicate, name) in [(rdfs::DOMAIN, "domain"), (rdfs::RANGE, "range")] {
            for axiom in self.with_predicate(predicate) {
                let label = format!("{}({}, {})", name, describe(&axiom.subject), describe(&axiom.object));
                self.attempt(label.clone(), |w| {
                    let property = w.reader.read_property(&axiom.subject)?;
                    let class = w.reader.read(&axiom.object)?;
                    let member = if name == "domain" { x() } else { y() };
                    let head = th(&mut w.ctx, &class, &member)?;
                    Ok(vec![Clause::new(label, head, Formula::Atom(property.atom(x(), y())))])
                });
            }
        }

        for axiom in self.with_predicate(rdfs::SUB_PROPERTY_OF) {
            let label = format!("subPropertyOf({}, {})", describe(&axiom.subject), describe(&axiom.object));
            self.attempt(label.clone(), |w| {
                let sub = w.reader.read_property(&axiom.subject)?;
                let sup = w.reader.read_property(&axiom.object)?;
                Ok(vec![property_inclusion(&label, &sub, &sup)])
            });
        }

        for axiom in self.with_predicate(owl::EQUIVALENT_PROPERTY) {
            let (a, b) = (describe(&axiom.subject), describe(&axiom.object));
            self.attempt(format!("equivalentProperty({}, {})", a, b), |w| {
                let left = w.reader.read_property(&axiom.subject)?;
                let right = w.reader.read_property(&axiom.object)?;
                Ok(vec![
                    property_inclusion(&format!("equivalentProperty({}, {})", a, b), &left, &right),
                    property_inclusion(&format!("equivalentProperty({}, {})", b, a), &right, &left),
                ])
            });
        }
    }

    /// Named classes defined by constructs outside the Horn fragment
    fn unsupported_axioms(&mut self) {
        for predicate in [owl::COMPLEMENT_OF, owl::ONE_OF] {
            for axiom in self.with_predicate(predicate) {
                if axiom.subject.is_blank() {
                    continue;
                }
                self.ctx.diagnose(
                    format!("{}({})", describe(&axiom.predicate), describe(&axiom.subject)),
                    format!("{} has no Horn translation", describe(&axiom.predicate)),
                );
            }
        }
    }
}

/// `sup(x, y) :- sub(x, y)`
fn property_inclusion(label: &str, sub: &PropertyExpression, sup: &PropertyExpression) -> Clause {
    Clause::new(label, Formula::Atom(sup.atom(x(), y())), Formula::Atom(sub.atom(x(), y())))
}
