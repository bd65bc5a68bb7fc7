//! OWL クラス式の読み込み
//!
//! Reads class and property expressions out of the RDF encoding of an
//! ontology: named classes, boolean combinations over `rdf:List`s and
//! `owl:Restriction` blank nodes.

use std::collections::HashSet;

use itertools::Itertools;
use mimizuku_core::vocabulary::{owl, rdf};
use mimizuku_core::{rdf_list, Term, Triple, TripleSource};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DlpError;

/// Property expression: a named property or the inverse of one
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyExpression {
    Named(Term),
    InverseOf(Box<PropertyExpression>),
}

impl PropertyExpression {
    /// `subject P object`, with the arguments swapped for each inversion
    pub fn atom(&self, subject: Term, object: Term) -> Triple {
        match self {
            PropertyExpression::Named(property) => Triple::new(subject, property.clone(), object),
            PropertyExpression::InverseOf(inner) => inner.atom(object, subject),
        }
    }
}

impl fmt::Display for PropertyExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyExpression::Named(p) => write!(f, "{}", describe(p)),
            PropertyExpression::InverseOf(inner) => write!(f, "inverse({})", inner),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardinalityKind {
    Min,
    Max,
    Exact,
}

/// OWL class expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassExpression {
    /// Named class, or an anonymous class with no description
    Named(Term),

    /// owl:Thing
    Thing,

    /// owl:Nothing
    Nothing,

    IntersectionOf(Vec<ClassExpression>),

    UnionOf(Vec<ClassExpression>),

    ComplementOf(Box<ClassExpression>),

    OneOf(Vec<Term>),

    SomeValuesFrom {
        property: PropertyExpression,
        filler: Box<ClassExpression>,
    },

    AllValuesFrom {
        property: PropertyExpression,
        filler: Box<ClassExpression>,
    },

    HasValue {
        property: PropertyExpression,
        value: Term,
    },

    Cardinality {
        kind: CardinalityKind,
        property: PropertyExpression,
        value: Term,
    },
}

impl fmt::Display for ClassExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassExpression::Named(c) => write!(f, "{}", describe(c)),
            ClassExpression::Thing => write!(f, "owl:Thing"),
            ClassExpression::Nothing => write!(f, "owl:Nothing"),
            ClassExpression::IntersectionOf(parts) => write!(f, "and({})", parts.iter().join(", ")),
            ClassExpression::UnionOf(parts) => write!(f, "or({})", parts.iter().join(", ")),
            ClassExpression::ComplementOf(inner) => write!(f, "not({})", inner),
            ClassExpression::OneOf(items) => write!(f, "oneOf({})", items.iter().map(describe).join(", ")),
            ClassExpression::SomeValuesFrom { property, filler } => write!(f, "some({}, {})", property, filler),
            ClassExpression::AllValuesFrom { property, filler } => write!(f, "all({}, {})", property, filler),
            ClassExpression::HasValue { property, value } => write!(f, "value({}, {})", property, describe(value)),
            ClassExpression::Cardinality { kind, property, value } => {
                write!(f, "{:?}Cardinality({}, {})", kind, property, describe(value))
            }
        }
    }
}

/// Short human-readable form of a term for labels and diagnostics
pub fn describe(term: &Term) -> String {
    match term {
        Term::Iri(iri) => mimizuku_core::vocabulary::compact(iri.as_str()),
        other => other.to_string(),
    }
}

/// Reads class expressions from a triple source, guarding against cycles
/// through anonymous nodes
pub struct ClassExpressionReader<'a, S: TripleSource + ?Sized> {
    source: &'a S,
    visiting: HashSet<Term>,
}

impl<'a, S: TripleSource + ?Sized> ClassExpressionReader<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source, visiting: HashSet::new() }
    }

    pub fn read(&mut self, term: &Term) -> Result<ClassExpression, DlpError> {
        match term {
            Term::Iri(iri) if iri.as_str() == owl::THING => return Ok(ClassExpression::Thing),
            Term::Iri(iri) if iri.as_str() == owl::NOTHING => return Ok(ClassExpression::Nothing),
            Term::Iri(_) => return Ok(ClassExpression::Named(term.clone())),
            _ => {}
        }

        if !self.visiting.insert(term.clone()) {
            return Err(DlpError::CyclicExpression(describe(term)));
        }
        let result = self.read_anonymous(term);
        self.visiting.remove(term);
        result
    }

    fn read_anonymous(&mut self, node: &Term) -> Result<ClassExpression, DlpError> {
        if let Some(list) = self.single(node, owl::INTERSECTION_OF)? {
            return Ok(ClassExpression::IntersectionOf(self.read_list(&list)?));
        }
        if let Some(list) = self.single(node, owl::UNION_OF)? {
            return Ok(ClassExpression::UnionOf(self.read_list(&list)?));
        }
        if let Some(inner) = self.single(node, owl::COMPLEMENT_OF)? {
            return Ok(ClassExpression::ComplementOf(Box::new(self.read(&inner)?)));
        }
        if let Some(list) = self.single(node, owl::ONE_OF)? {
            return Ok(ClassExpression::OneOf(rdf_list(self.source, &list)?));
        }

        let is_restriction = self.source.contains(&Triple::new(
            node.clone(),
            Term::iri(rdf::TYPE),
            Term::iri(owl::RESTRICTION),
        ));
        let on_property = self.single(node, owl::ON_PROPERTY)?;
        match on_property {
            Some(property) => self.read_restriction(node, &property),
            None if is_restriction => Err(DlpError::MissingProperty(describe(node))),
            None => Ok(ClassExpression::Named(node.clone())),
        }
    }

    fn read_restriction(&mut self, node: &Term, property: &Term) -> Result<ClassExpression, DlpError> {
        let property = self.read_property(property)?;

        let fillers: Vec<(&str, Term)> = [
            owl::SOME_VALUES_FROM,
            owl::ALL_VALUES_FROM,
            owl::HAS_VALUE,
            owl::MIN_CARDINALITY,
            owl::MAX_CARDINALITY,
            owl::CARDINALITY,
        ]
        .into_iter()
        .flat_map(|predicate| {
            self.source
                .objects(node, &Term::iri(predicate))
                .into_iter()
                .map(move |object| (predicate, object))
        })
        .collect();

        let (predicate, filler) = match fillers.as_slice() {
            [] => return Err(DlpError::EmptyRestriction(describe(node))),
            [single] => single.clone(),
            _ => {
                let kinds = fillers.iter().map(|(p, _)| mimizuku_core::vocabulary::compact(p)).join(", ");
                return Err(DlpError::AmbiguousRestriction(format!("{} has {}", describe(node), kinds)));
            }
        };

        Ok(match predicate {
            owl::SOME_VALUES_FROM => ClassExpression::SomeValuesFrom { property, filler: Box::new(self.read(&filler)?) },
            owl::ALL_VALUES_FROM => ClassExpression::AllValuesFrom { property, filler: Box::new(self.read(&filler)?) },
            owl::HAS_VALUE => ClassExpression::HasValue { property, value: filler },
            owl::MIN_CARDINALITY => ClassExpression::Cardinality { kind: CardinalityKind::Min, property, value: filler },
            owl::MAX_CARDINALITY => ClassExpression::Cardinality { kind: CardinalityKind::Max, property, value: filler },
            _ => ClassExpression::Cardinality { kind: CardinalityKind::Exact, property, value: filler },
        })
    }

    /// Named property, or an anonymous `[ owl:inverseOf P ]`
    pub fn read_property(&mut self, term: &Term) -> Result<PropertyExpression, DlpError> {
        if !term.is_blank() {
            return Ok(PropertyExpression::Named(term.clone()));
        }
        if !self.visiting.insert(term.clone()) {
            return Err(DlpError::CyclicExpression(describe(term)));
        }
        let result = match self.single(term, owl::INVERSE_OF) {
            Ok(Some(inner)) => self.read_property(&inner).map(|p| PropertyExpression::InverseOf(Box::new(p))),
            Ok(None) => Ok(PropertyExpression::Named(term.clone())),
            Err(err) => Err(err),
        };
        self.visiting.remove(term);
        result
    }

    fn read_list(&mut self, head: &Term) -> Result<Vec<ClassExpression>, DlpError> {
        rdf_list(self.source, head)?.iter().map(|member| self.read(member)).collect()
    }

    /// The only object of `node predicate ?o`; more than one is ambiguous
    fn single(&self, node: &Term, predicate: &str) -> Result<Option<Term>, DlpError> {
        let mut objects = self.source.objects(node, &Term::iri(predicate));
        match objects.len() {
            0 => Ok(None),
            1 => Ok(objects.pop()),
            n => Err(DlpError::AmbiguousRestriction(format!(
                "{} has {} values for {}",
                describe(node),
                n,
                mimizuku_core::vocabulary::compact(predicate)
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimizuku_core::Graph;

    fn ex(local: &str) -> Term {
        Term::iri(format!("http://example.org/{}", local))
    }

    fn t(s: Term, p: &str, o: Term) -> Triple {
        Triple::new(s, Term::iri(p), o)
    }

    fn list(graph: &mut Graph, name: &str, items: &[Term]) -> Term {
        let cells: Vec<Term> = (0..items.len()).map(|i| Term::blank(format!("{}{}", name, i))).collect();
        for (i, item) in items.iter().enumerate() {
            graph.insert(t(cells[i].clone(), rdf::FIRST, item.clone()));
            let rest = cells.get(i + 1).cloned().unwrap_or_else(|| Term::iri(rdf::NIL));
            graph.insert(t(cells[i].clone(), rdf::REST, rest));
        }
        cells[0].clone()
    }

    #[test]
    fn test_named_and_builtin_classes() {
        let graph = Graph::new();
        let mut reader = ClassExpressionReader::new(&graph);
        assert_eq!(reader.read(&ex("Dog")).unwrap(), ClassExpression::Named(ex("Dog")));
        assert_eq!(reader.read(&Term::iri(owl::THING)).unwrap(), ClassExpression::Thing);
    }

    #[test]
    fn test_restriction_with_inverse_property() {
        let mut graph = Graph::new();
        let r = Term::blank("r");
        let inv = Term::blank("inv");
        graph.insert(t(r.clone(), rdf::TYPE, Term::iri(owl::RESTRICTION)));
        graph.insert(t(r.clone(), owl::ON_PROPERTY, inv.clone()));
        graph.insert(t(inv.clone(), owl::INVERSE_OF, ex("hasChild")));
        graph.insert(t(r.clone(), owl::SOME_VALUES_FROM, ex("Person")));

        let expr = ClassExpressionReader::new(&graph).read(&r).unwrap();
        let ClassExpression::SomeValuesFrom { property, filler } = expr else {
            panic!("expected someValuesFrom, got {:?}", expr);
        };
        assert_eq!(*filler, ClassExpression::Named(ex("Person")));
        assert_eq!(
            property.atom(Term::var("x"), Term::var("y")),
            Triple::new(Term::var("y"), ex("hasChild"), Term::var("x"))
        );
    }

    #[test]
    fn test_intersection_list() {
        let mut graph = Graph::new();
        let node = Term::blank("i");
        let members = list(&mut graph, "l", &[ex("A"), ex("B")]);
        graph.insert(t(node.clone(), owl::INTERSECTION_OF, members));

        let expr = ClassExpressionReader::new(&graph).read(&node).unwrap();
        assert_eq!(
            expr,
            ClassExpression::IntersectionOf(vec![ClassExpression::Named(ex("A")), ClassExpression::Named(ex("B"))])
        );
        assert_eq!(expr.to_string(), "and(<http://example.org/A>, <http://example.org/B>)");
    }

    #[test]
    fn test_ambiguous_and_incomplete_restrictions() {
        let mut graph = Graph::new();
        let r = Term::blank("r");
        graph.insert(t(r.clone(), owl::ON_PROPERTY, ex("p")));
        graph.insert(t(r.clone(), owl::SOME_VALUES_FROM, ex("A")));
        graph.insert(t(r.clone(), owl::ALL_VALUES_FROM, ex("B")));
        let bare = Term::blank("bare");
        graph.insert(t(bare.clone(), rdf::TYPE, Term::iri(owl::RESTRICTION)));

        let mut reader = ClassExpressionReader::new(&graph);
        assert!(matches!(reader.read(&r), Err(DlpError::AmbiguousRestriction(_))));
        assert!(matches!(reader.read(&bare), Err(DlpError::MissingProperty(_))));
    }

    #[test]
    fn test_cyclic_expression_is_rejected() {
        let mut graph = Graph::new();
        let a = Term::blank("a");
        graph.insert(t(a.clone(), owl::COMPLEMENT_OF, a.clone()));
        let result = ClassExpressionReader::new(&graph).read(&a);
        assert!(matches!(result, Err(DlpError::CyclicExpression(_))));
    }
}
