//! Indexed in-memory triple graph and the lookup trait the reasoner needs from a fact source

use crate::error::CoreError;
use crate::model::{Term, Triple};
use crate::vocabulary::rdf;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Minimal graph capability consumed by the OWL compiler and the engine:
/// partially-specified pattern lookup plus membership.
pub trait TripleSource {
    /// All triples whose positions equal the given terms (`None` = any)
    fn triples_matching(&self, subject: Option<&Term>, predicate: Option<&Term>, object: Option<&Term>) -> Vec<&Triple>;

    fn contains(&self, triple: &Triple) -> bool;

    fn objects(&self, subject: &Term, predicate: &Term) -> Vec<Term> {
        self.triples_matching(Some(subject), Some(predicate), None)
            .into_iter()
            .map(|t| t.object.clone())
            .collect()
    }

    fn subjects(&self, predicate: &Term, object: &Term) -> Vec<Term> {
        self.triples_matching(None, Some(predicate), Some(object))
            .into_iter()
            .map(|t| t.subject.clone())
            .collect()
    }

    /// The single object for `(subject, predicate)`, if there is exactly one
    fn value(&self, subject: &Term, predicate: &Term) -> Option<Term> {
        let objects = self.objects(subject, predicate);
        match objects.len() {
            1 => objects.into_iter().next(),
            _ => None,
        }
    }
}

/// Set of triples with subject/predicate/object indices.
///
/// Insertion order is preserved for iteration; duplicates are ignored.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    triples: Vec<Triple>,
    members: HashSet<Triple>,
    /// Subject index: subject -> positions in `triples`
    subject_index: HashMap<Term, SmallVec<[usize; 8]>>,
    predicate_index: HashMap<Term, SmallVec<[usize; 8]>>,
    object_index: HashMap<Term, SmallVec<[usize; 8]>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a triple; returns `false` if it was already present
    pub fn insert(&mut self, triple: Triple) -> bool {
        if self.members.contains(&triple) {
            return false;
        }
        let index = self.triples.len();
        self.subject_index.entry(triple.subject.clone()).or_default().push(index);
        self.predicate_index.entry(triple.predicate.clone()).or_default().push(index);
        self.object_index.entry(triple.object.clone()).or_default().push(index);
        self.members.insert(triple.clone());
        self.triples.push(triple);
        true
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Whether `term` occurs in any position of any triple
    pub fn mentions(&self, term: &Term) -> bool {
        self.subject_index.contains_key(term)
            || self.predicate_index.contains_key(term)
            || self.object_index.contains_key(term)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    pub fn clear(&mut self) {
        self.triples.clear();
        self.members.clear();
        self.subject_index.clear();
        self.predicate_index.clear();
        self.object_index.clear();
    }

    /// Triples sorted canonically; handy for comparing closures
    pub fn sorted(&self) -> Vec<Triple> {
        self.triples.iter().cloned().sorted().collect()
    }

    /// Load a JSON array of triples
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let triples: Vec<Triple> = serde_json::from_str(json)?;
        Ok(triples.into_iter().collect())
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(&self.triples)?)
    }

    fn candidate_indices(&self, subject: Option<&Term>, predicate: Option<&Term>, object: Option<&Term>) -> SmallVec<[usize; 8]> {
        let lookup = |index: &HashMap<Term, SmallVec<[usize; 8]>>, term: &Term| -> SmallVec<[usize; 8]> {
            index.get(term).cloned().unwrap_or_default()
        };

        match (subject, predicate, object) {
            (None, None, None) => (0..self.triples.len()).collect(),
            (Some(s), None, None) => lookup(&self.subject_index, s),
            (None, Some(p), None) => lookup(&self.predicate_index, p),
            (None, None, Some(o)) => lookup(&self.object_index, o),
            (Some(s), Some(p), None) => intersect_indices(&lookup(&self.subject_index, s), &lookup(&self.predicate_index, p)),
            (Some(s), None, Some(o)) => intersect_indices(&lookup(&self.subject_index, s), &lookup(&self.object_index, o)),
            (None, Some(p), Some(o)) => intersect_indices(&lookup(&self.predicate_index, p), &lookup(&self.object_index, o)),
            (Some(s), Some(p), Some(o)) => {
                let sp = intersect_indices(&lookup(&self.subject_index, s), &lookup(&self.predicate_index, p));
                intersect_indices(&sp, &lookup(&self.object_index, o))
            }
        }
    }
}

/// Intersect two ascending index vectors
fn intersect_indices(a: &[usize], b: &[usize]) -> SmallVec<[usize; 8]> {
    let mut result = SmallVec::new();
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                result.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }

    result
}

impl TripleSource for Graph {
    fn triples_matching(&self, subject: Option<&Term>, predicate: Option<&Term>, object: Option<&Term>) -> Vec<&Triple> {
        self.candidate_indices(subject, predicate, object)
            .into_iter()
            .filter_map(|i| self.triples.get(i))
            .collect()
    }

    fn contains(&self, triple: &Triple) -> bool {
        self.members.contains(triple)
    }
}

impl TripleSource for [Triple] {
    fn triples_matching(&self, subject: Option<&Term>, predicate: Option<&Term>, object: Option<&Term>) -> Vec<&Triple> {
        self.iter()
            .filter(|t| subject.map_or(true, |s| &t.subject == s))
            .filter(|t| predicate.map_or(true, |p| &t.predicate == p))
            .filter(|t| object.map_or(true, |o| &t.object == o))
            .collect()
    }

    fn contains(&self, triple: &Triple) -> bool {
        self.iter().any(|t| t == triple)
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut graph = Graph::new();
        graph.extend(iter);
        graph
    }
}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        for triple in iter {
            self.insert(triple);
        }
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = std::slice::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl Eq for Graph {}

impl Serialize for Graph {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.triples.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Graph {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let triples = Vec::<Triple>::deserialize(deserializer)?;
        Ok(triples.into_iter().collect())
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.triples.iter().join("\n"))
    }
}

/// Read an RDF collection (`rdf:first`/`rdf:rest` chain) starting at `head`.
///
/// `rdf:nil` yields an empty list. A node without exactly one `rdf:first` and
/// one `rdf:rest`, or a chain that loops back on itself, is an error.
pub fn rdf_list<S: TripleSource + ?Sized>(source: &S, head: &Term) -> Result<Vec<Term>, CoreError> {
    let first = Term::iri(rdf::FIRST);
    let rest = Term::iri(rdf::REST);
    let nil = Term::iri(rdf::NIL);

    let mut items = Vec::new();
    let mut visited = HashSet::new();
    let mut node = head.clone();

    while node != nil {
        if !visited.insert(node.clone()) {
            return Err(CoreError::CyclicList(node.to_string()));
        }
        let item = source
            .value(&node, &first)
            .ok_or_else(|| CoreError::MalformedList(node.to_string()))?;
        let next = source
            .value(&node, &rest)
            .ok_or_else(|| CoreError::MalformedList(node.to_string()))?;
        items.push(item);
        node = next;
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ex(local: &str) -> Term {
        Term::iri(format!("http://example.org/{}", local))
    }

    fn sample() -> Graph {
        [
            Triple::new(ex("a"), ex("p"), ex("b")),
            Triple::new(ex("b"), ex("p"), ex("c")),
            Triple::new(ex("a"), ex("q"), ex("c")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_insert_ignores_duplicates() {
        let mut graph = sample();
        assert!(!graph.insert(Triple::new(ex("a"), ex("p"), ex("b"))));
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn test_mentions_checks_every_position() {
        let graph = sample();
        assert!(graph.mentions(&ex("a")));
        assert!(graph.mentions(&ex("q")));
        assert!(graph.mentions(&ex("c")));
        assert!(!graph.mentions(&Term::blank("a")));
    }

    #[test]
    fn test_triples_matching_uses_every_index_combination() {
        let graph = sample();
        assert_eq!(graph.triples_matching(Some(&ex("a")), None, None).len(), 2);
        assert_eq!(graph.triples_matching(None, Some(&ex("p")), None).len(), 2);
        assert_eq!(graph.triples_matching(None, None, Some(&ex("c"))).len(), 2);
        assert_eq!(graph.triples_matching(Some(&ex("a")), Some(&ex("q")), None).len(), 1);
        assert_eq!(graph.triples_matching(Some(&ex("a")), Some(&ex("p")), Some(&ex("c"))).len(), 0);
        assert_eq!(graph.triples_matching(None, None, None).len(), 3);
    }

    #[test]
    fn test_slice_source_agrees_with_graph() {
        let graph = sample();
        let triples: Vec<Triple> = graph.iter().cloned().collect();
        assert_eq!(
            triples.as_slice().objects(&ex("a"), &ex("p")),
            graph.objects(&ex("a"), &ex("p"))
        );
    }

    #[test]
    fn test_rdf_list_reads_items_in_order() {
        let mut graph = Graph::new();
        graph.insert(Triple::new(Term::blank("l1"), Term::iri(rdf::FIRST), ex("A")));
        graph.insert(Triple::new(Term::blank("l1"), Term::iri(rdf::REST), Term::blank("l2")));
        graph.insert(Triple::new(Term::blank("l2"), Term::iri(rdf::FIRST), ex("B")));
        graph.insert(Triple::new(Term::blank("l2"), Term::iri(rdf::REST), Term::iri(rdf::NIL)));

        let items = rdf_list(&graph, &Term::blank("l1")).unwrap();
        assert_eq!(items, vec![ex("A"), ex("B")]);
    }

    #[test]
    fn test_rdf_list_detects_cycles_and_gaps() {
        let mut graph = Graph::new();
        graph.insert(Triple::new(Term::blank("l1"), Term::iri(rdf::FIRST), ex("A")));
        graph.insert(Triple::new(Term::blank("l1"), Term::iri(rdf::REST), Term::blank("l1")));
        assert!(matches!(rdf_list(&graph, &Term::blank("l1")), Err(CoreError::CyclicList(_))));
        assert!(matches!(rdf_list(&graph, &Term::blank("missing")), Err(CoreError::MalformedList(_))));
    }
}
