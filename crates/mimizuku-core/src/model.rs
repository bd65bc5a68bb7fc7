//! Term and triple data model shared by facts, patterns and rules

use crate::binding::Binding;
use crate::vocabulary::xsd;
use serde::{Deserialize, Serialize};
use std::fmt;

/// IRI wrapper for type safety
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Iri(pub String);

impl Iri {
    pub fn new<S: Into<String>>(s: S) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

/// RDF literal value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    pub lexical: String,
    pub datatype: Option<Iri>,
    pub language: Option<String>,
}

impl Literal {
    pub fn plain<S: Into<String>>(lexical: S) -> Self {
        Self { lexical: lexical.into(), datatype: None, language: None }
    }

    pub fn typed<S: Into<String>>(lexical: S, datatype: Iri) -> Self {
        Self { lexical: lexical.into(), datatype: Some(datatype), language: None }
    }

    pub fn lang<S: Into<String>, L: Into<String>>(lexical: S, language: L) -> Self {
        Self { lexical: lexical.into(), datatype: None, language: Some(language.into()) }
    }

    /// Numeric value of the literal, if its datatype (or an untyped lexical form) is numeric.
    ///
    /// Infinities and NaN are only numbers for `xsd:double` and `xsd:float`.
    pub fn as_f64(&self) -> Option<f64> {
        let floating = match &self.datatype {
            Some(dt) if xsd::is_numeric(dt.as_str()) => matches!(dt.as_str(), xsd::DOUBLE | xsd::FLOAT),
            Some(_) => return None,
            None if self.language.is_none() => false,
            None => return None,
        };
        let value: f64 = self.lexical.trim().parse().ok()?;
        (floating || value.is_finite()).then_some(value)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.lexical.replace('\\', "\\\\").replace('"', "\\\""))?;
        if let Some(lang) = &self.language {
            write!(f, "@{}", lang)
        } else if let Some(dt) = &self.datatype {
            write!(f, "^^{}", dt)
        } else {
            Ok(())
        }
    }
}

/// Anonymous, existentially scoped identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlankNode(pub String);

/// Named placeholder, scoped to one rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Variable(pub String);

impl Variable {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.0)
    }
}

/// A constant (IRI or literal), a blank node or a variable
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Term {
    Iri(Iri),
    Literal(Literal),
    Blank(BlankNode),
    Variable(Variable),
}

impl Term {
    pub fn iri<S: Into<String>>(s: S) -> Self {
        Term::Iri(Iri::new(s))
    }

    pub fn literal<S: Into<String>>(s: S) -> Self {
        Term::Literal(Literal::plain(s))
    }

    pub fn typed_literal<S: Into<String>>(s: S, datatype: &str) -> Self {
        Term::Literal(Literal::typed(s, Iri::new(datatype)))
    }

    pub fn integer(value: i64) -> Self {
        Term::typed_literal(value.to_string(), xsd::INTEGER)
    }

    pub fn decimal(value: f64) -> Self {
        Term::typed_literal(value.to_string(), xsd::DECIMAL)
    }

    pub fn blank<S: Into<String>>(id: S) -> Self {
        Term::Blank(BlankNode(id.into()))
    }

    pub fn var<S: Into<String>>(name: S) -> Self {
        Term::Variable(Variable::new(name))
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Term::Blank(_))
    }

    /// No variable and no blank node
    pub fn is_ground(&self) -> bool {
        matches!(self, Term::Iri(_) | Term::Literal(_))
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Term::Variable(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// Replace a bound variable by its value; constants resolve to themselves
    pub fn resolve(&self, binding: &Binding) -> Option<Term> {
        match self {
            Term::Variable(v) => binding.get(v).cloned(),
            other => Some(other.clone()),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "{}", iri),
            Term::Literal(lit) => write!(f, "{}", lit),
            Term::Blank(b) => write!(f, "_:{}", b.0),
            Term::Variable(v) => write!(f, "{}", v),
        }
    }
}

impl From<Iri> for Term {
    fn from(iri: Iri) -> Self {
        Term::Iri(iri)
    }
}

impl From<Literal> for Term {
    fn from(lit: Literal) -> Self {
        Term::Literal(lit)
    }
}

impl From<Variable> for Term {
    fn from(v: Variable) -> Self {
        Term::Variable(v)
    }
}

/// RDF triple; the unit of both facts and patterns
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self { subject, predicate, object }
    }

    pub fn terms(&self) -> [&Term; 3] {
        [&self.subject, &self.predicate, &self.object]
    }

    /// Variables in subject, predicate, object order (repeats included)
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.terms().into_iter().filter_map(Term::as_variable)
    }

    pub fn has_variables(&self) -> bool {
        self.variables().next().is_some()
    }

    /// No variable and no blank node in any position
    pub fn is_ground(&self) -> bool {
        self.terms().iter().all(|t| t.is_ground())
    }

    /// Instantiate the triple under `binding`.
    ///
    /// Positions still holding unbound variables are reported back instead of
    /// producing a partially instantiated triple.
    pub fn substitute(&self, binding: &Binding) -> Result<Triple, Vec<Variable>> {
        let mut unbound = Vec::new();
        let mut resolve = |term: &Term| match term.resolve(binding) {
            Some(t) => t,
            None => {
                if let Term::Variable(v) = term {
                    if !unbound.contains(v) {
                        unbound.push(v.clone());
                    }
                }
                term.clone()
            }
        };

        let triple = Triple {
            subject: resolve(&self.subject),
            predicate: resolve(&self.predicate),
            object: resolve(&self.object),
        };

        if unbound.is_empty() {
            Ok(triple)
        } else {
            Err(unbound)
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}
