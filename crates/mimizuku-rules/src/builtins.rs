//! Built-in predicates: 2-argument tests that constrain bound values
//! without standing for stored facts

use std::collections::HashMap;
use std::fmt;

use mimizuku_core::vocabulary::swap;
use mimizuku_core::Term;
use regex::Regex;

/// A built-in predicate function over the subject and object of its triple
pub type BuiltinFn = fn(&Term, &Term) -> bool;

/// Registry of built-in predicates keyed by predicate IRI
#[derive(Clone, Default)]
pub struct BuiltinRegistry {
    builtins: HashMap<String, BuiltinFn>,
}

impl BuiltinRegistry {
    /// Empty registry; every predicate is an ordinary fact pattern
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the standard `math:`, `string:` and `log:` tests
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register_math();
        registry.register_string();
        registry.register_log();
        registry
    }

    /// Register a built-in predicate
    pub fn register(&mut self, iri: &str, f: BuiltinFn) {
        self.builtins.insert(iri.to_string(), f);
    }

    pub fn is_builtin(&self, iri: &str) -> bool {
        self.builtins.contains_key(iri)
    }

    /// Whether a pattern predicate names a registered built-in
    pub fn is_builtin_term(&self, predicate: &Term) -> bool {
        predicate.as_iri().is_some_and(|iri| self.is_builtin(iri.as_str()))
    }

    pub fn get(&self, iri: &str) -> Option<BuiltinFn> {
        self.builtins.get(iri).copied()
    }

    /// Evaluate; an unknown predicate never holds
    pub fn evaluate(&self, iri: &str, subject: &Term, object: &Term) -> bool {
        self.builtins.get(iri).is_some_and(|f| f(subject, object))
    }

    pub fn len(&self) -> usize {
        self.builtins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builtins.is_empty()
    }

    fn register_math(&mut self) {
        let math = |local: &str| format!("{}{}", swap::MATH, local);
        self.register(&math("greaterThan"), |a, b| compare_numbers(a, b, |x, y| x > y));
        self.register(&math("lessThan"), |a, b| compare_numbers(a, b, |x, y| x < y));
        self.register(&math("notGreaterThan"), |a, b| compare_numbers(a, b, |x, y| x <= y));
        self.register(&math("notLessThan"), |a, b| compare_numbers(a, b, |x, y| x >= y));
        self.register(&math("equalTo"), |a, b| compare_numbers(a, b, |x, y| x == y));
        self.register(&math("notEqualTo"), |a, b| compare_numbers(a, b, |x, y| x != y));
    }

    fn register_string(&mut self) {
        let string = |local: &str| format!("{}{}", swap::STRING, local);
        self.register(&string("startsWith"), |a, b| compare_text(a, b, |x, y| x.starts_with(y)));
        self.register(&string("endsWith"), |a, b| compare_text(a, b, |x, y| x.ends_with(y)));
        self.register(&string("contains"), |a, b| compare_text(a, b, |x, y| x.contains(y)));
        self.register(&string("containsIgnoringCase"), |a, b| {
            compare_text(a, b, |x, y| x.to_lowercase().contains(&y.to_lowercase()))
        });
        self.register(&string("equalIgnoringCase"), |a, b| {
            compare_text(a, b, |x, y| x.to_lowercase() == y.to_lowercase())
        });
        self.register(&string("notEqualIgnoringCase"), |a, b| {
            compare_text(a, b, |x, y| x.to_lowercase() != y.to_lowercase())
        });
        self.register(&string("greaterThan"), |a, b| compare_text(a, b, |x, y| x > y));
        self.register(&string("lessThan"), |a, b| compare_text(a, b, |x, y| x < y));
        self.register(&string("matches"), |a, b| regex_match(a, b).unwrap_or(false));
        self.register(&string("notMatches"), |a, b| regex_match(a, b).map_or(false, |m| !m));
    }

    fn register_log(&mut self) {
        self.register(&format!("{}equalTo", swap::LOG), |a, b| a == b);
        self.register(&format!("{}notEqualTo", swap::LOG), |a, b| a != b);
    }
}

impl fmt::Debug for BuiltinRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.builtins.keys().collect();
        names.sort();
        f.debug_struct("BuiltinRegistry").field("builtins", &names).finish()
    }
}

/// Numeric value of a literal term
fn number(term: &Term) -> Option<f64> {
    match term {
        Term::Literal(lit) => lit.as_f64(),
        _ => None,
    }
}

/// Lexical form of a literal, or the IRI string
fn text(term: &Term) -> Option<&str> {
    match term {
        Term::Literal(lit) => Some(lit.lexical.as_str()),
        Term::Iri(iri) => Some(iri.as_str()),
        _ => None,
    }
}

fn compare_numbers(a: &Term, b: &Term, op: fn(f64, f64) -> bool) -> bool {
    match (number(a), number(b)) {
        (Some(x), Some(y)) => op(x, y),
        _ => false,
    }
}

fn compare_text(a: &Term, b: &Term, op: fn(&str, &str) -> bool) -> bool {
    match (text(a), text(b)) {
        (Some(x), Some(y)) => op(x, y),
        _ => false,
    }
}

/// `None` when either side is not text or the pattern does not compile
fn regex_match(a: &Term, b: &Term) -> Option<bool> {
    let (subject, pattern) = (text(a)?, text(b)?);
    let re = Regex::new(pattern).ok()?;
    Some(re.is_match(subject))
}
