use mimizuku_core::vocabulary::{rdf, swap, WELL_KNOWN_PREFIXES};
use mimizuku_core::{Term, Triple};
use mimizuku_rules::{normalize, parse_n3, BuiltinRegistry, Clause, Formula, N3Parser, RuleError, Ruleset};

const FAMILY: &str = r#"
@prefix ex: <http://example.org/family#> .
@prefix math: <http://www.w3.org/2000/10/swap/math#> .

# facts
ex:alice ex:parentOf ex:bob ; ex:age 52 .
ex:bob ex:parentOf ex:carol ; ex:age 27 .

{ ?x ex:parentOf ?y . ?y ex:parentOf ?z } => { ?x ex:grandparentOf ?z } .
{ ?x ex:age ?a . ?a math:greaterThan 50 } => { ?x a ex:Senior } .
{ ?x ex:parentOf ?y } => { ?y ex:hasParent ?x . ?x a ex:Parent } .
"#;

#[test]
fn test_family_document() {
    let ruleset = parse_n3(FAMILY).unwrap();
    assert_eq!(ruleset.facts.len(), 4);
    assert_eq!(ruleset.rules.len(), 3);

    let builtins = BuiltinRegistry::standard();
    let senior = &ruleset.rules[1];
    assert!(builtins.is_builtin_term(&senior.body[1].predicate));
    assert_eq!(senior.body[1].object, Term::integer(50));
    assert_eq!(ruleset.rules[2].head.len(), 2);
}

#[test]
fn test_well_known_prefixes_can_be_predeclared() {
    let ruleset = N3Parser::new("{ ?x rdfs:subClassOf ?y . ?z a ?x } => { ?z a ?y } .")
        .unwrap()
        .with_prefixes(WELL_KNOWN_PREFIXES.iter().copied())
        .parse()
        .unwrap();
    assert_eq!(ruleset.rules[0].body[1].predicate, Term::iri(rdf::TYPE));
}

#[test]
fn test_json_roundtrip_of_parsed_document() {
    let ruleset = parse_n3(FAMILY).unwrap();
    let json = ruleset.to_json().unwrap();
    let loaded = Ruleset::from_json(&json).unwrap();
    assert_eq!(loaded, ruleset);
}

#[test]
fn test_parse_error_is_hard_failure() {
    let err = parse_n3("@prefix ex: <http://example.org/> .\n{ ?x a ex:A } => ?x .").unwrap_err();
    assert!(matches!(err, RuleError::Parse { line: 2, .. }), "{err}");
    assert!(err.to_string().starts_with("Parse error at line 2"));
}

#[test]
fn test_normalized_clause_feeds_builtin_registry_lookup() {
    let x = Term::var("x");
    let age = Term::var("age");
    let clause = Clause::new(
        "adult",
        Formula::class_atom(x.clone(), Term::iri("http://example.org/Adult")),
        Formula::and(vec![
            Formula::atom(x.clone(), Term::iri("http://example.org/age"), age.clone()),
            Formula::atom(age, Term::iri(format!("{}notLessThan", swap::MATH)), Term::integer(18)),
        ]),
    );
    let out = normalize(&clause);
    assert_eq!(out.rules.len(), 1);
    let builtins = BuiltinRegistry::standard();
    let builtin_atoms: Vec<&Triple> =
        out.rules[0].body.iter().filter(|t| builtins.is_builtin_term(&t.predicate)).collect();
    assert_eq!(builtin_atoms.len(), 1);
}
