use std::collections::BTreeSet;

use mimizuku_core::vocabulary::{rdf, swap};
use mimizuku_core::{Term, Triple, TripleSource};
use mimizuku_rete::{Network, NetworkOptions, ReteError, RuleOutcome};
use mimizuku_rules::{BuiltinRegistry, HornRule};
use proptest::prelude::*;

fn ex(local: &str) -> Term {
    Term::iri(format!("http://example.org/{}", local))
}

fn v(name: &str) -> Term {
    Term::var(name)
}

fn t(s: Term, p: Term, o: Term) -> Triple {
    Triple::new(s, p, o)
}

fn math(local: &str) -> Term {
    Term::iri(format!("{}{}", swap::MATH, local))
}

fn rdf_type() -> Term {
    Term::iri(rdf::TYPE)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn network() -> Network {
    Network::with_options(
        BuiltinRegistry::standard(),
        NetworkOptions { blank_prefix: Some("sk".into()), ..Default::default() },
    )
}

fn ancestor_rules() -> Vec<HornRule> {
    vec![
        HornRule::new("parent-is-ancestor", vec![t(v("x"), ex("parent"), v("y"))], vec![t(v("x"), ex("ancestor"), v("y"))]),
        HornRule::new(
            "ancestor-transitive",
            vec![t(v("x"), ex("ancestor"), v("y")), t(v("y"), ex("ancestor"), v("z"))],
            vec![t(v("x"), ex("ancestor"), v("z"))],
        ),
    ]
}

fn chain(length: usize) -> Vec<Triple> {
    (0..length)
        .map(|i| t(ex(&format!("n{}", i)), ex("parent"), ex(&format!("n{}", i + 1))))
        .collect()
}

#[test]
fn test_shared_prefix_reuses_beta_nodes() {
    let mut net = network();
    let report = net.add_rules(vec![
        HornRule::new("copy", vec![t(v("x"), ex("p"), v("y"))], vec![t(v("x"), ex("q"), v("y"))]),
        HornRule::new(
            "chain",
            vec![t(v("x"), ex("p"), v("y")), t(v("y"), ex("r"), v("z"))],
            vec![t(v("x"), ex("s"), v("z"))],
        ),
    ]);

    assert_eq!(report.added.len(), 2);
    assert_eq!(net.alpha_nodes().len(), 2);
    assert_eq!(net.beta_nodes().len(), 2);
    assert!(net.beta_nodes()[0].is_pass_through());
    assert_eq!(net.beta_nodes()[0].successors, vec![net.beta_nodes()[1].id]);
}

#[test]
fn test_join_on_shared_variable() {
    let mut net = network();
    net.add_rule(HornRule::new(
        "chain",
        vec![t(v("x"), ex("p"), v("y")), t(v("y"), ex("r"), v("z"))],
        vec![t(v("x"), ex("s"), v("z"))],
    ));
    net.feed(vec![
        t(ex("a"), ex("p"), ex("b")),
        t(ex("b"), ex("r"), ex("c")),
        t(ex("x"), ex("r"), ex("y")),
    ])
    .unwrap();

    let inferred: Vec<Triple> = net.inferred().sorted();
    assert_eq!(inferred, vec![t(ex("a"), ex("s"), ex("c"))]);
}

#[test]
fn test_join_is_order_insensitive_within_a_feed() {
    let mut net = network();
    net.add_rule(HornRule::new(
        "chain",
        vec![t(v("x"), ex("p"), v("y")), t(v("y"), ex("r"), v("z"))],
        vec![t(v("x"), ex("s"), v("z"))],
    ));
    net.feed(vec![t(ex("b"), ex("r"), ex("c")), t(ex("a"), ex("p"), ex("b"))]).unwrap();
    assert!(net.working_memory().contains(&t(ex("a"), ex("s"), ex("c"))));
}

#[test]
fn test_transitive_closure_of_a_chain() {
    init_tracing();
    let mut net = network();
    net.add_rules(ancestor_rules());
    let report = net.feed(chain(4)).unwrap();

    assert_eq!(report.asserted, 4);
    let ancestors = net.working_memory().triples_matching(None, Some(&ex("ancestor")), None);
    assert_eq!(ancestors.len(), 10);
    assert!(net.working_memory().contains(&t(ex("n0"), ex("ancestor"), ex("n4"))));
}

#[test]
fn test_existential_heads_mint_one_blank_per_match() {
    let mut net = network();
    net.add_rule(HornRule::new(
        "has-mother",
        vec![t(v("x"), rdf_type(), ex("Person"))],
        vec![t(v("x"), ex("hasMother"), v("m")), t(v("m"), rdf_type(), ex("Mother"))],
    ));
    let facts = vec![t(ex("alice"), rdf_type(), ex("Person")), t(ex("bob"), rdf_type(), ex("Person"))];
    net.feed(facts.clone()).unwrap();

    let mothers: BTreeSet<Term> = net
        .working_memory()
        .triples_matching(None, Some(&ex("hasMother")), None)
        .into_iter()
        .map(|t| t.object.clone())
        .collect();
    assert_eq!(mothers.len(), 2);
    assert!(mothers.iter().all(Term::is_blank));
    for mother in &mothers {
        assert!(net.working_memory().contains(&t(mother.clone(), rdf_type(), ex("Mother"))));
    }

    let report = net.feed(facts).unwrap();
    assert_eq!(report.skipped, 2);
    assert_eq!(report.inferred, 0);
    assert_eq!(net.stats().minted_blanks, 2);
}

#[test]
fn test_minted_blanks_avoid_fed_labels() {
    let mut net = network();
    net.add_rule(HornRule::new(
        "has-mother",
        vec![t(v("x"), rdf_type(), ex("Person"))],
        vec![t(v("x"), ex("hasMother"), v("m"))],
    ));
    let taken = Term::blank("sk_1");
    net.feed(vec![t(taken.clone(), rdf_type(), ex("Robot")), t(ex("alice"), rdf_type(), ex("Person"))])
        .unwrap();

    let mothers = net.working_memory().objects(&ex("alice"), &ex("hasMother"));
    assert_eq!(mothers, vec![Term::blank("sk_2")]);
    assert_eq!(net.working_memory().triples_matching(Some(&taken), None, None).len(), 1);
}

#[test]
fn test_late_rule_replay_reuses_minted_blanks() {
    let mut net = network();
    net.add_rule(HornRule::new(
        "has-mother",
        vec![t(v("x"), rdf_type(), ex("Person"))],
        vec![t(v("x"), ex("hasMother"), v("m"))],
    ));
    net.feed(vec![t(ex("alice"), rdf_type(), ex("Person"))]).unwrap();
    let before = net.working_memory().len();

    net.add_rule(HornRule::new(
        "mother-is-female",
        vec![t(v("x"), ex("hasMother"), v("m"))],
        vec![t(v("m"), rdf_type(), ex("Female"))],
    ));

    assert_eq!(net.working_memory().len(), before + 1);
    assert_eq!(net.stats().minted_blanks, 1);
}

#[test]
fn test_builtin_gates_matches() {
    let mut net = network();
    net.add_rule(HornRule::new(
        "senior",
        vec![t(v("x"), ex("age"), v("a")), t(v("a"), math("greaterThan"), Term::integer(50))],
        vec![t(v("x"), rdf_type(), ex("Senior"))],
    ));
    net.feed(vec![t(ex("alice"), ex("age"), Term::integer(52)), t(ex("bob"), ex("age"), Term::integer(27))])
        .unwrap();

    assert_eq!(net.inferred().sorted(), vec![t(ex("alice"), rdf_type(), ex("Senior"))]);
}

#[test]
fn test_builtin_written_first_is_deferred_until_bound() {
    let mut net = network();
    let outcome = net.add_rule(HornRule::new(
        "senior",
        vec![t(v("a"), math("greaterThan"), Term::integer(50)), t(v("x"), ex("age"), v("a"))],
        vec![t(v("x"), rdf_type(), ex("Senior"))],
    ));
    assert!(matches!(outcome, RuleOutcome::Added(_)));

    net.feed(vec![t(ex("alice"), ex("age"), Term::integer(52))]).unwrap();
    assert!(net.working_memory().contains(&t(ex("alice"), rdf_type(), ex("Senior"))));
}

#[test]
fn test_unsafe_and_static_builtins() {
    init_tracing();
    let mut net = network();
    let report = net.add_rules(vec![
        HornRule::new(
            "unsafe",
            vec![t(v("x"), ex("p"), v("y")), t(v("z"), math("lessThan"), Term::integer(3))],
            vec![t(v("x"), ex("q"), v("y"))],
        ),
        HornRule::new(
            "never",
            vec![t(v("x"), ex("p"), v("y")), t(Term::integer(1), math("greaterThan"), Term::integer(2))],
            vec![t(v("x"), ex("q"), v("y"))],
        ),
        HornRule::new(
            "always",
            vec![t(v("x"), ex("p"), v("y")), t(Term::integer(2), math("greaterThan"), Term::integer(1))],
            vec![t(v("x"), ex("r"), v("y"))],
        ),
    ]);

    assert_eq!(report.added.len(), 1);
    let dropped: Vec<&str> = report.dropped.iter().map(|d| d.source.as_str()).collect();
    assert_eq!(dropped, vec!["unsafe", "never"]);

    net.feed(vec![t(ex("a"), ex("p"), ex("b"))]).unwrap();
    assert!(net.working_memory().contains(&t(ex("a"), ex("r"), ex("b"))));
}

#[test]
fn test_duplicate_rules_share_a_production() {
    let mut net = network();
    let first = net.add_rule(HornRule::new(
        "one",
        vec![t(v("x"), ex("p"), v("y")), t(v("y"), ex("p"), v("z"))],
        vec![t(v("x"), ex("q"), v("z"))],
    ));
    let second = net.add_rule(HornRule::new(
        "two",
        vec![t(v("y"), ex("p"), v("z")), t(v("x"), ex("p"), v("y"))],
        vec![t(v("x"), ex("q"), v("z"))],
    ));

    let RuleOutcome::Added(id) = first else {
        panic!("first rule should be added");
    };
    assert_eq!(second, RuleOutcome::Duplicate(id));
    assert_eq!(net.productions().len(), 1);
}

#[test]
fn test_feeding_twice_is_idempotent() {
    let mut net = network();
    net.add_rules(ancestor_rules());
    net.feed(chain(3)).unwrap();
    let snapshot = net.working_memory().clone();

    let report = net.feed(chain(3)).unwrap();
    assert_eq!(report.asserted, 0);
    assert_eq!(report.skipped, 3);
    assert_eq!(report.inferred, 0);
    assert_eq!(net.working_memory(), &snapshot);
}

#[test]
fn test_reset_then_refeed_reproduces_closure() {
    let mut net = network();
    net.add_rules(ancestor_rules());
    net.feed(chain(3)).unwrap();
    let closure = net.working_memory().clone();

    net.reset();
    assert!(net.working_memory().is_empty());
    assert!(net.provenance().is_empty());
    assert_eq!(net.stats().left_memory + net.stats().right_memory, 0);

    net.feed(chain(3)).unwrap();
    assert_eq!(net.working_memory(), &closure);
}

#[test]
fn test_late_rules_see_existing_facts() {
    let mut net = network();
    net.feed(chain(2)).unwrap();
    assert!(net.inferred().is_empty());

    let report = net.add_rules(ancestor_rules());
    assert_eq!(report.added.len(), 2);
    assert!(net.working_memory().contains(&t(ex("n0"), ex("ancestor"), ex("n2"))));
}

#[test]
fn test_universal_truths_survive_reset() {
    let mut net = network();
    let fact = t(ex("a"), ex("b"), ex("c"));
    let outcome = net.add_rule(HornRule::new("axiom", vec![], vec![fact.clone()]));
    let RuleOutcome::Added(id) = outcome else {
        panic!("axiom should be added");
    };

    assert!(net.production(id).unwrap().is_universal_truth());
    assert!(net.working_memory().contains(&fact));
    net.reset();
    assert!(net.working_memory().contains(&fact));
}

#[test]
fn test_variable_predicate_patterns() {
    let mut net = network();
    net.add_rule(HornRule::new(
        "symmetric",
        vec![t(v("p"), rdf_type(), ex("Symmetric")), t(v("x"), v("p"), v("y"))],
        vec![t(v("y"), v("p"), v("x"))],
    ));
    net.feed(vec![t(ex("knows"), rdf_type(), ex("Symmetric")), t(ex("a"), ex("knows"), ex("b"))]).unwrap();
    assert!(net.working_memory().contains(&t(ex("b"), ex("knows"), ex("a"))));
}

#[test]
fn test_alternate_justifications_are_kept() {
    let mut net = network();
    net.add_rules(vec![
        HornRule::new("via-p", vec![t(v("x"), ex("p"), v("y"))], vec![t(v("x"), ex("q"), v("y"))]),
        HornRule::new("via-r", vec![t(v("x"), ex("r"), v("y"))], vec![t(v("x"), ex("q"), v("y"))]),
    ]);
    net.feed(vec![t(ex("a"), ex("p"), ex("b")), t(ex("a"), ex("r"), ex("b"))]).unwrap();

    let justifications = net.provenance().justifications(&t(ex("a"), ex("q"), ex("b")));
    let rules: Vec<&str> = justifications.iter().map(|j| j.rule.as_str()).collect();
    assert_eq!(rules, vec!["via-p", "via-r"]);
    assert_eq!(justifications[1].support, vec![t(ex("a"), ex("r"), ex("b"))]);
}

#[test]
fn test_provenance_can_be_disabled() {
    let mut net = Network::with_options(
        BuiltinRegistry::standard(),
        NetworkOptions { record_provenance: false, ..Default::default() },
    );
    net.add_rules(ancestor_rules());
    net.feed(chain(2)).unwrap();
    assert!(!net.inferred().is_empty());
    assert!(net.provenance().is_empty());
}

#[test]
fn test_non_ground_facts_are_rejected() {
    let mut net = network();
    net.add_rules(ancestor_rules());
    let err = net.feed(vec![t(ex("a"), ex("parent"), ex("b")), t(v("x"), ex("parent"), ex("c"))]).unwrap_err();

    assert!(matches!(err, ReteError::NonGroundFact(_)));
    assert!(net.working_memory().is_empty());
}

#[test]
fn test_cancelled_feed_stops_between_facts() {
    let mut net = network();
    net.add_rules(ancestor_rules());
    let flag = net.cancellation_flag();
    flag.cancel();

    let err = net.feed(chain(2)).unwrap_err();
    assert!(matches!(err, ReteError::Cancelled { processed: 0, total: 2 }));
    assert!(net.working_memory().is_empty());

    flag.reset();
    net.feed(chain(2)).unwrap();
    assert_eq!(net.working_memory().len(), 5);
}

#[test]
fn test_unbound_head_variables_are_discarded() {
    let mut net = network();
    let mut rule = HornRule::new("leaky", vec![t(v("x"), ex("p"), v("y"))], vec![t(v("x"), ex("q"), v("z"))]);
    rule.existentials.clear();
    net.add_rule(rule);
    net.feed(vec![t(ex("a"), ex("p"), ex("b"))]).unwrap();

    assert!(net.inferred().is_empty());
    assert_eq!(net.stats().discarded_heads, 1);
}

#[test]
fn test_stats_display() {
    let mut net = network();
    net.add_rules(ancestor_rules());
    net.feed(chain(2)).unwrap();
    assert_eq!(
        net.stats().to_string(),
        "<Network: 2 rules, 5 nodes, 5 tokens in working memory, 3 inferred tokens>"
    );
}

fn naive_closure(edges: &[(u8, u8)]) -> BTreeSet<(u8, u8)> {
    let mut closure: BTreeSet<(u8, u8)> = edges.iter().copied().collect();
    loop {
        let next: Vec<(u8, u8)> = closure
            .iter()
            .flat_map(|&(a, b)| closure.iter().filter(move |&&(c, _)| c == b).map(move |&(_, d)| (a, d)))
            .filter(|pair| !closure.contains(pair))
            .collect();
        if next.is_empty() {
            return closure;
        }
        closure.extend(next);
    }
}

proptest! {
    #[test]
    fn prop_closure_is_independent_of_feed_order(edges in prop::collection::vec((0u8..6, 0u8..6), 0..12)) {
        let facts: Vec<Triple> = edges
            .iter()
            .map(|(a, b)| t(ex(&format!("n{}", a)), ex("ancestor"), ex(&format!("n{}", b))))
            .collect();

        let mut forward = network();
        forward.add_rules(ancestor_rules());
        forward.feed(facts.clone()).unwrap();

        let mut backward = network();
        backward.feed(facts.iter().rev().cloned()).unwrap();
        backward.add_rules(ancestor_rules());

        prop_assert_eq!(forward.working_memory(), backward.working_memory());

        let expected: BTreeSet<Triple> = naive_closure(&edges)
            .into_iter()
            .map(|(a, b)| t(ex(&format!("n{}", a)), ex("ancestor"), ex(&format!("n{}", b))))
            .collect();
        let actual: BTreeSet<Triple> = forward.working_memory().iter().cloned().collect();
        prop_assert_eq!(actual, expected);
    }
}
