// End-to-end closure properties across the rules, rete, dlp and engine crates

#[cfg(test)]
mod tests {
    use mimizuku_core::vocabulary::{owl, rdf, rdfs};
    use mimizuku_core::{Graph, Term, Triple, TripleSource};
    use mimizuku_engine::{EngineOptions, ReasoningEngine, SharedReasoner};
    use mimizuku_rete::Network;
    use mimizuku_rules::{normalize_all, BuiltinRegistry, Clause, Formula, HornRule};
    use proptest::prelude::*;

    fn ex(local: &str) -> Term {
        Term::iri(format!("http://example.org/{}", local))
    }

    fn t(s: Term, p: Term, o: Term) -> Triple {
        Triple::new(s, p, o)
    }

    fn a() -> Term {
        Term::iri(rdf::TYPE)
    }

    fn ontology(triples: Vec<Triple>) -> Graph {
        let mut graph = Graph::new();
        for triple in triples {
            graph.insert(triple);
        }
        graph
    }

    #[test]
    fn test_subclass_round_trip() {
        let graph = ontology(vec![
            t(ex("Dog"), Term::iri(rdfs::SUB_CLASS_OF), ex("Animal")),
            t(ex("fido"), a(), ex("Dog")),
            t(ex("tom"), a(), ex("Animal")),
        ]);
        let mut engine = ReasoningEngine::new();
        engine.compute_closure(&graph).unwrap();

        let closure = engine.closure();
        assert!(closure.contains(&t(ex("fido"), a(), ex("Animal"))));
        assert!(!closure.contains(&t(ex("tom"), a(), ex("Dog"))));
        assert!(!closure.contains(&t(ex("Animal"), Term::iri(rdfs::SUB_CLASS_OF), ex("Dog"))));
    }

    #[test]
    fn test_equivalent_class_goes_both_ways() {
        let graph = ontology(vec![
            t(ex("Human"), Term::iri(owl::EQUIVALENT_CLASS), ex("Person")),
            t(ex("ann"), a(), ex("Person")),
            t(ex("bo"), a(), ex("Human")),
        ]);
        let mut engine = ReasoningEngine::new();
        engine.compute_closure(&graph).unwrap();

        assert!(engine.closure().contains(&t(ex("ann"), a(), ex("Human"))));
        assert!(engine.closure().contains(&t(ex("bo"), a(), ex("Person"))));
    }

    #[test]
    fn test_transitive_property() {
        let p = ex("partOf");
        let graph = ontology(vec![
            t(p.clone(), a(), Term::iri(owl::TRANSITIVE_PROPERTY)),
            t(ex("a"), p.clone(), ex("b")),
            t(ex("b"), p.clone(), ex("c")),
        ]);
        let mut engine = ReasoningEngine::new();
        engine.compute_closure(&graph).unwrap();

        assert!(engine.closure().contains(&t(ex("a"), p.clone(), ex("c"))));
        assert!(!engine.closure().contains(&t(ex("c"), p, ex("a"))));
    }

    #[test]
    fn test_disjunctive_head_dropped_siblings_compile() {
        let x = Term::var("x");
        let clauses = vec![
            Clause::new(
                "either",
                Formula::or(vec![
                    Formula::atom(x.clone(), a(), ex("A")),
                    Formula::atom(x.clone(), a(), ex("B")),
                ]),
                Formula::atom(x.clone(), a(), ex("C")),
            ),
            Clause::new("plain", Formula::atom(x.clone(), a(), ex("D")), Formula::atom(x.clone(), a(), ex("C"))),
        ];
        let normalized = normalize_all(&clauses);
        assert_eq!(normalized.dropped.len(), 1);

        let mut network = Network::new(BuiltinRegistry::standard());
        let report = network.add_rules(normalized.rules);
        assert_eq!(report.added.len(), 1);

        network.feed(vec![t(ex("c1"), a(), ex("C"))]).unwrap();
        assert!(network.working_memory().contains(&t(ex("c1"), a(), ex("D"))));
        assert!(!network.working_memory().contains(&t(ex("c1"), a(), ex("A"))));
    }

    #[test]
    fn test_builtin_gates_firing() {
        let mut engine = ReasoningEngine::new();
        engine
            .load_n3_rules(
                r#"
                @prefix ex: <http://example.org/> .
                @prefix math: <http://www.w3.org/2000/10/swap/math#> .
                { ?s ex:reading ?v . ?v math:greaterThan 100 } => { ?s a ex:Overheated } .
                "#,
            )
            .unwrap();
        engine
            .feed(vec![
                t(ex("s1"), ex("reading"), Term::integer(120)),
                t(ex("s2"), ex("reading"), Term::integer(80)),
            ])
            .unwrap();

        assert!(engine.closure().contains(&t(ex("s1"), a(), ex("Overheated"))));
        assert!(!engine.closure().contains(&t(ex("s2"), a(), ex("Overheated"))));
    }

    #[test]
    fn test_join_produces_exactly_one_triple() {
        let mut network = Network::new(BuiltinRegistry::new());
        network.add_rule(HornRule::new(
            "join",
            vec![t(Term::var("x"), ex("p"), Term::var("y")), t(Term::var("y"), ex("q"), Term::var("z"))],
            vec![t(Term::var("x"), ex("r"), Term::var("z"))],
        ));
        network.feed(vec![t(ex("a"), ex("p"), ex("b")), t(ex("b"), ex("q"), ex("c"))]).unwrap();

        assert_eq!(network.inferred().sorted(), vec![t(ex("a"), ex("r"), ex("c"))]);
    }

    #[test]
    fn test_identical_patterns_share_one_alpha_node() {
        let x = Term::var("x");
        let mut network = Network::new(BuiltinRegistry::new());
        network.add_rules(vec![
            HornRule::new("to-a", vec![t(x.clone(), a(), ex("C"))], vec![t(x.clone(), a(), ex("A"))]),
            HornRule::new("to-b", vec![t(x.clone(), a(), ex("C"))], vec![t(x.clone(), a(), ex("B"))]),
        ]);

        assert_eq!(network.alpha_nodes().len(), 1);
        assert_eq!(network.productions().len(), 2);
    }

    #[test]
    fn test_idempotent_closure() {
        let graph = ontology(vec![
            t(ex("Dog"), Term::iri(rdfs::SUB_CLASS_OF), ex("Animal")),
            t(ex("fido"), a(), ex("Dog")),
        ]);
        let mut engine = ReasoningEngine::new();
        let first = engine.compute_closure(&graph).unwrap();

        let closed = engine.closure().sorted();
        let refeed = engine.feed(closed).unwrap();
        assert_eq!(refeed.asserted, 0);
        assert_eq!(refeed.inferred, 0);

        let second = engine.compute_closure(&graph).unwrap();
        assert_eq!(first.inferred_triples, second.inferred_triples);
    }

    #[test]
    fn test_existential_head_mints_per_support() {
        let x = Term::var("x");
        let b = Term::var("b");
        let mut network = Network::new(BuiltinRegistry::new());
        network.add_rule(HornRule::new(
            "detected",
            vec![t(x.clone(), a(), ex("Det"))],
            vec![t(x.clone(), ex("has"), b.clone()), t(b, a(), ex("Inf"))],
        ));
        network.feed(vec![t(ex("d1"), a(), ex("Det")), t(ex("d2"), a(), ex("Det"))]).unwrap();
        network.feed(vec![t(ex("d1"), a(), ex("Det"))]).unwrap();

        let minted = network.working_memory().subjects(&a(), &ex("Inf"));
        assert_eq!(minted.len(), 2);
        assert!(minted.iter().all(Term::is_blank));
    }

    #[tokio::test]
    async fn test_shared_reasoner_end_to_end() {
        let shared = SharedReasoner::with_options(EngineOptions { feed_ontology_triples: false, ..Default::default() });
        let schema = ontology(vec![t(ex("Cat"), Term::iri(rdfs::SUB_CLASS_OF), ex("Animal"))]);
        shared.compute_closure(&schema).await.unwrap();
        assert!(!shared.contains(&t(ex("Cat"), Term::iri(rdfs::SUB_CLASS_OF), ex("Animal"))).await);

        shared.feed(vec![t(ex("tama"), a(), ex("Cat"))]).await.unwrap();
        assert!(shared.contains(&t(ex("tama"), a(), ex("Animal"))).await);
    }

    proptest! {
        #[test]
        fn prop_closure_is_order_independent(seed in proptest::collection::vec(0usize..6, 1..12), rotate in 0usize..12) {
            let facts: Vec<Triple> = seed
                .windows(2)
                .map(|w| t(ex(&format!("n{}", w[0])), ex("partOf"), ex(&format!("n{}", w[1]))))
                .collect();
            let schema = ontology(vec![t(ex("partOf"), a(), Term::iri(owl::TRANSITIVE_PROPERTY))]);

            let run = |facts: Vec<Triple>| {
                let mut engine = ReasoningEngine::new();
                engine.load_ontology(&schema).unwrap();
                engine.feed(facts).unwrap();
                engine.closure().sorted()
            };

            let mut permuted = facts.clone();
            permuted.reverse();
            if !permuted.is_empty() {
                let k = rotate % permuted.len();
                permuted.rotate_left(k);
            }
            prop_assert_eq!(run(facts), run(permuted));
        }
    }
}
