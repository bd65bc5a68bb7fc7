use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mimizuku_core::vocabulary::{owl, rdf, rdfs};
use mimizuku_core::{Graph, Term, Triple};
use mimizuku_dlp::DlpCompiler;

/// Class hierarchy with a restriction on every tenth class
fn generate_ontology(classes: usize) -> Graph {
    let class = |i: usize| Term::iri(format!("http://example.org/C{}", i));
    let mut graph = Graph::new();
    for i in 1..classes {
        graph.insert(Triple::new(class(i), Term::iri(rdfs::SUB_CLASS_OF), class(i / 2)));
        if i % 10 == 0 {
            let r = Term::blank(format!("r{}", i));
            graph.insert(Triple::new(r.clone(), Term::iri(rdf::TYPE), Term::iri(owl::RESTRICTION)));
            graph.insert(Triple::new(r.clone(), Term::iri(owl::ON_PROPERTY), Term::iri("http://example.org/p")));
            graph.insert(Triple::new(r.clone(), Term::iri(owl::SOME_VALUES_FROM), class(i - 1)));
            graph.insert(Triple::new(r, Term::iri(rdfs::SUB_CLASS_OF), class(i)));
        }
    }
    graph
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("dlp_compile");

    for size in [100, 1_000] {
        let graph = generate_ontology(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &graph, |b, graph| {
            b.iter(|| black_box(DlpCompiler::new().compile(graph).rules.len()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compile);
criterion_main!(benches);
