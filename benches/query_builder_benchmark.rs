use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rdf4j::{detect_query_type, select, GraphPattern, WhereClause};

/// Benchmark SELECT construction with a growing number of triple patterns
fn bench_select_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_build");

    for size in [1, 10, 100].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let mut query = select(["?s", "?o"]);
                query.prefix("ex", "http://example.org/");
                for i in 0..size {
                    query.triple("?s", format!("ex:p{}", i), "?o");
                }
                query.order_by(["?s"]).limit(100);
                criterion::black_box(query.build().map(|text| text.len()))
            });
        });
    }
    group.finish();
}

/// Benchmark nested UNION / OPTIONAL rendering
fn bench_nested_patterns(c: &mut Criterion) {
    let mut left = GraphPattern::new();
    left.triple("?x", "a", "foaf:Person");
    let mut right = GraphPattern::new();
    right.triple("?x", "a", "foaf:Agent");

    c.bench_function("union_optional", |b| {
        b.iter(|| {
            let mut query = select(["?x", "?name"]);
            query
                .union([&left, &right])
                .and_then(|q| q.optional(("?x", "foaf:name", "?name")))
                .map(|q| q.build().map(|text| text.len()))
        });
    });
}

/// Benchmark query-form detection on queries with long prologues and comments
fn bench_detect(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect_query_type");

    for prefixes in [0, 10, 100].iter() {
        let mut query = String::from("# generated query <with # inside>\n");
        for i in 0..*prefixes {
            query.push_str(&format!("PREFIX p{}: <http://example.org/ns{}#>\n", i, i));
        }
        query.push_str("SELECT ?s WHERE { ?s ?p \"a # b\" } # trailing");

        group.bench_with_input(BenchmarkId::from_parameter(prefixes), &query, |b, query| {
            b.iter(|| criterion::black_box(detect_query_type(query)));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_select_build,
    bench_nested_patterns,
    bench_detect
);
criterion_main!(benches);
