#![allow(clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::fmt::Write;
use xmlhandle::{XPathExpression, XmlDocument};

// ---------------------------------------------------------------------------
// Document generators
// ---------------------------------------------------------------------------

/// Generates a catalog with `n` book records.
fn make_catalog(n: usize) -> String {
    let mut xml = String::from("<?xml version=\"1.0\"?>\n<catalog>\n");
    for i in 0..n {
        let _ = writeln!(
            xml,
            "  <book id=\"bk{i}\"><title>Title {i}</title>\
             <price>{}.99</price></book>",
            10 + i % 50
        );
    }
    xml.push_str("</catalog>\n");
    xml
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

const QUERIES: &[&str] = &[
    "count(//book)",
    "//book[price > 40]/title",
    "string(/catalog/book[1]/@id)",
];

fn bench_context_reuse(c: &mut Criterion) {
    let mut group = c.benchmark_group("xpath");
    for size in [100, 1000] {
        let doc = XmlDocument::parse(&make_catalog(size)).unwrap();
        let root = doc.root_node();

        group.bench_with_input(BenchmarkId::new("reused_context", size), &size, |b, _| {
            let ctx = doc.xpath_context().unwrap();
            b.iter(|| {
                for q in QUERIES {
                    black_box(ctx.eval(black_box(q)).unwrap());
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("node_xpath", size), &size, |b, _| {
            b.iter(|| {
                for q in QUERIES {
                    black_box(root.xpath(black_box(q)).unwrap());
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("compiled", size), &size, |b, _| {
            let ctx = doc.xpath_context().unwrap();
            let compiled: Vec<_> = QUERIES
                .iter()
                .map(|q| XPathExpression::compile(q).unwrap())
                .collect();
            b.iter(|| {
                for expr in &compiled {
                    black_box(ctx.eval_compiled(expr).unwrap());
                }
            });
        });
    }
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let xml = make_catalog(1000);
    c.bench_function("parse_catalog_1000", |b| {
        b.iter(|| XmlDocument::parse(black_box(&xml)).unwrap());
    });
}

criterion_group!(benches, bench_context_reuse, bench_parse);
criterion_main!(benches);
