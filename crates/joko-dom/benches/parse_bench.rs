//! Markup parse/serialize benchmarks.

use criterion::{Criterion, criterion_group, criterion_main};
use joko_dom::{Document, Element};
use std::hint::black_box;

fn deep_list(items: usize) -> String {
    Element::new("div")
        .attr("id", "app")
        .children((0..items).map(|n| {
            Element::new("li")
                .attr("data-joko-click", "select")
                .text(format!("item {n} & more"))
        }))
        .to_markup()
}

fn bench_parse(c: &mut Criterion) {
    let small = deep_list(5);
    let large = deep_list(200);

    c.bench_function("parse_small_fragment", |b| {
        b.iter(|| {
            let mut doc = Document::new();
            black_box(doc.parse_markup(black_box(&small)).unwrap());
        });
    });

    c.bench_function("parse_large_fragment", |b| {
        b.iter(|| {
            let mut doc = Document::new();
            black_box(doc.parse_markup(black_box(&large)).unwrap());
        });
    });

    c.bench_function("serialize_large_fragment", |b| {
        let mut doc = Document::new();
        let root = doc.parse_markup(&large).unwrap();
        b.iter(|| black_box(doc.to_markup(black_box(root))));
    });
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
