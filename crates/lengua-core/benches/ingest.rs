use criterion::{black_box, criterion_group, criterion_main, Criterion};

use lengua_core::ingest::{ingest_conjugations, ingest_spelling, parse_records};
use serde_json::{json, Value};

fn spelling_records(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| match i % 3 {
            0 => json!({ "pattern": "_uscar", "missing": "b" }),
            1 => json!({ "palabra": "vivir", "letra": "v" }),
            _ => json!({ "word": "hubo" }),
        })
        .collect()
}

fn conjugation_records(n: usize) -> Vec<Value> {
    (0..n)
        .map(|_| {
            json!({
                "forma": "habríamos cantado",
                "verbo": "cantar",
                "pronombre": "nosotros",
                "modo": "Indicativo",
                "tipo": "Condicional compuesto",
                "persona": 1,
                "numero": "plural",
                "grupo": "primera"
            })
        })
        .collect()
}

fn bench_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest");

    let spelling = spelling_records(500);
    group.bench_function("spelling_500", |b| {
        b.iter(|| ingest_spelling(black_box(&spelling)))
    });

    let conjugations = conjugation_records(500);
    group.bench_function("conjugations_500", |b| {
        b.iter(|| ingest_conjugations(black_box(&conjugations)))
    });

    let text = Value::Array(conjugation_records(500)).to_string();
    group.bench_function("parse_500", |b| b.iter(|| parse_records(black_box(&text))));

    group.finish();
}

criterion_group!(benches, bench_ingest);
criterion_main!(benches);
