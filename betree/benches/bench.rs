use criterion::{Criterion, black_box, criterion_group, criterion_main};

use betree::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

const KEYS: [&str; 4] = ["val1", "val2", "user.name", "score"];

fn build_simple_tree() -> LogicalNode {
    // val1 == "1" && !(val2 > 10)
    eq("val1", "1") & !gt("val2", 10)
}

fn build_complex_tree() -> LogicalNode {
    // Seeded so that every run measures the same tree. Integer keys are the
    // even-length ones, so evaluation against `build_attributes` never faults.
    let mut rng = ChaCha20Rng::seed_from_u64(0x42);

    fn next_create(budget: usize, rng: &mut impl Rng) -> LogicalNode {
        if budget == 0 || rng.random_bool(0.2) {
            let key = KEYS[rng.random_range(0..KEYS.len())];
            let value = if key.len() % 2 == 0 {
                AttributeValue::Integer(rng.random_range(-100..100))
            } else {
                AttributeValue::Text(format!("name{}", rng.random_range(0..10)))
            };
            let op = match rng.random_range(0..4) {
                0 => ComparisonOp::Eq,
                1 => ComparisonOp::NotEq,
                2 => ComparisonOp::Lt,
                _ => ComparisonOp::Gt,
            };
            return Comparison::new(op, key, value).into();
        }

        match rng.random_range(0..3) {
            0 => and(next_create(budget - 1, rng), next_create(budget - 1, rng)),
            1 => or(next_create(budget - 1, rng), next_create(budget - 1, rng)),
            _ => not(next_create(budget - 1, rng)),
        }
    }

    next_create(10, &mut rng)
}

fn build_attributes() -> AttributeMap {
    let mut attrs = AttributeMap::new();
    attrs.insert("val1".into(), 7.into());
    attrs.insert("val2".into(), (-3).into());
    attrs.insert("user.name".into(), "name4".into());
    attrs.insert("score".into(), "name9".into());
    attrs
}

fn bench_eval(c: &mut Criterion) {
    let simple_tree = build_simple_tree();
    let complex_tree = build_complex_tree();
    let attrs = build_attributes();

    let mut simple_attrs = AttributeMap::new();
    simple_attrs.insert("val1".into(), "1".into());
    simple_attrs.insert("val2".into(), 3.into());

    c.bench_function("eval_simple", |b| {
        b.iter(|| black_box(simple_tree.eval(&simple_attrs)))
    });

    c.bench_function("eval_complex", |b| {
        b.iter(|| black_box(complex_tree.eval(&attrs)))
    });
}

fn bench_codec(c: &mut Criterion) {
    let codec = Codec::default();
    let simple_tree = build_simple_tree();
    let complex_tree = build_complex_tree();

    c.bench_function("serialize_simple", |b| {
        b.iter(|| black_box(codec.serialize(&simple_tree)))
    });

    c.bench_function("serialize_complex", |b| {
        b.iter(|| black_box(codec.serialize(&complex_tree)))
    });

    let simple_bytes = codec.serialize(&simple_tree).unwrap();
    let complex_bytes = codec.serialize(&complex_tree).unwrap();

    c.bench_function("deserialize_simple", |b| {
        b.iter(|| black_box(codec.deserialize(&simple_bytes)))
    });

    c.bench_function("deserialize_complex", |b| {
        b.iter(|| black_box(codec.deserialize(&complex_bytes)))
    });
}

fn bench_parse(c: &mut Criterion) {
    let text = build_complex_tree().to_string();

    c.bench_function("parse_complex", |b| b.iter(|| black_box(parse(&text))));
}

criterion_group!(benches, bench_eval, bench_codec, bench_parse);
criterion_main!(benches);
