#![allow(dead_code)]

use betree::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

pub const KEYS: [&str; 6] = ["val1", "val2", "user.id", "user.name", "_region", "score"];

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn rng(seed: u64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(seed)
}

pub fn random_value(rng: &mut impl Rng) -> AttributeValue {
    if rng.random_bool(0.5) {
        AttributeValue::Integer(rng.random_range(-50..=50))
    } else {
        const WORDS: [&str; 5] = ["", "a", "b", "eu\"west", "tab\tsep"];
        AttributeValue::Text(WORDS[rng.random_range(0..WORDS.len())].to_string())
    }
}

/// Random tree of at most `budget` levels over [`KEYS`].
///
/// When `kind_of` is given, every leaf on a key uses the kind chosen for that key,
/// so the tree never faults against maps built with the same function.
pub fn random_tree(
    budget: usize,
    rng: &mut impl Rng,
    kind_of: Option<&dyn Fn(&str) -> ValueKind>,
) -> LogicalNode {
    if budget <= 1 || rng.random_bool(0.25) {
        let key = KEYS[rng.random_range(0..KEYS.len())];
        let mut value = random_value(rng);
        if let Some(kind_of) = kind_of {
            while value.kind() != kind_of(key) {
                value = random_value(rng);
            }
        }
        let op = match rng.random_range(0..4) {
            0 => ComparisonOp::Eq,
            1 => ComparisonOp::NotEq,
            2 => ComparisonOp::Lt,
            _ => ComparisonOp::Gt,
        };
        return Comparison::new(op, key, value).into();
    }

    match rng.random_range(0..3) {
        0 => and(
            random_tree(budget - 1, rng, kind_of),
            random_tree(budget - 1, rng, kind_of),
        ),
        1 => or(
            random_tree(budget - 1, rng, kind_of),
            random_tree(budget - 1, rng, kind_of),
        ),
        _ => not(random_tree(budget - 1, rng, kind_of)),
    }
}

/// Integers for keys of even length, text otherwise.
pub fn kind_by_key_length(key: &str) -> ValueKind {
    if key.len() % 2 == 0 {
        ValueKind::Integer
    } else {
        ValueKind::Text
    }
}

/// Random attribute map consistent with [`kind_by_key_length`]; some keys are left out.
pub fn random_attributes(rng: &mut impl Rng) -> AttributeMap {
    let mut attrs = AttributeMap::new();
    for key in KEYS {
        if rng.random_bool(0.2) {
            continue;
        }
        let mut value = random_value(rng);
        while value.kind() != kind_by_key_length(key) {
            value = random_value(rng);
        }
        attrs.insert(key.to_string(), value);
    }
    attrs
}
