//! Criterion benchmarks for block tree operations.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure the operations a drag gesture hammers on every
//! pointer event (hit-testing, insertion, removal) and whole-program
//! (de)serialization, for programs of increasing size.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};

use block_editor::core::registry::SchemaRegistry;
use block_editor::core::schema::{BlockSchema, IoKind, Slot, ValueType};
use block_editor::layout::{LayoutMetrics, MonospaceMetrics};
use block_editor::tree::{BlockNode, BlockSequence, Removal};
use block_editor::ContainerId;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn registry() -> SchemaRegistry {
    let registry = SchemaRegistry::new();
    registry
        .register_all([
            BlockSchema::new(
                "ADD",
                ValueType::Num,
                ValueType::None,
                vec![vec![Slot::Code(IoKind::NumIn), Slot::Text("+".into()), Slot::Code(IoKind::NumIn)]],
            ),
            BlockSchema::new(
                "PRINT",
                ValueType::None,
                ValueType::Text,
                vec![vec![Slot::Text("print".into()), Slot::Code(IoKind::TextIn)]],
            ),
            BlockSchema::new(
                "REPEAT",
                ValueType::None,
                ValueType::None,
                vec![vec![Slot::Text("repeat".into()), Slot::Code(IoKind::NumIn)], vec![]],
            ),
        ])
        .unwrap();
    registry
}

/// A loop holding `count` print statements, each printing a small sum
fn program(count: usize) -> Value {
    let body: Vec<Value> = (0..count)
        .map(|i| {
            json!({"id": "PRINT", "params": [{"id": "ADD", "params": [i.to_string(), "1"]}]})
        })
        .collect();
    json!({"id": "REPEAT", "params": ["10"], "blocks": [body]})
}

/// Nested additions `depth` levels deep in the first socket
fn nested_sum(depth: usize) -> Value {
    (0..depth).fold(json!({"id": "ADD", "params": ["1", "2"]}), |inner, _| {
        json!({"id": "ADD", "params": [inner, "3"]})
    })
}

// ---------------------------------------------------------------------------
// Serialization Benchmarks
// ---------------------------------------------------------------------------

fn bench_deserialize(c: &mut Criterion) {
    let registry = registry();
    let metrics = MonospaceMetrics::default();
    let mut group = c.benchmark_group("deserialize");

    for count in [10, 100, 1_000] {
        let value = program(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &value, |b, value| {
            b.iter(|| black_box(BlockNode::from_json(value, &registry, &metrics).unwrap()));
        });
    }
    group.finish();
}

fn bench_serialize(c: &mut Criterion) {
    let registry = registry();
    let metrics = MonospaceMetrics::default();
    let mut group = c.benchmark_group("serialize");

    for count in [10, 100, 1_000] {
        let tree = BlockNode::from_json(&program(count), &registry, &metrics).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(count), &tree, |b, tree| {
            b.iter(|| black_box(tree.to_json_string()));
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Hit-testing Benchmarks
// ---------------------------------------------------------------------------

fn bench_value_type_at(c: &mut Criterion) {
    let registry = registry();
    let metrics = MonospaceMetrics::default();
    let mut group = c.benchmark_group("value_type_at");

    for count in [10, 100, 1_000] {
        let tree = BlockNode::from_json(&program(count), &registry, &metrics).unwrap();
        let (x, y) = last_statement_socket(&tree, &metrics);
        group.bench_with_input(BenchmarkId::from_parameter(count), &tree, |b, tree| {
            b.iter(|| black_box(tree.value_type_at(x, y, &metrics)));
        });
    }
    group.finish();
}

fn bench_deep_hit_test(c: &mut Criterion) {
    let registry = registry();
    let metrics = MonospaceMetrics::default();
    let mut group = c.benchmark_group("deep_hit_test");

    for depth in [8, 20, 40] {
        let tree = BlockNode::from_json(&nested_sum(depth), &registry, &metrics).unwrap();
        let (x, y) = (metrics.config().inner_padding_horizontal + 30.0, tree.height() / 2.0);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &tree, |b, tree| {
            b.iter(|| black_box(tree.value_at(x, y, &metrics)));
        });
    }
    group.finish();
}

/// Center of the socket of the last print statement, in loop coordinates
fn last_statement_socket(tree: &BlockNode, metrics: &dyn LayoutMetrics) -> (f32, f32) {
    let body = tree.sequence(1).unwrap();
    let (sx, sy) = tree.sequence_origin(1, metrics).unwrap();
    let last = body.len() - 1;
    let top = body.element_top(last, metrics);
    let (x, y) = body
        .get(last)
        .unwrap()
        .slot_bounds(0, 1, metrics)
        .unwrap()
        .center();
    (sx + x, sy + top + y)
}

// ---------------------------------------------------------------------------
// Mutation Benchmarks
// ---------------------------------------------------------------------------

fn bench_remove_and_reinsert(c: &mut Criterion) {
    let registry = registry();
    let metrics = MonospaceMetrics::default();
    let mut group = c.benchmark_group("remove_and_reinsert");

    for count in [10, 100, 1_000] {
        let mut tree = BlockNode::from_json(&program(count), &registry, &metrics).unwrap();
        let (sx, sy) = tree.sequence_origin(1, &metrics).unwrap();
        let middle = tree.sequence(1).unwrap().element_top(count / 2, &metrics) + 10.0;
        let (x, y) = (sx + 15.0, sy + middle);

        group.bench_function(BenchmarkId::from_parameter(count), |b| {
            b.iter(|| {
                if let Removal::Detached(node) = tree.remove_at(x, y, &metrics) {
                    let outcome = tree.insert_at(node, x, y - 10.0, &metrics);
                    black_box(outcome.is_inserted());
                }
            });
        });
    }
    group.finish();
}

fn bench_sequence_append(c: &mut Criterion) {
    let registry = registry();
    let metrics = MonospaceMetrics::default();
    let schema = registry.get("PRINT").unwrap();

    c.bench_function("sequence_append_100", |b| {
        b.iter(|| {
            let mut seq = BlockSequence::new();
            let parent = ContainerId::new();
            for _ in 0..100 {
                let node = BlockNode::new(schema.clone(), &metrics);
                let below = seq.height(&metrics) + 1.0;
                seq.insert_at(node, 10.0, below, parent, &metrics);
            }
            black_box(seq.len())
        });
    });
}

criterion_group!(
    benches,
    bench_deserialize,
    bench_serialize,
    bench_value_type_at,
    bench_deep_hit_test,
    bench_remove_and_reinsert,
    bench_sequence_append,
);
criterion_main!(benches);
