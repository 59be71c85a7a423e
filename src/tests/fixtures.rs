//! Shared schemas and helpers for the test suites
//!
//! Geometry in the suites assumes the default [`LayoutConfig`] with
//! [`MonospaceMetrics`]: 10px characters, 20px text lines.
//!
//! | schema  | lines                              | returns | takes |
//! |---------|------------------------------------|---------|-------|
//! | ADD     | `[NUM_IN, "+", NUM_IN]`            | NUM     |       |
//! | LIT_5   | `["5"]`                            | NUM     |       |
//! | TRUE    | `["true"]`                         | BOOL    |       |
//! | WORD    | `["word"]`                         | TEXT    |       |
//! | PRINT   | `["print", TEXT_IN]`               |         | TEXT  |
//! | SET     | `["set", NUM_OUT]`                 |         | NUM   |
//! | IF      | `["if", BOOL_IN]`, sequence        |         |       |
//! | IF_ELSE | `["if", BOOL_IN]`, seq, `["else"]`, seq |    |       |
//! | A, B, C | `["a"]`, `["b"]`, `["c"]`          |         |       |

use std::sync::Arc;

use crate::core::registry::SchemaRegistry;
use crate::core::schema::{BlockSchema, IoKind, Slot, ValueType};
use crate::layout::{LayoutConfig, MonospaceMetrics, Rect};
use crate::tree::BlockNode;
use crate::workspace::Workspace;

fn label(text: &str) -> Slot {
    Slot::Text(text.to_string())
}

fn socket(kind: IoKind) -> Slot {
    Slot::Code(kind)
}

fn statement(id: &str) -> BlockSchema {
    BlockSchema::new(
        id,
        ValueType::None,
        ValueType::None,
        vec![vec![label(&id.to_lowercase())]],
    )
    .with_category(4)
}

pub fn schemas() -> Vec<BlockSchema> {
    vec![
        BlockSchema::new(
            "ADD",
            ValueType::Num,
            ValueType::None,
            vec![vec![socket(IoKind::NumIn), label("+"), socket(IoKind::NumIn)]],
        )
        .with_name("Add")
        .with_category(1),
        BlockSchema::new("LIT_5", ValueType::Num, ValueType::None, vec![vec![label("5")]]).with_category(1),
        BlockSchema::new("TRUE", ValueType::Bool, ValueType::None, vec![vec![label("true")]]).with_category(1),
        BlockSchema::new("WORD", ValueType::Text, ValueType::None, vec![vec![label("word")]]).with_category(1),
        BlockSchema::new(
            "PRINT",
            ValueType::None,
            ValueType::Text,
            vec![vec![label("print"), socket(IoKind::TextIn)]],
        )
        .with_name("Print")
        .with_category(3),
        BlockSchema::new(
            "SET",
            ValueType::None,
            ValueType::Num,
            vec![vec![label("set"), socket(IoKind::NumOut)]],
        )
        .with_category(3),
        BlockSchema::new(
            "IF",
            ValueType::None,
            ValueType::None,
            vec![vec![label("if"), socket(IoKind::BoolIn)], vec![]],
        )
        .with_name("If")
        .with_category(2),
        BlockSchema::new(
            "IF_ELSE",
            ValueType::None,
            ValueType::None,
            vec![
                vec![label("if"), socket(IoKind::BoolIn)],
                vec![],
                vec![label("else")],
                vec![],
            ],
        )
        .with_category(2),
        statement("A"),
        statement("B"),
        statement("C"),
    ]
}

pub fn registry() -> SchemaRegistry {
    let registry = SchemaRegistry::new();
    registry
        .register_all(schemas())
        .expect("fixture schemas are valid");
    registry
}

pub fn metrics() -> MonospaceMetrics {
    MonospaceMetrics::new(LayoutConfig::default())
}

/// Fresh detached instance of a fixture schema
pub fn node(registry: &SchemaRegistry, id: &str, metrics: &MonospaceMetrics) -> BlockNode {
    BlockNode::new(registry.get(id).expect("fixture schema"), metrics)
}

pub fn workspace(registry: &SchemaRegistry) -> Workspace {
    Workspace::new(registry.clone(), Arc::new(metrics()))
}

/// Center of a rectangle shifted by an origin
pub fn center_in(origin: (f32, f32), rect: Rect) -> (f32, f32) {
    let (x, y) = rect.center();
    (origin.0 + x, origin.1 + y)
}
