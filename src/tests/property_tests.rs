//! Property-based tests using proptest.
//!
//! Programs are grown by dropping fresh blocks at random view positions, the
//! way a user builds one, and checked against invariants that must hold for
//! *any* sequence of edits.

use proptest::prelude::*;

use crate::core::registry::SchemaRegistry;
use crate::core::schema::{BlockSchema, IoKind, ValueType};
use crate::tests::fixtures::{registry, schemas, workspace};
use crate::tree::{BlockNode, BlockSequence};
use crate::workspace::Workspace;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const STATEMENTS: [&str; 5] = ["A", "B", "IF", "IF_ELSE", "PRINT"];
const EXPRESSIONS: [&str; 4] = ["ADD", "LIT_5", "TRUE", "WORD"];
const SOCKET_HOSTS: [&str; 5] = ["PRINT", "SET", "IF", "IF_ELSE", "ADD"];
const ANY_BLOCK: [&str; 9] = ["A", "IF", "IF_ELSE", "PRINT", "SET", "ADD", "LIT_5", "TRUE", "WORD"];

/// Drop a fresh block at a position relative to the current view size
fn drop_fresh(ws: &mut Workspace, registry: &SchemaRegistry, id: &str, fx: f32, fy: f32) {
    let node = BlockNode::new(registry.get(id).unwrap(), ws.metrics());
    let (x, y) = (fx * ws.width(), fy * ws.height());
    ws.insert_at(node, x, y);
}

fn drops(count: usize) -> impl Strategy<Value = Vec<(usize, f32, f32)>> {
    prop::collection::vec((0..count, 0.0f32..1.0, 0.0f32..1.2), 1..20)
}

/// Workspace holding one top-level block per pick from `SOCKET_HOSTS`
fn socket_program(registry: &SchemaRegistry, hosts: &[usize]) -> Workspace {
    let mut ws = workspace(registry);
    for &host in hosts {
        ws.add_block(SOCKET_HOSTS[host]).unwrap();
    }
    ws
}

fn hosts() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..SOCKET_HOSTS.len(), 1..5)
}

fn points() -> impl Strategy<Value = Vec<(f32, f32)>> {
    prop::collection::vec((-0.1f32..1.1, -0.1f32..1.1), 1..30)
}

// ---------------------------------------------------------------------------
// Size monotonicity
// ---------------------------------------------------------------------------

proptest! {
    /// Adding a statement anywhere never shrinks the program.
    #[test]
    fn adding_statements_never_shrinks(ops in drops(STATEMENTS.len())) {
        let registry = registry();
        let mut ws = workspace(&registry);
        for (kind, fx, fy) in ops {
            let (width, height) = (ws.width(), ws.height());
            drop_fresh(&mut ws, &registry, STATEMENTS[kind], fx, fy);
            prop_assert!(ws.width() >= width);
            prop_assert!(ws.height() > height);
        }
    }

    /// Removing a statement anywhere never grows the program.
    #[test]
    fn removing_statements_never_grows(ops in drops(STATEMENTS.len()), picks in points()) {
        let registry = registry();
        let mut ws = workspace(&registry);
        for (kind, fx, fy) in ops {
            drop_fresh(&mut ws, &registry, STATEMENTS[kind], fx, fy);
        }
        for (fx, fy) in picks {
            let (width, height) = (ws.width(), ws.height());
            let removed = ws.remove_at(fx * width, fy * height);
            prop_assert!(ws.width() <= width);
            if removed.is_some() {
                prop_assert!(ws.height() < height);
            } else {
                prop_assert_eq!(ws.height(), height);
            }
        }
    }

    /// Plugging expressions into sockets never shrinks the program.
    #[test]
    fn plugging_expressions_never_shrinks(hosts in hosts(), ops in drops(EXPRESSIONS.len())) {
        let registry = registry();
        let mut ws = socket_program(&registry, &hosts);
        for (kind, fx, fy) in ops {
            let (width, height) = (ws.width(), ws.height());
            drop_fresh(&mut ws, &registry, EXPRESSIONS[kind], fx, fy);
            prop_assert!(ws.width() >= width);
            prop_assert!(ws.height() >= height);
        }
    }

    /// Unplugging expressions from sockets never grows the program.
    #[test]
    fn unplugging_expressions_never_grows(
        hosts in hosts(),
        ops in drops(EXPRESSIONS.len()),
        picks in points(),
    ) {
        let registry = registry();
        let mut ws = socket_program(&registry, &hosts);
        for (kind, fx, fy) in ops {
            drop_fresh(&mut ws, &registry, EXPRESSIONS[kind], fx, fy);
        }
        for (fx, fy) in picks {
            let (width, height) = (ws.width(), ws.height());
            ws.remove_at(fx * width, fy * height);
            prop_assert!(ws.width() <= width);
            prop_assert!(ws.height() <= height);
        }
    }
}

// ---------------------------------------------------------------------------
// Round trip
// ---------------------------------------------------------------------------

proptest! {
    /// Any program built by edits reloads to an equal tree with equal geometry.
    #[test]
    fn edited_program_round_trips(
        ops in drops(ANY_BLOCK.len()),
        literals in prop::collection::vec((0.0f32..1.0, 0.0f32..1.0, "[a-z0-9]{0,6}"), 0..10),
    ) {
        let registry = registry();
        let mut ws = workspace(&registry);
        for (kind, fx, fy) in ops {
            drop_fresh(&mut ws, &registry, ANY_BLOCK[kind], fx, fy);
        }
        for (fx, fy, value) in literals {
            let (x, y) = (fx * ws.width(), fy * ws.height());
            ws.set_value_at(&value, x, y);
        }

        let state = ws.state();
        let reloaded = BlockSequence::from_json(&state, &registry, ws.id(), ws.metrics()).unwrap();
        prop_assert_eq!(&reloaded, ws.code());
        prop_assert_eq!(reloaded.to_json(), state.clone());

        let mut copy = workspace(&registry);
        copy.load(&state).unwrap();
        prop_assert_eq!(copy.width(), ws.width());
        prop_assert_eq!(copy.height(), ws.height());
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

proptest! {
    /// Value queries are pure, and a literal only sits where one is accepted.
    #[test]
    fn value_queries_are_pure(ops in drops(ANY_BLOCK.len()), queries in points()) {
        let registry = registry();
        let mut ws = workspace(&registry);
        for (kind, fx, fy) in ops {
            drop_fresh(&mut ws, &registry, ANY_BLOCK[kind], fx, fy);
        }
        let state = ws.state();

        for (fx, fy) in queries {
            let (x, y) = (fx * ws.width(), fy * ws.height());
            let kind = ws.value_type_at(x, y);
            prop_assert_eq!(ws.value_type_at(x, y), kind);
            if ws.value_at(x, y).is_some() {
                prop_assert_ne!(kind, ValueType::None);
            }
        }
        prop_assert_eq!(ws.state(), state);
    }

    /// The compatibility rules hold for every produced and consumed type.
    #[test]
    fn compatibility_rules(produced in 0usize..4, consumed in 0usize..4) {
        let types = [ValueType::Text, ValueType::Num, ValueType::Bool, ValueType::None];
        let (produced, consumed) = (types[produced], types[consumed]);
        let candidate = BlockSchema::new("X", produced, consumed, vec![vec![]]);

        prop_assert_eq!(IoKind::NumIn.accepts(&candidate), produced == ValueType::Num);
        prop_assert_eq!(IoKind::TextOut.accepts(&candidate), consumed == ValueType::Text);
        prop_assert_eq!(
            IoKind::TextIn.accepts(&candidate),
            produced != ValueType::None
        );
    }
}

#[test]
fn fixture_catalogue_round_trips_through_json() {
    let json = serde_json::to_string(&schemas()).unwrap();
    let parsed: Vec<BlockSchema> = serde_json::from_str(&json).unwrap();
    let registry = SchemaRegistry::new();
    registry.register_all(parsed).unwrap();
    assert_eq!(registry.count(), schemas().len());
    assert_eq!(registry.get("IF_ELSE").unwrap().sequence_line_count(), 2);
}
