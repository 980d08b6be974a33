//! Registries and helpers shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use typegp::{NodeRef, Random, Registry, Tree, Value};

fn num(args: &[Value], i: usize) -> f64 {
    args[i].as_f64().unwrap_or(0.0)
}

fn binary_num<F>(reg: &mut Registry, name: &str, f: F)
where
    F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
{
    let call = move |out: &mut Value, args: &[Value], _: &()| {
        *out = Value::Double(f(num(args, 0), num(args, 1)));
    };
    reg.register_function(name, "num", call, 2, None).unwrap();
    reg.associate_input(name, &["num", "num"]).unwrap();
}

fn compare<F>(reg: &mut Registry, name: &str, f: F)
where
    F: Fn(f64, f64) -> bool + Send + Sync + 'static,
{
    let call = move |out: &mut Value, args: &[Value], _: &()| {
        *out = Value::Bool(f(num(args, 0), num(args, 1)));
    };
    reg.register_function(name, "bool", call, 2, None).unwrap();
    reg.associate_input(name, &["num", "num"]).unwrap();
}

// Keeps whatever the initializer stored.
fn constant(_: &mut Value, _: &[Value], _: &()) {}

/// `num` and `bool`, arithmetic over `num`, comparisons producing `bool` and a `value` terminal
/// whose initializer always yields `3.0`.
pub fn symbolic() -> Registry {
    let mut reg = Registry::new();
    reg.register_type("num").unwrap();
    reg.register_type("bool").unwrap();
    binary_num(&mut reg, "add", |a, b| a + b);
    binary_num(&mut reg, "sub", |a, b| a - b);
    binary_num(&mut reg, "mul", |a, b| a * b);
    binary_num(&mut reg, "div", |a, b| if b == 0.0 { 0.0 } else { a / b });
    compare(&mut reg, "less", |a, b| a < b);
    compare(&mut reg, "greater", |a, b| a > b);
    reg.register_terminal_function(
        "value",
        "num",
        constant,
        Some(Box::new(|out: &mut Value, _: &mut Random| *out = Value::Double(3.0))),
    )
    .unwrap();
    reg
}

/// `symbolic` plus boolean constants, negation, and an `if` that consumes a `bool`, so that every
/// type has both terminals and non-terminals.
pub fn typed() -> Registry {
    let mut reg = symbolic();
    reg.register_terminal_function(
        "const",
        "num",
        constant,
        Some(Box::new(|out: &mut Value, rng: &mut Random| {
            *out = Value::Double(rng.random_double(-2.0, 2.0))
        })),
    )
    .unwrap();
    reg.register_terminal_function(
        "true",
        "bool",
        |out: &mut Value, _: &[Value], _: &()| *out = Value::Bool(true),
        None,
    )
    .unwrap();
    reg.register_terminal_function(
        "false",
        "bool",
        |out: &mut Value, _: &[Value], _: &()| *out = Value::Bool(false),
        None,
    )
    .unwrap();
    reg.register_function(
        "not",
        "bool",
        |out: &mut Value, args: &[Value], _: &()| {
            *out = Value::Bool(!args[0].as_bool().unwrap_or(false));
        },
        1,
        None,
    )
    .unwrap();
    reg.associate_input("not", &["bool"]).unwrap();
    reg.register_function(
        "if",
        "num",
        |out: &mut Value, args: &[Value], _: &()| {
            *out = if args[0].as_bool().unwrap_or(false) { args[1] } else { args[2] };
        },
        3,
        None,
    )
    .unwrap();
    reg.associate_input("if", &["bool", "num", "num"]).unwrap();
    reg
}

/// A log of `(node id, child ids)` in the order functions were called.
pub type CallLog = Arc<Mutex<Vec<(u64, Vec<u64>)>>>;

/// A registry whose nodes record every call they receive.
///
/// Each node is given a unique id by its initializer and keeps it as its value, so the log
/// identifies exactly which node ran and which children it was handed.
pub fn instrumented() -> (Registry, CallLog) {
    let log = CallLog::default();
    let next_id = Arc::new(AtomicU64::new(0));
    let mut reg = Registry::new();
    reg.register_type("num").unwrap();
    for (name, arity) in [("leaf", 0), ("unary", 1), ("binary", 2), ("ternary", 3)] {
        let log = log.clone();
        let next_id = next_id.clone();
        let call = move |out: &mut Value, args: &[Value], _: &()| {
            let id = out.as_u64().expect("every node has an id");
            let children = args.iter().map(|a| a.as_u64().expect("child has an id")).collect();
            log.lock().unwrap().push((id, children));
        };
        let init = move |out: &mut Value, _: &mut Random| {
            *out = Value::UInt(next_id.fetch_add(1, Ordering::SeqCst));
        };
        reg.register_function(name, "num", call, arity, Some(Box::new(init))).unwrap();
        if arity > 0 {
            reg.associate_input(name, &vec!["num"; arity]).unwrap();
        }
    }
    (reg, log)
}

/// Every node of the tree alongside its depth, in pre-order.
pub fn nodes<'t, E>(tree: &'t Tree<E>) -> Vec<(NodeRef<'t, E>, usize)> {
    let mut nodes = Vec::new();
    let mut stack = vec![(tree.root(), 0)];
    while let Some((node, depth)) = stack.pop() {
        nodes.push((node, depth));
        let children = node.children().collect::<Vec<_>>();
        stack.extend(children.into_iter().rev().map(|c| (c, depth + 1)));
    }
    nodes
}

/// The depth of every leaf.
pub fn leaf_depths<E>(tree: &Tree<E>) -> Vec<usize> {
    nodes(tree)
        .into_iter()
        .filter(|(node, _)| node.arity() == 0)
        .map(|(_, depth)| depth)
        .collect()
}
