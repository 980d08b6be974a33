//! Items related to strongly typed Genetic Programming.
//!
//! Expressions are trees of functions. Each function has an arity (the number of inputs it
//! takes) and an output type, and each of its argument slots accepts a single type. Functions
//! with an arity of `0` are terminals and form the leaves of a tree.
//!
//! - `registry`: the types and functions trees may be built from.
//! - `expr`: the tree itself and its evaluation.
//! - `gen`: random tree construction (grow, full and brett-grow).

pub mod expr;
pub mod gen;
pub mod registry;
