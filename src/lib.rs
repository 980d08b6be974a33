//! A strongly typed genetic programming tree engine.
//!
//! A caller registers the types and functions of a problem with a `Registry`, builds random
//! well-typed `Tree`s from it using a seeded `Random`, and evaluates them bottom-up to obtain a
//! value and a fitness.
//!
//! ```
//! use typegp::{ConstructionInfo, Init, Random, Registry, Tree, Value};
//!
//! let mut registry = Registry::<f64>::new();
//! registry.register_type("num")?;
//! registry.register_function(
//!     "add",
//!     "num",
//!     |out: &mut Value, args: &[Value], _: &f64| {
//!         let a = args[0].as_f64().unwrap_or(0.0);
//!         let b = args[1].as_f64().unwrap_or(0.0);
//!         *out = Value::Double(a + b);
//!     },
//!     2,
//!     None,
//! )?;
//! registry.register_terminal_function(
//!     "x",
//!     "num",
//!     |out: &mut Value, _: &[Value], x: &f64| *out = Value::Double(*x),
//!     None,
//! )?;
//! registry.associate_input("add", &["num", "num"])?;
//!
//! let mut rng = Random::new(42);
//! let info = ConstructionInfo::new(Init::Full);
//! let num = registry.type_id("num")?;
//! let mut tree = Tree::make_tree(&info, &registry, &mut rng, 2, 2, Some(num))?;
//! let (value, ty) = tree.execute(&1.5);
//! assert_eq!(value, Value::Double(6.0));
//! assert_eq!(ty, num);
//! # Ok::<(), typegp::Error>(())
//! ```

pub mod error;
pub mod gp;
pub mod population;
pub mod random;
pub mod value;

pub use error::{Error, Result};
pub use gp::expr::{Fitness, NodeRef, Tree};
pub use gp::gen::{make_tree, ConstructionInfo, Init};
pub use gp::registry::{FunctionId, Registry, TypeId};
pub use population::{Population, PopulationConfig, PopulationInit};
pub use random::Random;
pub use value::Value;
