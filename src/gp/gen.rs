//! Functions for generating random, well-typed trees.
//!
//! Trees are grown depth-first from a non-terminal root. Every argument slot is filled with a
//! function whose output type matches the slot, chosen according to the active `Init` policy:
//!
//! - **Grow**: until `min_depth`, the first slot of every node is a non-terminal so that at least
//!   one branch reaches the minimum depth. At `max_depth` every slot is a terminal. In between a
//!   weighted coin proposes a terminal, and when it does not a second uniform draw over all of the
//!   slot type's functions picks the node.
//! - **Full**: a target depth is drawn once per tree. Every slot above it is a non-terminal and
//!   every slot at it is a terminal.
//! - **BrettGrow**: like grow, but the weighted coin alone decides between a terminal and a
//!   non-terminal.
//!
//! The root is depth `0` and is always a non-terminal, so every tree has a depth of at least `1`.

use crate::error::{Error, Result};
use crate::gp::expr::{Node, Tree};
use crate::gp::registry::{FunctionId, Registry, TypeId};
use crate::random::Random;
use crate::value::Value;

/// The policy used to grow a tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Init {
    Grow,
    Full,
    BrettGrow,
}

/// Parameters shared by every tree built with the same policy.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ConstructionInfo {
    pub init: Init,
    /// The probability with which grow policies place a terminal below the maximum depth.
    pub terminal_chance: f64,
    /// How many levels past the leaf depth the terminal-shortage fallback may go before the build
    /// is abandoned.
    pub max_fallback_depth: usize,
}

impl ConstructionInfo {
    pub const DEFAULT_TERMINAL_CHANCE: f64 = 0.5;
    pub const DEFAULT_MAX_FALLBACK_DEPTH: usize = 16;

    pub fn new(init: Init) -> Self {
        ConstructionInfo {
            init,
            terminal_chance: Self::DEFAULT_TERMINAL_CHANCE,
            max_fallback_depth: Self::DEFAULT_MAX_FALLBACK_DEPTH,
        }
    }

    pub fn terminal_chance(mut self, chance: f64) -> Self {
        self.terminal_chance = chance;
        self
    }

    pub fn max_fallback_depth(mut self, depth: usize) -> Self {
        self.max_fallback_depth = depth;
        self
    }
}

impl Default for ConstructionInfo {
    fn default() -> Self {
        ConstructionInfo::new(Init::Grow)
    }
}

// What kind of function should fill a slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Pick {
    // `required` terminals go through the restricted fallback when none exist.
    Terminal { required: bool },
    NonTerminal,
    // Uniformly from every function producing the slot's type.
    Any,
}

// The context threaded through the construction of a single tree.
struct Builder<'a, 'r, E> {
    info: &'a ConstructionInfo,
    registry: &'r Registry<E>,
    rng: &'a mut Random,
    min_depth: usize,
    // Depth at which slots must be filled with terminals.
    leaf_depth: usize,
}

/// Generate a random tree.
///
/// When `starting_type` is given the root is a non-terminal producing that type, otherwise it is
/// drawn from every registered non-terminal. A `starting_type` unknown to `registry` is a
/// `TypeNotFound` error.
#[tracing::instrument(level = "debug", skip_all, fields(
    init = ?info.init,
    min_depth = min_depth,
    max_depth = max_depth,
))]
pub fn make_tree<'r, E>(
    info: &ConstructionInfo,
    registry: &'r Registry<E>,
    rng: &mut Random,
    min_depth: usize,
    max_depth: usize,
    starting_type: Option<TypeId>,
) -> Result<Tree<'r, E>> {
    if min_depth > max_depth {
        return Err(Error::InvalidDepth { min: min_depth, max: max_depth });
    }
    if !(0.0..=1.0).contains(&info.terminal_chance) {
        return Err(Error::InvalidChance(info.terminal_chance));
    }

    let leaf_depth = match info.init {
        Init::Full => rng.random_long(min_depth.max(1) as u64, max_depth.max(1) as u64) as usize,
        Init::Grow | Init::BrettGrow => max_depth.max(1),
    };
    let mut builder = Builder { info, registry, rng, min_depth, leaf_depth };
    let tree = builder.build(starting_type)?;

    tracing::trace!(nodes = tree.node_count(), depth = tree.depth(), "built tree");
    Ok(tree)
}

impl<'a, 'r, E> Builder<'a, 'r, E> {
    fn build(&mut self, starting_type: Option<TypeId>) -> Result<Tree<'r, E>> {
        let registry = self.registry;
        if let Some(ty) = starting_type {
            if ty.index() >= registry.type_count() {
                return Err(Error::TypeNotFound(ty.to_string()));
            }
        }
        let root = match starting_type {
            Some(ty) => *self
                .rng
                .select(registry.non_terminals(ty))
                .ok_or_else(|| no_candidates(registry, ty))?,
            None => self
                .rng
                .select(registry.all_non_terminals())
                .map(|&(_, function)| function)
                .ok_or_else(|| Error::NoCandidates { type_name: "<any>".to_string() })?,
        };
        let node = self.instantiate(root);
        let mut tree = Tree::with_root(registry, node);

        // Nodes still waiting for their children, alongside their depth.
        let mut stack = vec![(tree.root().index(), root, 0)];
        let mut depth = 0;
        while let Some((parent, function, parent_depth)) = stack.pop() {
            let child_depth = parent_depth + 1;
            let mut placed_non_terminal = false;
            for (slot, &ty) in registry.inputs(function)?.iter().enumerate() {
                let pick = self.pick(child_depth, placed_non_terminal);
                let child = self.resolve(ty, child_depth, pick)?;
                let node = self.instantiate(child);
                let nx = tree.add_child(parent, slot, node);
                if registry.arity(child) > 0 {
                    placed_non_terminal = true;
                    stack.push((nx, child, child_depth));
                } else {
                    depth = depth.max(child_depth);
                }
            }
        }

        tree.set_shape(depth);
        Ok(tree)
    }

    // Decide what kind of function a slot at `depth` should hold.
    fn pick(&mut self, depth: usize, placed_non_terminal: bool) -> Pick {
        if depth >= self.leaf_depth {
            return Pick::Terminal { required: true };
        }
        match self.info.init {
            Init::Full => Pick::NonTerminal,
            Init::Grow | Init::BrettGrow if depth < self.min_depth && !placed_non_terminal => {
                Pick::NonTerminal
            }
            Init::Grow => {
                if self.rng.chance(self.info.terminal_chance) {
                    Pick::Terminal { required: false }
                } else {
                    Pick::Any
                }
            }
            Init::BrettGrow => {
                if self.rng.chance(self.info.terminal_chance) {
                    Pick::Terminal { required: false }
                } else {
                    Pick::NonTerminal
                }
            }
        }
    }

    // Choose a function of type `ty` for a slot at `depth`.
    fn resolve(&mut self, ty: TypeId, depth: usize, pick: Pick) -> Result<FunctionId> {
        let registry = self.registry;
        let terminals = registry.terminals(ty);
        let non_terminals = registry.non_terminals(ty);
        let chosen = match pick {
            Pick::NonTerminal => self
                .rng
                .select(non_terminals)
                .or_else(|| self.rng.select(terminals)),
            Pick::Terminal { required } => match self.rng.select(terminals) {
                Some(function) => Some(function),
                None if required => return self.restricted_fallback(ty, depth),
                None => self.rng.select(non_terminals),
            },
            Pick::Any => {
                let total = terminals.len() + non_terminals.len();
                if total == 0 {
                    None
                } else {
                    let i = self.rng.random_index(total);
                    terminals.get(i).or_else(|| non_terminals.get(i - terminals.len()))
                }
            }
        };
        chosen.cloned().ok_or_else(|| no_candidates(registry, ty))
    }

    // A terminal of type `ty` is required but none exist. Substitute a non-terminal that does not
    // accept its own output type, which keeps its own subtree from requiring the same fallback.
    fn restricted_fallback(&mut self, ty: TypeId, depth: usize) -> Result<FunctionId> {
        let registry = self.registry;
        let exhausted = || Error::ConstructionExhausted {
            type_name: registry.type_name(ty).to_string(),
            depth,
        };
        if depth > self.leaf_depth + self.info.max_fallback_depth {
            return Err(exhausted());
        }
        let candidates = registry
            .non_terminals(ty)
            .iter()
            .cloned()
            .filter(|&f| {
                registry
                    .function(f)
                    .inputs()
                    .map_or(false, |inputs| !inputs.contains(&ty))
            })
            .collect::<Vec<_>>();
        let function = *self.rng.select(&candidates).ok_or_else(exhausted)?;
        tracing::debug!(
            function = registry.function_name(function),
            ty = registry.type_name(ty),
            depth,
            "no terminal available, substituted a non-terminal"
        );
        Ok(function)
    }

    // Bind a new node to `function`, running its initializer if it has one.
    fn instantiate(&mut self, function: FunctionId) -> Node {
        let registry = self.registry;
        let mut value = Value::Empty;
        if let Some(init) = registry.initializer(function) {
            init(&mut value, &mut *self.rng);
        }
        Node::new(function, value)
    }
}

fn no_candidates<E>(registry: &Registry<E>, ty: TypeId) -> Error {
    Error::NoCandidates { type_name: registry.type_name(ty).to_string() }
}
