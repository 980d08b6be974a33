//! Items related to expression trees.
//!
//! Every node of a tree lives in a single `petgraph` graph owned by the `Tree`. Children are
//! referenced by `NodeIndex` and hang off their parent on `Outgoing` edges whose weight is the
//! argument slot the child fills. Dropping the tree drops the graph and every node with it.

use crate::error::Result;
use crate::gp::gen::{self, ConstructionInfo};
use crate::gp::registry::{FunctionId, Registry, TypeId};
use crate::random::Random;
use crate::value::Value;
use petgraph::visit::EdgeRef;
use petgraph::Outgoing;
use std::any::Any;
use std::cell::Cell;
use std::fmt;

/// The argument slot a child fills within its parent.
pub type Slot = usize;

/// The directed graph type used to store a tree's nodes.
///
/// Edges point from a parent to each of its children.
pub type DiGraph = petgraph::graph::DiGraph<Node, Slot, u32>;

/// The node index type used within the tree's graph.
pub type NodeIndex = petgraph::graph::NodeIndex<u32>;

/// A single vertex of a tree: a function bound to the value cell it last produced.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Node {
    function: FunctionId,
    value: Value,
}

/// The result of a caller-supplied fitness function.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Fitness {
    pub fitness: f64,
    /// Auxiliary count, e.g. the number of samples matched within some tolerance.
    pub hits: u64,
}

/// A borrowed view of a node within a tree.
pub struct NodeRef<'t, E> {
    registry: &'t Registry<E>,
    graph: &'t DiGraph,
    index: NodeIndex,
}

/// One complete program built against a `Registry`.
pub struct Tree<'r, E = ()> {
    registry: &'r Registry<E>,
    graph: DiGraph,
    root: NodeIndex,
    data: Option<Box<dyn Any + Send + Sync>>,
    cache: Cache,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Shape {
    depth: usize,
    node_count: usize,
}

// `None` means the entry must be recomputed.
#[derive(Debug, Default)]
struct Cache {
    shape: Cell<Option<Shape>>,
    fitness: Option<Fitness>,
}

// Impls.

impl Node {
    pub(crate) fn new(function: FunctionId, value: Value) -> Self {
        Node { function, value }
    }

    pub fn function(&self) -> FunctionId {
        self.function
    }

    pub fn value(&self) -> Value {
        self.value
    }
}

impl<'t, E> NodeRef<'t, E> {
    pub fn index(&self) -> NodeIndex {
        self.index
    }

    pub fn function(&self) -> FunctionId {
        self.graph[self.index].function
    }

    pub fn name(&self) -> &'t str {
        self.registry.function_name(self.function())
    }

    pub fn output_type(&self) -> TypeId {
        self.registry.output_type(self.function())
    }

    pub fn arity(&self) -> usize {
        self.registry.arity(self.function())
    }

    /// The value produced by the last evaluation, or the initialised value if never evaluated.
    pub fn value(&self) -> Value {
        self.graph[self.index].value
    }

    /// The children of this node in argument order.
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'t, E>> + 't {
        let registry = self.registry;
        let graph = self.graph;
        children(graph, self.index)
            .into_iter()
            .map(move |index| NodeRef { registry, graph, index })
    }

    /// The child filling the given argument slot.
    pub fn child(&self, slot: Slot) -> Option<NodeRef<'t, E>> {
        self.graph
            .edges_directed(self.index, Outgoing)
            .find(|e| *e.weight() == slot)
            .map(|e| NodeRef { registry: self.registry, graph: self.graph, index: e.target() })
    }
}

impl<'t, E> Clone for NodeRef<'t, E> {
    fn clone(&self) -> Self {
        NodeRef { registry: self.registry, graph: self.graph, index: self.index }
    }
}

impl<'t, E> Copy for NodeRef<'t, E> {}

impl<'t, E> fmt::Debug for NodeRef<'t, E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("index", &self.index)
            .field("function", &self.name())
            .field("value", &self.value())
            .finish()
    }
}

impl<'r, E> Tree<'r, E> {
    /// A tree holding only the given root node.
    pub(crate) fn with_root(registry: &'r Registry<E>, root: Node) -> Self {
        let mut graph = DiGraph::default();
        let root = graph.add_node(root);
        Tree { registry, graph, root, data: None, cache: Cache::default() }
    }

    /// Attach `child` to `parent` in the given argument slot.
    pub(crate) fn add_child(&mut self, parent: NodeIndex, slot: Slot, child: Node) -> NodeIndex {
        let nx = self.graph.add_node(child);
        self.graph.add_edge(parent, nx, slot);
        self.invalidate();
        nx
    }

    /// Record the shape measured while building, sparing the first `depth()` a traversal.
    pub(crate) fn set_shape(&mut self, depth: usize) {
        let node_count = self.graph.node_count();
        self.cache.shape.set(Some(Shape { depth, node_count }));
    }

    /// Build a random tree. See `gen::make_tree`.
    pub fn make_tree(
        info: &ConstructionInfo,
        registry: &'r Registry<E>,
        rng: &mut Random,
        min_depth: usize,
        max_depth: usize,
        starting_type: Option<TypeId>,
    ) -> Result<Self> {
        gen::make_tree(info, registry, rng, min_depth, max_depth, starting_type)
    }

    /// The registry this tree was built against.
    pub fn registry(&self) -> &'r Registry<E> {
        self.registry
    }

    pub fn root(&self) -> NodeRef<E> {
        NodeRef { registry: self.registry, graph: &self.graph, index: self.root }
    }

    /// The underlying graph.
    pub fn graph(&self) -> &DiGraph {
        &self.graph
    }

    /// The greatest distance from the root to any leaf. The root alone has a depth of `0`.
    pub fn depth(&self) -> usize {
        self.shape().depth
    }

    pub fn node_count(&self) -> usize {
        self.shape().node_count
    }

    /// The fitness cached by the last `evaluate` or `set_fitness`.
    pub fn fitness(&self) -> Option<Fitness> {
        self.cache.fitness
    }

    pub fn set_fitness(&mut self, fitness: Fitness) {
        self.cache.fitness = Some(fitness);
    }

    /// The value currently held by the root.
    pub fn value(&self) -> Value {
        self.graph[self.root].value
    }

    /// The type produced by the root.
    pub fn output_type(&self) -> TypeId {
        self.registry.output_type(self.graph[self.root].function)
    }

    /// Clear the cached shape and fitness.
    ///
    /// Any operation that changes the structure of the tree must call this.
    pub fn invalidate(&mut self) {
        self.cache.shape.set(None);
        self.cache.fitness = None;
    }

    /// Attach arbitrary caller data to the tree, replacing any previous data.
    pub fn set_data<T>(&mut self, data: T)
    where
        T: Any + Send + Sync,
    {
        self.data = Some(Box::new(data));
    }

    /// The attached caller data, if it is of type `T`.
    pub fn data<T>(&self) -> Option<&T>
    where
        T: Any,
    {
        self.data.as_ref().and_then(|data| data.downcast_ref::<T>())
    }

    /// The function of every node in pre-order, children visited in argument order.
    pub fn functions_pre_order(&self) -> Vec<FunctionId> {
        let mut functions = Vec::with_capacity(self.graph.node_count());
        let mut stack = vec![self.root];
        while let Some(nx) = stack.pop() {
            functions.push(self.graph[nx].function);
            stack.extend(children(&self.graph, nx).into_iter().rev());
        }
        functions
    }

    /// Evaluate every node, children before parents, returning the root's value and type.
    ///
    /// The walk is iterative and so is not bounded by the call stack, however deep the tree.
    pub fn execute(&mut self, env: &E) -> (Value, TypeId) {
        // Schedule: a node always lands on `order` before any of its descendants.
        let mut work = vec![self.root];
        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(nx) = work.pop() {
            order.push(nx);
            work.extend(children(&self.graph, nx));
        }

        // Evaluate: popping `order` visits every descendant before its ancestor.
        let mut args = Vec::new();
        while let Some(nx) = order.pop() {
            self.evaluate_node(nx, &mut args, env);
        }

        (self.value(), self.output_type())
    }

    /// `execute` the tree, then score it with the given fitness function and cache the result.
    pub fn evaluate<F>(&mut self, env: &E, fitness: F) -> (Value, TypeId)
    where
        F: FnOnce(NodeRef<E>) -> Fitness,
    {
        let result = self.execute(env);
        let score = fitness(self.root());
        self.cache.fitness = Some(score);
        result
    }

    // Run a single node's function over its children's current values.
    fn evaluate_node(&mut self, nx: NodeIndex, args: &mut Vec<Value>, env: &E) {
        let registry = self.registry;
        let function = registry.function(self.graph[nx].function);
        args.clear();
        args.resize(function.arity(), Value::Empty);
        for e in self.graph.edges_directed(nx, Outgoing) {
            args[*e.weight()] = self.graph[e.target()].value;
        }
        function.call(&mut self.graph[nx].value, args, env);
    }

    fn shape(&self) -> Shape {
        if let Some(shape) = self.cache.shape.get() {
            return shape;
        }
        let mut depth = 0;
        let mut node_count = 0;
        let mut stack = vec![(self.root, 0)];
        while let Some((nx, d)) = stack.pop() {
            node_count += 1;
            depth = depth.max(d);
            stack.extend(self.graph.neighbors_directed(nx, Outgoing).map(|c| (c, d + 1)));
        }
        let shape = Shape { depth, node_count };
        self.cache.shape.set(Some(shape));
        shape
    }
}

impl<'r, E> fmt::Debug for Tree<'r, E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Tree")
            .field("graph", &self.graph)
            .field("root", &self.root)
            .field("fitness", &self.cache.fitness)
            .finish()
    }
}

/// Renders the tree as an s-expression of function names, e.g. `(add x (mul x 3))`.
impl<'r, E> fmt::Display for Tree<'r, E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        enum Token {
            Node(NodeIndex, bool),
            Close,
        }

        let mut stack = vec![Token::Node(self.root, false)];
        while let Some(token) = stack.pop() {
            match token {
                Token::Close => write!(f, ")")?,
                Token::Node(nx, space) => {
                    if space {
                        write!(f, " ")?;
                    }
                    let name = self.registry.function_name(self.graph[nx].function);
                    let children = children(&self.graph, nx);
                    if children.is_empty() {
                        write!(f, "{}", name)?;
                        continue;
                    }
                    write!(f, "({}", name)?;
                    stack.push(Token::Close);
                    stack.extend(children.into_iter().rev().map(|c| Token::Node(c, true)));
                }
            }
        }
        Ok(())
    }
}

// The children of `nx` in argument order.
fn children(graph: &DiGraph, nx: NodeIndex) -> Vec<NodeIndex> {
    let mut children = graph
        .edges_directed(nx, Outgoing)
        .map(|e| (*e.weight(), e.target()))
        .collect::<Vec<_>>();
    children.sort_unstable_by_key(|&(slot, _)| slot);
    children.into_iter().map(|(_, nx)| nx).collect()
}
