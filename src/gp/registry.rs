//! The registry of types and functions that trees are built from.
//!
//! Types are abstract categories (e.g. "num" or "bool") that constrain which functions may be
//! plugged into which argument slots. Functions are either *terminals* (arity `0`, the leaves of
//! a tree) or *non-terminals* (arity `1` or more). Both are identified by dense ids assigned in
//! registration order.
//!
//! A registry is append-only. It is created once before any tree is built, and every tree keeps
//! a shared reference to it for its whole lifetime.

use crate::error::{Error, Result};
use crate::random::Random;
use crate::value::Value;
use fnv::FnvHashMap;
use std::fmt;

/// Identifies a type within a `Registry`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(u32);

/// Identifies a function within a `Registry`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FunctionId(u32);

/// The implementation of a function.
///
/// Called with the node's own value cell, the values of its children in argument order and the
/// caller's environment. The implementation writes the node's result into the value cell.
pub type Call<E> = dyn Fn(&mut Value, &[Value], &E) + Send + Sync;

/// Called once on every newly instantiated node, e.g. to draw a random constant.
pub type Initializer = dyn Fn(&mut Value, &mut Random) + Send + Sync;

/// Everything the registry knows about a single function.
pub struct Function<E> {
    name: String,
    output: TypeId,
    arity: usize,
    call: Box<Call<E>>,
    initializer: Option<Box<Initializer>>,
    inputs: Option<Vec<TypeId>>,
}

/// The set of types and functions available to a GP run.
///
/// `E` is the environment passed through to every function call during evaluation.
pub struct Registry<E = ()> {
    type_names: Vec<String>,
    name_to_type: FnvHashMap<String, TypeId>,
    functions: Vec<Function<E>>,
    name_to_function: FnvHashMap<String, FunctionId>,
    // Indexed by `TypeId`.
    terminals: Vec<Vec<FunctionId>>,
    non_terminals: Vec<Vec<FunctionId>>,
    all_non_terminals: Vec<(TypeId, FunctionId)>,
}

// Impls.

impl TypeId {
    /// The position of the type in registration order.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl FunctionId {
    /// The position of the function in registration order.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}

impl<E> Function<E> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type this function outputs.
    pub fn output(&self) -> TypeId {
        self.output
    }

    /// The number of arguments. `0` for terminals.
    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn is_terminal(&self) -> bool {
        self.arity == 0
    }

    /// The accepted type of each argument slot, if they have been associated.
    ///
    /// Terminals always report an empty slice.
    pub fn inputs(&self) -> Option<&[TypeId]> {
        match self.inputs {
            Some(ref inputs) => Some(&inputs[..]),
            None if self.is_terminal() => Some(&[][..]),
            None => None,
        }
    }

    pub fn initializer(&self) -> Option<&Initializer> {
        self.initializer.as_deref()
    }

    /// Run the function's implementation.
    pub fn call(&self, value: &mut Value, args: &[Value], env: &E) {
        (self.call)(value, args, env)
    }
}

impl<E> fmt::Debug for Function<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("output", &self.output)
            .field("arity", &self.arity)
            .field("inputs", &self.inputs)
            .field("initializer", &self.initializer.is_some())
            .finish()
    }
}

impl<E> Registry<E> {
    /// An empty registry.
    pub fn new() -> Self {
        Registry {
            type_names: Vec::new(),
            name_to_type: FnvHashMap::default(),
            functions: Vec::new(),
            name_to_function: FnvHashMap::default(),
            terminals: Vec::new(),
            non_terminals: Vec::new(),
            all_non_terminals: Vec::new(),
        }
    }

    /// Register a new type.
    pub fn register_type(&mut self, name: &str) -> Result<TypeId> {
        if self.name_to_type.contains_key(name) {
            return Err(Error::DuplicateType(name.to_string()));
        }
        let id = TypeId(self.type_names.len() as u32);
        self.type_names.push(name.to_string());
        self.name_to_type.insert(name.to_string(), id);
        self.terminals.push(Vec::new());
        self.non_terminals.push(Vec::new());
        tracing::debug!(%id, name, "registered type");
        Ok(id)
    }

    /// Register a function producing a value of the `output` type.
    ///
    /// Functions with an arity of `0` are registered as terminals. Non-terminals must have their
    /// argument types associated via `associate_input` before any tree is built with them.
    pub fn register_function<F>(
        &mut self,
        name: &str,
        output: &str,
        call: F,
        arity: usize,
        initializer: Option<Box<Initializer>>,
    ) -> Result<FunctionId>
    where
        F: Fn(&mut Value, &[Value], &E) + Send + Sync + 'static,
    {
        if arity == 0 {
            return self.register_terminal_function(name, output, call, initializer);
        }
        let id = self.insert_function(name, output, Box::new(call), arity, initializer)?;
        let output = self.functions[id.index()].output;
        self.non_terminals[output.index()].push(id);
        self.all_non_terminals.push((output, id));
        tracing::debug!(%id, name, arity, "registered non-terminal");
        Ok(id)
    }

    /// Register a terminal (zero-arity) function producing a value of the `output` type.
    pub fn register_terminal_function<F>(
        &mut self,
        name: &str,
        output: &str,
        call: F,
        initializer: Option<Box<Initializer>>,
    ) -> Result<FunctionId>
    where
        F: Fn(&mut Value, &[Value], &E) + Send + Sync + 'static,
    {
        let id = self.insert_function(name, output, Box::new(call), 0, initializer)?;
        let output = self.functions[id.index()].output;
        self.terminals[output.index()].push(id);
        tracing::debug!(%id, name, "registered terminal");
        Ok(id)
    }

    fn insert_function(
        &mut self,
        name: &str,
        output: &str,
        call: Box<Call<E>>,
        arity: usize,
        initializer: Option<Box<Initializer>>,
    ) -> Result<FunctionId> {
        let output = self.type_id(output)?;
        if self.name_to_function.contains_key(name) {
            return Err(Error::DuplicateFunction(name.to_string()));
        }
        let id = FunctionId(self.functions.len() as u32);
        self.functions.push(Function {
            name: name.to_string(),
            output,
            arity,
            call,
            initializer,
            inputs: None,
        });
        self.name_to_function.insert(name.to_string(), id);
        Ok(id)
    }

    /// Record the accepted type of each argument slot of a function, in argument order.
    ///
    /// Must be called exactly once for every non-terminal.
    pub fn associate_input(&mut self, function: &str, types: &[&str]) -> Result<&mut Self> {
        let id = self.function_id(function)?;
        let inputs = types
            .iter()
            .map(|name| self.type_id(name))
            .collect::<Result<Vec<_>>>()?;
        let func = &mut self.functions[id.index()];
        if inputs.len() != func.arity {
            return Err(Error::ArityMismatch {
                function: func.name.clone(),
                arity: func.arity,
                found: inputs.len(),
            });
        }
        if func.inputs.is_some() {
            return Err(Error::InputsAlreadyAssociated(func.name.clone()));
        }
        tracing::debug!(%id, function, ?inputs, "associated inputs");
        func.inputs = Some(inputs);
        Ok(self)
    }

    /// Look up a type by name.
    pub fn type_id(&self, name: &str) -> Result<TypeId> {
        self.name_to_type
            .get(name)
            .cloned()
            .ok_or_else(|| Error::TypeNotFound(name.to_string()))
    }

    /// Look up a function by name.
    pub fn function_id(&self, name: &str) -> Result<FunctionId> {
        self.name_to_function
            .get(name)
            .cloned()
            .ok_or_else(|| Error::FunctionNotFound(name.to_string()))
    }

    /// The descriptor of a function.
    ///
    /// Panics if `id` was not produced by this registry.
    pub fn function(&self, id: FunctionId) -> &Function<E> {
        &self.functions[id.index()]
    }

    pub fn arity(&self, id: FunctionId) -> usize {
        self.function(id).arity
    }

    pub fn output_type(&self, id: FunctionId) -> TypeId {
        self.function(id).output
    }

    /// The accepted type of each argument slot of the function.
    pub fn inputs(&self, id: FunctionId) -> Result<&[TypeId]> {
        let func = self.function(id);
        func.inputs()
            .ok_or_else(|| Error::InputsNotAssociated(func.name.clone()))
    }

    pub fn initializer(&self, id: FunctionId) -> Option<&Initializer> {
        self.function(id).initializer()
    }

    pub fn type_name(&self, id: TypeId) -> &str {
        &self.type_names[id.index()]
    }

    pub fn function_name(&self, id: FunctionId) -> &str {
        &self.function(id).name
    }

    /// All terminals producing the given type.
    pub fn terminals(&self, ty: TypeId) -> &[FunctionId] {
        &self.terminals[ty.index()]
    }

    /// All non-terminals producing the given type.
    pub fn non_terminals(&self, ty: TypeId) -> &[FunctionId] {
        &self.non_terminals[ty.index()]
    }

    /// Every non-terminal alongside its output type, in registration order.
    pub fn all_non_terminals(&self) -> &[(TypeId, FunctionId)] {
        &self.all_non_terminals
    }

    pub fn type_count(&self) -> usize {
        self.type_names.len()
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// All registered types in id order.
    pub fn types(&self) -> impl Iterator<Item = (TypeId, &str)> {
        self.type_names
            .iter()
            .enumerate()
            .map(|(i, name)| (TypeId(i as u32), &name[..]))
    }
}

impl<E> Default for Registry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Registry<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.type_names)
            .field("functions", &self.functions)
            .finish()
    }
}
