//! Errors produced while configuring a registry or building trees.

use thiserror::Error;

/// A `Result` with the crate's `Error` type.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong between registering types and building a tree.
///
/// Evaluation itself never fails. Domain errors such as division by zero are decided by the
/// registered function implementations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("no type named `{0}` is registered")]
    TypeNotFound(String),

    #[error("no function named `{0}` is registered")]
    FunctionNotFound(String),

    #[error("a type named `{0}` is already registered")]
    DuplicateType(String),

    #[error("a function named `{0}` is already registered")]
    DuplicateFunction(String),

    #[error("function `{function}` takes {arity} arguments but {found} input types were given")]
    ArityMismatch {
        function: String,
        arity: usize,
        found: usize,
    },

    #[error("inputs for function `{0}` have already been associated")]
    InputsAlreadyAssociated(String),

    #[error("function `{0}` has no associated input types")]
    InputsNotAssociated(String),

    #[error("no registered function produces type `{type_name}`")]
    NoCandidates { type_name: String },

    #[error("could not place a node of type `{type_name}` at depth {depth}")]
    ConstructionExhausted { type_name: String, depth: usize },

    #[error("minimum depth {min} is greater than maximum depth {max}")]
    InvalidDepth { min: usize, max: usize },

    #[error("probability {0} is outside of [0, 1]")]
    InvalidChance(f64),
}

impl Error {
    /// Whether this is a failed lookup of a type or function by name.
    pub fn is_not_found(&self) -> bool {
        matches!(*self, Error::TypeNotFound(_) | Error::FunctionNotFound(_))
    }
}
