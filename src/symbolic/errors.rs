use crate::numeric::{Interval, NumericError, NumericKind};
use std::fmt;

/// Error types of the function algebra.
///
/// All failures are deterministic functions of the input tree and arguments, nothing is retried
/// and no partially transformed tree is ever returned together with an error.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionError {
    /// argument outside the declared domain of a function
    Domain {
        argument: String,
        value: String,
        range: Interval,
    },
    /// division by exact zero, or a point where the value model has no defined result
    Arithmetic(String),
    /// numeric value can not be represented in the required kind
    Coercion { value: String, target: NumericKind },
    /// currying could not reduce the function to exactly one free variable
    Arity { free_variables: Vec<String> },
    /// no rule, no self-derivative and no numerical fallback applies
    UnsupportedOperation(String),
    /// incompatible argument/result kinds detected while composing
    TypeMismatch {
        expected: NumericKind,
        found: NumericKind,
    },
    /// invalid input to a builder (e.g. term kind a polynomial does not accept)
    Argument(String),
}

impl fmt::Display for FunctionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FunctionError::Domain {
                argument,
                value,
                range,
            } => write!(
                f,
                "Domain error: {} = {} is outside of {}",
                argument, value, range
            ),
            FunctionError::Arithmetic(msg) => write!(f, "Arithmetic error: {}", msg),
            FunctionError::Coercion { value, target } => {
                write!(f, "Coercion error: {} can not be represented as {}", value, target)
            }
            FunctionError::Arity { free_variables } => write!(
                f,
                "Arity error: expected exactly one free variable, found [{}]",
                free_variables.join(", ")
            ),
            FunctionError::UnsupportedOperation(msg) => write!(f, "Unsupported operation: {}", msg),
            FunctionError::TypeMismatch { expected, found } => write!(
                f,
                "Type mismatch: function expects {} argument, got {}",
                expected, found
            ),
            FunctionError::Argument(msg) => write!(f, "Invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for FunctionError {}

impl From<NumericError> for FunctionError {
    fn from(err: NumericError) -> FunctionError {
        match err {
            NumericError::Coercion { value, target } => FunctionError::Coercion { value, target },
            NumericError::Arithmetic(msg) => FunctionError::Arithmetic(msg),
            NumericError::Unordered(msg) => FunctionError::UnsupportedOperation(format!(
                "ordering of {}",
                msg
            )),
        }
    }
}

pub type FunctionResult<T> = Result<T, FunctionError>;
