// ABOUTME: Error types for evaluation failures in the Scheme evaluator core

use thiserror::Error;

/// All ways evaluation can fail, grouped the way the design's error taxonomy
/// groups them: lookup, shape, type, arity, arithmetic, promise-result, and
/// host errors. Every variant carries its own message text; none re-raise a
/// bare, contextless error.
#[derive(Error, Debug, Clone)]
pub enum EvalError {
    /// Referenced identifier is unbound in the environment chain.
    #[error("unknown identifier: {0}")]
    UnboundIdentifier(String),

    /// Malformed special form: wrong arity, non-list operands, duplicate or
    /// non-symbol formals, a misplaced `else` clause, `unquote` outside
    /// `quasiquote`, or similar structural problems.
    #[error("{form}: {message}")]
    MalformedForm { form: String, message: String },

    /// An operation's argument failed its type predicate.
    #[error("{operation}: {message}")]
    TypeError { operation: String, message: String },

    /// Call argument count does not match the formals count.
    #[error("{procedure}: expected {expected} argument{}, got {actual}", if expected == "1" { "" } else { "s" })]
    ArityError {
        procedure: String,
        expected: String,
        actual: usize,
    },

    /// Division by zero or other numeric failure.
    #[error("{operation}: {message}")]
    ArithmeticError { operation: String, message: String },

    /// Forcing a promise produced a value that is neither Nil nor a Pair.
    #[error("result of forcing a promise must be a pair or (), got {0}")]
    PromiseResultError(String),

    /// A value that is not a procedure, builtin, or macro was called.
    #[error("not callable: {0}")]
    NotCallable(String),

    /// A bounded stand-in for a host stack overflow: deep non-tail recursion
    /// is rejected before it can crash the process.
    #[error("maximum recursion depth exceeded")]
    RecursionLimit,

    /// I/O or other failures surfaced by host-effecting builtins, coerced to
    /// a bounded interpreter error.
    #[error("{0}")]
    HostError(String),

    /// Raised by the `error` builtin, carrying a user-supplied message.
    #[error("{0}")]
    UserError(String),
}

impl EvalError {
    pub fn malformed(form: &str, message: impl Into<String>) -> Self {
        EvalError::MalformedForm {
            form: form.to_string(),
            message: message.into(),
        }
    }

    pub fn type_error(operation: &str, message: impl Into<String>) -> Self {
        EvalError::TypeError {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    pub fn arity(procedure: &str, expected: impl Into<String>, actual: usize) -> Self {
        EvalError::ArityError {
            procedure: procedure.to_string(),
            expected: expected.into(),
            actual,
        }
    }

    pub fn arithmetic(operation: &str, message: impl Into<String>) -> Self {
        EvalError::ArithmeticError {
            operation: operation.to_string(),
            message: message.into(),
        }
    }
}
