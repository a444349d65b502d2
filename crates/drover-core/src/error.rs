//! Error taxonomy for parsing and execution.

use thiserror::Error;

/// The shared work budget ran out.
///
/// Raised by [`crate::budget::BudgetChecker::charge`] and treated as fatal:
/// parsing and execution both stop immediately instead of recovering.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("execution budget exceeded: used {used}/{limit} during {operation}")]
pub struct BudgetExceeded {
    /// Operation tag that tripped the limit.
    pub operation: String,
    /// Units the run would have consumed, including the rejected charge.
    pub used: u32,
    /// Configured ceiling.
    pub limit: u32,
}

/// Errors surfaced while executing a script.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// Budget exhaustion, during either parsing or execution.
    #[error(transparent)]
    Budget(#[from] BudgetExceeded),

    /// A variable was read before any assignment wrote it.
    #[error("variable '{name}' is not defined")]
    UndefinedVariable { name: String },

    /// Neither the host nor the built-in table knows this name.
    #[error("unknown command or function '{name}'")]
    UnknownCommand { name: String },

    /// An operator or built-in was applied to operands it does not accept.
    #[error("type error: {message}")]
    Type { message: String },

    /// Operand types were fine but the value itself was unusable.
    #[error("value error: {message}")]
    Value { message: String },

    /// Division or modulo with a zero divisor.
    #[error("division by zero")]
    DivisionByZero,

    /// `pop` with nothing on the operand stack.
    #[error("pop from an empty stack")]
    EmptyStack,

    /// A script-level `assert(...)` failed.
    #[error("assertion failed: {message}")]
    Assertion { message: String },
}
