//! Runtime error type.
//!
//! Runtime failures are not catchable from guest code; they propagate with
//! `?` through the evaluator to the driver, which reports them and exits
//! with a non-zero status.

use thiserror::Error;

/// A fatal guest-level runtime error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("cannot convert '{0}' to bool")]
    NotConvertibleToBool(&'static str),

    #[error("'{0}' is not subscriptable")]
    NotSubscriptable(&'static str),

    #[error("'{0}' does not support item assignment")]
    NoItemAssignment(&'static str),

    #[error("index must be an 'int', not '{0}'")]
    BadIndexType(&'static str),

    #[error("index out of range")]
    IndexOutOfRange,

    #[error("division by zero")]
    DivisionByZero,

    #[error("undefined variable: {0}")]
    UndefinedVariable(String),

    #[error("integer literal too large")]
    IntLiteralTooLarge,

    #[error("operands must be integers")]
    OperandsMustBeIntegers,

    #[error("cannot print '{0}' object")]
    NotPrintable(&'static str),

    #[error("output error: {0}")]
    Output(String),
}
