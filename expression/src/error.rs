use thiserror::Error;

/// Why an expression did not resolve. The placeholder driver keeps the
/// original text for any of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("empty expression")]
    Empty,

    #[error("unknown evaluator '{0}'")]
    UnknownEvaluator(String),

    #[error("expected {expected} segments, got {got}")]
    SegmentCount { expected: &'static str, got: usize },

    #[error("unrecognized segment '{0}'")]
    UnknownSegment(String),

    #[error("cannot parse operand '{0}'")]
    BadOperand(String),

    #[error("unknown unit '{0}'")]
    UnknownUnit(String),

    #[error("cannot apply '{operator}' with operand '{operand}' to {value}")]
    TypeMismatch {
        operator: char,
        operand: String,
        value: &'static str,
    },

    #[error("arithmetic overflow")]
    Overflow,

    #[error("division by zero")]
    DivisionByZero,

    #[error("invalid identity number input '{0}'")]
    BadIdCard(String),
}
