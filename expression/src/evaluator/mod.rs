pub mod date_time;
pub mod id_card;
pub mod uuid;

pub use date_time::DateTimeEvaluator;
pub use id_card::IdCardEvaluator;
pub use self::uuid::UuidEvaluator;

use crate::clock::Clock;
use crate::error::EvalError;
use crate::expr::Expression;
use crate::value::Value;

/// Resolves expressions whose tag starts with `$`.
///
/// Evaluators hold no mutable state; the engine passes the clock in.
pub trait Evaluator: Send + Sync {
    /// The lower-case tag this evaluator is registered under, `$` included.
    fn tag(&self) -> &str;

    /// Produce the evaluand. The engine applies any operation afterwards.
    fn evaluate(&self, expression: &Expression, clock: &dyn Clock) -> Result<Value, EvalError>;
}

/// The built-in evaluators.
pub fn defaults() -> Vec<Box<dyn Evaluator>> {
    vec![
        Box::new(DateTimeEvaluator),
        Box::new(IdCardEvaluator),
        Box::new(UuidEvaluator),
    ]
}
