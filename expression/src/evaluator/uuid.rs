use uuid::Uuid;

use crate::clock::Clock;
use crate::error::EvalError;
use crate::evaluator::Evaluator;
use crate::expr::Expression;
use crate::value::Value;

/// `$uuid`: a random (v4) UUID in hyphenated lower-case form.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidEvaluator;

impl Evaluator for UuidEvaluator {
    fn tag(&self) -> &str {
        "$uuid"
    }

    fn evaluate(&self, _expression: &Expression, _clock: &dyn Clock) -> Result<Value, EvalError> {
        Ok(Value::Text(Uuid::new_v4().to_string()))
    }
}
