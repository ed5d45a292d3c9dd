use crate::clock::Clock;
use crate::error::EvalError;
use crate::evaluator::Evaluator;
use crate::expr::Expression;
use crate::id_card::IdCard;
use crate::value::Value;

/// `$id_card`: a freshly generated identity number. Further segments are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdCardEvaluator;

impl Evaluator for IdCardEvaluator {
    fn tag(&self) -> &str {
        "$id_card"
    }

    fn evaluate(&self, _expression: &Expression, clock: &dyn Clock) -> Result<Value, EvalError> {
        let card = IdCard::random(&mut rand::thread_rng(), clock.today());
        Ok(Value::Text(card.number()))
    }
}
