use chrono::{Datelike, Days, NaiveDateTime, NaiveTime};

use crate::clock::Clock;
use crate::error::EvalError;
use crate::evaluator::Evaluator;
use crate::expr::Expression;
use crate::value::Value;

/// `$date_time.<base>[.<projection>]`
///
/// Bases: `now`, `today`, `yesterday`, `tomorrow` (the last three at midnight).
/// Projections turn the timestamp into an integer: `year`, `month`, `day`,
/// `month-day`, `year-day` and `week-day` (Sunday is 0).
#[derive(Debug, Default, Clone, Copy)]
pub struct DateTimeEvaluator;

impl DateTimeEvaluator {
    fn base(segment: &str, clock: &dyn Clock) -> Result<NaiveDateTime, EvalError> {
        let midnight = |days: i64| {
            let today = clock.today();
            let date = if days < 0 {
                today.checked_sub_days(Days::new(days.unsigned_abs()))
            } else {
                today.checked_add_days(Days::new(days.unsigned_abs()))
            };
            date.map(|d| d.and_time(NaiveTime::MIN))
                .ok_or(EvalError::Overflow)
        };

        match segment.to_lowercase().as_str() {
            "now" => Ok(clock.now()),
            "today" => midnight(0),
            "yesterday" => midnight(-1),
            "tomorrow" => midnight(1),
            _ => Err(EvalError::UnknownSegment(segment.to_string())),
        }
    }

    fn project(ts: NaiveDateTime, segment: &str) -> Result<i64, EvalError> {
        let value = match segment.to_lowercase().as_str() {
            "year" => ts.year() as i64,
            "month" => ts.month() as i64,
            "day" | "month-day" => ts.day() as i64,
            "year-day" => ts.ordinal() as i64,
            "week-day" => ts.weekday().num_days_from_sunday() as i64,
            _ => return Err(EvalError::UnknownSegment(segment.to_string())),
        };
        Ok(value)
    }
}

impl Evaluator for DateTimeEvaluator {
    fn tag(&self) -> &str {
        "$date_time"
    }

    fn evaluate(&self, expression: &Expression, clock: &dyn Clock) -> Result<Value, EvalError> {
        match expression.arguments() {
            [base] => Self::base(base, clock).map(Value::Timestamp),
            [base, projection] => {
                let ts = Self::base(base, clock)?;
                Self::project(ts, projection).map(Value::Integer)
            }
            _ => Err(EvalError::SegmentCount {
                expected: "2 or 3",
                got: expression.segments.len(),
            }),
        }
    }
}
