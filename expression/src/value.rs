use std::fmt;

use chrono::{Months, NaiveDateTime, TimeDelta};

use crate::error::EvalError;
use crate::expr::{Operand, Operator, Unit};

/// Output pattern for timestamps when none is given.
pub const DEFAULT_DATE_FORMAT: &str = "yyyy-MM-dd HH:mm:ss";

/// The result of evaluating one expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Timestamp(NaiveDateTime),
    Integer(i64),
    Text(String),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Timestamp(_) => "timestamp",
            Value::Integer(_) => "integer",
            Value::Text(_) => "text",
        }
    }

    /// Apply `operator` with `operand`. Timestamps take a unit, integers must not.
    pub fn apply(self, operator: Operator, operand: Operand) -> Result<Value, EvalError> {
        let mismatch = |value: &Value| EvalError::TypeMismatch {
            operator: operator.symbol(),
            operand: operand.to_string(),
            value: value.type_name(),
        };

        match (&self, operand.unit) {
            (Value::Timestamp(ts), Some(unit)) => {
                let sign = match operator {
                    Operator::Add => 1,
                    Operator::Sub => -1,
                    _ => return Err(mismatch(&self)),
                };
                shift(*ts, sign, operand.amount, unit).map(Value::Timestamp)
            }
            (Value::Integer(n), None) => integer(*n, operator, operand.amount).map(Value::Integer),
            _ => Err(mismatch(&self)),
        }
    }

    /// Render for substitution. `format` only applies to timestamps.
    pub fn render(&self, format: Option<&str>) -> String {
        match self {
            Value::Timestamp(ts) => {
                let pattern = strftime(format.unwrap_or(DEFAULT_DATE_FORMAT));
                ts.format(&pattern).to_string()
            }
            Value::Integer(n) => n.to_string(),
            Value::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(None))
    }
}

fn integer(left: i64, operator: Operator, right: i64) -> Result<i64, EvalError> {
    let result = match operator {
        Operator::Add => left.checked_add(right),
        Operator::Sub => left.checked_sub(right),
        Operator::Mul => left.checked_mul(right),
        Operator::Div | Operator::Rem if right == 0 => return Err(EvalError::DivisionByZero),
        Operator::Div => left.checked_div(right),
        Operator::Rem => left.checked_rem(right),
    };
    result.ok_or(EvalError::Overflow)
}

/// Move `ts` by `amount` units forwards (`sign` 1) or backwards (`sign` -1).
fn shift(ts: NaiveDateTime, sign: i64, amount: i64, unit: Unit) -> Result<NaiveDateTime, EvalError> {
    let calendar = |months: i64| -> Result<NaiveDateTime, EvalError> {
        let count = u32::try_from(months.unsigned_abs()).map_err(|_| EvalError::Overflow)?;
        let shifted = if months < 0 {
            ts.checked_sub_months(Months::new(count))
        } else {
            ts.checked_add_months(Months::new(count))
        };
        shifted.ok_or(EvalError::Overflow)
    };

    let amount = amount.checked_mul(sign).ok_or(EvalError::Overflow)?;
    let delta = match unit {
        Unit::Millis => TimeDelta::try_milliseconds(amount),
        Unit::Seconds => TimeDelta::try_seconds(amount),
        Unit::Minutes => TimeDelta::try_minutes(amount),
        Unit::Hours => TimeDelta::try_hours(amount),
        Unit::Days => TimeDelta::try_days(amount),
        Unit::Weeks => TimeDelta::try_weeks(amount),
        Unit::Months => return calendar(amount),
        Unit::Years => return calendar(amount.checked_mul(12).ok_or(EvalError::Overflow)?),
    };
    delta
        .and_then(|delta| ts.checked_add_signed(delta))
        .ok_or(EvalError::Overflow)
}

/// Translate a `yyyy-MM-dd HH:mm:ss` style pattern to chrono's strftime syntax.
/// Characters outside the known tokens are copied literally.
pub fn strftime(pattern: &str) -> String {
    const TOKENS: [(&str, &str); 6] = [
        ("yyyy", "%Y"),
        ("MM", "%m"),
        ("dd", "%d"),
        ("HH", "%H"),
        ("mm", "%M"),
        ("ss", "%S"),
    ];

    let mut out = String::with_capacity(pattern.len() * 2);
    let mut rest = pattern;
    'scan: while let Some(c) = rest.chars().next() {
        for (token, spec) in TOKENS {
            if let Some(after) = rest.strip_prefix(token) {
                out.push_str(spec);
                rest = after;
                continue 'scan;
            }
        }
        if c == '%' {
            out.push_str("%%");
        } else {
            out.push(c);
        }
        rest = &rest[c.len_utf8()..];
    }
    out
}
