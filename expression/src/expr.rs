use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::EvalError;

/// Separates the path from an output format: `$date_time.now => yyyy-MM-dd`.
pub const FORMAT_SEPARATOR: &str = "=>";
/// Separates the segments of a path.
pub const SEGMENT_SEPARATOR: char = '.';
/// Prefix of a built-in evaluator tag.
pub const EVALUATOR_PREFIX: char = '$';

static OPERAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)\s*([A-Za-z]*)$").expect("operand pattern is valid")
});

/// One placeholder body, split into its parts.
///
/// ```text
/// expr    := path ("=>" format)?
/// path    := tag "." segment ("." segment)* (op operand)?
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    /// The trimmed text the expression was parsed from.
    pub text: String,
    /// First path segment, lower-cased.
    pub tag: String,
    /// All path segments, the tag included, with whitespace removed.
    pub segments: Vec<String>,
    pub operation: Option<Operation>,
    pub format: Option<String>,
}

impl Expression {
    /// Split `input` into path, operation and format.
    ///
    /// Only an empty input fails here; operands are checked when applied, so a
    /// variable name that happens to contain `-1` still resolves by lookup.
    pub fn parse(input: &str) -> Result<Expression, EvalError> {
        let text = input.trim();
        if text.is_empty() {
            return Err(EvalError::Empty);
        }

        let (path, format) = match text.split_once(FORMAT_SEPARATOR) {
            Some((path, format)) => {
                let format = format.trim();
                (path, (!format.is_empty()).then(|| format.to_string()))
            }
            None => (text, None),
        };

        let (evaluand, operation) = match find_operator(path) {
            Some(index) => {
                let operator = path[index..].chars().next().and_then(Operator::from_char);
                let operand = path[index + 1..].trim().to_string();
                (&path[..index], operator.map(|operator| Operation { operator, operand }))
            }
            None => (path, None),
        };

        let evaluand: String = evaluand.chars().filter(|c| !c.is_whitespace()).collect();
        let segments: Vec<String> = evaluand
            .split(SEGMENT_SEPARATOR)
            .map(str::to_string)
            .collect();
        let tag = segments.first().map(|s| s.to_lowercase()).unwrap_or_default();

        Ok(Expression {
            text: text.to_string(),
            tag,
            segments,
            operation,
            format,
        })
    }

    pub fn is_builtin(&self) -> bool {
        self.tag.starts_with(EVALUATOR_PREFIX)
    }

    /// Segments after the tag.
    pub fn arguments(&self) -> &[String] {
        self.segments.get(1..).unwrap_or_default()
    }
}

/// Index of the first `+` or `-` that introduces a number. A hyphen inside a
/// segment name (`week-day`) is not followed by a digit and is skipped.
fn find_operator(path: &str) -> Option<usize> {
    path.char_indices()
        .filter(|(_, c)| matches!(c, '+' | '-'))
        .map(|(index, _)| index)
        .find(|&index| {
            path[index + 1..]
                .trim_start()
                .starts_with(|c: char| c.is_ascii_digit())
        })
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl Operator {
    pub fn from_char(c: char) -> Option<Operator> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Sub),
            '*' => Some(Operator::Mul),
            '/' => Some(Operator::Div),
            '%' => Some(Operator::Rem),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
            Operator::Rem => '%',
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Operator plus the unparsed operand text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub operator: Operator,
    pub operand: String,
}

impl Operation {
    pub fn operand(&self) -> Result<Operand, EvalError> {
        Operand::parse(&self.operand)
    }
}

/// Time unit of a date operand. Units are case-sensitive: `M` is months and
/// `m` is minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Millis,
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

impl Unit {
    pub fn parse(text: &str) -> Option<Unit> {
        match text {
            "ms" => Some(Unit::Millis),
            "s" => Some(Unit::Seconds),
            "m" => Some(Unit::Minutes),
            "h" => Some(Unit::Hours),
            "d" => Some(Unit::Days),
            "w" => Some(Unit::Weeks),
            "M" => Some(Unit::Months),
            "y" => Some(Unit::Years),
            _ => None,
        }
    }
}

/// `3d`, `90 m`, or a bare `7` (integer arithmetic).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operand {
    pub amount: i64,
    pub unit: Option<Unit>,
}

impl Operand {
    pub fn new(amount: i64, unit: Option<Unit>) -> Self {
        Operand { amount, unit }
    }

    pub fn parse(text: &str) -> Result<Operand, EvalError> {
        let text = text.trim();
        let captures = OPERAND
            .captures(text)
            .ok_or_else(|| EvalError::BadOperand(text.to_string()))?;
        let amount = captures[1]
            .parse::<i64>()
            .map_err(|_| EvalError::BadOperand(text.to_string()))?;
        let unit = match &captures[2] {
            "" => None,
            unit => Some(Unit::parse(unit).ok_or_else(|| EvalError::UnknownUnit(unit.to_string()))?),
        };
        Ok(Operand { amount, unit })
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            None => "",
            Some(Unit::Millis) => "ms",
            Some(Unit::Seconds) => "s",
            Some(Unit::Minutes) => "m",
            Some(Unit::Hours) => "h",
            Some(Unit::Days) => "d",
            Some(Unit::Weeks) => "w",
            Some(Unit::Months) => "M",
            Some(Unit::Years) => "y",
        };
        write!(f, "{}{}", self.amount, unit)
    }
}
