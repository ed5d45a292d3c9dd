use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use rstest::rstest;

use expression::clock::Clock;
use expression::evaluator::Evaluator;
use expression::expr::{Expression, Operand, Operator, Unit};
use expression::id_card;
use expression::{Engine, EvalError, FixedClock, Value, Variables};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, 0))
        .unwrap()
}

fn engine() -> Engine {
    Engine::new().with_clock(FixedClock(at(2024, 3, 15, 10, 0)))
}

fn vars(pairs: &[(&str, &str)]) -> Variables {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn render(text: &str) -> String {
    engine().render(text, &Variables::new()).unwrap()
}

#[test]
fn today_year() {
    assert_eq!(
        engine().evaluate("$date_time.today.year", &Variables::new()),
        Ok(Value::Integer(2024))
    );
}

#[test]
fn now_plus_three_days_formatted() {
    assert_eq!(render("$date_time.now + 3d => yyyy-MM-dd"), "2024-03-18");
}

#[rstest]
#[case("$date_time.now", "2024-03-15 10:00:00")]
#[case("$date_time.today", "2024-03-15 00:00:00")]
#[case("$date_time.yesterday", "2024-03-14 00:00:00")]
#[case("$date_time.tomorrow", "2024-03-16 00:00:00")]
#[case("$DATE_TIME.Now", "2024-03-15 10:00:00")]
#[case("$date_time.now + 2h => HH:mm", "12:00")]
#[case("$date_time.now + 90 m => HH:mm", "11:30")]
#[case("$date_time.now - 30s => HH:mm:ss", "09:59:30")]
#[case("$date_time.now + 1500ms => ss", "01")]
#[case("$date_time.now + 1w => yyyy-MM-dd", "2024-03-22")]
#[case("$date_time.now - 1M => yyyy-MM-dd", "2024-02-15")]
#[case("$date_time.now + 1y => yyyy", "2025")]
#[case("$date_time.now => dd/MM/yyyy 100%", "15/03/2024 100%")]
#[case("$date_time.today.month", "3")]
#[case("$date_time.today.day", "15")]
#[case("$date_time.today.month-day", "15")]
#[case("$date_time.today.year-day", "75")]
#[case("$date_time.today.week-day", "5")]
#[case("$date_time.today.year + 1", "2025")]
#[case("$date_time.today.year - 24 => yyyy", "2000")]
fn date_time_expressions(#[case] text: &str, #[case] expected: &str) {
    assert_eq!(render(text), expected);
}

#[test]
fn month_arithmetic_clamps_to_month_end() {
    let engine = Engine::new().with_clock(FixedClock(at(2024, 1, 31, 0, 0)));
    assert_eq!(
        engine.render("$date_time.now + 1M => yyyy-MM-dd", &Variables::new()),
        Ok("2024-02-29".to_string())
    );
}

#[rstest]
#[case("", EvalError::Empty)]
#[case("$nope.x", EvalError::UnknownEvaluator("$nope".into()))]
#[case("$date_time", EvalError::SegmentCount { expected: "2 or 3", got: 1 })]
#[case("$date_time.now.year.extra", EvalError::SegmentCount { expected: "2 or 3", got: 4 })]
#[case("$date_time.later", EvalError::UnknownSegment("later".into()))]
#[case("$date_time.now.hour", EvalError::UnknownSegment("hour".into()))]
#[case("$date_time.now + 1x", EvalError::UnknownUnit("x".into()))]
#[case("$date_time.now + 1D", EvalError::UnknownUnit("D".into()))]
#[case("$date_time.now + 5 days ago", EvalError::BadOperand("5 days ago".into()))]
fn failures(#[case] text: &str, #[case] expected: EvalError) {
    assert_eq!(engine().evaluate(text, &Variables::new()), Err(expected));
}

#[test]
fn operand_type_must_match_value() {
    let result = engine().evaluate("$date_time.now + 3", &Variables::new());
    assert!(matches!(result, Err(EvalError::TypeMismatch { value: "timestamp", .. })));

    let result = engine().evaluate("$date_time.today.year + 1d", &Variables::new());
    assert!(matches!(result, Err(EvalError::TypeMismatch { value: "integer", .. })));
}

#[test]
fn integer_operators() {
    let seven = || Value::Integer(7);
    assert_eq!(seven().apply(Operator::Mul, Operand::new(6, None)), Ok(Value::Integer(42)));
    assert_eq!(seven().apply(Operator::Div, Operand::new(2, None)), Ok(Value::Integer(3)));
    assert_eq!(seven().apply(Operator::Rem, Operand::new(4, None)), Ok(Value::Integer(3)));
    assert_eq!(
        seven().apply(Operator::Div, Operand::new(0, None)),
        Err(EvalError::DivisionByZero)
    );
    assert_eq!(
        Value::Integer(i64::MAX).apply(Operator::Add, Operand::new(1, None)),
        Err(EvalError::Overflow)
    );
}

#[test]
fn timestamps_only_add_and_subtract() {
    let ts = Value::Timestamp(at(2024, 3, 15, 10, 0));
    let result = ts.apply(Operator::Mul, Operand::new(2, Some(Unit::Days)));
    assert!(matches!(result, Err(EvalError::TypeMismatch { operator: '*', .. })));
}

#[test]
fn expression_parts() {
    let expression = Expression::parse(" $date_time . now - 1 M => yyyy ").unwrap();
    assert_eq!(expression.tag, "$date_time");
    assert_eq!(expression.segments, vec!["$date_time", "now"]);
    assert_eq!(expression.format.as_deref(), Some("yyyy"));
    let operation = expression.operation.unwrap();
    assert_eq!(operation.operator, Operator::Sub);
    assert_eq!(operation.operand(), Ok(Operand::new(1, Some(Unit::Months))));
}

#[test]
fn hyphenated_segment_is_not_an_operator() {
    let expression = Expression::parse("$date_time.today.week-day").unwrap();
    assert_eq!(expression.operation, None);
    assert_eq!(expression.arguments(), ["today", "week-day"]);
}

// ---------------------------------------------------------------------------
// Variables and other evaluators
// ---------------------------------------------------------------------------

#[test]
fn variables_resolve_by_full_text() {
    let variables = vars(&[("host", "example.com"), ("build-1", "ok")]);
    let engine = engine();
    assert_eq!(engine.render("host", &variables), Ok("example.com".into()));
    assert_eq!(engine.render("  host ", &variables), Ok("example.com".into()));
    assert_eq!(engine.render("build-1", &variables), Ok("ok".into()));
}

#[test]
fn missing_variable_passes_through() {
    assert_eq!(engine().evaluate("missingVar", &Variables::new()), Ok(Value::Text("missingVar".into())));
}

#[test]
fn uuid_is_fresh() {
    let engine = engine();
    let first = engine.render("$uuid", &Variables::new()).unwrap();
    let second = engine.render("$UUID", &Variables::new()).unwrap();
    assert!(uuid::Uuid::parse_str(&first).is_ok());
    assert_ne!(first, second);
}

#[test]
fn id_card_is_valid() {
    let number = engine().render("$id_card.anything", &Variables::new()).unwrap();
    assert_eq!(number.len(), 18);
    assert!(id_card::is_valid(&number), "{}", number);
    let birthday = NaiveDate::parse_from_str(&number[6..14], "%Y%m%d").unwrap();
    assert!(birthday <= NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
}

struct Answer;

impl Evaluator for Answer {
    fn tag(&self) -> &str {
        "$answer"
    }

    fn evaluate(&self, _expression: &Expression, _clock: &dyn Clock) -> Result<Value, EvalError> {
        Ok(Value::Integer(42))
    }
}

#[test]
fn custom_evaluator() {
    let engine = engine().with_evaluator(Answer);
    assert_eq!(engine.render("$answer - 2", &Variables::new()), Ok("40".into()));
    assert!(engine.tags().any(|t| t == "$date_time"));
}

// ---------------------------------------------------------------------------
// Placeholder driver
// ---------------------------------------------------------------------------

#[test]
fn missing_var_document() {
    assert_eq!(engine().resolve("{{missingVar}}", &Variables::new()), "missingVar");
}

#[test]
fn resolves_every_placeholder() {
    let variables = vars(&[("host", "example.com"), ("id", "7")]);
    assert_eq!(
        engine().resolve("http://{{host}}/users/{{ id }}?d={{$date_time.today => yyyyMMdd}}", &variables),
        "http://example.com/users/7?d=20240315"
    );
}

#[test]
fn failed_placeholders_keep_their_text() {
    let variables = vars(&[("host", "example.com")]);
    assert_eq!(
        engine().resolve("a {{$nope}} b {{host}} c {{$date_time.now + 1q}}", &variables),
        "a {{$nope}} b example.com c {{$date_time.now + 1q}}"
    );
}

#[test]
fn empty_and_unclosed_braces_are_untouched() {
    let engine = engine();
    assert_eq!(engine.resolve("{{}}", &Variables::new()), "{{}}");
    assert_eq!(engine.resolve("{{open", &Variables::new()), "{{open");
}

#[test]
fn format_is_ignored_for_integers() {
    assert_eq!(engine().resolve("{{$date_time.today.year => MM}}", &Variables::new()), "2024");
}

proptest! {
    #[test]
    fn text_without_placeholders_is_unchanged(text in any::<String>()) {
        prop_assume!(!text.contains("{{"));
        prop_assert_eq!(engine().resolve(&text, &Variables::new()), text);
    }

    #[test]
    fn resolved_output_is_a_fixed_point(name in "[a-z]{1,8}", value in "[a-z0-9./:]{0,12}") {
        let variables = vars(&[(name.as_str(), value.as_str())]);
        let once = engine().resolve(&format!("x{{{{{}}}}}y", name), &variables);
        prop_assert_eq!(&once, &format!("x{}y", value));
        prop_assert_eq!(engine().resolve(&once, &variables), once.clone());
    }
}
