use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::error::EvalError;
use crate::evaluator::{self, Evaluator};
use crate::expr::Expression;
use crate::value::Value;

/// Caller-supplied variables, looked up by the full expression text.
pub type Variables = HashMap<String, String>;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("placeholder pattern is valid"));

/// Resolves `{{...}}` placeholders.
///
/// Built once with its evaluators and clock, then shared read-only. Variables
/// are passed per call.
pub struct Engine {
    evaluators: HashMap<String, Box<dyn Evaluator>>,
    clock: Box<dyn Clock>,
}

impl Default for Engine {
    fn default() -> Self {
        let mut engine = Engine {
            evaluators: HashMap::new(),
            clock: Box::new(SystemClock),
        };
        for evaluator in evaluator::defaults() {
            engine.insert(evaluator);
        }
        engine
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Add an evaluator, replacing any registered under the same tag.
    pub fn with_evaluator(mut self, evaluator: impl Evaluator + 'static) -> Self {
        self.insert(Box::new(evaluator));
        self
    }

    fn insert(&mut self, evaluator: Box<dyn Evaluator>) {
        self.evaluators.insert(evaluator.tag().to_lowercase(), evaluator);
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.evaluators.keys().map(|s| s.as_str())
    }

    /// Evaluate the text inside one placeholder.
    ///
    /// A `$` tag goes to its evaluator and any operation is applied to the
    /// result. Anything else is a variable lookup by the whole trimmed text;
    /// a missing variable yields `text` itself.
    pub fn evaluate(&self, text: &str, variables: &Variables) -> Result<Value, EvalError> {
        let expression = Expression::parse(text)?;
        self.evaluate_expression(&expression, text, variables)
    }

    /// Evaluate and render, honouring the expression's format.
    pub fn render(&self, text: &str, variables: &Variables) -> Result<String, EvalError> {
        let expression = Expression::parse(text)?;
        let value = self.evaluate_expression(&expression, text, variables)?;
        Ok(value.render(expression.format.as_deref()))
    }

    fn evaluate_expression(
        &self,
        expression: &Expression,
        text: &str,
        variables: &Variables,
    ) -> Result<Value, EvalError> {
        if !expression.is_builtin() {
            let value = variables
                .get(&expression.text)
                .cloned()
                .unwrap_or_else(|| text.to_string());
            return Ok(Value::Text(value));
        }

        let evaluator = self
            .evaluators
            .get(&expression.tag)
            .ok_or_else(|| EvalError::UnknownEvaluator(expression.tag.clone()))?;
        let value = evaluator.evaluate(expression, self.clock.as_ref())?;

        match &expression.operation {
            Some(operation) => value.apply(operation.operator, operation.operand()?),
            None => Ok(value),
        }
    }

    /// Replace every `{{...}}` in `host`. An occurrence that fails to evaluate
    /// is left as written, braces included.
    pub fn resolve(&self, host: &str, variables: &Variables) -> String {
        if !host.contains("{{") {
            return host.to_string();
        }

        PLACEHOLDER
            .replace_all(host, |captures: &Captures| {
                let placeholder = &captures[0];
                match self.render(&captures[1], variables) {
                    Ok(resolved) => {
                        debug!(placeholder, resolved = %resolved, "resolved placeholder");
                        resolved
                    }
                    Err(error) => {
                        debug!(placeholder, %error, "placeholder left unresolved");
                        placeholder.to_string()
                    }
                }
            })
            .into_owned()
    }
}
