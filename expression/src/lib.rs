pub mod clock;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod expr;
pub mod id_card;
pub mod substitute;
pub mod value;

pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{Engine, Variables};
pub use error::EvalError;
pub use evaluator::Evaluator;
pub use expr::Expression;
pub use substitute::resolve_toy;
pub use value::Value;
