use std::collections::HashMap;
use std::time::Duration;

use crate::error::ToyError;
use crate::toy::{Toy, ToyKind};

/// What a backend reports after executing a request.
#[derive(Debug, Clone, Default)]
pub struct Outcome {
    pub success: bool,
    /// Status line or short result description.
    pub status: String,
    pub header: Vec<(String, String)>,
    pub body: String,
    pub elapsed: Duration,
}

/// Executes a fully resolved request.
pub trait Transport {
    fn execute(&self, toy: &Toy) -> Result<Outcome, ToyError>;
}

/// Transports by request kind, built once and passed by the caller.
#[derive(Default)]
pub struct Transports {
    table: HashMap<ToyKind, Box<dyn Transport>>,
}

impl Transports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: ToyKind, transport: impl Transport + 'static) -> Self {
        self.table.insert(kind, Box::new(transport));
        self
    }

    /// Execute `toy` with the transport registered for its kind.
    pub fn dispatch(&self, toy: &Toy) -> Result<Outcome, ToyError> {
        let kind = toy.kind()?;
        let transport = self.table.get(&kind).ok_or(ToyError::NoTransport { kind })?;
        transport.execute(toy)
    }
}
