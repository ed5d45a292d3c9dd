use std::fmt::Write;
use std::time::Instant;

use toys::{Outcome, Toy, ToyError, ToyKind, Transport, Transports};

/// Renders a resolved request instead of sending it.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRun;

impl DryRun {
    /// Request line, headers, a blank line and the body, as they would go on the wire.
    pub fn render(toy: &Toy) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} {} {}", toy.method, toy.target(), toy.http_version);
        for (name, value) in &toy.header {
            let _ = writeln!(out, "{}: {}", name, value);
        }
        if !toy.body.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", toy.body);
        }
        out
    }
}

impl Transport for DryRun {
    fn execute(&self, toy: &Toy) -> Result<Outcome, ToyError> {
        let started = Instant::now();
        let body = Self::render(toy);
        Ok(Outcome {
            success: true,
            status: format!("dry run ({})", toy.kind()?),
            header: toy.header.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            body,
            elapsed: started.elapsed(),
        })
    }
}

/// Every request kind goes to the dry-run transport.
pub fn transports() -> Transports {
    Transports::new()
        .with(ToyKind::Http, DryRun)
        .with(ToyKind::Database, DryRun)
}
