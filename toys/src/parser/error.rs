use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};
use codespan_reporting::files::Files;

/// A problem found while parsing or extracting, located on a source line.
///
/// Nothing in the compiler is fatal: these are collected next to the result
/// and rendered by the caller.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    /// 1-based source line.
    pub line: usize,
    pub severity: Severity,
    pub notes: Vec<String>,
}

impl ParseError {
    pub fn error(message: impl Into<String>, line: usize) -> Self {
        ParseError {
            message: message.into(),
            line,
            severity: Severity::Error,
            notes: Vec::new(),
        }
    }

    pub fn warning(message: impl Into<String>, line: usize) -> Self {
        ParseError {
            message: message.into(),
            line,
            severity: Severity::Warning,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    ///
    /// The label covers the whole source line; if the line is out of range for
    /// the file the diagnostic is emitted without a label.
    pub fn to_diagnostic<'a, F>(&self, files: &'a F, file_id: usize) -> Diagnostic<usize>
    where
        F: Files<'a, FileId = usize>,
    {
        let mut diagnostic = Diagnostic::new(self.severity)
            .with_message(&self.message)
            .with_notes(self.notes.clone());
        if let Some(index) = self.line.checked_sub(1) {
            if let Ok(range) = files.line_range(file_id, index) {
                let end = range.end.max(range.start);
                diagnostic = diagnostic.with_labels(vec![Label::primary(file_id, range.start..end)]);
            }
        }
        diagnostic
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}
