pub mod error;
mod tree;

pub use error::ParseError;

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, warn};

use crate::document::{self, Document};
use crate::node::{Node, NodeId};
use crate::processor::{self, ParagraphProcessor, Processor};

use tree::HeadingTable;

/// Line-oriented document parser.
///
/// Each registered processor is tried in registration order; the first that
/// recognizes a line owns the cursor until its construct ends. Lines nothing
/// claims go to the paragraph fallback.
pub struct Parser {
    processors: Vec<Box<dyn Processor>>,
    fallback: Box<dyn Processor>,
}

impl Default for Parser {
    fn default() -> Self {
        Parser {
            processors: processor::defaults(),
            fallback: Box::new(ParagraphProcessor),
        }
    }
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an additional processor after the existing ones.
    ///
    /// Returns false (and drops the processor) if one with the same flag is
    /// already registered.
    pub fn register(&mut self, processor: impl Processor + 'static) -> bool {
        let flag = processor.flag();
        if flag == self.fallback.flag() || self.processors.iter().any(|p| p.flag() == flag) {
            return false;
        }
        self.processors.push(Box::new(processor));
        true
    }

    pub fn with_processor(mut self, processor: impl Processor + 'static) -> Self {
        self.register(processor);
        self
    }

    /// Flags of the registered processors, in priority order.
    pub fn flags(&self) -> impl Iterator<Item = &str> {
        self.processors.iter().map(|p| p.flag())
    }

    /// Parse raw text, normalizing line endings first.
    pub fn parse_text(&self, text: &str) -> Document {
        self.parse(&document::split_lines(text))
    }

    /// Parse an ordered list of lines into a node tree.
    pub fn parse<S: AsRef<str>>(&self, lines: &[S]) -> Document {
        let lines: Vec<&str> = lines.iter().map(AsRef::as_ref).collect();
        let mut state = ParseState::new();
        let mut cursor = 0;

        while cursor < lines.len() {
            let line = lines[cursor].trim();
            if line.is_empty() {
                cursor += 1;
                continue;
            }

            let processor = self
                .processors
                .iter()
                .find(|p| p.recognizes(line))
                .unwrap_or(&self.fallback);

            let start = cursor;
            match processor.consume(&lines, &mut cursor, state.next_id()) {
                Ok(node) => state.push(node),
                Err(error) => {
                    warn!(line = error.line, "{}", error.message);
                    state.errors.push(error);
                }
            }
            if cursor <= start {
                cursor = start + 1;
            }
        }

        state.finalize()
    }
}

// ---------------------------------------------------------------------------
// Parse state
// ---------------------------------------------------------------------------

struct ParseState {
    nodes: Vec<Node>,
    id: AtomicUsize,
    headings: HeadingTable,
    errors: Vec<ParseError>,
}

impl ParseState {
    fn new() -> Self {
        ParseState {
            nodes: Vec::new(),
            id: AtomicUsize::new(0),
            headings: HeadingTable::default(),
            errors: Vec::new(),
        }
    }

    fn next_id(&self) -> NodeId {
        self.id.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn push(&mut self, mut node: Node) {
        self.headings.link(&mut node, &mut self.nodes);
        debug!(
            id = node.id,
            kind = %node.kind,
            parent = ?node.parent_id,
            lines = ?node.line_span,
            "emitted node"
        );
        self.nodes.push(node);
    }

    fn finalize(self) -> Document {
        Document {
            nodes: self.nodes,
            diagnostics: self.errors,
        }
    }
}
