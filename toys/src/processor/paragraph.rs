use crate::node::{Node, NodeId, NodeKind};
use crate::parser::error::ParseError;
use crate::processor::{Processor, consume_lines};

/// Fallback for any non-blank line. Lines are concatenated as-is until a blank line.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParagraphProcessor;

impl Processor for ParagraphProcessor {
    fn flag(&self) -> &str {
        ""
    }

    fn recognizes(&self, line: &str) -> bool {
        !line.trim().is_empty()
    }

    fn consume(&self, lines: &[&str], cursor: &mut usize, id: NodeId) -> Result<Node, ParseError> {
        let (content, line_span) =
            consume_lines(lines, cursor, "", |line| line, |line| line.trim().is_empty());

        if line_span.is_empty() {
            return Err(ParseError::error("expected a paragraph", *cursor + 1));
        }

        Ok(Node::new(id, NodeKind::Paragraph, content.trim(), line_span))
    }
}
