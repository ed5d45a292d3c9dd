use crate::node::{Node, NodeId, NodeKind};
use crate::parser::error::ParseError;
use crate::processor::{BLOCKQUOTE, Processor, consume_lines};

/// Consecutive `>` lines, joined with a single space.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlockquoteProcessor;

/// Strip the marker and one following space.
fn strip_marker(line: &str) -> &str {
    let line = line.trim_start();
    let rest = line.strip_prefix(BLOCKQUOTE).unwrap_or(line);
    rest.strip_prefix(' ').unwrap_or(rest).trim_end()
}

impl Processor for BlockquoteProcessor {
    fn flag(&self) -> &str {
        BLOCKQUOTE
    }

    fn recognizes(&self, line: &str) -> bool {
        line.trim_start().starts_with(BLOCKQUOTE)
    }

    fn consume(&self, lines: &[&str], cursor: &mut usize, id: NodeId) -> Result<Node, ParseError> {
        let (content, line_span) =
            consume_lines(lines, cursor, " ", strip_marker, |line| !self.recognizes(line));

        if line_span.is_empty() {
            return Err(ParseError::error("expected a blockquote", *cursor + 1));
        }

        Ok(Node::new(id, NodeKind::Blockquote, content, line_span))
    }
}
