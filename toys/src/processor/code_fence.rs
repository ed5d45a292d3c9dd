use crate::node::{Node, NodeId, NodeKind};
use crate::parser::error::ParseError;
use crate::processor::{CODE_FENCE, Processor, consume_lines};

/// Fenced code block. The opening line carries the language; lines are kept raw
/// and joined with `\n` until a line that is only the fence marker.
#[derive(Debug, Default, Clone, Copy)]
pub struct CodeFenceProcessor;

impl Processor for CodeFenceProcessor {
    fn flag(&self) -> &str {
        CODE_FENCE
    }

    fn recognizes(&self, line: &str) -> bool {
        line.trim_start().starts_with(CODE_FENCE)
    }

    fn consume(&self, lines: &[&str], cursor: &mut usize, id: NodeId) -> Result<Node, ParseError> {
        let start = *cursor;
        let opening_line = start + 1;
        let lang = lines
            .get(start)
            .and_then(|l| l.trim().strip_prefix(CODE_FENCE))
            .map(|rest| rest.trim().to_string())
            .ok_or_else(|| ParseError::error("expected a code fence", opening_line))?;

        *cursor += 1;
        let (content, mut line_span) =
            consume_lines(lines, cursor, "\n", |line| line, |line| line.trim() == CODE_FENCE);

        if *cursor >= lines.len() {
            // Unterminated: the following lines do not belong to the fence.
            *cursor = start + 1;
            return Err(ParseError::warning("unterminated code fence", opening_line)
                .with_note("the block was ignored; close it with a line containing only ```"));
        }

        // Closing marker is consumed but not part of the content.
        *cursor += 1;
        line_span.insert(0, opening_line);
        line_span.push(*cursor);

        Ok(Node::new(id, NodeKind::CodeFence { lang }, content, line_span))
    }
}
