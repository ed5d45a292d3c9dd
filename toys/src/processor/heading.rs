use crate::node::{Node, NodeId, NodeKind};
use crate::parser::error::ParseError;
use crate::processor::{HEADING, Processor};

/// `#` lines. A heading is always a single line.
///
/// The emitted `order` is a placeholder; the parser's heading table assigns
/// the real value when the node is linked into the tree.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadingProcessor;

impl HeadingProcessor {
    /// Number of leading marker characters of a trimmed line.
    pub fn level(line: &str) -> usize {
        line.trim().chars().take_while(|c| HEADING.starts_with(*c)).count()
    }
}

impl Processor for HeadingProcessor {
    fn flag(&self) -> &str {
        HEADING
    }

    fn recognizes(&self, line: &str) -> bool {
        line.trim_start().starts_with(HEADING)
    }

    fn consume(&self, lines: &[&str], cursor: &mut usize, id: NodeId) -> Result<Node, ParseError> {
        let line_number = *cursor + 1;
        let line = lines
            .get(*cursor)
            .map(|l| l.trim())
            .filter(|l| self.recognizes(l))
            .ok_or_else(|| ParseError::error("expected a heading", line_number))?;

        let level = Self::level(line);
        let content = line[level * HEADING.len()..].trim_start();
        *cursor += 1;

        Ok(Node::new(
            id,
            NodeKind::Heading { level, order: 1 },
            content,
            vec![line_number],
        ))
    }
}
