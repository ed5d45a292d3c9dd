pub mod blockquote;
pub mod code_fence;
pub mod heading;
pub mod paragraph;

pub use blockquote::BlockquoteProcessor;
pub use code_fence::CodeFenceProcessor;
pub use heading::HeadingProcessor;
pub use paragraph::ParagraphProcessor;

use crate::node::{Node, NodeId};
use crate::parser::error::ParseError;

/// Marker of a heading line.
pub const HEADING: &str = "#";
/// Marker of a quoted line.
pub const BLOCKQUOTE: &str = ">";
/// Opening and closing marker of a fenced code block.
pub const CODE_FENCE: &str = "```";

/// Recognizes one kind of construct and turns its lines into a [`Node`].
///
/// Processors are stateless; the parser owns ids, the node list and the tree.
pub trait Processor: Send + Sync {
    /// The marker this processor is registered under. Empty for the fallback.
    fn flag(&self) -> &str;

    /// Whether a (trimmed) line starts this construct.
    fn recognizes(&self, line: &str) -> bool;

    /// Consume the construct starting at `lines[*cursor]`.
    ///
    /// On return `*cursor` is the index of the first line that was not consumed.
    /// On failure no node is produced and the cursor is left where parsing
    /// should resume.
    fn consume(&self, lines: &[&str], cursor: &mut usize, id: NodeId) -> Result<Node, ParseError>;
}

/// The default processors in priority order. Paragraphs are the fallback and
/// are not part of this list.
pub fn defaults() -> Vec<Box<dyn Processor>> {
    vec![
        Box::new(HeadingProcessor),
        Box::new(BlockquoteProcessor),
        Box::new(CodeFenceProcessor),
    ]
}

/// Shared multi-line policy: transform each line and join them with `separator`
/// until `finished` accepts the current line or the input runs out.
///
/// Returns the joined content and the 1-based numbers of the consumed lines.
/// The line that satisfied `finished` is not consumed.
pub fn consume_lines(
    lines: &[&str],
    cursor: &mut usize,
    separator: &str,
    transform: impl Fn(&str) -> &str,
    finished: impl Fn(&str) -> bool,
) -> (String, Vec<usize>) {
    let mut parts: Vec<&str> = Vec::new();
    let mut line_span = Vec::new();

    while let Some(line) = lines.get(*cursor).copied() {
        if finished(line) {
            break;
        }
        parts.push(transform(line));
        line_span.push(*cursor + 1);
        *cursor += 1;
    }

    (parts.join(separator), line_span)
}
