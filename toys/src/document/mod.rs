use crate::node::{Node, NodeId};
use crate::parser::error::ParseError;

/// The node tree produced by one parse run, in emission order.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub nodes: Vec<Node>,
    /// Problems absorbed while parsing (e.g. unterminated fences).
    pub diagnostics: Vec<ParseError>,
}

impl Document {
    pub fn empty() -> Self {
        Document::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes
            .binary_search_by_key(&id, |n| n.id)
            .ok()
            .map(|index| &self.nodes[index])
    }

    /// Nodes without a parent.
    pub fn roots(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.parent_id.is_none())
    }

    pub fn children<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Node> + 'a {
        node.children_ids.iter().filter_map(|id| self.get(*id))
    }
}

/// Split text into lines, accepting `\r\n`, `\r` and `\n` endings.
///
/// A trailing line ending does not produce an extra empty line. A leading
/// byte order mark is dropped.
pub fn split_lines(text: &str) -> Vec<&str> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                start = i + 1;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}
