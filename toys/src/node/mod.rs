use std::fmt;

/// Identifier of a node within one parse run. The first emitted node gets id 1.
pub type NodeId = usize;

/// A fragment of a request document produced by one construct processor.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// Logical text: marker stripped, continuation lines joined.
    pub content: String,
    /// Nearest enclosing node. Lookup only, the parent does not own the child.
    pub parent_id: Option<NodeId>,
    /// Structural children in emission order.
    pub children_ids: Vec<NodeId>,
    /// 1-based source line numbers this node was built from.
    pub line_span: Vec<usize>,
    pub kind: NodeKind,
}

/// The construct a node was built from.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// `#`..`######` line. `order` is informational numbering, not unique.
    Heading { level: usize, order: usize },
    /// `>` lines.
    Blockquote,
    /// Fenced code block with its info string.
    CodeFence { lang: String },
    /// Anything else.
    Paragraph,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind, content: impl Into<String>, line_span: Vec<usize>) -> Self {
        Node {
            id,
            content: content.into(),
            parent_id: None,
            children_ids: Vec::new(),
            line_span,
            kind,
        }
    }

    /// Heading level, `None` for every other construct.
    pub fn heading_level(&self) -> Option<usize> {
        match self.kind {
            NodeKind::Heading { level, .. } => Some(level),
            _ => None,
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self.kind, NodeKind::Heading { .. })
    }

    /// True for a heading at exactly `level`.
    pub fn is_heading_at(&self, level: usize) -> bool {
        self.heading_level() == Some(level)
    }

    pub fn has_children(&self) -> bool {
        !self.children_ids.is_empty()
    }

    /// First source line of the node.
    pub fn first_line(&self) -> usize {
        self.line_span.first().copied().unwrap_or(0)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Heading { level, .. } => write!(f, "heading(h{})", level),
            NodeKind::Blockquote => write!(f, "blockquote"),
            NodeKind::CodeFence { lang } if lang.is_empty() => write!(f, "code"),
            NodeKind::CodeFence { lang } => write!(f, "code({})", lang),
            NodeKind::Paragraph => write!(f, "paragraph"),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Heading { level, .. } => {
                for _ in 0..*level {
                    write!(f, "#")?;
                }
                writeln!(f, " {}", self.content)
            }
            NodeKind::Blockquote => writeln!(f, "> {}", self.content),
            NodeKind::CodeFence { lang } => {
                writeln!(f, "```{}", lang)?;
                if !self.content.is_empty() {
                    writeln!(f, "{}", self.content)?;
                }
                writeln!(f, "```")
            }
            NodeKind::Paragraph => writeln!(f, "{}", self.content),
        }
    }
}
