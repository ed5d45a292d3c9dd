use crate::node::{Node, NodeId, NodeKind};

/// Most recent heading per level, used to link each new node to its parent.
///
/// A heading links to the latest heading exactly one level shallower, any other
/// construct to the latest heading of any level. Entries are never cleared, so
/// the result is the same as scanning the emitted nodes backwards.
#[derive(Debug, Default)]
pub(crate) struct HeadingTable {
    /// Indexed by level: (id, order) of the latest heading at that level.
    by_level: Vec<Option<(NodeId, usize)>>,
    latest: Option<NodeId>,
}

impl HeadingTable {
    fn heading_at(&self, level: usize) -> Option<(NodeId, usize)> {
        self.by_level.get(level).copied().flatten()
    }

    fn record(&mut self, level: usize, id: NodeId, order: usize) {
        if self.by_level.len() <= level {
            self.by_level.resize(level + 1, None);
        }
        self.by_level[level] = Some((id, order));
        self.latest = Some(id);
    }

    /// Assign `node`'s parent (and a heading's order), registering it as a child
    /// of an already emitted node in `nodes`.
    pub(crate) fn link(&mut self, node: &mut Node, nodes: &mut [Node]) {
        let parent_id = match &mut node.kind {
            NodeKind::Heading { level, order } => {
                let level = *level;
                *order = self.heading_at(level).map_or(1, |(_, o)| o);
                let parent = if level > 1 {
                    self.heading_at(level - 1).map(|(id, _)| id)
                } else {
                    None
                };
                self.record(level, node.id, *order);
                parent
            }
            _ => self.latest,
        };

        let Some(parent_id) = parent_id else {
            return;
        };
        // Ids are strictly increasing in emission order.
        if let Ok(index) = nodes.binary_search_by_key(&parent_id, |n| n.id) {
            node.parent_id = Some(parent_id);
            nodes[index].children_ids.push(node.id);
        }
    }
}
