use std::fmt::Debug;

use preview_echo_html::{NodeId, Tree};

/// Read-only view of the rendered preview.
///
/// The extractor only needs to walk up to a block, list children in order
/// and read text leaves, so that is all a host has to provide.
pub trait DomView {
    type Node: Copy + Eq + Debug;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Children in document order.
    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Lower-case tag name for elements, `None` for anything else.
    fn tag_name(&self, node: Self::Node) -> Option<&str>;

    /// Character data for text nodes, `None` for anything else.
    fn text(&self, node: Self::Node) -> Option<&str>;
}

impl DomView for Tree {
    type Node = NodeId;

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        Tree::parent(self, node)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        Tree::children(self, node).to_vec()
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.tag(node)
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        Tree::text(self, node)
    }
}
