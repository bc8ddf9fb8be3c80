//! The output tree: a small arena of [`NodeData`] values addressed by
//! [`indextree::NodeId`]. The arena owns every node's storage, so a
//! `NodeId` alone is enough to navigate to parent, children or siblings
//! without any `Rc`/`Weak` bookkeeping of our own.

use indextree::Arena;

pub use indextree::NodeId;

/// The data carried by one node of the tree. `Root` is always the single
/// node at [`Document::root`]; every other variant appears only as a
/// descendant of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Root,
    Doctype {
        name: String,
        data: Option<String>,
    },
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    Text(String),
    Comment(String),
}

/// The parsed document: an arena of nodes plus the id of the root node.
#[derive(Debug)]
pub struct Document {
    pub(crate) arena: Arena<NodeData>,
    pub(crate) root: NodeId,
}

impl Document {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.arena.get(id).map(|node| node.get())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).and_then(|node| node.parent())
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.children(&self.arena)
    }
}
