//! fOS DOM - Document Object Model
//!
//! Arena-backed host document tree used as the mutation target of the
//! virtual-tree engine. Every mutation is appended to a record log so
//! callers can observe exactly which host operations were performed.

mod classlist;
mod dataset;
mod document;
mod events;
mod frames;
mod mutation;
mod node;
mod operations;
mod style;
mod tree;

pub use classlist::DOMTokenList;
pub use dataset::DOMStringMap;
pub use document::Document;
pub use events::{DispatchOutcome, Event, EventCallback, Listener, ListenerId};
pub use frames::{AnimationFrameQueue, FrameCallback};
pub use mutation::{MutationRecord, MutationType};
pub use node::{ElementData, Node, NodeData, PropertyValue};
pub use operations::{DomError, DomResult};
pub use style::CssStyleDeclaration;
pub use tree::DomTree;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Arena slot of this node
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
