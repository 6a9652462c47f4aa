//! Mutation records
//!
//! Every host mutation performed through [`crate::Document`] is logged as
//! one record, in order. Tests and tooling drain the log to see exactly
//! what a render pass did to the tree.

use crate::NodeId;

/// Coarse classification of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationType {
    /// Node materialized
    Creation,
    /// Child list changed (append, insert, remove)
    ChildList,
    /// Property, attribute, class, dataset, style or inner markup changed
    Attributes,
    /// Text node content changed
    CharacterData,
    /// Listener bound or unbound
    Listeners,
}

/// A single host mutation
#[derive(Debug, Clone, PartialEq)]
pub enum MutationRecord {
    CreateElement { node: NodeId, tag: String },
    CreateText { node: NodeId },
    SetText {
        node: NodeId,
        old_text: String,
        new_text: String,
    },
    SetProperty { node: NodeId, name: String },
    DeleteProperty { node: NodeId, name: String },
    SetAttribute {
        node: NodeId,
        name: String,
        old_value: Option<String>,
    },
    RemoveAttribute { node: NodeId, name: String },
    AddClass { node: NodeId, name: String },
    RemoveClass { node: NodeId, name: String },
    SetData { node: NodeId, key: String },
    RemoveData { node: NodeId, key: String },
    SetStyle { node: NodeId, property: String },
    RemoveStyle { node: NodeId, property: String },
    SetInnerHtml { node: NodeId },
    AddListener { node: NodeId, event_type: String },
    RemoveListener { node: NodeId, event_type: String },
    Append { parent: NodeId, child: NodeId },
    Insert {
        parent: NodeId,
        child: NodeId,
        before: NodeId,
    },
    Remove { parent: NodeId, child: NodeId },
}

impl MutationRecord {
    /// Classify this record
    pub fn mutation_type(&self) -> MutationType {
        match self {
            Self::CreateElement { .. } | Self::CreateText { .. } => MutationType::Creation,
            Self::SetText { .. } => MutationType::CharacterData,
            Self::Append { .. } | Self::Insert { .. } | Self::Remove { .. } => {
                MutationType::ChildList
            }
            Self::AddListener { .. } | Self::RemoveListener { .. } => MutationType::Listeners,
            Self::SetProperty { .. }
            | Self::DeleteProperty { .. }
            | Self::SetAttribute { .. }
            | Self::RemoveAttribute { .. }
            | Self::AddClass { .. }
            | Self::RemoveClass { .. }
            | Self::SetData { .. }
            | Self::RemoveData { .. }
            | Self::SetStyle { .. }
            | Self::RemoveStyle { .. }
            | Self::SetInnerHtml { .. } => MutationType::Attributes,
        }
    }

    /// Node the record applies to (the parent for child-list records)
    pub fn target(&self) -> NodeId {
        match self {
            Self::CreateElement { node, .. }
            | Self::CreateText { node }
            | Self::SetText { node, .. }
            | Self::SetProperty { node, .. }
            | Self::DeleteProperty { node, .. }
            | Self::SetAttribute { node, .. }
            | Self::RemoveAttribute { node, .. }
            | Self::AddClass { node, .. }
            | Self::RemoveClass { node, .. }
            | Self::SetData { node, .. }
            | Self::RemoveData { node, .. }
            | Self::SetStyle { node, .. }
            | Self::RemoveStyle { node, .. }
            | Self::SetInnerHtml { node }
            | Self::AddListener { node, .. }
            | Self::RemoveListener { node, .. } => *node,
            Self::Append { parent, .. }
            | Self::Insert { parent, .. }
            | Self::Remove { parent, .. } => *parent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let insert = MutationRecord::Insert {
            parent: NodeId(1),
            child: NodeId(2),
            before: NodeId(3),
        };
        assert_eq!(insert.mutation_type(), MutationType::ChildList);
        assert_eq!(insert.target(), NodeId(1));

        let text = MutationRecord::SetText {
            node: NodeId(5),
            old_text: "a".into(),
            new_text: "b".into(),
        };
        assert_eq!(text.mutation_type(), MutationType::CharacterData);

        let class = MutationRecord::AddClass {
            node: NodeId(5),
            name: "x".into(),
        };
        assert_eq!(class.mutation_type(), MutationType::Attributes);
    }
}
