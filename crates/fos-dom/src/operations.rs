//! DOM Node Operations
//!
//! Error type shared by every structural and attribute operation.

use crate::NodeId;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Node not found
    #[error("node {0} not found")]
    NotFound(NodeId),
    /// Hierarchy error (e.g., inserting ancestor)
    #[error("hierarchy request error: {child} cannot be inserted into {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },
    /// Node is not a child
    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
    /// Invalid node type
    #[error("node {0} does not support this operation")]
    InvalidNodeType(NodeId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DomError::NotAChild {
            parent: NodeId(1),
            child: NodeId(7),
        };
        assert_eq!(err.to_string(), "node #7 is not a child of #1");

        let err = DomError::InvalidNodeType(NodeId(3));
        assert!(err.to_string().contains("#3"));
    }
}
