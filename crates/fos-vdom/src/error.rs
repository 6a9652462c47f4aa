//! Render errors
//!
//! Every variant is fatal for the render pass that produced it: a host
//! tree that was half mutated cannot be rolled back.

use fos_dom::DomError;

use crate::Key;

/// Markup combination that cannot be expressed on a node
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
    #[error("raw markup can only be set on element nodes")]
    RawMarkupOnText,

    #[error("raw markup cannot be combined with child nodes on <{tag}>")]
    RawMarkupWithChildren { tag: String },

    #[error("{kind} markup cannot be applied to a text node")]
    UnsupportedOnText { kind: &'static str },
}

/// Render pass failure
#[derive(Debug, Clone, thiserror::Error)]
pub enum RenderError {
    #[error("markup violation: {0}")]
    Markup(#[from] MarkupError),

    #[error("inconsistent keying: all siblings must have keys when any sibling is keyed")]
    MixedKeys,

    #[error("duplicate sibling key {0}")]
    DuplicateKey(Key),

    #[error("component {0} has never been rendered")]
    NeverRendered(&'static str),

    #[error("root component rendered <{found}>, expected <{expected}>")]
    RootMismatch { expected: String, found: String },

    #[error("host tree operation failed: {0}")]
    Host(#[from] DomError),

    #[error("internal invariant violated: {0}")]
    Internal(&'static str),

    #[error("rendering halted after an earlier failure: {0}")]
    Halted(Box<RenderError>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_dom::NodeId;

    #[test]
    fn test_messages_name_the_contract() {
        assert!(RenderError::MixedKeys.to_string().contains("inconsistent keying"));
        assert_eq!(
            RenderError::DuplicateKey(Key::from(3)).to_string(),
            "duplicate sibling key 3"
        );

        let err = RenderError::RootMismatch {
            expected: "body".into(),
            found: "div".into(),
        };
        assert_eq!(err.to_string(), "root component rendered <div>, expected <body>");
    }

    #[test]
    fn test_conversions() {
        let err: RenderError = MarkupError::RawMarkupOnText.into();
        assert!(matches!(err, RenderError::Markup(MarkupError::RawMarkupOnText)));

        let root: NodeId = fos_dom::Document::new().unwrap().root();
        let err: RenderError = DomError::InvalidNodeType(root).into();
        assert!(matches!(err, RenderError::Host(_)));
    }
}
