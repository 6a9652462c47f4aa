//! Virtual Node Model
//!
//! A [`Node`] is rebuilt on every render. Once reconciled it remembers the
//! host node it was applied to, so the next render can be diffed against it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use fos_dom::{NodeId, PropertyValue};

use crate::{ComponentRef, EventListener, Markup, MarkupError, RenderError};

/// Identity key of a sibling among keyed siblings
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Int(i64),
    Str(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Key {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Self::Int(value as i64)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// What a node materializes as
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element {
        tag: String,
        namespace: Option<String>,
    },
    Text(String),
}

/// Virtual node: an element or a text leaf
#[derive(Debug, Clone)]
pub struct Node {
    kind: NodeKind,
    inner_html: Option<String>,
    pub(crate) classes: BTreeSet<String>,
    pub(crate) styles: BTreeMap<String, String>,
    pub(crate) dataset: BTreeMap<String, String>,
    pub(crate) properties: BTreeMap<String, PropertyValue>,
    pub(crate) attributes: BTreeMap<String, String>,
    pub(crate) listeners: Vec<EventListener>,
    pub(crate) children: Vec<Child>,
    key: Option<Key>,
    pub(crate) handle: Option<NodeId>,
    fault: Option<MarkupError>,
}

impl Node {
    fn with_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            inner_html: None,
            classes: BTreeSet::new(),
            styles: BTreeMap::new(),
            dataset: BTreeMap::new(),
            properties: BTreeMap::new(),
            attributes: BTreeMap::new(),
            listeners: Vec::new(),
            children: Vec::new(),
            key: None,
            handle: None,
            fault: None,
        }
    }

    /// Element node with markup folded on in order
    pub fn element(tag: impl Into<String>, markup: impl IntoIterator<Item = Markup>) -> Self {
        let mut node = Self::with_kind(NodeKind::Element {
            tag: tag.into(),
            namespace: None,
        });
        node.extend(markup);
        node
    }

    /// Text leaf
    pub fn text(content: impl Into<String>) -> Self {
        Self::with_kind(NodeKind::Text(content.into()))
    }

    /// Text leaf with markup; only keys apply to text
    pub fn text_with(content: impl Into<String>, markup: impl IntoIterator<Item = Markup>) -> Self {
        let mut node = Self::text(content);
        node.extend(markup);
        node
    }

    /// Fold markup items onto this node; later writes win
    pub fn extend(&mut self, markup: impl IntoIterator<Item = Markup>) {
        for item in markup {
            item.apply(self);
        }
    }

    pub(crate) fn record_fault(&mut self, fault: MarkupError) {
        self.fault.get_or_insert(fault);
    }

    pub(crate) fn set_namespace(&mut self, ns: String) {
        match &mut self.kind {
            NodeKind::Element { namespace, .. } => *namespace = Some(ns),
            NodeKind::Text(_) => {
                self.record_fault(MarkupError::UnsupportedOnText { kind: "namespace" })
            }
        }
    }

    pub(crate) fn set_inner_html(&mut self, html: String) {
        if self.is_text() {
            self.record_fault(MarkupError::RawMarkupOnText);
        } else {
            self.inner_html = Some(html);
        }
    }

    pub(crate) fn set_key(&mut self, key: Key) {
        self.key = Some(key);
    }

    /// Surface the first construction violation, if any
    pub fn validate(&self) -> Result<(), MarkupError> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }
        if let (Some(_), NodeKind::Element { tag, .. }) = (&self.inner_html, &self.kind) {
            if self.children.iter().any(|c| !matches!(c, Child::Absent)) {
                return Err(MarkupError::RawMarkupWithChildren { tag: tag.clone() });
            }
        }
        Ok(())
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text(_))
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { namespace, .. } => namespace.as_deref(),
            NodeKind::Text(_) => None,
        }
    }

    pub fn text_content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    pub fn inner_html(&self) -> Option<&str> {
        self.inner_html.as_deref()
    }

    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// Host node this node was applied to, once reconciled
    pub fn handle(&self) -> Option<NodeId> {
        self.handle
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn style(&self, name: &str) -> Option<&str> {
        self.styles.get(name).map(String::as_str)
    }

    pub fn data(&self, name: &str) -> Option<&str> {
        self.dataset.get(name).map(String::as_str)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn listeners(&self) -> &[EventListener] {
        &self.listeners
    }

    /// Both text, or both elements with the same tag and namespace
    pub fn is_compatible(&self, other: &Node) -> bool {
        match (&self.kind, &other.kind) {
            (NodeKind::Text(_), NodeKind::Text(_)) => true,
            (
                NodeKind::Element { tag, namespace },
                NodeKind::Element { tag: other_tag, namespace: other_ns },
            ) => tag == other_tag && namespace == other_ns,
            _ => false,
        }
    }
}

/// Unkeyed sequence of children, diffed positionally
#[derive(Debug, Clone, Default)]
pub struct List(pub Vec<Child>);

impl List {
    pub fn new(children: impl IntoIterator<Item = Child>) -> Self {
        Self(children.into_iter().collect())
    }

    /// Wrap this list so it is matched by key among its siblings
    pub fn keyed(self, key: impl Into<Key>) -> KeyedList {
        KeyedList {
            key: Some(key.into()),
            children: self.0,
        }
    }
}

impl FromIterator<Child> for List {
    fn from_iter<I: IntoIterator<Item = Child>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A list treated as a single reconcilable unit among its siblings
#[derive(Debug, Clone, Default)]
pub struct KeyedList {
    pub(crate) key: Option<Key>,
    pub(crate) children: Vec<Child>,
}

impl KeyedList {
    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }
}

impl From<List> for KeyedList {
    fn from(list: List) -> Self {
        Self {
            key: None,
            children: list.0,
        }
    }
}

/// One slot in a child sequence
#[derive(Debug, Clone)]
pub enum Child {
    Node(Node),
    Component(ComponentRef),
    List(List),
    KeyedList(KeyedList),
    /// Explicitly empty slot; keeps positional diffing stable
    Absent,
}

impl Child {
    /// Key used to match this child among keyed siblings
    pub fn key(&self) -> Option<Key> {
        match self {
            Self::Node(node) => node.key.clone(),
            Self::Component(component) => component.borrow().key(),
            Self::KeyedList(list) => list.key.clone(),
            Self::List(_) | Self::Absent => None,
        }
    }
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Self::Node(node)
    }
}

impl From<Option<Node>> for Child {
    fn from(node: Option<Node>) -> Self {
        node.map_or(Self::Absent, Self::Node)
    }
}

impl From<ComponentRef> for Child {
    fn from(component: ComponentRef) -> Self {
        Self::Component(component)
    }
}

impl From<Option<ComponentRef>> for Child {
    fn from(component: Option<ComponentRef>) -> Self {
        component.map_or(Self::Absent, Self::Component)
    }
}

impl From<List> for Child {
    fn from(list: List) -> Self {
        Self::List(list)
    }
}

impl From<KeyedList> for Child {
    fn from(list: KeyedList) -> Self {
        Self::KeyedList(list)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Self::Node(Node::text(text))
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Self::Node(Node::text(text))
    }
}

/// Check sibling keys: `Ok(true)` when the siblings are keyed
pub(crate) fn check_keys(children: &[Child]) -> Result<bool, RenderError> {
    let mut seen = std::collections::HashSet::new();
    let mut keyed = 0usize;
    let mut unkeyed = 0usize;

    for child in children {
        if matches!(child, Child::Absent) {
            continue;
        }
        match child.key() {
            Some(key) => {
                keyed += 1;
                if !seen.insert(key.clone()) {
                    return Err(RenderError::DuplicateKey(key));
                }
            }
            None => unkeyed += 1,
        }
        if keyed > 0 && unkeyed > 0 {
            return Err(RenderError::MixedKeys);
        }
    }
    Ok(keyed > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{class, key, prop, style, unsafe_html};

    #[test]
    fn test_later_markup_wins() {
        let node = Node::element(
            "div",
            [style("color", "red"), prop("value", "a"), style("color", "blue"), prop("value", "b")],
        );
        assert_eq!(node.style("color"), Some("blue"));
        assert_eq!(node.property("value"), Some(&PropertyValue::from("b")));
        assert!(node.validate().is_ok());
    }

    #[test]
    fn test_compatibility() {
        let div = Node::element("div", []);
        let span = Node::element("span", []);
        let svg_div = Node::element("div", [crate::namespace("http://www.w3.org/2000/svg")]);

        assert!(div.is_compatible(&Node::element("div", [class("x")])));
        assert!(!div.is_compatible(&span));
        assert!(!div.is_compatible(&svg_div));
        assert!(Node::text("a").is_compatible(&Node::text("b")));
        assert!(!Node::text("a").is_compatible(&div));
    }

    #[test]
    fn test_raw_markup_on_text_faults() {
        let node = Node::text_with("x", [unsafe_html("<b>bold</b>")]);
        assert_eq!(node.validate(), Err(MarkupError::RawMarkupOnText));
    }

    #[test]
    fn test_raw_markup_with_children_faults() {
        let node = Node::element("div", [unsafe_html("<i>x</i>"), Node::text("child").into()]);
        assert!(matches!(node.validate(), Err(MarkupError::RawMarkupWithChildren { .. })));
    }

    #[test]
    fn test_absent_child_preserved() {
        let node = Node::element("ul", [None::<Node>.into(), Node::text("a").into()]);
        assert_eq!(node.children().len(), 2);
        assert!(matches!(node.children()[0], Child::Absent));
    }

    #[test]
    fn test_text_accepts_key_only() {
        let keyed = Node::text_with("a", [key(1)]);
        assert_eq!(keyed.key(), Some(&Key::Int(1)));
        assert!(keyed.validate().is_ok());

        let styled = Node::text_with("a", [style("color", "red")]);
        assert!(matches!(styled.validate(), Err(MarkupError::UnsupportedOnText { kind: "style" })));
    }

    #[test]
    fn test_check_keys() {
        let keyed = vec![
            Child::from(Node::text_with("a", [key(1)])),
            Child::Absent,
            Child::from(Node::text_with("b", [key(2)])),
        ];
        assert!(check_keys(&keyed).unwrap());

        let plain = vec![Child::from("a"), Child::from("b")];
        assert!(!check_keys(&plain).unwrap());

        let mixed = vec![Child::from(Node::text_with("a", [key(1)])), Child::from("b")];
        assert!(matches!(check_keys(&mixed), Err(RenderError::MixedKeys)));

        let dup = vec![
            Child::from(Node::text_with("a", [key("x")])),
            Child::from(Node::text_with("b", [key("x")])),
        ];
        assert!(matches!(check_keys(&dup), Err(RenderError::DuplicateKey(Key::Str(_)))));
    }
}
