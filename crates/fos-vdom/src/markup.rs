//! Markup Application
//!
//! Declarative descriptors folded onto a [`Node`] at construction time.
//! Folding never fails: combinations a node cannot carry are recorded on
//! the node and reported when it is first reconciled.

use fos_dom::PropertyValue;

use crate::{Child, ComponentRef, EventListener, Key, KeyedList, List, MarkupError, Node};

/// A single markup descriptor
#[derive(Debug, Clone)]
pub enum Markup {
    Style(String, String),
    Property(String, PropertyValue),
    Attribute(String, String),
    Class(String),
    /// Class names toggled on or off
    ClassMap(Vec<(String, bool)>),
    Data(String, String),
    Listener(EventListener),
    Child(Child),
    Key(Key),
    UnsafeHtml(String),
    Namespace(String),
    Group(Vec<Markup>),
    Nothing,
}

impl Markup {
    fn kind(&self) -> &'static str {
        match self {
            Self::Style(..) => "style",
            Self::Property(..) => "property",
            Self::Attribute(..) => "attribute",
            Self::Class(_) | Self::ClassMap(_) => "class",
            Self::Data(..) => "dataset",
            Self::Listener(_) => "listener",
            Self::Child(_) => "child",
            Self::Key(_) => "key",
            Self::UnsafeHtml(_) => "raw markup",
            Self::Namespace(_) => "namespace",
            Self::Group(_) => "group",
            Self::Nothing => "nothing",
        }
    }

    /// Fold this descriptor onto `node`
    pub fn apply(self, node: &mut Node) {
        if node.is_text() {
            match self {
                Self::Key(key) => node.set_key(key),
                Self::UnsafeHtml(_) => node.record_fault(MarkupError::RawMarkupOnText),
                Self::Group(items) => items.into_iter().for_each(|m| m.apply(node)),
                Self::Nothing => {}
                other => node.record_fault(MarkupError::UnsupportedOnText { kind: other.kind() }),
            }
            return;
        }

        match self {
            Self::Style(name, value) => {
                node.styles.insert(name, value);
            }
            Self::Property(name, value) => {
                node.properties.insert(name, value);
            }
            Self::Attribute(name, value) => {
                node.attributes.insert(name, value);
            }
            Self::Class(name) => {
                node.classes.insert(name);
            }
            Self::ClassMap(entries) => {
                for (name, on) in entries {
                    if on {
                        node.classes.insert(name);
                    } else {
                        node.classes.remove(&name);
                    }
                }
            }
            Self::Data(name, value) => {
                node.dataset.insert(name, value);
            }
            Self::Listener(listener) => node.listeners.push(listener),
            Self::Child(child) => node.children.push(child),
            Self::Key(key) => node.set_key(key),
            Self::UnsafeHtml(html) => node.set_inner_html(html),
            Self::Namespace(ns) => node.set_namespace(ns),
            Self::Group(items) => items.into_iter().for_each(|m| m.apply(node)),
            Self::Nothing => {}
        }
    }
}

pub fn style(name: impl Into<String>, value: impl Into<String>) -> Markup {
    Markup::Style(name.into(), value.into())
}

/// Script-visible property, e.g. `value` or `checked`
pub fn prop(name: impl Into<String>, value: impl Into<PropertyValue>) -> Markup {
    Markup::Property(name.into(), value.into())
}

pub fn attr(name: impl Into<String>, value: impl Into<String>) -> Markup {
    Markup::Attribute(name.into(), value.into())
}

pub fn class(name: impl Into<String>) -> Markup {
    Markup::Class(name.into())
}

/// Toggle several classes at once
pub fn classes<S: Into<String>>(entries: impl IntoIterator<Item = (S, bool)>) -> Markup {
    Markup::ClassMap(entries.into_iter().map(|(name, on)| (name.into(), on)).collect())
}

pub fn data(name: impl Into<String>, value: impl Into<String>) -> Markup {
    Markup::Data(name.into(), value.into())
}

pub fn key(key: impl Into<Key>) -> Markup {
    Markup::Key(key.into())
}

pub fn namespace(ns: impl Into<String>) -> Markup {
    Markup::Namespace(ns.into())
}

/// Raw, unescaped inner markup; excludes children
pub fn unsafe_html(html: impl Into<String>) -> Markup {
    Markup::UnsafeHtml(html.into())
}

pub fn listener(listener: EventListener) -> Markup {
    Markup::Listener(listener)
}

/// `markup` when `condition` holds, nothing otherwise
pub fn markup_if(condition: bool, markup: impl Into<Markup>) -> Markup {
    if condition { markup.into() } else { Markup::Nothing }
}

pub fn group(items: impl IntoIterator<Item = Markup>) -> Markup {
    Markup::Group(items.into_iter().collect())
}

impl From<Child> for Markup {
    fn from(child: Child) -> Self {
        Self::Child(child)
    }
}

impl From<Node> for Markup {
    fn from(node: Node) -> Self {
        Self::Child(Child::Node(node))
    }
}

impl From<Option<Node>> for Markup {
    fn from(node: Option<Node>) -> Self {
        Self::Child(node.into())
    }
}

impl From<ComponentRef> for Markup {
    fn from(component: ComponentRef) -> Self {
        Self::Child(Child::Component(component))
    }
}

impl From<Option<ComponentRef>> for Markup {
    fn from(component: Option<ComponentRef>) -> Self {
        Self::Child(component.into())
    }
}

impl From<List> for Markup {
    fn from(list: List) -> Self {
        Self::Child(Child::List(list))
    }
}

impl From<KeyedList> for Markup {
    fn from(list: KeyedList) -> Self {
        Self::Child(Child::KeyedList(list))
    }
}

impl From<EventListener> for Markup {
    fn from(listener: EventListener) -> Self {
        Self::Listener(listener)
    }
}

impl From<&str> for Markup {
    fn from(text: &str) -> Self {
        Self::Child(Child::from(text))
    }
}

impl From<String> for Markup {
    fn from(text: String) -> Self {
        Self::Child(Child::from(text))
    }
}

impl From<Vec<Markup>> for Markup {
    fn from(items: Vec<Markup>) -> Self {
        Self::Group(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event;

    #[test]
    fn test_class_map_toggles() {
        let node = Node::element(
            "div",
            [class("a"), classes([("b", true), ("a", false)]), class("c")],
        );
        let names: Vec<&str> = node.classes().collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn test_group_and_conditional() {
        let active = false;
        let node = Node::element(
            "li",
            [
                group([attr("role", "option"), data("id", "7")]),
                markup_if(active, class("active")),
                markup_if(!active, attr("aria-selected", "false")),
            ],
        );
        assert_eq!(node.attribute("role"), Some("option"));
        assert_eq!(node.data("id"), Some("7"));
        assert_eq!(node.classes().count(), 0);
        assert_eq!(node.attribute("aria-selected"), Some("false"));
    }

    #[test]
    fn test_children_and_listeners_keep_order() {
        let node = Node::element(
            "ul",
            [
                Node::element("li", ["one".into()]).into(),
                event::click(|_| {}).into(),
                Node::element("li", ["two".into()]).into(),
                event::input(|_| {}).into(),
            ],
        );
        assert_eq!(node.children().len(), 2);
        let names: Vec<&str> = node.listeners().iter().map(EventListener::name).collect();
        assert_eq!(names, vec!["click", "input"]);
    }

    #[test]
    fn test_child_on_text_faults() {
        let node = Node::text_with("x", [Node::text("y").into()]);
        assert_eq!(node.validate(), Err(MarkupError::UnsupportedOnText { kind: "child" }));
    }

    #[test]
    fn test_first_fault_is_kept() {
        let node = Node::text_with("x", [unsafe_html("<b/>"), attr("id", "a")]);
        assert_eq!(node.validate(), Err(MarkupError::RawMarkupOnText));
    }
}
