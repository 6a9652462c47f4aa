//! Element constructors
//!
//! Shorthands for `Node::element` with common tag names.

use crate::{Markup, Node};

pub fn body(markup: impl IntoIterator<Item = Markup>) -> Node {
    Node::element("body", markup)
}

pub fn div(markup: impl IntoIterator<Item = Markup>) -> Node {
    Node::element("div", markup)
}

pub fn span(markup: impl IntoIterator<Item = Markup>) -> Node {
    Node::element("span", markup)
}

pub fn paragraph(markup: impl IntoIterator<Item = Markup>) -> Node {
    Node::element("p", markup)
}

/// `<h1>` through `<h6>`; out-of-range levels are clamped
pub fn heading(level: u8, markup: impl IntoIterator<Item = Markup>) -> Node {
    Node::element(format!("h{}", level.clamp(1, 6)), markup)
}

pub fn anchor(markup: impl IntoIterator<Item = Markup>) -> Node {
    Node::element("a", markup)
}

pub fn button(markup: impl IntoIterator<Item = Markup>) -> Node {
    Node::element("button", markup)
}

pub fn input(markup: impl IntoIterator<Item = Markup>) -> Node {
    Node::element("input", markup)
}

pub fn form(markup: impl IntoIterator<Item = Markup>) -> Node {
    Node::element("form", markup)
}

pub fn unordered_list(markup: impl IntoIterator<Item = Markup>) -> Node {
    Node::element("ul", markup)
}

pub fn list_item(markup: impl IntoIterator<Item = Markup>) -> Node {
    Node::element("li", markup)
}

pub fn text(content: impl Into<String>) -> Node {
    Node::text(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_levels() {
        assert_eq!(heading(0, []).tag(), Some("h1"));
        assert_eq!(heading(3, []).tag(), Some("h3"));
        assert_eq!(heading(9, []).tag(), Some("h6"));
    }

    #[test]
    fn test_shorthands() {
        let list = unordered_list([list_item([text("a").into()]).into()]);
        assert_eq!(list.tag(), Some("ul"));
        assert_eq!(list.children().len(), 1);
        assert_eq!(anchor([]).tag(), Some("a"));
    }
}
