//! Document - High-level document API
//!
//! Owns the arena tree and logs every mutation made through it.

use crate::{
    DispatchOutcome, DomError, DomResult, DomTree, ElementData, Event, Listener, ListenerId,
    MutationRecord, NodeData, NodeId, PropertyValue,
};

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    tree: DomTree,
    /// Document node
    root: NodeId,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <head> element
    head_element: NodeId,
    /// Mutation log, oldest first
    records: Vec<MutationRecord>,
}

impl Document {
    /// Create a document with an `<html><head></head><body></body></html>` skeleton
    pub fn new() -> DomResult<Self> {
        let mut tree = DomTree::new();

        let root = tree.create_document();
        let html = tree.create_element("html", None);
        let head = tree.create_element("head", None);
        let body = tree.create_element("body", None);

        tree.append_child(root, html)?;
        tree.append_child(html, head)?;
        tree.append_child(html, body)?;

        Ok(Self {
            tree,
            root,
            html_element: html,
            head_element: head,
            records: Vec::new(),
        })
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Document node
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <head> element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Current <body> element; follows replacements of the body node
    pub fn body(&self) -> Option<NodeId> {
        self.tree
            .children(self.html_element)
            .find(|&id| self.tag_name(id) == Some("body"))
    }

    /// Drain the mutation log
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    /// Mutations recorded since the last drain
    pub fn records(&self) -> &[MutationRecord] {
        &self.records
    }

    fn record(&mut self, record: MutationRecord) {
        self.records.push(record);
    }

    fn element_mut(&mut self, node: NodeId) -> DomResult<&mut ElementData> {
        self.tree
            .get_mut(node)
            .ok_or(DomError::NotFound(node))?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType(node))
    }

    /// Element payload of a node
    pub fn element(&self, node: NodeId) -> Option<&ElementData> {
        self.tree.get(node)?.as_element()
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.tag.as_str())
    }

    /// Text content of a text node
    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.tree.get(node)?.as_text()
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    pub fn create_element(&mut self, tag: &str, namespace: Option<&str>) -> NodeId {
        let node = self.tree.create_element(tag, namespace);
        self.record(MutationRecord::CreateElement {
            node,
            tag: tag.to_string(),
        });
        node
    }

    pub fn create_text(&mut self, content: &str) -> NodeId {
        let node = self.tree.create_text(content);
        self.record(MutationRecord::CreateText { node });
        node
    }

    /// Replace the content of a text node
    pub fn set_text(&mut self, node: NodeId, content: &str) -> DomResult<()> {
        let slot = self.tree.get_mut(node).ok_or(DomError::NotFound(node))?;
        let NodeData::Text(text) = &mut slot.data else {
            return Err(DomError::InvalidNodeType(node));
        };
        let old_text = std::mem::replace(text, content.to_string());
        self.record(MutationRecord::SetText {
            node,
            old_text,
            new_text: content.to_string(),
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Properties and attributes
    // ------------------------------------------------------------------

    pub fn property(&self, node: NodeId, name: &str) -> Option<PropertyValue> {
        self.element(node)?.properties.get(name).cloned()
    }

    pub fn set_property(
        &mut self,
        node: NodeId,
        name: &str,
        value: PropertyValue,
    ) -> DomResult<()> {
        self.element_mut(node)?.properties.insert(name.to_string(), value);
        self.record(MutationRecord::SetProperty {
            node,
            name: name.to_string(),
        });
        Ok(())
    }

    pub fn delete_property(&mut self, node: NodeId, name: &str) -> DomResult<()> {
        self.element_mut(node)?.properties.remove(name);
        self.record(MutationRecord::DeleteProperty {
            node,
            name: name.to_string(),
        });
        Ok(())
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()> {
        let old_value = self
            .element_mut(node)?
            .attributes
            .insert(name.to_string(), value.to_string());
        self.record(MutationRecord::SetAttribute {
            node,
            name: name.to_string(),
            old_value,
        });
        Ok(())
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> DomResult<()> {
        self.element_mut(node)?.attributes.remove(name);
        self.record(MutationRecord::RemoveAttribute {
            node,
            name: name.to_string(),
        });
        Ok(())
    }

    pub fn has_class(&self, node: NodeId, name: &str) -> bool {
        self.element(node).is_some_and(|e| e.class_list.contains(name))
    }

    pub fn add_class(&mut self, node: NodeId, name: &str) -> DomResult<()> {
        self.element_mut(node)?.class_list.add(name);
        self.record(MutationRecord::AddClass {
            node,
            name: name.to_string(),
        });
        Ok(())
    }

    pub fn remove_class(&mut self, node: NodeId, name: &str) -> DomResult<()> {
        self.element_mut(node)?.class_list.remove(name);
        self.record(MutationRecord::RemoveClass {
            node,
            name: name.to_string(),
        });
        Ok(())
    }

    pub fn set_data(&mut self, node: NodeId, key: &str, value: &str) -> DomResult<()> {
        self.element_mut(node)?.dataset.set(key, value);
        self.record(MutationRecord::SetData {
            node,
            key: key.to_string(),
        });
        Ok(())
    }

    pub fn remove_data(&mut self, node: NodeId, key: &str) -> DomResult<()> {
        self.element_mut(node)?.dataset.delete(key);
        self.record(MutationRecord::RemoveData {
            node,
            key: key.to_string(),
        });
        Ok(())
    }

    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> DomResult<()> {
        self.element_mut(node)?.style.set_property(property, value);
        self.record(MutationRecord::SetStyle {
            node,
            property: property.to_string(),
        });
        Ok(())
    }

    pub fn remove_style(&mut self, node: NodeId, property: &str) -> DomResult<()> {
        self.element_mut(node)?.style.remove_property(property);
        self.record(MutationRecord::RemoveStyle {
            node,
            property: property.to_string(),
        });
        Ok(())
    }

    /// Assign raw markup; existing children are detached, an empty string clears it
    pub fn set_inner_html(&mut self, node: NodeId, html: &str) -> DomResult<()> {
        let children: Vec<NodeId> = self.tree.children(node).collect();
        for child in children {
            self.tree.remove_child(node, child)?;
        }
        self.element_mut(node)?.inner_html = (!html.is_empty()).then(|| html.to_string());
        self.record(MutationRecord::SetInnerHtml { node });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    pub fn add_event_listener(&mut self, node: NodeId, listener: Listener) -> DomResult<()> {
        let event_type = listener.event_type.clone();
        self.element_mut(node)?.listeners.push(listener);
        self.record(MutationRecord::AddListener { node, event_type });
        Ok(())
    }

    pub fn remove_event_listener(&mut self, node: NodeId, id: ListenerId) -> DomResult<()> {
        let listeners = &mut self.element_mut(node)?.listeners;
        let Some(pos) = listeners.iter().position(|l| l.id == id) else {
            return Ok(());
        };
        let removed = listeners.remove(pos);
        self.record(MutationRecord::RemoveListener {
            node,
            event_type: removed.event_type,
        });
        Ok(())
    }

    /// Dispatch a bubbling event at `target`
    pub fn dispatch_event(&self, target: NodeId, event_type: &str) -> DispatchOutcome {
        let mut event = Event::new(event_type, target);
        let mut outcome = DispatchOutcome::default();
        let mut current = Some(target);

        while let Some(node) = current {
            event.current_target = node;
            let listeners: Vec<Listener> = self
                .element(node)
                .map(|e| e.listeners_for(event_type).cloned().collect())
                .unwrap_or_default();

            for listener in listeners {
                if listener.prevent_default {
                    event.prevent_default();
                }
                if listener.stop_propagation {
                    event.stop_propagation();
                }
                (listener.callback)(&event);
                outcome.invoked += 1;
            }

            if event.is_propagation_stopped() {
                break;
            }
            current = self.tree.parent(node);
        }

        outcome.default_prevented = event.is_default_prevented();
        tracing::trace!("Dispatched {} at {}: {} listeners", event_type, target, outcome.invoked);
        outcome
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.tree.append_child(parent, child)?;
        self.record(MutationRecord::Append { parent, child });
        Ok(())
    }

    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: Option<NodeId>,
    ) -> DomResult<()> {
        let Some(before) = before else {
            return self.append_child(parent, child);
        };
        self.tree.insert_before(parent, child, Some(before))?;
        self.record(MutationRecord::Insert {
            parent,
            child,
            before,
        });
        Ok(())
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.tree.remove_child(parent, child)?;
        self.record(MutationRecord::Remove { parent, child });
        Ok(())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.parent(node)
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.tree.first_child(node)
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.tree.next_sibling(node)
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree.children(node).collect()
    }

    /// Concatenated text of a subtree
    pub fn text_content(&self, node: NodeId) -> String {
        self.tree.text_content(node)
    }

    // ------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------

    /// Serialize a subtree as markup
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_node(node, &mut out);
        out
    }

    fn write_node(&self, node: NodeId, out: &mut String) {
        let Some(slot) = self.tree.get(node) else {
            return;
        };
        match &slot.data {
            NodeData::Document => {
                for child in self.tree.children(node) {
                    self.write_node(child, out);
                }
            }
            NodeData::Text(text) => out.push_str(&escape(text)),
            NodeData::Element(elem) => {
                out.push('<');
                out.push_str(&elem.tag);
                for (name, value) in &elem.attributes {
                    push_attr(out, name, value);
                }
                if !elem.class_list.is_empty() {
                    push_attr(out, "class", &elem.class_list.value());
                }
                for (name, value) in elem.dataset.to_attributes() {
                    push_attr(out, &name, &value);
                }
                if !elem.style.is_empty() {
                    push_attr(out, "style", &elem.style.css_text());
                }
                out.push('>');
                match &elem.inner_html {
                    Some(html) => out.push_str(html),
                    None => {
                        for child in self.tree.children(node) {
                            self.write_node(child, out);
                        }
                    }
                }
                out.push_str("</");
                out.push_str(&elem.tag);
                out.push('>');
            }
        }
    }
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape(value).replace('"', "&quot;"));
    out.push('"');
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MutationType;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn listener(event_type: &str, log: &Rc<RefCell<Vec<String>>>, tag: &str) -> Listener {
        let log = log.clone();
        let tag = tag.to_string();
        Listener {
            id: ListenerId::next(),
            event_type: event_type.to_string(),
            callback: Rc::new(move |e: &Event| {
                log.borrow_mut().push(format!("{tag}@{}", e.current_target))
            }),
            prevent_default: false,
            stop_propagation: false,
        }
    }

    #[test]
    fn test_skeleton() {
        let doc = Document::new().unwrap();
        let body = doc.body().unwrap();
        assert_eq!(doc.tag_name(body), Some("body"));
        assert_eq!(doc.parent(body), Some(doc.document_element()));
        assert!(doc.records().is_empty());
    }

    #[test]
    fn test_body_follows_replacement() {
        let mut doc = Document::new().unwrap();
        let old_body = doc.body().unwrap();
        let new_body = doc.create_element("body", None);
        let html = doc.document_element();

        doc.insert_before(html, new_body, Some(old_body)).unwrap();
        doc.remove_child(html, old_body).unwrap();

        assert_eq!(doc.body(), Some(new_body));
    }

    #[test]
    fn test_records_and_serialization() {
        let mut doc = Document::new().unwrap();
        let body = doc.body().unwrap();
        let div = doc.create_element("div", None);
        doc.set_attribute(div, "id", "main").unwrap();
        doc.add_class(div, "card").unwrap();
        doc.set_data(div, "userId", "7").unwrap();
        doc.set_style(div, "color", "red").unwrap();
        let text = doc.create_text("a < b");
        doc.append_child(div, text).unwrap();
        doc.append_child(body, div).unwrap();

        assert_eq!(
            doc.outer_html(div),
            r#"<div id="main" class="card" data-user-id="7" style="color: red;">a &lt; b</div>"#
        );

        let records = doc.take_records();
        assert_eq!(records.len(), 8);
        assert_eq!(
            records.iter().filter(|r| r.mutation_type() == MutationType::ChildList).count(),
            2
        );
        assert!(doc.records().is_empty());
    }

    #[test]
    fn test_set_text_on_element_fails() {
        let mut doc = Document::new().unwrap();
        let div = doc.create_element("div", None);
        assert_eq!(doc.set_text(div, "x"), Err(DomError::InvalidNodeType(div)));

        let text = doc.create_text("x");
        assert!(doc.set_property(text, "value", "y".into()).is_err());
    }

    #[test]
    fn test_inner_html_detaches_children() {
        let mut doc = Document::new().unwrap();
        let div = doc.create_element("div", None);
        let child = doc.create_text("old");
        doc.append_child(div, child).unwrap();

        doc.set_inner_html(div, "<b>raw</b>").unwrap();
        assert_eq!(doc.parent(child), None);
        assert_eq!(doc.outer_html(div), "<div><b>raw</b></div>");

        doc.set_inner_html(div, "").unwrap();
        assert_eq!(doc.outer_html(div), "<div></div>");
    }

    #[test]
    fn test_dispatch_bubbles() {
        let mut doc = Document::new().unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        let outer = doc.create_element("div", None);
        let inner = doc.create_element("button", None);
        doc.append_child(outer, inner).unwrap();
        doc.add_event_listener(outer, listener("click", &log, "outer")).unwrap();
        doc.add_event_listener(inner, listener("click", &log, "inner")).unwrap();
        doc.add_event_listener(inner, listener("input", &log, "ignored")).unwrap();

        let outcome = doc.dispatch_event(inner, "click");
        assert_eq!(outcome.invoked, 2);
        assert!(!outcome.default_prevented);
        assert_eq!(*log.borrow(), vec![format!("inner@{inner}"), format!("outer@{outer}")]);
    }

    #[test]
    fn test_dispatch_flags() {
        let mut doc = Document::new().unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        let outer = doc.create_element("form", None);
        let inner = doc.create_element("button", None);
        doc.append_child(outer, inner).unwrap();
        doc.add_event_listener(outer, listener("submit", &log, "outer")).unwrap();

        let mut stopping = listener("submit", &log, "inner");
        stopping.prevent_default = true;
        stopping.stop_propagation = true;
        let id = stopping.id;
        doc.add_event_listener(inner, stopping).unwrap();

        let outcome = doc.dispatch_event(inner, "submit");
        assert!(outcome.default_prevented);
        assert_eq!(outcome.invoked, 1);

        doc.remove_event_listener(inner, id).unwrap();
        let outcome = doc.dispatch_event(inner, "submit");
        assert_eq!(outcome.invoked, 1);
        assert!(!outcome.default_prevented);
    }
}
