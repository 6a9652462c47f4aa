//! Host tree capabilities
//!
//! The reconciler only touches the live tree through [`Host`], and the
//! scheduler only reaches the display loop through [`FrameRequester`].

use fos_dom::{AnimationFrameQueue, Document, DomResult, Listener, NodeId, PropertyValue};

use crate::EventListener;

/// Mutable live document tree
pub trait Host {
    fn create_element(&mut self, tag: &str, namespace: Option<&str>) -> NodeId;
    fn create_text(&mut self, content: &str) -> NodeId;
    fn set_text(&mut self, node: NodeId, content: &str) -> DomResult<()>;

    /// Current live value of a property
    fn property(&self, node: NodeId, name: &str) -> Option<PropertyValue>;
    fn set_property(&mut self, node: NodeId, name: &str, value: &PropertyValue) -> DomResult<()>;
    fn delete_property(&mut self, node: NodeId, name: &str) -> DomResult<()>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()>;
    fn remove_attribute(&mut self, node: NodeId, name: &str) -> DomResult<()>;
    fn add_class(&mut self, node: NodeId, name: &str) -> DomResult<()>;
    fn remove_class(&mut self, node: NodeId, name: &str) -> DomResult<()>;
    fn set_data(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()>;
    fn remove_data(&mut self, node: NodeId, name: &str) -> DomResult<()>;
    fn set_style(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()>;
    fn remove_style(&mut self, node: NodeId, name: &str) -> DomResult<()>;
    fn set_inner_html(&mut self, node: NodeId, html: &str) -> DomResult<()>;

    fn add_event_listener(&mut self, node: NodeId, listener: &EventListener) -> DomResult<()>;
    fn remove_event_listener(&mut self, node: NodeId, listener: &EventListener) -> DomResult<()>;

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()>;
    /// Insert `child` before `before`, or append when `before` is `None`
    fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: Option<NodeId>,
    ) -> DomResult<()>;
    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()>;

    fn parent_node(&self, node: NodeId) -> Option<NodeId>;
    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;
    fn first_child(&self, node: NodeId) -> Option<NodeId>;
    fn tag_name(&self, node: NodeId) -> Option<String>;

    /// The document body, if any
    fn body(&self) -> Option<NodeId>;
}

/// Once-per-frame callback facility
pub trait FrameRequester {
    /// Run `callback` once before the next visual update, passing a
    /// monotonic timestamp in milliseconds
    fn request_animation_frame(&self, callback: Box<dyn FnOnce(f64)>);
}

impl FrameRequester for AnimationFrameQueue {
    fn request_animation_frame(&self, callback: Box<dyn FnOnce(f64)>) {
        AnimationFrameQueue::request_animation_frame(self, callback);
    }
}

impl Host for Document {
    fn create_element(&mut self, tag: &str, namespace: Option<&str>) -> NodeId {
        Document::create_element(self, tag, namespace)
    }

    fn create_text(&mut self, content: &str) -> NodeId {
        Document::create_text(self, content)
    }

    fn set_text(&mut self, node: NodeId, content: &str) -> DomResult<()> {
        Document::set_text(self, node, content)
    }

    fn property(&self, node: NodeId, name: &str) -> Option<PropertyValue> {
        Document::property(self, node, name)
    }

    fn set_property(&mut self, node: NodeId, name: &str, value: &PropertyValue) -> DomResult<()> {
        Document::set_property(self, node, name, value.clone())
    }

    fn delete_property(&mut self, node: NodeId, name: &str) -> DomResult<()> {
        Document::delete_property(self, node, name)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()> {
        Document::set_attribute(self, node, name, value)
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> DomResult<()> {
        Document::remove_attribute(self, node, name)
    }

    fn add_class(&mut self, node: NodeId, name: &str) -> DomResult<()> {
        Document::add_class(self, node, name)
    }

    fn remove_class(&mut self, node: NodeId, name: &str) -> DomResult<()> {
        Document::remove_class(self, node, name)
    }

    fn set_data(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()> {
        Document::set_data(self, node, name, value)
    }

    fn remove_data(&mut self, node: NodeId, name: &str) -> DomResult<()> {
        Document::remove_data(self, node, name)
    }

    fn set_style(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()> {
        Document::set_style(self, node, name, value)
    }

    fn remove_style(&mut self, node: NodeId, name: &str) -> DomResult<()> {
        Document::remove_style(self, node, name)
    }

    fn set_inner_html(&mut self, node: NodeId, html: &str) -> DomResult<()> {
        Document::set_inner_html(self, node, html)
    }

    fn add_event_listener(&mut self, node: NodeId, listener: &EventListener) -> DomResult<()> {
        let bound = Listener {
            id: listener.id(),
            event_type: listener.name().to_string(),
            callback: listener.callback().clone(),
            prevent_default: listener.prevents_default(),
            stop_propagation: listener.stops_propagation(),
        };
        Document::add_event_listener(self, node, bound)
    }

    fn remove_event_listener(&mut self, node: NodeId, listener: &EventListener) -> DomResult<()> {
        Document::remove_event_listener(self, node, listener.id())
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        Document::append_child(self, parent, child)
    }

    fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: Option<NodeId>,
    ) -> DomResult<()> {
        Document::insert_before(self, parent, child, before)
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        Document::remove_child(self, parent, child)
    }

    fn parent_node(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        Document::next_sibling(self, node)
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        Document::first_child(self, node)
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        Document::tag_name(self, node).map(str::to_string)
    }

    fn body(&self) -> Option<NodeId> {
        Document::body(self)
    }
}
