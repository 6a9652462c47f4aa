//! Event listeners
//!
//! Listener descriptors attached to nodes, plus constructors for the
//! common event names.

use std::fmt;
use std::rc::Rc;

use fos_dom::{Event, EventCallback, ListenerId};

/// Event listener descriptor
///
/// A listener is bound to at most one host node at a time; its id is what
/// the host uses to unbind it again.
#[derive(Clone)]
pub struct EventListener {
    id: ListenerId,
    name: String,
    callback: EventCallback,
    prevent_default: bool,
    stop_propagation: bool,
}

impl EventListener {
    pub fn new(name: impl Into<String>, callback: impl Fn(&Event) + 'static) -> Self {
        Self {
            id: ListenerId::next(),
            name: name.into(),
            callback: Rc::new(callback),
            prevent_default: false,
            stop_propagation: false,
        }
    }

    /// Suppress the default action before the callback runs
    pub fn prevent_default(mut self) -> Self {
        self.prevent_default = true;
        self
    }

    /// Stop propagation before the callback runs
    pub fn stop_propagation(mut self) -> Self {
        self.stop_propagation = true;
        self
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn callback(&self) -> &EventCallback {
        &self.callback
    }

    pub fn prevents_default(&self) -> bool {
        self.prevent_default
    }

    pub fn stops_propagation(&self) -> bool {
        self.stop_propagation
    }
}

impl fmt::Debug for EventListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListener")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("prevent_default", &self.prevent_default)
            .field("stop_propagation", &self.stop_propagation)
            .finish_non_exhaustive()
    }
}

pub fn click(callback: impl Fn(&Event) + 'static) -> EventListener {
    EventListener::new("click", callback)
}

pub fn double_click(callback: impl Fn(&Event) + 'static) -> EventListener {
    EventListener::new("dblclick", callback)
}

pub fn input(callback: impl Fn(&Event) + 'static) -> EventListener {
    EventListener::new("input", callback)
}

pub fn change(callback: impl Fn(&Event) + 'static) -> EventListener {
    EventListener::new("change", callback)
}

pub fn submit(callback: impl Fn(&Event) + 'static) -> EventListener {
    EventListener::new("submit", callback)
}

pub fn key_down(callback: impl Fn(&Event) + 'static) -> EventListener {
    EventListener::new("keydown", callback)
}

pub fn blur(callback: impl Fn(&Event) + 'static) -> EventListener {
    EventListener::new("blur", callback)
}
