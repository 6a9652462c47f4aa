//! Reconciler
//!
//! Diffs a freshly rendered [`Node`] tree against the previous one and
//! applies the difference to the host tree.
//!
//! Children are placed with a running insert-before anchor: the host node
//! that should directly follow the last placed child. A child already
//! sitting at the anchor costs no host operation, anything else is moved
//! (or inserted) before it. Keyed siblings are matched by key, unkeyed
//! siblings by index.
//!
//! Components taken out of the tree are retired only when the pass ends, so
//! an instance the parent keeps and renders elsewhere in the same pass stays
//! mounted.

use std::collections::{HashMap, HashSet};

use fos_dom::NodeId;
use tracing::trace;

use crate::component::{host_node, identity};
use crate::lifecycle::collect_components;
use crate::node::check_keys;
use crate::{
    Child, ComponentRef, Config, EventListener, Host, Key, KeyedList, List, Node, NodeKind,
    Rendered, Result, Scheduler,
};

/// Components that produced output during a pass and still await their
/// mount notification, children before parents
pub type Mounts = Vec<ComponentRef>;

/// One reconciliation session against a host tree
pub struct Reconciler<'a, H: Host + ?Sized> {
    pub(crate) host: &'a mut H,
    pub(crate) config: &'a Config,
    pub(crate) scheduler: Option<Scheduler>,
    /// Components rendered or kept during this pass
    pub(crate) live: HashSet<usize>,
    /// Components released during this pass, deepest first
    pub(crate) retiring: Vec<ComponentRef>,
}

impl<'a, H: Host + ?Sized> Reconciler<'a, H> {
    pub fn new(host: &'a mut H, config: &'a Config) -> Self {
        Self {
            host,
            config,
            scheduler: None,
            live: HashSet::new(),
            retiring: Vec::new(),
        }
    }

    /// Scheduler handed to components rendered in this session
    pub fn with_scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn host(&self) -> &H {
        self.host
    }

    /// Bring the host tree in line with `next`, given the previously
    /// reconciled `prev`. When `next` ends up on a different host node, it
    /// takes `prev`'s place in the tree.
    pub fn reconcile(&mut self, next: &mut Node, prev: Option<Node>) -> Result<Mounts> {
        let old = prev.as_ref().and_then(Node::handle);
        let mut mounts = Vec::new();
        let mut displaced = Vec::new();

        self.reconcile_node(next, prev, &mut displaced, &mut mounts)?;
        if let (Some(old), Some(new)) = (old, next.handle()) {
            self.replace(old, new)?;
        }
        for child in displaced {
            self.release(child, &mut None)?;
        }
        self.retire_pending();
        Ok(mounts)
    }

    /// Put `new` where `old` sits, leaving `old` for the caller to release
    pub(crate) fn replace(&mut self, old: NodeId, new: NodeId) -> Result<()> {
        if old == new {
            return Ok(());
        }
        if let Some(parent) = self.host.parent_node(old) {
            self.host.insert_before(parent, new, Some(old))?;
            trace!("Replaced {} with {}", old, new);
        }
        Ok(())
    }

    pub(crate) fn reconcile_node(
        &mut self,
        next: &mut Node,
        prev: Option<Node>,
        displaced: &mut Vec<Child>,
        mounts: &mut Mounts,
    ) -> Result<()> {
        next.validate()?;

        let reused = match prev {
            Some(prev) => match prev.handle() {
                Some(handle) if prev.is_compatible(next) => Some((handle, prev)),
                _ => {
                    displaced.push(Child::Node(prev));
                    None
                }
            },
            None => None,
        };

        let (handle, prev) = match reused {
            Some((handle, prev)) => (handle, Some(prev)),
            None => (self.create(next), None),
        };
        next.handle = Some(handle);

        if let NodeKind::Text(text) = next.kind() {
            let changed = prev.as_ref().is_some_and(|p| p.text_content() != Some(text.as_str()));
            if changed {
                self.host.set_text(handle, text)?;
            }
            return Ok(());
        }

        self.update_element(handle, next, prev.as_ref())?;

        let prev_html = prev.as_ref().and_then(|p| p.inner_html().map(str::to_string));
        if prev_html.is_some() && next.inner_html().is_none() {
            self.host.set_inner_html(handle, "")?;
        }

        let prev_children = prev.map(|p| p.children).unwrap_or_default();
        self.reconcile_children(handle, &mut next.children, prev_children, mounts)?;

        if let Some(html) = next.inner_html() {
            if prev_html.as_deref() != Some(html) {
                self.host.set_inner_html(handle, html)?;
            }
        }
        Ok(())
    }

    fn create(&mut self, node: &Node) -> NodeId {
        let handle = match node.kind() {
            NodeKind::Element { tag, namespace } => {
                self.host.create_element(tag, namespace.as_deref())
            }
            NodeKind::Text(text) => self.host.create_text(text),
        };
        trace!("Created {} for {:?}", handle, node.kind());
        handle
    }

    /// Diff every attribute category of an element. With no previous node
    /// everything in `next` is written.
    fn update_element(&mut self, handle: NodeId, next: &Node, prev: Option<&Node>) -> Result<()> {
        if let Some(prev) = prev {
            for name in prev.properties.keys() {
                if !next.properties.contains_key(name) {
                    self.host.delete_property(handle, name)?;
                }
            }
            for name in prev.attributes.keys() {
                if !next.attributes.contains_key(name) {
                    self.host.remove_attribute(handle, name)?;
                }
            }
            for name in prev.classes.difference(&next.classes) {
                self.host.remove_class(handle, name)?;
            }
            for name in prev.dataset.keys() {
                if !next.dataset.contains_key(name) {
                    self.host.remove_data(handle, name)?;
                }
            }
            for name in prev.styles.keys() {
                if !next.styles.contains_key(name) {
                    self.host.remove_style(handle, name)?;
                }
            }
            for listener in &prev.listeners {
                if !contains_listener(&next.listeners, listener) {
                    self.host.remove_event_listener(handle, listener)?;
                }
            }
        }

        for (name, value) in &next.properties {
            let current = if self.config.is_live_property(name) {
                self.host.property(handle, name)
            } else {
                prev.and_then(|p| p.properties.get(name)).cloned()
            };
            if current.as_ref() != Some(value) {
                self.host.set_property(handle, name, value)?;
            }
        }
        for (name, value) in &next.attributes {
            if prev.and_then(|p| p.attributes.get(name)) != Some(value) {
                self.host.set_attribute(handle, name, value)?;
            }
        }
        for name in &next.classes {
            if !prev.is_some_and(|p| p.classes.contains(name)) {
                self.host.add_class(handle, name)?;
            }
        }
        for (name, value) in &next.dataset {
            if prev.and_then(|p| p.dataset.get(name)) != Some(value) {
                self.host.set_data(handle, name, value)?;
            }
        }
        for (name, value) in &next.styles {
            if prev.and_then(|p| p.styles.get(name)) != Some(value) {
                self.host.set_style(handle, name, value)?;
            }
        }
        for listener in &next.listeners {
            if !prev.is_some_and(|p| contains_listener(&p.listeners, listener)) {
                self.host.add_event_listener(handle, listener)?;
            }
        }
        Ok(())
    }

    fn reconcile_children(
        &mut self,
        parent: NodeId,
        next: &mut [Child],
        prev: Vec<Child>,
        mounts: &mut Mounts,
    ) -> Result<()> {
        let mut anchor = self.host.first_child(parent);
        self.reconcile_region(parent, next, prev, &mut anchor, mounts)
    }

    /// Reconcile one run of siblings starting at `anchor`, leaving `anchor`
    /// just past the last placed child
    fn reconcile_region(
        &mut self,
        parent: NodeId,
        next: &mut [Child],
        prev: Vec<Child>,
        anchor: &mut Option<NodeId>,
        mounts: &mut Mounts,
    ) -> Result<()> {
        let keyed = check_keys(next)?;
        let mut previous = Previous::new(prev, keyed);

        for (index, child) in next.iter_mut().enumerate() {
            let prev_child = previous.take(index, child);

            match child {
                Child::Absent => {
                    if let Some(prev_child) = prev_child {
                        self.release(prev_child, anchor)?;
                    }
                }
                Child::List(List(children)) | Child::KeyedList(KeyedList { children, .. }) => {
                    let prev_children = match prev_child {
                        Some(Child::List(List(children)))
                        | Some(Child::KeyedList(KeyedList { children, .. })) => children,
                        Some(other) => {
                            self.release(other, anchor)?;
                            Vec::new()
                        }
                        None => Vec::new(),
                    };
                    self.reconcile_region(parent, children, prev_children, anchor, mounts)?;
                }
                Child::Node(node) => {
                    let mut displaced = Vec::new();
                    let prev_node = match prev_child {
                        Some(Child::Node(prev)) => Some(prev),
                        Some(Child::Component(prev)) => detach_node(prev, &mut displaced),
                        Some(other) => {
                            displaced.push(other);
                            None
                        }
                        None => None,
                    };
                    self.reconcile_node(node, prev_node, &mut displaced, mounts)?;
                    self.settle(parent, node.handle(), displaced, anchor)?;
                }
                Child::Component(component) => {
                    let mut displaced = Vec::new();
                    let render = self.render_component(component, prev_child, &mut displaced)?;
                    mounts.extend(render.mounts);
                    self.settle(parent, host_node(component), displaced, anchor)?;
                }
            }
        }

        for leftover in previous.into_leftovers() {
            self.release(leftover, anchor)?;
        }
        Ok(())
    }

    /// Place a reconciled child at the anchor, drop what it displaced and
    /// advance the anchor past it
    fn settle(
        &mut self,
        parent: NodeId,
        handle: Option<NodeId>,
        displaced: Vec<Child>,
        anchor: &mut Option<NodeId>,
    ) -> Result<()> {
        if let Some(handle) = handle {
            if *anchor != Some(handle) {
                self.host.insert_before(parent, handle, *anchor)?;
                trace!("Placed {} before {:?}", handle, anchor);
            }
        }
        for child in displaced {
            self.release(child, anchor)?;
        }
        if let Some(handle) = handle {
            *anchor = self.host.next_sibling(handle);
        }
        Ok(())
    }

    /// Detach a host node from its parent, if it has one
    pub(crate) fn release_node(&mut self, node: NodeId) -> Result<()> {
        if let Some(parent) = self.host.parent_node(node) {
            self.host.remove_child(parent, node)?;
            trace!("Removed {} from {}", node, parent);
        }
        Ok(())
    }

    /// Take a previous child's host nodes out of the tree and queue its
    /// components for retirement. Components already rendered in this pass
    /// have moved on and are left alone.
    pub(crate) fn release(&mut self, child: Child, anchor: &mut Option<NodeId>) -> Result<()> {
        collect_components(&child, &self.live, &mut self.retiring);

        let mut roots = Vec::new();
        collect_roots(&child, &self.live, &mut roots);
        for node in roots {
            if *anchor == Some(node) {
                *anchor = self.host.next_sibling(node);
            }
            self.release_node(node)?;
        }
        Ok(())
    }
}

/// Previous siblings awaiting a match
struct Previous {
    slots: Vec<Option<Child>>,
    keyed: Option<HashMap<Key, usize>>,
}

impl Previous {
    fn new(prev: Vec<Child>, by_key: bool) -> Self {
        let keyed = by_key.then(|| {
            prev.iter()
                .enumerate()
                .filter_map(|(index, child)| child.key().map(|key| (key, index)))
                .collect()
        });
        Self {
            slots: prev.into_iter().map(Some).collect(),
            keyed,
        }
    }

    fn take(&mut self, index: usize, next: &Child) -> Option<Child> {
        match &mut self.keyed {
            Some(keyed) => {
                let slot = keyed.remove(&next.key()?)?;
                self.slots[slot].take()
            }
            None => self.slots.get_mut(index)?.take(),
        }
    }

    fn into_leftovers(self) -> impl Iterator<Item = Child> {
        self.slots.into_iter().flatten()
    }
}

fn contains_listener(listeners: &[EventListener], listener: &EventListener) -> bool {
    listeners.iter().any(|l| l.id() == listener.id())
}

/// Take the output of a component that is being replaced so it can be
/// diffed against its successor. The component itself (and any component
/// it rendered directly) is queued for release.
pub(crate) fn detach_node(component: ComponentRef, displaced: &mut Vec<Child>) -> Option<Node> {
    let rendered = component.borrow_mut().context_mut().rendered.take();
    let node = match rendered {
        Some(Rendered::Node(node)) => Some(node),
        Some(Rendered::Component(inner)) => detach_node(inner, displaced),
        None => None,
    };
    displaced.push(Child::Component(component));
    node
}

/// Top-level host nodes occupied by a child, skipping live components
fn collect_roots(child: &Child, live: &HashSet<usize>, roots: &mut Vec<NodeId>) {
    match child {
        Child::Node(node) => roots.extend(node.handle()),
        Child::Component(component) => {
            if !live.contains(&identity(component)) {
                roots.extend(host_node(component));
            }
        }
        Child::List(List(children)) | Child::KeyedList(KeyedList { children, .. }) => {
            children.iter().for_each(|c| collect_roots(c, live, roots));
        }
        Child::Absent => {}
    }
}
