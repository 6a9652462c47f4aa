//! Component Lifecycle
//!
//! Renders components against the instance that previously held their
//! position, so private state survives, and drives mount and unmount
//! notifications.

use std::collections::HashSet;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::component::{host_node, identity};
use crate::reconcile::detach_node;
use crate::{
    Body, Child, ComponentRef, Host, KeyedList, List, Mounts, Node, Reconciler, RenderError,
    Rendered, Result,
};

/// Outcome of rendering one component
#[derive(Debug, Default)]
pub struct ComponentRender {
    /// Components awaiting mount, children before parents
    pub mounts: Mounts,
    /// The component kept its previous output
    pub skipped: bool,
}

impl<H: Host + ?Sized> Reconciler<'_, H> {
    /// Render `next` in the position previously held by `prev`.
    ///
    /// If `prev` is a component of the same type, `next`'s properties are
    /// handed to it and `next` is replaced by that persistent instance.
    /// Whatever `prev` held that is no longer used lands in `displaced`.
    pub fn render_component(
        &mut self,
        next: &mut ComponentRef,
        prev: Option<Child>,
        displaced: &mut Vec<Child>,
    ) -> Result<ComponentRender> {
        let mut inherited = None;
        match prev {
            Some(Child::Component(prev)) => {
                if Rc::ptr_eq(&prev, next) {
                    // re-render of a live instance
                } else if prev.borrow_mut().receive_from(&*next.borrow()) {
                    *next = prev;
                } else {
                    inherited = detach_node(prev, displaced);
                }
            }
            Some(Child::Node(node)) => inherited = Some(node),
            Some(other) => displaced.push(other),
            None => {}
        }

        let component = next.clone();
        self.live.insert(identity(&component));

        let skip = {
            let cell = component.borrow();
            cell.context().rendered().is_some() && cell.should_skip()
        };
        if skip {
            trace!("Skipped render of {}", component.borrow().type_name());
            displaced.extend(inherited.map(Child::Node));
            let mut kept = Vec::new();
            collect_components(&Child::Component(component), &HashSet::new(), &mut kept);
            self.live.extend(kept.iter().map(identity));
            return Ok(ComponentRender {
                mounts: Vec::new(),
                skipped: true,
            });
        }

        let body = component.borrow_mut().render_body(self.scheduler.as_ref());
        // a kept instance diffs against its own output; the slot's old node goes
        let own = component.borrow_mut().context_mut().rendered.take();
        let previous = match own {
            Some(own) => {
                displaced.extend(inherited.map(Child::Node));
                Some(own)
            }
            None => inherited.map(Rendered::Node),
        };

        let mut mounts = Vec::new();
        let rendered = match body {
            Body::Component(mut child) => {
                let prev = previous.map(Rendered::into_child);
                let render = self.render_component(&mut child, prev, displaced)?;
                mounts.extend(render.mounts);
                Rendered::Component(child)
            }
            Body::Node(node) => {
                let node = self.render_output(node, previous, displaced, &mut mounts)?;
                Rendered::Node(node)
            }
            Body::Empty => {
                let placeholder = Node::element(self.config.placeholder_tag.as_str(), []);
                let node = self.render_output(placeholder, previous, displaced, &mut mounts)?;
                Rendered::Node(node)
            }
        };

        let mut cell = component.borrow_mut();
        let context = cell.context_mut();
        context.rendered = Some(rendered);
        context.unmounted = false;
        let fresh = !context.mounted;
        cell.take_snapshot();
        drop(cell);

        if fresh {
            mounts.push(component);
        }
        Ok(ComponentRender {
            mounts,
            skipped: false,
        })
    }

    fn render_output(
        &mut self,
        mut node: Node,
        previous: Option<Rendered>,
        displaced: &mut Vec<Child>,
        mounts: &mut Mounts,
    ) -> Result<Node> {
        let prev = match previous {
            Some(Rendered::Node(prev)) => Some(prev),
            Some(Rendered::Component(prev)) => detach_node(prev, displaced),
            None => None,
        };
        self.reconcile_node(&mut node, prev, displaced, mounts)?;
        Ok(node)
    }

    /// Render an already rendered component again in place.
    ///
    /// A no-op for unmounted components; fails for components that were
    /// never rendered.
    pub fn rerender(&mut self, component: &ComponentRef) -> Result<Mounts> {
        {
            let cell = component.borrow();
            if cell.context().is_unmounted() {
                warn!("Ignoring rerender of unmounted {}", cell.type_name());
                return Ok(Vec::new());
            }
            if cell.context().rendered().is_none() {
                return Err(RenderError::NeverRendered(cell.type_name()));
            }
        }

        let old = host_node(component);
        let mut next = component.clone();
        let mut displaced = Vec::new();
        let prev = Some(Child::Component(component.clone()));
        let render = self.render_component(&mut next, prev, &mut displaced)?;

        if let (Some(old), Some(new)) = (old, host_node(component)) {
            self.replace(old, new)?;
        }
        for child in displaced {
            self.release(child, &mut None)?;
        }
        self.retire_pending();
        debug!(
            "Rerendered {} ({} mounts, skipped: {})",
            component.borrow().type_name(),
            render.mounts.len(),
            render.skipped
        );
        Ok(render.mounts)
    }
}

/// Deliver mount notifications. Components already mounted or retired are
/// left alone.
pub fn mount(mounts: Mounts) {
    for component in mounts {
        let mut cell = component.borrow_mut();
        let context = cell.context_mut();
        if context.mounted || context.unmounted {
            continue;
        }
        context.mounted = true;
        cell.notify_mount();
    }
}

/// Retire every component in a subtree, deepest first. Idempotent.
pub fn unmount(child: &Child) {
    let mut components = Vec::new();
    collect_components(child, &HashSet::new(), &mut components);
    components.iter().for_each(retire);
}

impl<H: Host + ?Sized> Reconciler<'_, H> {
    /// Retire what this pass released, except components that were
    /// rendered again somewhere else in the same pass
    pub(crate) fn retire_pending(&mut self) {
        for component in std::mem::take(&mut self.retiring) {
            if !self.live.contains(&identity(&component)) {
                retire(&component);
            }
        }
        self.live.clear();
    }
}

/// Components of a subtree, children before parents. Components in `live`
/// and everything below them are left out.
pub(crate) fn collect_components(
    child: &Child,
    live: &HashSet<usize>,
    out: &mut Vec<ComponentRef>,
) {
    match child {
        Child::Node(node) => {
            node.children().iter().for_each(|c| collect_components(c, live, out));
        }
        Child::List(List(children)) | Child::KeyedList(KeyedList { children, .. }) => {
            children.iter().for_each(|c| collect_components(c, live, out));
        }
        Child::Absent => {}
        Child::Component(component) => {
            if live.contains(&identity(component)) {
                return;
            }
            if let Ok(cell) = component.try_borrow() {
                match cell.context().rendered() {
                    Some(Rendered::Node(node)) => {
                        node.children().iter().for_each(|c| collect_components(c, live, out));
                    }
                    Some(Rendered::Component(inner)) => {
                        collect_components(&Child::Component(inner.clone()), live, out);
                    }
                    None => {}
                }
            }
            out.push(component.clone());
        }
    }
}

fn retire(component: &ComponentRef) {
    let was_mounted = {
        let mut cell = component.borrow_mut();
        let context = cell.context_mut();
        if context.unmounted {
            return;
        }
        context.unmounted = true;
        std::mem::replace(&mut context.mounted, false)
    };
    if was_mounted {
        component.borrow_mut().notify_unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Component, Config, Scope, component, component_with_handle};
    use fos_dom::Document;
    use std::cell::RefCell;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::writer::MakeWriter;

    #[derive(Clone)]
    struct Logged {
        label: String,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Component for Logged {
        fn render(&mut self, _scope: &Scope<Self>) -> Body {
            self.log.borrow_mut().push(format!("render {}", self.label));
            Node::element("div", [self.label.as_str().into()]).into()
        }

        fn mount(&mut self) {
            self.log.borrow_mut().push(format!("mount {}", self.label));
        }

        fn unmount(&mut self) {
            self.log.borrow_mut().push(format!("unmount {}", self.label));
        }
    }

    #[derive(Clone)]
    struct Nothing;

    impl Component for Nothing {
        fn render(&mut self, _scope: &Scope<Self>) -> Body {
            Body::Empty
        }
    }

    fn logged(label: &str, log: &Rc<RefCell<Vec<String>>>) -> Logged {
        Logged {
            label: label.to_string(),
            log: log.clone(),
        }
    }

    #[test]
    fn test_empty_body_renders_placeholder() {
        let mut doc = Document::new().unwrap();
        let config = Config::default();
        let mut root = component(Nothing);

        let render = Reconciler::new(&mut doc, &config)
            .render_component(&mut root, None, &mut Vec::new())
            .unwrap();
        assert!(!render.skipped);
        assert_eq!(render.mounts.len(), 1);

        let node = host_node(&root).unwrap();
        assert_eq!(doc.tag_name(node), Some("noscript"));
    }

    #[test]
    fn test_same_type_reuses_instance() {
        let mut doc = Document::new().unwrap();
        let config = Config::default();
        let log = Rc::new(RefCell::new(Vec::new()));

        let (first, handle) = component_with_handle(logged("a", &log));
        let mut current = first.clone();
        let render = Reconciler::new(&mut doc, &config)
            .render_component(&mut current, None, &mut Vec::new())
            .unwrap();
        mount(render.mounts);
        let node = host_node(&first);

        let mut next = component(logged("b", &log));
        let mut displaced = Vec::new();
        let render = Reconciler::new(&mut doc, &config)
            .render_component(&mut next, Some(Child::Component(first.clone())), &mut displaced)
            .unwrap();

        assert!(Rc::ptr_eq(&next, &first));
        assert!(render.mounts.is_empty());
        assert!(displaced.is_empty());
        assert_eq!(host_node(&first), node);
        assert_eq!(handle.with(|p| p.label.clone()), Some("b".to_string()));
        assert_eq!(*log.borrow(), vec!["render a", "mount a", "render b"]);
    }

    #[test]
    fn test_rerender_requires_prior_render() {
        let mut doc = Document::new().unwrap();
        let config = Config::default();
        let fresh = component(Nothing);

        let err = Reconciler::new(&mut doc, &config).rerender(&fresh).unwrap_err();
        assert!(matches!(err, RenderError::NeverRendered(_)));
    }

    #[test]
    fn test_unmount_is_idempotent_and_ignored_on_rerender() {
        let mut doc = Document::new().unwrap();
        let config = Config::default();
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut root = component(logged("x", &log));

        let render = Reconciler::new(&mut doc, &config)
            .render_component(&mut root, None, &mut Vec::new())
            .unwrap();
        mount(render.mounts);

        unmount(&Child::Component(root.clone()));
        unmount(&Child::Component(root.clone()));
        let mounts = Reconciler::new(&mut doc, &config).rerender(&root).unwrap();

        assert!(mounts.is_empty());
        assert_eq!(*log.borrow(), vec!["render x", "mount x", "unmount x"]);
    }

    /// Collects formatted log output for inspection
    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Capture {
        type Writer = Capture;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_rerender_of_unmounted_warns() {
        let mut doc = Document::new().unwrap();
        let config = Config::default();
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut root = component(logged("w", &log));
        Reconciler::new(&mut doc, &config)
            .render_component(&mut root, None, &mut Vec::new())
            .unwrap();
        unmount(&Child::Component(root.clone()));

        let capture = Capture::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let mounts = Reconciler::new(&mut doc, &config).rerender(&root).unwrap();
            assert!(mounts.is_empty());
        });

        let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        let line = output
            .lines()
            .find(|line| line.contains("Ignoring rerender of unmounted"))
            .unwrap();
        assert!(line.contains("WARN"));
    }
}
