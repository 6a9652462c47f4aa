//! Renderer
//!
//! Owns the host tree, the configuration and the scheduler, and exposes
//! the top-level entry points.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

use fos_dom::NodeId;
use tracing::debug;

use crate::batch::Rerender;
use crate::component::host_node;
use crate::{
    Child, Clock, Component, ComponentHandle, ComponentRef, Config, FrameRequester, Host,
    MonotonicClock, Reconciler, RenderError, Result, Scheduler, component_with_handle, mount,
    unmount,
};

struct Shared<H: Host> {
    host: RefCell<H>,
    config: Config,
    scheduler: Scheduler,
    roots: RefCell<Vec<ComponentRef>>,
}

impl<H: Host> Shared<H> {
    fn host_mut(&self) -> Result<RefMut<'_, H>> {
        self.host
            .try_borrow_mut()
            .map_err(|_| RenderError::Internal("host tree is borrowed during render"))
    }
}

impl<H: Host> Rerender for Shared<H> {
    fn rerender_component(&self, component: &ComponentRef) -> Result<()> {
        let mounts = {
            let mut host = self.host_mut()?;
            Reconciler::new(&mut *host, &self.config)
                .with_scheduler(self.scheduler.clone())
                .rerender(component)?
        };
        mount(mounts);
        Ok(())
    }
}

/// Top-level renderer bound to one host tree
pub struct Renderer<H: Host + 'static> {
    shared: Rc<Shared<H>>,
}

impl<H: Host + 'static> Renderer<H> {
    pub fn new(host: H, frames: Rc<dyn FrameRequester>, config: Config) -> Self {
        Self::with_clock(host, frames, Rc::new(MonotonicClock::new()), config)
    }

    /// Renderer whose scheduler measures time with `clock`
    pub fn with_clock(
        host: H,
        frames: Rc<dyn FrameRequester>,
        clock: Rc<dyn Clock>,
        config: Config,
    ) -> Self {
        let shared = Rc::new_cyclic(|this: &Weak<Shared<H>>| {
            let scheduler = Scheduler::new(frames, clock, &config);
            let target: Weak<dyn Rerender> = this.clone();
            scheduler.bind(target);
            Shared {
                host: RefCell::new(host),
                config,
                scheduler,
                roots: RefCell::new(Vec::new()),
            }
        });
        Self { shared }
    }

    /// Render `component` as the document body
    pub fn render_body<C: Component>(&self, component: C) -> Result<ComponentHandle<C>> {
        let body = self
            .shared
            .host
            .try_borrow()
            .map_err(|_| RenderError::Internal("host tree is borrowed during render"))?
            .body()
            .ok_or(RenderError::Internal("document has no body"))?;
        self.render_root(body, self.shared.config.body_tag.clone(), component)
    }

    /// Render `component` in place of `target`; its root element must carry
    /// the same tag as `target`
    pub fn render_into<C: Component>(
        &self,
        target: NodeId,
        component: C,
    ) -> Result<ComponentHandle<C>> {
        let expected = self
            .host()
            .tag_name(target)
            .ok_or(RenderError::Internal("render target is not an element"))?;
        self.render_root(target, expected, component)
    }

    fn render_root<C: Component>(
        &self,
        target: NodeId,
        expected: String,
        component: C,
    ) -> Result<ComponentHandle<C>> {
        let (root, handle) = component_with_handle(component);
        let mut next = root.clone();

        let mounts = {
            let mut host = self.shared.host_mut()?;
            let mut reconciler = Reconciler::new(&mut *host, &self.shared.config)
                .with_scheduler(self.shared.scheduler.clone());

            let mut displaced = Vec::new();
            let render = reconciler.render_component(&mut next, None, &mut displaced)?;
            let node = host_node(&next)
                .ok_or(RenderError::Internal("root component produced no node"))?;

            let found = reconciler.host().tag_name(node).unwrap_or_else(|| "#text".to_string());
            if found != expected {
                return Err(RenderError::RootMismatch { expected, found });
            }

            let replaced = {
                let mut roots = self.shared.roots.borrow_mut();
                let position = roots.iter().position(|r| host_node(r) == Some(target));
                position.map(|i| roots.remove(i))
            };
            if let Some(old) = replaced {
                unmount(&Child::Component(old));
            }
            reconciler.replace(target, node)?;
            reconciler.release_node(target)?;
            for child in displaced {
                reconciler.release(child, &mut None)?;
            }
            reconciler.retire_pending();
            render.mounts
        };

        debug!("Rendered root {} into {}", root.borrow().type_name(), target);
        self.shared.roots.borrow_mut().push(root);
        mount(mounts);
        Ok(handle)
    }

    /// Re-render `component` synchronously, outside the scheduler
    pub fn rerender(&self, component: &ComponentRef) -> Result<()> {
        self.shared.rerender_component(component)
    }

    /// Flush queued re-renders now
    pub fn flush(&self) -> Result<crate::FlushReport> {
        self.shared.scheduler.flush()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.shared.scheduler
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    /// Borrow the host tree; must not be held across a frame
    pub fn host(&self) -> Ref<'_, H> {
        self.shared.host.borrow()
    }

    pub fn host_mut(&self) -> RefMut<'_, H> {
        self.shared.host.borrow_mut()
    }

    /// Error that halted scheduled rendering, reported once
    pub fn take_error(&self) -> Option<RenderError> {
        self.shared.scheduler.take_error()
    }
}
