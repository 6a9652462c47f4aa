//! Components
//!
//! A component is user state plus a render function. The engine wraps each
//! instance in a [`ComponentRef`] cell that also carries its context record
//! (last rendered output, copy-on-render snapshot, mount flags). User code
//! only sees its own value; the context stays private to the engine.

use std::any::Any;
use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use fos_dom::NodeId;

use crate::{Child, Key, Node, Scheduler};

/// What a render call produces
pub enum Body {
    Node(Node),
    Component(ComponentRef),
    /// Rendered as the configured placeholder element
    Empty,
}

impl From<Node> for Body {
    fn from(node: Node) -> Self {
        Self::Node(node)
    }
}

impl From<ComponentRef> for Body {
    fn from(component: ComponentRef) -> Self {
        Self::Component(component)
    }
}

impl From<Option<Node>> for Body {
    fn from(node: Option<Node>) -> Self {
        node.map_or(Self::Empty, Self::Node)
    }
}

/// User-defined component
///
/// Only `render` is required. The remaining methods are optional
/// capabilities with neutral defaults.
pub trait Component: Clone + 'static {
    fn render(&mut self, scope: &Scope<Self>) -> Body;

    /// Accept the properties of a freshly built instance that landed on this
    /// persistent one. Override to keep private state across renders.
    fn receive(&mut self, next: Self) {
        *self = next;
    }

    /// Return true to keep the previous output; `prev` is the snapshot taken
    /// after the last render
    fn skip_render(&self, _prev: &Self) -> bool {
        false
    }

    /// Identity among keyed siblings
    fn key(&self) -> Option<Key> {
        None
    }

    fn mount(&mut self) {}

    fn unmount(&mut self) {}

    /// Copy taken after each render and handed back to `skip_render`
    fn snapshot(&self) -> Self {
        self.clone()
    }
}

/// Last output of a component
#[derive(Debug, Clone)]
pub enum Rendered {
    Node(Node),
    Component(ComponentRef),
}

impl Rendered {
    pub(crate) fn into_child(self) -> Child {
        match self {
            Self::Node(node) => Child::Node(node),
            Self::Component(component) => Child::Component(component),
        }
    }
}

/// Engine-owned bookkeeping for one component instance
#[derive(Debug, Default)]
pub struct ComponentContext {
    pub(crate) rendered: Option<Rendered>,
    pub(crate) mounted: bool,
    pub(crate) unmounted: bool,
}

impl ComponentContext {
    pub fn rendered(&self) -> Option<&Rendered> {
        self.rendered.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_unmounted(&self) -> bool {
        self.unmounted
    }

    /// Root host node of the last output
    pub fn host_node(&self) -> Option<NodeId> {
        match self.rendered.as_ref()? {
            Rendered::Node(node) => node.handle(),
            Rendered::Component(inner) => inner.try_borrow().ok()?.context().host_node(),
        }
    }
}

/// Type-erased view of a component cell
pub trait AnyComponent {
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
    fn key(&self) -> Option<Key>;
    fn context(&self) -> &ComponentContext;
    fn context_mut(&mut self) -> &mut ComponentContext;

    /// Take over `next`'s properties if it has the same concrete type
    fn receive_from(&mut self, next: &dyn AnyComponent) -> bool;

    /// Consult the skip capability against the last snapshot
    fn should_skip(&self) -> bool;

    fn render_body(&mut self, scheduler: Option<&Scheduler>) -> Body;
    fn take_snapshot(&mut self);
    fn notify_mount(&mut self);
    fn notify_unmount(&mut self);
}

impl fmt::Debug for dyn AnyComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("type", &self.type_name())
            .field("key", &self.key())
            .field("context", self.context())
            .finish()
    }
}

/// Shared, erased component instance
pub type ComponentRef = Rc<RefCell<dyn AnyComponent>>;

struct ComponentCell<C: Component> {
    component: C,
    snapshot: Option<C>,
    context: ComponentContext,
    this: Weak<RefCell<ComponentCell<C>>>,
    scheduler: Rc<OnceCell<Scheduler>>,
}

impl<C: Component> AnyComponent for ComponentCell<C> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<C>()
    }

    fn key(&self) -> Option<Key> {
        self.component.key()
    }

    fn context(&self) -> &ComponentContext {
        &self.context
    }

    fn context_mut(&mut self) -> &mut ComponentContext {
        &mut self.context
    }

    fn receive_from(&mut self, next: &dyn AnyComponent) -> bool {
        match next.as_any().downcast_ref::<ComponentCell<C>>() {
            Some(next) => {
                self.component.receive(next.component.clone());
                true
            }
            None => false,
        }
    }

    fn should_skip(&self) -> bool {
        self.snapshot
            .as_ref()
            .is_some_and(|prev| self.component.skip_render(prev))
    }

    fn render_body(&mut self, scheduler: Option<&Scheduler>) -> Body {
        if let Some(scheduler) = scheduler {
            self.scheduler.get_or_init(|| scheduler.clone());
        }
        let scope = Scope {
            handle: ComponentHandle {
                cell: self.this.clone(),
                scheduler: self.scheduler.clone(),
            },
        };
        self.component.render(&scope)
    }

    fn take_snapshot(&mut self) {
        self.snapshot = Some(self.component.snapshot());
    }

    fn notify_mount(&mut self) {
        self.component.mount();
    }

    fn notify_unmount(&mut self) {
        self.component.unmount();
    }
}

fn new_cell<C: Component>(component: C) -> Rc<RefCell<ComponentCell<C>>> {
    Rc::new_cyclic(|this| {
        RefCell::new(ComponentCell {
            component,
            snapshot: None,
            context: ComponentContext::default(),
            this: this.clone(),
            scheduler: Rc::new(OnceCell::new()),
        })
    })
}

/// Wrap a component value for use as a child or body
pub fn component<C: Component>(component: C) -> ComponentRef {
    new_cell(component)
}

/// Wrap a component value and keep a typed handle to it
pub fn component_with_handle<C: Component>(component: C) -> (ComponentRef, ComponentHandle<C>) {
    let cell = new_cell(component);
    let handle = ComponentHandle {
        cell: Rc::downgrade(&cell),
        scheduler: cell.borrow().scheduler.clone(),
    };
    let erased: ComponentRef = cell;
    (erased, handle)
}

/// Address of the shared cell, stable for the instance's lifetime
pub(crate) fn identity(component: &ComponentRef) -> usize {
    Rc::as_ptr(component) as *const () as usize
}

/// Host node a component's output currently occupies
pub(crate) fn host_node(component: &ComponentRef) -> Option<NodeId> {
    component.try_borrow().ok()?.context().host_node()
}

/// Render-time access to the component's own handle
pub struct Scope<C: Component> {
    handle: ComponentHandle<C>,
}

impl<C: Component> Scope<C> {
    pub fn handle(&self) -> ComponentHandle<C> {
        self.handle.clone()
    }
}

/// Typed weak handle to a live component
///
/// Handles do not keep the component alive. Mutating through a handle
/// queues a re-render on the scheduler the component was rendered with.
pub struct ComponentHandle<C: Component> {
    cell: Weak<RefCell<ComponentCell<C>>>,
    scheduler: Rc<OnceCell<Scheduler>>,
}

impl<C: Component> Clone for ComponentHandle<C> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<C: Component> fmt::Debug for ComponentHandle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentHandle")
            .field("type", &std::any::type_name::<C>())
            .field("alive", &(self.cell.strong_count() > 0))
            .finish()
    }
}

impl<C: Component> ComponentHandle<C> {
    /// Typed handle to an erased instance, if it holds a `C`
    pub fn from_ref(component: &ComponentRef) -> Option<Self> {
        let cell = component.try_borrow().ok()?;
        let cell = cell.as_any().downcast_ref::<ComponentCell<C>>()?;
        Some(Self {
            cell: cell.this.clone(),
            scheduler: cell.scheduler.clone(),
        })
    }

    /// Mutate the component and queue a re-render.
    /// Returns false if the component is gone or currently borrowed.
    pub fn update(&self, f: impl FnOnce(&mut C)) -> bool {
        let Some(cell) = self.cell.upgrade() else {
            return false;
        };
        match cell.try_borrow_mut() {
            Ok(mut cell) => f(&mut cell.component),
            Err(_) => return false,
        }
        self.request_rerender()
    }

    /// Read the component
    pub fn with<R>(&self, f: impl FnOnce(&C) -> R) -> Option<R> {
        let cell = self.cell.upgrade()?;
        let cell = cell.try_borrow().ok()?;
        Some(f(&cell.component))
    }

    /// Queue a re-render; false if the component is gone or was never
    /// rendered with a scheduler
    pub fn request_rerender(&self) -> bool {
        match (self.erased(), self.scheduler.get()) {
            (Some(component), Some(scheduler)) => {
                scheduler.request_rerender(&component);
                true
            }
            _ => false,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.cell
            .upgrade()
            .and_then(|cell| cell.try_borrow().ok().map(|c| c.context.mounted))
            .unwrap_or(false)
    }

    /// The erased instance, if still alive
    pub fn erased(&self) -> Option<ComponentRef> {
        let cell: ComponentRef = self.cell.upgrade()?;
        Some(cell)
    }
}
