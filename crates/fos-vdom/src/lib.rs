//! fOS VDOM - Virtual-tree reconciliation
//!
//! Components describe the UI as a fresh [`Node`] tree on every render.
//! The [`Reconciler`] diffs that tree against the previous one and applies
//! the minimal set of mutations to a live [`Host`] tree, keeping component
//! instances (and their private state) alive across renders. Re-render
//! requests are coalesced by the [`Scheduler`] and flushed on animation
//! frames within a time budget.
//!
//! # Example
//! ```rust,ignore
//! use fos_vdom::{elem, Body, Component, Config, Renderer, Scope};
//!
//! #[derive(Clone)]
//! struct Page;
//!
//! impl Component for Page {
//!     fn render(&mut self, _scope: &Scope<Self>) -> Body {
//!         elem::body([elem::heading(1, ["Hello".into()]).into()]).into()
//!     }
//! }
//!
//! let renderer = Renderer::new(document, frames, Config::default());
//! renderer.render_body(Page)?;
//! ```

mod batch;
mod component;
mod config;
pub mod elem;
mod error;
pub mod event;
mod host;
mod lifecycle;
mod markup;
mod node;
mod reconcile;
mod renderer;

pub use batch::{Clock, FlushReport, MonotonicClock, Scheduler};
pub use component::{
    AnyComponent, Body, Component, ComponentContext, ComponentHandle, ComponentRef, Rendered, Scope,
    component, component_with_handle,
};
pub use config::Config;
pub use error::{MarkupError, RenderError};
pub use event::EventListener;
pub use host::{FrameRequester, Host};
pub use lifecycle::{ComponentRender, mount, unmount};
pub use markup::{
    Markup, attr, class, classes, data, group, key, listener, markup_if, namespace, prop, style,
    unsafe_html,
};
pub use node::{Child, Key, KeyedList, List, Node, NodeKind};
pub use reconcile::{Mounts, Reconciler};
pub use renderer::Renderer;

pub use fos_dom::{Event, NodeId, PropertyValue as Value};

/// Result alias used across the engine
pub type Result<T, E = RenderError> = std::result::Result<T, E>;
