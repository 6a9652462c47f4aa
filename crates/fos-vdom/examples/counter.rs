//! Example: click-driven counter rendered into an in-memory document

use std::rc::Rc;

use anyhow::{Context, Result};
use fos_dom::{AnimationFrameQueue, Document};
use fos_vdom::{Body, Component, Config, Renderer, Scope, class, elem, event, key};

#[derive(Clone)]
struct Counter {
    count: u32,
}

impl Component for Counter {
    fn render(&mut self, scope: &Scope<Self>) -> Body {
        let handle = scope.handle();
        elem::body([
            elem::heading(1, ["Counter".into()]).into(),
            elem::button([
                key("increment"),
                class("counter"),
                event::click(move |_| {
                    handle.update(|c| c.count += 1);
                })
                .into(),
                format!("clicked {} times", self.count).into(),
            ])
            .into(),
        ])
        .into()
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let frames = Rc::new(AnimationFrameQueue::new());
    let document = Document::new().context("creating document")?;
    let renderer = Renderer::new(document, frames.clone(), Config::default());
    renderer.render_body(Counter { count: 0 })?;

    let button = {
        let host = renderer.host();
        let body = host.body().context("document has no body")?;
        host.children(body).get(1).copied().context("button missing")?
    };

    for frame in 1..=3 {
        renderer.host().dispatch_event(button, "click");
        frames.run(f64::from(frame) * 16.67);
        if let Some(err) = renderer.take_error() {
            return Err(err.into());
        }

        let host = renderer.host();
        let body = host.body().context("document has no body")?;
        println!("{}", host.outer_html(body));
    }

    let records = renderer.host_mut().take_records();
    println!("{} host mutations recorded", records.len());
    Ok(())
}
