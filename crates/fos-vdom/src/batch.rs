//! Batch Scheduler
//!
//! Coalesces re-render requests and flushes them on animation frames.
//!
//! Each flush works through the queue in request order until the remaining
//! frame budget drops below `preempt_factor` times the average render time
//! observed so far in that flush; the rest waits for the next frame. The
//! first component of a flush always renders, however slow.

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use tracing::{debug, error, trace, warn};

use crate::component::identity;
use crate::{ComponentRef, Config, FrameRequester, RenderError, Result};

/// Monotonic time source
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin
    fn now(&self) -> Duration;
}

/// Wall-clock [`Clock`]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Whatever actually re-renders a queued component
pub(crate) trait Rerender {
    fn rerender_component(&self, component: &ComponentRef) -> Result<()>;
}

/// Result of one flush
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub rendered: usize,
    /// Unmounted components dropped from the queue
    pub skipped: usize,
    /// Components pushed back to the next frame
    pub deferred: usize,
}

#[derive(Default)]
struct QueueState {
    queue: VecDeque<ComponentRef>,
    index: HashSet<usize>,
    scheduled: bool,
    halted: Option<RenderError>,
    unreported: bool,
}

impl QueueState {
    fn enqueue(&mut self, component: ComponentRef) {
        let id = identity(&component);
        if !self.index.insert(id) {
            self.queue.retain(|queued| identity(queued) != id);
        }
        self.queue.push_back(component);
    }
}

struct BatchRenderer {
    state: RefCell<QueueState>,
    frames: Rc<dyn FrameRequester>,
    clock: Rc<dyn Clock>,
    budget: Duration,
    preempt_factor: f64,
    target: RefCell<Option<Weak<dyn Rerender>>>,
    this: Weak<BatchRenderer>,
}

/// Shared handle to the batch renderer
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<BatchRenderer>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Scheduler")
            .field("pending", &state.queue.len())
            .field("scheduled", &state.scheduled)
            .field("halted", &state.halted.is_some())
            .field("budget", &self.inner.budget)
            .finish()
    }
}

impl Scheduler {
    pub(crate) fn new(
        frames: Rc<dyn FrameRequester>,
        clock: Rc<dyn Clock>,
        config: &Config,
    ) -> Self {
        let inner = Rc::new_cyclic(|this| BatchRenderer {
            state: RefCell::new(QueueState::default()),
            frames,
            clock,
            budget: config.frame_budget,
            preempt_factor: config.preempt_factor,
            target: RefCell::new(None),
            this: this.clone(),
        });
        Self { inner }
    }

    pub(crate) fn bind(&self, target: Weak<dyn Rerender>) {
        *self.inner.target.borrow_mut() = Some(target);
    }

    /// Queue `component` for the next frame. A component already queued
    /// moves to the back.
    pub fn request_rerender(&self, component: &ComponentRef) {
        let mut state = self.inner.state.borrow_mut();
        if state.halted.is_some() {
            warn!("Scheduler halted, ignoring rerender request");
            return;
        }
        state.enqueue(component.clone());
        let schedule = !state.scheduled;
        state.scheduled = true;
        drop(state);

        if schedule {
            self.request_frame();
        }
    }

    fn request_frame(&self) {
        let this = self.inner.this.clone();
        self.inner.frames.request_animation_frame(Box::new(move |timestamp| {
            if let Some(inner) = this.upgrade() {
                Scheduler { inner }.on_frame(timestamp);
            }
        }));
    }

    fn on_frame(&self, timestamp: f64) {
        self.inner.state.borrow_mut().scheduled = false;
        match self.flush() {
            Ok(report) => trace!("Frame at {:.2}ms: {:?}", timestamp, report),
            Err(err) => error!("Render flush aborted: {}", err),
        }
    }

    /// Render queued components within the frame budget
    pub fn flush(&self) -> Result<FlushReport> {
        let mut batch: Vec<ComponentRef> = {
            let mut state = self.inner.state.borrow_mut();
            if let Some(err) = &state.halted {
                return Err(RenderError::Halted(Box::new(err.clone())));
            }
            state.index.clear();
            state.queue.drain(..).collect()
        };
        let mut report = FlushReport::default();
        if batch.is_empty() {
            return Ok(report);
        }

        let target = self
            .inner
            .target
            .borrow()
            .as_ref()
            .and_then(Weak::upgrade)
            .ok_or(RenderError::Internal("scheduler is not bound to a renderer"));
        let target = match target {
            Ok(target) => target,
            Err(err) => return Err(self.halt(err)),
        };

        let start = self.inner.clock.now();
        let mut index = 0;
        while index < batch.len() {
            if index > 0 {
                let elapsed = self.inner.clock.now().saturating_sub(start);
                let average = elapsed / index as u32;
                let remaining = self.inner.budget.saturating_sub(elapsed);
                if remaining < average.mul_f64(self.inner.preempt_factor) {
                    let rest = batch.split_off(index);
                    report.deferred = rest.len();
                    self.defer(rest);
                    break;
                }
            }

            let component = &batch[index];
            index += 1;
            if component.borrow().context().is_unmounted() {
                report.skipped += 1;
                continue;
            }
            if let Err(err) = target.rerender_component(component) {
                return Err(self.halt(err));
            }
            report.rendered += 1;
        }

        debug!(
            "Flushed {} components ({} skipped, {} deferred) in {:?}",
            report.rendered,
            report.skipped,
            report.deferred,
            self.inner.clock.now().saturating_sub(start)
        );

        let schedule = {
            let mut state = self.inner.state.borrow_mut();
            let schedule = !state.scheduled;
            state.scheduled = true;
            schedule
        };
        if schedule {
            self.request_frame();
        }
        Ok(report)
    }

    /// Put unprocessed components back at the front, ahead of anything
    /// requested during the flush
    fn defer(&self, rest: Vec<ComponentRef>) {
        let mut state = self.inner.state.borrow_mut();
        for component in &rest {
            let id = identity(component);
            if !state.index.insert(id) {
                state.queue.retain(|queued| identity(queued) != id);
            }
        }
        for component in rest.into_iter().rev() {
            state.queue.push_front(component);
        }
    }

    fn halt(&self, err: RenderError) -> RenderError {
        let mut state = self.inner.state.borrow_mut();
        state.queue.clear();
        state.index.clear();
        state.halted = Some(err.clone());
        state.unreported = true;
        err
    }

    /// Components waiting for a frame
    pub fn pending(&self) -> usize {
        self.inner.state.borrow().queue.len()
    }

    /// Whether a frame callback is outstanding
    pub fn is_scheduled(&self) -> bool {
        self.inner.state.borrow().scheduled
    }

    pub fn is_halted(&self) -> bool {
        self.inner.state.borrow().halted.is_some()
    }

    /// The error that halted the scheduler, reported once
    pub fn take_error(&self) -> Option<RenderError> {
        let mut state = self.inner.state.borrow_mut();
        if !state.unreported {
            return None;
        }
        state.unreported = false;
        state.halted.clone()
    }
}
