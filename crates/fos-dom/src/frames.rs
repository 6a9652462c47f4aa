//! Animation frame callbacks
//!
//! `requestAnimationFrame` for a headless document: callbacks queue up
//! until the embedder runs the next frame.

use std::cell::{Cell, RefCell};
use std::fmt;

/// Callback receiving the frame timestamp in milliseconds
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Queue of callbacks waiting for the next frame
#[derive(Default)]
pub struct AnimationFrameQueue {
    next_id: Cell<u64>,
    pending: RefCell<Vec<(u64, FrameCallback)>>,
    frames_run: Cell<u64>,
}

impl fmt::Debug for AnimationFrameQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationFrameQueue")
            .field("pending", &self.pending())
            .field("frames_run", &self.frames_run.get())
            .finish()
    }
}

impl AnimationFrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoke `callback` once before the next frame
    pub fn request_animation_frame(&self, callback: FrameCallback) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.pending.borrow_mut().push((id, callback));
        id
    }

    /// Cancel a pending callback, returns false if it already ran
    pub fn cancel_animation_frame(&self, id: u64) -> bool {
        let mut pending = self.pending.borrow_mut();
        let before = pending.len();
        pending.retain(|(pending_id, _)| *pending_id != id);
        before != pending.len()
    }

    /// Number of callbacks waiting
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Number of frames run so far
    pub fn frames_run(&self) -> u64 {
        self.frames_run.get()
    }

    /// Run one frame. Callbacks requested while running wait for the next one.
    pub fn run(&self, timestamp: f64) -> usize {
        let callbacks = std::mem::take(&mut *self.pending.borrow_mut());
        self.frames_run.set(self.frames_run.get() + 1);
        tracing::trace!("Running frame at {:.2}ms with {} callbacks", timestamp, callbacks.len());

        let count = callbacks.len();
        for (_, callback) in callbacks {
            callback(timestamp);
        }
        count
    }
}
