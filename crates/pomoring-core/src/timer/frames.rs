//! Frame scheduling primitive.
//!
//! A frame is "run the engine once more at the next opportunity". The engine
//! holds at most one outstanding [`FrameId`] and cancels it before asking for
//! another, so two loops can never drive the same countdown.

use std::cell::RefCell;
use std::rc::Rc;

/// Handle of one requested frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub(crate) u64);

impl FrameId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Registers and cancels frame callbacks.
pub trait FrameScheduler {
    /// Ask for one more frame. The returned id identifies it when it fires.
    fn request_frame(&mut self) -> FrameId;

    /// Cancel a requested frame. Unknown or already cancelled ids are ignored.
    fn cancel_frame(&mut self, id: FrameId);

    /// Frames that are due now, for poll-driven loops.
    ///
    /// Push-driven schedulers deliver frames on their own and return nothing.
    fn drain_ready(&mut self) -> Vec<FrameId> {
        Vec::new()
    }
}

/// Poll-driven scheduler: every requested frame is ready at the next poll.
///
/// The terminal front end polls it from a fixed interval; tests poll it by hand.
#[derive(Debug, Default)]
pub struct FrameQueue {
    next_id: u64,
    queued: Vec<FrameId>,
    requested: u64,
    cancelled: u64,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames requested and neither fired nor cancelled.
    pub fn outstanding(&self) -> &[FrameId] {
        &self.queued
    }

    pub fn is_idle(&self) -> bool {
        self.queued.is_empty()
    }

    /// Total number of frames ever requested.
    pub fn requested(&self) -> u64 {
        self.requested
    }

    /// Number of cancellations that removed a queued frame.
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameId {
        self.next_id += 1;
        self.requested += 1;
        let id = FrameId(self.next_id);
        self.queued.push(id);
        id
    }

    fn cancel_frame(&mut self, id: FrameId) {
        let before = self.queued.len();
        self.queued.retain(|queued| *queued != id);
        if self.queued.len() != before {
            self.cancelled += 1;
        }
    }

    fn drain_ready(&mut self) -> Vec<FrameId> {
        std::mem::take(&mut self.queued)
    }
}

impl<S: FrameScheduler> FrameScheduler for Rc<RefCell<S>> {
    fn request_frame(&mut self) -> FrameId {
        self.borrow_mut().request_frame()
    }

    fn cancel_frame(&mut self, id: FrameId) {
        self.borrow_mut().cancel_frame(id);
    }

    fn drain_ready(&mut self) -> Vec<FrameId> {
        self.borrow_mut().drain_ready()
    }
}
