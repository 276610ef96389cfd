//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based countdown state machine. It stores
//! an absolute deadline while running and derives the remaining seconds from
//! it on every read, so irregular frame timing never accumulates into drift.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Paused -> Running)* -> Finished
//!   ^________________ reset / set_duration _____|
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(SystemClock, FrameQueue::new());
//! engine.start();
//! // Once per rendering opportunity:
//! engine.poll_frames(); // Returns Some(Event::TimerCompleted) when it reaches zero
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::frames::{FrameId, FrameQueue, FrameScheduler};
use crate::clock::{Clock, SystemClock};
use crate::duration::{validate_secs, DEFAULT_DURATION_SECS};
use crate::error::ValidationError;
use crate::events::Event;
use crate::notify::NotificationSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
    /// Countdown reached zero. Stays here until started again or reset.
    Finished,
}

/// Core countdown engine.
///
/// Single-threaded: every command takes `&mut self`, and the only callback
/// the engine keeps alive is one outstanding frame in its scheduler.
pub struct TimerEngine<C: Clock = SystemClock, S: FrameScheduler = FrameQueue> {
    clock: C,
    scheduler: S,
    sink: Option<Box<dyn NotificationSink>>,
    status: TimerStatus,
    duration_secs: u64,
    /// Last computed remaining seconds. Authoritative only when not running.
    remaining_secs: u64,
    /// Absolute instant (ms since epoch) the countdown hits zero. Set iff running.
    deadline_ms: Option<u64>,
    pending: Option<FrameId>,
    completions: u64,
}

impl<C: Clock, S: FrameScheduler> TimerEngine<C, S> {
    /// Create an idle engine with the default 25 minute duration.
    pub fn new(clock: C, scheduler: S) -> Self {
        Self {
            clock,
            scheduler,
            sink: None,
            status: TimerStatus::Idle,
            duration_secs: DEFAULT_DURATION_SECS,
            remaining_secs: DEFAULT_DURATION_SECS,
            deadline_ms: None,
            pending: None,
            completions: 0,
        }
    }

    /// Create an idle engine with a specific duration.
    pub fn with_duration(
        duration_secs: u64,
        clock: C,
        scheduler: S,
    ) -> Result<Self, ValidationError> {
        let duration_secs = validate_secs(duration_secs)?;
        let mut engine = Self::new(clock, scheduler);
        engine.duration_secs = duration_secs;
        engine.remaining_secs = duration_secs;
        Ok(engine)
    }

    /// Attach the sink invoked once per finished countdown.
    pub fn with_sink(mut self, sink: impl NotificationSink + 'static) -> Self {
        self.set_sink(sink);
        self
    }

    pub fn set_sink(&mut self, sink: impl NotificationSink + 'static) {
        self.sink = Some(Box::new(sink));
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    /// Remaining whole seconds, rounded up.
    ///
    /// While running this is recomputed from the deadline on every call.
    pub fn remaining_secs(&self) -> u64 {
        match self.deadline_ms {
            Some(deadline) => ceil_secs(deadline.saturating_sub(self.clock.now_ms())),
            None => self.remaining_secs,
        }
    }

    pub fn deadline_ms(&self) -> Option<u64> {
        self.deadline_ms
    }

    /// Fraction of the configured duration still left, 1.0 .. 0.0.
    pub fn progress(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        (self.remaining_secs() as f64 / self.duration_secs as f64).clamp(0.0, 1.0)
    }

    /// The frame the engine is waiting on, if any.
    pub fn pending_frame(&self) -> Option<FrameId> {
        self.pending
    }

    /// How many times the notification sink has fired.
    pub fn completions(&self) -> u64 {
        self.completions
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            status: self.status,
            remaining_secs: self.remaining_secs(),
            duration_secs: self.duration_secs,
            progress: self.progress(),
            at: self.at(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a fresh countdown, or resume a paused one.
    ///
    /// No-op while already running; the deadline is left untouched.
    pub fn start(&mut self) -> Option<Event> {
        match self.status {
            TimerStatus::Running => None,
            TimerStatus::Idle | TimerStatus::Finished => {
                let deadline = self.arm_deadline(self.duration_secs);
                self.remaining_secs = self.duration_secs;
                debug!(duration_secs = self.duration_secs, "timer started");
                Some(Event::TimerStarted {
                    duration_secs: self.duration_secs,
                    deadline_ms: deadline,
                    at: self.at(),
                })
            }
            TimerStatus::Paused => {
                let deadline = self.arm_deadline(self.remaining_secs);
                debug!(remaining_secs = self.remaining_secs, "timer resumed");
                Some(Event::TimerResumed {
                    remaining_secs: self.remaining_secs,
                    deadline_ms: deadline,
                    at: self.at(),
                })
            }
        }
    }

    /// Resume a paused countdown. No-op in any other state.
    pub fn resume(&mut self) -> Option<Event> {
        match self.status {
            TimerStatus::Paused => self.start(),
            _ => None,
        }
    }

    /// Freeze the remaining time. No-op unless running.
    ///
    /// If the deadline has already passed the countdown completes instead.
    pub fn pause(&mut self) -> Option<Event> {
        if self.status != TimerStatus::Running {
            return None;
        }
        let remaining = self.remaining_secs();
        if remaining == 0 {
            return Some(self.complete());
        }
        self.cancel_frame();
        self.deadline_ms = None;
        self.remaining_secs = remaining;
        self.status = TimerStatus::Paused;
        debug!(remaining_secs = remaining, "timer paused");
        Some(Event::TimerPaused {
            remaining_secs: remaining,
            at: self.at(),
        })
    }

    /// Back to idle with the full configured duration, from any state.
    pub fn reset(&mut self) -> Option<Event> {
        self.cancel_frame();
        self.deadline_ms = None;
        self.status = TimerStatus::Idle;
        self.remaining_secs = self.duration_secs;
        debug!(duration_secs = self.duration_secs, "timer reset");
        Some(Event::TimerReset {
            remaining_secs: self.remaining_secs,
            at: self.at(),
        })
    }

    /// Change the configured duration.
    ///
    /// Any countdown in progress is discarded and the engine returns to idle.
    /// A rejected value leaves the previous duration in place.
    pub fn set_duration(&mut self, duration_secs: u64) -> Result<Event, ValidationError> {
        let duration_secs = validate_secs(duration_secs)?;
        if self.status != TimerStatus::Idle {
            debug!(from = ?self.status, "duration change discards countdown");
        }
        self.cancel_frame();
        self.deadline_ms = None;
        self.status = TimerStatus::Idle;
        self.duration_secs = duration_secs;
        self.remaining_secs = duration_secs;
        Ok(Event::DurationChanged {
            duration_secs,
            at: self.at(),
        })
    }

    // ── Loop ─────────────────────────────────────────────────────────

    /// Run one scheduling tick for `frame`.
    ///
    /// Frames other than the one outstanding are ignored. Returns
    /// `Some(Event::TimerCompleted)` on the tick that reaches zero.
    pub fn on_frame(&mut self, frame: FrameId) -> Option<Event> {
        if self.pending != Some(frame) {
            debug!(frame = frame.get(), "ignoring stale frame");
            return None;
        }
        self.pending = None;
        self.tick()
    }

    /// Run every frame the scheduler reports as ready.
    pub fn poll_frames(&mut self) -> Option<Event> {
        let mut completed = None;
        for frame in self.scheduler.drain_ready() {
            if let Some(event) = self.on_frame(frame) {
                completed = Some(event);
            }
        }
        completed
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn tick(&mut self) -> Option<Event> {
        if self.status != TimerStatus::Running {
            return None;
        }
        let remaining = self.remaining_secs();
        self.remaining_secs = remaining;
        trace!(remaining_secs = remaining, "tick");
        if remaining == 0 {
            return Some(self.complete());
        }
        self.request_frame();
        None
    }

    fn complete(&mut self) -> Event {
        self.cancel_frame();
        self.deadline_ms = None;
        self.remaining_secs = 0;
        self.status = TimerStatus::Finished;
        self.completions += 1;
        debug!(duration_secs = self.duration_secs, "timer finished");
        // State is final before the sink runs.
        if let Some(sink) = self.sink.as_mut() {
            sink.notify();
        }
        Event::TimerCompleted {
            duration_secs: self.duration_secs,
            at: self.at(),
        }
    }

    fn arm_deadline(&mut self, secs: u64) -> u64 {
        let deadline = self
            .clock
            .now_ms()
            .saturating_add(secs.saturating_mul(1000));
        self.deadline_ms = Some(deadline);
        self.status = TimerStatus::Running;
        self.request_frame();
        deadline
    }

    fn request_frame(&mut self) {
        self.cancel_frame();
        self.pending = Some(self.scheduler.request_frame());
    }

    fn cancel_frame(&mut self) {
        if let Some(frame) = self.pending.take() {
            self.scheduler.cancel_frame(frame);
        }
    }

    fn at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.clock.now_ms() as i64).unwrap_or_default()
    }
}

impl<C: Clock, S: FrameScheduler> Drop for TimerEngine<C, S> {
    fn drop(&mut self) {
        self.cancel_frame();
    }
}

impl<C: Clock, S: FrameScheduler> fmt::Debug for TimerEngine<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerEngine")
            .field("status", &self.status)
            .field("duration_secs", &self.duration_secs)
            .field("remaining_secs", &self.remaining_secs)
            .field("deadline_ms", &self.deadline_ms)
            .field("pending", &self.pending)
            .field("completions", &self.completions)
            .finish_non_exhaustive()
    }
}

fn ceil_secs(ms: u64) -> u64 {
    ms.div_ceil(1000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    const T0: u64 = 1_700_000_000_000;

    fn engine(secs: u64) -> (TimerEngine<ManualClock, FrameQueue>, ManualClock, Rc<Cell<u32>>) {
        let clock = ManualClock::new(T0);
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        let engine = TimerEngine::with_duration(secs, clock.clone(), FrameQueue::new())
            .unwrap()
            .with_sink(move || counter.set(counter.get() + 1));
        (engine, clock, fired)
    }

    #[test]
    fn new_engine_is_idle_with_default_duration() {
        let engine = TimerEngine::new(ManualClock::new(T0), FrameQueue::new());
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.duration_secs(), 25 * 60);
        assert_eq!(engine.remaining_secs(), 25 * 60);
        assert!(engine.deadline_ms().is_none());
        assert!(engine.pending_frame().is_none());
    }

    #[test]
    fn start_sets_deadline_and_schedules_one_frame() {
        let (mut engine, _clock, _) = engine(60);
        let event = engine.start().unwrap();
        assert!(matches!(event, Event::TimerStarted { duration_secs: 60, .. }));
        assert_eq!(engine.status(), TimerStatus::Running);
        assert_eq!(engine.deadline_ms(), Some(T0 + 60_000));
        assert_eq!(engine.remaining_secs(), 60);
        assert_eq!(engine.scheduler().outstanding().len(), 1);
    }

    #[test]
    fn start_while_running_is_noop() {
        let (mut engine, clock, _) = engine(60);
        engine.start();
        let deadline = engine.deadline_ms();
        let frame = engine.pending_frame();
        clock.advance_ms(2_000);
        assert!(engine.start().is_none());
        assert_eq!(engine.deadline_ms(), deadline);
        assert_eq!(engine.pending_frame(), frame);
        assert_eq!(engine.scheduler().requested(), 1);
    }

    #[test]
    fn remaining_is_derived_from_deadline_without_ticks() {
        let (mut engine, clock, _) = engine(10);
        engine.start();
        clock.advance_ms(3_500);
        assert_eq!(engine.remaining_secs(), 7);
        clock.advance_ms(500);
        assert_eq!(engine.remaining_secs(), 6);
    }

    #[test]
    fn paused_interval_does_not_count() {
        let (mut engine, clock, fired) = engine(10);
        engine.start();
        clock.advance_ms(4_000);
        engine.poll_frames();
        engine.pause();
        assert_eq!(engine.remaining_secs(), 6);

        clock.advance_ms(100_000);
        assert_eq!(engine.remaining_secs(), 6);
        assert!(engine.poll_frames().is_none());

        assert!(matches!(engine.start(), Some(Event::TimerResumed { remaining_secs: 6, .. })));
        clock.advance_ms(5_000);
        assert!(engine.poll_frames().is_none());
        assert_eq!(engine.status(), TimerStatus::Running);
        clock.advance_ms(1_000);
        assert!(engine.poll_frames().unwrap().is_completion());
        assert_eq!(engine.status(), TimerStatus::Finished);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn completion_fires_exactly_once() {
        let (mut engine, clock, fired) = engine(3);
        engine.start();
        clock.advance_ms(10_000);
        let mut completions = 0;
        for _ in 0..5 {
            if engine.poll_frames().is_some() {
                completions += 1;
            }
            clock.advance_ms(16);
        }
        assert_eq!(completions, 1);
        assert_eq!(fired.get(), 1);
        assert_eq!(engine.completions(), 1);
        assert_eq!(engine.remaining_secs(), 0);
        assert!(engine.scheduler().is_idle());
    }

    #[test]
    fn one_second_countdown_finishes_on_first_late_tick() {
        let (mut engine, clock, fired) = engine(1);
        engine.start();
        clock.advance_ms(1_100);
        let frame = engine.pending_frame().unwrap();
        assert!(engine.on_frame(frame).is_some());
        assert_eq!(engine.status(), TimerStatus::Finished);
        assert_eq!(engine.remaining_secs(), 0);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn pause_near_the_end_then_resume() {
        let (mut engine, clock, fired) = engine(60);
        engine.start();
        clock.advance_ms(59_000);
        engine.poll_frames();
        engine.pause();
        assert_eq!(engine.status(), TimerStatus::Paused);
        assert_eq!(engine.remaining_secs(), 1);

        clock.advance_ms(3_600_000);
        engine.start();
        clock.advance_ms(1_000);
        engine.poll_frames();
        assert_eq!(engine.status(), TimerStatus::Finished);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn reset_from_every_state_returns_to_idle() {
        let (mut engine, clock, _) = engine(30);

        engine.start();
        clock.advance_ms(5_000);
        engine.reset();
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.remaining_secs(), 30);
        assert!(engine.scheduler().is_idle());

        engine.start();
        clock.advance_ms(5_000);
        engine.pause();
        engine.reset();
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.remaining_secs(), 30);

        engine.start();
        clock.advance_ms(31_000);
        engine.poll_frames();
        assert_eq!(engine.status(), TimerStatus::Finished);
        engine.reset();
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.remaining_secs(), 30);
        assert!(engine.deadline_ms().is_none());
    }

    #[test]
    fn pause_when_not_running_is_noop() {
        let (mut engine, _clock, _) = engine(30);
        assert!(engine.pause().is_none());
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert!(engine.resume().is_none());
    }

    #[test]
    fn set_duration_rejects_zero() {
        let (mut engine, _clock, _) = engine(30);
        let err = engine.set_duration(0).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidDuration { seconds: 0, .. }));
        assert_eq!(engine.duration_secs(), 30);
        assert_eq!(engine.remaining_secs(), 30);
    }

    #[test]
    fn set_duration_returns_duration_changed() {
        let (mut engine, _clock, _) = engine(30);
        let event = engine.set_duration(120).unwrap();
        assert!(matches!(
            event,
            Event::DurationChanged {
                duration_secs: 120,
                ..
            }
        ));
        assert_eq!(engine.duration_secs(), 120);
    }

    #[test]
    fn set_duration_while_running_forces_idle() {
        let (mut engine, clock, fired) = engine(30);
        engine.start();
        clock.advance_ms(10_000);
        engine.set_duration(120).unwrap();
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.remaining_secs(), 120);
        assert!(engine.deadline_ms().is_none());
        assert!(engine.scheduler().is_idle());
        clock.advance_ms(200_000);
        assert!(engine.poll_frames().is_none());
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn restart_after_finish_uses_configured_duration() {
        let (mut engine, clock, fired) = engine(2);
        engine.start();
        clock.advance_ms(2_000);
        engine.poll_frames();
        assert_eq!(engine.status(), TimerStatus::Finished);

        assert!(matches!(engine.start(), Some(Event::TimerStarted { duration_secs: 2, .. })));
        assert_eq!(engine.remaining_secs(), 2);
        clock.advance_ms(2_000);
        engine.poll_frames();
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn pause_after_deadline_completes_instead() {
        let (mut engine, clock, fired) = engine(5);
        engine.start();
        clock.advance_ms(6_000);
        assert!(engine.pause().unwrap().is_completion());
        assert_eq!(engine.status(), TimerStatus::Finished);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn stale_frame_is_ignored() {
        let (mut engine, clock, _) = engine(5);
        engine.start();
        let first = engine.pending_frame().unwrap();
        engine.pause();
        engine.start();
        clock.advance_ms(10_000);
        assert!(engine.on_frame(first).is_none());
        assert_eq!(engine.status(), TimerStatus::Running);
    }

    #[test]
    fn drop_cancels_outstanding_frame() {
        let queue = Rc::new(RefCell::new(FrameQueue::new()));
        {
            let mut engine = TimerEngine::new(ManualClock::new(T0), Rc::clone(&queue));
            engine.start();
            assert_eq!(queue.borrow().outstanding().len(), 1);
        }
        assert!(queue.borrow().is_idle());
        assert_eq!(queue.borrow().cancelled(), 1);
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let (engine, _clock, _) = engine(90);
        match engine.snapshot() {
            Event::StateSnapshot {
                status,
                remaining_secs,
                duration_secs,
                progress,
                ..
            } => {
                assert_eq!(status, TimerStatus::Idle);
                assert_eq!(remaining_secs, 90);
                assert_eq!(duration_secs, 90);
                assert_eq!(progress, 1.0);
            }
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }
}
