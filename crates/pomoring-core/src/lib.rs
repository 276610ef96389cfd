//! # Pomoring Core Library
//!
//! This library provides the core logic for the Pomoring countdown timer.
//! Presentation layers (the `pomoring` terminal front end, or any GUI) own a
//! [`TimerEngine`], forward user intents into it and render what it reports.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based state machine. It keeps an absolute
//!   deadline while running and recomputes the remaining seconds from it on
//!   every frame, so scheduling jitter never turns into drift
//! - **Frames**: The engine owns at most one outstanding frame request and
//!   cancels it on pause, reset and drop
//! - **Notifications**: Sinks invoked exactly once when a countdown finishes
//! - **Storage**: TOML-based configuration, including the remembered custom
//!   duration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core countdown state machine
//! - [`Clock`]: Wall-clock source ([`SystemClock`], [`ManualClock`])
//! - [`FrameScheduler`]: Scheduling primitive ([`FrameQueue`])
//! - [`NotificationSink`]: Completion callback
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod display;
pub mod duration;
pub mod error;
pub mod events;
pub mod notify;
pub mod storage;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use notify::{FanOut, HookSink, NotificationSink};
pub use storage::Config;
pub use timer::{FrameId, FrameQueue, FrameScheduler, TimerEngine, TimerStatus};
