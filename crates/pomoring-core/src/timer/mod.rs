mod engine;
mod frames;

pub use engine::{TimerEngine, TimerStatus};
pub use frames::{FrameId, FrameQueue, FrameScheduler};
