//! Text a presentation layer shows for engine values.

use crate::timer::TimerStatus;

const APP_TITLE: &str = "Pomodoro Timer";

/// `MM:SS`, zero padded. Minutes are not wrapped into hours.
pub fn format_clock(remaining_secs: u64) -> String {
    format!("{:02}:{:02}", remaining_secs / 60, remaining_secs % 60)
}

pub fn status_label(status: TimerStatus) -> &'static str {
    match status {
        TimerStatus::Idle => "Ready",
        TimerStatus::Running => "Running",
        TimerStatus::Paused => "Paused",
        TimerStatus::Finished => "Time's Up",
    }
}

/// Window or terminal title for the current state.
pub fn window_title(remaining_secs: u64, status: TimerStatus) -> String {
    if status == TimerStatus::Finished {
        format!("Time's Up! - {APP_TITLE}")
    } else {
        format!("{} - {APP_TITLE}", format_clock(remaining_secs))
    }
}

/// Text stand-in for the progress ring. `progress` is the fraction left.
pub fn progress_bar(progress: f64, width: usize) -> String {
    let elapsed = (1.0 - progress.clamp(0.0, 1.0)) * width as f64;
    let filled = (elapsed.round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}
