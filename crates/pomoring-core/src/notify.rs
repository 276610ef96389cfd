//! Notification sinks invoked when a countdown finishes.
//!
//! A sink has no way to report failure back to the engine. Anything that can
//! go wrong (a missing player binary, a broken hook) is logged and dropped
//! here so the finished transition is never disturbed.

use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, warn};

/// Receives the completion notification of a countdown.
pub trait NotificationSink {
    fn notify(&mut self);
}

impl<F: FnMut()> NotificationSink for F {
    fn notify(&mut self) {
        self()
    }
}

/// Runs a shell command when the countdown finishes.
///
/// Empty commands and commands starting with `#` are treated as disabled.
/// The child gets a null stdin and stdout, so it cannot interleave with the
/// caller's output; stderr is inherited for diagnostics.
#[derive(Debug, Clone)]
pub struct HookSink {
    command: String,
}

impl HookSink {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Whether the hook would actually run anything.
    pub fn is_enabled(&self) -> bool {
        let trimmed = self.command.trim();
        !trimmed.is_empty() && !trimmed.starts_with('#')
    }
}

impl NotificationSink for HookSink {
    fn notify(&mut self) {
        if !self.is_enabled() {
            debug!(command = %self.command, "completion hook disabled");
            return;
        }
        let spawned = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .spawn();
        match spawned {
            Ok(mut child) => {
                debug!(pid = child.id(), "completion hook spawned");
                // Reap off-thread so the caller never blocks on the hook.
                thread::spawn(move || match child.wait() {
                    Ok(status) if !status.success() => {
                        warn!("completion hook exited with {status}")
                    }
                    Ok(_) => {}
                    Err(e) => warn!("failed to wait for completion hook: {e}"),
                });
            }
            Err(e) => warn!("completion hook failed to start: {e}"),
        }
    }
}

/// Forwards one notification to several sinks, in order.
#[derive(Default)]
pub struct FanOut {
    sinks: Vec<Box<dyn NotificationSink>>,
}

impl FanOut {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl NotificationSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn push(&mut self, sink: impl NotificationSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl NotificationSink for FanOut {
    fn notify(&mut self) {
        for sink in &mut self.sinks {
            sink.notify();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn commented_hook_is_disabled() {
        assert!(!HookSink::new("# afplay bell.mp3").is_enabled());
        assert!(!HookSink::new("   ").is_enabled());
        assert!(HookSink::new("true").is_enabled());
    }

    #[test]
    fn disabled_hook_notify_is_silent() {
        let mut hook = HookSink::new("");
        hook.notify();
    }

    #[test]
    fn enabled_hook_runs_without_writing_to_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("ran");
        let mut hook = HookSink::new(format!(
            "echo hook-ran; echo done > '{}'",
            marker.display()
        ));
        hook.notify();
        for _ in 0..200 {
            if marker.exists() {
                break;
            }
            thread::sleep(std::time::Duration::from_millis(10));
        }
        assert!(marker.exists());
    }

    #[test]
    fn fan_out_calls_every_sink_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let first = Rc::clone(&log);
        let second = Rc::clone(&log);
        let mut fan = FanOut::new()
            .with(move || first.borrow_mut().push("audio"))
            .with(move || second.borrow_mut().push("title"));
        assert_eq!(fan.len(), 2);
        fan.notify();
        assert_eq!(*log.borrow(), vec!["audio", "title"]);
    }
}
