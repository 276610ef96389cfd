//! Terminal rendering for `pomoring run`.

use std::io::{self, Write};

use pomoring_core::display::{format_clock, progress_bar, status_label, window_title};
use pomoring_core::{Clock, Event, FrameScheduler, TimerEngine};
use tracing::warn;

const BAR_WIDTH: usize = 20;

pub struct Screen {
    json: bool,
    set_title: bool,
    last_line: String,
    last_title: String,
}

impl Screen {
    pub fn new(json: bool, set_title: bool) -> Self {
        Self {
            json,
            set_title,
            last_line: String::new(),
            last_title: String::new(),
        }
    }

    /// Redraw the countdown line. Only writes when the text changed.
    pub fn render<C: Clock, S: FrameScheduler>(&mut self, engine: &TimerEngine<C, S>) -> io::Result<()> {
        if self.json {
            return Ok(());
        }
        let remaining = engine.remaining_secs();
        let status = engine.status();
        let line = format!(
            "{}  {:<9} [{}]",
            format_clock(remaining),
            status_label(status),
            progress_bar(engine.progress(), BAR_WIDTH)
        );
        let title = window_title(remaining, status);

        let mut out = io::stdout().lock();
        if self.set_title && title != self.last_title {
            write!(out, "\x1b]0;{title}\x07")?;
            self.last_title = title;
        }
        if line != self.last_line {
            write!(out, "\r\x1b[2K{line}")?;
            self.last_line = line;
        }
        out.flush()
    }

    /// Report an engine event.
    pub fn event(&mut self, event: &Event) -> io::Result<()> {
        if self.json {
            let line = serde_json::to_string(event).map_err(io::Error::other)?;
            let mut out = io::stdout().lock();
            writeln!(out, "{line}")?;
            return out.flush();
        }
        if event.is_completion() {
            self.notice("Time's up!")?;
        }
        Ok(())
    }

    /// Print a message on its own line and force the countdown to redraw.
    pub fn notice(&mut self, message: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        if self.json {
            writeln!(out, "{}", serde_json::json!({ "type": "Notice", "message": message }))?;
        } else {
            writeln!(out, "\r\x1b[2K{message}")?;
            self.last_line.clear();
        }
        out.flush()
    }

    /// Leave the cursor on a fresh line.
    pub fn finish(&mut self) -> io::Result<()> {
        if !self.json && !self.last_line.is_empty() {
            let mut out = io::stdout().lock();
            writeln!(out)?;
            out.flush()?;
        }
        Ok(())
    }
}

/// Completion sink: terminal bell.
pub fn ring_bell() {
    let mut out = io::stdout().lock();
    if let Err(e) = out.write_all(b"\x07").and_then(|_| out.flush()) {
        warn!("failed to ring terminal bell: {e}");
    }
}
