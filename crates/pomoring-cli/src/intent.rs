//! User intents typed on stdin during `pomoring run`.

use pomoring_core::duration::{parse_minutes, PRESET_MINUTES};
use pomoring_core::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Empty line: start when stopped, pause when running.
    Toggle,
    Start,
    Pause,
    Reset,
    SetMinutes(u32),
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
pub enum IntentError {
    Unknown(String),
    MissingMinutes,
    Invalid(ValidationError),
}

impl std::fmt::Display for IntentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntentError::Unknown(cmd) => write!(f, "unknown command '{cmd}', type h for help"),
            IntentError::MissingMinutes => write!(f, "usage: d <minutes>"),
            IntentError::Invalid(e) => write!(f, "{e}"),
        }
    }
}

pub const HELP: &str =
    "enter: start/pause  s: start  p: pause  r: reset  d <min>: set duration  1-3: preset  q: quit";

pub fn parse(line: &str) -> Result<Intent, IntentError> {
    let mut words = line.split_whitespace();
    let Some(cmd) = words.next() else {
        return Ok(Intent::Toggle);
    };
    match cmd.to_ascii_lowercase().as_str() {
        "s" | "start" | "resume" => Ok(Intent::Start),
        "p" | "pause" => Ok(Intent::Pause),
        "r" | "reset" => Ok(Intent::Reset),
        "q" | "quit" | "exit" => Ok(Intent::Quit),
        "h" | "help" | "?" => Ok(Intent::Help),
        "d" | "duration" => {
            let arg = words.next().ok_or(IntentError::MissingMinutes)?;
            parse_minutes(arg)
                .map(Intent::SetMinutes)
                .map_err(IntentError::Invalid)
        }
        "1" | "2" | "3" => {
            let index = cmd.parse::<usize>().unwrap_or(1) - 1;
            Ok(Intent::SetMinutes(PRESET_MINUTES[index]))
        }
        other => Err(IntentError::Unknown(other.to_string())),
    }
}
