//! Duration choices offered to the user and validation of custom input.

use crate::error::ValidationError;

/// Preset durations in minutes.
pub const PRESET_MINUTES: [u32; 3] = [5, 10, 20];

/// Bounds for a custom duration typed by the user, in minutes.
pub const MIN_CUSTOM_MINUTES: u32 = 1;
pub const MAX_CUSTOM_MINUTES: u32 = 180;

/// Bounds the engine itself accepts, in seconds.
pub const MIN_DURATION_SECS: u64 = 1;
pub const MAX_DURATION_SECS: u64 = 24 * 60 * 60;

/// Duration a fresh engine starts with.
pub const DEFAULT_DURATION_SECS: u64 = 25 * 60;

/// Returns the preset (in minutes) matching `duration_secs`, if any.
pub fn preset_for(duration_secs: u64) -> Option<u32> {
    PRESET_MINUTES
        .iter()
        .copied()
        .find(|&m| u64::from(m) * 60 == duration_secs)
}

/// Parse a custom duration in whole minutes.
///
/// Accepts `1..=180`. Surrounding whitespace is ignored.
pub fn parse_minutes(input: &str) -> Result<u32, ValidationError> {
    let trimmed = input.trim();
    let value: i64 = trimmed
        .parse()
        .map_err(|_| ValidationError::NotANumber(trimmed.to_string()))?;
    if value < i64::from(MIN_CUSTOM_MINUTES) || value > i64::from(MAX_CUSTOM_MINUTES) {
        return Err(ValidationError::OutOfRange {
            value,
            min: MIN_CUSTOM_MINUTES,
            max: MAX_CUSTOM_MINUTES,
        });
    }
    Ok(value as u32)
}

/// Check a duration in seconds against the engine bounds.
pub fn validate_secs(seconds: u64) -> Result<u64, ValidationError> {
    if (MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&seconds) {
        Ok(seconds)
    } else {
        Err(ValidationError::InvalidDuration {
            seconds,
            min: MIN_DURATION_SECS,
            max: MAX_DURATION_SECS,
        })
    }
}
