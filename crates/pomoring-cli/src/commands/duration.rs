use clap::Subcommand;
use pomoring_core::duration::{parse_minutes, preset_for, PRESET_MINUTES};
use pomoring_core::Config;
use serde_json::json;

#[derive(Subcommand)]
pub enum DurationAction {
    /// Show the duration the next countdown starts with
    Show,
    /// Remember a custom duration (1-180 minutes)
    Set {
        /// Minutes
        #[arg(allow_hyphen_values = true)]
        minutes: String,
    },
    /// Forget the custom duration and fall back to the default
    Clear,
    /// List preset durations
    Presets,
}

pub fn run(action: DurationAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        DurationAction::Show => {
            let config = Config::load()?;
            let secs = config.initial_duration_secs();
            let out = json!({
                "default_duration_min": config.timer.default_duration_min,
                "custom_duration_min": config.timer.custom_duration_min,
                "duration_secs": secs,
                "preset": preset_for(secs),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        DurationAction::Set { minutes } => {
            let minutes = parse_minutes(&minutes)?;
            let mut config = Config::load()?;
            config.remember_custom_duration(minutes)?;
            config.save()?;
            println!("custom duration set to {minutes} min");
        }
        DurationAction::Clear => {
            let mut config = Config::load()?;
            config.clear_custom_duration();
            config.save()?;
            println!(
                "custom duration cleared, default is {} min",
                config.timer.default_duration_min
            );
        }
        DurationAction::Presets => {
            for minutes in PRESET_MINUTES {
                println!("{minutes} min");
            }
        }
    }
    Ok(())
}
