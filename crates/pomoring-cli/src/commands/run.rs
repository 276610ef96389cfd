//! `pomoring run`: the interactive countdown.
//!
//! A tokio interval stands in for the display refresh. Each tick polls the
//! engine's frame queue; the engine recomputes the remaining time from its
//! deadline, so a late or skipped tick only delays the redraw.

use std::time::Duration;

use clap::Args;
use pomoring_core::duration::{parse_minutes, validate_secs, PRESET_MINUTES};
use pomoring_core::storage::NotificationsConfig;
use pomoring_core::{
    Config, Event, FanOut, FrameQueue, HookSink, SystemClock, TimerEngine, TimerStatus,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::intent::{self, Intent};
use crate::screen::{ring_bell, Screen};

type Engine = TimerEngine<SystemClock, FrameQueue>;

#[derive(Args)]
pub struct RunArgs {
    /// Countdown length in minutes (1-180)
    #[arg(long, short, conflicts_with_all = ["preset", "seconds"])]
    minutes: Option<String>,
    /// Use a preset length: 5, 10 or 20 minutes
    #[arg(long, value_parser = parse_preset, conflicts_with = "seconds")]
    preset: Option<u32>,
    /// Countdown length in seconds
    #[arg(long)]
    seconds: Option<u64>,
    /// Start counting immediately
    #[arg(long)]
    start: bool,
    /// Exit once the countdown finishes
    #[arg(long)]
    exit_on_finish: bool,
    /// Print engine events as JSON lines instead of drawing the countdown
    #[arg(long)]
    json: bool,
}

fn parse_preset(value: &str) -> Result<u32, String> {
    let minutes: u32 = value.parse().map_err(|_| "Enter a number".to_string())?;
    if PRESET_MINUTES.contains(&minutes) {
        Ok(minutes)
    } else {
        Err(format!("presets are {PRESET_MINUTES:?} minutes"))
    }
}

fn initial_duration(args: &RunArgs, config: &Config) -> Result<u64, Box<dyn std::error::Error>> {
    if let Some(minutes) = &args.minutes {
        return Ok(u64::from(parse_minutes(minutes)?) * 60);
    }
    if let Some(minutes) = args.preset {
        return Ok(u64::from(minutes) * 60);
    }
    if let Some(seconds) = args.seconds {
        return Ok(validate_secs(seconds)?);
    }
    Ok(config.initial_duration_secs())
}

fn completion_sink(config: &NotificationsConfig, json: bool) -> FanOut {
    let mut sinks = FanOut::new();
    if !config.enabled {
        return sinks;
    }
    if config.bell && !json {
        sinks.push(ring_bell);
    }
    if let Some(hook) = &config.hook {
        sinks.push(HookSink::new(hook.clone()));
    }
    sinks
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load_or_default();
    let duration_secs = initial_duration(&args, &config)?;
    let sink = completion_sink(&config.notifications, args.json);
    if sink.is_empty() {
        debug!("completion notifications disabled");
    }
    let engine = TimerEngine::with_duration(duration_secs, SystemClock, FrameQueue::new())?
        .with_sink(sink);
    let screen = Screen::new(args.json, config.notifications.title && !args.json);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(drive(engine, screen, &mut config, &args))
}

async fn drive(
    mut engine: Engine,
    mut screen: Screen,
    config: &mut Config,
    args: &RunArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut frames = tokio::time::interval(Duration::from_millis(config.timer.frame_interval_ms));
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    if args.json {
        screen.event(&engine.snapshot())?;
    } else {
        screen.notice(intent::HELP)?;
    }
    if args.start {
        if let Some(event) = engine.start() {
            screen.event(&event)?;
        }
    }
    screen.render(&engine)?;

    loop {
        tokio::select! {
            _ = frames.tick() => {
                if let Some(event) = engine.poll_frames() {
                    screen.render(&engine)?;
                    screen.event(&event)?;
                    if args.exit_on_finish || !stdin_open {
                        break;
                    }
                }
                screen.render(&engine)?;
            }
            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(line) => match intent::parse(&line) {
                        Ok(Intent::Quit) => break,
                        Ok(intent) => apply(&mut engine, &mut screen, config, intent)?,
                        Err(e) => screen.notice(&e.to_string())?,
                    },
                    None => {
                        debug!("stdin closed");
                        stdin_open = false;
                        if engine.status() != TimerStatus::Running {
                            break;
                        }
                    }
                }
                screen.render(&engine)?;
            }
            _ = &mut ctrl_c => {
                info!("interrupted");
                break;
            }
        }
    }

    screen.finish()?;
    Ok(())
}

fn apply(
    engine: &mut Engine,
    screen: &mut Screen,
    config: &mut Config,
    intent: Intent,
) -> Result<(), Box<dyn std::error::Error>> {
    let event: Option<Event> = match intent {
        Intent::Toggle if engine.status() == TimerStatus::Running => engine.pause(),
        Intent::Toggle | Intent::Start => engine.start(),
        Intent::Pause => engine.pause(),
        Intent::Reset => engine.reset(),
        Intent::SetMinutes(minutes) => {
            if matches!(engine.status(), TimerStatus::Running | TimerStatus::Paused) {
                screen.notice("reset first to change the duration")?;
                return Ok(());
            }
            let event = engine.set_duration(u64::from(minutes) * 60)?;
            if !PRESET_MINUTES.contains(&minutes) {
                config.remember_custom_duration(minutes)?;
                config.save()?;
            }
            Some(event)
        }
        Intent::Help => {
            screen.notice(intent::HELP)?;
            None
        }
        Intent::Quit => None,
    };
    if let Some(event) = event {
        screen.event(&event)?;
    }
    Ok(())
}
