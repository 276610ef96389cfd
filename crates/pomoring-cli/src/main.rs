use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod intent;
mod screen;

#[derive(Parser)]
#[command(name = "pomoring", version, about = "Pomoring countdown timer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive countdown
    Run(commands::run::RunArgs),
    /// Remembered custom duration and presets
    Duration {
        #[command(subcommand)]
        action: commands::duration::DurationAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Duration { action } => commands::duration::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
