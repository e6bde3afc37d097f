//! vx: run a provably-fair session from the command line, or audit one.

mod play;
mod replay;

use std::path::PathBuf;

use clap::Parser;
use vx_session::SessionConfig;
use vx_utils::LogFormat;

#[derive(Parser)]
#[command(name = "vx", about = "Provably-fair sessions with an external signing oracle")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "VX_CONFIG")]
    config: Option<PathBuf>,

    /// Log output: "human" or "json".
    #[arg(long, env = "VX_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "VX_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Play a non-interactive session and reveal it.
    Play(play::PlayArgs),
    /// Re-verify settled sessions from an audit log.
    Replay(replay::ReplayArgs),
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SessionConfig::from_toml_file(path)?,
        None => SessionConfig::default(),
    };
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    vx_utils::init_logging(config.log_format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!(path = %path.display(), "loaded config");
    }

    match cli.command {
        Command::Play(args) => play::run(config, args).await,
        Command::Replay(args) => replay::run(&config, args),
        Command::Config => {
            print!("{}", config.to_toml_string());
            Ok(())
        }
    }
}
