// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use log::{info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::app_config::{Config, Orientation};
use app_controller::{Controller, RunOptions};

mod app_config;
mod app_controller;
mod composition;
mod encoders;
mod errors;
mod file_utils;
mod narration_service;
mod render_pipeline;
mod subtitle_timing;
mod subtitle_track;
mod synthesis;

/// CLI Wrapper for Orientation to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliOrientation {
    Landscape,
    Portrait,
}

impl From<CliOrientation> for Orientation {
    fn from(cli_orientation: CliOrientation) -> Self {
        match cli_orientation {
            CliOrientation::Landscape => Orientation::Landscape,
            CliOrientation::Portrait => Orientation::Portrait,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a narrated video from a script (default command)
    #[command(alias = "generate")]
    Generate(GenerateArgs),

    /// Generate shell completions for newsreel
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Narration script file to turn into a video
    #[arg(value_name = "SCRIPT")]
    script_path: PathBuf,

    /// Directory holding anchor still images (anchor*.png)
    #[arg(short, long, default_value = "assets")]
    assets_dir: PathBuf,

    /// Directory where audio, subtitle and video artifacts are written
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Base name for the generated artifacts (defaults to a timestamped name)
    #[arg(short, long)]
    name: Option<String>,

    /// Frame orientation
    #[arg(long, value_enum)]
    orientation: Option<CliOrientation>,

    /// Voice identifier passed to the synthesis engine
    #[arg(short, long)]
    voice: Option<String>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// newsreel - narrated news video generator
///
/// Turns a narration script into a timed video: synthesized speech with
/// word-accurate subtitles, a cycling anchor animation and burned-in captions.
#[derive(Parser, Debug)]
#[command(name = "newsreel")]
#[command(version = "1.0.0")]
#[command(about = "Narration script to timed video generator")]
#[command(long_about = "newsreel synthesizes a narration script into speech, folds the \
engine's word timing into subtitles, and renders a layered video over it.

EXAMPLES:
    newsreel script.txt                         # Generate with default config
    newsreel -f script.txt                      # Force overwrite existing files
    newsreel --orientation portrait script.txt  # Vertical video for shorts
    newsreel -v en-US-AriaNeural script.txt     # Use a specific voice
    newsreel -n evening_bulletin script.txt     # Name the artifacts explicitly
    newsreel --log-level debug script.txt       # Verbose logging
    newsreel completions bash > newsreel.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Narration script file to turn into a video
    #[arg(value_name = "SCRIPT")]
    script_path: Option<PathBuf>,

    /// Directory holding anchor still images (anchor*.png)
    #[arg(short, long, default_value = "assets")]
    assets_dir: PathBuf,

    /// Directory where audio, subtitle and video artifacts are written
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Base name for the generated artifacts (defaults to a timestamped name)
    #[arg(short, long)]
    name: Option<String>,

    /// Frame orientation
    #[arg(long, value_enum)]
    orientation: Option<CliOrientation>,

    /// Voice identifier passed to the synthesis engine
    #[arg(short, long)]
    voice: Option<String>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    //
    // The logger itself accepts every level; the effective verbosity is the
    // global max level, which the config/CLI can raise later in the run.
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:5} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    // Handle subcommands
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "newsreel", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Generate(args)) => run_generate(args).await,
        None => {
            // Default behavior - use top-level args for backwards compatibility
            let script_path = cli.script_path.ok_or_else(|| {
                anyhow::anyhow!("SCRIPT is required when no subcommand is specified")
            })?;

            let generate_args = GenerateArgs {
                script_path,
                assets_dir: cli.assets_dir,
                output_dir: cli.output_dir,
                name: cli.name,
                orientation: cli.orientation,
                voice: cli.voice,
                force_overwrite: cli.force_overwrite,
                config_path: cli.config_path,
                log_level: cli.log_level,
            };
            run_generate(generate_args).await
        }
    }
}

async fn run_generate(options: GenerateArgs) -> Result<()> {
    // Load the config, creating a default one on first run
    let mut config = if file_utils::FileManager::file_exists(&options.config_path) {
        Config::from_file(&options.config_path)?
    } else {
        info!("No config found, writing defaults to {}", options.config_path);
        let config = Config::default();
        config.save(&options.config_path)?;
        config
    };

    // Command line overrides take precedence over the config file
    if let Some(orientation) = options.orientation {
        config.video.orientation = orientation.into();
    }
    if let Some(voice) = options.voice {
        config.narration.voice = voice;
    }
    if let Some(log_level) = options.log_level {
        let level: app_config::LogLevel = log_level.into();
        config.log_level = level;
    }
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;
    let run_options = RunOptions {
        script_path: options.script_path,
        assets_dir: options.assets_dir,
        output_dir: options.output_dir,
        base_name: options.name,
        force_overwrite: options.force_overwrite,
    };

    controller.run(run_options).await?;
    Ok(())
}
