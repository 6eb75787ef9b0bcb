use anyhow::{anyhow, Result, Context};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;

use crate::composition::Rgb;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Narration / synthesis settings
    #[serde(default)]
    pub narration: NarrationConfig,

    /// Video composition settings
    #[serde(default)]
    pub video: VideoConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Output frame orientation
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    // @variant: 1920x1080, regular uploads
    #[default]
    Landscape,
    // @variant: 1080x1920, shorts/reels
    Portrait,
}

impl Orientation {
    // @returns: Frame dimensions (width, height) in pixels
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Landscape => (1920, 1080),
            Self::Portrait => (1080, 1920),
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Landscape => write!(f, "landscape"),
            Self::Portrait => write!(f, "portrait"),
        }
    }
}

impl std::str::FromStr for Orientation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "landscape" => Ok(Self::Landscape),
            "portrait" => Ok(Self::Portrait),
            _ => Err(anyhow!("Invalid orientation: {}", s)),
        }
    }
}

/// How a synthesis engine delivers its output
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisWire {
    /// Newline-delimited JSON records with audio and boundary events
    #[default]
    Streaming,
    /// Raw encoded audio on stdout, no timing information
    Raw,
}

/// External synthesis engine invocation
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SynthesizerConfig {
    // @field: Wire format on the engine's stdout
    #[serde(rename = "type", default)]
    pub wire: SynthesisWire,

    // @field: Program to run
    pub command: String,

    // @field: Arguments; {text} and {voice} are substituted per request
    #[serde(default)]
    pub args: Vec<String>,
}

/// Narration settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NarrationConfig {
    /// Voice identifier passed to the synthesis engine.
    ///
    /// Known-good neural voices:
    /// - en-IN-NeerjaNeural (female Indian English)
    /// - en-IN-PrabhatNeural (male Indian English)
    /// - en-US-AriaNeural (female US English)
    /// - en-US-GuyNeural (male US English)
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Primary engine, expected to emit timed boundary records
    #[serde(default = "default_primary_synthesizer")]
    pub primary: SynthesizerConfig,

    /// Optional untimed fallback engine used when the primary fails
    #[serde(default = "default_fallback_synthesizer")]
    pub fallback: Option<SynthesizerConfig>,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            voice: default_voice(),
            primary: default_primary_synthesizer(),
            fallback: default_fallback_synthesizer(),
        }
    }
}

/// Video composition settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VideoConfig {
    /// Frame orientation
    #[serde(default)]
    pub orientation: Orientation,

    /// Output frame rate
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// How long each anchor image stays on screen while cycling, in ms
    #[serde(default = "default_frame_duration_ms")]
    pub frame_duration_ms: u64,

    /// Background color as #rrggbb
    #[serde(default = "default_background_color")]
    pub background_color: String,

    /// Encode time budget in seconds
    #[serde(default = "default_encode_timeout_secs")]
    pub encode_timeout_secs: u64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::default(),
            fps: default_fps(),
            frame_duration_ms: default_frame_duration_ms(),
            background_color: default_background_color(),
            encode_timeout_secs: default_encode_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: log crate filter for this level
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_voice() -> String {
    "en-IN-NeerjaNeural".to_string()
}

fn default_primary_synthesizer() -> SynthesizerConfig {
    SynthesizerConfig {
        wire: SynthesisWire::Streaming,
        command: "edge-tts-stream".to_string(),
        args: vec![
            "--voice".to_string(),
            "{voice}".to_string(),
            "--text".to_string(),
            "{text}".to_string(),
        ],
    }
}

fn default_fallback_synthesizer() -> Option<SynthesizerConfig> {
    Some(SynthesizerConfig {
        wire: SynthesisWire::Raw,
        command: "gtts-cli".to_string(),
        args: vec!["{text}".to_string()],
    })
}

fn default_fps() -> u32 {
    24
}

fn default_frame_duration_ms() -> u64 {
    300
}

fn default_background_color() -> String {
    // Dark studio blue
    "#141E32".to_string()
}

fn default_encode_timeout_secs() -> u64 {
    600
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.narration.voice.trim().is_empty() {
            return Err(anyhow!("Narration voice must not be empty"));
        }
        if self.narration.primary.command.trim().is_empty() {
            return Err(anyhow!("Primary synthesizer command must not be empty"));
        }
        if self.video.fps == 0 {
            return Err(anyhow!("Frame rate must be positive"));
        }
        if self.video.frame_duration_ms == 0 {
            return Err(anyhow!("Frame duration must be positive"));
        }

        // Surface a bad color at startup rather than at render time
        Rgb::from_hex(&self.video.background_color)
            .with_context(|| format!("Invalid background color: {}", self.video.background_color))?;

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            narration: NarrationConfig::default(),
            video: VideoConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
