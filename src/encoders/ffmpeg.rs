use std::collections::HashMap;
use std::path::{Path, PathBuf};
use async_trait::async_trait;
use log::{error, debug};
use serde_json::Value;
use tokio::process::Command;

use crate::composition::{Layer, RenderPlan, Rgb};
use crate::encoders::Encoder;
use crate::errors::EncoderError;

// @module: FFmpeg-backed encoder

/// Default time budget for one encode, in seconds
const DEFAULT_ENCODE_TIMEOUT_SECS: u64 = 600;

/// Time budget for a probe, in seconds
const PROBE_TIMEOUT_SECS: u64 = 60;

/// Stderr markers that identify a failure inside the subtitle/text rendering
/// path rather than the encode proper
const SUBTITLE_FAILURE_MARKERS: [&str; 6] = [
    "subtitles",
    "libass",
    "fontconfig",
    "fontselect",
    "glyph",
    "ass",
];

/// Encoder that shells out to the system ffmpeg and ffprobe binaries.
///
/// One render is one ffmpeg invocation: a color source for the background,
/// looped image inputs overlaid per animation frame, and an optional
/// subtitles filter for burned-in captions.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    timeout_secs: u64,
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegEncoder {
    pub fn new() -> Self {
        FfmpegEncoder {
            timeout_secs: DEFAULT_ENCODE_TIMEOUT_SECS,
        }
    }

    /// Override the encode time budget
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Run an ffmpeg invocation under the configured timeout
    async fn run_ffmpeg(&self, args: &[String]) -> Result<std::process::Output, EncoderError> {
        debug!("Running ffmpeg {}", args.join(" "));

        let ffmpeg_future = Command::new("ffmpeg").args(args).output();

        let timeout = std::time::Duration::from_secs(self.timeout_secs);
        let output = tokio::select! {
            result = ffmpeg_future => {
                result.map_err(|e| match e.kind() {
                    std::io::ErrorKind::NotFound => EncoderError::NotFound("ffmpeg".to_string()),
                    _ => EncoderError::Io(e),
                })?
            },
            _ = tokio::time::sleep(timeout) => {
                return Err(EncoderError::Timeout(self.timeout_secs));
            }
        };

        Ok(output)
    }
}

#[async_trait]
impl Encoder for FfmpegEncoder {
    async fn render(&self, plan: &RenderPlan, output: &Path) -> Result<(), EncoderError> {
        // The subtitles filter reads from a file, so a plan with captions
        // materializes its track to a scratch SRT for the duration of the run
        let subtitle_file = match plan.subtitle_track() {
            Some(track) => {
                let file = tempfile::Builder::new()
                    .prefix("newsreel-burn-")
                    .suffix(".srt")
                    .tempfile()?;
                std::fs::write(file.path(), track.to_srt_string())?;
                Some(file)
            }
            None => None,
        };

        let args = build_render_args(plan, subtitle_file.as_ref().map(|f| f.path()), output);
        let result = self.run_ffmpeg(&args).await?;

        // Scratch SRT is deleted when subtitle_file drops, on every path
        if result.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&result.stderr);
        let message = filter_ffmpeg_stderr(&stderr);
        error!("ffmpeg render failed: {}", message);

        Err(classify_render_failure(
            &message,
            result.status.code(),
            plan.has_subtitles(),
        ))
    }

    async fn probe_audio_duration_ms(&self, audio: &Path) -> Result<u64, EncoderError> {
        if !audio.exists() {
            return Err(EncoderError::ProbeFailed(format!(
                "audio file not found: {}",
                audio.display()
            )));
        }

        let ffprobe_future = Command::new("ffprobe")
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                audio.to_str().unwrap_or_default(),
            ])
            .output();

        let timeout = std::time::Duration::from_secs(PROBE_TIMEOUT_SECS);
        let output = tokio::select! {
            result = ffprobe_future => {
                result.map_err(|e| match e.kind() {
                    std::io::ErrorKind::NotFound => EncoderError::NotFound("ffprobe".to_string()),
                    _ => EncoderError::Io(e),
                })?
            },
            _ = tokio::time::sleep(timeout) => {
                return Err(EncoderError::Timeout(PROBE_TIMEOUT_SECS));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EncoderError::ProbeFailed(stderr.trim().to_string()));
        }

        parse_probe_duration_ms(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Extract `format.duration` (seconds) from ffprobe JSON and convert to ms
pub fn parse_probe_duration_ms(json_text: &str) -> Result<u64, EncoderError> {
    let json: Value = serde_json::from_str(json_text)
        .map_err(|e| EncoderError::ProbeFailed(format!("unparseable ffprobe output: {}", e)))?;

    let duration_secs = json
        .get("format")
        .and_then(|f| f.get("duration"))
        .and_then(|d| d.as_str())
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| EncoderError::ProbeFailed("no duration in ffprobe output".to_string()))?;

    if !duration_secs.is_finite() || duration_secs < 0.0 {
        return Err(EncoderError::ProbeFailed(format!(
            "nonsensical duration: {}",
            duration_secs
        )));
    }

    Ok((duration_secs * 1000.0).round() as u64)
}

/// Build the full ffmpeg argument list for one render
pub fn build_render_args(
    plan: &RenderPlan,
    subtitle_file: Option<&Path>,
    output: &Path,
) -> Vec<String> {
    let duration = format_secs(plan.total_duration_ms);
    let background = plan
        .layers
        .iter()
        .find_map(|layer| match layer {
            Layer::Background { color, .. } => Some(*color),
            _ => None,
        })
        .unwrap_or(Rgb::new(0, 0, 0));

    let mut args: Vec<String> = vec!["-y".into(), "-v".into(), "error".into()];

    // Input 0: solid background from a lavfi color source
    args.push("-f".into());
    args.push("lavfi".into());
    args.push("-i".into());
    args.push(format!(
        "color=c={}:s={}x{}:d={}:r={}",
        background.to_ffmpeg_hex(),
        plan.width,
        plan.height,
        duration,
        plan.fps
    ));

    // One looped input per distinct image, in first-appearance order
    let frames = plan.animation_frames().unwrap_or_default();
    let mut image_inputs: Vec<PathBuf> = Vec::new();
    let mut input_of: HashMap<PathBuf, usize> = HashMap::new();
    for frame in frames {
        if !input_of.contains_key(&frame.image.path) {
            input_of.insert(frame.image.path.clone(), image_inputs.len());
            image_inputs.push(frame.image.path.clone());
        }
    }
    for path in &image_inputs {
        args.push("-loop".into());
        args.push("1".into());
        args.push("-t".into());
        args.push(duration.clone());
        args.push("-i".into());
        args.push(path.to_string_lossy().to_string());
    }

    // Audio is the last input
    let audio_input = 1 + image_inputs.len();
    args.push("-i".into());
    args.push(plan.audio.to_string_lossy().to_string());

    args.push("-filter_complex".into());
    args.push(build_filter_graph(plan, &image_inputs, subtitle_file));

    args.push("-map".into());
    args.push("[vout]".into());
    args.push("-map".into());
    args.push(format!("{}:a", audio_input));

    args.extend(
        [
            "-c:v",
            "libx264",
            "-preset",
            "ultrafast",
            "-pix_fmt",
            "yuv420p",
            "-c:a",
            "aac",
        ]
        .map(String::from),
    );
    args.push("-r".into());
    args.push(plan.fps.to_string());
    args.push("-t".into());
    args.push(duration);

    args.push(output.to_string_lossy().to_string());
    args
}

/// Build the filter graph: per-image scaling, per-frame overlay windows, and
/// an optional subtitles filter on top
fn build_filter_graph(
    plan: &RenderPlan,
    image_inputs: &[PathBuf],
    subtitle_file: Option<&Path>,
) -> String {
    let frames = plan.animation_frames().unwrap_or_default();
    let mut steps: Vec<String> = Vec::new();

    // Scale each distinct image once and overlay it during every window it is
    // scheduled for; all frames of an image share one placement because the
    // target bounds are fixed
    let mut current = "[0:v]".to_string();
    for (idx, path) in image_inputs.iter().enumerate() {
        let mut placement = None;
        let mut windows: Vec<String> = Vec::new();
        for frame in frames.iter().filter(|frame| &frame.image.path == path) {
            placement.get_or_insert(frame.placement);
            windows.push(format!(
                "between(t,{},{})",
                format_secs(frame.start_ms),
                format_secs(frame.end_ms())
            ));
        }
        let Some(placement) = placement else { continue };

        steps.push(format!(
            "[{}:v]scale={}:{}[img{}]",
            idx + 1,
            placement.width,
            placement.height,
            idx
        ));

        let label = format!("[ov{}]", idx);
        steps.push(format!(
            "{}[img{}]overlay=x={}:y={}:enable='{}'{}",
            current,
            idx,
            placement.x,
            placement.y,
            windows.join("+"),
            label
        ));
        current = label;
    }

    // Subtitles composite last, on top of everything
    match (subtitle_file, subtitle_anchor(plan)) {
        (Some(srt), Some(anchor)) => {
            let margin_v = (f64::from(plan.height) * (1.0 - anchor)).round() as u32;
            steps.push(format!(
                "{}subtitles='{}':force_style='Alignment=2,FontSize=22,Outline=2,MarginV={}'[vout]",
                current,
                escape_filter_path(srt),
                margin_v
            ));
        }
        _ => {
            steps.push(format!("{}null[vout]", current));
        }
    }

    steps.join(";")
}

fn subtitle_anchor(plan: &RenderPlan) -> Option<f64> {
    plan.layers.iter().find_map(|layer| match layer {
        Layer::Subtitles { vertical_anchor, .. } => Some(*vertical_anchor),
        _ => None,
    })
}

/// Escape a path for use inside a single-quoted ffmpeg filter argument
pub fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "\\\\")
        .replace(':', "\\:")
        .replace('\'', "\\'")
}

/// Milliseconds to fractional seconds, as ffmpeg expects on the command line
fn format_secs(ms: u64) -> String {
    format!("{}.{:03}", ms / 1000, ms % 1000)
}

/// Decide whether a failed render is attributable to the subtitle layer.
///
/// Only plans that actually carried captions can fail there; everything else
/// is a fatal encoder failure.
pub fn classify_render_failure(
    message: &str,
    exit_code: Option<i32>,
    had_subtitles: bool,
) -> EncoderError {
    if had_subtitles {
        let lowered = message.to_lowercase();
        if SUBTITLE_FAILURE_MARKERS
            .iter()
            .any(|marker| lowered.contains(marker))
        {
            return EncoderError::SubtitleBurn(message.to_string());
        }
    }

    EncoderError::Failed {
        message: message.to_string(),
        exit_code,
    }
}

/// Filter ffmpeg stderr to only show meaningful error lines, stripping the
/// version banner, build configuration, and stream metadata noise.
pub fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let dominated_prefixes = [
        "ffmpeg version",
        "  built with",
        "  configuration:",
        "  lib",
        "Input #",
        "  Metadata:",
        "  Duration:",
        "  Stream #",
        "Output #",
        "Stream mapping:",
        "Press [q]",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return false;
            }
            !dominated_prefixes.iter().any(|p| line.starts_with(p))
        })
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}
