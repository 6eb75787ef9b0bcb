use anyhow::{Result, Context};
use log::{warn, info, debug};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use indicatif::{ProgressBar, ProgressStyle};

use crate::app_config::{Config, SynthesisWire, SynthesizerConfig};
use crate::composition::{AnimationScheduler, CompositionPlanner, Rgb, StillImage};
use crate::encoders::Encoder;
use crate::encoders::ffmpeg::FfmpegEncoder;
use crate::file_utils::FileManager;
use crate::narration_service::NarrationService;
use crate::render_pipeline::RenderPipeline;
use crate::subtitle_track::CueTrack;
use crate::synthesis::process::ProcessSynthesizer;

// @module: Application controller for video generation

/// Options for one generation run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Narration script file
    pub script_path: PathBuf,

    /// Directory holding the anchor still images
    pub assets_dir: PathBuf,

    /// Directory where artifacts are written
    pub output_dir: PathBuf,

    /// Base name for artifacts; a timestamped name is derived when absent
    pub base_name: Option<String>,

    /// Overwrite an existing final video
    pub force_overwrite: bool,
}

/// Main application controller for narration video generation
pub struct Controller {
    // @field: App configuration
    config: Config,
    narration: NarrationService,
    encoder: Arc<dyn Encoder>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let narration = build_narration_service(&config);
        let encoder: Arc<dyn Encoder> =
            Arc::new(FfmpegEncoder::new().with_timeout(config.video.encode_timeout_secs));

        Ok(Self {
            config,
            narration,
            encoder,
        })
    }

    /// Create a controller with injected collaborators - used by tests
    pub fn with_collaborators(
        config: Config,
        narration: NarrationService,
        encoder: Arc<dyn Encoder>,
    ) -> Self {
        Self {
            config,
            narration,
            encoder,
        }
    }

    /// Run the full generation workflow: narrate, schedule, compose, render.
    ///
    /// Returns the path of the final video artifact.
    pub async fn run(&self, options: RunOptions) -> Result<PathBuf> {
        let start_time = std::time::Instant::now();

        let script = FileManager::read_to_string(&options.script_path)?;
        if script.trim().is_empty() {
            return Err(anyhow::anyhow!("Script file is empty: {:?}", options.script_path));
        }

        let base_name = options
            .base_name
            .clone()
            .unwrap_or_else(|| FileManager::timestamped_base_name("news"));

        FileManager::ensure_dir(&options.output_dir)?;
        let video_path = options.output_dir.join(format!("{}.mp4", base_name));
        if video_path.exists() && !options.force_overwrite {
            warn!("Skipping run, video already exists (use -f to force overwrite): {}", video_path.display());
            return Ok(video_path);
        }

        // Narration: audio plus persisted subtitle artifact
        let audio_path = options.output_dir.join(format!("{}.mp3", base_name));
        let spinner = stage_spinner("Synthesizing narration...");
        let artifacts = self.narration.narrate(&script, &audio_path).await?;
        spinner.finish_with_message(format!(
            "Narration ready: {} cues ({})",
            artifacts.track.len(),
            if artifacts.timed { "timed" } else { "estimated" }
        ));

        // The measured audio duration drives the whole visual timeline
        let audio_duration_ms = self
            .encoder
            .probe_audio_duration_ms(&artifacts.audio_path)
            .await
            .context("Failed to measure narration duration")?;
        if audio_duration_ms == 0 {
            return Err(anyhow::anyhow!("Narration audio has zero duration"));
        }
        debug!("Narration lasts {}ms", audio_duration_ms);

        let plan = self.compose(&artifacts.audio_path, &artifacts.subtitle_path, audio_duration_ms, &options)?;

        let spinner = stage_spinner("Rendering video...");
        let pipeline = RenderPipeline::new(Arc::clone(&self.encoder));
        let outcome = pipeline.render(plan, &video_path).await?;
        spinner.finish_with_message(if outcome.captions_burned {
            "Render complete"
        } else {
            "Render complete (captions omitted)"
        });

        info!(
            "Generated {} in {}",
            outcome.path.display(),
            format_duration(start_time.elapsed())
        );
        Ok(outcome.path)
    }

    /// Build the layered render plan from the persisted artifacts
    fn compose(
        &self,
        audio_path: &Path,
        subtitle_path: &Path,
        audio_duration_ms: u64,
        options: &RunOptions,
    ) -> Result<crate::composition::RenderPlan> {
        let (width, height) = self.config.video.orientation.dimensions();

        let image_paths = FileManager::find_anchor_images(&options.assets_dir)?;
        if image_paths.is_empty() {
            return Err(anyhow::anyhow!(
                "No anchor images found in {:?} (expected anchor*.png)",
                options.assets_dir
            ));
        }
        info!("Found {} anchor image(s)", image_paths.len());

        let images = image_paths
            .iter()
            .map(|path| StillImage::open(path).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;

        let scheduler = AnimationScheduler::new(width, height);
        let frames = scheduler.schedule(&images, audio_duration_ms, self.config.video.frame_duration_ms)?;

        // Burn-in reads the persisted artifact back, the same file other
        // tools consume
        let cues = match CueTrack::from_srt_file(subtitle_path) {
            Ok(track) => Some(track),
            Err(e) => {
                warn!("Could not reload subtitles, rendering without captions: {}", e);
                None
            }
        };

        let background = Rgb::from_hex(&self.config.video.background_color)?;
        let planner = CompositionPlanner::new(width, height, self.config.video.fps);
        let plan = planner.plan(audio_path, audio_duration_ms, background, frames, cues)?;
        Ok(plan)
    }
}

/// Build the narration service described by the configuration
fn build_narration_service(config: &Config) -> NarrationService {
    let primary = synthesizer_from_config(&config.narration.primary);
    let mut service = NarrationService::new(primary, config.narration.voice.clone());

    if let Some(fallback) = &config.narration.fallback {
        service = service.with_fallback(synthesizer_from_config(fallback));
    }

    service
}

fn synthesizer_from_config(config: &SynthesizerConfig) -> Box<ProcessSynthesizer> {
    let synthesizer = match config.wire {
        SynthesisWire::Streaming => {
            ProcessSynthesizer::streaming(config.command.clone(), config.args.clone())
        }
        SynthesisWire::Raw => ProcessSynthesizer::raw(config.command.clone(), config.args.clone()),
    };
    Box::new(synthesizer)
}

fn stage_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Format a duration for the completion summary
fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;

    if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}.{}s", seconds, duration.subsec_millis() / 100)
    }
}
