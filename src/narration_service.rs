use std::path::{Path, PathBuf};
use anyhow::{anyhow, Result, Context};
use log::{warn, info, debug};
use tokio::io::AsyncWriteExt;

use crate::errors::SynthesisError;
use crate::subtitle_timing::{CueAggregator, DurationEstimator};
use crate::subtitle_track::CueTrack;
use crate::synthesis::{SpeechSynthesizer, SynthesisChunk};

// @module: Narration synthesis and cue capture

/// Artifacts produced for one narration
#[derive(Debug, Clone)]
pub struct NarrationArtifacts {
    /// Encoded audio file (`<name>.mp3`)
    pub audio_path: PathBuf,

    /// Subtitle file next to the audio (`<name>.srt`)
    pub subtitle_path: PathBuf,

    /// The finalized cue track that was persisted
    pub track: CueTrack,

    /// True when cues came from timed boundary events; false when the track
    /// was estimated from word count
    pub timed: bool,
}

/// Drives a speech synthesizer and captures its output.
///
/// Audio chunks are appended to the audio artifact while boundary events are
/// folded into subtitle cues. When the primary engine fails, or delivers no
/// usable timing, the service degrades: audio comes from the fallback engine
/// (when configured) and the cue track from a coarse word-count estimate.
#[derive(Debug)]
pub struct NarrationService {
    primary: Box<dyn SpeechSynthesizer>,
    fallback: Option<Box<dyn SpeechSynthesizer>>,
    voice: String,
}

impl NarrationService {
    pub fn new(primary: Box<dyn SpeechSynthesizer>, voice: impl Into<String>) -> Self {
        NarrationService {
            primary,
            fallback: None,
            voice: voice.into(),
        }
    }

    /// Configure an untimed fallback engine
    pub fn with_fallback(mut self, fallback: Box<dyn SpeechSynthesizer>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Synthesize the text into `audio_path` and write the cue track to the
    /// sibling `.srt` file.
    pub async fn narrate(&self, text: &str, audio_path: &Path) -> Result<NarrationArtifacts> {
        if text.trim().is_empty() {
            return Err(anyhow!("Narration text is empty"));
        }
        let subtitle_path = audio_path.with_extension("srt");

        let (track, timed) = match self.capture_stream(self.primary.as_ref(), text, audio_path).await {
            Ok(track) if !track.is_empty() => (track, true),
            Ok(_) => {
                warn!("Synthesis delivered no timed boundary events, estimating a single cue");
                (estimated_track(text), false)
            }
            Err(e) => {
                warn!("Primary synthesis failed: {}", e);
                let fallback = self
                    .fallback
                    .as_ref()
                    .ok_or_else(|| anyhow!("Synthesis failed and no fallback engine is configured: {}", e))?;

                info!("Falling back to untimed synthesis engine");
                self.capture_stream(fallback.as_ref(), text, audio_path)
                    .await
                    .context("Fallback synthesis failed")?;
                (estimated_track(text), false)
            }
        };

        track
            .write_to_srt(&subtitle_path)
            .with_context(|| format!("Failed to write subtitles: {}", subtitle_path.display()))?;
        debug!("Wrote {} cues to {}", track.len(), subtitle_path.display());

        Ok(NarrationArtifacts {
            audio_path: audio_path.to_path_buf(),
            subtitle_path,
            track,
            timed,
        })
    }

    /// Consume one synthesis stream: audio bytes go to a staged file that is
    /// promoted on completion, boundary events go to the aggregator.
    async fn capture_stream(
        &self,
        engine: &dyn SpeechSynthesizer,
        text: &str,
        audio_path: &Path,
    ) -> Result<CueTrack, SynthesisError> {
        let mut stream = engine.synthesize(text, &self.voice).await?;

        if let Some(parent) = audio_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let staged = staged_audio_path(audio_path);
        let mut file = tokio::fs::File::create(&staged).await?;

        let mut aggregator = CueAggregator::new();
        let mut received_audio = false;

        let pump = async {
            while let Some(chunk) = stream.recv().await {
                match chunk {
                    SynthesisChunk::Audio(bytes) => {
                        file.write_all(&bytes).await?;
                        received_audio = true;
                    }
                    SynthesisChunk::Boundary(event) => {
                        if let Err(e) = aggregator.feed(event) {
                            warn!("Dropping boundary event: {}", e);
                        }
                    }
                }
            }
            file.flush().await?;
            Ok::<(), std::io::Error>(())
        };

        if let Err(e) = pump.await {
            let _ = tokio::fs::remove_file(&staged).await;
            return Err(SynthesisError::Io(e));
        }
        drop(file);

        if !received_audio {
            let _ = tokio::fs::remove_file(&staged).await;
            return Err(SynthesisError::NoAudioReceived);
        }

        tokio::fs::rename(&staged, audio_path).await?;

        aggregator
            .finalize()
            .map_err(|e| SynthesisError::StreamFailed(e.to_string()))
    }
}

/// Single-cue track derived from word count
fn estimated_track(text: &str) -> CueTrack {
    CueTrack::from_cues(vec![DurationEstimator::estimate(text)])
}

/// Staging name for an in-progress audio artifact
fn staged_audio_path(audio_path: &Path) -> PathBuf {
    let file_name = audio_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "narration.mp3".to_string());
    audio_path.with_file_name(format!("{}.part", file_name))
}
