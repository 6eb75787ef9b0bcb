/*!
 * Mock encoders for testing.
 *
 * This module provides scripted encoders that simulate different behaviors:
 * - `MockEncoder::working()` - Always produces an output file
 * - `MockEncoder::subtitle_failing()` - Fails any plan carrying captions
 * - `MockEncoder::failing()` - Always fails fatally
 */

use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::composition::RenderPlan;
use crate::encoders::Encoder;
use crate::errors::EncoderError;

/// Behavior mode for the mock encoder
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockEncoderBehavior {
    /// Always succeeds and writes a marker output
    Working,
    /// Leaves a partial output and reports a subtitle-layer failure whenever
    /// the plan carries captions; succeeds on caption-free plans
    SubtitleFailing,
    /// Always fails with a fatal error, leaving a partial output behind
    Failing,
}

/// Mock encoder that records every plan it is asked to render
#[derive(Debug, Clone)]
pub struct MockEncoder {
    behavior: MockEncoderBehavior,
    audio_duration_ms: u64,
    rendered: Arc<Mutex<Vec<RenderPlan>>>,
}

impl MockEncoder {
    pub fn new(behavior: MockEncoderBehavior) -> Self {
        MockEncoder {
            behavior,
            audio_duration_ms: 10_000,
            rendered: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Encoder that always succeeds
    pub fn working() -> Self {
        Self::new(MockEncoderBehavior::Working)
    }

    /// Encoder whose subtitle layer always fails
    pub fn subtitle_failing() -> Self {
        Self::new(MockEncoderBehavior::SubtitleFailing)
    }

    /// Encoder that always fails fatally
    pub fn failing() -> Self {
        Self::new(MockEncoderBehavior::Failing)
    }

    /// Set the duration reported for any probed audio file
    pub fn with_audio_duration(mut self, ms: u64) -> Self {
        self.audio_duration_ms = ms;
        self
    }

    /// Plans received so far, in call order
    pub fn rendered_plans(&self) -> Vec<RenderPlan> {
        self.rendered.lock().unwrap().clone()
    }

    /// Number of render calls received
    pub fn render_count(&self) -> usize {
        self.rendered.lock().unwrap().len()
    }
}

#[async_trait]
impl Encoder for MockEncoder {
    async fn render(&self, plan: &RenderPlan, output: &Path) -> Result<(), EncoderError> {
        self.rendered.lock().unwrap().push(plan.clone());

        match self.behavior {
            MockEncoderBehavior::Working => {
                std::fs::write(output, b"mock-video")?;
                Ok(())
            }
            MockEncoderBehavior::SubtitleFailing => {
                if plan.has_subtitles() {
                    // A real encoder can die partway through the file
                    std::fs::write(output, b"partial")?;
                    Err(EncoderError::SubtitleBurn(
                        "fontselect: failed to find any fallback".to_string(),
                    ))
                } else {
                    std::fs::write(output, b"mock-video-degraded")?;
                    Ok(())
                }
            }
            MockEncoderBehavior::Failing => {
                std::fs::write(output, b"partial")?;
                Err(EncoderError::Failed {
                    message: "mock encoder configured to fail".to_string(),
                    exit_code: Some(1),
                })
            }
        }
    }

    async fn probe_audio_duration_ms(&self, _audio: &Path) -> Result<u64, EncoderError> {
        Ok(self.audio_duration_ms)
    }
}
