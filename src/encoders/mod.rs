/*!
 * Video encoder collaborators.
 *
 * This module contains the seam between the composition core and the engine
 * that actually encodes video:
 * - `ffmpeg`: drives the system ffmpeg/ffprobe binaries
 * - `mock`: scripted encoders for testing
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::path::Path;

use crate::composition::RenderPlan;
use crate::errors::EncoderError;

/// Common trait for all video encoders
///
/// Implementations must classify failures: a failure attributable to the
/// subtitle layer is reported as `EncoderError::SubtitleBurn` so the render
/// pipeline can retry without that layer; every other failure is fatal.
#[async_trait]
pub trait Encoder: Send + Sync + Debug {
    /// Render a plan into the given output file
    ///
    /// # Arguments
    /// * `plan` - The layered timeline to encode
    /// * `output` - Where the encoded file is written
    async fn render(&self, plan: &RenderPlan, output: &Path) -> Result<(), EncoderError>;

    /// Measure the duration of an audio resource in milliseconds
    async fn probe_audio_duration_ms(&self, audio: &Path) -> Result<u64, EncoderError>;
}

pub mod ffmpeg;
pub mod mock;
