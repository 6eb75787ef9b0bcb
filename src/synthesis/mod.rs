/*!
 * Speech synthesis collaborators.
 *
 * This module defines the seam between the timing core and whatever engine
 * actually produces speech. A synthesizer delivers an ordered stream of
 * chunks over a single-producer single-consumer channel: opaque audio bytes,
 * interleaved with word/sentence boundary events when the engine can time
 * them.
 *
 * - `process`: adapter around an external synthesis command
 * - `mock`: scripted synthesizers for testing
 */

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Debug;
use tokio::sync::mpsc;

use crate::errors::SynthesisError;
use crate::subtitle_timing::BoundaryEvent;

/// One record of a synthesis stream, in arrival order
#[derive(Debug, Clone)]
pub enum SynthesisChunk {
    /// Opaque encoded audio bytes, passed through untouched to the artifact
    Audio(Bytes),

    /// Word or sentence timing marker
    Boundary(BoundaryEvent),
}

/// Receiving end of a synthesis stream
pub type SynthesisStream = mpsc::Receiver<SynthesisChunk>;

/// Common trait for all speech synthesis engines
///
/// Implementations push chunks into the returned channel from a producer
/// task; the consumer suspends waiting for the next chunk and the channel
/// closes when the stream is complete.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync + Debug {
    /// Whether this engine emits word/sentence boundary events.
    ///
    /// Engines that cannot time their output still produce audio; callers
    /// then derive cue timing from text instead.
    fn provides_boundaries(&self) -> bool;

    /// Start synthesizing the text and return the chunk stream
    async fn synthesize(&self, text: &str, voice: &str) -> Result<SynthesisStream, SynthesisError>;
}

pub mod process;
pub mod mock;
