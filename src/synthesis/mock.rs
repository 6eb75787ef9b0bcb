/*!
 * Mock synthesizers for testing.
 *
 * This module provides scripted synthesis engines that simulate different
 * behaviors:
 * - `MockSynthesizer::timed()` - audio plus per-word boundary events
 * - `MockSynthesizer::audio_only()` - audio with no timing information
 * - `MockSynthesizer::empty()` - a stream that ends without any chunks
 * - `MockSynthesizer::failing()` - refuses to start at all
 */

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use crate::errors::SynthesisError;
use crate::subtitle_timing::{BoundaryEvent, BoundaryKind};
use crate::synthesis::{SpeechSynthesizer, SynthesisChunk, SynthesisStream};

/// Behavior mode for the mock synthesizer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockSynthesisBehavior {
    /// Emits audio and a word boundary per whitespace-separated word
    Timed {
        /// Spoken span allotted to each word
        ms_per_word: u64,
    },
    /// Emits audio only, as an untimed fallback engine would
    AudioOnly,
    /// Stream opens and then closes without delivering anything
    Empty,
    /// Always fails to start
    Failing,
}

/// Mock synthesis engine with scripted behavior
#[derive(Debug, Clone)]
pub struct MockSynthesizer {
    behavior: MockSynthesisBehavior,
    /// Bytes delivered as the audio payload
    audio_payload: Bytes,
}

impl MockSynthesizer {
    pub fn new(behavior: MockSynthesisBehavior) -> Self {
        MockSynthesizer {
            behavior,
            audio_payload: Bytes::from_static(b"mock-audio-payload"),
        }
    }

    /// Engine that times every word at 400ms
    pub fn timed() -> Self {
        Self::new(MockSynthesisBehavior::Timed { ms_per_word: 400 })
    }

    /// Engine that times every word at the given rate
    pub fn timed_at(ms_per_word: u64) -> Self {
        Self::new(MockSynthesisBehavior::Timed { ms_per_word })
    }

    /// Untimed engine, like a plain text-to-speech fallback
    pub fn audio_only() -> Self {
        Self::new(MockSynthesisBehavior::AudioOnly)
    }

    /// Engine whose stream closes without chunks
    pub fn empty() -> Self {
        Self::new(MockSynthesisBehavior::Empty)
    }

    /// Engine that cannot be reached
    pub fn failing() -> Self {
        Self::new(MockSynthesisBehavior::Failing)
    }

    /// Override the audio payload delivered by this mock
    pub fn with_audio_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.audio_payload = payload.into();
        self
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    fn provides_boundaries(&self) -> bool {
        matches!(self.behavior, MockSynthesisBehavior::Timed { .. })
    }

    async fn synthesize(&self, text: &str, _voice: &str) -> Result<SynthesisStream, SynthesisError> {
        let (tx, rx) = mpsc::channel(64);

        match self.behavior {
            MockSynthesisBehavior::Failing => {
                return Err(SynthesisError::Unavailable("mock engine configured to fail".to_string()));
            }
            MockSynthesisBehavior::Empty => {
                // Drop tx immediately; the consumer sees a closed, empty stream
            }
            MockSynthesisBehavior::AudioOnly => {
                let payload = self.audio_payload.clone();
                tokio::spawn(async move {
                    let _ = tx.send(SynthesisChunk::Audio(payload)).await;
                });
            }
            MockSynthesisBehavior::Timed { ms_per_word } => {
                let payload = self.audio_payload.clone();
                let words: Vec<String> = text.split_whitespace().map(str::to_string).collect();
                tokio::spawn(async move {
                    if tx.send(SynthesisChunk::Audio(payload)).await.is_err() {
                        return;
                    }
                    for (i, word) in words.iter().enumerate() {
                        let event = BoundaryEvent::new(
                            BoundaryKind::Word,
                            word.clone(),
                            i as u64 * ms_per_word,
                            ms_per_word,
                        );
                        if tx.send(SynthesisChunk::Boundary(event)).await.is_err() {
                            return;
                        }
                    }
                });
            }
        }

        Ok(rx)
    }
}
