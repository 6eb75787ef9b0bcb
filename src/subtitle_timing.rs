use log::debug;

use crate::errors::TimingError;
use crate::subtitle_track::{Cue, CueTrack};

// @module: Streaming boundary events and cue aggregation

/// Assumed reading rate for untimed narration, in words per minute
const WORDS_PER_MINUTE: u64 = 150;

/// Kind of timing marker emitted by a speech synthesis engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryKind {
    /// Marks one spoken word
    Word,
    /// Marks one spoken sentence
    Sentence,
}

// @struct: One timing marker from a synthesis stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryEvent {
    // @field: Word or sentence marker
    pub kind: BoundaryKind,

    // @field: Spoken text the marker covers
    pub text: String,

    // @field: Offset from the start of the audio, in ms
    pub offset_ms: u64,

    // @field: Spoken span of the text, in ms
    pub duration_ms: u64,
}

impl BoundaryEvent {
    pub fn new(kind: BoundaryKind, text: impl Into<String>, offset_ms: u64, duration_ms: u64) -> Self {
        BoundaryEvent {
            kind,
            text: text.into(),
            offset_ms,
            duration_ms,
        }
    }
}

/// Folds a live sequence of boundary events into finalized subtitle cues.
///
/// Events arrive in synthesis order with non-decreasing offsets. Each event
/// with non-empty text becomes one cue; when a new event starts before the
/// previous cue ends, the previous cue is clamped so the later event wins the
/// boundary. The result is always ordered and non-overlapping.
#[derive(Debug, Default)]
pub struct CueAggregator {
    cues: Vec<Cue>,
    finalized: bool,
}

impl CueAggregator {
    pub fn new() -> Self {
        CueAggregator {
            cues: Vec::new(),
            finalized: false,
        }
    }

    /// Number of cues accumulated so far
    pub fn cue_count(&self) -> usize {
        self.cues.len()
    }

    /// Accept the next boundary event from the stream.
    ///
    /// Events with empty or whitespace-only text are dropped so no zero-width
    /// cue is ever emitted.
    pub fn feed(&mut self, event: BoundaryEvent) -> Result<(), TimingError> {
        if self.finalized {
            return Err(TimingError::InvalidState);
        }

        let text = event.text.trim();
        if text.is_empty() {
            debug!("Dropping empty boundary event at {}ms", event.offset_ms);
            return Ok(());
        }

        let mut start_ms = event.offset_ms;
        let mut end_ms = event.offset_ms + event.duration_ms;

        if let Some(last) = self.cues.last_mut() {
            if start_ms >= last.start_ms {
                // Later events win the boundary over local synthesis jitter
                if last.end_ms > start_ms {
                    debug!(
                        "Clamping cue end {}ms -> {}ms to keep cues non-overlapping",
                        last.end_ms, start_ms
                    );
                    last.end_ms = start_ms;
                }
            } else {
                // An event reaching back before the previous cue cannot
                // rewrite already-emitted boundaries; it is pushed forward
                debug!(
                    "Reordering event at {}ms past the previous cue ({}ms)",
                    start_ms, last.end_ms
                );
                start_ms = last.end_ms;
            }
            if end_ms < start_ms {
                end_ms = start_ms;
            }
        }

        self.cues.push(Cue::new(start_ms, end_ms, text.to_string()));
        Ok(())
    }

    /// Close the aggregation and return the immutable cue track.
    ///
    /// After this call the aggregator accepts no further events; feeding or
    /// finalizing again fails with `InvalidState`.
    pub fn finalize(&mut self) -> Result<CueTrack, TimingError> {
        if self.finalized {
            return Err(TimingError::InvalidState);
        }
        self.finalized = true;

        let track = CueTrack::from_cues(std::mem::take(&mut self.cues));
        debug_assert!(track.is_monotonic());
        Ok(track)
    }
}

/// Derives a single coarse cue from word count when no timed boundary events
/// are available (synthesis fallback).
pub struct DurationEstimator;

impl DurationEstimator {
    /// Estimate one cue spanning the whole text at an assumed reading rate of
    /// 150 words per minute, rounded down to whole seconds.
    pub fn estimate(text: &str) -> Cue {
        let words = text.split_whitespace().count() as u64;
        let duration_secs = words * 60 / WORDS_PER_MINUTE;

        Cue::new(0, duration_secs * 1_000, text.trim().to_string())
    }
}
