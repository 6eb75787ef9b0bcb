/*!
 * Error types for the newsreel application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors raised by the cue aggregation state machine
#[derive(Error, Debug)]
pub enum TimingError {
    /// Error when feeding events into an aggregator that was already finalized
    #[error("Aggregator already finalized, no further events accepted")]
    InvalidState,
}

/// Errors raised by the animation scheduler
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// Error when no images were supplied to schedule
    #[error("No images available to schedule")]
    NoContent,

    /// Error when the requested timeline duration is not positive
    #[error("Invalid timeline duration: {0}ms")]
    InvalidDuration(u64),
}

/// Errors raised by the composition planner
#[derive(Error, Debug)]
pub enum ComposeError {
    /// Error when animation frames do not cover the audio duration exactly
    #[error("Animation frames cover {actual_ms}ms but the audio lasts {expected_ms}ms")]
    DurationMismatch {
        /// Audio duration the plan must cover
        expected_ms: u64,
        /// Sum of the supplied frame durations
        actual_ms: u64,
    },
}

/// Errors that can occur when talking to a speech synthesis engine
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// Error when the engine could not be started at all
    #[error("Synthesis engine unavailable: {0}")]
    Unavailable(String),

    /// Error when the stream ended without delivering any audio
    #[error("No audio received from synthesis engine")]
    NoAudioReceived,

    /// Error when the engine terminated mid-stream
    #[error("Synthesis stream failed: {0}")]
    StreamFailed(String),

    /// Error from an underlying I/O operation
    #[error("Synthesis I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reported by the video encoder collaborator
#[derive(Error, Debug)]
pub enum EncoderError {
    /// Error when the encoder binary is not installed
    #[error("Encoder not found: {0}")]
    NotFound(String),

    /// Recoverable failure attributable to the subtitle layer (text rendering,
    /// fonts); callers may retry without that layer
    #[error("Subtitle burn-in failed: {0}")]
    SubtitleBurn(String),

    /// Fatal encoder failure outside the subtitle layer
    #[error("Encoder failed: {message}")]
    Failed {
        /// Filtered error output
        message: String,
        /// Process exit code when available
        exit_code: Option<i32>,
    },

    /// Error probing a media resource
    #[error("Probe failed: {0}")]
    ProbeFailed(String),

    /// Error when the encoder exceeded its time budget
    #[error("Encoder timed out after {0} seconds")]
    Timeout(u64),

    /// Error from an underlying I/O operation
    #[error("Encoder I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EncoderError {
    /// True when a retry without the subtitle layer can succeed
    pub fn is_subtitle_failure(&self) -> bool {
        matches!(self, Self::SubtitleBurn(_))
    }
}

/// Errors surfaced by the render pipeline
#[derive(Error, Debug)]
pub enum RenderError {
    /// Fatal failure: the encoder could not produce a video at all
    #[error("Render failed: {0}")]
    RenderFailed(String),

    /// Error from an underlying I/O operation on the staged artifact
    #[error("Render I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from cue aggregation
    #[error("Timing error: {0}")]
    Timing(#[from] TimingError),

    /// Error from animation scheduling
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    /// Error from composition planning
    #[error("Compose error: {0}")]
    Compose(#[from] ComposeError),

    /// Error from speech synthesis
    #[error("Synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    /// Error from the encoder
    #[error("Encoder error: {0}")]
    Encoder(#[from] EncoderError),

    /// Error from rendering
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
