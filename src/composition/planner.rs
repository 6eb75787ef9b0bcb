use std::path::{Path, PathBuf};
use anyhow::{anyhow, Result};
use log::debug;

use crate::composition::animation::AnimationFrame;
use crate::errors::ComposeError;
use crate::subtitle_track::CueTrack;

// @module: Layer composition into an ordered render plan

/// Fraction of the frame height where the subtitle baseline sits
pub const SUBTITLE_VERTICAL_ANCHOR: f64 = 0.85;

/// Solid RGB color for the background layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Parse a `#rrggbb` hex string
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(anyhow!("Invalid color: {}", hex));
        }
        Ok(Rgb {
            r: u8::from_str_radix(&digits[0..2], 16)?,
            g: u8::from_str_radix(&digits[2..4], 16)?,
            b: u8::from_str_radix(&digits[4..6], 16)?,
        })
    }

    /// Hex form understood by ffmpeg color sources (0xRRGGBB)
    pub fn to_ffmpeg_hex(self) -> String {
        format!("0x{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// One compositing layer of the timeline, bottom to top
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    /// Solid color covering the whole frame for the whole duration
    Background {
        color: Rgb,
        duration_ms: u64,
    },

    /// Gapless sequence of timed still-image placements
    Animation {
        frames: Vec<AnimationFrame>,
    },

    /// Burned-in captions anchored near the bottom of the frame
    Subtitles {
        track: CueTrack,
        /// Fraction of the frame height where the captions sit
        vertical_anchor: f64,
    },
}

/// Complete ordered description of layers and timing handed to the encoder.
///
/// Immutable once built; consumed exactly once by the render pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    /// Output frame width in pixels
    pub width: u32,
    /// Output frame height in pixels
    pub height: u32,
    /// Output frame rate
    pub fps: u32,
    /// Narration audio track
    pub audio: PathBuf,
    /// Total duration of the timeline in ms
    pub total_duration_ms: u64,
    /// Layers in compositing order, bottom first
    pub layers: Vec<Layer>,
}

impl RenderPlan {
    /// Whether the plan carries a subtitle layer
    pub fn has_subtitles(&self) -> bool {
        self.layers
            .iter()
            .any(|layer| matches!(layer, Layer::Subtitles { .. }))
    }

    /// An equivalent plan with the subtitle layer omitted (degraded render)
    pub fn without_subtitles(&self) -> RenderPlan {
        RenderPlan {
            layers: self
                .layers
                .iter()
                .filter(|layer| !matches!(layer, Layer::Subtitles { .. }))
                .cloned()
                .collect(),
            ..self.clone()
        }
    }

    /// The animation frames, when the plan has an animation layer
    pub fn animation_frames(&self) -> Option<&[AnimationFrame]> {
        self.layers.iter().find_map(|layer| match layer {
            Layer::Animation { frames } => Some(frames.as_slice()),
            _ => None,
        })
    }

    /// The subtitle track, when the plan has a subtitle layer
    pub fn subtitle_track(&self) -> Option<&CueTrack> {
        self.layers.iter().find_map(|layer| match layer {
            Layer::Subtitles { track, .. } => Some(track),
            _ => None,
        })
    }
}

/// Merges background, animation and optional subtitles into a render plan
/// with a fixed bottom-to-top layer order.
#[derive(Debug, Clone, Copy)]
pub struct CompositionPlanner {
    width: u32,
    height: u32,
    fps: u32,
}

impl CompositionPlanner {
    pub fn new(width: u32, height: u32, fps: u32) -> Self {
        CompositionPlanner { width, height, fps }
    }

    /// Build the ordered render plan for one narration.
    ///
    /// The animation frames must sum exactly to the audio duration; anything
    /// else is a caller bug and fails with `DurationMismatch`. A missing or
    /// empty cue track simply produces a plan without a subtitle layer.
    pub fn plan(
        &self,
        audio: &Path,
        audio_duration_ms: u64,
        background: Rgb,
        frames: Vec<AnimationFrame>,
        cues: Option<CueTrack>,
    ) -> Result<RenderPlan, ComposeError> {
        let covered_ms: u64 = frames.iter().map(|frame| frame.duration_ms).sum();
        if covered_ms != audio_duration_ms {
            return Err(ComposeError::DurationMismatch {
                expected_ms: audio_duration_ms,
                actual_ms: covered_ms,
            });
        }

        let mut layers = vec![
            Layer::Background {
                color: background,
                duration_ms: audio_duration_ms,
            },
            Layer::Animation { frames },
        ];

        match cues {
            Some(track) if !track.is_empty() => {
                layers.push(Layer::Subtitles {
                    track,
                    vertical_anchor: SUBTITLE_VERTICAL_ANCHOR,
                });
            }
            _ => debug!("No cues available, planning without a subtitle layer"),
        }

        Ok(RenderPlan {
            width: self.width,
            height: self.height,
            fps: self.fps,
            audio: audio.to_path_buf(),
            total_duration_ms: audio_duration_ms,
            layers,
        })
    }
}
