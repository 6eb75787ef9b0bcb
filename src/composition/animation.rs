use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::{Result, Context};
use log::debug;

use crate::errors::ScheduleError;

// @module: Still image scheduling for the animation layer

// @struct: Reference to one still image plus its natural pixel dimensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StillImage {
    // @field: Image file location
    pub path: PathBuf,

    // @field: Natural width in pixels
    pub width: u32,

    // @field: Natural height in pixels
    pub height: u32,
}

impl StillImage {
    pub fn new(path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        StillImage {
            path: path.into(),
            width,
            height,
        }
    }

    /// Read an image header from disk to learn its natural dimensions
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let (width, height) = image::image_dimensions(path)
            .with_context(|| format!("Failed to read image dimensions: {}", path.display()))?;
        Ok(StillImage::new(path, width, height))
    }
}

/// Aspect-ratio-preserving fit of an image inside the frame, centered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Scaled width in pixels
    pub width: u32,
    /// Scaled height in pixels
    pub height: u32,
    /// Horizontal offset of the top-left corner within the frame
    pub x: u32,
    /// Vertical offset of the top-left corner within the frame
    pub y: u32,
}

// @struct: One still image shown for a bounded span of the timeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationFrame {
    // @field: Image shown during this frame
    pub image: Arc<StillImage>,

    // @field: Frame start in ms from the beginning of the timeline
    pub start_ms: u64,

    // @field: Frame duration in ms
    pub duration_ms: u64,

    // @field: Scaled, centered placement within the target frame bounds
    pub placement: Placement,
}

impl AnimationFrame {
    /// Frame end in ms; equals the next frame's start in a gapless sequence
    pub fn end_ms(&self) -> u64 {
        self.start_ms + self.duration_ms
    }
}

/// Schedules a finite set of still images into a timed sequence that covers a
/// target duration exactly, cycling through the images in order.
#[derive(Debug, Clone, Copy)]
pub struct AnimationScheduler {
    frame_width: u32,
    frame_height: u32,
}

impl AnimationScheduler {
    /// Create a scheduler targeting the given frame bounds
    pub fn new(frame_width: u32, frame_height: u32) -> Self {
        AnimationScheduler {
            frame_width,
            frame_height,
        }
    }

    /// Compute the fit-and-center placement of an image within the frame
    pub fn placement_for(&self, image: &StillImage) -> Placement {
        fit_within(image, self.frame_width, self.frame_height)
    }

    /// Produce a gapless, ordered frame sequence covering `total_duration_ms`
    /// exactly.
    ///
    /// A single image yields one frame spanning the whole duration. With more
    /// images the scheduler cycles through them in order, each frame lasting
    /// `frame_duration_ms` except the last, which is clamped so the sequence
    /// terminates exactly at the target with no gap and no overrun.
    pub fn schedule(
        &self,
        images: &[Arc<StillImage>],
        total_duration_ms: u64,
        frame_duration_ms: u64,
    ) -> Result<Vec<AnimationFrame>, ScheduleError> {
        if images.is_empty() {
            return Err(ScheduleError::NoContent);
        }
        if total_duration_ms == 0 {
            return Err(ScheduleError::InvalidDuration(total_duration_ms));
        }

        if images.len() == 1 {
            return Ok(vec![AnimationFrame {
                image: Arc::clone(&images[0]),
                start_ms: 0,
                duration_ms: total_duration_ms,
                placement: self.placement_for(&images[0]),
            }]);
        }

        // A zero frame duration would never advance the clock
        if frame_duration_ms == 0 {
            return Err(ScheduleError::InvalidDuration(frame_duration_ms));
        }

        let mut frames = Vec::new();
        let mut elapsed_ms = 0;
        let mut next_image = 0;

        while elapsed_ms < total_duration_ms {
            let image = &images[next_image];
            let remaining_ms = total_duration_ms - elapsed_ms;
            let duration_ms = frame_duration_ms.min(remaining_ms);

            frames.push(AnimationFrame {
                image: Arc::clone(image),
                start_ms: elapsed_ms,
                duration_ms,
                placement: self.placement_for(image),
            });

            elapsed_ms += duration_ms;
            next_image = (next_image + 1) % images.len();
        }

        debug!(
            "Scheduled {} animation frames over {}ms from {} images",
            frames.len(),
            total_duration_ms,
            images.len()
        );

        Ok(frames)
    }
}

/// Scale an image to fit within the given bounds, preserving aspect ratio,
/// and center it.
pub fn fit_within(image: &StillImage, frame_width: u32, frame_height: u32) -> Placement {
    // Degenerate sources occupy no space rather than dividing by zero
    if image.width == 0 || image.height == 0 {
        return Placement {
            width: 0,
            height: 0,
            x: frame_width / 2,
            y: frame_height / 2,
        };
    }

    let width_ratio = f64::from(frame_width) / f64::from(image.width);
    let height_ratio = f64::from(frame_height) / f64::from(image.height);
    let scale = width_ratio.min(height_ratio);

    let width = ((f64::from(image.width) * scale).round() as u32).min(frame_width);
    let height = ((f64::from(image.height) * scale).round() as u32).min(frame_height);

    Placement {
        width,
        height,
        x: (frame_width - width) / 2,
        y: (frame_height - height) / 2,
    }
}
