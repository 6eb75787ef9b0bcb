/*!
 * # newsreel - narrated news video generator
 *
 * A Rust library for turning a narration script into a timed video.
 *
 * ## Features
 *
 * - Fold streaming word/sentence boundary events into monotonic subtitle cues
 * - Serialize and parse cues in the SRT interchange format
 * - Estimate a coarse cue span from word count when timing is unavailable
 * - Schedule cycling anchor images into a gapless animation timeline
 * - Compose background, animation and subtitle layers into a render plan
 * - Render through ffmpeg with graceful caption degradation
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_timing`: Boundary events, cue aggregation and estimation
 * - `subtitle_track`: Cue track model and SRT codec
 * - `composition`: Visual timeline assembly:
 *   - `composition::animation`: Still image scheduling
 *   - `composition::planner`: Layer composition into a render plan
 * - `synthesis`: Speech synthesis collaborators:
 *   - `synthesis::process`: External synthesis command adapter
 *   - `synthesis::mock`: Scripted engines for testing
 * - `encoders`: Video encoder collaborators:
 *   - `encoders::ffmpeg`: System ffmpeg/ffprobe adapter
 *   - `encoders::mock`: Scripted encoders for testing
 * - `narration_service`: Synthesis stream capture with fallback
 * - `render_pipeline`: Render submission and caption degradation
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod composition;
pub mod encoders;
pub mod errors;
pub mod file_utils;
pub mod narration_service;
pub mod render_pipeline;
pub mod subtitle_timing;
pub mod subtitle_track;
pub mod synthesis;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunOptions};
pub use composition::{AnimationScheduler, CompositionPlanner, RenderPlan};
pub use narration_service::NarrationService;
pub use render_pipeline::RenderPipeline;
pub use subtitle_timing::{BoundaryEvent, BoundaryKind, CueAggregator, DurationEstimator};
pub use subtitle_track::{Cue, CueTrack};
pub use errors::{AppError, ComposeError, EncoderError, RenderError, ScheduleError, SynthesisError, TimingError};
