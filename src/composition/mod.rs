/*!
 * Visual timeline composition.
 *
 * This module turns a measured audio duration into a layered render plan:
 * - `animation`: schedules still images into a gapless, exactly-covering
 *   sequence of timed frames, with per-image fit-and-center placement
 * - `planner`: merges background, animation and optional subtitles into an
 *   ordered render plan consumed by the render pipeline
 */

pub mod animation;
pub mod planner;

// Re-export main types
pub use animation::{AnimationFrame, AnimationScheduler, Placement, StillImage};
pub use planner::{CompositionPlanner, Layer, RenderPlan, Rgb};
