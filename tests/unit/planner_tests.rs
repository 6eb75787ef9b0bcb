/*!
 * Tests for the composition planner and render plan
 */

use std::path::Path;
use newsreel::composition::{CompositionPlanner, Layer, Rgb};
use newsreel::errors::ComposeError;
use crate::common;

const STUDIO_BLUE: Rgb = Rgb::new(0x14, 0x1E, 0x32);

/// Test the fixed bottom-to-top layer order with captions present
#[test]
fn test_plan_withCues_shouldOrderLayersBackgroundAnimationSubtitles() {
    let planner = CompositionPlanner::new(1920, 1080, 24);
    let frames = common::frames_covering(5_000);

    let plan = planner
        .plan(Path::new("news.mp3"), 5_000, STUDIO_BLUE, frames, Some(common::sample_track()))
        .unwrap();

    assert_eq!(plan.layers.len(), 3);
    assert!(matches!(plan.layers[0], Layer::Background { .. }));
    assert!(matches!(plan.layers[1], Layer::Animation { .. }));
    assert!(matches!(plan.layers[2], Layer::Subtitles { .. }));
    assert_eq!(plan.total_duration_ms, 5_000);
    assert!(plan.has_subtitles());
}

/// Test that the background layer spans the whole duration
#[test]
fn test_plan_withValidInput_shouldSpanBackgroundOverFullDuration() {
    let planner = CompositionPlanner::new(1920, 1080, 24);
    let frames = common::frames_covering(7_500);

    let plan = planner
        .plan(Path::new("news.mp3"), 7_500, STUDIO_BLUE, frames, None)
        .unwrap();

    match &plan.layers[0] {
        Layer::Background { color, duration_ms } => {
            assert_eq!(*color, STUDIO_BLUE);
            assert_eq!(*duration_ms, 7_500);
        }
        other => panic!("expected background layer, got {:?}", other),
    }
}

/// Test that a missing or empty cue track produces a plan without captions,
/// not an error
#[test]
fn test_plan_withoutCues_shouldOmitSubtitleLayer() {
    let planner = CompositionPlanner::new(1920, 1080, 24);

    let plan = planner
        .plan(Path::new("news.mp3"), 5_000, STUDIO_BLUE, common::frames_covering(5_000), None)
        .unwrap();
    assert_eq!(plan.layers.len(), 2);
    assert!(!plan.has_subtitles());

    let plan = planner
        .plan(
            Path::new("news.mp3"),
            5_000,
            STUDIO_BLUE,
            common::frames_covering(5_000),
            Some(newsreel::subtitle_track::CueTrack::new()),
        )
        .unwrap();
    assert!(!plan.has_subtitles());
}

/// Test the duration invariant: frames must sum exactly to the audio duration
#[test]
fn test_plan_withMismatchedFrames_shouldFailWithDurationMismatch() {
    let planner = CompositionPlanner::new(1920, 1080, 24);
    let frames = common::frames_covering(4_999);

    let result = planner.plan(Path::new("news.mp3"), 5_000, STUDIO_BLUE, frames, None);
    match result {
        Err(ComposeError::DurationMismatch { expected_ms, actual_ms }) => {
            assert_eq!(expected_ms, 5_000);
            assert_eq!(actual_ms, 4_999);
        }
        other => panic!("expected DurationMismatch, got {:?}", other),
    }
}

/// Test stripping the subtitle layer for a degraded render
#[test]
fn test_without_subtitles_withCaptionedPlan_shouldDropOnlyThatLayer() {
    let planner = CompositionPlanner::new(1920, 1080, 24);
    let plan = planner
        .plan(
            Path::new("news.mp3"),
            5_000,
            STUDIO_BLUE,
            common::frames_covering(5_000),
            Some(common::sample_track()),
        )
        .unwrap();

    let degraded = plan.without_subtitles();
    assert!(!degraded.has_subtitles());
    assert_eq!(degraded.layers.len(), 2);
    assert_eq!(degraded.total_duration_ms, plan.total_duration_ms);
    assert_eq!(degraded.audio, plan.audio);
    // The original plan is untouched
    assert!(plan.has_subtitles());
}

/// Test color parsing and the ffmpeg hex form
#[test]
fn test_rgb_fromHex_withValidColor_shouldRoundTripToFfmpegHex() {
    let color = Rgb::from_hex("#141E32").unwrap();
    assert_eq!(color, STUDIO_BLUE);
    assert_eq!(color.to_ffmpeg_hex(), "0x141E32");

    // The leading # is optional
    assert_eq!(Rgb::from_hex("ffffff").unwrap(), Rgb::new(255, 255, 255));
}

/// Test color parsing rejection
#[test]
fn test_rgb_fromHex_withMalformedColor_shouldFail() {
    assert!(Rgb::from_hex("#12345").is_err());
    assert!(Rgb::from_hex("#12345G").is_err());
    assert!(Rgb::from_hex("").is_err());
}
