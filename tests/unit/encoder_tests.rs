/*!
 * Tests for ffmpeg argument building and failure classification
 */

use std::path::Path;
use newsreel::composition::{CompositionPlanner, Rgb};
use newsreel::encoders::ffmpeg::{
    build_render_args, classify_render_failure, escape_filter_path, filter_ffmpeg_stderr,
    parse_probe_duration_ms,
};
use newsreel::errors::EncoderError;
use crate::common;

fn captioned_plan() -> newsreel::composition::RenderPlan {
    CompositionPlanner::new(1920, 1080, 24)
        .plan(
            Path::new("news.mp3"),
            1_000,
            Rgb::new(0x14, 0x1E, 0x32),
            common::frames_covering(1_000),
            Some(common::sample_track()),
        )
        .unwrap()
}

/// Test the overall shape of a render invocation
#[test]
fn test_build_render_args_withCaptionedPlan_shouldDescribeAllLayers() {
    let plan = captioned_plan();
    let args = build_render_args(&plan, Some(Path::new("/tmp/burn.srt")), Path::new("out.mp4"));
    let joined = args.join(" ");

    // Background color source with dimensions, duration and frame rate
    assert!(joined.contains("color=c=0x141E32:s=1920x1080:d=1.000:r=24"));

    // One looped input per distinct image plus the audio input
    assert_eq!(args.iter().filter(|a| a.as_str() == "-loop").count(), 2);
    assert!(joined.contains("-i news.mp3"));

    // Overlay windows are gated on the frame schedule
    assert!(joined.contains("between(t,0.000,0.300)"));
    assert!(joined.contains("scale="));

    // Captions ride on top and the output goes last
    assert!(joined.contains("subtitles="));
    assert!(joined.contains("Alignment=2"));
    assert_eq!(args.last().unwrap(), "out.mp4");

    // Mapped video label and the audio stream after the image inputs
    assert!(args.contains(&"[vout]".to_string()));
    assert!(args.contains(&"3:a".to_string()));
}

/// Test that a caption-free plan gets no subtitles filter
#[test]
fn test_build_render_args_withoutCaptions_shouldOmitSubtitlesFilter() {
    let plan = captioned_plan().without_subtitles();
    let args = build_render_args(&plan, None, Path::new("out.mp4"));
    let joined = args.join(" ");

    assert!(!joined.contains("subtitles="));
}

/// Test the subtitle margin derived from the 85% vertical anchor
#[test]
fn test_build_render_args_withCaptionedPlan_shouldAnchorCaptionsNearBottom() {
    let plan = captioned_plan();
    let args = build_render_args(&plan, Some(Path::new("/tmp/burn.srt")), Path::new("out.mp4"));
    let joined = args.join(" ");

    // 1080 * (1 - 0.85) = 162
    assert!(joined.contains("MarginV=162"));
}

/// Test subtitle-layer failure classification
#[test]
fn test_classify_render_failure_withFontError_shouldBeSubtitleBurn() {
    let error = classify_render_failure("fontselect: failed to find any fallback", Some(1), true);
    assert!(matches!(error, EncoderError::SubtitleBurn(_)));

    let error = classify_render_failure("Error initializing libass", Some(1), true);
    assert!(matches!(error, EncoderError::SubtitleBurn(_)));
}

/// Test that subtitle markers are fatal when no captions were requested
#[test]
fn test_classify_render_failure_withoutCaptions_shouldBeFatal() {
    let error = classify_render_failure("fontconfig: no usable font", Some(1), false);
    assert!(matches!(error, EncoderError::Failed { .. }));
}

/// Test that unrelated errors stay fatal with their exit code
#[test]
fn test_classify_render_failure_withGenericError_shouldBeFatal() {
    let error = classify_render_failure("Invalid data found when processing input", Some(183), true);
    match error {
        EncoderError::Failed { exit_code, .. } => assert_eq!(exit_code, Some(183)),
        other => panic!("expected Failed, got {:?}", other),
    }
}

/// Test stderr noise filtering
#[test]
fn test_filter_ffmpeg_stderr_withBannerNoise_shouldKeepOnlyErrors() {
    let stderr = "ffmpeg version 6.0 Copyright\n  built with gcc\n  configuration: --enable-gpl\nInput #0, lavfi, from 'color':\n  Duration: N/A\nreal error line\n";
    assert_eq!(filter_ffmpeg_stderr(stderr), "real error line");
}

/// Test the empty-after-filtering fallback message
#[test]
fn test_filter_ffmpeg_stderr_withOnlyNoise_shouldExplainEmptiness() {
    let stderr = "ffmpeg version 6.0\nStream mapping:\n";
    assert!(filter_ffmpeg_stderr(stderr).contains("stderr was empty after filtering"));
}

/// Test ffprobe duration extraction
#[test]
fn test_parse_probe_duration_withValidJson_shouldConvertToMs() {
    let json = r#"{"format": {"duration": "12.345", "format_name": "mp3"}}"#;
    assert_eq!(parse_probe_duration_ms(json).unwrap(), 12_345);
}

/// Test ffprobe output without a duration
#[test]
fn test_parse_probe_duration_withMissingDuration_shouldFail() {
    let json = r#"{"format": {"format_name": "mp3"}}"#;
    assert!(matches!(parse_probe_duration_ms(json), Err(EncoderError::ProbeFailed(_))));

    assert!(parse_probe_duration_ms("not json").is_err());
}

/// Test filter path escaping for the subtitles filter
#[test]
fn test_escape_filter_path_withSpecialCharacters_shouldEscapeThem() {
    let escaped = escape_filter_path(Path::new("/tmp/it's:here.srt"));
    assert_eq!(escaped, "/tmp/it\\'s\\:here.srt");
}
