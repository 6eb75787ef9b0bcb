/*!
 * Integration tests for render submission and caption degradation
 */

use std::path::Path;
use std::sync::Arc;
use anyhow::Result;

use newsreel::composition::{CompositionPlanner, RenderPlan, Rgb};
use newsreel::encoders::mock::MockEncoder;
use newsreel::errors::RenderError;
use newsreel::render_pipeline::{staging_path, RenderPipeline};
use crate::common;

fn plan_with_captions(total_ms: u64) -> RenderPlan {
    CompositionPlanner::new(1920, 1080, 24)
        .plan(
            Path::new("news.mp3"),
            total_ms,
            Rgb::new(0x14, 0x1E, 0x32),
            common::frames_covering(total_ms),
            Some(common::sample_track()),
        )
        .unwrap()
}

/// Test the happy path: one encode, promoted to the final name
#[tokio::test]
async fn test_render_withWorkingEncoder_shouldPromoteToFinalName() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let final_path = temp_dir.path().join("bulletin.mp4");

    let encoder = MockEncoder::working();
    let pipeline = RenderPipeline::new(Arc::new(encoder.clone()));

    let outcome = pipeline.render(plan_with_captions(3_000), &final_path).await?;

    assert!(outcome.captions_burned);
    assert_eq!(outcome.path, final_path);
    assert_eq!(std::fs::read(&final_path)?, b"mock-video");
    assert_eq!(encoder.render_count(), 1);
    assert!(!staging_path(&final_path).exists(), "staging artifact must be promoted away");
    Ok(())
}

/// Test graceful degradation: a subtitle-layer failure retries once without
/// captions and no intermediate artifact survives
#[tokio::test]
async fn test_render_withSubtitleBurnFailure_shouldRetryWithoutCaptions() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let final_path = temp_dir.path().join("bulletin.mp4");

    let encoder = MockEncoder::subtitle_failing();
    let pipeline = RenderPipeline::new(Arc::new(encoder.clone()));

    let outcome = pipeline.render(plan_with_captions(3_000), &final_path).await?;

    assert!(!outcome.captions_burned);
    assert_eq!(std::fs::read(&final_path)?, b"mock-video-degraded");
    assert!(!staging_path(&final_path).exists(), "no intermediate file may remain");

    // Exactly two attempts: full, then an equivalent plan minus captions
    let plans = encoder.rendered_plans();
    assert_eq!(plans.len(), 2);
    assert!(plans[0].has_subtitles());
    assert!(!plans[1].has_subtitles());
    assert_eq!(plans[0].total_duration_ms, plans[1].total_duration_ms);
    assert_eq!(plans[0].layers.len() - 1, plans[1].layers.len());
    Ok(())
}

/// Test that a caption-free plan is unaffected by a subtitle-hostile encoder
#[tokio::test]
async fn test_render_withoutCaptions_shouldSucceedFirstTry() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let final_path = temp_dir.path().join("bulletin.mp4");

    let encoder = MockEncoder::subtitle_failing();
    let pipeline = RenderPipeline::new(Arc::new(encoder.clone()));

    let plan = plan_with_captions(3_000).without_subtitles();
    let outcome = pipeline.render(plan, &final_path).await?;

    assert!(!outcome.captions_burned);
    assert_eq!(encoder.render_count(), 1);
    Ok(())
}

/// Test that a fatal encoder failure propagates loudly and leaves nothing
/// under the final name
#[tokio::test]
async fn test_render_withFatalEncoderFailure_shouldFailAndLeaveNoArtifacts() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let final_path = temp_dir.path().join("bulletin.mp4");

    let encoder = MockEncoder::failing();
    let pipeline = RenderPipeline::new(Arc::new(encoder.clone()));

    let result = pipeline.render(plan_with_captions(3_000), &final_path).await;

    assert!(matches!(result, Err(RenderError::RenderFailed(_))));
    assert!(!final_path.exists(), "no partial file may be left under the final name");
    assert!(!staging_path(&final_path).exists());
    assert_eq!(encoder.render_count(), 1);
    Ok(())
}

/// Test that a stale staged artifact from an interrupted run is cleaned up
#[tokio::test]
async fn test_render_withStaleStagingFile_shouldReplaceIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let final_path = temp_dir.path().join("bulletin.mp4");
    std::fs::write(staging_path(&final_path), b"stale")?;

    let encoder = MockEncoder::working();
    let pipeline = RenderPipeline::new(Arc::new(encoder.clone()));

    pipeline.render(plan_with_captions(3_000), &final_path).await?;

    assert_eq!(std::fs::read(&final_path)?, b"mock-video");
    assert!(!staging_path(&final_path).exists());
    Ok(())
}
