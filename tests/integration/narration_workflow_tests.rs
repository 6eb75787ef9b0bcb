/*!
 * Integration tests for the synthesis stream to subtitle artifact workflow
 */

use anyhow::Result;

use newsreel::narration_service::NarrationService;
use newsreel::subtitle_track::CueTrack;
use newsreel::synthesis::mock::MockSynthesizer;
use crate::common;

/// Test the timed path: boundary events become cues and both artifacts land
/// next to each other
#[tokio::test]
async fn test_narrate_withTimedEngine_shouldWriteAudioAndTimedSubtitles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let audio_path = temp_dir.path().join("bulletin.mp3");

    let service = NarrationService::new(Box::new(MockSynthesizer::timed_at(400)), "test-voice");
    let artifacts = service.narrate("Hello world tonight", &audio_path).await?;

    assert!(artifacts.timed);
    assert_eq!(artifacts.audio_path, audio_path);
    assert_eq!(artifacts.subtitle_path, temp_dir.path().join("bulletin.srt"));

    // Audio bytes passed through untouched
    assert_eq!(std::fs::read(&audio_path)?, b"mock-audio-payload");

    // One cue per word at the scripted rate
    assert_eq!(artifacts.track.len(), 3);
    assert_eq!(artifacts.track.cues[0].start_ms, 0);
    assert_eq!(artifacts.track.cues[2].end_ms, 1_200);
    assert!(artifacts.track.is_monotonic());

    // The persisted artifact decodes back to the same track
    let reloaded = CueTrack::from_srt_file(&artifacts.subtitle_path)?;
    assert_eq!(reloaded, artifacts.track);

    // No staging file survives the promotion
    assert!(!temp_dir.path().join("bulletin.mp3.part").exists());
    Ok(())
}

/// Test the untimed path: audio with no boundaries falls back to a single
/// estimated cue
#[tokio::test]
async fn test_narrate_withUntimedEngine_shouldEstimateSingleCue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let audio_path = temp_dir.path().join("bulletin.mp3");

    let service = NarrationService::new(Box::new(MockSynthesizer::audio_only()), "test-voice");
    let artifacts = service.narrate("Hello world tonight", &audio_path).await?;

    assert!(!artifacts.timed);
    assert_eq!(artifacts.track.len(), 1);

    // 3 words at 150wpm = 1.2s, floored to whole seconds
    let cue = &artifacts.track.cues[0];
    assert_eq!(cue.start_ms, 0);
    assert_eq!(cue.end_ms, 1_000);
    assert_eq!(cue.text, "Hello world tonight");
    Ok(())
}

/// Test the fallback path: a dead primary engine degrades to the fallback
/// plus an estimated cue instead of failing the narration
#[tokio::test]
async fn test_narrate_withFailingPrimary_shouldUseFallbackEngine() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let audio_path = temp_dir.path().join("bulletin.mp3");

    let service = NarrationService::new(Box::new(MockSynthesizer::failing()), "test-voice")
        .with_fallback(Box::new(MockSynthesizer::audio_only()));
    let artifacts = service.narrate("Good evening from the studio", &audio_path).await?;

    assert!(!artifacts.timed);
    assert!(audio_path.exists());
    assert!(artifacts.subtitle_path.exists());
    assert_eq!(artifacts.track.len(), 1);

    // 5 words at 150wpm = 2s
    assert_eq!(artifacts.track.cues[0].end_ms, 2_000);
    Ok(())
}

/// Test that a stream without audio is an error when no fallback exists, and
/// leaves no partial artifact behind
#[tokio::test]
async fn test_narrate_withEmptyStreamAndNoFallback_shouldFailCleanly() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let audio_path = temp_dir.path().join("bulletin.mp3");

    let service = NarrationService::new(Box::new(MockSynthesizer::empty()), "test-voice");
    let result = service.narrate("Nothing will come of nothing", &audio_path).await;

    assert!(result.is_err());
    assert!(!audio_path.exists());
    assert!(!temp_dir.path().join("bulletin.mp3.part").exists());
    Ok(())
}

/// Test that empty narration text is rejected up front
#[tokio::test]
async fn test_narrate_withEmptyScript_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let audio_path = temp_dir.path().join("bulletin.mp3");

    let service = NarrationService::new(Box::new(MockSynthesizer::timed()), "test-voice");
    assert!(service.narrate("   ", &audio_path).await.is_err());
    Ok(())
}
