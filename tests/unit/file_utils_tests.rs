/*!
 * Tests for file system utilities
 */

use newsreel::file_utils::FileManager;
use crate::common;

/// Test directory creation and existence checks
#[test]
fn test_ensure_dir_withNestedPath_shouldCreateAll() -> anyhow::Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("a").join("b").join("c");

    assert!(!FileManager::dir_exists(&nested));
    FileManager::ensure_dir(&nested)?;
    assert!(FileManager::dir_exists(&nested));

    // A second call is a no-op
    FileManager::ensure_dir(&nested)?;
    Ok(())
}

/// Test read/write round trip
#[test]
fn test_write_and_read_withContent_shouldRoundTrip() -> anyhow::Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("deep").join("script.txt");

    FileManager::write_to_file(&path, "Good evening.")?;
    assert!(FileManager::file_exists(&path));
    assert_eq!(FileManager::read_to_string(&path)?, "Good evening.");
    Ok(())
}

/// Test anchor image discovery: matching, filtering and ordering
#[test]
fn test_find_anchor_images_withMixedFiles_shouldMatchSortedAnchors() -> anyhow::Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();

    common::create_test_png(dir, "anchor2.png")?;
    common::create_test_png(dir, "anchor1.png")?;
    common::create_test_png(dir, "anchor3.jpg")?;
    common::create_test_png(dir, "background.png")?;
    common::create_test_file(dir, "anchor_notes.txt", "not an image")?;

    let images = FileManager::find_anchor_images(dir)?;
    let names: Vec<String> = images
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();

    assert_eq!(names, vec!["anchor1.png", "anchor2.png", "anchor3.jpg"]);
    Ok(())
}

/// Test discovery in a directory with no anchors
#[test]
fn test_find_anchor_images_withNoAnchors_shouldReturnEmpty() -> anyhow::Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_png(temp_dir.path(), "logo.png")?;

    let images = FileManager::find_anchor_images(temp_dir.path())?;
    assert!(images.is_empty());
    Ok(())
}

/// Test discovery against a missing directory
#[test]
fn test_find_anchor_images_withMissingDir_shouldFail() {
    assert!(FileManager::find_anchor_images("no/such/assets").is_err());
}

/// Test the timestamped artifact base name
#[test]
fn test_timestamped_base_name_withPrefix_shouldEmbedPrefixAndDigits() {
    let name = FileManager::timestamped_base_name("news");
    assert!(name.starts_with("news_"));

    // news_YYYYmmdd_HHMMSS
    let suffix = name.strip_prefix("news_").unwrap();
    assert_eq!(suffix.len(), 15);
    assert!(suffix.chars().all(|c| c.is_ascii_digit() || c == '_'));
}
