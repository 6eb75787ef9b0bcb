use anyhow::{Result, Context};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

/// Image extensions considered when discovering anchor stills
const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Timestamped base name for one generation run, e.g. `news_20260807_142358`
    pub fn timestamped_base_name(prefix: &str) -> String {
        format!("{}_{}", prefix, Local::now().format("%Y%m%d_%H%M%S"))
    }

    /// Find anchor still images directly inside a directory.
    ///
    /// Matches files named `anchor*` with an image extension, ordered
    /// lexicographically so `anchor1.png`, `anchor2.png`, ... cycle in a
    /// stable order.
    pub fn find_anchor_images<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        if !Self::dir_exists(dir) {
            return Err(anyhow::anyhow!("Assets directory does not exist: {:?}", dir));
        }

        let mut result = Vec::new();
        for entry in WalkDir::new(dir).max_depth(1).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let has_image_ext = path
                .extension()
                .map(|ext| {
                    IMAGE_EXTENSIONS
                        .iter()
                        .any(|known| ext.to_string_lossy().eq_ignore_ascii_case(known))
                })
                .unwrap_or(false);

            let is_anchor = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().starts_with("anchor"))
                .unwrap_or(false);

            if has_image_ext && is_anchor {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }
}
