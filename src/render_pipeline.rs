use std::path::{Path, PathBuf};
use std::sync::Arc;
use log::{warn, info, debug};

use crate::composition::RenderPlan;
use crate::encoders::Encoder;
use crate::errors::RenderError;

// @module: Render submission with graceful caption degradation

/// Result of a successful render
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    /// Final output artifact
    pub path: PathBuf,

    /// Whether captions made it into the output. False when the subtitle
    /// layer failed and the degraded retry produced the video instead.
    pub captions_burned: bool,
}

/// Submits render plans to an encoder.
///
/// A failure the encoder attributes to the subtitle layer triggers exactly
/// one retry with an equivalent plan that omits that layer: a video without
/// burned-in captions is preferable to no video. Failures in any other layer
/// are fatal.
///
/// The encoder writes to a staging name; the artifact is promoted to the
/// final name only on success, so a failed render never leaves a partial
/// file under the final name.
#[derive(Debug, Clone)]
pub struct RenderPipeline {
    encoder: Arc<dyn Encoder>,
}

impl RenderPipeline {
    pub fn new(encoder: Arc<dyn Encoder>) -> Self {
        RenderPipeline { encoder }
    }

    /// Render the plan into `final_path`, consuming the plan.
    pub async fn render(&self, plan: RenderPlan, final_path: &Path) -> Result<RenderOutcome, RenderError> {
        let staged = staging_path(final_path);

        // A stale staged artifact from an interrupted run must not survive
        // into this one
        discard(&staged).await;

        match self.encoder.render(&plan, &staged).await {
            Ok(()) => {
                promote(&staged, final_path).await?;
                Ok(RenderOutcome {
                    path: final_path.to_path_buf(),
                    captions_burned: plan.has_subtitles(),
                })
            }
            Err(e) if e.is_subtitle_failure() && plan.has_subtitles() => {
                warn!("Subtitle burn-in failed ({}), retrying without captions", e);
                discard(&staged).await;

                let degraded = plan.without_subtitles();
                match self.encoder.render(&degraded, &staged).await {
                    Ok(()) => {
                        promote(&staged, final_path).await?;
                        info!("Produced degraded render without captions: {}", final_path.display());
                        Ok(RenderOutcome {
                            path: final_path.to_path_buf(),
                            captions_burned: false,
                        })
                    }
                    Err(e) => {
                        discard(&staged).await;
                        Err(RenderError::RenderFailed(e.to_string()))
                    }
                }
            }
            Err(e) => {
                discard(&staged).await;
                Err(RenderError::RenderFailed(e.to_string()))
            }
        }
    }
}

/// Staging name for an in-progress render, distinct from the final name and
/// in the same directory so promotion is a plain rename
pub fn staging_path(final_path: &Path) -> PathBuf {
    let file_name = final_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "output.mp4".to_string());
    final_path.with_file_name(format!("temp_{}", file_name))
}

/// Promote the staged artifact to its final name
async fn promote(staged: &Path, final_path: &Path) -> Result<(), RenderError> {
    tokio::fs::rename(staged, final_path).await?;
    debug!("Promoted {} -> {}", staged.display(), final_path.display());
    Ok(())
}

/// Best-effort removal of an intermediate artifact
async fn discard(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed intermediate artifact {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove intermediate artifact {}: {}", path.display(), e),
    }
}
