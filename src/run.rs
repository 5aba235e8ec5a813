//! One harvesting session: load the page, harvest it, download the result.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use tracing::{info, instrument};
use url::Url;

use crate::download::{Pipeline, PipelineObserver, RunSummary, session_dir_name};
use crate::error::RunError;
use crate::harvest::harvest_page;
use crate::renderer::Renderer;

/// What a finished session produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    /// Image references handed to the pipeline.
    pub images_found: usize,
    /// Video references handed to the pipeline.
    pub videos_found: usize,
    /// References dropped as non-media or unresolvable.
    pub discarded: usize,
    /// Session directory; `None` when nothing was downloadable.
    pub session_root: Option<PathBuf>,
    /// Pipeline counters.
    pub summary: RunSummary,
}

/// Runs one session against an already launched renderer.
///
/// A page without media skips the pipeline entirely and creates no directory.
///
/// # Errors
///
/// Returns [`RunError::Renderer`] when navigation or DOM inspection fails.
/// Download failures are counted in the report, never returned.
#[instrument(skip(renderer, pipeline, observer), fields(url = %page_url))]
pub async fn run_session<R>(
    renderer: &mut R,
    page_url: &Url,
    output_root: &Path,
    navigation_timeout: Duration,
    pipeline: &Pipeline,
    observer: &dyn PipelineObserver,
) -> Result<SessionReport, RunError>
where
    R: Renderer + ?Sized,
{
    renderer
        .load_and_stabilize(page_url.as_str(), navigation_timeout)
        .await?;

    let found = harvest_page(renderer, page_url.as_str()).await?;
    info!(
        images = found.images.len(),
        videos = found.videos.len(),
        discarded = found.discarded,
        "media harvested"
    );

    let mut report = SessionReport {
        images_found: found.images.len(),
        videos_found: found.videos.len(),
        discarded: found.discarded,
        session_root: None,
        summary: RunSummary::default(),
    };
    if found.is_empty() {
        info!("no media found to download");
        return Ok(report);
    }

    let session_root = output_root.join(session_dir_name(page_url, Utc::now()));
    info!(dir = %session_root.display(), "starting downloads");
    report.summary = pipeline
        .run(
            &found.images,
            &found.videos,
            &session_root,
            page_url.as_str(),
            observer,
        )
        .await;
    report.session_root = Some(session_root);
    Ok(report)
}
