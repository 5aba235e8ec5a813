//! Sequential download pipeline.
//!
//! Images are processed before videos, one task at a time. Every task ends in
//! exactly one [`DownloadOutcome`]; a failed task is counted and the run moves
//! on.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use super::client::HttpClient;
use super::error::DownloadError;
use super::filename::{InlineIdSequence, base_filename, resolve_unique_path, sanitize_filename};
use super::progress::{PipelineObserver, TransferProgress};
use crate::media::{MediaCategory, MediaReference, decode_inline};

/// One unit of work: a reference and where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    /// Reference to retrieve.
    pub reference: MediaReference,
    /// Category directory inside the session root.
    pub target_directory: PathBuf,
    /// Page URL sent as `Referer`.
    pub referer_url: String,
}

/// Terminal state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// The file was written completely.
    Succeeded,
    /// Nothing was left on disk.
    Failed,
}

/// Result of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    /// The task this outcome belongs to.
    pub task: DownloadTask,
    /// Terminal state.
    pub status: TaskStatus,
    /// Bytes written to `final_path`.
    pub bytes_written: u64,
    /// File written on success.
    pub final_path: Option<PathBuf>,
    /// Failure description.
    pub error_detail: Option<String>,
}

impl DownloadOutcome {
    fn succeeded(task: DownloadTask, final_path: PathBuf, bytes_written: u64) -> Self {
        Self {
            task,
            status: TaskStatus::Succeeded,
            bytes_written,
            final_path: Some(final_path),
            error_detail: None,
        }
    }

    fn failed(task: DownloadTask, error_detail: String) -> Self {
        Self {
            task,
            status: TaskStatus::Failed,
            bytes_written: 0,
            final_path: None,
            error_detail: Some(error_detail),
        }
    }

    /// Returns true when the task succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Succeeded
    }
}

/// Per-run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Tasks that wrote a file.
    pub succeeded: usize,
    /// Tasks that failed.
    pub failed: usize,
}

impl RunSummary {
    /// Number of tasks attempted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Mutable state threaded through one run.
#[derive(Debug, Default)]
pub struct RunContext {
    summary: RunSummary,
    inline_ids: InlineIdSequence,
    claimed_paths: HashSet<PathBuf>,
}

impl RunContext {
    /// Creates a fresh context with zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts an outcome and claims its path.
    pub fn record(&mut self, outcome: &DownloadOutcome) {
        match outcome.status {
            TaskStatus::Succeeded => self.summary.succeeded += 1,
            TaskStatus::Failed => self.summary.failed += 1,
        }
        if let Some(path) = &outcome.final_path {
            self.claimed_paths.insert(path.clone());
        }
    }

    /// Counters so far.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Paths written so far in this run.
    #[must_use]
    pub fn claimed_paths(&self) -> &HashSet<PathBuf> {
        &self.claimed_paths
    }
}

/// Turns harvested references into files under a session root.
#[derive(Debug, Clone)]
pub struct Pipeline {
    client: HttpClient,
}

impl Pipeline {
    /// Creates a pipeline reusing `client` for every network task.
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Downloads every image, then every video, into `session_root/{images,videos}`.
    ///
    /// Category directories are created only for non-empty categories. When a
    /// directory cannot be created every task of that category fails.
    #[instrument(skip_all, fields(images = images.len(), videos = videos.len(), root = %session_root.display()))]
    pub async fn run(
        &self,
        images: &[MediaReference],
        videos: &[MediaReference],
        session_root: &Path,
        referer_url: &str,
        observer: &dyn PipelineObserver,
    ) -> RunSummary {
        let mut context = RunContext::new();
        for (category, references) in [
            (MediaCategory::Image, images),
            (MediaCategory::Video, videos),
        ] {
            self.run_category(
                &mut context,
                category,
                references,
                session_root,
                referer_url,
                observer,
            )
            .await;
        }

        let summary = context.summary();
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "download run finished"
        );
        summary
    }

    async fn run_category(
        &self,
        context: &mut RunContext,
        category: MediaCategory,
        references: &[MediaReference],
        session_root: &Path,
        referer_url: &str,
        observer: &dyn PipelineObserver,
    ) {
        if references.is_empty() {
            return;
        }
        observer.category_started(category, references.len());
        info!(%category, count = references.len(), "downloading category");

        let directory = session_root.join(category.dir_name());
        let directory_error = tokio::fs::create_dir_all(&directory)
            .await
            .map_err(|e| DownloadError::io(&directory, e).to_string())
            .err();
        if let Some(detail) = &directory_error {
            warn!(%category, error = %detail, "cannot create category directory; failing its tasks");
        }

        for reference in references {
            let task = DownloadTask {
                reference: reference.clone(),
                target_directory: directory.clone(),
                referer_url: referer_url.to_string(),
            };
            let outcome = match &directory_error {
                Some(detail) => DownloadOutcome::failed(task, detail.clone()),
                None => self.execute(context, task, category, observer).await,
            };

            match &outcome.status {
                TaskStatus::Succeeded => debug!(
                    reference = %outcome.task.reference.display_short(),
                    bytes = outcome.bytes_written,
                    "saved"
                ),
                TaskStatus::Failed => debug!(
                    reference = %outcome.task.reference.display_short(),
                    error = outcome.error_detail.as_deref().unwrap_or("unknown error"),
                    "failed"
                ),
            }
            context.record(&outcome);
            observer.outcome_recorded(&outcome);
        }
    }

    async fn execute(
        &self,
        context: &mut RunContext,
        task: DownloadTask,
        category: MediaCategory,
        observer: &dyn PipelineObserver,
    ) -> DownloadOutcome {
        let file_name = sanitize_filename(&base_filename(
            &task.reference,
            category,
            &mut context.inline_ids,
        ));
        let path = resolve_unique_path(&task.target_directory, &file_name, &context.claimed_paths);

        let result = if task.reference.is_inline() {
            write_inline(&task, &path, observer).await
        } else {
            self.transfer(&task, &path, observer).await
        };

        match result {
            Ok(bytes_written) => DownloadOutcome::succeeded(task, path, bytes_written),
            Err(error) => DownloadOutcome::failed(task, error.to_string()),
        }
    }

    async fn transfer(
        &self,
        task: &DownloadTask,
        path: &Path,
        observer: &dyn PipelineObserver,
    ) -> Result<u64, DownloadError> {
        let url = task
            .reference
            .absolute_url()
            .ok_or_else(|| DownloadError::no_target(task.reference.display_short()))?;

        let response = self.client.fetch(url, &task.referer_url).await?;
        let total = response.content_length();
        let file_name = display_name(path);
        observer.transfer_started(&task.reference, &file_name, total);

        self.client
            .write_body(response, url.as_str(), path, |transferred| {
                if let Some(total) = total {
                    observer.transfer_progress(&TransferProgress {
                        file_name: file_name.clone(),
                        transferred,
                        total,
                    });
                }
            })
            .await
    }
}

/// Decodes an inline payload and writes it in one step; nothing is created on decode failure.
async fn write_inline(
    task: &DownloadTask,
    path: &Path,
    observer: &dyn PipelineObserver,
) -> Result<u64, DownloadError> {
    let bytes = decode_inline(task.reference.raw_url())?;
    let total = bytes.len() as u64;
    observer.transfer_started(&task.reference, &display_name(path), Some(total));

    if let Err(e) = tokio::fs::write(path, &bytes).await {
        let _ = tokio::fs::remove_file(path).await;
        return Err(DownloadError::io(path, e));
    }
    Ok(total)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::download::NoopObserver;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingObserver {
        categories: Mutex<Vec<(MediaCategory, usize)>>,
        outcomes: Mutex<Vec<DownloadOutcome>>,
    }

    impl PipelineObserver for RecordingObserver {
        fn category_started(&self, category: MediaCategory, task_count: usize) {
            self.categories.lock().unwrap().push((category, task_count));
        }

        fn outcome_recorded(&self, outcome: &DownloadOutcome) {
            self.outcomes.lock().unwrap().push(outcome.clone());
        }
    }

    fn pipeline() -> Pipeline {
        Pipeline::new(HttpClient::new().unwrap())
    }

    #[tokio::test]
    async fn test_inline_payloads_written_without_network() {
        let temp_dir = TempDir::new().unwrap();
        let images = vec![
            MediaReference::from_inline("data:image/png;base64,aGVsbG8="),
            MediaReference::from_inline("data:image/png;base64,d29ybGQ"),
        ];

        let summary = pipeline()
            .run(&images, &[], temp_dir.path(), "https://example.com/", &NoopObserver)
            .await;

        assert_eq!(summary, RunSummary { succeeded: 2, failed: 0 });
        let dir = temp_dir.path().join("images");
        assert_eq!(std::fs::read(dir.join("data_images_1.png")).unwrap(), b"hello");
        assert_eq!(std::fs::read(dir.join("data_images_2.png")).unwrap(), b"world");
        assert!(!temp_dir.path().join("videos").exists());
    }

    #[tokio::test]
    async fn test_undecodable_inline_payload_fails_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let observer = RecordingObserver::default();
        let videos = vec![MediaReference::from_inline("data:video/mp4;base64,@@@@")];

        let summary = pipeline()
            .run(&[], &videos, temp_dir.path(), "", &observer)
            .await;

        assert_eq!(summary, RunSummary { succeeded: 0, failed: 1 });
        let dir = temp_dir.path().join("videos");
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);

        let outcomes = observer.outcomes.lock().unwrap();
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].final_path.is_none());
        assert!(
            outcomes[0]
                .error_detail
                .as_deref()
                .unwrap()
                .contains("inline data")
        );
    }

    #[tokio::test]
    async fn test_directory_failure_fails_every_task_in_category() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file where the category directory should go.
        std::fs::write(temp_dir.path().join("images"), b"").unwrap();
        let images = vec![
            MediaReference::from_inline("data:image/gif;base64,R0lGODlh"),
            MediaReference::from_inline("data:image/gif;base64,R0lGODdh"),
        ];
        let videos = vec![MediaReference::from_inline("data:video/webm;base64,GkXfow==")];
        let observer = RecordingObserver::default();

        let summary = pipeline()
            .run(&images, &videos, temp_dir.path(), "", &observer)
            .await;

        assert_eq!(summary, RunSummary { succeeded: 1, failed: 2 });
        assert_eq!(
            *observer.categories.lock().unwrap(),
            vec![(MediaCategory::Image, 2), (MediaCategory::Video, 1)]
        );
        assert!(temp_dir.path().join("videos").join("data_videos_1.webm").exists());
    }

    #[tokio::test]
    async fn test_empty_run_creates_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let summary = pipeline()
            .run(&[], &[], temp_dir.path(), "", &NoopObserver)
            .await;
        assert_eq!(summary.total(), 0);
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_run_context_records_counts_and_paths() {
        let mut context = RunContext::new();
        let task = DownloadTask {
            reference: MediaReference::from_inline("data:image/png;base64,AA=="),
            target_directory: PathBuf::from("/tmp/images"),
            referer_url: String::new(),
        };
        context.record(&DownloadOutcome::succeeded(
            task.clone(),
            PathBuf::from("/tmp/images/a.png"),
            1,
        ));
        context.record(&DownloadOutcome::failed(task, "boom".to_string()));

        assert_eq!(context.summary(), RunSummary { succeeded: 1, failed: 1 });
        assert!(context.claimed_paths().contains(Path::new("/tmp/images/a.png")));
    }
}
