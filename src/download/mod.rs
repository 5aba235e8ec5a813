//! Download pipeline: turns a harvested reference set into files on disk.
//!
//! # Features
//!
//! - Sequential transfers, images before videos
//! - Streaming bodies straight to disk with byte progress when the size is known
//! - Inline `data:` payloads decoded locally
//! - Collision-safe naming (`name.ext`, `name-1.ext`, ...)
//! - Continue-on-error accounting in a [`RunSummary`]
//!
//! # Example
//!
//! ```no_run
//! use media_harvester::download::{HttpClient, NoopObserver, Pipeline};
//! use media_harvester::harvest::harvest;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let page = "https://example.com/gallery";
//! let found = harvest(&["https://example.com/a.jpg"], &["data:image/png;base64,AA=="], page);
//! let pipeline = Pipeline::new(HttpClient::new()?);
//! let summary = pipeline
//!     .run(&found.images, &found.videos, Path::new("./media-session"), page, &NoopObserver)
//!     .await;
//! println!("{} saved, {} failed", summary.succeeded, summary.failed);
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod error;
pub mod filename;
mod pipeline;
mod progress;
mod session;

pub use client::HttpClient;
pub use error::DownloadError;
pub use filename::{InlineIdSequence, base_filename, resolve_unique_path, sanitize_filename};
pub use pipeline::{DownloadOutcome, DownloadTask, Pipeline, RunContext, RunSummary, TaskStatus};
pub use progress::{NoopObserver, PipelineObserver, TransferProgress};
pub use session::session_dir_name;
