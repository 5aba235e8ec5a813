//! Media Harvester Library
//!
//! Extracts image and video references from a fully rendered web page and
//! retrieves them into a per-run directory, tolerating partial failures and
//! naming collisions.
//!
//! # Architecture
//!
//! Data flows renderer → harvester → pipeline → reporter:
//! - [`renderer`] - headless browser collaborator (navigation, lazy-load sweep, capture)
//! - [`harvest`] - merges network and DOM references into a classified set
//! - [`download`] - sequential transfers with collision-safe naming
//! - [`media`] - classification and inline payload helpers shared by both
//! - [`config`] - `config.txt` loader
//! - [`error`] - run-terminating errors and input validation
//! - [`run`] - one session from page load to run summary

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod download;
pub mod error;
pub mod harvest;
pub mod media;
pub mod renderer;
pub mod run;
#[cfg(test)]
pub mod test_support;

// Re-export commonly used types
pub use config::{ConfigReadError, FileConfig, LoadedConfig, load_config};
pub use download::{
    DownloadError, DownloadOutcome, HttpClient, NoopObserver, Pipeline, PipelineObserver,
    RunSummary, TransferProgress, session_dir_name,
};
pub use error::{RunError, validate_page_url};
pub use harvest::{Harvest, LiveUrlSource, OneShotDomQuery, ReplaySource, harvest, harvest_page};
pub use media::{MediaCategory, MediaKind, MediaReference};
pub use renderer::{ChromiumOptions, ChromiumRenderer, Renderer, RendererError, StabilizeOptions};
pub use run::{SessionReport, run_session};
