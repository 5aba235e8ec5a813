//! Renderer collaborator: loads the target page, stimulates lazy loading and
//! exposes both discovery channels to the harvester.

mod chromium;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::harvest::{LiveUrlSource, OneShotDomQuery};

pub use chromium::{ChromiumOptions, ChromiumRenderer, KNOWN_BROWSER_PATHS, find_browser_executable};

/// Default navigation timeout; generous to tolerate slow pages.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Desktop browser identity used for page loads and media requests.
pub const SPOOFED_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36";

/// Errors raised by the renderer. All of them end the run.
#[derive(Debug, Error)]
pub enum RendererError {
    /// The browser could not be found or started.
    #[error("failed to launch browser: {reason}")]
    Launch {
        /// Launcher failure description.
        reason: String,
    },

    /// Navigation failed before the page loaded.
    #[error("navigation to {url} failed: {reason}")]
    Navigation {
        /// Target page.
        url: String,
        /// Browser failure description.
        reason: String,
    },

    /// Navigation did not complete in time.
    #[error("navigation to {url} timed out after {timeout_secs}s")]
    NavigationTimeout {
        /// Target page.
        url: String,
        /// Timeout that elapsed.
        timeout_secs: u64,
    },

    /// A script evaluation in the page failed.
    #[error("page evaluation failed: {reason}")]
    Evaluation {
        /// Evaluation failure description.
        reason: String,
    },
}

impl RendererError {
    /// Creates a launch error.
    pub fn launch(reason: impl Into<String>) -> Self {
        Self::Launch {
            reason: reason.into(),
        }
    }

    /// Creates a navigation error.
    pub fn navigation(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Navigation {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a navigation timeout error.
    pub fn navigation_timeout(url: impl Into<String>, timeout: Duration) -> Self {
        Self::NavigationTimeout {
            url: url.into(),
            timeout_secs: timeout.as_secs(),
        }
    }

    /// Creates an evaluation error.
    pub fn evaluation(reason: impl Into<String>) -> Self {
        Self::Evaluation {
            reason: reason.into(),
        }
    }
}

/// Lazy-load stimulation parameters.
///
/// The sweep scrolls by `scroll_step_px` every `scroll_interval` until the
/// document height measured before scrolling is covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilizeOptions {
    /// Wait after the load event before scrolling.
    pub settle_delay: Duration,
    /// Pixels per scroll step.
    pub scroll_step_px: u32,
    /// Wait between scroll steps.
    pub scroll_interval: Duration,
    /// Upper bound on scroll steps for endless pages.
    pub max_scroll_steps: u32,
}

impl Default for StabilizeOptions {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(5),
            scroll_step_px: 400,
            scroll_interval: Duration::from_millis(100),
            max_scroll_steps: 2000,
        }
    }
}

impl StabilizeOptions {
    /// Number of steps needed to cover `scroll_height` pixels, at least one.
    #[must_use]
    pub fn steps_for_height(&self, scroll_height: u64) -> u32 {
        let step = u64::from(self.scroll_step_px.max(1));
        let steps = scroll_height.div_ceil(step).max(1);
        u32::try_from(steps)
            .unwrap_or(u32::MAX)
            .min(self.max_scroll_steps.max(1))
    }
}

/// A page renderer: both discovery channels plus page lifecycle.
#[async_trait]
pub trait Renderer: LiveUrlSource + OneShotDomQuery {
    /// Navigates to `url`, waits for load and runs the lazy-load sweep.
    ///
    /// # Errors
    ///
    /// Returns [`RendererError::Navigation`] or [`RendererError::NavigationTimeout`].
    async fn load_and_stabilize(
        &mut self,
        url: &str,
        navigation_timeout: Duration,
    ) -> Result<(), RendererError>;

    /// Releases browser resources.
    async fn close(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_cover_height() {
        let options = StabilizeOptions::default();
        assert_eq!(options.steps_for_height(0), 1);
        assert_eq!(options.steps_for_height(400), 1);
        assert_eq!(options.steps_for_height(401), 2);
        assert_eq!(options.steps_for_height(4000), 10);
    }

    #[test]
    fn test_steps_are_capped() {
        let options = StabilizeOptions {
            max_scroll_steps: 3,
            ..StabilizeOptions::default()
        };
        assert_eq!(options.steps_for_height(1_000_000), 3);
    }

    #[test]
    fn test_zero_step_is_treated_as_one_pixel() {
        let options = StabilizeOptions {
            scroll_step_px: 0,
            ..StabilizeOptions::default()
        };
        assert_eq!(options.steps_for_height(5), 5);
    }

    #[test]
    fn test_navigation_timeout_display() {
        let err = RendererError::navigation_timeout("https://example.com/", Duration::from_secs(120));
        let msg = err.to_string();
        assert!(msg.contains("timed out after 120s"), "unexpected: {msg}");
        assert!(msg.contains("https://example.com/"));
    }
}
