//! Headless Chromium renderer built on `chromiumoxide`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent, EventResponseReceived,
};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::{
    DEFAULT_NAVIGATION_TIMEOUT, Renderer, RendererError, SPOOFED_USER_AGENT, StabilizeOptions,
};
use crate::harvest::{DomSnapshot, LiveUrlSource, OneShotDomQuery};

/// Well-known Chrome, Edge and Chromium install locations, checked in order.
pub const KNOWN_BROWSER_PATHS: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
    r"C:\Program Files\Microsoft\Edge\Application\msedge.exe",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/google-chrome",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
];

/// Collects raw attribute values and computed backgrounds; the Rust side splits them.
const DOM_INSPECTION_SCRIPT: &str = r#"(() => {
  const sources = [];
  const srcsets = [];
  const backgrounds = [];
  document.querySelectorAll("img, source, video").forEach((el) => {
    if (el.src) sources.push(el.src);
    if (el.dataset && el.dataset.src) sources.push(el.dataset.src);
    if (el.poster) sources.push(el.poster);
    const srcset = el.getAttribute("srcset");
    if (srcset) srcsets.push(srcset);
  });
  document.querySelectorAll("*").forEach((el) => {
    const bg = window.getComputedStyle(el).getPropertyValue("background-image");
    if (bg && bg !== "none") backgrounds.push(bg);
  });
  return JSON.stringify({ sources, srcsets, backgrounds });
})()"#;

const SCROLL_HEIGHT_SCRIPT: &str = "document.body ? document.body.scrollHeight : 0";

/// URLs of in-flight requests keyed by protocol request id, so a failed load
/// can be reported by URL.
#[derive(Debug, Clone, Default)]
struct InFlightRequests(Arc<Mutex<HashMap<String, String>>>);

impl InFlightRequests {
    fn record(&self, request_id: &str, url: &str) {
        if let Ok(mut requests) = self.0.lock() {
            requests.insert(request_id.to_string(), url.to_string());
        }
    }

    fn take(&self, request_id: &str) -> Option<String> {
        self.0.lock().ok()?.remove(request_id)
    }
}

/// Launch settings for [`ChromiumRenderer`].
#[derive(Debug, Clone)]
pub struct ChromiumOptions {
    /// Browser executable override (from configuration or CLI).
    pub executable: Option<PathBuf>,
    /// Log every request and every response with status >= 300.
    pub log_network: bool,
    /// Lazy-load sweep parameters.
    pub stabilize: StabilizeOptions,
    /// Upper bound for a single browser protocol command, navigation included.
    pub command_timeout: Duration,
}

impl Default for ChromiumOptions {
    fn default() -> Self {
        Self {
            executable: None,
            log_network: false,
            stabilize: StabilizeOptions::default(),
            command_timeout: DEFAULT_NAVIGATION_TIMEOUT,
        }
    }
}

/// Picks the browser executable: a configured override when it exists, else
/// the first existing well-known path.
///
/// Returns `None` when nothing is found, leaving detection to `chromiumoxide`.
#[must_use]
pub fn find_browser_executable(override_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        if path.exists() {
            info!(path = %path.display(), "using configured browser");
            return Some(path.to_path_buf());
        }
        warn!(
            path = %path.display(),
            "configured browser path not found; looking for a standard browser"
        );
    }

    let local_app_data = std::env::var_os("LOCALAPPDATA")
        .map(|dir| PathBuf::from(dir).join(r"Google\Chrome\Application\chrome.exe"));

    KNOWN_BROWSER_PATHS
        .iter()
        .map(PathBuf::from)
        .chain(local_app_data)
        .find(|candidate| candidate.exists())
        .inspect(|found| info!(path = %found.display(), "found standard browser"))
}

/// Renderer backed by a headless Chromium instance.
///
/// The request listener is attached before the first navigation so early
/// requests are not missed.
pub struct ChromiumRenderer {
    browser: Browser,
    page: Page,
    stabilize: StabilizeOptions,
    observed: mpsc::UnboundedReceiver<String>,
    tasks: Vec<JoinHandle<()>>,
}

impl ChromiumRenderer {
    /// Launches the browser, opens a blank page and attaches network listeners.
    ///
    /// # Errors
    ///
    /// Returns [`RendererError::Launch`] when the browser cannot be started
    /// or the page cannot be prepared.
    #[instrument(skip(options), fields(log_network = options.log_network))]
    pub async fn launch(options: ChromiumOptions) -> Result<Self, RendererError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-setuid-sandbox")
            .window_size(1920, 1080)
            .request_timeout(options.command_timeout);
        if let Some(executable) = find_browser_executable(options.executable.as_deref()) {
            builder = builder.chrome_executable(executable);
        }
        let config = builder.build().map_err(RendererError::launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RendererError::launch(e.to_string()))?;

        let mut tasks = Vec::new();
        tasks.push(tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(error) = event {
                    debug!(%error, "browser handler event error");
                }
            }
        }));

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| RendererError::launch(e.to_string()))?;
        page.set_user_agent(SPOOFED_USER_AGENT)
            .await
            .map_err(|e| RendererError::launch(e.to_string()))?;

        let (sender, observed) = mpsc::unbounded_channel();
        let mut requests = page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(|e| RendererError::launch(e.to_string()))?;
        let log_network = options.log_network;
        let in_flight = InFlightRequests::default();
        let request_ids = in_flight.clone();
        tasks.push(tokio::spawn(async move {
            while let Some(event) = requests.next().await {
                if log_network {
                    info!(target: "network", method = %event.request.method, url = %event.request.url, "[REQ]");
                    request_ids.record(event.request_id.as_ref(), &event.request.url);
                }
                if sender.send(event.request.url.clone()).is_err() {
                    break;
                }
            }
        }));

        if log_network {
            let mut responses = page
                .event_listener::<EventResponseReceived>()
                .await
                .map_err(|e| RendererError::launch(e.to_string()))?;
            tasks.push(tokio::spawn(async move {
                while let Some(event) = responses.next().await {
                    if event.response.status >= 300 {
                        info!(target: "network", status = event.response.status, url = %event.response.url, "[RES]");
                    }
                }
            }));

            let mut completions = page
                .event_listener::<EventLoadingFinished>()
                .await
                .map_err(|e| RendererError::launch(e.to_string()))?;
            let finished = in_flight.clone();
            tasks.push(tokio::spawn(async move {
                while let Some(event) = completions.next().await {
                    finished.take(event.request_id.as_ref());
                }
            }));

            let mut failures = page
                .event_listener::<EventLoadingFailed>()
                .await
                .map_err(|e| RendererError::launch(e.to_string()))?;
            tasks.push(tokio::spawn(async move {
                while let Some(event) = failures.next().await {
                    let request_id: &str = event.request_id.as_ref();
                    let url = in_flight
                        .take(request_id)
                        .unwrap_or_else(|| format!("request {request_id}"));
                    info!(target: "network", url = %url, error = %event.error_text, "[FAIL]");
                }
            }));
        }

        debug!("browser ready");
        Ok(Self {
            browser,
            page,
            stabilize: options.stabilize,
            observed,
            tasks,
        })
    }

    async fn evaluate<T: DeserializeOwned>(&self, script: &str) -> Result<T, RendererError> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| RendererError::evaluation(e.to_string()))?
            .into_value::<T>()
            .map_err(|e| RendererError::evaluation(e.to_string()))
    }

    async fn scroll_sweep(&self) -> Result<(), RendererError> {
        let scroll_height: f64 = self.evaluate(SCROLL_HEIGHT_SCRIPT).await?;
        // Saturating float-to-int cast; negative or NaN heights become 0.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps = self.stabilize.steps_for_height(scroll_height.max(0.0) as u64);
        debug!(scroll_height, steps, "scrolling page");

        let script = format!("window.scrollBy(0, {})", self.stabilize.scroll_step_px);
        for step in 0..steps {
            self.page
                .evaluate(script.as_str())
                .await
                .map_err(|e| RendererError::evaluation(e.to_string()))?;
            if step + 1 < steps {
                tokio::time::sleep(self.stabilize.scroll_interval).await;
            }
        }
        Ok(())
    }
}

impl LiveUrlSource for ChromiumRenderer {
    fn drain_observed(&mut self) -> Vec<String> {
        let mut urls = Vec::new();
        while let Ok(url) = self.observed.try_recv() {
            urls.push(url);
        }
        urls
    }
}

#[async_trait]
impl OneShotDomQuery for ChromiumRenderer {
    #[instrument(skip(self))]
    async fn inspect_dom(&mut self, page_base_url: &str) -> Result<Vec<String>, RendererError> {
        let raw: String = self.evaluate(DOM_INSPECTION_SCRIPT).await?;
        let snapshot: DomSnapshot =
            serde_json::from_str(&raw).map_err(|e| RendererError::evaluation(e.to_string()))?;
        debug!(
            sources = snapshot.sources.len(),
            srcsets = snapshot.srcsets.len(),
            backgrounds = snapshot.backgrounds.len(),
            "DOM inspected"
        );
        Ok(snapshot.into_references())
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    #[instrument(skip(self), fields(timeout_secs = navigation_timeout.as_secs()))]
    async fn load_and_stabilize(
        &mut self,
        url: &str,
        navigation_timeout: Duration,
    ) -> Result<(), RendererError> {
        info!(url, "navigating");
        match tokio::time::timeout(navigation_timeout, self.page.goto(url)).await {
            Err(_) => return Err(RendererError::navigation_timeout(url, navigation_timeout)),
            Ok(Err(error)) => return Err(RendererError::navigation(url, error.to_string())),
            Ok(Ok(_)) => {}
        }

        info!(
            settle_ms = self.stabilize.settle_delay.as_millis(),
            "page loaded; waiting for dynamic content"
        );
        tokio::time::sleep(self.stabilize.settle_delay).await;

        info!("scrolling page to trigger lazy loading");
        self.scroll_sweep().await
    }

    async fn close(&mut self) {
        if let Err(error) = self.browser.close().await {
            debug!(%error, "browser close failed");
        }
        if let Err(error) = self.browser.wait().await {
            debug!(%error, "browser wait failed");
        }
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}
