//! End-to-end session tests with a scripted renderer standing in for the browser.

mod support;

use std::time::Duration;

use async_trait::async_trait;
use media_harvester::{
    HttpClient, LiveUrlSource, NoopObserver, OneShotDomQuery, Pipeline, Renderer, RendererError,
    ReplaySource, RunError, run_session, validate_page_url,
};
use support::socket_guard::start_mock_server_or_skip;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

/// Replays fixed discovery lists once the page "loads".
struct ScriptedRenderer {
    source: ReplaySource,
    fail_navigation: bool,
    loaded: bool,
}

impl ScriptedRenderer {
    fn new(source: ReplaySource) -> Self {
        Self {
            source,
            fail_navigation: false,
            loaded: false,
        }
    }

    fn failing() -> Self {
        Self {
            fail_navigation: true,
            ..Self::new(ReplaySource::default())
        }
    }
}

impl LiveUrlSource for ScriptedRenderer {
    fn drain_observed(&mut self) -> Vec<String> {
        self.source.drain_observed()
    }
}

#[async_trait]
impl OneShotDomQuery for ScriptedRenderer {
    async fn inspect_dom(&mut self, page_base_url: &str) -> Result<Vec<String>, RendererError> {
        if !self.loaded {
            return Err(RendererError::evaluation("no document loaded"));
        }
        self.source.inspect_dom(page_base_url).await
    }
}

#[async_trait]
impl Renderer for ScriptedRenderer {
    async fn load_and_stabilize(
        &mut self,
        url: &str,
        _navigation_timeout: Duration,
    ) -> Result<(), RendererError> {
        if self.fail_navigation {
            return Err(RendererError::navigation(url, "net::ERR_NAME_NOT_RESOLVED"));
        }
        self.loaded = true;
        Ok(())
    }
}

fn pipeline() -> Pipeline {
    Pipeline::new(HttpClient::new().expect("client builds"))
}

#[tokio::test]
async fn test_session_downloads_into_timestamped_folder() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/gallery/cat.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"cat".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gallery/loop.webm"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"loop".to_vec()))
        .mount(&server)
        .await;
    let output = TempDir::new().expect("temp dir");

    let base = server.uri();
    let page_url = validate_page_url(&format!("{base}/gallery/")).expect("valid page URL");
    let mut renderer = ScriptedRenderer::new(ReplaySource::new(
        [format!("{base}/gallery/loop.webm"), format!("{base}/gallery/app.css")],
        ["cat.png", "data:image/gif;base64,R0lGODlhAQABAAAAACw="],
    ));

    let report = run_session(
        &mut renderer,
        &page_url,
        output.path(),
        Duration::from_secs(5),
        &pipeline(),
        &NoopObserver,
    )
    .await
    .expect("session completes");

    assert_eq!(report.images_found, 2);
    assert_eq!(report.videos_found, 1);
    assert_eq!(report.discarded, 1);
    assert_eq!(report.summary.succeeded, 3);
    assert_eq!(report.summary.failed, 0);

    let session_root = report.session_root.expect("session folder created");
    assert_eq!(session_root.parent(), Some(output.path()));
    let folder = session_root.file_name().unwrap().to_string_lossy().into_owned();
    assert!(folder.starts_with("media-127.0.0.1-"), "unexpected folder {folder}");

    let images = session_root.join("images");
    assert_eq!(std::fs::read(images.join("cat.png")).unwrap(), b"cat");
    assert!(images.join("data_images_1.gif").is_file());
    assert_eq!(
        std::fs::read(session_root.join("videos").join("loop.webm")).unwrap(),
        b"loop"
    );
}

#[tokio::test]
async fn test_session_without_media_creates_nothing() {
    let output = TempDir::new().expect("temp dir");
    let page_url = validate_page_url("https://example.com/about").expect("valid page URL");
    let mut renderer = ScriptedRenderer::new(ReplaySource::new(
        ["https://example.com/main.js"],
        ["/styles.css"],
    ));

    let report = run_session(
        &mut renderer,
        &page_url,
        output.path(),
        Duration::from_secs(5),
        &pipeline(),
        &NoopObserver,
    )
    .await
    .expect("session completes");

    assert!(report.session_root.is_none());
    assert_eq!(report.summary.total(), 0);
    assert_eq!(report.discarded, 2);
    assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_navigation_failure_ends_session() {
    let output = TempDir::new().expect("temp dir");
    let page_url = validate_page_url("https://unreachable.invalid/").expect("valid page URL");
    let mut renderer = ScriptedRenderer::failing();

    let err = run_session(
        &mut renderer,
        &page_url,
        output.path(),
        Duration::from_secs(5),
        &pipeline(),
        &NoopObserver,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        RunError::Renderer(RendererError::Navigation { .. })
    ));
    assert!(err.to_string().contains("unreachable.invalid"));
    assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_session_counts_download_failures_without_erroring() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/gone.jpg"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;
    let output = TempDir::new().expect("temp dir");

    let base = server.uri();
    let page_url = validate_page_url(&base).expect("valid page URL");
    let mut renderer =
        ScriptedRenderer::new(ReplaySource::new([format!("{base}/gone.jpg")], Vec::<String>::new()));

    let report = run_session(
        &mut renderer,
        &page_url,
        output.path(),
        Duration::from_secs(5),
        &pipeline(),
        &NoopObserver,
    )
    .await
    .expect("download failures are not fatal");

    assert_eq!(report.summary.succeeded, 0);
    assert_eq!(report.summary.failed, 1);
    let images = report.session_root.expect("folder created").join("images");
    assert_eq!(std::fs::read_dir(images).unwrap().count(), 0);
}
