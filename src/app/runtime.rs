use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use chrono::Utc;
use media_harvester::{
    ChromiumOptions, ChromiumRenderer, HttpClient, Pipeline, Renderer, RunError, SessionReport, load_config,
    run_session, validate_page_url,
};
use tracing::{debug, error, info, warn};

use crate::ProcessExit;
use crate::app::{exit_handler, input, reporter, terminal};
use crate::cli::Args;

pub(crate) async fn run_harvester(args: Args) -> anyhow::Result<ProcessExit> {
    let loaded = load_config(&args.config);
    let detailed_logging = loaded.config.detailed_logging;

    let log_file = detailed_logging.then(|| terminal::log_file_path(Path::new("."), Utc::now()));
    let default_level = terminal::resolve_default_log_level(args.quiet, args.verbose);
    if let Err(error) = terminal::init_tracing(default_level, log_file.as_deref()) {
        warn!(%error, "could not create log file; logging to the terminal only");
    } else if let Some(path) = &log_file {
        info!(path = %path.display(), "detailed logging enabled");
    }

    debug!(?args, "CLI arguments parsed");
    for warning in &loaded.warnings {
        warn!("{warning}");
    }
    if loaded.loaded_from_file {
        debug!(path = %loaded.path.display(), config = ?loaded.config, "config loaded");
    }

    let raw_url = match args.url.clone() {
        Some(url) => url,
        None => input::prompt_for_url(io::stdin().lock(), io::stderr())?,
    };

    let result = harvest(&args, &raw_url, loaded.config.custom_browser_path, detailed_logging).await;
    match &result {
        Ok(report) => reporter::print_summary(report),
        Err(err) => error!("Fatal error: {err}"),
    }
    Ok(exit_handler::determine_exit_outcome(&result))
}

async fn harvest(
    args: &Args,
    raw_url: &str,
    config_browser: Option<PathBuf>,
    detailed_logging: bool,
) -> Result<SessionReport, RunError> {
    let page_url = validate_page_url(raw_url)?;
    let client = HttpClient::with_stall_timeout(args.stall_timeout()).map_err(RunError::HttpClient)?;
    let pipeline = Pipeline::new(client);

    let options = ChromiumOptions {
        executable: args.browser.clone().or(config_browser),
        log_network: args.log_network || detailed_logging,
        stabilize: args.stabilize_options(),
        command_timeout: args.navigation_timeout(),
    };
    info!("Launching browser...");
    let mut renderer = ChromiumRenderer::launch(options).await?;

    let use_bars = terminal::should_use_progress_bars(
        io::stderr().is_terminal(),
        args.quiet,
        terminal::is_dumb_terminal(),
    );
    let observer = reporter::ProgressReporter::new(use_bars);
    let result = run_session(
        &mut renderer,
        &page_url,
        &args.output_dir,
        args.navigation_timeout(),
        &pipeline,
        &observer,
    )
    .await;

    renderer.close().await;
    result
}
