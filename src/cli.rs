//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use media_harvester::StabilizeOptions;
use media_harvester::config::DEFAULT_CONFIG_FILE;

/// Download every image and video a web page loads.
///
/// The page is rendered in a headless browser, scrolled to trigger lazy
/// loading, and every media reference seen on the network or in the DOM is
/// saved under `media-<host>-<timestamp>/{images,videos}`.
#[derive(Parser, Debug)]
#[command(name = "media-harvester")]
#[command(author, version, about)]
pub struct Args {
    /// Page to harvest; prompted for when omitted
    pub url: Option<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Config file with DETAILED_LOGGING and CUSTOM_BROWSER_PATH
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Directory in which the session folder is created
    #[arg(short = 'o', long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Page navigation timeout in seconds (1-3600)
    #[arg(long, default_value_t = 120, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub navigation_timeout: u64,

    /// Wait after page load before scrolling, in milliseconds (max 600000)
    #[arg(long, default_value_t = 5000, value_parser = clap::value_parser!(u64).range(0..=600_000))]
    pub settle_delay_ms: u64,

    /// Pixels scrolled per lazy-load step (1-100000)
    #[arg(long, default_value_t = 400, value_parser = clap::value_parser!(u32).range(1..=100_000))]
    pub scroll_step: u32,

    /// Delay between scroll steps in milliseconds (max 10000)
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(0..=10_000))]
    pub scroll_interval_ms: u64,

    /// Give up on a transfer idle for this many seconds (1-86400)
    #[arg(long, default_value_t = 300, value_parser = clap::value_parser!(u64).range(1..=86_400))]
    pub stall_timeout: u64,

    /// Browser executable (overrides CUSTOM_BROWSER_PATH)
    #[arg(long)]
    pub browser: Option<PathBuf>,

    /// Log every browser request and every response with status >= 300
    #[arg(long)]
    pub log_network: bool,
}

impl Args {
    /// Navigation timeout as a duration.
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout)
    }

    /// Transfer idle bound as a duration.
    pub fn stall_timeout(&self) -> Duration {
        Duration::from_secs(self.stall_timeout)
    }

    /// Lazy-load sweep parameters from the scroll flags.
    pub fn stabilize_options(&self) -> StabilizeOptions {
        StabilizeOptions {
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            scroll_step_px: self.scroll_step,
            scroll_interval: Duration::from_millis(self.scroll_interval_ms),
            ..StabilizeOptions::default()
        }
    }
}
