//! CLI entry point for the media harvester.

use std::process::ExitCode;

use clap::Parser;

mod app;
mod cli;

use cli::Args;

/// Process exit outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// The run completed; per-item failures included.
    Success,
    /// The run could not harvest the page.
    Failure,
}

impl ProcessExit {
    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    match app::runtime::run_harvester(args).await {
        Ok(exit) => ExitCode::from(exit.code()),
        Err(error) => {
            tracing::error!("Fatal error: {error:#}");
            ExitCode::from(ProcessExit::Failure.code())
        }
    }
}
