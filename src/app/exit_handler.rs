//! Exit code logic for the harvester process.
//!
//! Per-task download failures never change the exit code; only a run that
//! could not harvest at all does.

use media_harvester::{RunError, SessionReport};

use crate::ProcessExit;

/// Maps the session result to the process exit outcome.
pub(crate) fn determine_exit_outcome(result: &Result<SessionReport, RunError>) -> ProcessExit {
    match result {
        Ok(_) => ProcessExit::Success,
        Err(_) => ProcessExit::Failure,
    }
}

#[cfg(test)]
mod tests {
    use super::determine_exit_outcome;
    use crate::ProcessExit;
    use media_harvester::{RendererError, RunError, RunSummary, SessionReport};

    fn report(succeeded: usize, failed: usize) -> SessionReport {
        SessionReport {
            images_found: succeeded + failed,
            videos_found: 0,
            discarded: 0,
            session_root: None,
            summary: RunSummary { succeeded, failed },
        }
    }

    #[test]
    fn test_exit_outcome_success_even_when_every_task_failed() {
        assert_eq!(determine_exit_outcome(&Ok(report(0, 3))), ProcessExit::Success);
    }

    #[test]
    fn test_exit_outcome_success_for_zero_media() {
        assert_eq!(determine_exit_outcome(&Ok(report(0, 0))), ProcessExit::Success);
    }

    #[test]
    fn test_exit_outcome_failure_on_run_error() {
        let err = RunError::Renderer(RendererError::launch("missing"));
        assert_eq!(determine_exit_outcome(&Err(err)), ProcessExit::Failure);
    }

    #[test]
    fn test_process_exit_codes() {
        assert_eq!(ProcessExit::Success.code(), 0);
        assert_eq!(ProcessExit::Failure.code(), 1);
    }
}
