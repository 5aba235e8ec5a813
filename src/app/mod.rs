//! Binary-side wiring: terminal setup, prompting, reporting and the run itself.

pub(crate) mod exit_handler;
pub(crate) mod input;
pub(crate) mod reporter;
pub(crate) mod runtime;
pub(crate) mod terminal;
