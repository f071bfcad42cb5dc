//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::watch;

use clouddoor_core::WorkflowState;

fn label(state: WorkflowState) -> &'static str {
    match state {
        WorkflowState::Idle => "Starting",
        WorkflowState::TokenRequested => "Signing in",
        WorkflowState::LocationsRequested => "Fetching locations",
        WorkflowState::DoorOpenRequested => "Opening door",
        WorkflowState::Failed => "Failed",
    }
}

/// A stderr spinner that follows one workflow attempt's state.
///
/// Hidden in quiet mode or when stderr is not a terminal.
pub fn workflow_spinner(mut state: watch::Receiver<WorkflowState>, quiet: bool) -> ProgressBar {
    if quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(label(*state.borrow()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let follower = spinner.clone();
    tokio::spawn(async move {
        while state.changed().await.is_ok() {
            follower.set_message(label(*state.borrow_and_update()));
        }
    });
    spinner
}
