//! Command dispatch: bridges CLI args -> session workflows -> output formatting.

pub mod config_cmd;
pub mod locations;
pub mod open;
pub mod track;
pub mod util;

use clouddoor_core::LocationBoard;

use crate::cli::{Command, GlobalOpts};
use crate::config::Context;
use crate::error::CliError;

/// Dispatch a door command to its handler.
pub async fn dispatch(cmd: Command, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Locations(args) => locations::handle(ctx, &args, global).await,
        Command::Open(args) => open::handle(ctx, &args, global).await,
        Command::Track(args) => track::handle(ctx, &args, global).await,
        // Handled before a context is built
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}

/// Cold-start a board from the cache, then refresh it from the service.
///
/// The refresh is skipped when `cached` is set or no account is configured.
/// A failed refresh leaves the cached entries on the board and is returned
/// alongside it so the caller decides whether it is fatal.
pub async fn load_board(
    ctx: &Context,
    cached: bool,
    global: &GlobalOpts,
) -> (LocationBoard, Option<CliError>) {
    let board = LocationBoard::new();
    board.update_position(ctx.position);
    if let Some(locations) = ctx.session.cached_locations() {
        board.seed(locations);
    }

    if cached {
        return (board, None);
    }
    if !ctx.session.is_configured() {
        if !global.quiet {
            eprintln!(
                "No account configured for profile '{}'; showing cached locations.",
                ctx.profile_name
            );
        }
        return (board, None);
    }

    let attempt = ctx.session.spawn_refresh();
    let spinner = util::workflow_spinner(attempt.state(), global.quiet);
    let outcome = attempt.outcome().await;
    spinner.finish_and_clear();

    match outcome.result {
        Ok(locations) => {
            board.apply_refresh(outcome.generation, locations);
            (board, None)
        }
        Err(e) => (board, Some(ctx.fail(e))),
    }
}
