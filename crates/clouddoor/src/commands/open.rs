//! `clouddoor open <LOCATION>`

use tracing::debug;

use clouddoor_core::OpenConfirmation;

use crate::cli::{GlobalOpts, OpenArgs};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::{load_board, util};

pub async fn handle(ctx: &Context, args: &OpenArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (board, refresh_error) = load_board(ctx, args.cached, global).await;

    let Some(entry) = board.find(&args.location) else {
        // Without a refresh we cannot tell a typo from an unreachable service.
        return Err(refresh_error.unwrap_or_else(|| CliError::NotFound {
            identifier: args.location.clone(),
        }));
    };
    if let Some(e) = refresh_error {
        debug!(error = %e, "refresh failed, opening from cached entry");
    }

    let attempt = ctx.session.spawn_open(entry);
    let spinner = util::workflow_spinner(attempt.state(), global.quiet);
    let outcome = attempt.outcome().await;
    spinner.finish_and_clear();

    let confirmation = outcome.result.map_err(|e| ctx.fail(e))?;
    let out = output::render_single(
        global.output,
        &confirmation,
        OpenConfirmation::message,
        |c| c.access_point_id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
