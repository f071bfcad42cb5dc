//! `clouddoor locations`

use crate::cli::{GlobalOpts, LocationsArgs};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::load_board;

pub async fn handle(
    ctx: &Context,
    args: &LocationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (board, refresh_error) = load_board(ctx, args.cached, global).await;

    // Cached entries are still worth showing when the refresh failed.
    let snapshot = board.snapshot();
    if refresh_error.is_none() || !snapshot.entries.is_empty() {
        let out = output::render_locations(
            global.output,
            &snapshot.entries,
            output::should_color(global.color),
        )?;
        output::print_output(&out, global.quiet);
    }

    refresh_error.map_or(Ok(()), Err)
}
