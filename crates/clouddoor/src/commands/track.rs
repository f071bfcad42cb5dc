//! `clouddoor track`: stdin as the live-position feed.
//!
//! Each line is `lat,lon`; a blank line or `-` means the fix was lost.
//! Distances are re-rendered after every accepted update.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_stream::StreamExt;
use tracing::warn;

use clouddoor_core::{Coordinate, PositionWatch};

use crate::cli::{GlobalOpts, OutputFormat, TrackArgs};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::load_board;

/// Parse one feed line. `Ok(None)` means the position is unknown.
pub fn parse_position(line: &str) -> Result<Option<Coordinate>, CliError> {
    let line = line.trim();
    if line.is_empty() || line == "-" {
        return Ok(None);
    }
    let invalid = || CliError::Validation {
        field: "position".into(),
        reason: format!("expected 'lat,lon', got '{line}'"),
    };
    let (lat, lon) = line.split_once(',').ok_or_else(invalid)?;
    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let lon: f64 = lon.trim().parse().map_err(|_| invalid())?;
    Ok(Some(Coordinate::new(lat, lon)?))
}

/// Publish every line of `reader` into `feed` until end of input.
///
/// Malformed lines are skipped; a read error (e.g. invalid UTF-8) stops
/// the feed and is returned.
pub async fn feed_positions<R>(reader: R, feed: &PositionWatch) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_position(&line) {
                Ok(position) => feed.publish(position),
                Err(e) => warn!(error = %e, "ignoring position line"),
            },
            Ok(None) => return Ok(()),
            Err(e) => {
                warn!(error = %e, "position feed read failed");
                return Err(e);
            }
        }
    }
}

pub async fn handle(ctx: &Context, args: &TrackArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (board, refresh_error) = load_board(ctx, args.cached, global).await;
    if let Some(e) = refresh_error {
        if board.snapshot().entries.is_empty() {
            return Err(e);
        }
        eprintln!("{:?}", miette::Report::new(e));
    }

    let feed = PositionWatch::new();
    feed.publish(ctx.position);
    let mut positions = feed.stream();

    // The reader owns the feed; the stream ends when stdin does.
    let reader = tokio::spawn(async move {
        feed_positions(BufReader::new(tokio::io::stdin()), &feed).await
    });

    let color = output::should_color(global.color);
    while let Some(position) = positions.next().await {
        board.update_position(position);
        let snapshot = board.snapshot();
        if !global.quiet && global.output == OutputFormat::Table {
            let at = position.map_or_else(|| "unknown".to_owned(), |p| p.to_string());
            println!("Position: {at}");
        }
        let out = output::render_locations(global.output, &snapshot.entries, color)?;
        output::print_output(&out, global.quiet);
    }

    reader
        .await
        .map_err(|e| CliError::Io(std::io::Error::other(e)))??;
    Ok(())
}
