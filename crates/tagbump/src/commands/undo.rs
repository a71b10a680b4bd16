//! Undo command.

use anyhow::Context;
use owo_colors::{OwoColorize, Stream};
use tracing::instrument;

use tagbump_core::bump;
use tagbump_core::git::RepositoryHandle;

use super::Output;

/// Remove the last bump and print the tag now in effect.
#[instrument(name = "cmd_undo", skip_all, fields(json_output = output.json))]
pub fn cmd_undo(repo: &RepositoryHandle, output: Output) -> anyhow::Result<()> {
    let outcome = bump::undo(repo).context("undo failed")?;

    if output.json {
        return output.print_json(&outcome);
    }
    output.note(format_args!(
        "{} removed {}, back at {}",
        "✓".if_supports_color(Stream::Stderr, |s| s.green()),
        outcome.removed.if_supports_color(Stream::Stderr, |t| t.red()),
        outcome.current.if_supports_color(Stream::Stderr, |v| v.bold())
    ));
    println!(
        "{}",
        outcome.tag.if_supports_color(Stream::Stdout, |tag| tag.green())
    );

    Ok(())
}
