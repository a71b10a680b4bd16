//! Command implementations

pub mod bump;

pub mod undo;

use serde::Serialize;

/// Where and how command results are shown.
///
/// The resulting tag goes to stdout; human notes go to stderr so the tag can
/// be captured by scripts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    /// Print results as JSON on stdout instead.
    pub json: bool,
    /// Suppress notes on stderr.
    pub quiet: bool,
}

impl Output {
    /// Print a note for humans, unless quiet or in JSON mode.
    pub fn note(self, message: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{message}");
        }
    }

    /// Print `value` as pretty JSON on stdout.
    pub fn print_json<T: Serialize>(self, value: &T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}
