//! Library interface for the `tagbump` CLI.
//!
//! This crate exposes the CLI's argument parser as a library, primarily for
//! documentation generation and testing. The actual entry point is in
//! `main.rs`.
//!
//! # Structure
//!
//! - [`Cli`] - The root argument parser (clap derive)
//! - [`commands`] - Bump and undo, plus output formatting
//!
//! Logging setup (`observability`) lives in the binary only: it installs the
//! global subscriber and is never needed by library users.
//!
//! # Documentation Generation
//!
//! The [`command()`] function returns the clap `Command` for generating man pages
//! and shell completions via `xtask`.

pub mod commands;

use clap::{CommandFactory, Parser};
use std::path::PathBuf;

/// Color output preference.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect terminal capabilities automatically.
    #[default]
    Auto,
    /// Always emit colors.
    Always,
    /// Never emit colors.
    Never,
}

impl ColorChoice {
    /// Configure global color output based on this choice.
    ///
    /// Call this once at startup to set the color mode.
    pub fn apply(self) {
        match self {
            Self::Auto => {} // owo-colors auto-detects by default
            Self::Always => owo_colors::set_override(true),
            Self::Never => owo_colors::set_override(false),
        }
    }
}

const RELEASE_HELP: &str = "\
RELEASE:
    major, minor, patch          Bump that component
    premajor, preminor, prepatch Bump that component and start a pre-release
    prerelease (alias: pre)      Bump the pre-release counter
    undo                         Remove the last bump (HEAD must be the bump commit)

ENVIRONMENT VARIABLES:
    RUST_LOG                Log filter (e.g., debug, tagbump_core=trace)
    TAGBUMP_LOG_PATH        Explicit log file path
    TAGBUMP_LOG_DIR         Log directory
";

/// Command-line interface definition for tagbump.
#[derive(Parser)]
#[command(name = "tagbump")]
#[command(
    about = "Bump a repository version from its git tags, and undo it",
    long_about = None
)]
#[command(version)]
#[command(after_long_help = RELEASE_HELP)]
pub struct Cli {
    /// Release type to apply, or `undo`
    #[arg(value_name = "RELEASE")]
    pub release: Vec<String>,

    /// Bump options.
    #[command(flatten)]
    pub bump: commands::bump::BumpArgs,

    /// Path to configuration file (overrides discovery)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run as if started in DIR
    #[arg(short = 'C', long)]
    pub chdir: Option<PathBuf>,

    /// Only print errors (suppresses warnings/info)
    #[arg(short, long)]
    pub quiet: bool,

    /// More detail (repeatable; e.g. -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Colorize output
    #[arg(long, value_enum, default_value_t)]
    pub color: ColorChoice,

    /// Output as JSON (for scripting)
    #[arg(long)]
    pub json: bool,
}

/// Returns the clap command for documentation generation
pub fn command() -> clap::Command {
    Cli::command()
}
