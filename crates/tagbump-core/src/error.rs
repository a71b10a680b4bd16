//! Error types for tagbump-core

use thiserror::Error;

use crate::git::GitError;
use crate::version::{ReleaseType, VersionError};

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors from resolving, bumping, or undoing a version.
#[derive(Error, Debug)]
pub enum BumpError {
    /// The nearest tag is not a semantic version.
    #[error("latest git tag ({tag}) not a valid semver version: {source}")]
    InvalidVersionTag {
        /// The tag as found in history.
        tag: String,
        /// Why it failed to parse.
        source: VersionError,
    },

    /// There are uncommitted changes and `force` was not set.
    #[error(
        "working directory not clean; stash/commit changes or run with --force\n{changes}"
    )]
    DirtyWorkingTree {
        /// `git status --short` output.
        changes: String,
    },

    /// The requested release keyword is not one we know.
    #[error("first argument must be one of: {}, undo (got {given:?})", valid_release_types())]
    UnrecognizedReleaseType {
        /// What the caller passed.
        given: String,
    },

    /// Exactly one release argument is required.
    #[error("provided incorrect number of arguments ({given}); must be 1")]
    WrongArgumentCount {
        /// How many were supplied.
        given: usize,
    },

    /// HEAD is not described exactly as `v<current version>`.
    #[error(
        "can only undo a version bump if no additional commits have been added{}",
        describe_undo_state(.tag, .head)
    )]
    NothingToUndo {
        /// The tag HEAD had to match (`v<current version>`); `None` without tags.
        tag: Option<String>,
        /// How `git describe` names HEAD, when it was asked.
        head: Option<String>,
    },

    /// The tag for the computed version already exists.
    #[error("tag {tag} already exists; refusing to create a commit it can't be attached to")]
    TagExists {
        /// The colliding tag name.
        tag: String,
    },

    /// A git command failed.
    #[error(transparent)]
    ExternalCommandFailed(#[from] GitError),

    /// The bump commit was created but its tag was not.
    #[error(
        "created the bump commit but failed to tag it as {tag}: {source}\n\
         the repository now has an untagged bump commit; \
         run `git reset --soft HEAD~1` to drop it"
    )]
    TagFailedAfterCommit {
        /// The tag that could not be created.
        tag: String,
        /// The failing tag command.
        source: GitError,
    },

    /// The next version could not be computed.
    #[error(transparent)]
    Increment(#[from] VersionError),
}

/// Result alias for bump operations.
pub type BumpResult<T> = Result<T, BumpError>;

fn valid_release_types() -> String {
    ReleaseType::ALL
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_undo_state(tag: &Option<String>, head: &Option<String>) -> String {
    match (tag, head) {
        (None, _) => " (no version tag found)".to_string(),
        (Some(tag), Some(head)) => format!(" (expected HEAD at {tag}, HEAD is {head})"),
        (Some(tag), None) => format!(" (expected HEAD at {tag})"),
    }
}
