//! Version parsing, release types, and next-version computation.
//!
//! Versions are plain [`semver::Version`]s. Tags carry a `v` prefix, the
//! in-memory form never does.

mod increment;

pub use increment::increment;

use semver::Version;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix used for every tag this crate writes.
pub const TAG_PREFIX: &str = "v";

/// Errors from version operations.
#[derive(Error, Debug)]
pub enum VersionError {
    /// Failed to parse a semver string.
    #[error("invalid semver: {0}")]
    InvalidSemver(#[from] semver::Error),

    /// The pre-release identifier can't be used in a version.
    #[error("invalid pre-release identifier {id:?}")]
    InvalidPreRelease {
        /// The rejected identifier.
        id: String,
    },

    /// The computed version would not sort after the current one.
    #[error("{release} would move {current} to {next}, which is not a newer version")]
    NotIncreasing {
        /// The version being incremented.
        current: Version,
        /// What the increment produced.
        next: Version,
        /// The release type that was applied.
        release: ReleaseType,
    },

    /// A numeric component can't be incremented any further.
    #[error("version component overflow while incrementing {0}")]
    Overflow(Version),
}

/// Result alias for version operations.
pub type VersionResult<T> = Result<T, VersionError>;

/// Which part of a version a bump increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    /// X.0.0
    Major,
    /// x.Y.0
    Minor,
    /// x.y.Z
    Patch,
    /// (X+1).0.0-<id>.0
    Premajor,
    /// x.(Y+1).0-<id>.0
    Preminor,
    /// x.y.(Z+1)-<id>.0
    Prepatch,
    /// Next pre-release of the current (or next patch) version.
    Prerelease,
    /// Alias for [`ReleaseType::Prerelease`].
    Pre,
}

impl ReleaseType {
    /// Every release type, in the order they are listed to users.
    pub const ALL: [Self; 8] = [
        Self::Major,
        Self::Minor,
        Self::Patch,
        Self::Premajor,
        Self::Preminor,
        Self::Prepatch,
        Self::Prerelease,
        Self::Pre,
    ];

    /// The keyword used on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
            Self::Premajor => "premajor",
            Self::Preminor => "preminor",
            Self::Prepatch => "prepatch",
            Self::Prerelease => "prerelease",
            Self::Pre => "pre",
        }
    }

    /// Look up a release type by its keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == keyword)
    }

    /// Whether this release type attaches a pre-release segment.
    pub const fn is_prerelease(self) -> bool {
        matches!(
            self,
            Self::Premajor | Self::Preminor | Self::Prepatch | Self::Prerelease | Self::Pre
        )
    }
}

impl std::fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a version string, stripping an optional `v` prefix.
pub fn parse_version(s: &str) -> VersionResult<Version> {
    let s = s.strip_prefix(TAG_PREFIX).unwrap_or(s);
    Ok(Version::parse(s)?)
}

/// The tag name a version is recorded under (`1.2.3` → `v1.2.3`).
pub fn tag_name(version: &Version) -> String {
    format!("{TAG_PREFIX}{version}")
}
