//! Current version resolution from tag history.

use semver::Version;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::{BumpError, BumpResult};
use crate::git::{CommandRunner, RepositoryHandle};
use crate::version::{self, tag_name};

/// The version HEAD is currently at, according to its nearest tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentVersion {
    /// Parsed version, without the `v` prefix.
    pub version: Version,
    /// The tag it was read from; `None` when no tag is reachable from HEAD.
    pub tag: Option<String>,
}

impl CurrentVersion {
    /// The version used when history has no tags.
    pub const fn initial() -> Self {
        Self {
            version: Version::new(0, 0, 0),
            tag: None,
        }
    }

    /// The canonical tag name for this version (`v1.2.3`).
    pub fn tag_name(&self) -> String {
        tag_name(&self.version)
    }
}

/// Resolve the current version from the nearest tag reachable from HEAD.
///
/// Falls back to `0.0.0` when no tag is reachable. A tag that isn't a semantic
/// version once its `v` prefix is stripped is a hard error.
#[instrument(skip(repo), fields(root = %repo.root()))]
pub fn resolve_current_version<R: CommandRunner>(
    repo: &RepositoryHandle<R>,
) -> BumpResult<CurrentVersion> {
    let Some(tag) = repo.nearest_tag()? else {
        debug!("no tags, starting from 0.0.0");
        return Ok(CurrentVersion::initial());
    };

    let version = version::parse_version(&tag).map_err(|source| BumpError::InvalidVersionTag {
        tag: tag.clone(),
        source,
    })?;

    debug!(%tag, %version, "resolved current version");
    Ok(CurrentVersion {
        version,
        tag: Some(tag),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::testing::ScriptedRunner;

    fn repo(runner: ScriptedRunner) -> RepositoryHandle<ScriptedRunner> {
        RepositoryHandle::with_runner("/repo", runner)
    }

    fn tagged(tag: &str) -> ScriptedRunner {
        ScriptedRunner::new()
            .respond("git tag --list --merged HEAD", tag)
            .respond("git describe --tags --abbrev=0", tag)
    }

    #[test]
    fn zero_tags_resolves_to_initial() {
        let current = resolve_current_version(&repo(ScriptedRunner::new())).unwrap();
        assert_eq!(current.version, Version::new(0, 0, 0));
        assert_eq!(current.tag, None);
        assert_eq!(current.tag_name(), "v0.0.0");
    }

    #[test]
    fn strips_v_prefix() {
        let current = resolve_current_version(&repo(tagged("v1.2.3"))).unwrap();
        assert_eq!(current.version, Version::new(1, 2, 3));
        assert_eq!(current.tag.as_deref(), Some("v1.2.3"));
    }

    #[test]
    fn accepts_unprefixed_tag() {
        let current = resolve_current_version(&repo(tagged("2.0.0-rc.1"))).unwrap();
        assert_eq!(current.version.to_string(), "2.0.0-rc.1");
        assert_eq!(current.tag.as_deref(), Some("2.0.0-rc.1"));
    }

    #[test]
    fn malformed_tag_is_fatal() {
        let err = resolve_current_version(&repo(tagged("release-42"))).unwrap_err();
        match err {
            BumpError::InvalidVersionTag { tag, .. } => assert_eq!(tag, "release-42"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn git_failure_is_propagated() {
        let runner = ScriptedRunner::new().fail(
            "git tag --list --merged HEAD",
            "error: malformed object name HEAD",
        );
        let err = resolve_current_version(&repo(runner)).unwrap_err();
        assert!(matches!(err, BumpError::ExternalCommandFailed(_)));
    }
}
