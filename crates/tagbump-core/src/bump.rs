//! Version bump and undo.
//!
//! All orchestration logic lives here. The CLI is purely a display layer.
//!
//! # Bump
//!
//! 1. **Plan** ([`plan_bump`]): resolve the current version, check the
//!    working tree, compute the next version and the commit message.
//!    Nothing is written.
//! 2. **Execute** ([`BumpPlan::execute`]): create an empty commit, then tag
//!    it `v<next>`.
//!
//! If the commit succeeds and the tag fails, the commit is left in place and
//! [`BumpError::TagFailedAfterCommit`] says how to drop it.
//!
//! # Undo
//!
//! [`undo`] reverses the last bump, but only while the bump commit is still
//! HEAD: it moves the branch back one commit (soft) and deletes the tag.

use semver::Version;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::config::BumpConfig;
use crate::error::{BumpError, BumpResult};
use crate::git::{CommandRunner, RepositoryHandle, TagKind};
use crate::resolve::resolve_current_version;
use crate::version::{self, ReleaseType, tag_name};

// ──────────────────────────────────────────────
// Inputs
// ──────────────────────────────────────────────

/// What to do with the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Record a new version.
    Bump(ReleaseType),
    /// Remove the most recent bump.
    Undo,
}

impl Action {
    /// Keyword selecting [`Action::Undo`].
    pub const UNDO: &'static str = "undo";

    /// Parse the positional arguments: exactly one release keyword or `undo`.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> BumpResult<Self> {
        let [arg] = args else {
            return Err(BumpError::WrongArgumentCount { given: args.len() });
        };
        Self::from_keyword(arg.as_ref())
    }

    /// Parse a single release keyword or `undo`.
    pub fn from_keyword(keyword: &str) -> BumpResult<Self> {
        if keyword == Self::UNDO {
            return Ok(Self::Undo);
        }
        ReleaseType::from_keyword(keyword)
            .map(Self::Bump)
            .ok_or_else(|| BumpError::UnrecognizedReleaseType {
                given: keyword.to_string(),
            })
    }
}

/// Options for a bump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpOptions {
    /// Pre-release identifier for pre-release types (`beta` → `1.2.4-beta.0`).
    pub pre_release_id: Option<String>,
    /// Commit and tag message; the first `%s` becomes the new version.
    /// Defaults to the bare version.
    pub commit_message: Option<String>,
    /// Bump even if the working tree has uncommitted changes.
    pub force: bool,
    /// Create a signed tag instead of an annotated one.
    pub sign_tag: bool,
    /// Run commit hooks for the bump commit.
    pub run_commit_hooks: bool,
}

impl Default for BumpOptions {
    fn default() -> Self {
        Self {
            pre_release_id: None,
            commit_message: None,
            force: false,
            sign_tag: false,
            run_commit_hooks: true,
        }
    }
}

impl BumpOptions {
    /// Start from configured defaults, if any.
    pub fn from_config(config: Option<&BumpConfig>) -> Self {
        let defaults = Self::default();
        let Some(config) = config else {
            return defaults;
        };
        Self {
            pre_release_id: config.preid.clone(),
            commit_message: config.message.clone(),
            sign_tag: config.sign_tag.unwrap_or(defaults.sign_tag),
            run_commit_hooks: config.commit_hooks.unwrap_or(defaults.run_commit_hooks),
            ..defaults
        }
    }
}

/// Build the commit/tag message for `next`.
///
/// Only the first `%s` is substituted; later ones are kept as written.
pub fn commit_message(template: Option<&str>, next: &Version) -> String {
    let next = next.to_string();
    template.map_or_else(|| next.clone(), |t| t.replacen("%s", &next, 1))
}

// ──────────────────────────────────────────────
// Phases
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Phase {
    ResolvingVersion,
    ValidatingPreconditions,
    ComputingNext,
    Committing,
    Tagging,
    UndoValidating,
    UndoResetting,
    UndoUntagging,
}

impl Phase {
    fn enter(self) {
        debug!(phase = ?self, "entering phase");
    }
}

// ──────────────────────────────────────────────
// Bump
// ──────────────────────────────────────────────

/// A computed bump that has not been written yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BumpPlan {
    /// The release type that was applied.
    pub release: ReleaseType,
    /// The version before the bump.
    pub previous: Version,
    /// The version the bump records.
    pub next: Version,
    /// Tag that will be created (`v<next>`).
    pub tag: String,
    /// Message for both the commit and the tag.
    pub message: String,
    /// Whether the tag will be signed.
    pub sign_tag: bool,
    /// Whether commit hooks will run.
    pub run_commit_hooks: bool,
}

/// Result of a successful bump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BumpOutcome {
    /// The version before the bump.
    pub previous: Version,
    /// The version now recorded.
    pub new: Version,
    /// The tag that was created.
    pub tag: String,
}

/// Resolve, validate, and compute a bump without touching history.
#[instrument(skip(repo, options), fields(root = %repo.root()))]
pub fn plan_bump<R: CommandRunner>(
    repo: &RepositoryHandle<R>,
    release: ReleaseType,
    options: &BumpOptions,
) -> BumpResult<BumpPlan> {
    Phase::ResolvingVersion.enter();
    let current = resolve_current_version(repo)?;

    Phase::ValidatingPreconditions.enter();
    let changes = repo.status_short()?;
    if !changes.is_empty() {
        if !options.force {
            return Err(BumpError::DirtyWorkingTree { changes });
        }
        warn!(%changes, "working tree not clean, bumping anyway (forced)");
    }

    Phase::ComputingNext.enter();
    let next = version::increment(
        &current.version,
        release,
        options.pre_release_id.as_deref(),
    )?;
    let tag = tag_name(&next);
    if repo.list_tags()?.contains(&tag) {
        return Err(BumpError::TagExists { tag });
    }

    let message = commit_message(options.commit_message.as_deref(), &next);
    debug!(previous = %current.version, %next, %tag, "planned bump");

    Ok(BumpPlan {
        release,
        previous: current.version,
        next,
        tag,
        message,
        sign_tag: options.sign_tag,
        run_commit_hooks: options.run_commit_hooks,
    })
}

impl BumpPlan {
    /// Create the bump commit and its tag.
    #[instrument(skip(self, repo), fields(root = %repo.root(), tag = %self.tag))]
    pub fn execute<R: CommandRunner>(
        &self,
        repo: &RepositoryHandle<R>,
    ) -> BumpResult<BumpOutcome> {
        Phase::Committing.enter();
        repo.commit_empty(&self.message, self.run_commit_hooks)?;

        Phase::Tagging.enter();
        let kind = if self.sign_tag {
            TagKind::Signed
        } else {
            TagKind::Annotated
        };
        repo.create_tag(&self.tag, &self.message, kind)
            .map_err(|source| BumpError::TagFailedAfterCommit {
                tag: self.tag.clone(),
                source,
            })?;

        info!(
            previous = %self.previous,
            new = %self.next,
            tag = %self.tag,
            "bump complete"
        );

        Ok(BumpOutcome {
            previous: self.previous.clone(),
            new: self.next.clone(),
            tag: self.tag.clone(),
        })
    }
}

/// Plan and execute a bump, returning the new tag.
pub fn bump<R: CommandRunner>(
    repo: &RepositoryHandle<R>,
    release: ReleaseType,
    options: &BumpOptions,
) -> BumpResult<BumpOutcome> {
    plan_bump(repo, release, options)?.execute(repo)
}

// ──────────────────────────────────────────────
// Undo
// ──────────────────────────────────────────────

/// Result of a successful undo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UndoOutcome {
    /// The tag that was deleted.
    pub removed: String,
    /// The version in effect again.
    pub current: Version,
    /// Canonical tag name of [`UndoOutcome::current`].
    pub tag: String,
}

/// Undo the most recent bump.
///
/// Only allowed while HEAD is described exactly as `v<current version>`, the
/// tag a bump creates.
/// The working tree is never touched.
#[instrument(skip(repo), fields(root = %repo.root()))]
pub fn undo<R: CommandRunner>(repo: &RepositoryHandle<R>) -> BumpResult<UndoOutcome> {
    Phase::ResolvingVersion.enter();
    let current = resolve_current_version(repo)?;

    Phase::UndoValidating.enter();
    if current.tag.is_none() {
        return Err(BumpError::NothingToUndo {
            tag: None,
            head: None,
        });
    }
    // Only a canonical `v<version>` tag on HEAD is one this tool created.
    let tag = current.tag_name();
    let head = repo.describe("HEAD")?;
    if head != tag {
        return Err(BumpError::NothingToUndo {
            tag: Some(tag),
            head: Some(head),
        });
    }

    Phase::UndoResetting.enter();
    repo.reset_soft_to_parent()?;

    Phase::UndoUntagging.enter();
    repo.delete_tag(&tag)?;

    let restored = resolve_current_version(repo)?;
    info!(removed = %tag, current = %restored.version, "undo complete");

    Ok(UndoOutcome {
        removed: tag,
        tag: restored.tag_name(),
        current: restored.version,
    })
}
