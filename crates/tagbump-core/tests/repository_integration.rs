//! Bump and undo against real git repositories.
//!
//! Every test builds a throwaway repository in a temp directory. Tests are
//! skipped when `git` is not on `PATH`.

use std::fs;
use std::process::Command;

use camino::Utf8PathBuf;
use tagbump_core::bump::{self, BumpOptions};
use tagbump_core::git::RepositoryHandle;
use tagbump_core::resolve::resolve_current_version;
use tagbump_core::semver::Version;
use tagbump_core::version::ReleaseType;
use tagbump_core::BumpError;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Fixture {
    /// A repository with one commit, or `None` when git is unavailable.
    fn new() -> Option<Self> {
        if which::which("git").is_err() {
            eprintln!("git not found, skipping");
            return None;
        }

        let dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        let fixture = Self { _dir: dir, root };

        fixture.git(&["init", "-q"]);
        fixture.git(&["config", "user.name", "Test User"]);
        fixture.git(&["config", "user.email", "test@example.com"]);
        fixture.git(&["config", "commit.gpgsign", "false"]);
        fixture.git(&["config", "tag.gpgsign", "false"]);
        fixture.git(&["config", "tag.forceSignAnnotated", "false"]);
        fixture.commit("initial");
        Some(fixture)
    }

    fn handle(&self) -> RepositoryHandle {
        RepositoryHandle::open(self.root.clone())
    }

    fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    fn commit(&self, message: &str) {
        self.git(&["commit", "-q", "--allow-empty", "-m", message]);
    }

    fn tag(&self, name: &str) {
        self.git(&["tag", "-a", "-m", name, name]);
    }

    fn head(&self) -> String {
        self.git(&["rev-parse", "HEAD"])
    }

    fn head_message(&self) -> String {
        self.git(&["log", "-1", "--format=%s"])
    }

    fn tags(&self) -> Vec<String> {
        self.git(&["tag", "--list"])
            .lines()
            .map(ToString::to_string)
            .collect()
    }

    fn commit_count(&self) -> usize {
        self.git(&["rev-list", "--count", "HEAD"]).parse().unwrap()
    }
}

#[test]
fn resolves_zero_without_tags() {
    let Some(repo) = Fixture::new() else { return };
    let current = resolve_current_version(&repo.handle()).unwrap();
    assert_eq!(current.version, Version::new(0, 0, 0));
    assert_eq!(current.tag, None);
}

#[test]
fn resolves_nearest_reachable_tag() {
    let Some(repo) = Fixture::new() else { return };
    repo.tag("v1.0.0");
    repo.commit("feature");
    repo.tag("v1.1.0");
    repo.commit("fix");

    let current = resolve_current_version(&repo.handle()).unwrap();
    assert_eq!(current.version, Version::new(1, 1, 0));
    assert_eq!(current.tag.as_deref(), Some("v1.1.0"));
}

#[test]
fn malformed_tag_is_invalid_version_tag() {
    let Some(repo) = Fixture::new() else { return };
    repo.tag("nightly");

    let err = resolve_current_version(&repo.handle()).unwrap_err();
    assert!(matches!(err, BumpError::InvalidVersionTag { ref tag, .. } if tag == "nightly"));
}

#[test]
fn patch_bump_creates_commit_and_tag() {
    let Some(repo) = Fixture::new() else { return };
    repo.tag("v1.2.3");
    let commits = repo.commit_count();

    let outcome = bump::bump(&repo.handle(), ReleaseType::Patch, &BumpOptions::default()).unwrap();

    assert_eq!(outcome.tag, "v1.2.4");
    assert_eq!(repo.commit_count(), commits + 1);
    assert_eq!(repo.head_message(), "1.2.4");
    assert_eq!(repo.git(&["describe", "--tags", "HEAD"]), "v1.2.4");
    // annotated, with the same message as the commit
    assert_eq!(repo.git(&["cat-file", "-t", "v1.2.4"]), "tag");
    assert_eq!(
        repo.git(&["tag", "--list", "--format=%(contents:subject)", "v1.2.4"]),
        "1.2.4"
    );
}

#[test]
fn message_template_is_used_for_commit_and_tag() {
    let Some(repo) = Fixture::new() else { return };
    repo.tag("v0.4.0");

    let options = BumpOptions {
        commit_message: Some("chore(release): %s (was %s)".into()),
        ..BumpOptions::default()
    };
    bump::bump(&repo.handle(), ReleaseType::Minor, &options).unwrap();

    // only the first placeholder is filled in
    assert_eq!(repo.head_message(), "chore(release): 0.5.0 (was %s)");
    assert_eq!(
        repo.git(&["tag", "--list", "--format=%(contents:subject)", "v0.5.0"]),
        "chore(release): 0.5.0 (was %s)"
    );
}

#[test]
fn prerelease_bumps_only_prerelease_segment() {
    let Some(repo) = Fixture::new() else { return };
    repo.tag("v1.2.3");
    let handle = repo.handle();

    let first = bump::bump(&handle, ReleaseType::Prerelease, &BumpOptions::default()).unwrap();
    assert_eq!(first.tag, "v1.2.4-0");
    let second = bump::bump(&handle, ReleaseType::Pre, &BumpOptions::default()).unwrap();
    assert_eq!(second.tag, "v1.2.4-1");
}

#[test]
fn dirty_tree_blocks_bump() {
    let Some(repo) = Fixture::new() else { return };
    repo.tag("v1.2.3");
    fs::write(repo.root.join("notes.txt"), "wip").unwrap();
    let head = repo.head();

    let err = bump::bump(&repo.handle(), ReleaseType::Patch, &BumpOptions::default()).unwrap_err();

    assert!(matches!(err, BumpError::DirtyWorkingTree { ref changes } if changes.contains("notes.txt")));
    assert_eq!(repo.head(), head);
    assert_eq!(repo.tags(), vec!["v1.2.3"]);
}

#[test]
fn force_bumps_dirty_tree_and_keeps_changes() {
    let Some(repo) = Fixture::new() else { return };
    repo.tag("v1.2.3");
    fs::write(repo.root.join("notes.txt"), "wip").unwrap();

    let options = BumpOptions {
        force: true,
        ..BumpOptions::default()
    };
    let outcome = bump::bump(&repo.handle(), ReleaseType::Patch, &options).unwrap();

    assert_eq!(outcome.tag, "v1.2.4");
    // untracked files are not swept into the bump commit
    assert!(repo.git(&["status", "--short"]).contains("notes.txt"));
}

#[test]
fn bump_then_undo_round_trips() {
    let Some(repo) = Fixture::new() else { return };
    repo.tag("v1.2.3");
    let handle = repo.handle();
    let head = repo.head();
    let before = resolve_current_version(&handle).unwrap();

    bump::bump(&handle, ReleaseType::Patch, &BumpOptions::default()).unwrap();
    assert_ne!(repo.head(), head);

    let outcome = bump::undo(&handle).unwrap();

    assert_eq!(outcome.removed, "v1.2.4");
    assert_eq!(outcome.tag, "v1.2.3");
    assert_eq!(repo.head(), head);
    assert_eq!(repo.tags(), vec!["v1.2.3"]);
    assert_eq!(resolve_current_version(&handle).unwrap(), before);
}

#[test]
fn undo_keeps_working_tree_contents() {
    let Some(repo) = Fixture::new() else { return };
    repo.tag("v2.0.0");
    let handle = repo.handle();
    bump::bump(&handle, ReleaseType::Minor, &BumpOptions::default()).unwrap();
    fs::write(repo.root.join("draft.md"), "keep me").unwrap();

    bump::undo(&handle).unwrap();

    assert_eq!(
        fs::read_to_string(repo.root.join("draft.md")).unwrap(),
        "keep me"
    );
}

#[test]
fn undo_after_extra_commit_changes_nothing() {
    let Some(repo) = Fixture::new() else { return };
    repo.tag("v1.2.3");
    let handle = repo.handle();
    bump::bump(&handle, ReleaseType::Patch, &BumpOptions::default()).unwrap();
    repo.commit("more work");
    let head = repo.head();

    let err = bump::undo(&handle).unwrap_err();

    assert!(matches!(err, BumpError::NothingToUndo { tag: Some(ref t), .. } if t == "v1.2.4"));
    assert_eq!(repo.head(), head);
    assert!(repo.tags().contains(&"v1.2.4".to_string()));
}

#[test]
fn undo_leaves_hand_made_unprefixed_tag_alone() {
    let Some(repo) = Fixture::new() else { return };
    repo.commit("release by hand");
    repo.tag("1.2.3");
    let head = repo.head();

    let err = bump::undo(&repo.handle()).unwrap_err();

    assert!(matches!(
        err,
        BumpError::NothingToUndo { tag: Some(ref t), head: Some(ref h) }
            if t == "v1.2.3" && h == "1.2.3"
    ));
    assert_eq!(repo.head(), head);
    assert_eq!(repo.tags(), vec!["1.2.3"]);
}

#[test]
fn undo_without_tags_is_refused() {
    let Some(repo) = Fixture::new() else { return };
    let head = repo.head();

    let err = bump::undo(&repo.handle()).unwrap_err();

    assert!(matches!(err, BumpError::NothingToUndo { tag: None, .. }));
    assert_eq!(repo.head(), head);
}

#[test]
fn existing_tag_blocks_bump_before_commit() {
    let Some(repo) = Fixture::new() else { return };
    repo.tag("v1.2.3");
    // v1.2.4 exists on a side branch, so it isn't the nearest tag
    repo.git(&["checkout", "-q", "-b", "side"]);
    repo.commit("side work");
    repo.tag("v1.2.4");
    repo.git(&["checkout", "-q", "-"]);
    let head = repo.head();

    let err = bump::bump(&repo.handle(), ReleaseType::Patch, &BumpOptions::default()).unwrap_err();

    assert!(matches!(err, BumpError::TagExists { ref tag } if tag == "v1.2.4"));
    assert_eq!(repo.head(), head);
}

#[cfg(unix)]
#[test]
fn commit_hooks_can_be_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let Some(repo) = Fixture::new() else { return };
    repo.tag("v1.0.0");

    let hooks = repo.root.join(".hooks");
    fs::create_dir(&hooks).unwrap();
    let hook = hooks.join("pre-commit");
    fs::write(&hook, "#!/bin/sh\nexit 1\n").unwrap();
    fs::set_permissions(&hook, fs::Permissions::from_mode(0o755)).unwrap();
    repo.git(&["config", "core.hooksPath", hook.parent().unwrap().as_str()]);
    // keep the hook directory out of `git status`
    fs::write(repo.root.join(".git/info/exclude"), ".hooks/\n").unwrap();
    let handle = repo.handle();

    let err = bump::bump(&handle, ReleaseType::Patch, &BumpOptions::default()).unwrap_err();
    assert!(matches!(err, BumpError::ExternalCommandFailed(_)));
    assert_eq!(repo.tags(), vec!["v1.0.0"]);

    let options = BumpOptions {
        run_commit_hooks: false,
        ..BumpOptions::default()
    };
    let outcome = bump::bump(&handle, ReleaseType::Patch, &options).unwrap();
    assert_eq!(outcome.tag, "v1.0.1");
}

#[test]
fn git_outside_repository_is_reported() {
    if which::which("git").is_err() {
        return;
    }
    let dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();

    let err = resolve_current_version(&RepositoryHandle::open(root)).unwrap_err();
    assert!(matches!(err, BumpError::ExternalCommandFailed(_)));
}
