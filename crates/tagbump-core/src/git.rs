//! Git operations for version bumps.
//!
//! Shells out to `git` for all operations. This ensures we inherit the user's
//! GPG signing, hooks, and other configuration.
//!
//! Every operation goes through a [`RepositoryHandle`], which pairs a
//! repository root with a [`CommandRunner`]. Nothing here reads the process's
//! current directory, so one process can drive several repositories.

use std::process::{Command, Output, Stdio};

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    /// Failed to execute the `git` command.
    #[error("failed to run git: {0}")]
    Exec(#[from] std::io::Error),

    /// `git` returned a non-zero exit code.
    #[error("couldn't run '{command}': {stderr}")]
    Command {
        /// The full command line that failed (e.g., "git tag -a -m 1.2.4 v1.2.4").
        command: String,
        /// Captured stderr.
        stderr: String,
    },

    /// Not inside a git repository.
    #[error("not a git repository (or any parent up to mount point)")]
    NotARepo,
}

/// Result alias for git operations.
pub type GitResult<T> = Result<T, GitError>;

/// Capability to run an external program inside a directory.
///
/// Both operations block until the program exits. A non-zero exit status is
/// reported as [`GitError::Command`].
pub trait CommandRunner {
    /// Run `program` with `args` in `dir`, discarding stdout.
    fn run(&self, dir: &Utf8Path, program: &str, args: &[&str]) -> GitResult<()>;

    /// Run `program` with `args` in `dir` and return its trimmed stdout.
    fn run_capturing_output(
        &self,
        dir: &Utf8Path,
        program: &str,
        args: &[&str],
    ) -> GitResult<String>;
}

/// [`CommandRunner`] backed by [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, dir: &Utf8Path, program: &str, args: &[&str]) -> GitResult<()> {
        let output = Command::new(program)
            .args(args)
            .current_dir(dir.as_std_path())
            .stdout(Stdio::null())
            .output()?;
        check_status(program, args, &output).map(|_| ())
    }

    fn run_capturing_output(
        &self,
        dir: &Utf8Path,
        program: &str,
        args: &[&str],
    ) -> GitResult<String> {
        let output = Command::new(program)
            .args(args)
            .current_dir(dir.as_std_path())
            .output()?;
        check_status(program, args, &output)
    }
}

fn check_status(program: &str, args: &[&str], output: &Output) -> GitResult<String> {
    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).trim().to_string());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    // Detect "not a git repo" specifically
    if stderr.contains("not a git repository") {
        return Err(GitError::NotARepo);
    }

    Err(GitError::Command {
        command: command_line(program, args),
        stderr,
    })
}

/// Render a command the way it would be typed, for logs and errors.
pub fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Kind of tag to create for a bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// Plain annotated tag (`git tag -a`).
    Annotated,
    /// GPG/SSH signed tag (`git tag -s`).
    Signed,
}

impl TagKind {
    const fn flag(self) -> &'static str {
        match self {
            Self::Annotated => "-a",
            Self::Signed => "-s",
        }
    }
}

/// A repository to operate on, plus the runner used to talk to `git`.
#[derive(Debug, Clone)]
pub struct RepositoryHandle<R = SystemRunner> {
    root: Utf8PathBuf,
    runner: R,
}

impl RepositoryHandle<SystemRunner> {
    /// Open the repository containing `root`, using the real `git` binary.
    pub fn open(root: impl Into<Utf8PathBuf>) -> Self {
        Self::with_runner(root, SystemRunner)
    }
}

impl<R: CommandRunner> RepositoryHandle<R> {
    /// Create a handle that routes every git call through `runner`.
    pub fn with_runner(root: impl Into<Utf8PathBuf>, runner: R) -> Self {
        Self {
            root: root.into(),
            runner,
        }
    }

    /// The directory git commands run in.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// The runner backing this handle.
    pub const fn runner(&self) -> &R {
        &self.runner
    }

    /// List every tag in the repository.
    #[instrument(skip(self), fields(root = %self.root))]
    pub fn list_tags(&self) -> GitResult<Vec<String>> {
        let tags = lines(&self.git(&["tag", "--list"])?);
        debug!(count = tags.len(), "listed tags");
        Ok(tags)
    }

    /// List the tags whose commits are ancestors of (or equal to) HEAD.
    #[instrument(skip(self), fields(root = %self.root))]
    pub fn reachable_tags(&self) -> GitResult<Vec<String>> {
        let tags = lines(&self.git(&["tag", "--list", "--merged", "HEAD"])?);
        debug!(count = tags.len(), "listed reachable tags");
        Ok(tags)
    }

    /// Get the nearest tag reachable from HEAD, if any.
    ///
    /// Lightweight and annotated tags are both candidates.
    #[instrument(skip(self), fields(root = %self.root))]
    pub fn nearest_tag(&self) -> GitResult<Option<String>> {
        if self.reachable_tags()?.is_empty() {
            debug!("no tag reachable from HEAD");
            return Ok(None);
        }

        let tag = self.git(&["describe", "--tags", "--abbrev=0"])?;
        debug!(%tag, "nearest tag");
        Ok(Some(tag))
    }

    /// Describe `rev` symbolically relative to the nearest tag.
    ///
    /// Yields the bare tag name when a tag points exactly at `rev`, or
    /// `<tag>-<distance>-g<sha>` otherwise.
    #[instrument(skip(self), fields(root = %self.root))]
    pub fn describe(&self, rev: &str) -> GitResult<String> {
        let description = self.git(&["describe", "--tags", rev])?;
        debug!(%description, "described revision");
        Ok(description)
    }

    /// Short-form list of working tree changes (empty when clean).
    #[instrument(skip(self), fields(root = %self.root))]
    pub fn status_short(&self) -> GitResult<String> {
        let status = self.git(&["status", "--short"])?;
        debug!(clean = status.is_empty(), "working tree status");
        Ok(status)
    }

    /// Create an empty commit carrying `message`.
    ///
    /// When `run_hooks` is false the commit is made with `--no-verify`.
    #[instrument(skip(self), fields(root = %self.root))]
    pub fn commit_empty(&self, message: &str, run_hooks: bool) -> GitResult<()> {
        let mut args = vec!["commit", "--allow-empty", "-m", message];
        if !run_hooks {
            args.push("--no-verify");
        }
        self.git_quiet(&args)
    }

    /// Create a tag named `name` at HEAD carrying `message`.
    #[instrument(skip(self), fields(root = %self.root))]
    pub fn create_tag(&self, name: &str, message: &str, kind: TagKind) -> GitResult<()> {
        self.git_quiet(&["tag", kind.flag(), "-m", message, name])
    }

    /// Delete the tag `name`.
    #[instrument(skip(self), fields(root = %self.root))]
    pub fn delete_tag(&self, name: &str) -> GitResult<()> {
        self.git_quiet(&["tag", "--delete", name])
    }

    /// Move the current branch back one commit, keeping index and working tree.
    #[instrument(skip(self), fields(root = %self.root))]
    pub fn reset_soft_to_parent(&self) -> GitResult<()> {
        self.git_quiet(&["reset", "--soft", "HEAD~1"])
    }

    fn git(&self, args: &[&str]) -> GitResult<String> {
        self.runner.run_capturing_output(&self.root, "git", args)
    }

    fn git_quiet(&self, args: &[&str]) -> GitResult<()> {
        self.runner.run(&self.root, "git", args)
    }
}

fn lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Scripted [`CommandRunner`] for exercising bump logic without a repository.
#[cfg(any(test, feature = "testing"))]
pub mod testing {
    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};

    use camino::Utf8Path;

    use super::{CommandRunner, GitError, GitResult, command_line};

    #[derive(Debug, Clone)]
    enum Reply {
        Output(String),
        Failure(String),
    }

    /// Returns canned output per command line and records every invocation.
    ///
    /// Replies are keyed by the full command line (`"git status --short"`).
    /// Several replies for one command are handed out in order, the last one
    /// repeating. Commands with no scripted reply succeed with empty output.
    #[derive(Debug, Default)]
    pub struct ScriptedRunner {
        replies: RefCell<HashMap<String, VecDeque<Reply>>>,
        calls: RefCell<Vec<String>>,
    }

    impl ScriptedRunner {
        /// An empty script: every command succeeds with no output.
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue `output` as the next reply to `command`.
        #[must_use]
        pub fn respond(self, command: &str, output: &str) -> Self {
            self.push(command, Reply::Output(output.to_string()));
            self
        }

        /// Queue a non-zero exit with `stderr` as the next reply to `command`.
        #[must_use]
        pub fn fail(self, command: &str, stderr: &str) -> Self {
            self.push(command, Reply::Failure(stderr.to_string()));
            self
        }

        /// Every command line run so far, in order.
        pub fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        /// Whether any recorded command line starts with `prefix`.
        pub fn ran(&self, prefix: &str) -> bool {
            self.calls.borrow().iter().any(|call| call.starts_with(prefix))
        }

        fn push(&self, command: &str, reply: Reply) {
            self.replies
                .borrow_mut()
                .entry(command.to_string())
                .or_default()
                .push_back(reply);
        }

        fn reply(&self, program: &str, args: &[&str]) -> GitResult<String> {
            let command = command_line(program, args);
            self.calls.borrow_mut().push(command.clone());

            let mut replies = self.replies.borrow_mut();
            let reply = match replies.get_mut(&command) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            };

            match reply {
                Some(Reply::Output(output)) => Ok(output),
                Some(Reply::Failure(stderr)) => Err(GitError::Command { command, stderr }),
                None => Ok(String::new()),
            }
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, _dir: &Utf8Path, program: &str, args: &[&str]) -> GitResult<()> {
            self.reply(program, args).map(|_| ())
        }

        fn run_capturing_output(
            &self,
            _dir: &Utf8Path,
            program: &str,
            args: &[&str],
        ) -> GitResult<String> {
            self.reply(program, args)
        }
    }
}
