//! Bump command, a thin CLI layer over `tagbump_core::bump`.

use anyhow::Context;
use clap::Args;
use owo_colors::{OwoColorize, Stream, Style};
use serde::Serialize;
use tracing::{debug, instrument};

use tagbump_core::bump::{self, BumpOptions, BumpPlan};
use tagbump_core::config::BumpConfig;
use tagbump_core::git::RepositoryHandle;
use tagbump_core::version::ReleaseType;

use super::Output;

/// Options that shape a bump.
#[derive(Args, Debug, Default)]
pub struct BumpArgs {
    /// Pre-release identifier (e.g. "beta" gives 1.2.4-beta.0)
    #[arg(long, value_name = "ID")]
    pub preid: Option<String>,

    /// Commit and tag message; the first "%s" is replaced by the new version
    #[arg(short, long, value_name = "TEMPLATE")]
    pub message: Option<String>,

    /// Bump even if the working tree has uncommitted changes
    #[arg(short, long)]
    pub force: bool,

    /// Create a signed tag (git tag -s)
    #[arg(long)]
    pub sign_git_tag: bool,

    /// Skip pre-commit and commit-msg hooks for the bump commit
    #[arg(long)]
    pub no_commit_hooks: bool,

    /// Show the version that would be recorded without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl BumpArgs {
    /// Merge command-line flags over configured defaults.
    pub fn options(&self, config: Option<&BumpConfig>) -> BumpOptions {
        let mut options = BumpOptions::from_config(config);
        if let Some(preid) = &self.preid {
            options.pre_release_id = Some(preid.clone());
        }
        if let Some(message) = &self.message {
            options.commit_message = Some(message.clone());
        }
        options.force = self.force;
        if self.sign_git_tag {
            options.sign_tag = true;
        }
        if self.no_commit_hooks {
            options.run_commit_hooks = false;
        }
        options
    }
}

#[derive(Serialize)]
struct DryRun<'a> {
    #[serde(flatten)]
    plan: &'a BumpPlan,
    dry_run: bool,
}

/// Execute a bump.
#[instrument(name = "cmd_bump", skip_all, fields(%release, json_output = output.json))]
pub fn cmd_bump(
    repo: &RepositoryHandle,
    release: ReleaseType,
    args: &BumpArgs,
    config: Option<&BumpConfig>,
    output: Output,
) -> anyhow::Result<()> {
    let options = args.options(config);
    debug!(?options, dry_run = args.dry_run, "executing bump command");

    let plan = bump::plan_bump(repo, release, &options).context("bump planning failed")?;

    if args.dry_run {
        if output.json {
            return output.print_json(&DryRun {
                plan: &plan,
                dry_run: true,
            });
        }
        output.note(format_args!(
            "{} → {} (dry run, nothing written)",
            plan.previous.if_supports_color(Stream::Stderr, |v| v.dimmed()),
            plan.next
                .if_supports_color(Stream::Stderr, |v| v.style(Style::new().green().bold()))
        ));
        println!("{}", plan.tag);
        return Ok(());
    }

    let outcome = plan.execute(repo).context("bump failed")?;

    if output.json {
        return output.print_json(&outcome);
    }
    output.note(format_args!(
        "{} {} → {}",
        "✓".if_supports_color(Stream::Stderr, |s| s.green()),
        outcome.previous.if_supports_color(Stream::Stderr, |v| v.dimmed()),
        outcome.new
            .if_supports_color(Stream::Stderr, |v| v.style(Style::new().green().bold()))
    ));
    println!(
        "{}",
        outcome.tag.if_supports_color(Stream::Stdout, |tag| tag.green())
    );

    Ok(())
}
