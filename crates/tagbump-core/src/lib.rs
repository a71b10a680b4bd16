//! Core library for tagbump.
//!
//! Computes the next semantic version of a repository from its git tags and
//! records it as an empty commit plus a `v`-prefixed tag, with a matching
//! undo.
//!
//! # Modules
//!
//! - [`bump`] - Bump and undo transactions
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//! - [`git`] - Git operations behind a swappable command runner
//! - [`resolve`] - Current version resolution from tag history
//! - [`version`] - Release types and next-version computation
//!
//! # Quick Start
//!
//! ```no_run
//! use tagbump_core::bump::{self, BumpOptions};
//! use tagbump_core::git::RepositoryHandle;
//! use tagbump_core::version::ReleaseType;
//!
//! let repo = RepositoryHandle::open(".");
//! let outcome = bump::bump(&repo, ReleaseType::Patch, &BumpOptions::default())
//!     .expect("bump failed");
//!
//! println!("{}", outcome.tag);
//! ```
#![deny(unsafe_code)]

pub mod bump;

pub mod config;

pub mod error;

pub mod git;

pub mod resolve;

pub mod version;

pub use config::{Config, ConfigLoader, LogLevel};

pub use error::{BumpError, BumpResult, ConfigError, ConfigResult};

// Re-export semver so downstream crates don't need a direct dependency.
pub use semver;
