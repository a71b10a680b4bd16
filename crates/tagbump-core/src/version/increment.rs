//! Next-version computation, following the increment rules of npm's
//! `semver inc` (with `pre` treated as `prerelease`).

use semver::{Prerelease, Version};
use tracing::{debug, instrument};

use super::{ReleaseType, VersionError, VersionResult};

/// Compute the version that follows `current` for `release`.
///
/// `preid` seeds the pre-release segment for pre-release types
/// (`1.2.3` + prepatch + `beta` → `1.2.4-beta.0`); without it the segment
/// starts at `0`. It is ignored for `major`, `minor`, and `patch`.
///
/// Build metadata is dropped. The result always sorts after `current`;
/// anything else is reported as [`VersionError::NotIncreasing`].
#[instrument]
pub fn increment(
    current: &Version,
    release: ReleaseType,
    preid: Option<&str>,
) -> VersionResult<Version> {
    if let Some(id) = preid {
        validate_preid(id)?;
        if !release.is_prerelease() {
            debug!(preid = id, %release, "pre-release id has no effect");
        }
    }

    let mut pre = identifiers(&current.pre);
    let mut next = Version::new(current.major, current.minor, current.patch);

    match release {
        // A pre-release of a round version is promoted rather than bumped:
        // 1.0.0-1 → 1.0.0, 1.2.0-1 → 1.2.0, 1.2.3-1 → 1.2.3.
        ReleaseType::Major => {
            if current.minor != 0 || current.patch != 0 || pre.is_empty() {
                next.major = step(current.major, current)?;
                next.minor = 0;
                next.patch = 0;
            }
            pre.clear();
        }
        ReleaseType::Minor => {
            if current.patch != 0 || pre.is_empty() {
                next.minor = step(current.minor, current)?;
                next.patch = 0;
            }
            pre.clear();
        }
        ReleaseType::Patch => {
            if pre.is_empty() {
                next.patch = step(current.patch, current)?;
            }
            pre.clear();
        }
        ReleaseType::Premajor => {
            next.major = step(current.major, current)?;
            next.minor = 0;
            next.patch = 0;
            pre = seed(preid);
        }
        ReleaseType::Preminor => {
            next.minor = step(current.minor, current)?;
            next.patch = 0;
            pre = seed(preid);
        }
        ReleaseType::Prepatch => {
            next.patch = step(current.patch, current)?;
            pre = seed(preid);
        }
        ReleaseType::Prerelease | ReleaseType::Pre => {
            if pre.is_empty() {
                next.patch = step(current.patch, current)?;
                pre = seed(preid);
            } else {
                pre = next_prerelease(pre, preid, current)?;
            }
        }
    }

    next.pre = build_prerelease(&pre)?;

    if next <= *current {
        return Err(VersionError::NotIncreasing {
            current: current.clone(),
            next,
            release,
        });
    }

    debug!(%current, %next, %release, "incremented version");
    Ok(next)
}

/// Bump the last numeric identifier (appending `0` if there is none), then
/// restart at `<id>.0` when `preid` names a different series.
fn next_prerelease(
    mut pre: Vec<String>,
    preid: Option<&str>,
    current: &Version,
) -> VersionResult<Vec<String>> {
    match pre.iter().rposition(|ident| numeric(ident).is_some()) {
        Some(index) => {
            let value = numeric(&pre[index]).unwrap_or_default();
            pre[index] = step(value, current)?.to_string();
        }
        None => pre.push("0".to_string()),
    }

    if let Some(id) = preid {
        let same_series = pre.first().map(String::as_str) == Some(id);
        let counted = pre.get(1).and_then(|ident| numeric(ident)).is_some();
        if !(same_series && counted) {
            pre = seed(Some(id));
        }
    }

    Ok(pre)
}

fn seed(preid: Option<&str>) -> Vec<String> {
    match preid {
        Some(id) => vec![id.to_string(), "0".to_string()],
        None => vec!["0".to_string()],
    }
}

fn identifiers(pre: &Prerelease) -> Vec<String> {
    if pre.is_empty() {
        return Vec::new();
    }
    pre.as_str().split('.').map(ToString::to_string).collect()
}

fn build_prerelease(pre: &[String]) -> VersionResult<Prerelease> {
    if pre.is_empty() {
        return Ok(Prerelease::EMPTY);
    }
    Ok(Prerelease::new(&pre.join("."))?)
}

fn numeric(ident: &str) -> Option<u64> {
    if ident.is_empty() || !ident.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    ident.parse().ok()
}

fn step(value: u64, current: &Version) -> VersionResult<u64> {
    value
        .checked_add(1)
        .ok_or_else(|| VersionError::Overflow(current.clone()))
}

fn validate_preid(id: &str) -> VersionResult<()> {
    if id.is_empty() || Prerelease::new(id).is_err() {
        return Err(VersionError::InvalidPreRelease { id: id.to_string() });
    }
    Ok(())
}
