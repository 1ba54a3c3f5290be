//! Thin wrappers around the `git` CLI.
//!
//! Clone-based discovery never links a git library; every operation shells
//! out to the installed `git` binary and fails fast on a non-zero exit.

use anyhow::{bail, Context, Result};
use std::collections::BTreeSet;
use std::path::Path;
use std::process::Command;

/// Metadata resolved for a single revision.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitMeta {
    pub hash: String,
    pub datetime: String,
    pub message: String,
}

/// Whether `dir` already holds a git repository.
pub fn is_repo(dir: &Path) -> bool {
    dir.join(".git").exists()
}

pub fn clone_repo(url: &str, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest)
        .with_context(|| format!("Failed to create clone directory: {}", dest.display()))?;

    let output = Command::new("git")
        .arg("clone")
        .arg(url)
        .arg(dest)
        .output()
        .with_context(|| "Failed to execute 'git clone'. Is git installed?")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git clone {} failed: {}", url, stderr.trim());
    }

    Ok(())
}

/// Update an existing clone by fetching from origin.
///
/// History scanning walks all refs, including remote-tracking ones, so a
/// fetch is enough; the working tree is never consulted.
pub fn update_repo(repo_dir: &Path) -> Result<()> {
    let output = Command::new("git")
        .args(["fetch", "origin"])
        .current_dir(repo_dir)
        .output()
        .with_context(|| "Failed to execute 'git fetch'")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "git fetch in {} failed: {}",
            repo_dir.display(),
            stderr.trim()
        );
    }

    Ok(())
}

/// List every revision across all refs whose author matches `email`.
pub fn revisions_by_author(repo_dir: &Path, email: &str) -> Result<Vec<String>> {
    let author_arg = format!("--author={}", email);
    let output = Command::new("git")
        .args(["log", "--all", "--pretty=%H", &author_arg])
        .current_dir(repo_dir)
        .output()
        .with_context(|| "Failed to execute 'git log'")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "git log in {} failed: {}",
            repo_dir.display(),
            stderr.trim()
        );
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Union of revisions authored under any of the given email aliases.
///
/// The same commit found under two aliases, or reachable through two refs,
/// appears exactly once.
pub fn authored_revisions(repo_dir: &Path, emails: &[String]) -> Result<BTreeSet<String>> {
    let mut revisions = BTreeSet::new();
    for email in emails {
        revisions.extend(revisions_by_author(repo_dir, email)?);
    }
    Ok(revisions)
}

/// Resolve hash, strict-ISO-8601 author date, and message for one revision.
pub fn read_commit(repo_dir: &Path, rev: &str) -> Result<CommitMeta> {
    let output = Command::new("git")
        .args(["show", "-s", "--format=%H%x00%aI%x00%B", rev])
        .current_dir(repo_dir)
        .output()
        .with_context(|| "Failed to execute 'git show'")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "git show {} in {} failed: {}",
            rev,
            repo_dir.display(),
            stderr.trim()
        );
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    // Commit messages cannot contain NUL, so two separators are enough.
    let mut parts = stdout.splitn(3, '\0');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(hash), Some(datetime), Some(message)) => Ok(CommitMeta {
            hash: hash.trim().to_string(),
            datetime: datetime.trim().to_string(),
            message: message.trim_end().to_string(),
        }),
        _ => bail!("Unexpected 'git show' output for revision {}", rev),
    }
}
