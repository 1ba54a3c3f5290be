//! The commit discovery contract.
//!
//! Every provider strategy implements [`Discovery`]: it names itself, points
//! at a cache file, sets a freshness window, and knows how to fetch commits
//! from its source. The cache-or-fetch logic lives once, on the trait itself:
//!
//! ```text
//! get_commits()
//!     ├── cache fresh?  ──▶ read cache file, return verbatim
//!     └── stale/missing ──▶ fetch_commits() ──▶ overwrite cache ──▶ return
//! ```
//!
//! Caches are plain JSON arrays of [`CommitRecord`], one file per strategy,
//! replaced wholesale on every refresh. Freshness is judged purely by the
//! file's modification time. There is no merge, no partial update, and no
//! corruption recovery: a cache file that no longer parses fails the run.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use std::time::{Duration, SystemTime};

use crate::models::CommitRecord;

// ═══════════════════════════════════════════════════════════════════════
// Discovery trait
// ═══════════════════════════════════════════════════════════════════════

/// A strategy that produces the user's commits from one hosting provider.
///
/// Implementations supply [`fetch_commits`](Discovery::fetch_commits); the
/// caching wrapper [`get_commits`](Discovery::get_commits) is provided here
/// and never reimplemented per strategy.
pub trait Discovery {
    /// Short provider tag (e.g. `"github"`), used in progress output.
    fn label(&self) -> &str;

    /// Location of this strategy's JSON cache file.
    fn cache_path(&self) -> &Path;

    /// Maximum cache age before commits are re-fetched from the source.
    fn reload_after(&self) -> Duration;

    /// Fetch all commits from the provider, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Any network, authentication, or VCS failure is returned as-is; there
    /// are no retries and the caller treats the error as fatal.
    fn fetch_commits(&self) -> Result<Vec<CommitRecord>>;

    /// Return commits from the cache when it is fresh, otherwise fetch from
    /// the source and replace the cache with the full result.
    fn get_commits(&self) -> Result<Vec<CommitRecord>> {
        let path = self.cache_path();

        if cache_is_fresh(path, self.reload_after())? {
            eprintln!("{}: cache fresh, reading {}", self.label(), path.display());
            return read_cache(path);
        }

        eprintln!("{}: cache stale or missing, fetching from source", self.label());
        let records = self.fetch_commits()?;
        write_cache(path, &records)?;
        Ok(records)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Cache helpers
// ═══════════════════════════════════════════════════════════════════════

/// Whether `path` exists and was modified less than `threshold` ago.
///
/// A missing file is simply not fresh; a file we cannot stat is an error.
pub fn cache_is_fresh(path: &Path, threshold: Duration) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }

    let modified = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .with_context(|| format!("Failed to stat cache file: {}", path.display()))?;

    // An mtime in the future counts as age zero.
    let age = SystemTime::now()
        .duration_since(modified)
        .unwrap_or(Duration::ZERO);

    Ok(age < threshold)
}

/// Read and deserialize a cache file.
pub fn read_cache(path: &Path) -> Result<Vec<CommitRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read cache file: {}", path.display()))?;

    let records: Vec<CommitRecord> = serde_json::from_str(&content)
        .with_context(|| format!("Cache file is corrupt: {}", path.display()))?;

    Ok(records)
}

/// Serialize records and replace the cache file, creating parent
/// directories as needed.
pub fn write_cache(path: &Path, records: &[CommitRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create cache directory: {}", parent.display())
        })?;
    }

    let json = pretty_json(&records)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write cache file: {}", path.display()))?;

    Ok(())
}

/// Serialize a value as JSON with 4-space indentation.
///
/// Used for both cache files and the project-stats output so every JSON
/// artifact this tool writes diffs the same way.
pub fn pretty_json<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(String::from_utf8(buf)?)
}
