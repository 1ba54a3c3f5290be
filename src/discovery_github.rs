//! GitHub commit discovery.
//!
//! Enumerates every repository the authenticated account owns or
//! collaborates on, then lists the commits authored by the configured
//! username in each, entirely over the REST API. The list payload carries no
//! line stats, so every commit costs one additional detail request.
//!
//! # Configuration
//!
//! ```toml
//! [providers.github]
//! token = "ghp_..."
//! username = "octocat"
//! # api_url = "https://api.github.com"
//! # cache_ttl_hours = 12
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::GithubConfig;
use crate::discovery::Discovery;
use crate::models::CommitRecord;

const PER_PAGE: usize = 100;

/// Cache file name under the configured cache directory.
pub const CACHE_FILE: &str = "github_commits.json";

pub struct GithubDiscovery {
    config: GithubConfig,
    cache_path: PathBuf,
}

impl GithubDiscovery {
    pub fn new(config: GithubConfig, cache_dir: &Path) -> Self {
        Self {
            cache_path: cache_dir.join(CACHE_FILE),
            config,
        }
    }

    /// List all repositories visible to the token holder, page by page.
    fn list_repositories(&self, client: &reqwest::blocking::Client) -> Result<Vec<GithubRepo>> {
        let mut repos = Vec::new();
        let mut page = 1;

        loop {
            let url = format!(
                "{}/user/repos?affiliation=owner,collaborator&per_page={}&page={}",
                self.config.api_url, PER_PAGE, page
            );
            let batch: Vec<GithubRepo> = self.get_json(client, &url)?;
            let batch_len = batch.len();
            repos.extend(batch);

            if batch_len < PER_PAGE {
                break;
            }
            page += 1;
        }

        Ok(repos)
    }

    /// List the commits authored by the configured username in one repository.
    fn list_authored_commits(
        &self,
        client: &reqwest::blocking::Client,
        full_name: &str,
    ) -> Result<Vec<GithubCommit>> {
        let mut commits = Vec::new();
        let mut page = 1;

        loop {
            let url = format!(
                "{}/repos/{}/commits?author={}&per_page={}&page={}",
                self.config.api_url, full_name, self.config.username, PER_PAGE, page
            );
            let batch: Vec<GithubCommit> = self.get_json(client, &url)?;
            let batch_len = batch.len();
            commits.extend(batch);

            if batch_len < PER_PAGE {
                break;
            }
            page += 1;
        }

        Ok(commits)
    }

    /// Fetch the per-commit detail payload, which carries the line stats.
    fn commit_detail(
        &self,
        client: &reqwest::blocking::Client,
        full_name: &str,
        sha: &str,
    ) -> Result<GithubCommitDetail> {
        let url = format!("{}/repos/{}/commits/{}", self.config.api_url, full_name, sha);
        self.get_json(client, &url)
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        client: &reqwest::blocking::Client,
        url: &str,
    ) -> Result<T> {
        let resp = client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.config.token))
            .header("Accept", "application/vnd.github+json")
            .send()
            .with_context(|| format!("GitHub request failed: {}", url))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            bail!(
                "GitHub request {} failed (HTTP {}): {}",
                url,
                status,
                body.chars().take(500).collect::<String>()
            );
        }

        resp.json()
            .with_context(|| format!("Unexpected GitHub response shape from {}", url))
    }
}

impl Discovery for GithubDiscovery {
    fn label(&self) -> &str {
        "github"
    }

    fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    fn reload_after(&self) -> Duration {
        Duration::from_secs(self.config.cache_ttl_hours * 3600)
    }

    fn fetch_commits(&self) -> Result<Vec<CommitRecord>> {
        let client = http_client()?;
        let repos = self.list_repositories(&client)?;
        eprintln!("github: {} repositories", repos.len());

        let mut records = Vec::new();
        for repo in &repos {
            let commits = self.list_authored_commits(&client, &repo.full_name)?;
            eprintln!("github: {} ({} commits)", repo.full_name, commits.len());

            for commit in commits {
                let detail = self.commit_detail(&client, &repo.full_name, &commit.sha)?;
                records.push(record_from(repo, commit, detail.stats));
            }
        }

        Ok(records)
    }
}

fn http_client() -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .user_agent(concat!("gitledger/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

fn record_from(repo: &GithubRepo, commit: GithubCommit, stats: GithubCommitStats) -> CommitRecord {
    CommitRecord {
        datetime: commit.commit.author.date,
        hash: commit.sha,
        public: !repo.private,
        repo: Some(repo.full_name.clone()),
        message: Some(commit.commit.message),
        link: Some(commit.html_url),
        additions: Some(stats.additions),
        deletions: Some(stats.deletions),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// REST payloads
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct GithubRepo {
    full_name: String,
    private: bool,
}

#[derive(Debug, Deserialize)]
struct GithubCommit {
    sha: String,
    html_url: String,
    commit: GithubCommitInner,
}

#[derive(Debug, Deserialize)]
struct GithubCommitInner {
    message: String,
    author: GithubCommitAuthor,
}

#[derive(Debug, Deserialize)]
struct GithubCommitAuthor {
    date: String,
}

#[derive(Debug, Deserialize)]
struct GithubCommitDetail {
    stats: GithubCommitStats,
}

#[derive(Debug, Deserialize)]
struct GithubCommitStats {
    additions: u64,
    deletions: u64,
}
