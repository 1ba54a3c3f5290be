//! Bitbucket commit discovery.
//!
//! Bitbucket's REST API is used only to enumerate accessible repositories;
//! its commit endpoints carry no line stats and cannot filter by the several
//! email aliases a person commits under. History itself is read from local
//! clones: every reachable repository is cloned into (or fetched inside) the
//! workspace, scanned with `git log` once per alias, and the resulting
//! revision sets are unioned before metadata is resolved per hash.
//!
//! Repositories are reachable two ways, both of which are walked and
//! deduplicated by full name:
//!
//! ```text
//! /repositories?role={owner,admin,contributor,member}   direct access
//! /teams?role={admin,contributor,member}
//!     └──▶ /repositories/{team}                         via membership
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [providers.bitbucket]
//! username = "octocat"
//! app_password = "..."
//! author_emails = ["me@example.com", "me@work.example.com"]
//! # api_url = "https://api.bitbucket.org/2.0"
//! # cache_ttl_hours = 6
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::BitbucketConfig;
use crate::discovery::Discovery;
use crate::git;
use crate::models::CommitRecord;

/// Cache file name under the configured cache directory.
pub const CACHE_FILE: &str = "bitbucket_commits.json";

/// Subdirectory of the workspace that holds this provider's clones.
const WORKSPACE_NAMESPACE: &str = "bitbucket";

const DIRECT_ROLES: [&str; 4] = ["owner", "admin", "contributor", "member"];
const TEAM_ROLES: [&str; 3] = ["admin", "contributor", "member"];

pub struct BitbucketDiscovery {
    config: BitbucketConfig,
    cache_path: PathBuf,
    workspace_dir: PathBuf,
}

impl BitbucketDiscovery {
    pub fn new(config: BitbucketConfig, cache_dir: &Path, workspace_dir: &Path) -> Self {
        Self {
            cache_path: cache_dir.join(CACHE_FILE),
            workspace_dir: workspace_dir.join(WORKSPACE_NAMESPACE),
            config,
        }
    }

    /// Local clone location for a repository, addressed by full name.
    fn repo_dir(&self, full_name: &str) -> PathBuf {
        self.workspace_dir.join(full_name)
    }

    /// Scan one local clone: union revisions across aliases, then resolve
    /// metadata per unique hash. One record per hash, however many aliases
    /// or ref paths reach it.
    fn scan_repository(
        &self,
        full_name: &str,
        public: bool,
        local: &Path,
    ) -> Result<Vec<CommitRecord>> {
        let revisions = git::authored_revisions(local, &self.config.author_emails)?;

        let mut records = Vec::new();
        for rev in &revisions {
            let meta = git::read_commit(local, rev)?;
            records.push(record_from(full_name, public, meta));
        }

        Ok(records)
    }

    /// Every repository the account can reach, keyed by full name.
    ///
    /// A repository reachable through several roles or teams appears exactly
    /// once; the first occurrence wins.
    fn enumerate_repositories(
        &self,
        client: &reqwest::blocking::Client,
    ) -> Result<BTreeMap<String, BitbucketRepo>> {
        let mut repos = BTreeMap::new();

        for role in DIRECT_ROLES {
            let url = format!("{}/repositories?role={}", self.config.api_url, role);
            merge_repos(&mut repos, self.collect_pages(client, url)?);
        }

        // Walk teams once even when several roles report the same team.
        let mut teams = BTreeSet::new();
        for role in TEAM_ROLES {
            let url = format!("{}/teams?role={}", self.config.api_url, role);
            for team in self.collect_pages::<BitbucketTeam>(client, url)? {
                teams.insert(team.username);
            }
        }

        for team in teams {
            let url = format!("{}/repositories/{}", self.config.api_url, team);
            merge_repos(&mut repos, self.collect_pages(client, url)?);
        }

        Ok(repos)
    }

    /// Follow a paged listing through its `next` links.
    fn collect_pages<T: serde::de::DeserializeOwned>(
        &self,
        client: &reqwest::blocking::Client,
        first_url: String,
    ) -> Result<Vec<T>> {
        let mut values = Vec::new();
        let mut url = first_url;

        loop {
            let page: BitbucketPage<T> = self.get_json(client, &url)?;
            values.extend(page.values);

            match page.next {
                Some(next) => url = next,
                None => break,
            }
        }

        Ok(values)
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        client: &reqwest::blocking::Client,
        url: &str,
    ) -> Result<T> {
        let resp = client
            .get(url)
            .basic_auth(&self.config.username, Some(&self.config.app_password))
            .send()
            .with_context(|| format!("Bitbucket request failed: {}", url))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            bail!(
                "Bitbucket request {} failed (HTTP {}): {}",
                url,
                status,
                body.chars().take(500).collect::<String>()
            );
        }

        resp.json()
            .with_context(|| format!("Unexpected Bitbucket response shape from {}", url))
    }
}

impl Discovery for BitbucketDiscovery {
    fn label(&self) -> &str {
        "bitbucket"
    }

    fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    fn reload_after(&self) -> Duration {
        Duration::from_secs(self.config.cache_ttl_hours * 3600)
    }

    fn fetch_commits(&self) -> Result<Vec<CommitRecord>> {
        let client = http_client()?;
        let repos = self.enumerate_repositories(&client)?;
        eprintln!("bitbucket: {} repositories", repos.len());

        let mut records = Vec::new();
        for (full_name, repo) in &repos {
            let local = self.repo_dir(full_name);

            if git::is_repo(&local) {
                eprintln!("bitbucket: updating {}", full_name);
                git::update_repo(&local)?;
            } else {
                eprintln!("bitbucket: cloning {}", full_name);
                git::clone_repo(repo.ssh_clone_url()?, &local)?;
            }

            let scanned = self.scan_repository(full_name, !repo.is_private, &local)?;
            eprintln!("bitbucket: {} ({} commits)", full_name, scanned.len());
            records.extend(scanned);
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

/// Fold a batch into the dedup map; already-seen full names are kept as-is.
fn merge_repos(repos: &mut BTreeMap<String, BitbucketRepo>, batch: Vec<BitbucketRepo>) {
    for repo in batch {
        repos.entry(repo.full_name.clone()).or_insert(repo);
    }
}

fn record_from(full_name: &str, public: bool, meta: git::CommitMeta) -> CommitRecord {
    CommitRecord {
        datetime: meta.datetime,
        hash: meta.hash,
        public,
        repo: Some(full_name.to_string()),
        message: Some(meta.message),
        link: None,
        additions: None,
        deletions: None,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// REST payloads
// ═══════════════════════════════════════════════════════════════════════

/// One page of a Bitbucket 2.0 listing.
#[derive(Debug, Deserialize)]
struct BitbucketPage<T> {
    values: Vec<T>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BitbucketRepo {
    full_name: String,
    is_private: bool,
    links: BitbucketRepoLinks,
}

impl BitbucketRepo {
    /// The SSH clone URL; clones never go over HTTPS.
    fn ssh_clone_url(&self) -> Result<&str> {
        self.links
            .clone
            .iter()
            .find(|link| link.name == "ssh")
            .map(|link| link.href.as_str())
            .ok_or_else(|| anyhow::anyhow!("No ssh clone link for repository {}", self.full_name))
    }
}

#[derive(Debug, Deserialize)]
struct BitbucketRepoLinks {
    clone: Vec<BitbucketCloneLink>,
}

#[derive(Debug, Deserialize)]
struct BitbucketCloneLink {
    name: String,
    href: String,
}

#[derive(Debug, Deserialize)]
struct BitbucketTeam {
    username: String,
}
