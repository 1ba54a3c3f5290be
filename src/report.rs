//! Report driver.
//!
//! Runs every configured discovery in order, concatenates the results, and
//! writes the two derived views: commits per day as CSV and commits per
//! project as JSON. The two writes are independent; a failure between them
//! leaves the first output updated and the second stale.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::Config;
use crate::discovery::{self, Discovery};
use crate::discovery_bitbucket::BitbucketDiscovery;
use crate::discovery_github::GithubDiscovery;
use crate::models::CommitRecord;
use crate::stats;

/// One boxed strategy per configured provider, GitHub first.
pub fn build_discoveries(config: &Config) -> Vec<Box<dyn Discovery>> {
    let mut discoveries: Vec<Box<dyn Discovery>> = Vec::new();

    if let Some(github) = &config.providers.github {
        discoveries.push(Box::new(GithubDiscovery::new(
            github.clone(),
            &config.cache.dir,
        )));
    }

    if let Some(bitbucket) = &config.providers.bitbucket {
        discoveries.push(Box::new(BitbucketDiscovery::new(
            bitbucket.clone(),
            &config.cache.dir,
            &config.workspace.dir,
        )));
    }

    discoveries
}

/// Collect commits from every provider and write both stat files.
pub fn run_report(config: &Config) -> Result<()> {
    let discoveries = build_discoveries(config);

    let mut commits: Vec<CommitRecord> = Vec::new();
    let mut per_provider = Vec::new();

    for discovery in &discoveries {
        let records = discovery.get_commits()?;
        per_provider.push((discovery.label().to_string(), records.len()));
        commits.extend(records);
    }

    let daily = stats::per_day_counts(&commits)?;
    let projects = stats::per_project_counts(&commits);

    write_daily_csv(&config.output.daily_csv, &daily)?;
    write_project_json(&config.output.project_json, &projects)?;

    println!("commit report");
    for (label, count) in &per_provider {
        println!("  {}: {} commits", label, count);
    }
    println!("  total: {} commits", commits.len());
    println!("  days: {}", daily.len());
    println!("  projects: {}", projects.len());
    println!("  daily stats: {}", config.output.daily_csv.display());
    println!("  project stats: {}", config.output.project_json.display());
    println!("ok");

    Ok(())
}

/// Write `date,commits` rows in ascending date order.
fn write_daily_csv(path: &Path, daily: &BTreeMap<String, u64>) -> Result<()> {
    let mut out = String::from("date,commits\n");
    for (date, count) in daily {
        out.push_str(&format!("{},{}\n", date, count));
    }
    write_output(path, &out)
}

/// Write the project map as JSON with 4-space indentation.
fn write_project_json(path: &Path, projects: &BTreeMap<String, u64>) -> Result<()> {
    let json = discovery::pretty_json(projects)?;
    write_output(path, &json)
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    // A bare filename has an empty parent; nothing to create then.
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }

    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        BitbucketConfig, CacheConfig, GithubConfig, OutputConfig, ProvidersConfig, WorkspaceConfig,
    };

    fn rec(datetime: &str, repo: &str) -> CommitRecord {
        CommitRecord {
            datetime: datetime.to_string(),
            hash: format!("hash-{}-{}", repo, datetime),
            public: true,
            repo: Some(repo.to_string()),
            message: Some("change".to_string()),
            link: None,
            additions: None,
            deletions: None,
        }
    }

    #[test]
    fn daily_csv_has_header_and_ascending_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daily.csv");

        let mut daily = BTreeMap::new();
        daily.insert("2024-01-02".to_string(), 1u64);
        daily.insert("2024-01-01".to_string(), 2u64);

        write_daily_csv(&path, &daily).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "date,commits\n2024-01-01,2\n2024-01-02,1\n");
    }

    #[test]
    fn project_json_is_indented_with_four_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.json");

        let mut projects = BTreeMap::new();
        projects.insert("acme/api".to_string(), 3u64);

        write_project_json(&path, &projects).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "{\n    \"acme/api\": 3\n}");
    }

    #[test]
    fn one_discovery_per_configured_provider() {
        let config = Config {
            cache: CacheConfig {
                dir: "cache".into(),
            },
            workspace: WorkspaceConfig {
                dir: "repos".into(),
            },
            output: OutputConfig::default(),
            providers: ProvidersConfig {
                github: Some(GithubConfig {
                    token: "t".to_string(),
                    username: "u".to_string(),
                    api_url: "https://api.github.com".to_string(),
                    cache_ttl_hours: 12,
                }),
                bitbucket: Some(BitbucketConfig {
                    username: "u".to_string(),
                    app_password: "p".to_string(),
                    author_emails: vec!["me@example.com".to_string()],
                    api_url: "https://api.bitbucket.org/2.0".to_string(),
                    cache_ttl_hours: 6,
                }),
            },
        };

        let discoveries = build_discoveries(&config);
        assert_eq!(discoveries.len(), 2);
        assert_eq!(discoveries[0].label(), "github");
        assert_eq!(discoveries[1].label(), "bitbucket");

        let none = Config {
            providers: ProvidersConfig::default(),
            ..config
        };
        assert!(build_discoveries(&none).is_empty());
    }

    #[test]
    fn fresh_cache_feeds_the_whole_report_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        // Pre-seed a fresh cache; the unreachable api_url proves no request
        // is ever made.
        let cache_dir = root.join("cache");
        let records = vec![
            rec("2024-01-01T10:00:00Z", "acme/api"),
            rec("2024-01-01T23:00:00Z", "acme/api"),
            rec("2024-01-02T01:00:00Z", "acme/web"),
        ];
        discovery::write_cache(
            &cache_dir.join(crate::discovery_github::CACHE_FILE),
            &records,
        )
        .unwrap();

        let config = Config {
            cache: CacheConfig { dir: cache_dir },
            workspace: WorkspaceConfig {
                dir: root.join("repos"),
            },
            output: OutputConfig {
                daily_csv: root.join("out").join("daily.csv"),
                project_json: root.join("out").join("projects.json"),
            },
            providers: ProvidersConfig {
                github: Some(GithubConfig {
                    token: "unused".to_string(),
                    username: "octocat".to_string(),
                    api_url: "http://127.0.0.1:1".to_string(),
                    cache_ttl_hours: 1000,
                }),
                bitbucket: None,
            },
        };

        run_report(&config).unwrap();

        let csv = std::fs::read_to_string(config.output.daily_csv).unwrap();
        assert_eq!(csv, "date,commits\n2024-01-01,2\n2024-01-02,1\n");

        let json = std::fs::read_to_string(config.output.project_json).unwrap();
        assert_eq!(json, "{\n    \"acme/api\": 2,\n    \"acme/web\": 1\n}");
    }
}
