use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

#[derive(Debug, Deserialize, Clone)]
pub struct WorkspaceConfig {
    #[serde(default = "default_workspace_dir")]
    pub dir: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            dir: default_workspace_dir(),
        }
    }
}

fn default_workspace_dir() -> PathBuf {
    PathBuf::from("repos")
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_daily_csv")]
    pub daily_csv: PathBuf,
    #[serde(default = "default_project_json")]
    pub project_json: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            daily_csv: default_daily_csv(),
            project_json: default_project_json(),
        }
    }
}

fn default_daily_csv() -> PathBuf {
    PathBuf::from("daily_commits.csv")
}

fn default_project_json() -> PathBuf {
    PathBuf::from("project_commits.json")
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProvidersConfig {
    pub github: Option<GithubConfig>,
    pub bitbucket: Option<BitbucketConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GithubConfig {
    pub token: String,
    pub username: String,
    #[serde(default = "default_github_api_url")]
    pub api_url: String,
    #[serde(default = "default_github_ttl_hours")]
    pub cache_ttl_hours: u64,
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_github_ttl_hours() -> u64 {
    12
}

#[derive(Debug, Deserialize, Clone)]
pub struct BitbucketConfig {
    pub username: String,
    pub app_password: String,
    #[serde(default)]
    pub author_emails: Vec<String>,
    #[serde(default = "default_bitbucket_api_url")]
    pub api_url: String,
    #[serde(default = "default_bitbucket_ttl_hours")]
    pub cache_ttl_hours: u64,
}

fn default_bitbucket_api_url() -> String {
    "https://api.bitbucket.org/2.0".to_string()
}

fn default_bitbucket_ttl_hours() -> u64 {
    6
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate providers
    if config.providers.github.is_none() && config.providers.bitbucket.is_none() {
        anyhow::bail!(
            "No providers configured. Add a [providers.github] or [providers.bitbucket] section."
        );
    }

    if let Some(ref github) = config.providers.github {
        if github.token.is_empty() {
            anyhow::bail!("providers.github.token must not be empty");
        }
        if github.username.is_empty() {
            anyhow::bail!("providers.github.username must not be empty");
        }
        if github.cache_ttl_hours == 0 {
            anyhow::bail!("providers.github.cache_ttl_hours must be > 0");
        }
    }

    if let Some(ref bitbucket) = config.providers.bitbucket {
        if bitbucket.username.is_empty() {
            anyhow::bail!("providers.bitbucket.username must not be empty");
        }
        if bitbucket.app_password.is_empty() {
            anyhow::bail!("providers.bitbucket.app_password must not be empty");
        }
        if bitbucket.author_emails.is_empty() {
            anyhow::bail!("providers.bitbucket.author_emails must list at least one email");
        }
        if bitbucket.cache_ttl_hours == 0 {
            anyhow::bail!("providers.bitbucket.cache_ttl_hours must be > 0");
        }
    }

    Ok(config)
}
