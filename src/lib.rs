//! # gitledger
//!
//! Aggregates one developer's commit history across hosting providers into
//! local JSON caches, then derives two views from the union: commits per day
//! and commits per project.
//!
//! Each provider is a [`discovery::Discovery`] strategy. GitHub is walked
//! purely over its REST API; Bitbucket is enumerated over its API but its
//! history is read from local clones with the `git` CLI. Every strategy
//! caches its full result in one JSON file and re-fetches only when the
//! file's modification time exceeds the strategy's freshness window.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐      ┌────────────────────┐
//! │ GithubDiscovery │      │ BitbucketDiscovery │
//! │   (REST API)    │      │ (REST + local git) │
//! └────────┬────────┘      └─────────┬──────────┘
//!          │ get_commits()           │ get_commits()
//!          ▼                         ▼
//!   github_commits.json      bitbucket_commits.json
//!          └────────────┬────────────┘
//!                       ▼
//!        stats: per-day / per-project counts
//!                       ▼
//!        daily_commits.csv   project_commits.json
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! gitledger                         # reads ./gitledger.toml
//! gitledger --config custom.toml
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | The unified commit record |
//! | [`discovery`] | Caching discovery contract |
//! | [`discovery_github`] | GitHub strategy (REST) |
//! | [`discovery_bitbucket`] | Bitbucket strategy (REST + clones) |
//! | [`git`] | git CLI wrappers |
//! | [`stats`] | Daily and per-project aggregation |
//! | [`report`] | Driver and output writers |

pub mod config;
pub mod discovery;
pub mod discovery_bitbucket;
pub mod discovery_github;
pub mod git;
pub mod models;
pub mod report;
pub mod stats;
