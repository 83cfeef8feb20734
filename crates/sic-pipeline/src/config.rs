use std::env;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// One site to process: the storage namespace, where to find its sitemap,
/// and how many images to keep at most (applied to the flattened image
/// sequence, not to page count).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    pub domain_code: String,
    pub sitemap_url: String,
    #[serde(default)]
    pub max_images: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Bound on every external HTTP call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Minimum delay between two compression submissions.
    #[serde(default = "default_shrink_delay_ms")]
    pub shrink_delay_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            shrink_delay_ms: default_shrink_delay_ms(),
        }
    }
}

fn default_user_agent() -> String {
    String::from("sicbot")
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_shrink_delay_ms() -> u64 {
    1000
}

/// Target repository of the content store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    pub owner: String,
    pub repo: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    pub committer: Committer,
}

fn default_branch() -> String {
    String::from("main")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Committer {
    pub name: String,
    pub email: String,
}

/// Secrets are only ever read from the environment, never from
/// configuration files or source.
#[derive(Clone)]
pub struct Credentials {
    pub tinify_key: String,
    pub github_token: String,
}

impl Credentials {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            tinify_key: env::var("TINIFY_API_KEY").context("TINIFY_API_KEY is not set")?,
            github_token: env::var("GITHUB_TOKEN").context("GITHUB_TOKEN is not set")?,
        })
    }
}
