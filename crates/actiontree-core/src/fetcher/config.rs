use serde::{Deserialize, Serialize};

const DEFAULT_RAW_BASE_URL: &str = "https://raw.githubusercontent.com";

/// HTTP settings for fetching manifests from GitHub
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Base URL serving raw repository content
    pub raw_base_url: String,
    /// Personal access token sent as a bearer token
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// User agent header (GitHub rejects requests without one)
    pub user_agent: String,
    /// Connection timeout in seconds
    pub connect_timeout_seconds: u32,
    /// Request timeout in seconds
    pub request_timeout_seconds: u32,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            raw_base_url: DEFAULT_RAW_BASE_URL.to_string(),
            token: None,
            user_agent: concat!("actiontree/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout_seconds: 10,
            request_timeout_seconds: 30,
        }
    }
}

impl FetcherConfig {
    /// Overlay `GITHUB_TOKEN` and `ACTIONTREE_RAW_BASE_URL` onto this config.
    #[must_use]
    pub fn with_env(mut self) -> Self {
        if let Some(token) = non_empty_env("GITHUB_TOKEN") {
            self.token = Some(token);
        }
        if let Some(base) = non_empty_env("ACTIONTREE_RAW_BASE_URL") {
            self.raw_base_url = base;
        }
        self
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
