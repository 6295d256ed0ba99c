mod config;
mod github;
mod local;

use async_trait::async_trait;

use crate::identity::ActionRef;
use crate::manifest::Manifest;

pub use config::FetcherConfig;
pub use github::GitHubFetcher;
pub use local::LocalFetcher;

/// File names tried, in order, in the manifest directory of an action.
pub const MANIFEST_FILE_NAMES: [&str; 2] = ["action.yml", "action.yaml"];

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("no action.yml or action.yaml found")]
    NotFound,
    #[error("rate limited (HTTP {status})")]
    RateLimited { status: u16 },
    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("invalid manifest: {0}")]
    InvalidManifest(#[from] serde_yaml::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("access token contains characters not allowed in a header")]
    InvalidToken,
}

impl FetchError {
    /// Whether retrying the same fetch later could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Timeout(_) | Self::Http(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::NotFound
            | Self::InvalidManifest(_)
            | Self::Io(_)
            | Self::UrlParse(_)
            | Self::InvalidToken => false,
        }
    }
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Source of action manifests.
///
/// `Ok(None)` means the action definitively has no manifest; transient
/// failures are reported as errors. Resolution treats both as a leaf.
#[async_trait]
pub trait ManifestFetcher: Send + Sync {
    async fn fetch(&self, action: &ActionRef) -> FetchResult<Option<Manifest>>;
}

/// Relative path of a manifest file for `action`, e.g. `sub/dir/action.yml`.
pub(crate) fn manifest_path(action: &ActionRef, file_name: &str) -> String {
    let sub_path = action.sub_path().trim_matches('/');
    if sub_path.is_empty() {
        file_name.to_string()
    } else {
        format!("{sub_path}/{file_name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_path_includes_sub_path() {
        let root = ActionRef::parse("org/repo@v1").unwrap();
        let nested = ActionRef::parse("org/repo/actions/build/@v1").unwrap();

        assert_eq!(manifest_path(&root, "action.yml"), "action.yml");
        assert_eq!(
            manifest_path(&nested, "action.yaml"),
            "actions/build/action.yaml"
        );
    }

    #[test]
    fn transient_errors() {
        assert!(FetchError::RateLimited { status: 429 }.is_transient());
        assert!(FetchError::Timeout(std::time::Duration::from_secs(1)).is_transient());
        assert!(FetchError::Status {
            status: 502,
            url: "https://example.com".into()
        }
        .is_transient());
        assert!(!FetchError::Status {
            status: 400,
            url: "https://example.com".into()
        }
        .is_transient());
        assert!(!FetchError::NotFound.is_transient());
    }
}
