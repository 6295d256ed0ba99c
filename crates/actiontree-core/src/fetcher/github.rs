use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use tracing::debug;
use url::Url;

use super::config::FetcherConfig;
use super::{FetchError, FetchResult, ManifestFetcher, MANIFEST_FILE_NAMES};
use crate::identity::ActionRef;
use crate::manifest::Manifest;

/// Fetches manifests from GitHub's raw content host.
pub struct GitHubFetcher {
    base: Url,
    client: Client,
}

impl GitHubFetcher {
    pub fn new(config: &FetcherConfig) -> FetchResult<Self> {
        let base = Url::parse(&config.raw_base_url)?;
        if base.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase.into());
        }

        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = config.token {
            let mut value = header::HeaderValue::try_from(format!("Bearer {token}"))
                .map_err(|_| FetchError::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(u64::from(config.connect_timeout_seconds)))
            .timeout(Duration::from_secs(u64::from(config.request_timeout_seconds)))
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .build()?;

        Ok(Self { base, client })
    }

    /// `<base>/<owner>/<repo>/<revision>/<sub_path>/<file_name>`, each segment percent-encoded.
    fn manifest_url(&self, action: &ActionRef, file_name: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(action.owner())
                .push(action.repo())
                .extend(action.revision().split('/'))
                .extend(action.sub_path().split('/').filter(|s| !s.is_empty()))
                .push(file_name);
        }
        url
    }
}

#[async_trait]
impl ManifestFetcher for GitHubFetcher {
    async fn fetch(&self, action: &ActionRef) -> FetchResult<Option<Manifest>> {
        for file_name in MANIFEST_FILE_NAMES {
            let url = self.manifest_url(action, file_name);
            debug!(%action, %url, "requesting manifest");

            let response = self.client.get(url.clone()).send().await?;
            let status = response.status();

            if status == StatusCode::NOT_FOUND {
                continue;
            }
            if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
                return Err(FetchError::RateLimited {
                    status: status.as_u16(),
                });
            }
            if !status.is_success() {
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            let body = response.text().await?;
            return Ok(Some(Manifest::from_yaml(&body)?));
        }

        Ok(None)
    }
}
