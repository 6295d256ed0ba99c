use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use super::{manifest_path, FetchResult, ManifestFetcher, MANIFEST_FILE_NAMES};
use crate::identity::ActionRef;
use crate::manifest::Manifest;

/// Reads manifests from a mirror laid out as
/// `<root>/<owner>/<repo>/<revision>/<sub_path>/action.yml`.
#[derive(Debug, Clone)]
pub struct LocalFetcher {
    root: PathBuf,
}

impl LocalFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn manifest_file(&self, action: &ActionRef, file_name: &str) -> PathBuf {
        self.root
            .join(action.owner())
            .join(action.repo())
            .join(action.revision())
            .join(manifest_path(action, file_name))
    }
}

#[async_trait]
impl ManifestFetcher for LocalFetcher {
    async fn fetch(&self, action: &ActionRef) -> FetchResult<Option<Manifest>> {
        for file_name in MANIFEST_FILE_NAMES {
            let path = self.manifest_file(action, file_name);
            match tokio::fs::read_to_string(&path).await {
                Ok(text) => {
                    debug!(%action, path = %path.display(), "read manifest from mirror");
                    return Ok(Some(Manifest::from_yaml(&text)?));
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(None)
    }
}
