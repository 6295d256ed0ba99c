use thiserror::Error;

use crate::fetcher::FetchError;
use crate::identity::ActionRef;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Malformed action reference: '{0}' (expected owner/repo[/path]@revision)")]
    MalformedReference(String),

    #[error("Manifest unavailable for {action}: {source}")]
    ManifestUnavailable {
        action: ActionRef,
        #[source]
        source: FetchError,
    },

    #[error("Scan cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
