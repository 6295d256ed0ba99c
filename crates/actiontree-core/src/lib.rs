#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod discover;
pub mod error;
pub mod fetcher;
pub mod identity;
pub mod manifest;
pub mod node;
pub mod report;
pub mod resolver;
pub mod scanner;

#[cfg(test)]
mod testing;

pub use cache::DependencyCache;
pub use discover::{references_in_document, references_in_files};
pub use error::{Error, Result};
pub use fetcher::{
    FetchError, FetchResult, FetcherConfig, GitHubFetcher, LocalFetcher, ManifestFetcher,
};
pub use identity::ActionRef;
pub use manifest::{ContainerKind, Manifest, StepRef};
pub use node::{ActionNode, ManifestOutcome, ManifestStatus};
pub use report::{RootResult, ScanReport, ScanSummary, UniqueAction};
pub use resolver::GraphResolver;
pub use scanner::{ScanOptions, Scanner, DEFAULT_FETCH_TIMEOUT_SECONDS, DEFAULT_MAX_DEPTH};
