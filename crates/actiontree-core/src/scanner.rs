use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cache::DependencyCache;
use crate::fetcher::ManifestFetcher;
use crate::identity::ActionRef;
use crate::report::{RootResult, ScanReport};
use crate::resolver::GraphResolver;

pub const DEFAULT_MAX_DEPTH: usize = 10;
pub const DEFAULT_FETCH_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Number of expansion levels; 0 resolves roots without fetching anything
    pub max_depth: usize,
    /// Per-fetch timeout; `None` waits indefinitely
    pub fetch_timeout_seconds: Option<u64>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            fetch_timeout_seconds: Some(DEFAULT_FETCH_TIMEOUT_SECONDS),
        }
    }
}

impl ScanOptions {
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_seconds.map(Duration::from_secs)
    }
}

/// Runs the resolver over a batch of root references.
///
/// Each call to [`Scanner::scan_all`] gets its own [`DependencyCache`], so
/// dependencies shared between roots of one batch are fetched once, and
/// nothing carries over between batches.
pub struct Scanner {
    fetcher: Arc<dyn ManifestFetcher>,
    options: ScanOptions,
    cancel: CancellationToken,
}

impl Scanner {
    pub fn new(fetcher: Arc<dyn ManifestFetcher>, options: ScanOptions) -> Self {
        Self {
            fetcher,
            options,
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that cancels every scan run by this scanner.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Resolve every reference in input order. Failures are recorded per root.
    pub async fn scan_all<S: AsRef<str>>(&self, references: &[S]) -> ScanReport {
        info!(
            roots = references.len(),
            max_depth = self.options.max_depth,
            "starting scan"
        );

        let cache = DependencyCache::new();
        let resolver = GraphResolver::new(&cache, self.fetcher.as_ref(), self.options.max_depth)
            .with_fetch_timeout(self.options.fetch_timeout())
            .with_cancellation(self.cancel.clone());

        let mut roots = Vec::with_capacity(references.len());
        for reference in references {
            roots.push(scan_root(&resolver, reference.as_ref()).await);
        }

        let report = ScanReport::aggregate(roots, &cache, self.options.max_depth);
        info!(
            nodes = cache.len(),
            unique_actions = report.summary.unique_actions,
            failed_roots = report.summary.failed_roots,
            "scan finished"
        );
        report
    }
}

async fn scan_root(resolver: &GraphResolver<'_>, reference: &str) -> RootResult {
    let action = match ActionRef::parse(reference) {
        Ok(action) => action,
        Err(e) => {
            warn!(reference, "{e}");
            return RootResult::failed(reference, None, &e);
        }
    };

    match resolver.resolve(&action).await {
        Ok((_, dependencies)) => RootResult::succeeded(reference, action, dependencies),
        Err(e) => {
            warn!(%action, "{e}");
            RootResult::failed(reference, Some(action), &e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ManifestStatus;
    use crate::testing::MemoryFetcher;

    fn action(raw: &str) -> ActionRef {
        ActionRef::parse(raw).unwrap()
    }

    fn scanner(fetcher: &Arc<MemoryFetcher>, max_depth: usize) -> Scanner {
        Scanner::new(
            Arc::clone(fetcher) as Arc<dyn ManifestFetcher>,
            ScanOptions {
                max_depth,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn shared_dependency_is_fetched_once() {
        let fetcher = Arc::new(
            MemoryFetcher::new()
                .composite("org/a@v1", &["org/c@v1"])
                .composite("org/b@v1", &["org/c@v1"])
                .composite("org/c@v1", &["org/d@v1"]),
        );

        let report = scanner(&fetcher, 10)
            .scan_all(&["org/a@v1", "org/b@v1"])
            .await;

        assert!(report.is_success());
        assert_eq!(fetcher.calls("org/c@v1"), 1);
        assert_eq!(fetcher.calls("org/d@v1"), 1);
        let listed = report
            .actions
            .iter()
            .filter(|a| a.action == action("org/c@v1"))
            .count();
        assert_eq!(listed, 1);
        // The second root still sees the full set through the cache.
        assert_eq!(
            report.roots[1].dependencies,
            vec![action("org/c@v1"), action("org/d@v1")]
        );
    }

    #[tokio::test]
    async fn malformed_root_fails_alone() {
        let fetcher = Arc::new(MemoryFetcher::new().composite("org/a@v1", &["org/b@v1"]));

        let report = scanner(&fetcher, 10)
            .scan_all(&["not-a-valid-ref", "org/a@v1"])
            .await;

        assert!(!report.roots[0].success);
        assert!(report.roots[0].action.is_none());
        assert!(report.roots[0]
            .error
            .as_deref()
            .unwrap()
            .contains("Malformed action reference"));
        assert!(report.roots[1].success);
        assert_eq!(report.roots[1].dependencies, vec![action("org/b@v1")]);
        assert_eq!(report.summary.roots, 2);
        assert_eq!(report.summary.failed_roots, 1);
    }

    #[tokio::test]
    async fn zero_depth_reports_roots_only() {
        let fetcher = Arc::new(MemoryFetcher::new().composite("org/a@v1", &["org/b@v1"]));

        let report = scanner(&fetcher, 0).scan_all(&["org/a@v1"]).await;

        assert!(report.roots[0].success);
        assert!(report.roots[0].dependencies.is_empty());
        assert_eq!(report.actions.len(), 1);
        assert_eq!(report.actions[0].manifest, ManifestStatus::Unexpanded);
        assert_eq!(fetcher.total_calls(), 0);
    }

    #[tokio::test]
    async fn cycle_produces_finite_report() {
        let fetcher = Arc::new(
            MemoryFetcher::new()
                .composite("org/a@v1", &["org/b@v1"])
                .composite("org/b@v1", &["org/a@v1"]),
        );

        let report = scanner(&fetcher, 2).scan_all(&["org/a@v1"]).await;

        let listed: Vec<_> = report.actions.iter().map(|a| a.action.to_string()).collect();
        assert_eq!(listed, vec!["org/a@v1", "org/b@v1"]);
        assert!(report.actions[0].is_root);
        assert!(!report.actions[1].is_root);
    }

    #[tokio::test]
    async fn absent_dependency_is_a_leaf() {
        let fetcher = Arc::new(MemoryFetcher::new().composite("org/a@v1", &["org/gone@v1"]));

        let report = scanner(&fetcher, 10).scan_all(&["org/a@v1"]).await;

        assert!(report.is_success());
        let gone = report.action(&action("org/gone@v1")).unwrap();
        assert_eq!(gone.manifest, ManifestStatus::Absent);
        assert_eq!(gone.dependency_count, 0);
    }

    #[tokio::test]
    async fn duplicate_roots_are_listed_once() {
        let fetcher = Arc::new(MemoryFetcher::new().composite("org/a@v1", &["org/b@v1"]));

        let report = scanner(&fetcher, 10)
            .scan_all(&["org/a@v1", " org/a@v1 "])
            .await;

        assert_eq!(report.roots.len(), 2);
        assert_eq!(report.roots[1].dependencies, vec![action("org/b@v1")]);
        assert_eq!(report.summary.unique_actions, 2);
        assert_eq!(fetcher.calls("org/a@v1"), 1);
    }

    #[tokio::test]
    async fn each_scan_starts_fresh() {
        let fetcher = Arc::new(MemoryFetcher::new().composite("org/a@v1", &[]));
        let scanner = scanner(&fetcher, 10);

        scanner.scan_all(&["org/a@v1"]).await;
        scanner.scan_all(&["org/a@v1"]).await;

        assert_eq!(fetcher.calls("org/a@v1"), 2);
    }

    #[tokio::test]
    async fn cancelled_scan_fails_remaining_roots() {
        let fetcher = Arc::new(MemoryFetcher::new().composite("org/a@v1", &[]));
        let scanner = scanner(&fetcher, 10);
        scanner.cancellation_token().cancel();

        let report = scanner.scan_all(&["org/a@v1", "bad"]).await;

        assert_eq!(report.roots[0].error.as_deref(), Some("Scan cancelled"));
        assert!(report.roots[1]
            .error
            .as_deref()
            .unwrap()
            .starts_with("Malformed"));
        assert_eq!(fetcher.total_calls(), 0);
        assert!(report.actions.is_empty());
    }

    #[tokio::test]
    async fn cancellation_mid_scan_keeps_earlier_roots() {
        let cancel = CancellationToken::new();
        let fetcher = Arc::new(
            MemoryFetcher::new()
                .composite("org/a@v1", &[])
                .cancel_on("org/b@v1", cancel.clone()),
        );
        let scanner = scanner(&fetcher, 10).with_cancellation(cancel);

        let report = scanner
            .scan_all(&["org/a@v1", "org/b@v1", "org/c@v1"])
            .await;

        assert!(report.roots[0].success);
        assert_eq!(report.roots[1].error.as_deref(), Some("Scan cancelled"));
        assert_eq!(report.roots[2].error.as_deref(), Some("Scan cancelled"));
        assert_eq!(fetcher.calls("org/c@v1"), 0);
    }
}
