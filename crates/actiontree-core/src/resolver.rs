//! Depth-bounded, memoized expansion of the action graph.
//!
//! A node is claimed (marked expanded) before its children are visited,
//! so revisiting it through a cycle returns whatever dependencies it has
//! accumulated so far instead of recursing again. Members of a cycle can
//! therefore report an incomplete set, and so can a later walk that
//! reaches one of them through the shared cache.
//!
//! `max_depth` counts expansion levels: the root sits at depth 0 and a
//! node at depth `k` is expanded only when `k < max_depth`. Children of
//! the deepest expanded level are still listed as dependencies.

use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::cache::DependencyCache;
use crate::fetcher::{FetchError, FetchResult, ManifestFetcher};
use crate::identity::ActionRef;
use crate::manifest::Manifest;
use crate::node::{ActionNode, ManifestOutcome};
use crate::{Error, Result};

pub struct GraphResolver<'a> {
    cache: &'a DependencyCache,
    fetcher: &'a dyn ManifestFetcher,
    max_depth: usize,
    fetch_timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl<'a> GraphResolver<'a> {
    pub fn new(
        cache: &'a DependencyCache,
        fetcher: &'a dyn ManifestFetcher,
        max_depth: usize,
    ) -> Self {
        Self {
            cache,
            fetcher,
            max_depth,
            fetch_timeout: None,
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Resolve `action` as the entry point of a walk, returning its transitive dependencies.
    pub async fn resolve(&self, action: &ActionRef) -> Result<(Arc<ActionNode>, Vec<ActionRef>)> {
        let node = self.cache.resolve(action);
        let dependencies = self.expand(Arc::clone(&node), 0).await?;
        Ok((node, dependencies))
    }

    /// Expand `node` found at `depth`, returning its dependency set as known afterwards.
    ///
    /// The only error is [`Error::Cancelled`]; the claim of every node whose
    /// expansion was interrupted is released.
    pub fn expand(
        &self,
        node: Arc<ActionNode>,
        depth: usize,
    ) -> BoxFuture<'_, Result<Vec<ActionRef>>> {
        async move {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            if depth >= self.max_depth {
                trace!(action = %node.action(), depth, "depth bound reached");
                return Ok(node.dependencies());
            }
            if !node.try_claim() {
                trace!(action = %node.action(), depth, "already expanded or in progress");
                return Ok(node.dependencies());
            }

            if let Err(e) = self.expand_claimed(&node, depth).await {
                node.release();
                return Err(e);
            }
            Ok(node.dependencies())
        }
        .boxed()
    }

    async fn expand_claimed(&self, node: &ActionNode, depth: usize) -> Result<()> {
        let Some(manifest) = self.manifest_for(node).await? else {
            return Ok(());
        };

        for step in manifest.steps() {
            if ActionRef::is_local_or_docker(step.uses) {
                debug!(action = %node.action(), uses = step.uses, "skipping non-repository step");
                continue;
            }
            let child_ref = match ActionRef::parse(step.uses) {
                Ok(child_ref) => child_ref,
                Err(e) => {
                    warn!(
                        action = %node.action(),
                        container = step.container,
                        step = step.index,
                        "skipping dependency: {e}"
                    );
                    continue;
                }
            };

            let child = self.cache.resolve(&child_ref);
            node.add_dependency(&child_ref);

            let transitive = self.expand(child, depth + 1).await?;
            for dependency in &transitive {
                node.add_dependency(dependency);
            }
        }

        debug!(
            action = %node.action(),
            name = manifest.name(),
            depth,
            dependencies = node.dependency_count(),
            "expanded"
        );
        Ok(())
    }

    async fn manifest_for<'n>(&self, node: &'n ActionNode) -> Result<Option<&'n Manifest>> {
        if node.manifest().is_none() {
            let outcome = self.fetch(node.action()).await?;
            node.set_manifest(outcome);
        }
        Ok(match node.manifest() {
            Some(ManifestOutcome::Found(manifest)) => Some(manifest),
            _ => None,
        })
    }

    async fn fetch(&self, action: &ActionRef) -> Result<ManifestOutcome> {
        debug!(%action, "fetching manifest");

        let result = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Err(Error::Cancelled),
            result = self.fetch_with_timeout(action) => result,
        };

        let (source, outcome) = match result {
            Ok(Some(manifest)) => return Ok(ManifestOutcome::Found(manifest)),
            Ok(None) => (FetchError::NotFound, ManifestOutcome::Absent),
            Err(source) => {
                let message = source.to_string();
                (source, ManifestOutcome::Unavailable(message))
            }
        };

        let transient = source.is_transient();
        let err = Error::ManifestUnavailable {
            action: action.clone(),
            source,
        };
        warn!(transient, "{err}; treating as leaf");
        Ok(outcome)
    }

    async fn fetch_with_timeout(&self, action: &ActionRef) -> FetchResult<Option<Manifest>> {
        match self.fetch_timeout {
            Some(limit) => tokio::time::timeout(limit, self.fetcher.fetch(action))
                .await
                .unwrap_or(Err(FetchError::Timeout(limit))),
            None => self.fetcher.fetch(action).await,
        }
    }
}
