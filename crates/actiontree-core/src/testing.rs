//! In-memory fetcher used by resolver and scanner tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::fetcher::{FetchError, FetchResult, ManifestFetcher};
use crate::identity::ActionRef;
use crate::manifest::Manifest;

#[derive(Default)]
pub struct MemoryFetcher {
    manifests: HashMap<ActionRef, String>,
    failing: HashSet<ActionRef>,
    hanging: HashSet<ActionRef>,
    cancel_on: Option<(ActionRef, CancellationToken)>,
    calls: Mutex<HashMap<ActionRef, usize>>,
}

fn action(raw: &str) -> ActionRef {
    ActionRef::parse(raw).unwrap()
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a composite manifest whose steps use each of `uses`.
    pub fn composite(mut self, raw: &str, uses: &[&str]) -> Self {
        let mut yaml = String::from("runs:\n  using: composite\n  steps:\n");
        for u in uses {
            yaml.push_str(&format!("    - uses: {u}\n"));
        }
        self.manifests.insert(action(raw), yaml);
        self
    }

    pub fn yaml(mut self, raw: &str, yaml: &str) -> Self {
        self.manifests.insert(action(raw), yaml.to_string());
        self
    }

    pub fn failing(mut self, raw: &str) -> Self {
        self.failing.insert(action(raw));
        self
    }

    /// Fetches for `raw` never complete.
    pub fn hanging(mut self, raw: &str) -> Self {
        self.hanging.insert(action(raw));
        self
    }

    /// Cancel `token` when `raw` is fetched, then hang.
    pub fn cancel_on(mut self, raw: &str, token: CancellationToken) -> Self {
        self.cancel_on = Some((action(raw), token));
        self
    }

    pub fn calls(&self, raw: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(&action(raw))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl ManifestFetcher for MemoryFetcher {
    async fn fetch(&self, action: &ActionRef) -> FetchResult<Option<Manifest>> {
        *self.calls.lock().unwrap().entry(action.clone()).or_default() += 1;

        if let Some((target, token)) = &self.cancel_on {
            if target == action {
                token.cancel();
                std::future::pending::<()>().await;
            }
        }
        if self.hanging.contains(action) {
            std::future::pending::<()>().await;
        }
        if self.failing.contains(action) {
            return Err(FetchError::RateLimited { status: 429 });
        }

        match self.manifests.get(action) {
            Some(yaml) => Ok(Some(Manifest::from_yaml(yaml)?)),
            None => Ok(None),
        }
    }
}
