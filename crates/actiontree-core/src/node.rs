use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use serde::{Deserialize, Serialize};

use crate::identity::ActionRef;
use crate::manifest::Manifest;

/// What a node's manifest fetch produced.
#[derive(Debug, Clone)]
pub enum ManifestOutcome {
    Found(Manifest),
    Absent,
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestStatus {
    Found,
    Absent,
    Unavailable,
    /// Never fetched: depth bound reached or expansion not yet run.
    Unexpanded,
}

impl ManifestOutcome {
    pub const fn status(&self) -> ManifestStatus {
        match self {
            Self::Found(_) => ManifestStatus::Found,
            Self::Absent => ManifestStatus::Absent,
            Self::Unavailable(_) => ManifestStatus::Unavailable,
        }
    }
}

#[derive(Default)]
struct Dependencies {
    ordered: Vec<ActionRef>,
    seen: HashSet<ActionRef>,
}

/// A vertex of the dependency graph.
///
/// Nodes are shared through the run's [`DependencyCache`](crate::DependencyCache).
/// The dependency set holds the identity of every node reachable from this
/// one, in discovery order; look nodes up through the cache. It never shrinks.
pub struct ActionNode {
    action: ActionRef,
    expanded: AtomicBool,
    manifest: OnceLock<ManifestOutcome>,
    dependencies: Mutex<Dependencies>,
}

impl ActionNode {
    pub fn new(action: ActionRef) -> Self {
        Self {
            action,
            expanded: AtomicBool::new(false),
            manifest: OnceLock::new(),
            dependencies: Mutex::new(Dependencies::default()),
        }
    }

    pub const fn action(&self) -> &ActionRef {
        &self.action
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded.load(Ordering::Acquire)
    }

    /// Claim the right to expand this node. Only the first caller gets `true`.
    pub(crate) fn try_claim(&self) -> bool {
        !self.expanded.swap(true, Ordering::AcqRel)
    }

    /// Undo a claim whose expansion was cancelled before completing.
    pub(crate) fn release(&self) {
        self.expanded.store(false, Ordering::Release);
    }

    pub fn manifest(&self) -> Option<&ManifestOutcome> {
        self.manifest.get()
    }

    pub fn manifest_status(&self) -> ManifestStatus {
        self.manifest
            .get()
            .map_or(ManifestStatus::Unexpanded, ManifestOutcome::status)
    }

    /// Record the fetch outcome; later calls are ignored.
    pub(crate) fn set_manifest(&self, outcome: ManifestOutcome) {
        let _ = self.manifest.set(outcome);
    }

    /// Add `action` unless it is this node or already present. Returns whether it was added.
    pub(crate) fn add_dependency(&self, action: &ActionRef) -> bool {
        if *action == self.action {
            return false;
        }
        let mut deps = self.lock_dependencies();
        if !deps.seen.insert(action.clone()) {
            return false;
        }
        deps.ordered.push(action.clone());
        true
    }

    /// Snapshot of the currently known dependencies.
    pub fn dependencies(&self) -> Vec<ActionRef> {
        self.lock_dependencies().ordered.clone()
    }

    pub fn dependency_count(&self) -> usize {
        self.lock_dependencies().ordered.len()
    }

    fn lock_dependencies(&self) -> MutexGuard<'_, Dependencies> {
        self.dependencies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ActionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionNode")
            .field("action", &self.action.to_string())
            .field("expanded", &self.is_expanded())
            .field("manifest", &self.manifest_status())
            .field("dependencies", &self.dependency_count())
            .finish()
    }
}
