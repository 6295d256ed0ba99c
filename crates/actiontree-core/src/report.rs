use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::cache::DependencyCache;
use crate::identity::ActionRef;
use crate::node::ManifestStatus;
use crate::Error;

/// Outcome of resolving one root reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootResult {
    /// The reference exactly as supplied.
    pub reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionRef>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub dependencies: Vec<ActionRef>,
}

impl RootResult {
    pub fn succeeded(reference: &str, action: ActionRef, dependencies: Vec<ActionRef>) -> Self {
        Self {
            reference: reference.to_string(),
            action: Some(action),
            success: true,
            error: None,
            dependencies,
        }
    }

    pub fn failed(reference: &str, action: Option<ActionRef>, error: &Error) -> Self {
        Self {
            reference: reference.to_string(),
            action,
            success: false,
            error: Some(error.to_string()),
            dependencies: Vec::new(),
        }
    }
}

/// One distinct action reached by the scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueAction {
    pub action: ActionRef,
    pub url: String,
    pub is_root: bool,
    pub manifest: ManifestStatus,
    /// Revision is a full commit SHA.
    pub pinned: bool,
    /// Size of the node's transitive dependency set.
    pub dependency_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub roots: usize,
    pub failed_roots: usize,
    pub unique_actions: usize,
    pub max_depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub roots: Vec<RootResult>,
    pub actions: Vec<UniqueAction>,
    pub summary: ScanSummary,
}

impl ScanReport {
    /// Fold per-root results into the global unique-action list.
    ///
    /// Actions appear in first-seen order: each successful root, then its
    /// dependencies. An action is flagged as a root when any successful
    /// root entered the graph through it, even if it was first seen as
    /// another root's dependency.
    pub fn aggregate(roots: Vec<RootResult>, cache: &DependencyCache, max_depth: usize) -> Self {
        let actions = {
            let successful = || roots.iter().filter(|r| r.success);
            let entry_points: HashSet<&ActionRef> =
                successful().filter_map(|r| r.action.as_ref()).collect();

            let mut seen = HashSet::new();
            let mut actions = Vec::new();
            for root in successful() {
                let reached = root.action.iter().chain(root.dependencies.iter());
                for action in reached {
                    if !seen.insert(action) {
                        continue;
                    }
                    let node = cache.get(action);
                    actions.push(UniqueAction {
                        action: action.clone(),
                        url: action.url(),
                        is_root: entry_points.contains(action),
                        manifest: node
                            .as_ref()
                            .map_or(ManifestStatus::Unexpanded, |n| n.manifest_status()),
                        pinned: action.is_commit_pinned(),
                        dependency_count: node.as_ref().map_or(0, |n| n.dependency_count()),
                    });
                }
            }
            actions
        };

        let summary = ScanSummary {
            roots: roots.len(),
            failed_roots: roots.iter().filter(|r| !r.success).count(),
            unique_actions: actions.len(),
            max_depth,
        };

        Self {
            roots,
            actions,
            summary,
        }
    }

    pub fn is_success(&self) -> bool {
        self.roots.iter().all(|r| r.success)
    }

    pub fn action(&self, action: &ActionRef) -> Option<&UniqueAction> {
        self.actions.iter().find(|a| &a.action == action)
    }

    pub fn failures(&self) -> impl Iterator<Item = &RootResult> {
        self.roots.iter().filter(|r| !r.success)
    }
}
