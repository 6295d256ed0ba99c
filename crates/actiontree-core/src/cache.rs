use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::identity::ActionRef;
use crate::node::ActionNode;

/// Registry of the nodes seen during one scan.
///
/// Create one per run and drop it afterwards; expansion state stored on
/// the nodes is only meaningful within that run.
#[derive(Debug, Default)]
pub struct DependencyCache {
    nodes: Mutex<HashMap<ActionRef, Arc<ActionNode>>>,
}

impl DependencyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The node for `action`, created unexpanded on first request.
    pub fn resolve(&self, action: &ActionRef) -> Arc<ActionNode> {
        let mut nodes = self.lock();
        if let Some(node) = nodes.get(action) {
            return Arc::clone(node);
        }
        trace!(%action, "registering node");
        let node = Arc::new(ActionNode::new(action.clone()));
        nodes.insert(action.clone(), Arc::clone(&node));
        node
    }

    pub fn get(&self, action: &ActionRef) -> Option<Arc<ActionNode>> {
        self.lock().get(action).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ActionRef, Arc<ActionNode>>> {
        self.nodes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
