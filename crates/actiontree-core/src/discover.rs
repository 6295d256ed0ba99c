use std::path::Path;

use tracing::debug;

use crate::identity::ActionRef;
use crate::manifest::Manifest;
use crate::Result;

/// Action references used by the steps of a workflow or action document, in document order.
///
/// Job-level `uses` (reusable workflow calls) are not actions and have no
/// `action.yml`, so they are left out along with local paths and
/// `docker://` images. Duplicates are kept.
pub fn references_in_document(text: &str) -> Result<Vec<String>> {
    let manifest = Manifest::from_yaml(text)?;

    Ok(manifest
        .uses()
        .filter(|uses| !ActionRef::is_local_or_docker(uses))
        .map(|uses| uses.trim().to_string())
        .collect())
}

/// References from every file in `paths`, concatenated in order.
pub async fn references_in_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<String>> {
    let mut references = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path).await?;
        let found = references_in_document(&text)?;
        debug!(path = %path.display(), count = found.len(), "discovered references");
        references.extend(found);
    }
    Ok(references)
}
