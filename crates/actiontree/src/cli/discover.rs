use std::path::PathBuf;

use anyhow::{Context, Result};

use actiontree_core::references_in_files;

pub async fn run(paths: &[PathBuf]) -> Result<()> {
    let references = references_in_files(paths)
        .await
        .context("failed to read workflow references")?;

    for reference in references {
        println!("{reference}");
    }
    Ok(())
}
