//! Build artifact cleanup.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::pipeline::BUILD_MARKER_DIR;

/// Remove every build artifact for `workspace` and leave an empty build
/// directory behind, ready for the next invocation.
pub fn clean_build(workspace: &Path) -> Result<()> {
    let build_dir = workspace.join(BUILD_MARKER_DIR).join("build");

    if build_dir.exists() {
        fs::remove_dir_all(&build_dir)
            .with_context(|| format!("Failed to remove {}", build_dir.display()))?;
    }

    fs::create_dir_all(&build_dir)
        .with_context(|| format!("Failed to recreate {}", build_dir.display()))?;

    Ok(())
}
