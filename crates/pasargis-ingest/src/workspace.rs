//! Per-request scratch directory for archive uploads

use std::fs;
use std::path::{Path, PathBuf};

use pasargis_core::error::Result;
use tempfile::TempDir;

const WORKSPACE_PREFIX: &str = "temp_gdb_";

/// Uniquely named scratch directory holding one upload's extracted archive and
/// the conversion tool's output.
///
/// The whole tree is removed when the value is dropped, on every exit path.
#[derive(Debug)]
pub struct ArchiveWorkspace {
    dir: TempDir,
    extract_dir: PathBuf,
    output_dir: PathBuf,
}

impl ArchiveWorkspace {
    /// Create a fresh workspace below `root`
    pub fn create(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)?;

        let dir = tempfile::Builder::new().prefix(WORKSPACE_PREFIX).tempdir_in(root)?;
        let extract_dir = dir.path().join("extracted");
        let output_dir = dir.path().join("output");
        fs::create_dir(&extract_dir)?;
        fs::create_dir(&output_dir)?;

        tracing::debug!(workspace = %dir.path().display(), "Created archive workspace");

        Ok(Self {
            dir,
            extract_dir,
            output_dir,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the uploaded archive is extracted
    pub fn extract_dir(&self) -> &Path {
        &self.extract_dir
    }

    /// Where the conversion tool writes `.geojson` files
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Remove the workspace now, logging instead of failing if removal fails
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => tracing::debug!(workspace = %path.display(), "Removed archive workspace"),
            Err(e) => tracing::warn!(
                workspace = %path.display(),
                error = %e,
                "Failed to remove archive workspace"
            ),
        }
    }
}
