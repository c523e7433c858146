//! Request scope - Temp files and uploaded assets owned by one webhook call
//!
//! Every file written while handling a message lives in the scope's own
//! directory, and every uploaded asset is registered here until it has been
//! deleted. [`RequestScope::close`] releases whatever is left.

use std::path::{Path, PathBuf};

use domain::ScopeId;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
    error::ApplicationError,
    ports::{GenerativePort, UploadedAsset},
};

/// Workspace for a single inbound message
#[derive(Debug)]
pub struct RequestScope {
    id: ScopeId,
    dir: TempDir,
    assets: Mutex<Vec<UploadedAsset>>,
}

impl RequestScope {
    /// Create a scope under the system temp directory
    pub fn create(id: ScopeId) -> Result<Self, ApplicationError> {
        Self::create_in(id, std::env::temp_dir())
    }

    /// Create a scope under `root`
    pub fn create_in(id: ScopeId, root: impl AsRef<Path>) -> Result<Self, ApplicationError> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("mindbot-{}-", id.short()))
            .tempdir_in(root)
            .map_err(|e| ApplicationError::Workspace(format!("cannot create scope: {e}")))?;

        debug!(scope = %id, path = %dir.path().display(), "Created request scope");

        Ok(Self {
            id,
            dir,
            assets: Mutex::new(Vec::new()),
        })
    }

    pub const fn id(&self) -> ScopeId {
        self.id
    }

    /// Directory holding this request's files
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write bytes to `name` inside the scope
    pub async fn write_file(&self, name: &str, data: &[u8]) -> Result<PathBuf, ApplicationError> {
        let path = self.dir.path().join(name);
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| ApplicationError::Workspace(format!("cannot write {name}: {e}")))?;
        Ok(path)
    }

    /// Remove a file, logging instead of failing
    pub async fn remove_file(&self, path: &Path) {
        if let Err(e) = tokio::fs::remove_file(path).await {
            warn!(path = %path.display(), error = %e, "Failed to remove temp file");
        }
    }

    /// Register an uploaded asset as outstanding
    pub async fn track_asset(&self, asset: UploadedAsset) {
        self.assets.lock().await.push(asset);
    }

    /// Drop an asset from the outstanding set once it has been deleted
    pub async fn forget_asset(&self, name: &str) {
        self.assets.lock().await.retain(|asset| asset.name != name);
    }

    /// Assets uploaded for this request that have not been deleted yet
    pub async fn outstanding_assets(&self) -> Vec<UploadedAsset> {
        self.assets.lock().await.clone()
    }

    /// Release everything the scope still holds
    ///
    /// Outstanding assets are deleted through `generative`, then the
    /// directory is removed. Failures are logged and never returned.
    pub async fn close(self, generative: &dyn GenerativePort) {
        let assets = std::mem::take(&mut *self.assets.lock().await);
        for asset in &assets {
            if let Err(e) = generative.delete_asset(asset).await {
                warn!(scope = %self.id, asset = %asset.name, error = %e, "Failed to delete asset");
            }
        }

        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            warn!(scope = %self.id, path = %path.display(), error = %e, "Failed to remove request scope");
        } else {
            debug!(scope = %self.id, "Closed request scope");
        }
    }
}
