//! Page rasterizer port - Turns document pages into images

use std::path::{Path, PathBuf};

#[cfg(test)]
use mockall::automock;

use async_trait::async_trait;

use crate::error::ApplicationError;

/// Port for splitting a paged document into per-page images
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PageRasterizerPort: Send + Sync {
    /// Count the pages of a document
    async fn page_count(&self, document: &Path) -> Result<u32, ApplicationError>;

    /// Render one page (1-based) as a JPEG inside `output_dir`
    ///
    /// Returns the path of the rendered image.
    async fn render_page(
        &self,
        document: &Path,
        page: u32,
        output_dir: &Path,
    ) -> Result<PathBuf, ApplicationError>;
}
