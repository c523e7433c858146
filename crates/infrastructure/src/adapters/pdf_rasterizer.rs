//! PDF page rasterizer
//!
//! Uses poppler's `pdfinfo` to count pages and `pdftoppm` to render a single
//! page as JPEG. Both tools must be installed on the system.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use application::{error::ApplicationError, ports::PageRasterizerPort};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::config::DocumentConfig;

/// Rasterizer backed by the poppler command line tools
#[derive(Debug, Clone)]
pub struct PdfRasterizer {
    pdftoppm_path: String,
    pdfinfo_path: String,
    dpi: u32,
}

impl Default for PdfRasterizer {
    fn default() -> Self {
        Self::new(&DocumentConfig::default())
    }
}

impl PdfRasterizer {
    /// Create a rasterizer from the document configuration
    pub fn new(config: &DocumentConfig) -> Self {
        Self {
            pdftoppm_path: config.pdftoppm_path.clone(),
            pdfinfo_path: config.pdfinfo_path.clone(),
            dpi: config.dpi,
        }
    }

    /// Check if both tools are available on the system
    #[instrument(skip(self))]
    pub async fn is_available(&self) -> bool {
        for tool in [&self.pdfinfo_path, &self.pdftoppm_path] {
            let ok = Command::new(tool)
                .arg("-v")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await
                .is_ok_and(|status| status.success());
            if !ok {
                return false;
            }
        }
        true
    }

    async fn run(mut cmd: Command, tool: &str) -> Result<Vec<u8>, ApplicationError> {
        let output = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ApplicationError::Rasterize(format!("Failed to spawn {tool}: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ApplicationError::Rasterize(format!(
                "{tool} failed: {}",
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }
}

/// Read the page count from `pdfinfo` output
pub(crate) fn parse_page_count(info: &str) -> Option<u32> {
    info.lines()
        .find_map(|line| line.strip_prefix("Pages:"))
        .and_then(|value| value.trim().parse().ok())
}

#[async_trait]
impl PageRasterizerPort for PdfRasterizer {
    #[instrument(skip(self, document), fields(document = %document.display()))]
    async fn page_count(&self, document: &Path) -> Result<u32, ApplicationError> {
        let mut cmd = Command::new(&self.pdfinfo_path);
        cmd.arg(document);

        let stdout = Self::run(cmd, "pdfinfo").await?;
        let info = String::from_utf8_lossy(&stdout);

        let pages = parse_page_count(&info).ok_or_else(|| {
            ApplicationError::Rasterize("pdfinfo output has no page count".to_string())
        })?;

        debug!(pages, "Counted document pages");
        Ok(pages)
    }

    #[instrument(skip(self, document, output_dir), fields(document = %document.display()))]
    async fn render_page(
        &self,
        document: &Path,
        page: u32,
        output_dir: &Path,
    ) -> Result<PathBuf, ApplicationError> {
        let prefix = output_dir.join(format!("page-{page}"));
        let page_arg = page.to_string();

        // -singlefile writes exactly `{prefix}.jpg`
        let mut cmd = Command::new(&self.pdftoppm_path);
        cmd.arg("-f")
            .arg(&page_arg)
            .arg("-l")
            .arg(&page_arg)
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-jpeg")
            .arg("-singlefile")
            .arg(document)
            .arg(&prefix);

        Self::run(cmd, "pdftoppm").await?;

        let image = prefix.with_extension("jpg");
        if !tokio::fs::try_exists(&image).await.unwrap_or(false) {
            return Err(ApplicationError::Rasterize(format!(
                "pdftoppm produced no image for page {page}"
            )));
        }

        debug!(page, image = %image.display(), "Rendered page");
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PDFINFO_OUTPUT: &str = "\
Producer:       Skia/PDF m120
CreationDate:   Mon Jan  1 00:00:00 2024 UTC
Tagged:         no
Pages:          12
Encrypted:      no
Page size:      595 x 842 pts (A4)
";

    fn missing_tools() -> PdfRasterizer {
        PdfRasterizer::new(&DocumentConfig {
            pdftoppm_path: "/nonexistent/pdftoppm".to_string(),
            pdfinfo_path: "/nonexistent/pdfinfo".to_string(),
            ..DocumentConfig::default()
        })
    }

    #[test]
    fn parses_page_count() {
        assert_eq!(parse_page_count(PDFINFO_OUTPUT), Some(12));
    }

    #[test]
    fn missing_page_line_is_none() {
        assert_eq!(parse_page_count("Producer: x\nEncrypted: no\n"), None);
    }

    #[test]
    fn garbage_page_count_is_none() {
        assert_eq!(parse_page_count("Pages: many\n"), None);
    }

    #[test]
    fn default_uses_tools_from_path() {
        let rasterizer = PdfRasterizer::default();
        assert_eq!(rasterizer.pdfinfo_path, "pdfinfo");
        assert_eq!(rasterizer.pdftoppm_path, "pdftoppm");
        assert_eq!(rasterizer.dpi, 72);
    }

    #[tokio::test]
    async fn missing_pdfinfo_is_rasterize_error() {
        let err = missing_tools()
            .page_count(Path::new("doc.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Rasterize(_)));
    }

    #[tokio::test]
    async fn missing_pdftoppm_is_rasterize_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = missing_tools()
            .render_page(Path::new("doc.pdf"), 1, dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Rasterize(_)));
    }

    #[tokio::test]
    async fn missing_tools_are_unavailable() {
        assert!(!missing_tools().is_available().await);
    }
}
