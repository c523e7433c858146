//! Document rasterization configuration.

use serde::{Deserialize, Serialize};

/// Poppler tools and rendering settings for PDF documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// Path or name of the `pdftoppm` binary
    #[serde(default = "default_pdftoppm_path")]
    pub pdftoppm_path: String,

    /// Path or name of the `pdfinfo` binary
    #[serde(default = "default_pdfinfo_path")]
    pub pdfinfo_path: String,

    /// Render resolution
    #[serde(default = "default_dpi")]
    pub dpi: u32,

    /// Pages summarized at once
    #[serde(default = "default_page_concurrency")]
    pub page_concurrency: usize,
}

fn default_pdftoppm_path() -> String {
    "pdftoppm".to_string()
}

fn default_pdfinfo_path() -> String {
    "pdfinfo".to_string()
}

const fn default_dpi() -> u32 {
    72
}

const fn default_page_concurrency() -> usize {
    1
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            pdftoppm_path: default_pdftoppm_path(),
            pdfinfo_path: default_pdfinfo_path(),
            dpi: default_dpi(),
            page_concurrency: default_page_concurrency(),
        }
    }
}
