//! Document summarizer - Page-by-page analysis of PDF documents
//!
//! Each page is rendered to a JPEG in the request scope, summarized through
//! the AI relay, and its image removed before the result is kept. Summaries
//! come back in page order regardless of how many pages run at once.

use std::{fmt, path::Path, sync::Arc};

use futures::{StreamExt, TryStreamExt, stream};
use tracing::{debug, info, instrument};

use crate::{
    error::ApplicationError,
    ports::PageRasterizerPort,
    services::{AiRelay, RequestScope},
};

/// Prompt sent with every page image
pub const PAGE_PROMPT: &str = "Analyze and summarize this page directly:";

/// Separator between page summaries
pub const PAGE_SEPARATOR: &str = "\n\n";

const PAGE_MIME_TYPE: &str = "image/jpeg";

/// Summarizes a paged document one page at a time
#[derive(Clone)]
pub struct DocumentSummarizer {
    rasterizer: Arc<dyn PageRasterizerPort>,
    relay: AiRelay,
    page_concurrency: usize,
}

impl fmt::Debug for DocumentSummarizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentSummarizer")
            .field("page_concurrency", &self.page_concurrency)
            .finish_non_exhaustive()
    }
}

impl DocumentSummarizer {
    /// Create a summarizer that processes one page at a time
    pub fn new(rasterizer: Arc<dyn PageRasterizerPort>, relay: AiRelay) -> Self {
        Self {
            rasterizer,
            relay,
            page_concurrency: 1,
        }
    }

    /// Allow up to `limit` pages in flight; zero is treated as one
    #[must_use]
    pub fn with_page_concurrency(mut self, limit: usize) -> Self {
        self.page_concurrency = limit.max(1);
        self
    }

    /// Summarize every page of `document`
    ///
    /// The first failing page aborts the document.
    #[instrument(skip(self, scope), fields(scope = %scope.id()))]
    pub async fn summarize(
        &self,
        scope: &RequestScope,
        document: &Path,
    ) -> Result<String, ApplicationError> {
        let pages = self.rasterizer.page_count(document).await?;
        if pages == 0 {
            return Err(ApplicationError::Rasterize("document has no pages".into()));
        }

        info!(pages, concurrency = self.page_concurrency, "Summarizing document");

        let summaries: Vec<String> = stream::iter(1..=pages)
            .map(|page| self.summarize_page(scope, document, page))
            .buffered(self.page_concurrency)
            .try_collect()
            .await?;

        Ok(summaries.join(PAGE_SEPARATOR))
    }

    async fn summarize_page(
        &self,
        scope: &RequestScope,
        document: &Path,
        page: u32,
    ) -> Result<String, ApplicationError> {
        let image = self
            .rasterizer
            .render_page(document, page, scope.path())
            .await?;

        let result = self
            .relay
            .analyze_file(scope, &image, PAGE_MIME_TYPE, PAGE_PROMPT)
            .await;
        scope.remove_file(&image).await;

        debug!(page, ok = result.is_ok(), "Page processed");
        result
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::ports::{
        GeneratedReply, MockGenerativePort, MockPageRasterizerPort, UploadedAsset,
    };
    use domain::ScopeId;

    /// Rasterizer that writes a real file per page so removal can be checked
    fn rasterizer_with_pages(pages: u32) -> MockPageRasterizerPort {
        let mut rasterizer = MockPageRasterizerPort::new();
        rasterizer
            .expect_page_count()
            .times(1)
            .returning(move |_| Ok(pages));
        rasterizer
            .expect_render_page()
            .returning(|_, page, dir| {
                let path = dir.join(format!("page-{page}.jpg"));
                std::fs::write(&path, b"jpeg").unwrap();
                Ok(path)
            });
        rasterizer
    }

    /// Generative mock that answers "summary of <file name>"
    fn echoing_generative(deletes: Arc<AtomicU32>) -> MockGenerativePort {
        let mut generative = MockGenerativePort::new();
        generative
            .expect_upload_asset()
            .returning(|path: &Path, mime, name| {
                assert_eq!(mime, PAGE_MIME_TYPE);
                assert!(path.exists());
                Ok(UploadedAsset {
                    name: format!("files/{name}"),
                    uri: format!("https://example.com/{name}"),
                    mime_type: mime.to_string(),
                })
            });
        generative
            .expect_generate_with_asset()
            .withf(|_, prompt| prompt == PAGE_PROMPT)
            .returning(|asset, _| {
                Ok(GeneratedReply::new(
                    format!("summary of {}", asset.name.trim_start_matches("files/")),
                    "gemini",
                ))
            });
        generative.expect_delete_asset().returning(move |_| {
            deletes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        generative
    }

    fn summarizer(
        rasterizer: MockPageRasterizerPort,
        generative: MockGenerativePort,
    ) -> DocumentSummarizer {
        DocumentSummarizer::new(
            Arc::new(rasterizer),
            AiRelay::new(Arc::new(generative)),
        )
    }

    fn document() -> PathBuf {
        PathBuf::from("document.pdf")
    }

    #[tokio::test]
    async fn three_pages_produce_three_segments_in_order() {
        let root = tempfile::tempdir().unwrap();
        let scope = RequestScope::create_in(ScopeId::new(), root.path()).unwrap();
        let deletes = Arc::new(AtomicU32::new(0));

        let summarizer = summarizer(rasterizer_with_pages(3), echoing_generative(deletes.clone()));
        let text = summarizer.summarize(&scope, &document()).await.unwrap();

        assert_eq!(
            text,
            "summary of page-1.jpg\n\nsummary of page-2.jpg\n\nsummary of page-3.jpg"
        );
        assert_eq!(deletes.load(Ordering::SeqCst), 3);
        assert_eq!(std::fs::read_dir(scope.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn concurrent_pages_keep_page_order() {
        let root = tempfile::tempdir().unwrap();
        let scope = RequestScope::create_in(ScopeId::new(), root.path()).unwrap();
        let deletes = Arc::new(AtomicU32::new(0));

        let summarizer = summarizer(rasterizer_with_pages(5), echoing_generative(deletes.clone()))
            .with_page_concurrency(3);
        let text = summarizer.summarize(&scope, &document()).await.unwrap();

        let segments: Vec<&str> = text.split(PAGE_SEPARATOR).collect();
        assert_eq!(segments.len(), 5);
        for (i, segment) in segments.iter().enumerate() {
            assert_eq!(*segment, format!("summary of page-{}.jpg", i + 1));
        }
        assert_eq!(deletes.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn single_page_has_no_separator() {
        let root = tempfile::tempdir().unwrap();
        let scope = RequestScope::create_in(ScopeId::new(), root.path()).unwrap();

        let summarizer = summarizer(
            rasterizer_with_pages(1),
            echoing_generative(Arc::new(AtomicU32::new(0))),
        );
        let text = summarizer.summarize(&scope, &document()).await.unwrap();

        assert_eq!(text, "summary of page-1.jpg");
    }

    #[tokio::test]
    async fn zero_pages_is_rasterize_error() {
        let root = tempfile::tempdir().unwrap();
        let scope = RequestScope::create_in(ScopeId::new(), root.path()).unwrap();

        let mut rasterizer = MockPageRasterizerPort::new();
        rasterizer.expect_page_count().returning(|_| Ok(0));
        rasterizer.expect_render_page().never();
        let mut generative = MockGenerativePort::new();
        generative.expect_upload_asset().never();

        let result = summarizer(rasterizer, generative)
            .summarize(&scope, &document())
            .await;

        assert!(matches!(result, Err(ApplicationError::Rasterize(_))));
    }

    #[tokio::test]
    async fn failing_page_aborts_document_after_cleanup() {
        let root = tempfile::tempdir().unwrap();
        let scope = RequestScope::create_in(ScopeId::new(), root.path()).unwrap();
        let deletes = Arc::new(AtomicU32::new(0));

        let mut generative = MockGenerativePort::new();
        generative
            .expect_upload_asset()
            .returning(|_, _, name| {
                Ok(UploadedAsset {
                    name: format!("files/{name}"),
                    uri: String::new(),
                    mime_type: PAGE_MIME_TYPE.to_string(),
                })
            });
        generative.expect_generate_with_asset().returning(|asset, _| {
            if asset.name.ends_with("page-2.jpg") {
                Err(ApplicationError::Inference("blocked".into()))
            } else {
                Ok(GeneratedReply::new("ok", "gemini"))
            }
        });
        let counter = deletes.clone();
        generative.expect_delete_asset().returning(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let result = summarizer(rasterizer_with_pages(3), generative)
            .summarize(&scope, &document())
            .await;

        assert!(matches!(result, Err(ApplicationError::Inference(_))));
        // page 3 is never started in sequential mode
        assert_eq!(deletes.load(Ordering::SeqCst), 2);
        assert_eq!(std::fs::read_dir(scope.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn render_failure_is_rasterize_error() {
        let root = tempfile::tempdir().unwrap();
        let scope = RequestScope::create_in(ScopeId::new(), root.path()).unwrap();

        let mut rasterizer = MockPageRasterizerPort::new();
        rasterizer.expect_page_count().returning(|_| Ok(2));
        rasterizer
            .expect_render_page()
            .times(1)
            .returning(|_, _, _| Err(ApplicationError::Rasterize("pdftoppm exited 1".into())));
        let mut generative = MockGenerativePort::new();
        generative.expect_upload_asset().never();

        let result = summarizer(rasterizer, generative)
            .summarize(&scope, &document())
            .await;

        assert!(matches!(result, Err(ApplicationError::Rasterize(_))));
    }

    #[test]
    fn zero_concurrency_is_clamped() {
        let summarizer = summarizer(MockPageRasterizerPort::new(), MockGenerativePort::new())
            .with_page_concurrency(0);
        assert_eq!(summarizer.page_concurrency, 1);
    }
}
