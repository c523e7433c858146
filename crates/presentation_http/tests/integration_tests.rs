//! Integration tests for HTTP handlers
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use application::{
    DispatchConfig, DispatchService, ERROR_NOTICE, MEDIA_PROMPT, PAGE_PROMPT, UNSUPPORTED_NOTICE,
    error::ApplicationError,
    ports::{
        DownloadedMedia, GeneratedReply, GenerativePort, MessengerPort, PageRasterizerPort,
        UploadedAsset,
    },
};
use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use domain::{PhoneNumber, TextIntent};
use infrastructure::AppConfig;
use presentation_http::{REQUEST_ID_HEADER, routes::create_router, state::AppState};
use serde_json::json;

const RECIPIENT: &str = "+201234567890";

// ============ Fakes ============

#[derive(Default)]
struct FakeMessenger {
    sent: Mutex<Vec<(String, String)>>,
    downloads: Mutex<Vec<String>>,
    media: Vec<u8>,
}

#[async_trait]
impl MessengerPort for FakeMessenger {
    async fn send_text(
        &self,
        recipient: &PhoneNumber,
        text: &str,
    ) -> Result<String, ApplicationError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push((recipient.as_str().to_string(), text.to_string()));
        Ok(format!("wamid.{}", sent.len()))
    }

    async fn download_media(&self, media_id: &str) -> Result<DownloadedMedia, ApplicationError> {
        self.downloads.lock().unwrap().push(media_id.to_string());
        Ok(DownloadedMedia {
            data: self.media.clone(),
            mime_type: None,
        })
    }
}

#[derive(Default)]
struct FakeGenerative {
    fail: bool,
    intents: Mutex<Vec<TextIntent>>,
    prompts: Mutex<Vec<String>>,
    uploaded: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
}

impl FakeGenerative {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl GenerativePort for FakeGenerative {
    async fn generate_text(
        &self,
        prompt: &str,
        intent: TextIntent,
    ) -> Result<GeneratedReply, ApplicationError> {
        if self.fail {
            return Err(ApplicationError::Inference("model unavailable".to_string()));
        }
        self.intents.lock().unwrap().push(intent);
        Ok(GeneratedReply::new(format!("reply to {prompt}"), "fake-model"))
    }

    async fn upload_asset(
        &self,
        path: &Path,
        mime_type: &str,
        display_name: &str,
    ) -> Result<UploadedAsset, ApplicationError> {
        assert!(path.exists(), "uploaded file must exist");
        let name = format!("files/{display_name}");
        self.uploaded.lock().unwrap().push(name.clone());
        Ok(UploadedAsset {
            uri: format!("https://files.test/{name}"),
            name,
            mime_type: mime_type.to_string(),
        })
    }

    async fn generate_with_asset(
        &self,
        asset: &UploadedAsset,
        prompt: &str,
    ) -> Result<GeneratedReply, ApplicationError> {
        if self.fail {
            return Err(ApplicationError::Inference("model unavailable".to_string()));
        }
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(GeneratedReply::new(
            format!("summary of {}", asset.name),
            "fake-model",
        ))
    }

    async fn delete_asset(&self, asset: &UploadedAsset) -> Result<(), ApplicationError> {
        self.deleted.lock().unwrap().push(asset.name.clone());
        Ok(())
    }
}

struct FakeRasterizer {
    pages: u32,
}

#[async_trait]
impl PageRasterizerPort for FakeRasterizer {
    async fn page_count(&self, _document: &Path) -> Result<u32, ApplicationError> {
        Ok(self.pages)
    }

    async fn render_page(
        &self,
        _document: &Path,
        page: u32,
        output_dir: &Path,
    ) -> Result<PathBuf, ApplicationError> {
        let image = output_dir.join(format!("page-{page}.jpg"));
        std::fs::write(&image, [0xFF, 0xD8]).unwrap();
        Ok(image)
    }
}

// ============ Harness ============

struct Harness {
    server: TestServer,
    messenger: Arc<FakeMessenger>,
    generative: Arc<FakeGenerative>,
    workspace: tempfile::TempDir,
}

impl Harness {
    fn new() -> Self {
        Self::with(FakeGenerative::default(), 2)
    }

    fn with(generative: FakeGenerative, pages: u32) -> Self {
        let messenger = Arc::new(FakeMessenger {
            media: vec![1, 2, 3],
            ..FakeMessenger::default()
        });
        let generative = Arc::new(generative);
        let workspace = tempfile::tempdir().unwrap();

        let dispatch_service = DispatchService::with_config(
            Arc::clone(&messenger) as Arc<dyn MessengerPort>,
            Arc::clone(&generative) as Arc<dyn GenerativePort>,
            Arc::new(FakeRasterizer { pages }),
            PhoneNumber::new(RECIPIENT).unwrap(),
            DispatchConfig {
                page_concurrency: 1,
                workspace_root: Some(workspace.path().to_path_buf()),
            },
        );

        let state = AppState {
            dispatch_service: Arc::new(dispatch_service),
            config: Arc::new(AppConfig::default()),
        };

        let server =
            TestServer::new(create_router(state)).expect("Failed to create test server");

        Self {
            server,
            messenger,
            generative,
            workspace,
        }
    }

    fn sent(&self) -> Vec<(String, String)> {
        self.messenger.sent.lock().unwrap().clone()
    }

    fn workspace_is_empty(&self) -> bool {
        std::fs::read_dir(self.workspace.path()).unwrap().next().is_none()
    }
}

fn webhook(message: serde_json::Value) -> serde_json::Value {
    json!({
        "object": "whatsapp_business_account",
        "entry": [{
            "id": "1",
            "changes": [{
                "field": "messages",
                "value": {
                    "messaging_product": "whatsapp",
                    "messages": [message]
                }
            }]
        }]
    })
}

// ============ Liveness ============

#[tokio::test]
async fn root_reports_bot_name() {
    let harness = Harness::new();

    let response = harness.server.get("/").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "MindBot-1.7-mini is running.");

    let response = harness.server.post("/").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "MindBot-1.7-mini is running.");
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let harness = Harness::new();

    let response = harness.server.get("/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn responses_carry_request_id() {
    let harness = Harness::new();

    let response = harness.server.get("/health").await;

    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
}

// ============ Verification ============

#[tokio::test]
async fn verify_returns_challenge() {
    let harness = Harness::new();

    let response = harness
        .server
        .get("/webhook")
        .add_query_param("hub.mode", "subscribe")
        .add_query_param("hub.verify_token", "BOT")
        .add_query_param("hub.challenge", "1158201444")
        .await;

    response.assert_status_ok();
    assert_eq!(response.text(), "1158201444");
}

#[tokio::test]
async fn verify_rejects_wrong_token() {
    let harness = Harness::new();

    let response = harness
        .server
        .get("/webhook")
        .add_query_param("hub.mode", "subscribe")
        .add_query_param("hub.verify_token", "nope")
        .add_query_param("hub.challenge", "42")
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.text(), "Forbidden");
}

#[tokio::test]
async fn verify_rejects_wrong_mode() {
    let harness = Harness::new();

    let response = harness
        .server
        .get("/webhook")
        .add_query_param("hub.mode", "unsubscribe")
        .add_query_param("hub.verify_token", "BOT")
        .add_query_param("hub.challenge", "42")
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn verify_rejects_missing_parameters() {
    let harness = Harness::new();

    let response = harness.server.get("/webhook").await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn verify_rejects_duplicate_mode() {
    let harness = Harness::new();

    let response = harness
        .server
        .get("/webhook")
        .add_query_param("hub.mode", "subscribe")
        .add_query_param("hub.mode", "x")
        .add_query_param("hub.verify_token", "BOT")
        .add_query_param("hub.challenge", "1")
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.text(), "Forbidden");
}

// ============ Messages ============

#[tokio::test]
async fn unparsable_body_is_no_message() {
    let harness = Harness::new();

    let response = harness.server.post("/webhook").text("not json").await;

    response.assert_status_ok();
    assert_eq!(response.json::<serde_json::Value>(), json!({"status": "no message"}));
    assert!(harness.sent().is_empty());
}

#[tokio::test]
async fn status_update_without_message_is_no_message() {
    let harness = Harness::new();

    let response = harness
        .server
        .post("/webhook")
        .json(&json!({"entry": [{"changes": [{"value": {"statuses": [{"id": "wamid.1"}]}}]}]}))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<serde_json::Value>()["status"], "no message");
}

#[tokio::test]
async fn text_message_is_answered() {
    let harness = Harness::new();

    let response = harness
        .server
        .post("/webhook")
        .json(&webhook(json!({
            "from": "201111111111",
            "id": "wamid.in",
            "type": "text",
            "text": {"body": "hello"}
        })))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<serde_json::Value>()["status"], "text handled");
    assert_eq!(
        harness.sent(),
        vec![(RECIPIENT.to_string(), "reply to hello".to_string())]
    );
    assert_eq!(
        *harness.generative.intents.lock().unwrap(),
        vec![TextIntent::Plain]
    );
}

#[tokio::test]
async fn search_text_uses_tools() {
    let harness = Harness::new();

    let response = harness
        .server
        .post("/webhook")
        .json(&webhook(json!({
            "type": "text",
            "text": {"body": "what is on https://example.com"}
        })))
        .await;

    response.assert_status_ok();
    assert_eq!(
        *harness.generative.intents.lock().unwrap(),
        vec![TextIntent::Search]
    );
}

#[tokio::test]
async fn image_is_analyzed_and_cleaned_up() {
    let harness = Harness::new();

    let response = harness
        .server
        .post("/webhook")
        .json(&webhook(json!({"type": "image", "image": {"id": "123"}})))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<serde_json::Value>()["status"], "media handled");
    assert_eq!(*harness.messenger.downloads.lock().unwrap(), vec!["123"]);
    assert_eq!(
        *harness.generative.prompts.lock().unwrap(),
        vec![MEDIA_PROMPT.to_string()]
    );

    let sent = harness.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1, "summary of files/image.jpg");

    assert_eq!(
        *harness.generative.uploaded.lock().unwrap(),
        *harness.generative.deleted.lock().unwrap()
    );
    assert!(harness.workspace_is_empty());
}

#[tokio::test]
async fn document_pages_are_joined_in_order() {
    let harness = Harness::new();

    let response = harness
        .server
        .post("/webhook")
        .json(&webhook(json!({
            "type": "document",
            "document": {"id": "doc-1", "mime_type": "application/pdf", "filename": "a.pdf"}
        })))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<serde_json::Value>()["status"], "pdf handled");

    let sent = harness.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].1,
        "summary of files/page-1.jpg\n\nsummary of files/page-2.jpg"
    );
    assert_eq!(
        *harness.generative.prompts.lock().unwrap(),
        vec![PAGE_PROMPT.to_string(), PAGE_PROMPT.to_string()]
    );
    assert_eq!(harness.generative.deleted.lock().unwrap().len(), 2);
    assert!(harness.workspace_is_empty());
}

#[tokio::test]
async fn unsupported_type_gets_notice_without_fetch() {
    let harness = Harness::new();

    let response = harness
        .server
        .post("/webhook")
        .json(&webhook(json!({"type": "sticker", "sticker": {"id": "s1"}})))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<serde_json::Value>()["status"], "unsupported");
    assert_eq!(
        harness.sent(),
        vec![(RECIPIENT.to_string(), UNSUPPORTED_NOTICE.to_string())]
    );
    assert!(harness.messenger.downloads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn non_pdf_document_is_unsupported() {
    let harness = Harness::new();

    let response = harness
        .server
        .post("/webhook")
        .json(&webhook(json!({
            "type": "document",
            "document": {"id": "doc-2", "mime_type": "application/msword"}
        })))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<serde_json::Value>()["status"], "unsupported");
    assert!(harness.messenger.downloads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn inference_failure_sends_single_error_notice() {
    let harness = Harness::with(FakeGenerative::failing(), 1);

    let response = harness
        .server
        .post("/webhook")
        .json(&webhook(json!({"type": "video", "video": {"id": "v1"}})))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<serde_json::Value>(), json!({"status": "error"}));
    assert_eq!(
        harness.sent(),
        vec![(RECIPIENT.to_string(), ERROR_NOTICE.to_string())]
    );
    assert_eq!(
        *harness.generative.uploaded.lock().unwrap(),
        *harness.generative.deleted.lock().unwrap()
    );
    assert!(harness.workspace_is_empty());
}
