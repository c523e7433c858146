//! MindBot HTTP Server
//!
//! Main entry point for the WhatsApp webhook relay.

use std::{future::IntoFuture, sync::Arc, time::Duration};

use anyhow::Context;
use application::{
    DispatchConfig, DispatchService,
    ports::{GenerativePort, MessengerPort, PageRasterizerPort},
};
use infrastructure::{
    AppConfig, DEFAULT_LOG_FILTER, GeminiGenerativeAdapter, PdfRasterizer,
    WhatsAppMessengerAdapter, init_tracing,
};
use presentation_http::{routes, state::AppState};
use tokio::{net::TcpListener, signal, sync::Notify};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;

    init_tracing(config.server.log_format, DEFAULT_LOG_FILTER)?;

    info!("🤖 MindBot v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(e.into());
    }

    info!(
        host = %config.server.host,
        port = %config.server.port,
        model = %config.gemini.model,
        bot_name = %config.server.bot_name,
        "Configuration loaded"
    );

    let recipient = config.recipient_number()?;

    let messenger: Arc<dyn MessengerPort> = Arc::new(
        WhatsAppMessengerAdapter::new(config.whatsapp_client_config())
            .context("Failed to initialize WhatsApp client")?,
    );

    let generative: Arc<dyn GenerativePort> = Arc::new(
        GeminiGenerativeAdapter::new(config.gemini.to_client_config())
            .context("Failed to initialize Gemini client")?,
    );

    let pdf_rasterizer = PdfRasterizer::new(&config.document);
    if !pdf_rasterizer.is_available().await {
        warn!(
            pdftoppm = %config.document.pdftoppm_path,
            pdfinfo = %config.document.pdfinfo_path,
            "Poppler tools not found, PDF documents will fail"
        );
    }
    let rasterizer: Arc<dyn PageRasterizerPort> = Arc::new(pdf_rasterizer);

    let dispatch_service = DispatchService::with_config(
        messenger,
        generative,
        rasterizer,
        recipient,
        DispatchConfig {
            page_concurrency: config.document.page_concurrency,
            workspace_root: None,
        },
    );

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs.unwrap_or(30));
    let addr = config.server.bind_address();

    let dispatch_service = Arc::new(dispatch_service);
    let state = AppState {
        dispatch_service: Arc::clone(&dispatch_service),
        config: Arc::new(config),
    };

    let app = routes::create_router(state).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("🚀 Server listening on http://{}", addr);
    info!("📨 Webhook: http://{}/webhook", addr);

    let draining = Arc::new(Notify::new());
    let server = axum::serve(listener, app)
        .with_graceful_shutdown({
            let draining = Arc::clone(&draining);
            async move {
                shutdown_signal(shutdown_timeout).await;
                draining.notify_one();
            }
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        () = async {
            draining.notified().await;
            tokio::time::sleep(shutdown_timeout).await;
        } => {
            warn!("Shutdown timeout elapsed, closing remaining connections");
        }
    }

    // Dispatches outlive their connections and still hold remote assets
    info!("⏳ Waiting for in-flight messages to finish...");
    dispatch_service.drain().await;

    info!("👋 Server shutdown complete");

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("📥 Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("📥 Received SIGTERM, initiating graceful shutdown...");
        }
    }

    info!("⏳ Waiting up to {:?} for connections to close...", timeout);
}
