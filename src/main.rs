//! Wiring & DI. Entry point: bootstrap adapters, inject into the message handler, serve the webhook.
//! No business logic here.

use dotenv::dotenv;
use medpet_bot::adapters::ai::{MockAssistantAdapter, OpenAiAdapter};
use medpet_bot::adapters::diagnostics::TracingDiagnostics;
use medpet_bot::adapters::persistence::{JsonAppointmentLog, MemoryConversationStore};
use medpet_bot::adapters::whatsapp::{self, WebhookState, WhatsAppClient};
use medpet_bot::ports::{
    AppointmentLogPort, AssistantPort, ConversationStore, DiagnosticsPort, InboundPort,
    MessagingGateway,
};
use medpet_bot::shared::config::AppConfig;
use medpet_bot::usecases::{MediaCatalog, MessageHandler};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = AppConfig::load()?;
    if !cfg.is_whatsapp_configured() {
        anyhow::bail!(
            "Set MEDPET_API_TOKEN and MEDPET_BUSINESS_PHONE (env or .env). Get them from the Meta developer dashboard"
        );
    }
    let verify_token = cfg.webhook_verify_token.clone().unwrap_or_default();
    if verify_token.is_empty() {
        warn!("MEDPET_WEBHOOK_VERIFY_TOKEN not set; webhook subscription requests will be rejected");
    }

    // --- Outbound: WhatsApp Cloud API ---
    let gateway: Arc<dyn MessagingGateway> = Arc::new(WhatsAppClient::new(
        &cfg.base_url_or_default(),
        &cfg.api_version_or_default(),
        cfg.business_phone.as_deref().unwrap_or_default(),
        cfg.api_token.clone().unwrap_or_default(),
    ));

    // --- Assistant ---
    let assistant: Arc<dyn AssistantPort> = if cfg.is_ai_configured() {
        info!(
            model = %cfg.ai_model_or_default(),
            url = %cfg.ai_api_url_or_default(),
            "assistant enabled with OpenAI adapter"
        );
        Arc::new(OpenAiAdapter::new(
            cfg.ai_api_url_or_default(),
            cfg.ai_api_key.clone().unwrap_or_default(),
            cfg.ai_model_or_default(),
        ))
    } else {
        warn!("MEDPET_AI_API_KEY not set, using mock assistant adapter");
        Arc::new(MockAssistantAdapter::new())
    };

    // --- Conversation state (bounded, in memory) ---
    let state_ttl = Duration::from_secs(cfg.state_ttl_secs_or_default());
    let state_capacity = cfg.state_capacity_or_default();
    info!(
        ttl_secs = state_ttl.as_secs(),
        capacity = state_capacity,
        "conversation state store"
    );
    let store: Arc<dyn ConversationStore> =
        Arc::new(MemoryConversationStore::new(state_ttl, state_capacity));

    // --- Appointment log ---
    let log = JsonAppointmentLog::new(cfg.appointments_path_or_default());
    info!(path = %log.path().display(), "appending appointments");
    let appointments: Arc<dyn AppointmentLogPort> = Arc::new(log);

    let diagnostics: Arc<dyn DiagnosticsPort> = Arc::new(TracingDiagnostics);
    let media = MediaCatalog::medpet(&cfg.cdn_base_url_or_default());

    let handler: Arc<dyn InboundPort> = Arc::new(MessageHandler::new(
        gateway,
        assistant,
        store,
        appointments,
        diagnostics,
        media,
    ));

    // --- Webhook server ---
    let app = whatsapp::router(WebhookState {
        handler,
        verify_token,
    });
    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port_or_default()));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("bind {}: {}", addr, e))?;
    info!(%addr, "webhook server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("webhook server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
