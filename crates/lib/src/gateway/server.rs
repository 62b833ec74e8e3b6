//! Gateway HTTP server: push intake and health.

use crate::config::{self, ApiConfig, Config};
use crate::delivery::{BoundedQueue, DeliveryQueue, Dispatcher};
use crate::gateway::auth;
use crate::gateway::protocol::{HealthStatus, PushAck, PushRequest};
use crate::gateway::GatewayError;
use crate::messengers::{LogMessenger, Messenger, MessengerRegistry, TelegramMessenger};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;

const HEALTH_PATH: &str = "/health";

/// Shared, read-only state for request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<ApiConfig>,
    pub queue: Arc<dyn DeliveryQueue>,
}

impl GatewayState {
    /// Validate the API config and wrap it with the queue pushes go to.
    pub fn new(config: ApiConfig, queue: Arc<dyn DeliveryQueue>) -> Result<Self> {
        if config.token.trim().is_empty() {
            anyhow::bail!("refusing to start gateway without api.token (set it or PUSHGATE_TOKEN)");
        }
        if config.route_path() == HEALTH_PATH {
            anyhow::bail!("api.path must not be {}", HEALTH_PATH);
        }
        Ok(Self {
            config: Arc::new(config),
            queue,
        })
    }
}

/// Routes: `POST {api.path}` and `GET /health`.
pub fn router(state: GatewayState) -> Router {
    let push_path = state.config.route_path();
    Router::new()
        .route(&push_path, post(push_message))
        .route(HEALTH_PATH, get(health_http))
        .with_state(state)
}

/// Serve on an already-bound listener until `shutdown` completes.
pub async fn serve<F>(listener: TcpListener, state: GatewayState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("gateway server exited")
}

/// Build the messenger registry from config: Telegram when a bot token is
/// available, and the log messenger as fallback.
pub async fn build_registry(config: &Config) -> Arc<MessengerRegistry> {
    let registry = Arc::new(MessengerRegistry::new());
    if let Some(token) = config::resolve_telegram_token(config) {
        let telegram = Arc::new(TelegramMessenger::new(token));
        registry
            .register(telegram.id().to_string(), telegram)
            .await;
        log::info!("telegram messenger registered");
    }
    registry.set_fallback(Arc::new(LogMessenger::new())).await;
    registry
}

/// Run the gateway; binds to api.host:api.port, starts the delivery dispatcher,
/// and blocks until SIGINT/SIGTERM. Messages still queued at shutdown are dropped.
pub async fn run_gateway(config: Config) -> Result<()> {
    let (queue, queue_rx) = BoundedQueue::new(config.queue.capacity);
    let state = GatewayState::new(config.api.clone(), Arc::new(queue))?;

    let registry = build_registry(&config).await;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let dispatcher = Dispatcher::new(registry).spawn(queue_rx, shutdown_rx);

    let bind_addr = config.api.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!(
        "push gateway listening on {} (POST {})",
        bind_addr,
        state.config.route_path()
    );

    let result = serve(listener, state, shutdown_signal()).await;

    let _ = shutdown_tx.send(true);
    if let Err(e) = dispatcher.await {
        log::warn!("delivery dispatcher task failed: {}", e);
    }
    log::info!("push gateway stopped");
    result
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, stopping push gateway");
}

/// POST {api.path} — authenticate, validate, resolve the recipient, enqueue.
async fn push_message(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PushAck>, GatewayError> {
    auth::authorize(&headers, &state.config.token)?;

    let request: PushRequest = serde_json::from_slice(&body).map_err(|e| {
        log::debug!("push body is not valid JSON: {}", e);
        GatewayError::Validation(format!("invalid JSON body: {}", e))
    })?;
    let message = request.into_outbound(state.config.default_recipient())?;
    let message_id = message.id.clone();
    let umo = message.recipient.clone();

    state.queue.enqueue(message).await.map_err(|e| {
        log::error!("enqueue of message {} failed: {}", message_id, e);
        GatewayError::from(e)
    })?;
    log::info!("queued message {} for {}", message_id, umo);

    Ok(Json(PushAck {
        status: "queued".to_string(),
        message_id,
        umo,
        queue_size: state.queue.pending(),
    }))
}

/// GET /health returns queue depth and server time (for probes).
async fn health_http(State(state): State<GatewayState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        queue_size: state.queue.pending(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
