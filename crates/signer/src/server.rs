pub mod health;
pub mod response;
pub mod sign;

use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    Router,
    http::{Method, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{self, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Args;
use crate::i18n::Translator;
use crate::orchestrator::DocumentSigner;

pub use response::{ApiResponse, Envelope, ErrorBody};
pub use sign::SignDocumentInput;

#[derive(Clone)]
pub struct AppState {
    pub signer: Arc<DocumentSigner>,
    pub translator: Arc<Translator>,
    pub started_at: Instant,
    /// Longest a signing request may run before it is answered as failed.
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(signer: DocumentSigner, translator: Translator) -> Self {
        Self {
            signer: Arc::new(signer),
            translator: Arc::new(translator),
            started_at: Instant::now(),
            request_timeout: ServerConfig::default().request_timeout,
        }
    }
}

/// Paths and limits of the HTTP surface.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub signer_route: String,
    pub health_route: String,
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            signer_route: "/signer".to_string(),
            health_route: "/health".to_string(),
            request_timeout: Duration::from_secs(15),
        }
    }
}

impl From<&Args> for ServerConfig {
    fn from(args: &Args) -> Self {
        Self {
            signer_route: args.signer_route.clone(),
            health_route: args.health_route.clone(),
            request_timeout: args.request_timeout(),
        }
    }
}

pub fn router(mut state: AppState, config: &ServerConfig) -> Router {
    state.request_timeout = config.request_timeout;

    let cors = CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route(&config.signer_route, post(sign::sign_document))
        .route(&config.health_route, get(health::health))
        .layer(CatchPanicLayer::custom({
            let translator = state.translator.clone();
            move |panic: Box<dyn Any + Send + 'static>| panic_response(&translator, panic)
        }))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn panic_response(translator: &Translator, panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic message".to_string()
    };
    tracing::error!("panic while handling request: {message}");

    ApiResponse::internal(translator, translator.default_locale()).into_response()
}

pub async fn run(address: &str, config: &ServerConfig, state: AppState) -> Result<()> {
    let app = router(state, config);

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("binding {address}"))?;
    tracing::info!(
        address = %listener.local_addr().context("reading bound address")?,
        signer_route = %config.signer_route,
        health_route = %config.health_route,
        "signer listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    tracing::info!("server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
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
    tracing::info!("shutdown initiated");
}
