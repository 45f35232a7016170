//! Application startup and lifecycle management.
//!
//! Provider clients, the session store and audio storage are created once
//! here and shared with every request through [`AppState`].

use crate::config::CompanionConfig;
use crate::handlers;
use crate::models::audio::AUDIO_URL_PREFIX;
use crate::services::providers::claude::{ClaudeChatProvider, ClaudeConfig};
use crate::services::providers::minimax::{MinimaxConfig, MinimaxSpeechProvider};
use crate::services::providers::{ChatProvider, SpeechProvider};
use crate::services::{InMemorySessionStore, LocalAudioStorage, SessionStore, SpeechService};
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics_middleware, prefixed_metrics_middleware, request_id_middleware,
};
use service_core::tower::Layer;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: CompanionConfig,
    pub sessions: Arc<dyn SessionStore>,
    pub chat_provider: Arc<dyn ChatProvider>,
    pub speech: SpeechService,
}

impl AppState {
    pub fn new(
        config: CompanionConfig,
        sessions: Arc<dyn SessionStore>,
        chat_provider: Arc<dyn ChatProvider>,
        speech: SpeechService,
    ) -> Self {
        Self {
            config,
            sessions,
            chat_provider,
            speech,
        }
    }

    /// Wire up the production providers from configuration.
    pub async fn from_config(config: CompanionConfig) -> Result<Self, AppError> {
        let chat_provider = ClaudeChatProvider::new(ClaudeConfig {
            api_key: config.chat.api_key.clone(),
            api_url: config.chat.api_url.clone(),
            model: config.chat.model.clone(),
            max_tokens: config.chat.max_tokens,
            system_prompt: config.chat.system_prompt.clone(),
        })
        .map_err(|e| AppError::ConfigError(anyhow::anyhow!("{}", e)))?;

        if chat_provider.is_configured() {
            tracing::info!(model = %config.chat.model, "Initialized Claude chat provider");
        } else {
            tracing::warn!("CLAUDE_API_KEY not set, chat requests will fail");
        }

        let speech_provider = MinimaxSpeechProvider::new(MinimaxConfig {
            api_key: config.tts.api_key.clone(),
            ws_url: config.tts.ws_url.clone(),
            model: config.tts.model.clone(),
            voice_id: config.tts.voice_id.clone(),
        });

        if speech_provider.is_configured() {
            tracing::info!(model = %config.tts.model, "Initialized MiniMax speech provider");
        } else {
            tracing::warn!("MINIMAX_API_KEY not set, TTS requests will fail");
        }

        let storage = LocalAudioStorage::new(config.audio.output_dir.clone())
            .await
            .map_err(|e| {
                tracing::error!(
                    dir = %config.audio.output_dir.display(),
                    "Failed to create audio directory: {}",
                    e
                );
                e
            })?;

        let speech = SpeechService::new(
            Arc::new(speech_provider),
            Arc::new(storage),
            config.tts.min_audio_bytes,
        );

        Ok(Self::new(
            config,
            Arc::new(InMemorySessionStore::new()),
            Arc::new(chat_provider),
            speech,
        ))
    }
}

/// Build the HTTP router for the given state.
pub fn build_router(state: AppState) -> Router {
    let audio_files = from_fn_with_state(AUDIO_URL_PREFIX, prefixed_metrics_middleware)
        .layer(ServeDir::new(state.config.audio.output_dir.clone()));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/api/chat", post(handlers::chat))
        .route("/api/tts", post(handlers::generate_tts))
        .route("/api/session/:session_id", delete(handlers::delete_session))
        .route("/api/sessions", get(handlers::list_sessions))
        .route_layer(from_fn(metrics_middleware))
        .nest_service(AUDIO_URL_PREFIX, audio_files)
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Application container for managing server lifecycle.
pub struct Application {
    http_port: u16,
    http_listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: CompanionConfig) -> Result<Self, AppError> {
        let state = AppState::from_config(config).await?;
        Self::build_with_state(state).await
    }

    /// Build the application around pre-built state (e.g. mock providers).
    pub async fn build_with_state(state: AppState) -> Result<Self, AppError> {
        // Port 0 = random port for testing
        let http_addr = SocketAddr::from(([0, 0, 0, 0], state.config.common.port));
        let http_listener = TcpListener::bind(http_addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", http_addr, e);
            AppError::from(e)
        })?;
        let http_port = http_listener.local_addr()?.port();

        tracing::info!("Companion service: HTTP on port {}", http_port);

        Ok(Self {
            http_port,
            http_listener,
            state,
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        axum::serve(self.http_listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}
