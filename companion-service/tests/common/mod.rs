//! Shared helpers for companion-service integration tests.
//!
//! Provides test configuration, mock-backed application state and local
//! stand-ins for the chat and speech providers.

#![allow(dead_code)]

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use companion_service::config::{
    AudioConfig, ChatConfig, CompanionConfig, ObservabilityConfig, TtsConfig,
};
use companion_service::services::providers::mock::{MockChatProvider, MockSpeechProvider};
use companion_service::services::providers::{ChatProvider, SpeechProvider};
use companion_service::services::{InMemorySessionStore, LocalAudioStorage, SpeechService};
use companion_service::startup::{AppState, Application};
use futures::{SinkExt, StreamExt};
use secrecy::SecretString;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::handshake::server::{
    ErrorResponse, Request as WsRequest, Response as WsResponse,
};
use tokio_tungstenite::tungstenite::Message;

pub const TEST_CLAUDE_KEY: &str = "sk-test-claude-key-do-not-leak";
pub const TEST_MINIMAX_KEY: &str = "test-minimax-key-do-not-leak";
pub const TEST_VOICE_ID: &str = "moss_audio_1383593b-b1b4-11f0-a816-023f15327f7a";
pub const TEST_MAX_TURNS: usize = 2;

pub fn test_config(audio_dir: &Path) -> CompanionConfig {
    CompanionConfig {
        common: service_core::config::Config { port: 0 },
        chat: ChatConfig {
            api_key: Some(SecretString::new(TEST_CLAUDE_KEY.to_string())),
            api_url: "http://127.0.0.1:9/v1/messages".to_string(),
            model: "claude-test".to_string(),
            max_tokens: 300,
            system_prompt: "You are a test companion.".to_string(),
            max_history_turns: TEST_MAX_TURNS,
        },
        tts: TtsConfig {
            api_key: Some(SecretString::new(TEST_MINIMAX_KEY.to_string())),
            ws_url: "ws://127.0.0.1:9".to_string(),
            model: "speech-02-turbo".to_string(),
            voice_id: TEST_VOICE_ID.to_string(),
            min_audio_bytes: 1000,
        },
        audio: AudioConfig {
            output_dir: audio_dir.to_path_buf(),
        },
        observability: ObservabilityConfig {
            log_level: "error".to_string(),
            otlp_endpoint: None,
        },
    }
}

pub async fn build_state(
    config: CompanionConfig,
    chat_provider: Arc<dyn ChatProvider>,
    speech_provider: Arc<dyn SpeechProvider>,
) -> AppState {
    let storage = LocalAudioStorage::new(config.audio.output_dir.clone())
        .await
        .expect("Failed to create audio storage");
    let speech = SpeechService::new(
        speech_provider,
        Arc::new(storage),
        config.tts.min_audio_bytes,
    );

    AppState::new(
        config,
        Arc::new(InMemorySessionStore::new()),
        chat_provider,
        speech,
    )
}

/// Router plus the handles a test needs to inspect.
pub struct TestRouter {
    pub router: Router,
    pub state: AppState,
    pub chat: Arc<MockChatProvider>,
    pub audio_dir: TempDir,
}

impl TestRouter {
    pub async fn with_mocks(speech: MockSpeechProvider) -> Self {
        let audio_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let chat = Arc::new(MockChatProvider::new(true));
        let state = build_state(
            test_config(audio_dir.path()),
            chat.clone(),
            Arc::new(speech),
        )
        .await;

        Self {
            router: companion_service::build_router(state.clone()),
            state,
            chat,
            audio_dir,
        }
    }

    pub async fn default_mocks() -> Self {
        Self::with_mocks(MockSpeechProvider::with_placeholder_audio()).await
    }
}

/// Application running on a random port.
pub struct TestApp {
    pub http_address: String,
    pub state: AppState,
    pub audio_dir: TempDir,
}

impl TestApp {
    pub async fn spawn(
        chat_provider: Arc<dyn ChatProvider>,
        speech_provider: Arc<dyn SpeechProvider>,
    ) -> Self {
        let audio_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let state = build_state(test_config(audio_dir.path()), chat_provider, speech_provider).await;

        let app = Application::build_with_state(state.clone())
            .await
            .expect("Failed to build test application");
        let http_address = format!("http://127.0.0.1:{}", app.http_port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", http_address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        Self {
            http_address,
            state,
            audio_dir,
        }
    }
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

// ============================================================================
// Speech provider stand-in
// ============================================================================

pub fn started_frame() -> String {
    r#"{"event":"task_started","base_resp":{"status_code":0,"status_msg":"success"}}"#.to_string()
}

pub fn audio_frame(audio: &[u8]) -> String {
    serde_json::json!({
        "event": "task_continued",
        "data": { "audio": hex::encode(audio) },
        "is_final": false,
        "base_resp": { "status_code": 0, "status_msg": "success" }
    })
    .to_string()
}

pub fn final_frame() -> String {
    serde_json::json!({
        "event": "task_continued",
        "data": { "audio": "" },
        "is_final": true,
        "base_resp": { "status_code": 0, "status_msg": "success" }
    })
    .to_string()
}

pub fn failed_frame(msg: &str) -> String {
    serde_json::json!({
        "event": "task_failed",
        "base_resp": { "status_code": 1004, "status_msg": msg }
    })
    .to_string()
}

/// Local WebSocket server speaking the streaming TTS protocol from a script.
///
/// Per connection: capture the Authorization header, read `task_start`,
/// send the ack frame, read `task_continue`, send the scripted frames, then
/// drain whatever the client sends until it closes.
pub struct MockTtsServer {
    pub url: String,
    pub received: Arc<Mutex<Vec<serde_json::Value>>>,
    pub auth_headers: Arc<Mutex<Vec<String>>>,
}

impl MockTtsServer {
    pub async fn start(frames: Vec<String>) -> Self {
        Self::start_with_ack(started_frame(), frames).await
    }

    pub async fn start_with_ack(ack: String, frames: Vec<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        let received = Arc::new(Mutex::new(Vec::new()));
        let auth_headers = Arc::new(Mutex::new(Vec::new()));

        let received_task = received.clone();
        let auth_task = auth_headers.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let received = received_task.clone();
                let auth = auth_task.clone();
                let ack = ack.clone();
                let frames = frames.clone();

                tokio::spawn(async move {
                    let callback = move |req: &WsRequest,
                                         resp: WsResponse|
                          -> Result<WsResponse, ErrorResponse> {
                        if let Some(value) = req.headers().get("authorization") {
                            let value = value.to_str().unwrap_or_default().to_string();
                            auth.lock().unwrap().push(value);
                        }
                        Ok(resp)
                    };

                    let mut ws = match tokio_tungstenite::accept_hdr_async(stream, callback).await {
                        Ok(ws) => ws,
                        Err(_) => return,
                    };

                    // task_start
                    if !record(ws.next().await, &received) {
                        return;
                    }
                    if ws.send(Message::Text(ack)).await.is_err() {
                        return;
                    }

                    // task_continue
                    if !record(ws.next().await, &received) {
                        return;
                    }
                    for frame in frames {
                        if ws.send(Message::Text(frame)).await.is_err() {
                            return;
                        }
                    }

                    while record(ws.next().await, &received) {}
                });
            }
        });

        Self {
            url,
            received,
            auth_headers,
        }
    }

    pub fn received_events(&self) -> Vec<String> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .filter_map(|v| v["event"].as_str().map(str::to_string))
            .collect()
    }
}

/// Store a client text frame as JSON. Returns false once the client is gone.
fn record(
    msg: Option<Result<Message, tokio_tungstenite::tungstenite::Error>>,
    received: &Mutex<Vec<serde_json::Value>>,
) -> bool {
    match msg {
        Some(Ok(Message::Text(text))) => {
            let value: serde_json::Value = serde_json::from_str(&text).unwrap_or_default();
            received.lock().unwrap().push(value);
            true
        }
        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => false,
        Some(Ok(_)) => true,
    }
}

// ============================================================================
// Chat provider stand-in
// ============================================================================

#[derive(Clone)]
struct MockClaudeState {
    status: StatusCode,
    body: serde_json::Value,
    requests: Arc<Mutex<Vec<(HeaderMap, serde_json::Value)>>>,
}

/// Local HTTP server answering Messages API calls with a canned response.
pub struct MockClaudeServer {
    pub url: String,
    pub requests: Arc<Mutex<Vec<(HeaderMap, serde_json::Value)>>>,
}

impl MockClaudeServer {
    pub async fn start(status: StatusCode, body: serde_json::Value) -> Self {
        async fn handle(
            State(state): State<MockClaudeState>,
            headers: HeaderMap,
            Json(payload): Json<serde_json::Value>,
        ) -> impl IntoResponse {
            state.requests.lock().unwrap().push((headers, payload));
            (state.status, Json(state.body.clone()))
        }

        let requests = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/v1/messages", post(handle))
            .with_state(MockClaudeState {
                status,
                body,
                requests: requests.clone(),
            });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/v1/messages", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self { url, requests }
    }

    pub async fn replying(text: &str) -> Self {
        Self::start(
            StatusCode::OK,
            serde_json::json!({
                "id": "msg_test",
                "type": "message",
                "role": "assistant",
                "content": [{ "type": "text", "text": text }],
                "usage": { "input_tokens": 12, "output_tokens": 5 }
            }),
        )
        .await
    }
}
