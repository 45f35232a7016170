//! MiniMax streaming speech provider.
//!
//! One WebSocket per synthesis: the client sends `task_start` with voice and
//! audio settings, then `task_continue` with the text. The server streams
//! frames carrying hex-encoded audio until one is flagged `is_final`.

use super::{ProviderError, SpeechProvider};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{header::AUTHORIZATION, HeaderValue};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Upper bound on a whole synthesis, connection included.
const SYNTHESIS_TIMEOUT: Duration = Duration::from_secs(120);

/// MiniMax provider configuration.
#[derive(Debug, Clone)]
pub struct MinimaxConfig {
    pub api_key: Option<SecretString>,
    pub ws_url: String,
    pub model: String,
    pub voice_id: String,
}

/// Progress of a single synthesis.
///
/// Every path ends in `Done` or `Failed`; the socket is owned by the state
/// that is currently using it.
enum SynthesisState {
    /// Opening the socket and sending `task_start`.
    Connecting,
    /// Waiting for the server to accept the task.
    Started(WsStream),
    /// Collecting audio fragments.
    Receiving {
        ws: WsStream,
        audio: Vec<u8>,
        chunks: usize,
    },
    Done(Vec<u8>),
    Failed(ProviderError),
}

pub struct MinimaxSpeechProvider {
    config: MinimaxConfig,
}

impl MinimaxSpeechProvider {
    pub fn new(config: MinimaxConfig) -> Self {
        Self { config }
    }

    async fn run(&self, api_key: &SecretString, text: &str) -> Result<Vec<u8>, ProviderError> {
        let mut state = SynthesisState::Connecting;

        loop {
            state = match state {
                SynthesisState::Connecting => self.connect(api_key).await,
                SynthesisState::Started(ws) => Self::continue_task(ws, text).await,
                SynthesisState::Receiving { ws, audio, chunks } => {
                    Self::receive(ws, audio, chunks).await
                }
                SynthesisState::Done(audio) => return Ok(audio),
                SynthesisState::Failed(e) => return Err(e),
            };
        }
    }

    async fn connect(&self, api_key: &SecretString) -> SynthesisState {
        let mut request = match self.config.ws_url.as_str().into_client_request() {
            Ok(r) => r,
            Err(e) => {
                return SynthesisState::Failed(ProviderError::NotConfigured(format!(
                    "Invalid TTS endpoint {}: {}",
                    self.config.ws_url, e
                )))
            }
        };

        match HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret())) {
            Ok(value) => {
                request.headers_mut().insert(AUTHORIZATION, value);
            }
            Err(_) => {
                return SynthesisState::Failed(ProviderError::NotConfigured(
                    "MINIMAX_API_KEY contains invalid header characters".to_string(),
                ))
            }
        }

        let mut ws = match connect_async(request).await {
            Ok((ws, _)) => ws,
            Err(e) => return SynthesisState::Failed(ProviderError::NetworkError(e.to_string())),
        };

        let start = TaskStart {
            event: "task_start",
            model: &self.config.model,
            voice_setting: VoiceSetting {
                voice_id: &self.config.voice_id,
                speed: 1.0,
                vol: 1.0,
                pitch: 0,
            },
            audio_setting: AudioSetting {
                sample_rate: 32000,
                bitrate: 128000,
                format: "mp3",
                channel: 1,
            },
        };

        if let Err(e) = send_json(&mut ws, &start).await {
            return SynthesisState::Failed(e);
        }

        tracing::debug!(model = %self.config.model, "TTS task_start sent");
        SynthesisState::Started(ws)
    }

    /// Wait for the server to accept the task, then send the text.
    async fn continue_task(mut ws: WsStream, text: &str) -> SynthesisState {
        loop {
            let frame = match next_frame(&mut ws).await {
                Ok(frame) => frame,
                Err(e) => return SynthesisState::Failed(e),
            };

            if let Some(reason) = frame.failure() {
                return SynthesisState::Failed(ProviderError::ApiError(reason));
            }

            // Sent on connect by some deployments, before the task ack.
            if frame.event.as_deref() == Some("connected_success") {
                continue;
            }

            tracing::debug!(event = ?frame.event, "TTS task accepted");
            break;
        }

        let message = TaskContinue {
            event: "task_continue",
            text,
        };
        if let Err(e) = send_json(&mut ws, &message).await {
            return SynthesisState::Failed(e);
        }

        SynthesisState::Receiving {
            ws,
            audio: Vec::new(),
            chunks: 0,
        }
    }

    /// Consume one frame of the audio stream.
    async fn receive(mut ws: WsStream, mut audio: Vec<u8>, mut chunks: usize) -> SynthesisState {
        let frame = match next_frame(&mut ws).await {
            Ok(frame) => frame,
            Err(e) => return SynthesisState::Failed(e),
        };

        if let Some(reason) = frame.failure() {
            return SynthesisState::Failed(ProviderError::ApiError(reason));
        }

        match frame.audio_bytes() {
            Ok(Some(bytes)) => {
                audio.extend_from_slice(&bytes);
                chunks += 1;
            }
            Ok(None) => {}
            Err(e) => return SynthesisState::Failed(e),
        }

        if !frame.is_final.unwrap_or(false) {
            return SynthesisState::Receiving { ws, audio, chunks };
        }

        tracing::info!(chunks, bytes = audio.len(), "TTS stream complete");

        // The audio is already complete; a failed goodbye does not change that.
        let finish = TaskFinish {
            event: "task_finish",
        };
        if send_json(&mut ws, &finish).await.is_ok() {
            let _ = ws.close(None).await;
        }

        SynthesisState::Done(audio)
    }
}

#[async_trait]
impl SpeechProvider for MinimaxSpeechProvider {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ProviderError> {
        let api_key = self.config.api_key.as_ref().ok_or_else(|| {
            ProviderError::NotConfigured("MINIMAX_API_KEY is not set".to_string())
        })?;

        tokio::time::timeout(SYNTHESIS_TIMEOUT, self.run(api_key, text))
            .await
            .map_err(|_| {
                ProviderError::NetworkError(format!(
                    "TTS synthesis timed out after {}s",
                    SYNTHESIS_TIMEOUT.as_secs()
                ))
            })?
    }

    fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }
}

async fn send_json<T: Serialize>(ws: &mut WsStream, message: &T) -> Result<(), ProviderError> {
    let payload = serde_json::to_string(message)
        .map_err(|e| ProviderError::Protocol(format!("Failed to encode message: {}", e)))?;
    ws.send(Message::Text(payload))
        .await
        .map_err(|e| ProviderError::NetworkError(e.to_string()))
}

/// Read the next JSON text frame, skipping control frames.
async fn next_frame(ws: &mut WsStream) -> Result<ServerFrame, ProviderError> {
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => return ServerFrame::parse(&text),
            Some(Ok(Message::Close(frame))) => {
                return Err(ProviderError::Protocol(format!(
                    "Connection closed before final frame: {:?}",
                    frame
                )))
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(ProviderError::NetworkError(e.to_string())),
            None => {
                return Err(ProviderError::Protocol(
                    "Connection ended before final frame".to_string(),
                ))
            }
        }
    }
}

// ============================================================================
// MiniMax WebSocket Message Types
// ============================================================================

#[derive(Debug, Serialize)]
struct TaskStart<'a> {
    event: &'a str,
    model: &'a str,
    voice_setting: VoiceSetting<'a>,
    audio_setting: AudioSetting<'a>,
}

#[derive(Debug, Serialize)]
struct VoiceSetting<'a> {
    voice_id: &'a str,
    speed: f32,
    vol: f32,
    pitch: i32,
}

#[derive(Debug, Serialize)]
struct AudioSetting<'a> {
    sample_rate: u32,
    bitrate: u32,
    format: &'a str,
    channel: u8,
}

#[derive(Debug, Serialize)]
struct TaskContinue<'a> {
    event: &'a str,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct TaskFinish<'a> {
    event: &'a str,
}

#[derive(Debug, Deserialize)]
struct ServerFrame {
    #[serde(default)]
    event: Option<String>,
    #[serde(default)]
    data: Option<FrameData>,
    #[serde(default)]
    is_final: Option<bool>,
    #[serde(default)]
    base_resp: Option<BaseResp>,
}

#[derive(Debug, Deserialize)]
struct FrameData {
    #[serde(default)]
    audio: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BaseResp {
    status_code: i64,
    #[serde(default)]
    status_msg: String,
}

impl ServerFrame {
    fn parse(text: &str) -> Result<Self, ProviderError> {
        serde_json::from_str(text)
            .map_err(|e| ProviderError::Protocol(format!("Malformed TTS frame: {}", e)))
    }

    /// Error reported by the server in this frame, if any.
    fn failure(&self) -> Option<String> {
        if self.event.as_deref() == Some("task_failed") {
            let msg = self
                .base_resp
                .as_ref()
                .map(|b| b.status_msg.clone())
                .unwrap_or_default();
            return Some(format!("TTS task failed: {}", msg));
        }

        match &self.base_resp {
            Some(b) if b.status_code != 0 => Some(format!(
                "TTS provider status {}: {}",
                b.status_code, b.status_msg
            )),
            _ => None,
        }
    }

    /// Decoded audio fragment, if the frame carries one.
    fn audio_bytes(&self) -> Result<Option<Vec<u8>>, ProviderError> {
        match self.data.as_ref().and_then(|d| d.audio.as_deref()) {
            Some(hex_audio) if !hex_audio.is_empty() => hex::decode(hex_audio)
                .map(Some)
                .map_err(|e| ProviderError::Protocol(format!("Invalid hex audio: {}", e))),
            _ => Ok(None),
        }
    }
}
