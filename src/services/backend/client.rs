use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use url::{Host, Url};

use crate::config::KioskConfig;
use crate::error::KioskError;
use crate::turn::types::{TtsLocation, TurnResponse};
use crate::turn::wire::{SessionStart, WireTurn};

/// HTTP client for the conversation backend. One per kiosk session.
#[derive(Clone)]
pub struct ConversationClient {
    client: Client,
    base_url: Url,
}

#[derive(Serialize)]
struct TextRequest<'a> {
    session_id: &'a str,
    text: &'a str,
}

impl ConversationClient {
    pub fn new(config: &KioskConfig) -> Result<Self, KioskError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_millis(config.request_timeout_ms))
                .build()
                .unwrap_or_default(),
            base_url: Url::parse(config.backend_url.trim_end_matches('/'))?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn start_session(&self) -> Result<SessionStart, KioskError> {
        let response = self
            .client
            .post(self.endpoint("session/start"))
            .json(&serde_json::json!({}))
            .send()
            .await?;
        let body = Self::body(response).await?;
        let start: SessionStart = serde_json::from_str(&body)?;
        if !start.session_id.as_deref().is_some_and(|id| !id.trim().is_empty()) {
            return Err(KioskError::MissingSession);
        }
        Ok(start)
    }

    pub async fn send_text(&self, session_id: &str, text: &str) -> Result<TurnResponse, KioskError> {
        let response = self
            .client
            .post(self.endpoint("session/text"))
            .json(&TextRequest { session_id, text })
            .send()
            .await?;
        Self::turn(response).await
    }

    /// Uploads a WAV clip as the multipart field `audio`.
    pub async fn send_voice(&self, session_id: &str, wav: Vec<u8>) -> Result<TurnResponse, KioskError> {
        let part = Part::bytes(wav).file_name("voice.wav").mime_str("audio/wav")?;
        let form = Form::new().part("audio", part);
        let response = self
            .client
            .post(self.endpoint("session/voice"))
            .query(&[("session_id", session_id)])
            .multipart(form)
            .send()
            .await?;
        Self::turn(response).await
    }

    /// Where the kiosk should fetch a TTS clip from.
    ///
    /// Loopback URLs are the backend talking about itself and get the configured
    /// scheme, host and port. Other absolute URLs pass through. Relative paths
    /// are joined to the base under `tts/`.
    pub fn resolve_tts_url(&self, location: &TtsLocation) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        match location {
            TtsLocation::Url(raw) => match Url::parse(raw.trim()) {
                Ok(parsed) if is_loopback(&parsed) => {
                    let mut rewritten = self.base_url.clone();
                    rewritten.set_path(parsed.path());
                    rewritten.set_query(parsed.query());
                    rewritten.set_fragment(parsed.fragment());
                    rewritten.to_string()
                }
                Ok(parsed) => parsed.to_string(),
                Err(_) => format!("{}/{}", base, raw.trim().trim_start_matches('/')),
            },
            TtsLocation::Path(raw) => {
                let path = raw.trim().trim_start_matches('/');
                if path.starts_with("tts/") {
                    format!("{base}/{path}")
                } else {
                    format!("{base}/tts/{path}")
                }
            }
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    async fn body(response: Response) -> Result<String, KioskError> {
        let status = response.status();
        if !status.is_success() {
            return Err(KioskError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }

    async fn turn(response: Response) -> Result<TurnResponse, KioskError> {
        let body = Self::body(response).await?;
        let wire = WireTurn::parse(&body)?;
        debug!(
            step = ?wire.context.as_ref().and_then(|c| c.step.as_deref()),
            "turn received"
        );
        Ok(wire.into_turn())
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(addr)) => addr.is_loopback(),
        Some(Host::Ipv6(addr)) => addr.is_loopback(),
        None => false,
    }
}
