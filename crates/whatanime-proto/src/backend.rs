//! Transport to the whatanime backend.
//!
//! [`Backend`] is the seam the sync loop and gateway are generic over;
//! [`HttpBackend`] is the reqwest implementation used by the binary.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::anisong::{SongAnnId, SongId, TrackId};
use crate::config::BackendConfig;
use crate::protocol::RawUpdate;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid session cookie: {0}")]
    InvalidCookie(String),
}

/// Bind a backend song to the track currently playing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmRequest {
    pub song_id: SongId,
    #[serde(rename = "spotify_song_id")]
    pub track_id: TrackId,
}

/// Flag a wrong or missing match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub track_id: Option<TrackId>,
    pub ann_song_id: Option<SongAnnId>,
    pub message: String,
}

pub trait Backend: Send + Sync + 'static {
    /// Fetch the current playback state. `force` asks the backend to
    /// re-resolve even if the track did not change.
    fn poll(&self, force: bool) -> impl Future<Output = Result<RawUpdate, BackendError>> + Send;

    fn confirm(
        &self,
        request: &ConfirmRequest,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    fn report(
        &self,
        request: &ReportRequest,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Where to send the user when the backend has no session.
    fn login_url(&self) -> String;
}

pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(cookie) = config.session_cookie.as_deref().filter(|c| !c.is_empty()) {
            let value = reqwest::header::HeaderValue::from_str(cookie)
                .map_err(|e| BackendError::InvalidCookie(e.to_string()))?;
            headers.insert(reqwest::header::COOKIE, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("whatanime-tui/", env!("CARGO_PKG_VERSION")))
            .cookie_store(true)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Backend for HttpBackend {
    async fn poll(&self, force: bool) -> Result<RawUpdate, BackendError> {
        let mut request = self.client.get(self.url("/api/update"));
        if force {
            request = request.query(&[("refresh", "true")]);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status));
        }
        let body = response.text().await?;
        debug!("[backend] poll force={} -> {} bytes", force, body.len());
        Ok(serde_json::from_str(&body)?)
    }

    async fn confirm(&self, request: &ConfirmRequest) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.url("/api/confirm_anime"))
            .query(request)
            .json(request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status));
        }
        Ok(())
    }

    async fn report(&self, request: &ReportRequest) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.url("/api/report"))
            .json(request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status));
        }
        Ok(())
    }

    fn login_url(&self) -> String {
        self.url("/api/login")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = BackendConfig {
            base_url: "http://localhost:8000/".to_string(),
            ..Default::default()
        };
        let backend = HttpBackend::new(&config).unwrap();
        assert_eq!(backend.login_url(), "http://localhost:8000/api/login");
    }

    #[test]
    fn test_bad_cookie_is_rejected() {
        let config = BackendConfig {
            session_cookie: Some("id=\nbroken".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            HttpBackend::new(&config),
            Err(BackendError::InvalidCookie(_))
        ));
    }

    #[test]
    fn test_confirm_request_uses_backend_field_names() {
        let req = ConfirmRequest {
            song_id: SongId(42),
            track_id: TrackId::new("abc"),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({ "song_id": 42, "spotify_song_id": "abc" })
        );
    }
}
