use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, error};

use crate::models::{AskRequest, AskResponse};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Server returned {0}")]
    Status(u16),

    #[error("{0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid API base URL '{base}': {reason}")]
    Url { base: String, reason: String },
}

/// Anything that can answer a question. The orchestrator only talks to this
/// trait, so tests can substitute a scripted backend for the HTTP one.
#[async_trait]
pub trait AskBackend: Send + Sync {
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ApiError>;
}

/// Build `{base}/{path}` without dropping any path prefix `base` already has.
pub fn endpoint_url(base: &str, path: &str) -> Result<Url, ApiError> {
    let base_with_slash = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    };
    let stripped = path.strip_prefix('/').unwrap_or(path);

    Url::parse(&base_with_slash)
        .and_then(|url| url.join(stripped))
        .map_err(|e| ApiError::Url {
            base: base.to_string(),
            reason: e.to_string(),
        })
}

/// `/ask` over HTTP with JSON bodies.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    ask_url: Url,
}

impl HttpBackend {
    pub fn new(api_base: &str) -> Result<Self, ApiError> {
        Ok(Self {
            client: Client::new(),
            ask_url: endpoint_url(api_base, "/ask")?,
        })
    }

    pub fn ask_url(&self) -> &Url {
        &self.ask_url
    }
}

#[async_trait]
impl AskBackend for HttpBackend {
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ApiError> {
        debug!(url = %self.ask_url, mode = %request.mode, "sending question");

        let response = self
            .client
            .post(self.ask_url.clone())
            .json(request)
            .send()
            .await
            .inspect_err(|e| error!("request to backend failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("backend returned {status}: {body}");
            return Err(ApiError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        let answer: AskResponse = serde_json::from_slice(&bytes)
            .inspect_err(|e| error!("could not decode backend response: {e}"))?;

        debug!(
            backend = ?answer.backend,
            citations = answer.citations.len(),
            "answer received"
        );

        Ok(answer)
    }
}
