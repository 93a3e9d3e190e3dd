//! Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::timeout_from_env;
use crate::error::RequestError;

use super::prompt::build_request_text;
use super::{Credential, MessageRequester};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Environment variable to override the default timeout (seconds).
pub const TIMEOUT_ENV_VAR: &str = "XPOCOMMIT_REQUEST_TIMEOUT";

/// Maximum characters of an error body kept in [`RequestError::Rejected`].
const MAX_ERROR_BODY: usize = 500;

#[derive(Serialize, Debug)]
struct Part {
    text: String,
}

#[derive(Serialize, Debug)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Debug)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Deserialize, Debug, Default)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    #[serde(default)]
    content: ResponseContent,
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate, if any.
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content
            .parts
            .into_iter()
            .next()?
            .text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

/// Client for the Gemini generative language API.
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout: timeout_from_env(TIMEOUT_ENV_VAR, DEFAULT_TIMEOUT),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE, DEFAULT_MODEL)
    }
}

#[async_trait]
impl MessageRequester for GeminiClient {
    async fn request(
        &self,
        diff: &str,
        credential: Option<&Credential>,
    ) -> Result<String, RequestError> {
        let credential = credential.ok_or(RequestError::MissingCredential)?;

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_request_text(diff),
                }],
            }],
        };

        debug!(
            "Requesting commit message from {} ({} chars of diff)",
            self.model,
            diff.len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", credential.expose())
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RequestError::Timeout(self.timeout.as_secs())
                } else {
                    RequestError::Transport(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY).collect();
            return Err(RequestError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            debug!("Unparseable message service response: {}", e);
            RequestError::EmptyResponse
        })?;

        parsed.first_text().ok_or(RequestError::EmptyResponse)
    }
}
