//! Commit message requests against a text-generation service.
//!
//! The core hands over the assembled diff and only checks whether a message
//! came back.

pub mod gemini;
pub mod prompt;

use std::env;
use std::fmt;

use async_trait::async_trait;

use crate::diff::AssembledDiff;
use crate::error::RequestError;

pub use gemini::GeminiClient;
pub use prompt::{COMMIT_PROMPT, build_request_text};

/// Environment variables checked for an API key, in order.
pub const CREDENTIAL_ENV_VARS: [&str; 2] = ["XPOCOMMIT_API_KEY", "GEMINI_API_KEY"];

/// An opaque API key.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Look up an API key from the environment.
    ///
    /// Checks `XPOCOMMIT_API_KEY`, then `GEMINI_API_KEY`. Empty values are skipped.
    pub fn from_env() -> Option<Self> {
        CREDENTIAL_ENV_VARS.iter().find_map(|name| {
            env::var(name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(Self)
        })
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Text in, commit message out.
#[async_trait]
pub trait MessageRequester: Send + Sync {
    async fn request(
        &self,
        diff: &str,
        credential: Option<&Credential>,
    ) -> Result<String, RequestError>;
}

/// Ask the requester for a commit message describing `diff`.
///
/// A blank message is treated as [`RequestError::EmptyResponse`].
pub async fn generate_commit_message<R: MessageRequester + ?Sized>(
    requester: &R,
    diff: &AssembledDiff,
    credential: Option<&Credential>,
) -> Result<String, RequestError> {
    let message = requester.request(&diff.text, credential).await?;
    let message = message.trim();
    if message.is_empty() {
        return Err(RequestError::EmptyResponse);
    }
    Ok(message.to_string())
}
