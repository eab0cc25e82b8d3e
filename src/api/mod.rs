//! Backend surface of the assistant service.
//!
//! Components talk to the backend only through [`AssistantApi`], so the
//! dashboard, the CLI and the tests can swap the transport freely.

mod http;
#[cfg(test)]
pub(crate) mod mock;
mod models;

pub use http::HttpAssistantApi;
pub use models::*;

use async_trait::async_trait;
use thiserror::Error;

/// Failures talking to the backend. Every non-2xx response is a failure;
/// response bodies are not interpreted.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{path} returned HTTP {status}")]
    Status { path: String, status: u16 },

    #[error("invalid backend url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

#[async_trait]
pub trait AssistantApi: Send + Sync {
    /// `GET /assistant/sessions/{sid}/agentic-status`
    async fn agentic_status(&self, session: &SessionId) -> Result<AgenticStatus, ApiError>;

    /// `POST /assistant/sessions/{sid}/enable-agentic`
    async fn enable_agentic(&self, session: &SessionId) -> Result<AgenticStatus, ApiError>;

    /// `POST /assistant/sessions/{sid}/reset-agentic-memory`
    async fn reset_agentic_memory(&self, session: &SessionId) -> Result<(), ApiError>;

    /// `GET /assistant/sessions/{sid}/cached-analyses`
    async fn cached_analyses(&self, session: &SessionId) -> Result<CachedAnalysisList, ApiError>;

    /// `DELETE /assistant/sessions/{sid}/cached-analyses?issue_url=...`
    async fn delete_cached_analysis(
        &self,
        session: &SessionId,
        issue_url: &str,
    ) -> Result<(), ApiError>;
}
