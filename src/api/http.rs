use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;

use super::{AgenticStatus, ApiError, AssistantApi, CachedAnalysisList, SessionId};

/// [`AssistantApi`] over HTTP/JSON.
pub struct HttpAssistantApi {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpAssistantApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let base_url = Url::parse(trimmed).map_err(|e| ApiError::InvalidUrl {
            url: trimmed.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl {
                url: trimmed.to_string(),
                reason: "not a base url".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ApiError::Transport {
                path: base_url.to_string(),
                source,
            })?;

        Ok(Self { base_url, client })
    }

    /// `{base}/assistant/sessions/{sid}/{tail..}` with every segment
    /// percent-encoded.
    fn session_url(&self, session: &SessionId, tail: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "not a base url".to_string(),
            })?
            .pop_if_empty()
            .extend(["assistant", "sessions", session.as_str()])
            .extend(tail);
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        query: Option<(&str, &str)>,
    ) -> Result<reqwest::Response, ApiError> {
        let path = url.path().to_string();
        tracing::debug!(%method, %path, "backend request");

        let mut request = self.client.request(method, url);
        if let Some(pair) = query {
            request = request.query(&[pair]);
        }

        let response = request
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                path: path.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(ApiError::Status {
                path,
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }

    async fn json<T: DeserializeOwned>(
        &self,
        method: Method,
        session: &SessionId,
        tail: &[&str],
    ) -> Result<T, ApiError> {
        let url = self.session_url(session, tail)?;
        let path = url.path().to_string();
        self.send(method, url, None)
            .await?
            .json::<T>()
            .await
            .map_err(|source| ApiError::Transport { path, source })
    }
}

#[async_trait]
impl AssistantApi for HttpAssistantApi {
    async fn agentic_status(&self, session: &SessionId) -> Result<AgenticStatus, ApiError> {
        self.json(Method::GET, session, &["agentic-status"]).await
    }

    async fn enable_agentic(&self, session: &SessionId) -> Result<AgenticStatus, ApiError> {
        self.json(Method::POST, session, &["enable-agentic"]).await
    }

    async fn reset_agentic_memory(&self, session: &SessionId) -> Result<(), ApiError> {
        let url = self.session_url(session, &["reset-agentic-memory"])?;
        self.send(Method::POST, url, None).await.map(|_| ())
    }

    async fn cached_analyses(&self, session: &SessionId) -> Result<CachedAnalysisList, ApiError> {
        self.json(Method::GET, session, &["cached-analyses"]).await
    }

    async fn delete_cached_analysis(
        &self,
        session: &SessionId,
        issue_url: &str,
    ) -> Result<(), ApiError> {
        let url = self.session_url(session, &["cached-analyses"])?;
        self.send(Method::DELETE, url, Some(("issue_url", issue_url)))
            .await
            .map(|_| ())
    }
}
