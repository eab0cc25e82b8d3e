//! Previously computed analyses for one session.
//!
//! The backend is the source of truth. `list` replaces the local collection
//! wholesale and `delete` strikes an entry only after the backend confirmed
//! the removal; nothing else mutates the collection.

mod issue_ref;

pub use issue_ref::{IssueDisplay, IssueRef, UNKNOWN_ISSUE, UNKNOWN_NUMBER, describe, format_age};

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::api::{ApiError, AssistantApi, CachedAnalysisItem, SessionId};
use crate::notify::Notifier;

#[derive(Debug, Default)]
struct StoreState {
    repository: Option<String>,
    items: Vec<CachedAnalysisItem>,
    loaded: bool,
}

#[derive(Clone)]
pub struct AnalysisStore {
    api: Arc<dyn AssistantApi>,
    notifier: Notifier,
    session: SessionId,
    state: Arc<Mutex<StoreState>>,
}

impl AnalysisStore {
    pub fn new(api: Arc<dyn AssistantApi>, notifier: Notifier, session: SessionId) -> Self {
        Self {
            api,
            notifier,
            session,
            state: Arc::new(Mutex::new(StoreState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// Replace the local collection with the backend's list. Overlapping
    /// calls race and the last response wins.
    pub async fn list(&self) -> Result<usize, ApiError> {
        debug!(session = %self.session, "listing cached analyses");
        match self.api.cached_analyses(&self.session).await {
            Ok(list) => {
                let items = dedupe_by_url(list.cached_analyses);
                let count = items.len();
                let mut st = self.state();
                st.items = items;
                st.repository = Some(list.repository).filter(|r| !r.is_empty());
                st.loaded = true;
                Ok(count)
            }
            Err(e) => {
                warn!(session = %self.session, error = %e, "listing cached analyses failed");
                self.notifier
                    .error(format!("Failed to load cached analyses: {e}"));
                Err(e)
            }
        }
    }

    /// Look up the entry for `issue_url` without changing anything.
    pub fn select(&self, issue_url: &str) -> Option<CachedAnalysisItem> {
        self.state()
            .items
            .iter()
            .find(|item| item.issue_url == issue_url)
            .cloned()
    }

    /// Remove the analysis for `issue_url` on the backend, then locally.
    /// Returns whether a local entry was struck; an absent key is not an
    /// error.
    pub async fn delete(&self, issue_url: &str) -> Result<bool, ApiError> {
        let label = IssueRef::parse(issue_url).map_or_else(|| issue_url.to_string(), |i| i.to_string());

        match self.api.delete_cached_analysis(&self.session, issue_url).await {
            Ok(()) => {
                let removed = {
                    let mut st = self.state();
                    let before = st.items.len();
                    st.items.retain(|item| item.issue_url != issue_url);
                    st.items.len() != before
                };
                info!(session = %self.session, issue = %label, removed, "deleted cached analysis");
                self.notifier
                    .success(format!("Deleted cached analysis for {label}"));
                Ok(removed)
            }
            Err(e) => {
                warn!(session = %self.session, issue = %label, error = %e, "delete failed");
                self.notifier
                    .error(format!("Failed to delete analysis for {label}: {e}"));
                Err(e)
            }
        }
    }

    /// Entries in backend order (most recent first).
    pub fn items(&self) -> Vec<CachedAnalysisItem> {
        self.state().items.clone()
    }

    pub fn repository(&self) -> Option<String> {
        self.state().repository.clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.state().loaded
    }

    pub fn len(&self) -> usize {
        self.state().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keep the first entry per issue URL, preserving order.
fn dedupe_by_url(items: Vec<CachedAnalysisItem>) -> Vec<CachedAnalysisItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.issue_url.clone()))
        .collect()
}
