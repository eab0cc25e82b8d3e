use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a backend assistant session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        SessionId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        SessionId::new(id)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        SessionId(id)
    }
}

// ── Agentic status ───────────────────────────────────────────────────

/// Agentic-mode state of a session as reported by the backend.
///
/// Construction normalizes the backend's flags so that `initialized`
/// implies `enabled`, and tools are only listed once initialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "AgenticStatusWire")]
pub struct AgenticStatus {
    enabled: bool,
    initialized: bool,
    available_tools: Vec<String>,
}

impl AgenticStatus {
    pub fn new(enabled: bool, initialized: bool, available_tools: Vec<String>) -> Self {
        let initialized = enabled && initialized;
        AgenticStatus {
            enabled,
            initialized,
            available_tools: if initialized {
                available_tools
            } else {
                Vec::new()
            },
        }
    }

    pub fn disabled() -> Self {
        AgenticStatus::default()
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn initialized(&self) -> bool {
        self.initialized
    }

    pub fn available_tools(&self) -> &[String] {
        &self.available_tools
    }
}

/// Shape returned by `agentic-status` and `enable-agentic`.
#[derive(Debug, Deserialize)]
struct AgenticStatusWire {
    #[serde(default)]
    agentic_enabled: bool,
    #[serde(default)]
    explorer_initialized: bool,
    #[serde(default)]
    tools_available: Option<Vec<String>>,
}

impl From<AgenticStatusWire> for AgenticStatus {
    fn from(wire: AgenticStatusWire) -> Self {
        AgenticStatus::new(
            wire.agentic_enabled,
            wire.explorer_initialized,
            wire.tools_available.unwrap_or_default(),
        )
    }
}

// ── Cached analyses ──────────────────────────────────────────────────

/// Outcome of a cached analysis. The backend may add states over time;
/// anything unrecognized is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnalysisStatus {
    Completed,
    Failed,
    Other(String),
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AnalysisStatus::Completed => "completed",
            AnalysisStatus::Failed => "failed",
            AnalysisStatus::Other(s) => s,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            AnalysisStatus::Completed => "✓",
            AnalysisStatus::Failed => "✗",
            AnalysisStatus::Other(_) => "•",
        }
    }
}

impl From<String> for AnalysisStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "completed" => AnalysisStatus::Completed,
            "failed" => AnalysisStatus::Failed,
            _ => AnalysisStatus::Other(s),
        }
    }
}

impl From<AnalysisStatus> for String {
    fn from(status: AnalysisStatus) -> Self {
        match status {
            AnalysisStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

/// A previously computed triage result, keyed by its issue URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedAnalysisItem {
    pub issue_url: String,
    /// Unix seconds.
    pub cached_at: i64,
    pub status: AnalysisStatus,
    #[serde(default)]
    pub issue_title: Option<String>,
    #[serde(default)]
    pub issue_number: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CachedAnalysisList {
    #[serde(default)]
    pub repository: String,
    #[serde(default)]
    pub cached_analyses: Vec<CachedAnalysisItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialized_never_outlives_enabled() {
        let status = AgenticStatus::new(false, true, vec!["list_files".into()]);
        assert!(!status.enabled());
        assert!(!status.initialized());
        assert!(status.available_tools().is_empty());
    }

    #[test]
    fn tools_hidden_until_initialized() {
        let status = AgenticStatus::new(true, false, vec!["list_files".into()]);
        assert!(status.enabled());
        assert!(status.available_tools().is_empty());

        let ready = AgenticStatus::new(true, true, vec!["list_files".into()]);
        assert_eq!(ready.available_tools(), ["list_files"]);
    }

    #[test]
    fn deserializes_backend_status_shape() {
        let json = r#"{
            "agentic_enabled": true,
            "explorer_initialized": true,
            "tools_available": ["list_files", "read_file"]
        }"#;
        let status: AgenticStatus = serde_json::from_str(json).unwrap();
        assert!(status.initialized());
        assert_eq!(status.available_tools().len(), 2);
    }

    #[test]
    fn deserialization_normalizes_inconsistent_flags() {
        let json = r#"{"agentic_enabled": false, "explorer_initialized": true, "tools_available": null}"#;
        let status: AgenticStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status, AgenticStatus::disabled());
    }

    #[test]
    fn analysis_status_keeps_unknown_values() {
        let item: CachedAnalysisItem = serde_json::from_str(
            r#"{"issue_url": "https://github.com/o/r/issues/1", "cached_at": 1700000000, "status": "partial"}"#,
        )
        .unwrap();
        assert_eq!(item.status, AnalysisStatus::Other("partial".into()));
        assert_eq!(item.status.as_str(), "partial");
        assert!(item.issue_title.is_none());

        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["status"], "partial");
    }

    #[test]
    fn analysis_status_known_values() {
        assert_eq!(
            AnalysisStatus::from("completed".to_string()),
            AnalysisStatus::Completed
        );
        assert_eq!(
            AnalysisStatus::from("failed".to_string()),
            AnalysisStatus::Failed
        );
        assert_eq!(String::from(AnalysisStatus::Completed), "completed");
    }

    #[test]
    fn cached_list_tolerates_missing_fields() {
        let list: CachedAnalysisList = serde_json::from_str("{}").unwrap();
        assert!(list.repository.is_empty());
        assert!(list.cached_analyses.is_empty());
    }

    #[test]
    fn session_id_display() {
        let id = SessionId::from("abc-123");
        assert_eq!(id.to_string(), "abc-123");
        assert_eq!(id.as_str(), "abc-123");
    }
}
