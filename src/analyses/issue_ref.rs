use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::api::CachedAnalysisItem;

static ISSUE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|/)([^/?#\s]+)/([^/?#\s]+)/issues/(\d+)/?(?:[?#].*)?$")
        .expect("issue URL regex is valid")
});

pub const UNKNOWN_ISSUE: &str = "Unknown Issue";
pub const UNKNOWN_NUMBER: &str = "?";

/// `owner/repo#number` decomposed from an issue URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl IssueRef {
    /// Parse `.../<owner>/<repo>/issues/<number>`. Anything else is `None`.
    pub fn parse(url: &str) -> Option<Self> {
        let caps = ISSUE_URL_RE.captures(url.trim())?;
        Some(IssueRef {
            owner: caps[1].to_string(),
            repo: caps[2].to_string(),
            number: caps[3].parse().ok()?,
        })
    }
}

impl fmt::Display for IssueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// Display strings for one cached analysis row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueDisplay {
    /// `owner/repo#N`, or the title / "Unknown Issue" when the URL is not an
    /// issue URL.
    pub label: String,
    /// `#N` or "?".
    pub number: String,
    pub title: Option<String>,
}

pub fn describe(issue_url: &str, title: Option<&str>, number: Option<u64>) -> IssueDisplay {
    let title = title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    match IssueRef::parse(issue_url) {
        Some(issue) => IssueDisplay {
            label: issue.to_string(),
            number: format!("#{}", issue.number),
            title,
        },
        None => IssueDisplay {
            label: title.clone().unwrap_or_else(|| UNKNOWN_ISSUE.to_string()),
            number: number.map_or_else(|| UNKNOWN_NUMBER.to_string(), |n| format!("#{n}")),
            title,
        },
    }
}

impl CachedAnalysisItem {
    pub fn display(&self) -> IssueDisplay {
        describe(
            &self.issue_url,
            self.issue_title.as_deref(),
            self.issue_number,
        )
    }
}

/// Coarse age of a cache entry: `just now`, `5m ago`, `3h ago`, `2d ago`.
pub fn format_age(cached_at: i64, now: DateTime<Utc>) -> String {
    let secs = now.timestamp().saturating_sub(cached_at).max(0);
    if secs < 60 {
        "just now".to_string()
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else if secs < 86_400 {
        format!("{}h ago", secs / 3600)
    } else {
        format!("{}d ago", secs / 86_400)
    }
}
