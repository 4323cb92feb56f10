//! Backend and token-source trait definitions

use crate::{
    Error, Identity, IsoDate, ReportId, Result, TimeRange, UserId,
    model::{DashboardStats, ImprovementData, MoodDataPoint, MoodSummary, Report},
};

/// The insights API surface the client consumes.
///
/// Every authenticated method takes the per-call [`Identity`]; the
/// implementation is expected to send it as a bearer token plus the
/// caller-identity header.
#[async_trait::async_trait]
pub trait InsightsBackend: Send + Sync {
    /// Exchange a session token for the stable backend user id
    async fn sync_user(&self, session_token: &str) -> Result<UserId>;

    async fn dashboard_stats(&self, identity: &Identity) -> Result<DashboardStats>;

    /// Mood series for the range, ordered by date
    async fn mood_history(&self, identity: &Identity, range: TimeRange)
    -> Result<Vec<MoodDataPoint>>;

    async fn mood_summary(&self, identity: &Identity) -> Result<MoodSummary>;

    async fn improvement_tracker(&self, identity: &Identity) -> Result<ImprovementData>;

    /// Newest-first weekly reports, at most `limit`
    async fn weekly_reports(&self, identity: &Identity, limit: usize) -> Result<Vec<Report>>;

    /// Rendered HTML for the report starting on `week_start`
    async fn weekly_report_html(&self, identity: &Identity, week_start: &IsoDate)
    -> Result<String>;

    async fn delete_weekly_report(&self, identity: &Identity, report_id: &ReportId) -> Result<()>;
}

/// Source of the ambient session token.
///
/// Called once per outbound request; implementations may suspend (e.g. ask
/// an auth provider) and are free to return a different token each time.
#[async_trait::async_trait]
pub trait TokenSource: Send + Sync {
    async fn token(&self) -> Result<String>;
}

/// Token source backed by a fixed token (CLI, tests)
#[derive(Clone)]
pub struct StaticTokenSource {
    token: Option<String>,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// A source that has no session; every call fails with `Auth`
    pub fn signed_out() -> Self {
        Self { token: None }
    }
}

#[async_trait::async_trait]
impl TokenSource for StaticTokenSource {
    async fn token(&self) -> Result<String> {
        match &self.token {
            Some(token) if !token.trim().is_empty() => Ok(token.clone()),
            _ => Err(Error::Auth("No session token available".to_string())),
        }
    }
}
