//! Session context: the gate in front of every fetch
//!
//! The backend user id is resolved once per session through
//! `POST /auth/sync-user` and never changes afterwards. Tokens are not
//! cached: every outbound call asks the token source again.

use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};
use wellview_core::{Error, Identity, InsightsBackend, Result, TokenSource, UserId};

pub struct SessionContext {
    token_source: Arc<dyn TokenSource>,
    /// Outcome of the single resolution attempt; a failure is kept as its message
    resolution: OnceCell<std::result::Result<UserId, String>>,
}

impl SessionContext {
    pub fn new(token_source: Arc<dyn TokenSource>) -> Self {
        Self {
            token_source,
            resolution: OnceCell::new(),
        }
    }

    /// Current session token, fetched fresh for this call
    pub async fn get_token(&self) -> Result<String> {
        self.token_source.token().await
    }

    /// Resolve the backend user id.
    ///
    /// Only the first call contacts the backend; concurrent callers wait for
    /// it. A failed resolution is permanent for this context and later calls
    /// return `NotReady` without another request.
    pub async fn resolve(&self, backend: &dyn InsightsBackend) -> Result<UserId> {
        let mut attempted_here = false;
        let token_source = &self.token_source;
        let outcome = self
            .resolution
            .get_or_init(|| {
                attempted_here = true;
                async move {
                    debug!("Resolving backend identity");
                    let result = match token_source.token().await {
                        Ok(token) => backend.sync_user(&token).await,
                        Err(e) => Err(e),
                    };
                    match result {
                        Ok(user_id) => {
                            info!(user_id = %user_id, "Backend identity resolved");
                            Ok(user_id)
                        }
                        Err(e) => {
                            error!(error = %e, kind = e.kind(), "Identity resolution failed");
                            Err(e.to_string())
                        }
                    }
                }
            })
            .await;

        match outcome {
            Ok(user_id) => Ok(*user_id),
            Err(message) if attempted_here => Err(Error::Auth(message.clone())),
            Err(_) => {
                warn!("Identity resolution failed earlier in this session; not retrying");
                Err(Error::NotReady)
            }
        }
    }

    /// The resolved user id, if resolution has succeeded
    pub fn resolved_user_id(&self) -> Option<UserId> {
        match self.resolution.get() {
            Some(Ok(user_id)) => Some(*user_id),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved_user_id().is_some()
    }

    /// Whether resolution was attempted and failed
    pub fn has_failed(&self) -> bool {
        matches!(self.resolution.get(), Some(Err(_)))
    }

    /// Credentials for one outbound call.
    ///
    /// `NotReady` until the user id is resolved; a token failure surfaces as
    /// the token source's error and affects only this call.
    pub async fn identity(&self) -> Result<Identity> {
        let user_id = self.resolved_user_id().ok_or(Error::NotReady)?;
        let token = self.get_token().await?;
        Ok(Identity::new(token, user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wellview_core::{
        IsoDate, ReportId, StaticTokenSource, TimeRange,
        model::{DashboardStats, ImprovementData, MoodDataPoint, MoodSummary, Report},
    };

    const USER_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

    /// Backend that only knows how to sync users
    struct SyncOnlyBackend {
        calls: AtomicUsize,
        fail: bool,
    }

    impl SyncOnlyBackend {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait::async_trait]
    impl InsightsBackend for SyncOnlyBackend {
        async fn sync_user(&self, session_token: &str) -> Result<UserId> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(session_token, "tok");
            if self.fail {
                Err(Error::Network("connection reset".to_string()))
            } else {
                UserId::from_string(USER_ID)
            }
        }

        async fn dashboard_stats(&self, _: &Identity) -> Result<DashboardStats> {
            unreachable!()
        }

        async fn mood_history(&self, _: &Identity, _: TimeRange) -> Result<Vec<MoodDataPoint>> {
            unreachable!()
        }

        async fn mood_summary(&self, _: &Identity) -> Result<MoodSummary> {
            unreachable!()
        }

        async fn improvement_tracker(&self, _: &Identity) -> Result<ImprovementData> {
            unreachable!()
        }

        async fn weekly_reports(&self, _: &Identity, _: usize) -> Result<Vec<Report>> {
            unreachable!()
        }

        async fn weekly_report_html(&self, _: &Identity, _: &IsoDate) -> Result<String> {
            unreachable!()
        }

        async fn delete_weekly_report(&self, _: &Identity, _: &ReportId) -> Result<()> {
            unreachable!()
        }
    }

    fn session() -> SessionContext {
        SessionContext::new(Arc::new(StaticTokenSource::new("tok")))
    }

    #[tokio::test]
    async fn test_identity_not_ready_before_resolution() {
        let session = session();
        assert!(session.resolved_user_id().is_none());
        assert!(matches!(session.identity().await, Err(Error::NotReady)));
    }

    #[tokio::test]
    async fn test_resolve_once_and_reuse() {
        let session = session();
        let backend = SyncOnlyBackend::new(false);

        let first = session.resolve(&backend).await.unwrap();
        let second = session.resolve(&backend).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);

        let identity = session.identity().await.unwrap();
        assert_eq!(identity.backend_user_id.to_string(), USER_ID);
        assert_eq!(identity.session_token, "tok");
    }

    #[tokio::test]
    async fn test_failed_resolution_is_permanent() {
        let session = session();
        let backend = SyncOnlyBackend::new(true);

        assert!(matches!(session.resolve(&backend).await, Err(Error::Auth(_))));
        assert!(matches!(session.resolve(&backend).await, Err(Error::NotReady)));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert!(session.has_failed());
        assert!(matches!(session.identity().await, Err(Error::NotReady)));
    }

    #[tokio::test]
    async fn test_signed_out_session_never_calls_backend() {
        let session = SessionContext::new(Arc::new(StaticTokenSource::signed_out()));
        let backend = SyncOnlyBackend::new(false);

        assert!(session.resolve(&backend).await.is_err());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
        assert!(!session.is_resolved());
    }
}
