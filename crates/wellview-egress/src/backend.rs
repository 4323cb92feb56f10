//! Wellness backend connector

use crate::{
    EgressError, Result,
    client::{HttpClientConfig, create_client},
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use wellview_core::{
    Identity, InsightsBackend, IsoDate, MAX_REPORT_LIMIT, ReportId, TimeRange, UserId,
    model::{
        DashboardStats, ImprovementData, MoodDataPoint, MoodHistory, MoodSummary, Report,
        ReportList, SyncUserResponse,
    },
};

/// Default caller-identity header expected by the backend
pub const DEFAULT_USER_ID_HEADER: &str = "X-User-Id";

/// Backend connector configuration
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the API, without trailing slash
    pub base_url: String,

    /// Header carrying the backend user id
    pub user_id_header: String,

    /// HTTP client configuration
    pub client_config: HttpClientConfig,
}

impl BackendConfig {
    /// Create a new backend configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_id_header: DEFAULT_USER_ID_HEADER.to_string(),
            client_config: HttpClientConfig::default(),
        }
    }

    /// Override the caller-identity header name
    pub fn with_user_id_header(mut self, header: impl Into<String>) -> Self {
        self.user_id_header = header.into();
        self
    }

    /// Set the HTTP client configuration
    pub fn with_client_config(mut self, client_config: HttpClientConfig) -> Self {
        self.client_config = client_config;
        self
    }
}

/// Backend connector
pub struct BackendClient {
    config: BackendConfig,
    client: Client,
}

impl BackendClient {
    /// Create a new backend connector
    pub fn new(config: BackendConfig) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(EgressError::ConfigError("base_url must not be empty".to_string()));
        }
        let client = create_client(&config.client_config)?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn url_with_query(&self, path: &str, query: &[(&str, String)]) -> Result<String> {
        let encoded = serde_urlencoded::to_string(query)
            .map_err(|e| EgressError::ConfigError(format!("Failed to encode query: {}", e)))?;
        Ok(format!("{}?{}", self.url(path), encoded))
    }

    fn authorized(&self, builder: RequestBuilder, identity: &Identity) -> RequestBuilder {
        builder
            .header("Authorization", identity.bearer())
            .header(
                self.config.user_id_header.as_str(),
                identity.backend_user_id.to_string(),
            )
    }

    async fn get_json<T: DeserializeOwned>(&self, identity: &Identity, url: String) -> Result<T> {
        debug!(url = %url, "GET");
        let response = self
            .authorized(self.client.get(&url), identity)
            .send()
            .await?;
        let response = check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| EgressError::ParseError(format!("{}: {}", url, e)))
    }
}

/// Turn non-2xx responses into errors, keeping the body as the message
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    debug!(status = %status, "Backend response");
    if status.is_success() {
        return Ok(response);
    }

    let status_code = status.as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error body".to_string());

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => EgressError::Unauthorized {
            status_code,
            message,
        },
        _ => EgressError::BackendError {
            status_code,
            message,
        },
    })
}

#[async_trait]
impl InsightsBackend for BackendClient {
    #[instrument(skip(self, session_token))]
    async fn sync_user(&self, session_token: &str) -> wellview_core::Result<UserId> {
        let url = self.url("/auth/sync-user");
        debug!(url = %url, "POST");
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", session_token))
            .send()
            .await
            .map_err(EgressError::from)?;
        let response = check_status(response).await?;
        let body: SyncUserResponse = response
            .json()
            .await
            .map_err(|e| EgressError::ParseError(format!("sync-user: {}", e)))?;
        UserId::from_string(&body.uuid)
    }

    #[instrument(skip(self, identity), fields(user_id = %identity.backend_user_id))]
    async fn dashboard_stats(&self, identity: &Identity) -> wellview_core::Result<DashboardStats> {
        Ok(self
            .get_json(identity, self.url("/engagement/dashboard"))
            .await?)
    }

    #[instrument(
        skip(self, identity),
        fields(user_id = %identity.backend_user_id, days = range.days())
    )]
    async fn mood_history(
        &self,
        identity: &Identity,
        range: TimeRange,
    ) -> wellview_core::Result<Vec<MoodDataPoint>> {
        let url = self.url_with_query(
            "/engagement/mood/history",
            &[("days", range.days().to_string())],
        )?;
        let history: MoodHistory = self.get_json(identity, url).await?;
        Ok(history.into_sorted_points())
    }

    #[instrument(skip(self, identity), fields(user_id = %identity.backend_user_id))]
    async fn mood_summary(&self, identity: &Identity) -> wellview_core::Result<MoodSummary> {
        Ok(self
            .get_json(identity, self.url("/engagement/mood/summary"))
            .await?)
    }

    #[instrument(skip(self, identity), fields(user_id = %identity.backend_user_id))]
    async fn improvement_tracker(
        &self,
        identity: &Identity,
    ) -> wellview_core::Result<ImprovementData> {
        Ok(self
            .get_json(identity, self.url("/skin/improvement-tracker"))
            .await?)
    }

    #[instrument(skip(self, identity), fields(user_id = %identity.backend_user_id))]
    async fn weekly_reports(
        &self,
        identity: &Identity,
        limit: usize,
    ) -> wellview_core::Result<Vec<Report>> {
        let limit = limit.min(MAX_REPORT_LIMIT);
        let url = self.url_with_query("/reports/weekly/list", &[("limit", limit.to_string())])?;
        let list: ReportList = self.get_json(identity, url).await?;
        Ok(list.normalized(limit))
    }

    #[instrument(
        skip(self, identity),
        fields(user_id = %identity.backend_user_id, week_start = %week_start)
    )]
    async fn weekly_report_html(
        &self,
        identity: &Identity,
        week_start: &IsoDate,
    ) -> wellview_core::Result<String> {
        let url = self.url_with_query(
            "/reports/weekly/html",
            &[("week_start", week_start.to_string())],
        )?;
        debug!(url = %url, "GET");
        let response = self
            .authorized(self.client.get(&url), identity)
            .send()
            .await
            .map_err(EgressError::from)?;
        let response = check_status(response).await?;
        Ok(response.text().await.map_err(EgressError::from)?)
    }

    #[instrument(
        skip(self, identity),
        fields(user_id = %identity.backend_user_id, report_id = %report_id)
    )]
    async fn delete_weekly_report(
        &self,
        identity: &Identity,
        report_id: &ReportId,
    ) -> wellview_core::Result<()> {
        let url = self.url(&format!("/reports/weekly/{}", report_id));
        debug!(url = %url, "DELETE");
        let response = self
            .authorized(self.client.delete(&url), identity)
            .send()
            .await
            .map_err(EgressError::from)?;
        check_status(response).await?;
        Ok(())
    }
}
