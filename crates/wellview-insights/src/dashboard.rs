//! Insights dashboard facade
//!
//! Wires the session, aggregator, viewer and mutator around one shared
//! `watch` channel of [`ViewState`]. Presentation subscribes to the channel
//! and relays user intents through the methods here.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};
use wellview_core::{
    Error, InsightsBackend, IsoDate, ReportId, Result, TimeRange, TokenSource, UserId,
};
use wellview_observability::Metrics;

use crate::aggregator::{DataAggregator, RangeOutcome};
use crate::mutator::{
    Confirmer, DeleteOutcome, ReportListMutator, ReportRowTarget, RowAction, resolve_row_click,
};
use crate::session::SessionContext;
use crate::view::{Readiness, ReportContent, ViewState};
use crate::viewer::ReportViewer;

/// What a report row click ended up doing
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Opened(ReportContent),
    Delete(DeleteOutcome),
}

pub struct InsightsDashboard {
    backend: Arc<dyn InsightsBackend>,
    session: SessionContext,
    state: Arc<watch::Sender<ViewState>>,
    aggregator: DataAggregator,
    viewer: ReportViewer,
    mutator: ReportListMutator,
}

impl InsightsDashboard {
    pub fn new(backend: Arc<dyn InsightsBackend>, token_source: Arc<dyn TokenSource>) -> Self {
        let (tx, _rx) = watch::channel(ViewState::default());
        let state = Arc::new(tx);

        Self {
            aggregator: DataAggregator::new(backend.clone(), state.clone()),
            viewer: ReportViewer::new(backend.clone(), state.clone()),
            mutator: ReportListMutator::new(backend.clone(), state.clone()),
            session: SessionContext::new(token_source),
            backend,
            state,
        }
    }

    pub fn with_metrics(self, metrics: Arc<Metrics>) -> Self {
        Self {
            aggregator: self.aggregator.with_metrics(metrics.clone()),
            viewer: self.viewer.with_metrics(metrics.clone()),
            mutator: self.mutator.with_metrics(metrics),
            ..self
        }
    }

    pub fn with_report_limit(self, limit: usize) -> Self {
        Self {
            aggregator: self.aggregator.with_report_limit(limit),
            ..self
        }
    }

    /// Resolve identity, then fetch everything at `range`
    pub async fn start(&self, range: TimeRange) -> Result<ViewState> {
        self.resolve_identity().await?;
        self.aggregator.load_all(&self.session, range).await
    }

    /// Resolve the backend user id, publishing readiness transitions.
    ///
    /// Without a session token the view stays `Unauthenticated` and nothing
    /// is consumed, so a later call can still succeed. Once the sync call
    /// itself has failed the view stays in `ResolvingIdentity` for good.
    pub async fn resolve_identity(&self) -> Result<UserId> {
        if let Some(user_id) = self.session.resolved_user_id() {
            return Ok(user_id);
        }
        if self.session.has_failed() {
            return Err(Error::NotReady);
        }
        if let Err(e) = self.session.get_token().await {
            debug!(error = %e, "No session token; staying unauthenticated");
            return Err(e);
        }

        self.state.send_if_modified(|state| {
            if state.readiness != Readiness::Unauthenticated {
                return false;
            }
            state.readiness = Readiness::ResolvingIdentity;
            true
        });

        match self.session.resolve(self.backend.as_ref()).await {
            Ok(user_id) => {
                self.state.send_modify(|state| state.user_id = Some(user_id));
                Ok(user_id)
            }
            Err(e) => {
                self.state.send_modify(|state| state.identity_failed = true);
                Err(e)
            }
        }
    }

    pub async fn load_all(&self, range: TimeRange) -> Result<ViewState> {
        self.aggregator.load_all(&self.session, range).await
    }

    pub async fn select_range(&self, range: TimeRange) -> Result<RangeOutcome> {
        self.aggregator.select_range(&self.session, range).await
    }

    pub async fn open_report(&self, week_start: IsoDate) -> ReportContent {
        self.viewer.open_report(&self.session, week_start).await
    }

    pub fn close_report(&self) {
        self.viewer.close_report();
    }

    pub async fn delete_report(
        &self,
        report_id: ReportId,
        confirmer: &dyn Confirmer,
    ) -> Result<DeleteOutcome> {
        self.mutator
            .delete_report(&self.session, report_id, confirmer)
            .await
    }

    /// Dispatch a click on a report row
    pub async fn handle_row_click(
        &self,
        report_id: ReportId,
        target: ReportRowTarget,
        confirmer: &dyn Confirmer,
    ) -> Result<RowOutcome> {
        let report = self
            .state
            .borrow()
            .find_report(&report_id)
            .cloned()
            .ok_or_else(|| {
                Error::InvalidInput(format!("Report {} is not in the loaded list", report_id))
            })?;

        match resolve_row_click(&report, target) {
            RowAction::Open(week_start) => {
                info!(week_start = %week_start, "Opening report from row");
                Ok(RowOutcome::Opened(self.open_report(week_start).await))
            }
            RowAction::Delete(report_id) => {
                let outcome = self.delete_report(report_id, confirmer).await?;
                Ok(RowOutcome::Delete(outcome))
            }
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }
}
