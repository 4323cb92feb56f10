//! Confirmed deletion of weekly reports

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument};
use wellview_core::{Error, InsightsBackend, IsoDate, ReportId, Result, model::Report};
use wellview_observability::Metrics;

use crate::session::SessionContext;
use crate::view::ViewState;

/// Asks the user before a destructive action
pub trait Confirmer: Send + Sync {
    fn confirm(&self, report: &Report) -> bool;
}

impl<F> Confirmer for F
where
    F: Fn(&Report) -> bool + Send + Sync,
{
    fn confirm(&self, report: &Report) -> bool {
        self(report)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The user declined; the backend was not contacted
    Cancelled,
}

impl DeleteOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            DeleteOutcome::Deleted => "deleted",
            DeleteOutcome::Cancelled => "cancelled",
        }
    }
}

/// Which part of a report row was clicked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportRowTarget {
    Row,
    DeleteButton,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    Open(IsoDate),
    Delete(ReportId),
}

/// Map a click on a report row to exactly one action.
///
/// The delete control sits inside the row; a click on it never also opens
/// the report.
pub fn resolve_row_click(report: &Report, target: ReportRowTarget) -> RowAction {
    match target {
        ReportRowTarget::DeleteButton => RowAction::Delete(report.report_id),
        ReportRowTarget::Row => RowAction::Open(report.week_start.clone()),
    }
}

pub struct ReportListMutator {
    backend: Arc<dyn InsightsBackend>,
    state: Arc<watch::Sender<ViewState>>,
    metrics: Option<Arc<Metrics>>,
}

impl ReportListMutator {
    pub fn new(backend: Arc<dyn InsightsBackend>, state: Arc<watch::Sender<ViewState>>) -> Self {
        Self {
            backend,
            state,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Delete a report from the loaded list after confirmation.
    ///
    /// The list changes only after the backend confirms the deletion, and
    /// then loses exactly the entry with `report_id`. Ids not in the list are
    /// rejected before the user is asked.
    #[instrument(skip(self, session, confirmer))]
    pub async fn delete_report(
        &self,
        session: &SessionContext,
        report_id: ReportId,
        confirmer: &dyn Confirmer,
    ) -> Result<DeleteOutcome> {
        let report = self
            .state
            .borrow()
            .find_report(&report_id)
            .cloned()
            .ok_or_else(|| {
                Error::InvalidInput(format!("Report {} is not in the loaded list", report_id))
            })?;

        if !confirmer.confirm(&report) {
            debug!("Deletion declined");
            self.record(DeleteOutcome::Cancelled.as_str());
            return Ok(DeleteOutcome::Cancelled);
        }

        if let Err(e) = self.send_delete(session, &report_id).await {
            error!(kind = e.kind(), error = %e, "Report deletion failed; list left unchanged");
            self.record("failed");
            return Err(Error::DestructiveActionFailure {
                report_id: report_id.to_string(),
                reason: e.to_string(),
            });
        }

        self.state.send_if_modified(|state| match state.reports.ready_mut() {
            Some(reports) => {
                let before = reports.len();
                reports.retain(|r| r.report_id != report_id);
                reports.len() != before
            }
            None => false,
        });

        info!(week_start = %report.week_start, "Report deleted");
        self.record(DeleteOutcome::Deleted.as_str());
        Ok(DeleteOutcome::Deleted)
    }

    async fn send_delete(&self, session: &SessionContext, report_id: &ReportId) -> Result<()> {
        let identity = session.identity().await?;
        self.backend.delete_weekly_report(&identity, report_id).await
    }

    fn record(&self, outcome: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.record_report_deletion(outcome);
        }
    }
}
