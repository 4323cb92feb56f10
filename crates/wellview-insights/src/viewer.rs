//! On-demand report viewer
//!
//! Independent of the aggregator: opening a report never touches the slices.
//! The overlay shows the rendered HTML, or the fixed fallback message when
//! the fetch fails.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};
use wellview_core::{InsightsBackend, IsoDate, Result};
use wellview_observability::Metrics;

use crate::session::SessionContext;
use crate::view::{ReportContent, ViewState, ViewerState};

pub struct ReportViewer {
    backend: Arc<dyn InsightsBackend>,
    state: Arc<watch::Sender<ViewState>>,
    metrics: Option<Arc<Metrics>>,
    /// Bumped by every open and every close
    generation: AtomicU64,
}

impl ReportViewer {
    pub fn new(backend: Arc<dyn InsightsBackend>, state: Arc<watch::Sender<ViewState>>) -> Self {
        Self {
            backend,
            state,
            metrics: None,
            generation: AtomicU64::new(0),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Open the report starting on `week_start`.
    ///
    /// Always yields content: the fetched HTML, or [`ReportContent::Fallback`]
    /// on any failure. The overlay is only updated if no newer open or close
    /// happened while the fetch was in flight.
    #[instrument(skip(self, session))]
    pub async fn open_report(
        &self,
        session: &SessionContext,
        week_start: IsoDate,
    ) -> ReportContent {
        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.viewer = ViewerState::Loading {
                week_start: week_start.clone(),
            };
        });

        let content = match self.fetch_html(session, &week_start).await {
            Ok(html) => {
                debug!(bytes = html.len(), "Report HTML fetched");
                ReportContent::Html(html)
            }
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "Failed to load report; showing fallback");
                ReportContent::Fallback
            }
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_report_open(!content.is_fallback());
        }

        let shown = content.clone();
        let committed = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            state.viewer = ViewerState::Open {
                week_start,
                content: shown,
            };
            true
        });

        if committed {
            info!(fallback = content.is_fallback(), "Report opened");
        } else {
            debug!(generation, "Viewer moved on; discarding report content");
        }
        content
    }

    /// Hide the overlay and drop its content. Safe to call when closed.
    pub fn close_report(&self) {
        self.state.send_if_modified(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            if matches!(state.viewer, ViewerState::Closed) {
                return false;
            }
            state.viewer = ViewerState::Closed;
            true
        });
        debug!("Report viewer closed");
    }

    async fn fetch_html(&self, session: &SessionContext, week_start: &IsoDate) -> Result<String> {
        let identity = session.identity().await?;
        self.backend.weekly_report_html(&identity, week_start).await
    }
}
