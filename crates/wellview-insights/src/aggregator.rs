//! Fan-out/fan-in aggregation of the insight slices
//!
//! `load_all` issues the five slice fetches concurrently and commits each one
//! into the shared [`ViewState`] as it settles. `select_range` re-issues only
//! the mood pair. Every request carries a [`RequestTag`]; a result whose tag
//! no longer matches the current generation is dropped on arrival.
//!
//! Generation checks and state writes happen inside the same
//! `watch::Sender` closure, so a check can never race its commit.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};
use wellview_core::{
    Error, InsightsBackend, MAX_REPORT_LIMIT, Result, Slice, TimeRange,
    model::{DashboardStats, ImprovementData, MoodDataPoint, MoodSummary, Report, ReportList},
};
use wellview_observability::Metrics;

use crate::session::SessionContext;
use crate::view::{MoodSlice, Readiness, SliceState, ViewState};

/// Identifies the request a result belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTag {
    pub range: TimeRange,
    pub generation: u64,
}

/// Result of a range change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOutcome {
    /// The mood pair for this range is now displayed
    Applied,
    /// A newer request won; these results were discarded
    Superseded,
}

pub struct DataAggregator {
    backend: Arc<dyn InsightsBackend>,
    state: Arc<watch::Sender<ViewState>>,
    metrics: Option<Arc<Metrics>>,
    report_limit: usize,
    /// Bumped by every `load_all`
    load_generation: AtomicU64,
    /// Bumped by every `load_all` and every `select_range`
    mood_generation: AtomicU64,
}

impl DataAggregator {
    pub fn new(backend: Arc<dyn InsightsBackend>, state: Arc<watch::Sender<ViewState>>) -> Self {
        Self {
            backend,
            state,
            metrics: None,
            report_limit: MAX_REPORT_LIMIT,
            load_generation: AtomicU64::new(0),
            mood_generation: AtomicU64::new(0),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Number of reports to request; never more than [`MAX_REPORT_LIMIT`]
    pub fn with_report_limit(mut self, limit: usize) -> Self {
        self.report_limit = limit.min(MAX_REPORT_LIMIT);
        self
    }

    pub fn report_limit(&self) -> usize {
        self.report_limit
    }

    /// Fetch every slice for `range`, replacing the whole view.
    ///
    /// Returns once all five fetches have settled. Failed slices are
    /// `Unavailable` in the returned state; nothing else is aborted.
    #[instrument(skip(self, session))]
    pub async fn load_all(&self, session: &SessionContext, range: TimeRange) -> Result<ViewState> {
        let user_id = session.resolved_user_id().ok_or(Error::NotReady)?;

        let mut load_generation = 0;
        let mut mood_tag = RequestTag {
            range,
            generation: 0,
        };
        self.state.send_modify(|state| {
            load_generation = self.load_generation.fetch_add(1, Ordering::SeqCst) + 1;
            mood_tag.generation = self.mood_generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.user_id = Some(user_id);
            state.begin_full_load(range);
        });
        debug!(generation = load_generation, "Fetching all slices");

        let stats = async {
            let value = self
                .settle(Slice::DashboardStats, self.fetch_stats(session))
                .await;
            self.commit(Slice::DashboardStats, load_generation, |state| {
                state.stats = value
            });
        };

        let mood = async {
            let (series, summary) = tokio::join!(
                self.settle(Slice::MoodSeries, self.fetch_mood_series(session, range)),
                self.settle(Slice::MoodSummary, self.fetch_mood_summary(session)),
            );
            self.commit_mood(mood_tag, series, summary);
        };

        let improvement = async {
            let value = self
                .settle(Slice::ImprovementData, self.fetch_improvement(session))
                .await;
            self.commit(Slice::ImprovementData, load_generation, |state| {
                state.improvement = value
            });
        };

        let reports = async {
            let value = self.settle(Slice::Reports, self.fetch_reports(session)).await;
            self.commit(Slice::Reports, load_generation, |state| state.reports = value);
        };

        tokio::join!(stats, mood, improvement, reports);

        let current = self.state.send_if_modified(|state| {
            if self.load_generation.load(Ordering::SeqCst) != load_generation {
                return false;
            }
            state.readiness = Readiness::Ready;
            true
        });

        let snapshot = self.state.borrow().clone();
        if current {
            let unavailable = snapshot.unavailable_slices();
            if unavailable.is_empty() {
                info!("All slices settled");
            } else {
                info!(unavailable = ?unavailable, "All slices settled with failures");
            }
        } else {
            debug!(
                generation = load_generation,
                "Load superseded by a newer load; readiness left to it"
            );
        }

        Ok(snapshot)
    }

    /// Switch the mood slice to `range`.
    ///
    /// Only the mood series and summary are re-fetched; every other slice
    /// stays visible and readiness is not reset.
    #[instrument(skip(self, session))]
    pub async fn select_range(
        &self,
        session: &SessionContext,
        range: TimeRange,
    ) -> Result<RangeOutcome> {
        if !session.is_resolved() {
            return Err(Error::NotReady);
        }

        let mut tag = RequestTag {
            range,
            generation: 0,
        };
        self.state.send_modify(|state| {
            tag.generation = self.mood_generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.selected_range = range;
            state.mood = MoodSlice::loading(range);
        });
        debug!(generation = tag.generation, "Re-fetching mood slice");

        let (series, summary) = tokio::join!(
            self.settle(Slice::MoodSeries, self.fetch_mood_series(session, range)),
            self.settle(Slice::MoodSummary, self.fetch_mood_summary(session)),
        );

        if self.commit_mood(tag, series, summary) {
            Ok(RangeOutcome::Applied)
        } else {
            Ok(RangeOutcome::Superseded)
        }
    }

    async fn fetch_stats(&self, session: &SessionContext) -> Result<DashboardStats> {
        let identity = session.identity().await?;
        self.backend.dashboard_stats(&identity).await
    }

    async fn fetch_mood_series(
        &self,
        session: &SessionContext,
        range: TimeRange,
    ) -> Result<Vec<MoodDataPoint>> {
        let identity = session.identity().await?;
        let mut points = self.backend.mood_history(&identity, range).await?;
        points.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(points)
    }

    async fn fetch_mood_summary(&self, session: &SessionContext) -> Result<MoodSummary> {
        let identity = session.identity().await?;
        self.backend.mood_summary(&identity).await
    }

    async fn fetch_improvement(&self, session: &SessionContext) -> Result<ImprovementData> {
        let identity = session.identity().await?;
        self.backend.improvement_tracker(&identity).await
    }

    async fn fetch_reports(&self, session: &SessionContext) -> Result<Vec<Report>> {
        let identity = session.identity().await?;
        let reports = self
            .backend
            .weekly_reports(&identity, self.report_limit)
            .await?;
        Ok(ReportList { reports }.normalized(self.report_limit))
    }

    /// Await one fetch and turn its outcome into a slice state
    async fn settle<T>(
        &self,
        slice: Slice,
        fetch: impl Future<Output = Result<T>>,
    ) -> SliceState<T> {
        let started = Instant::now();
        let result = fetch.await;
        let elapsed = started.elapsed().as_secs_f64();

        if let Some(metrics) = &self.metrics {
            metrics.record_slice_fetch(slice.as_str(), result.is_ok(), elapsed);
        }

        match result {
            Ok(value) => {
                debug!(slice = %slice, elapsed_secs = elapsed, "Slice fetched");
                SliceState::Ready(value)
            }
            Err(e) => {
                warn!(
                    slice = %slice,
                    kind = e.kind(),
                    error = %e,
                    "Slice fetch failed; marking unavailable"
                );
                SliceState::Unavailable
            }
        }
    }

    /// Commit a range-independent slice if its load is still current
    fn commit(&self, slice: Slice, load_generation: u64, apply: impl FnOnce(&mut ViewState)) {
        let committed = self.state.send_if_modified(|state| {
            if self.load_generation.load(Ordering::SeqCst) != load_generation {
                return false;
            }
            apply(state);
            true
        });

        if !committed {
            self.discard(slice, load_generation);
        }
    }

    /// Commit the mood pair atomically if its tag still matches
    fn commit_mood(
        &self,
        tag: RequestTag,
        series: SliceState<Vec<MoodDataPoint>>,
        summary: SliceState<MoodSummary>,
    ) -> bool {
        let committed = self.state.send_if_modified(|state| {
            if self.mood_generation.load(Ordering::SeqCst) != tag.generation
                || state.selected_range != tag.range
            {
                return false;
            }
            state.mood = MoodSlice {
                range: tag.range,
                series,
                summary,
            };
            true
        });

        if committed {
            debug!(range = %tag.range, generation = tag.generation, "Mood slice committed");
        } else {
            self.discard(Slice::MoodSeries, tag.generation);
            self.discard(Slice::MoodSummary, tag.generation);
        }
        committed
    }

    fn discard(&self, slice: Slice, generation: u64) {
        warn!(slice = %slice, generation, "Discarding stale result");
        if let Some(metrics) = &self.metrics {
            metrics.record_stale_discard(slice.as_str());
        }
    }
}
