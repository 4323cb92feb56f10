//! The merged view model driving presentation
//!
//! `ViewState` is built from independently refreshable slices. Each slice is
//! a [`SliceState`]: presentation renders `Ready` data, skips `Unavailable`
//! sections and shows placeholders for `Idle`/`Loading`.

use serde::Serialize;
use wellview_core::{
    Error, IsoDate, ReportId, Slice, TimeRange, UserId,
    model::{DashboardStats, ImprovementData, MoodDataPoint, MoodSummary, Report},
};

/// Text shown in place of a report that could not be loaded
pub const REPORT_FALLBACK_MESSAGE: &str = "Unable to load this report. Please try again later.";

/// Placeholder for a value the backend did not provide
pub const ABSENT_PLACEHOLDER: &str = "—";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum SliceState<T> {
    /// Nothing requested yet
    Idle,
    Loading,
    Ready(T),
    /// The fetch failed; the section is hidden
    Unavailable,
}

impl<T> Default for SliceState<T> {
    fn default() -> Self {
        SliceState::Idle
    }
}

impl<T> SliceState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            SliceState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            SliceState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SliceState::Loading)
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, SliceState::Unavailable)
    }

    /// Settled means the fetch finished, whatever the outcome
    pub fn is_settled(&self) -> bool {
        matches!(self, SliceState::Ready(_) | SliceState::Unavailable)
    }

    pub fn phase(&self) -> SlicePhase {
        if self.is_settled() {
            SlicePhase::Ready
        } else {
            SlicePhase::Loading
        }
    }
}

/// Overall readiness of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    #[default]
    Unauthenticated,
    ResolvingIdentity,
    FetchingAll,
    Ready,
}

/// Independent loading substate of a single slice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlicePhase {
    Loading,
    Ready,
}

/// Mood series and summary, always committed together for one range
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MoodSlice {
    pub range: TimeRange,
    pub series: SliceState<Vec<MoodDataPoint>>,
    pub summary: SliceState<MoodSummary>,
}

impl MoodSlice {
    pub fn loading(range: TimeRange) -> Self {
        Self {
            range,
            series: SliceState::Loading,
            summary: SliceState::Loading,
        }
    }

    pub fn phase(&self) -> SlicePhase {
        match (self.series.phase(), self.summary.phase()) {
            (SlicePhase::Ready, SlicePhase::Ready) => SlicePhase::Ready,
            _ => SlicePhase::Loading,
        }
    }
}

/// Body of an open report overlay
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "html", rename_all = "snake_case")]
pub enum ReportContent {
    Html(String),
    Fallback,
}

impl ReportContent {
    pub fn body(&self) -> &str {
        match self {
            ReportContent::Html(html) => html,
            ReportContent::Fallback => REPORT_FALLBACK_MESSAGE,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ReportContent::Fallback)
    }
}

/// Report overlay state
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewerState {
    #[default]
    Closed,
    Loading {
        week_start: IsoDate,
    },
    Open {
        week_start: IsoDate,
        content: ReportContent,
    },
}

impl ViewerState {
    pub fn is_visible(&self) -> bool {
        !matches!(self, ViewerState::Closed)
    }

    pub fn content(&self) -> Option<&ReportContent> {
        match self {
            ViewerState::Open { content, .. } => Some(content),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ViewState {
    pub readiness: Readiness,
    /// Identity resolution failed; the view stays unresolved for the session
    pub identity_failed: bool,
    pub user_id: Option<UserId>,
    pub selected_range: TimeRange,
    pub stats: SliceState<DashboardStats>,
    pub mood: MoodSlice,
    pub improvement: SliceState<ImprovementData>,
    pub reports: SliceState<Vec<Report>>,
    pub viewer: ViewerState,
}

impl ViewState {
    pub fn reports_phase(&self) -> SlicePhase {
        self.reports.phase()
    }

    pub fn mood_phase(&self) -> SlicePhase {
        self.mood.phase()
    }

    /// Slices whose last fetch failed
    pub fn unavailable_slices(&self) -> Vec<Slice> {
        let mut failed = Vec::new();
        if self.stats.is_unavailable() {
            failed.push(Slice::DashboardStats);
        }
        if self.mood.series.is_unavailable() {
            failed.push(Slice::MoodSeries);
        }
        if self.mood.summary.is_unavailable() {
            failed.push(Slice::MoodSummary);
        }
        if self.improvement.is_unavailable() {
            failed.push(Slice::ImprovementData);
        }
        if self.reports.is_unavailable() {
            failed.push(Slice::Reports);
        }
        failed
    }

    /// `PartialDataFailure` if any slice is unavailable
    pub fn partial_failure(&self) -> Option<Error> {
        let failed = self.unavailable_slices();
        if failed.is_empty() {
            None
        } else {
            Some(Error::PartialDataFailure { failed })
        }
    }

    pub fn find_report(&self, report_id: &ReportId) -> Option<&Report> {
        self.reports
            .ready()
            .and_then(|reports| reports.iter().find(|r| &r.report_id == report_id))
    }

    /// Average mood this week as displayed on the quick-stats card
    pub fn avg_mood_label(&self) -> String {
        format_decimal(
            self.stats
                .ready()
                .and_then(|stats| stats.quick_stats.avg_mood_this_week),
        )
    }

    /// Mark every slice as loading for a full fetch at `range`
    pub(crate) fn begin_full_load(&mut self, range: TimeRange) {
        self.readiness = Readiness::FetchingAll;
        self.selected_range = range;
        self.stats = SliceState::Loading;
        self.mood = MoodSlice::loading(range);
        self.improvement = SliceState::Loading;
        self.reports = SliceState::Loading;
    }
}

/// One decimal place, or the placeholder when absent. A real zero renders
/// as `0.0`.
pub fn format_decimal(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}", v),
        None => ABSENT_PLACEHOLDER.to_string(),
    }
}

pub fn format_count(value: Option<u32>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => ABSENT_PLACEHOLDER.to_string(),
    }
}

/// Signed percentage, e.g. `+12.5%`
pub fn format_percentage(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:+.1}%", v),
        None => ABSENT_PLACEHOLDER.to_string(),
    }
}
