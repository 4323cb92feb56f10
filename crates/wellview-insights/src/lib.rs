//! WellView Insights
//!
//! This crate merges the independently fetched insight resources into one
//! view model:
//! - Session identity resolution gating all fetches
//! - Concurrent slice aggregation with last-request-wins range switching
//! - On-demand report viewer
//! - Confirmed report deletion
//! - Dashboard facade publishing the view over a `watch` channel

pub mod aggregator;
pub mod dashboard;
pub mod mutator;
pub mod session;
pub mod view;
pub mod viewer;

// Re-export commonly used types
pub use aggregator::{DataAggregator, RangeOutcome, RequestTag};
pub use dashboard::{InsightsDashboard, RowOutcome};
pub use mutator::{
    Confirmer, DeleteOutcome, ReportListMutator, ReportRowTarget, RowAction, resolve_row_click,
};
pub use session::SessionContext;
pub use view::{
    MoodSlice, Readiness, ReportContent, SlicePhase, SliceState, ViewState, ViewerState,
    format_count, format_decimal, format_percentage,
};
pub use viewer::ReportViewer;
