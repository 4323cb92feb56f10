//! Insight data model
//!
//! One canonical wire schema: snake_case JSON as served by the engagement,
//! skin and reports APIs. Numbers the backend may omit are `Option`, so "no
//! data" stays distinguishable from a real zero.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{IsoDate, ReportId};

/// One independently fetchable, independently failable part of the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slice {
    DashboardStats,
    MoodSeries,
    MoodSummary,
    ImprovementData,
    Reports,
}

impl Slice {
    pub const ALL: [Slice; 5] = [
        Slice::DashboardStats,
        Slice::MoodSeries,
        Slice::MoodSummary,
        Slice::ImprovementData,
        Slice::Reports,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Slice::DashboardStats => "dashboard_stats",
            Slice::MoodSeries => "mood_series",
            Slice::MoodSummary => "mood_summary",
            Slice::ImprovementData => "improvement_data",
            Slice::Reports => "reports",
        }
    }

    /// Whether a time-range change re-fetches this slice
    pub fn is_range_dependent(&self) -> bool {
        matches!(self, Slice::MoodSeries | Slice::MoodSummary)
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Engagement dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreakStats {
    #[serde(default)]
    pub current_streak: Option<u32>,
    #[serde(default)]
    pub longest_streak: Option<u32>,
    #[serde(default)]
    pub last_check_in: Option<IsoDate>,
    #[serde(default)]
    pub total_check_ins: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecentActivity {
    #[serde(default)]
    pub images_this_week: Option<u32>,
    #[serde(default)]
    pub moods_this_week: Option<u32>,
    #[serde(default)]
    pub days_active: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuickStats {
    #[serde(default)]
    pub total_images: Option<u32>,
    #[serde(default)]
    pub total_mood_logs: Option<u32>,
    #[serde(default)]
    pub avg_mood_this_week: Option<f64>,
    #[serde(default)]
    pub days_tracked: Option<u32>,
}

/// `GET /engagement/dashboard`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub streak: StreakStats,
    #[serde(default)]
    pub recent_activity: RecentActivity,
    #[serde(default)]
    pub quick_stats: QuickStats,
    #[serde(default)]
    pub daily_insight: Option<String>,
}

// ---------------------------------------------------------------------------
// Mood
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodDataPoint {
    pub date: IsoDate,
    #[serde(default)]
    pub mood_score: Option<f64>,
    #[serde(default)]
    pub stress: Option<f64>,
    #[serde(default)]
    pub anxiety: Option<f64>,
    #[serde(default)]
    pub energy: Option<f64>,
}

/// `GET /engagement/mood/history?days=N`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoodHistory {
    #[serde(default)]
    pub total_logs: Option<u32>,
    #[serde(default)]
    pub days_covered: Option<u32>,
    #[serde(default)]
    pub mood_data: Vec<MoodDataPoint>,
}

impl MoodHistory {
    /// Data points ordered by date. The sort is stable, so same-day entries
    /// keep the backend's order.
    pub fn into_sorted_points(self) -> Vec<MoodDataPoint> {
        let mut points = self.mood_data;
        points.sort_by(|a, b| a.date.cmp(&b.date));
        points
    }
}

/// `GET /engagement/mood/summary`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoodSummary {
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub avg_mood: Option<f64>,
    #[serde(default)]
    pub avg_stress: Option<f64>,
    #[serde(default)]
    pub avg_anxiety: Option<f64>,
    #[serde(default)]
    pub avg_energy: Option<f64>,
    #[serde(default)]
    pub total_logs: Option<u32>,
    #[serde(default)]
    pub mood_trend: Option<String>,
}

// ---------------------------------------------------------------------------
// Skin improvement
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyImprovement {
    pub week_number: u32,
    #[serde(default)]
    pub trend: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub confidence_change: Option<f64>,
}

/// `GET /skin/improvement-tracker`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImprovementData {
    #[serde(default)]
    pub overall_improvement_percentage: Option<f64>,
    #[serde(default)]
    pub overall_trend: Option<String>,
    #[serde(default)]
    pub total_images: Option<u32>,
    #[serde(default)]
    pub weekly_improvements: Vec<WeeklyImprovement>,
}

// ---------------------------------------------------------------------------
// Weekly reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklyMetrics {
    #[serde(default)]
    pub average_severity: Option<f64>,
    #[serde(default)]
    pub average_confidence: Option<f64>,
    #[serde(default)]
    pub improvement_vs_last_week: Option<f64>,
    #[serde(default)]
    pub total_images_uploaded: Option<u32>,
    #[serde(default)]
    pub consistent_tracking: Option<bool>,
    #[serde(default)]
    pub days_tracked: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub report_id: ReportId,
    pub week_start: IsoDate,
    pub week_end: IsoDate,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub trend: Option<String>,
    #[serde(default)]
    pub generated_at: Option<String>,
    #[serde(default)]
    pub has_html: bool,
    #[serde(default)]
    pub metrics: WeeklyMetrics,
}

/// `GET /reports/weekly/list?limit=N`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportList {
    #[serde(default)]
    pub reports: Vec<Report>,
}

impl ReportList {
    /// Reports with duplicate ids removed (first occurrence wins) and the
    /// sequence cut to `limit`. Backend order (newest first) is preserved.
    pub fn normalized(self, limit: usize) -> Vec<Report> {
        let mut seen = std::collections::HashSet::new();
        self.reports
            .into_iter()
            .filter(|report| seen.insert(report.report_id))
            .take(limit)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// `POST /auth/sync-user`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncUserResponse {
    pub uuid: String,
    #[serde(default)]
    pub email: Option<String>,
}
