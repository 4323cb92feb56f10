//! Plain-text rendering of the dashboard view
//!
//! Unavailable sections are omitted; sections still loading show a
//! placeholder line.

use std::fmt::Write;
use wellview_core::model::{DashboardStats, ImprovementData, MoodDataPoint, MoodSummary, Report};
use wellview_insights::{
    MoodSlice, SliceState, ViewState, format_count, format_decimal, format_percentage,
};

const LOADING: &str = "  loading...";

pub fn render_dashboard(state: &ViewState) -> String {
    let mut out = String::new();

    if let Some(stats) = section(&mut out, "Overview", &state.stats) {
        render_stats(&mut out, stats);
    }
    render_mood(&mut out, &state.mood);
    if let Some(improvement) = section(&mut out, "Skin improvement", &state.improvement) {
        render_improvement(&mut out, improvement);
    }
    if let Some(reports) = section(&mut out, "Weekly reports", &state.reports) {
        render_reports(&mut out, reports);
    }

    out
}

/// Write the heading and hand back the data if the slice is ready
fn section<'a, T>(out: &mut String, title: &str, slice: &'a SliceState<T>) -> Option<&'a T> {
    match slice {
        SliceState::Unavailable => None,
        SliceState::Ready(value) => {
            let _ = writeln!(out, "\n{}", title);
            Some(value)
        }
        SliceState::Idle | SliceState::Loading => {
            let _ = writeln!(out, "\n{}\n{}", title, LOADING);
            None
        }
    }
}

fn render_stats(out: &mut String, stats: &DashboardStats) {
    let streak = &stats.streak;
    let quick = &stats.quick_stats;
    let activity = &stats.recent_activity;

    let _ = writeln!(
        out,
        "  Streak: {} days (longest {})",
        format_count(streak.current_streak),
        format_count(streak.longest_streak)
    );
    let _ = writeln!(out, "  Avg mood this week: {}", format_decimal(quick.avg_mood_this_week));
    let _ = writeln!(
        out,
        "  Images: {}  Mood logs: {}  Days tracked: {}",
        format_count(quick.total_images),
        format_count(quick.total_mood_logs),
        format_count(quick.days_tracked)
    );
    let _ = writeln!(
        out,
        "  This week: {} images, {} moods, {} active days",
        format_count(activity.images_this_week),
        format_count(activity.moods_this_week),
        format_count(activity.days_active)
    );
    if let Some(insight) = &stats.daily_insight {
        let _ = writeln!(out, "  Insight: {}", insight);
    }
}

fn render_mood(out: &mut String, mood: &MoodSlice) {
    let title = format!("Mood ({})", mood.range.label());
    match (&mood.series, &mood.summary) {
        (SliceState::Unavailable, SliceState::Unavailable) => {}
        (series, summary) if !series.is_settled() || !summary.is_settled() => {
            let _ = writeln!(out, "\n{}\n{}", title, LOADING);
        }
        (series, summary) => {
            let _ = writeln!(out, "\n{}", title);
            if let Some(summary) = summary.ready() {
                render_mood_summary(out, summary);
            }
            if let Some(points) = series.ready() {
                render_mood_series(out, points);
            }
        }
    }
}

fn render_mood_summary(out: &mut String, summary: &MoodSummary) {
    let _ = writeln!(
        out,
        "  Avg mood {}  stress {}  anxiety {}  energy {}  ({} logs, {})",
        format_decimal(summary.avg_mood),
        format_decimal(summary.avg_stress),
        format_decimal(summary.avg_anxiety),
        format_decimal(summary.avg_energy),
        format_count(summary.total_logs),
        summary.mood_trend.as_deref().unwrap_or("no trend")
    );
}

fn render_mood_series(out: &mut String, points: &[MoodDataPoint]) {
    if points.is_empty() {
        let _ = writeln!(out, "  No mood logs in this range");
        return;
    }
    for point in points {
        let _ = writeln!(
            out,
            "  {:>6}  mood {:>5}  stress {:>5}",
            point.date.short_label(),
            format_decimal(point.mood_score),
            format_decimal(point.stress)
        );
    }
}

fn render_improvement(out: &mut String, improvement: &ImprovementData) {
    let _ = writeln!(
        out,
        "  Overall: {} ({})",
        format_percentage(improvement.overall_improvement_percentage),
        improvement.overall_trend.as_deref().unwrap_or("no trend")
    );
    for week in &improvement.weekly_improvements {
        let _ = writeln!(
            out,
            "  Week {}: {} {}",
            week.week_number,
            week.trend.as_deref().unwrap_or("-"),
            week.summary.as_deref().unwrap_or("")
        );
    }
}

fn render_reports(out: &mut String, reports: &[Report]) {
    if reports.is_empty() {
        let _ = writeln!(out, "  No reports yet");
        return;
    }
    for report in reports {
        let _ = writeln!(out, "  {}", report_row(report));
    }
}

/// One list row: week span, trend and id
pub fn report_row(report: &Report) -> String {
    format!(
        "{} - {}  {:<10} {}",
        report.week_start.short_label(),
        report.week_end.short_label(),
        report.trend.as_deref().unwrap_or("-"),
        report.report_id
    )
}
