//! End-to-end dashboard tests over HTTP using wiremock
//!
//! The real `BackendClient` talks to a mock wellness API, so these cover the
//! full path from HTTP payloads to the rendered view state.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wellview_core::{StaticTokenSource, TimeRange};
use wellview_egress::{BackendClient, BackendConfig};
use wellview_insights::{InsightsDashboard, RangeOutcome, Readiness, format_decimal};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path, query_param},
};

const USER_ID: &str = "3f2b8c1e-9a4d-4e0f-8b7a-1c2d3e4f5a6b";

fn mood_history(score: f64, days: u32) -> serde_json::Value {
    json!({
        "total_logs": 2,
        "days_covered": days,
        "mood_data": [
            {"date": "2024-01-12", "mood_score": score, "stress": 4.0, "anxiety": 2.0, "energy": 6.0},
            {"date": "2024-01-10", "mood_score": score, "stress": null}
        ]
    })
}

async fn mount_sync_user(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/sync-user"))
        .and(header("authorization", "Bearer session-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uuid": USER_ID,
            "clerk_user_id": "user_2abc",
            "email": "someone@example.com"
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_static_slices(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/engagement/dashboard"))
        .and(header("x-user-id", USER_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "streak": {
                "current_streak": 4,
                "longest_streak": 9,
                "last_check_in": "2024-01-14",
                "total_check_ins": 31
            },
            "recent_activity": {"images_this_week": 3, "moods_this_week": 5, "days_active": 5},
            "quick_stats": {
                "total_images": 18,
                "total_mood_logs": 40,
                "avg_mood_this_week": 72.3,
                "days_tracked": 33
            },
            "daily_insight": "Your mood is trending up."
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/engagement/mood/summary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "period": "week",
            "avg_mood": 6.8,
            "avg_stress": 3.1,
            "avg_anxiety": 2.4,
            "avg_energy": 6.2,
            "total_logs": 5,
            "mood_trend": "improving"
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/skin/improvement-tracker"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "overall_improvement_percentage": 12.5,
            "overall_trend": "improving",
            "total_images": 18,
            "weekly_improvements": [
                {"week_number": 1, "trend": "stable", "summary": "Baseline", "confidence_change": 0.0},
                {"week_number": 2, "trend": "improving", "summary": "Less redness", "confidence_change": 4.5}
            ]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/reports/weekly/list"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reports": [
                {
                    "report_id": "aaaaaaaa-0000-4000-8000-000000000001",
                    "week_start": "2024-01-08",
                    "week_end": "2024-01-14",
                    "summary": "A calmer week overall.",
                    "trend": "improving",
                    "generated_at": "2024-01-15T08:00:00Z",
                    "has_html": true,
                    "metrics": {"average_severity": 2.1, "days_tracked": 6}
                },
                {
                    "report_id": "bbbbbbbb-0000-4000-8000-000000000002",
                    "week_start": "2024-01-01",
                    "week_end": "2024-01-07",
                    "summary": "Getting started.",
                    "trend": "stable",
                    "has_html": false
                }
            ]
        })))
        .mount(server)
        .await;
}

fn dashboard(server: &MockServer) -> InsightsDashboard {
    let client = BackendClient::new(BackendConfig::new(server.uri())).unwrap();
    InsightsDashboard::new(
        Arc::new(client),
        Arc::new(StaticTokenSource::new("session-token")),
    )
}

#[tokio::test]
async fn test_full_dashboard_renders_stats_and_two_reports() {
    let server = MockServer::start().await;
    mount_sync_user(&server).await;
    mount_static_slices(&server).await;
    Mock::given(method("GET"))
        .and(path("/engagement/mood/history"))
        .and(query_param("days", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mood_history(7.0, 7)))
        .mount(&server)
        .await;

    let state = dashboard(&server).start(TimeRange::Week).await.unwrap();

    assert_eq!(state.readiness, Readiness::Ready);
    assert_eq!(state.avg_mood_label(), "72.3");

    let reports = state.reports.ready().unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].week_start.short_label(), "Jan 8");
    assert_eq!(reports[1].summary, "Getting started.");
    assert_eq!(reports[0].metrics.average_severity, Some(2.1));
    assert_eq!(reports[1].metrics.average_severity, None);

    let series = state.mood.series.ready().unwrap();
    assert_eq!(series[0].date.as_str(), "2024-01-10");
    assert_eq!(series[0].stress, None);
    assert_eq!(series[1].stress, Some(4.0));

    let improvement = state.improvement.ready().unwrap();
    assert_eq!(improvement.weekly_improvements.len(), 2);
    assert_eq!(
        format_decimal(improvement.weekly_improvements[0].confidence_change),
        "0.0"
    );
    assert!(state.partial_failure().is_none());
}

#[tokio::test]
async fn test_failing_endpoint_hides_only_its_section() {
    let server = MockServer::start().await;
    mount_sync_user(&server).await;
    mount_static_slices(&server).await;
    Mock::given(method("GET"))
        .and(path("/engagement/mood/history"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let state = dashboard(&server).start(TimeRange::Week).await.unwrap();

    assert_eq!(state.readiness, Readiness::Ready);
    assert!(state.mood.series.is_unavailable());
    assert!(state.mood.summary.ready().is_some());
    assert_eq!(state.reports.ready().unwrap().len(), 2);
}

#[tokio::test]
async fn test_null_mood_score_keeps_other_points() {
    let server = MockServer::start().await;
    mount_sync_user(&server).await;
    mount_static_slices(&server).await;
    Mock::given(method("GET"))
        .and(path("/engagement/mood/history"))
        .and(query_param("days", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_logs": 2,
            "days_covered": 7,
            "mood_data": [
                {"date": "2024-01-01", "mood_score": 40.0},
                {"date": "2024-01-02", "mood_score": null, "stress": 20.0}
            ]
        })))
        .mount(&server)
        .await;

    let state = dashboard(&server).start(TimeRange::Week).await.unwrap();

    let series = state.mood.series.ready().unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].mood_score, Some(40.0));
    assert_eq!(series[1].mood_score, None);
    assert_eq!(format_decimal(series[1].mood_score), "—");
    assert_eq!(series[1].stress, Some(20.0));
}

#[tokio::test]
async fn test_slow_week_response_loses_to_month_switch() {
    let server = MockServer::start().await;
    mount_sync_user(&server).await;
    mount_static_slices(&server).await;

    Mock::given(method("GET"))
        .and(path("/engagement/mood/history"))
        .and(query_param("days", "7"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(mood_history(7.0, 7))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/engagement/mood/history"))
        .and(query_param("days", "30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mood_history(30.0, 30)))
        .mount(&server)
        .await;

    let dashboard = dashboard(&server);
    dashboard.resolve_identity().await.unwrap();

    let load = dashboard.load_all(TimeRange::Week);
    let switch = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        dashboard.select_range(TimeRange::Month).await
    };

    let (state, outcome) = tokio::join!(load, switch);
    assert_eq!(outcome.unwrap(), RangeOutcome::Applied);

    let state = state.unwrap();
    assert_eq!(state.readiness, Readiness::Ready);
    assert_eq!(state.selected_range, TimeRange::Month);
    assert_eq!(state.mood.range, TimeRange::Month);
    assert!(
        state
            .mood
            .series
            .ready()
            .unwrap()
            .iter()
            .all(|p| p.mood_score == Some(30.0))
    );
}

#[tokio::test]
async fn test_report_html_and_delete_over_http() {
    let server = MockServer::start().await;
    mount_sync_user(&server).await;
    mount_static_slices(&server).await;
    Mock::given(method("GET"))
        .and(path("/engagement/mood/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mood_history(7.0, 7)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reports/weekly/html"))
        .and(query_param("week_start", "2024-01-08"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><h1>Week 2</h1></html>"))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/reports/weekly/aaaaaaaa-0000-4000-8000-000000000001"))
        .and(header("authorization", "Bearer session-token"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let dashboard = dashboard(&server);
    dashboard.start(TimeRange::Week).await.unwrap();

    let week_start = wellview_core::IsoDate::parse("2024-01-08").unwrap();
    let content = dashboard.open_report(week_start).await;
    assert_eq!(content.body(), "<html><h1>Week 2</h1></html>");
    dashboard.close_report();

    let report_id =
        wellview_core::ReportId::from_string("aaaaaaaa-0000-4000-8000-000000000001").unwrap();
    let outcome = dashboard
        .delete_report(report_id, &|_: &wellview_core::model::Report| true)
        .await
        .unwrap();
    assert_eq!(outcome, wellview_insights::DeleteOutcome::Deleted);

    let state = dashboard.snapshot();
    let remaining = state.reports.ready().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(
        remaining[0].report_id.to_string(),
        "bbbbbbbb-0000-4000-8000-000000000002"
    );
}
