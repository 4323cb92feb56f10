//! Shared in-memory backend for insights integration tests
//!
//! Every call is logged under a key (`mood_history:30`, `html:2024-01-08`,
//! ...). A key can be gated so the call parks until the test releases it,
//! which lets tests choose the completion order of concurrent fetches.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use wellview_core::{
    Error, Identity, InsightsBackend, IsoDate, ReportId, Result, StaticTokenSource, TimeRange,
    UserId,
    model::{
        DashboardStats, ImprovementData, MoodDataPoint, MoodSummary, QuickStats, Report,
        WeeklyMetrics,
    },
};
use wellview_insights::{InsightsDashboard, ViewState};

pub const USER_ID: &str = "3f2b8c1e-9a4d-4e0f-8b7a-1c2d3e4f5a6b";
pub const REPORT_A: &str = "aaaaaaaa-0000-4000-8000-000000000001";
pub const REPORT_B: &str = "bbbbbbbb-0000-4000-8000-000000000002";
pub const REPORT_C: &str = "cccccccc-0000-4000-8000-000000000003";

pub fn report(id: &str, week_start: &str, week_end: &str) -> Report {
    Report {
        report_id: ReportId::from_string(id).unwrap(),
        week_start: IsoDate::parse(week_start).unwrap(),
        week_end: IsoDate::parse(week_end).unwrap(),
        summary: format!("Week of {}", week_start),
        trend: Some("stable".to_string()),
        generated_at: None,
        has_html: true,
        metrics: WeeklyMetrics::default(),
    }
}

pub fn report_id(id: &str) -> ReportId {
    ReportId::from_string(id).unwrap()
}

pub struct FakeBackend {
    calls: Mutex<Vec<String>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    failing: Mutex<HashSet<String>>,
    reports: Mutex<Vec<Report>>,
}

impl FakeBackend {
    /// Two reports, newest first
    pub fn new() -> Self {
        Self::with_reports(vec![
            report(REPORT_A, "2024-01-08", "2024-01-14"),
            report(REPORT_B, "2024-01-01", "2024-01-07"),
        ])
    }

    pub fn with_reports(reports: Vec<Report>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            gates: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            reports: Mutex::new(reports),
        }
    }

    /// Park calls with this key until [`FakeBackend::release`]
    pub fn gate(&self, key: &str) {
        self.gates
            .lock()
            .unwrap()
            .insert(key.to_string(), Arc::new(Notify::new()));
    }

    pub fn release(&self, key: &str) {
        let gate = self.gates.lock().unwrap().get(key).cloned();
        gate.expect("no gate for key").notify_one();
    }

    pub fn fail(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, key: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == key).count()
    }

    pub fn was_called(&self, key: &str) -> bool {
        self.call_count(key) > 0
    }

    async fn pass(&self, key: String) -> Result<()> {
        self.calls.lock().unwrap().push(key.clone());
        let gate = self.gates.lock().unwrap().get(&key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let failing = self.failing.lock().unwrap().contains(&key);
        if failing {
            return Err(Error::Backend {
                status: 500,
                message: format!("{} failed", key),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl InsightsBackend for FakeBackend {
    async fn sync_user(&self, session_token: &str) -> Result<UserId> {
        self.pass("sync_user".to_string()).await?;
        assert_eq!(session_token, "session-token");
        UserId::from_string(USER_ID)
    }

    async fn dashboard_stats(&self, identity: &Identity) -> Result<DashboardStats> {
        assert_eq!(identity.backend_user_id.to_string(), USER_ID);
        self.pass("dashboard".to_string()).await?;
        Ok(DashboardStats {
            quick_stats: QuickStats {
                total_images: Some(12),
                total_mood_logs: Some(0),
                avg_mood_this_week: Some(72.3),
                days_tracked: Some(9),
            },
            ..DashboardStats::default()
        })
    }

    async fn mood_history(&self, _: &Identity, range: TimeRange) -> Result<Vec<MoodDataPoint>> {
        self.pass(format!("mood_history:{}", range.days())).await?;
        // One point per range, scored by the range length so tests can tell them apart
        Ok(vec![MoodDataPoint {
            date: IsoDate::parse("2024-01-10").unwrap(),
            mood_score: Some(range.days() as f64),
            stress: Some(3.0),
            anxiety: None,
            energy: None,
        }])
    }

    async fn mood_summary(&self, _: &Identity) -> Result<MoodSummary> {
        self.pass("mood_summary".to_string()).await?;
        Ok(MoodSummary {
            avg_mood: Some(6.5),
            total_logs: Some(4),
            ..MoodSummary::default()
        })
    }

    async fn improvement_tracker(&self, _: &Identity) -> Result<ImprovementData> {
        self.pass("improvement".to_string()).await?;
        Ok(ImprovementData {
            overall_improvement_percentage: Some(12.5),
            ..ImprovementData::default()
        })
    }

    async fn weekly_reports(&self, _: &Identity, limit: usize) -> Result<Vec<Report>> {
        self.pass("reports".to_string()).await?;
        let reports = self.reports.lock().unwrap().clone();
        Ok(reports.into_iter().take(limit).collect())
    }

    async fn weekly_report_html(&self, _: &Identity, week_start: &IsoDate) -> Result<String> {
        self.pass(format!("html:{}", week_start)).await?;
        Ok(format!("<h1>Report {}</h1>", week_start))
    }

    async fn delete_weekly_report(&self, _: &Identity, report_id: &ReportId) -> Result<()> {
        self.pass(format!("delete:{}", report_id)).await?;
        self.reports
            .lock()
            .unwrap()
            .retain(|r| &r.report_id != report_id);
        Ok(())
    }
}

pub fn dashboard(backend: Arc<FakeBackend>) -> InsightsDashboard {
    InsightsDashboard::new(backend, Arc::new(StaticTokenSource::new("session-token")))
}

/// Yield until `predicate` holds for the current view
pub async fn wait_for(dashboard: &InsightsDashboard, predicate: impl Fn(&ViewState) -> bool) {
    for _ in 0..10_000 {
        if predicate(&dashboard.snapshot()) {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition never reached; state: {:#?}", dashboard.snapshot());
}

/// Yield until the backend has seen a call with `key`
pub async fn wait_for_call(backend: &FakeBackend, key: &str) {
    for _ in 0..10_000 {
        if backend.was_called(key) {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("{} was never called; calls: {:?}", key, backend.calls());
}
