//! Metrics collection with Prometheus
//!
//! This module provides Prometheus metrics for the insights client:
//! - Slice fetch counts by slice and outcome
//! - Slice fetch latency histograms
//! - Results discarded because a newer request superseded them
//! - Report viewer opens and report deletions by outcome

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Metrics collector for WellView
#[derive(Clone)]
pub struct Metrics {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Slice fetches that settled, by slice and outcome (success/failure)
    pub slice_fetch_total: CounterVec,
    /// Slice fetch duration, including token retrieval
    pub slice_fetch_duration_seconds: HistogramVec,
    /// Results dropped on arrival because their tag no longer matched
    pub stale_results_discarded_total: CounterVec,
    /// Report viewer opens by outcome (rendered/fallback)
    pub report_opens_total: CounterVec,
    /// Report deletions by outcome (deleted/cancelled/failed)
    pub report_deletions_total: CounterVec,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let slice_fetch_total = CounterVec::new(
            Opts::new(
                "wellview_slice_fetch_total",
                "Total number of settled slice fetches",
            ),
            &["slice", "outcome"],
        )?;

        let slice_fetch_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "wellview_slice_fetch_duration_seconds",
                "Slice fetch duration in seconds",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
            &["slice"],
        )?;

        let stale_results_discarded_total = CounterVec::new(
            Opts::new(
                "wellview_stale_results_discarded_total",
                "Results discarded because a newer request superseded them",
            ),
            &["slice"],
        )?;

        let report_opens_total = CounterVec::new(
            Opts::new("wellview_report_opens_total", "Report viewer opens"),
            &["outcome"],
        )?;

        let report_deletions_total = CounterVec::new(
            Opts::new("wellview_report_deletions_total", "Report deletion attempts"),
            &["outcome"],
        )?;

        registry.register(Box::new(slice_fetch_total.clone()))?;
        registry.register(Box::new(slice_fetch_duration_seconds.clone()))?;
        registry.register(Box::new(stale_results_discarded_total.clone()))?;
        registry.register(Box::new(report_opens_total.clone()))?;
        registry.register(Box::new(report_deletions_total.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            slice_fetch_total,
            slice_fetch_duration_seconds,
            stale_results_discarded_total,
            report_opens_total,
            report_deletions_total,
        })
    }

    /// Get the Prometheus registry for exporting metrics
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record a settled slice fetch
    pub fn record_slice_fetch(&self, slice: &str, success: bool, duration_secs: f64) {
        let outcome = if success { "success" } else { "failure" };
        self.slice_fetch_total
            .with_label_values(&[slice, outcome])
            .inc();
        self.slice_fetch_duration_seconds
            .with_label_values(&[slice])
            .observe(duration_secs);
    }

    /// Record a result dropped because a newer request won
    pub fn record_stale_discard(&self, slice: &str) {
        self.stale_results_discarded_total
            .with_label_values(&[slice])
            .inc();
    }

    pub fn record_report_open(&self, rendered: bool) {
        let outcome = if rendered { "rendered" } else { "fallback" };
        self.report_opens_total.with_label_values(&[outcome]).inc();
    }

    pub fn record_report_deletion(&self, outcome: &str) {
        self.report_deletions_total
            .with_label_values(&[outcome])
            .inc();
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics")
    }
}
