//! WellView CLI
//!
//! Terminal client for the wellness insights dashboard.
//!
//! Usage:
//! ```bash
//! # Dashboard at the configured default range
//! WELLVIEW_SESSION_TOKEN=... wellview dashboard
//!
//! # 30-day mood view, with a config file
//! wellview --config ~/.wellview/config.yaml dashboard --range 30
//!
//! # Read or delete a weekly report
//! wellview report open 2024-01-08
//! wellview report delete 3f2b8c1e-9a4d-4e0f-8b7a-1c2d3e4f5a6b
//! ```

mod config;
mod render;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::AppConfig;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use wellview_core::{IsoDate, ReportId, StaticTokenSource, TimeRange, model::Report};
use wellview_egress::{BackendClient, BackendConfig};
use wellview_insights::{DeleteOutcome, InsightsDashboard};
use wellview_observability::{Metrics, init_logging};

const DEFAULT_CONFIG_PATH: &str = "~/.wellview/config.yaml";

/// WellView - wellness insights from the terminal
#[derive(Parser)]
#[command(name = "wellview")]
#[command(about = "WellView insights dashboard client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file (YAML or TOML)
    #[arg(short, long, value_name = "FILE", env = "WELLVIEW_CONFIG", global = true)]
    config: Option<String>,

    /// Print collected metrics in Prometheus text format on exit
    #[arg(long, global = true)]
    emit_metrics: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and display the insights dashboard
    Dashboard {
        /// Mood range in days (7, 14 or 30)
        #[arg(short, long)]
        range: Option<TimeRange>,
    },
    /// Work with weekly reports
    Report {
        #[command(subcommand)]
        action: ReportAction,
    },
}

#[derive(Subcommand)]
enum ReportAction {
    /// Show the rendered report for a week
    Open {
        /// First day of the report week (YYYY-MM-DD)
        week_start: IsoDate,
    },
    /// Delete a report
    Delete {
        report_id: ReportId,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.logging)?;

    let metrics = Arc::new(Metrics::new()?);
    let dashboard = build_dashboard(&config, metrics.clone())?;

    let result = run(cli.command, &config, &dashboard).await;

    if cli.emit_metrics {
        print!("{}", metrics.encode_text()?);
    }

    result
}

fn load_config(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut config = match path {
        Some(path) => AppConfig::from_file(expand(path))?,
        None => {
            let default_path = expand(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                AppConfig::from_file(default_path)?
            } else {
                AppConfig::default()
            }
        }
    };

    config.merge_env();
    config.validate()?;
    Ok(config)
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}

fn build_dashboard(
    config: &AppConfig,
    metrics: Arc<Metrics>,
) -> anyhow::Result<InsightsDashboard> {
    let backend_config = BackendConfig::new(config.backend.base_url.clone())
        .with_user_id_header(config.backend.user_id_header.clone())
        .with_client_config(config.http.clone());
    let client = BackendClient::new(backend_config).context("Failed to create backend client")?;

    let token_source = match &config.backend.session_token {
        Some(token) => StaticTokenSource::new(token.clone()),
        None => StaticTokenSource::signed_out(),
    };

    Ok(
        InsightsDashboard::new(Arc::new(client), Arc::new(token_source))
            .with_metrics(metrics)
            .with_report_limit(config.backend.report_limit),
    )
}

async fn run(
    command: Commands,
    config: &AppConfig,
    dashboard: &InsightsDashboard,
) -> anyhow::Result<()> {
    match command {
        Commands::Dashboard { range } => {
            let range = range.unwrap_or(config.default_range);
            let state = dashboard
                .start(range)
                .await
                .context("Failed to load dashboard")?;

            if let Some(partial) = state.partial_failure() {
                warn!("{}", partial);
            }
            print!("{}", render::render_dashboard(&state));
        }
        Commands::Report {
            action: ReportAction::Open { week_start },
        } => {
            dashboard
                .resolve_identity()
                .await
                .context("Failed to resolve identity")?;

            let content = dashboard.open_report(week_start).await;
            println!("{}", content.body());
            dashboard.close_report();
        }
        Commands::Report {
            action: ReportAction::Delete { report_id, yes },
        } => {
            dashboard
                .start(config.default_range)
                .await
                .context("Failed to load reports")?;

            let outcome = if yes {
                dashboard.delete_report(report_id, &|_: &Report| true).await?
            } else {
                dashboard.delete_report(report_id, &prompt_confirm).await?
            };

            match outcome {
                DeleteOutcome::Deleted => {
                    info!(report_id = %report_id, "Report deleted");
                    println!("Deleted report {}", report_id);
                }
                DeleteOutcome::Cancelled => println!("Cancelled"),
            }
        }
    }

    Ok(())
}

/// Ask on stdin; anything but `y`/`yes` declines
fn prompt_confirm(report: &Report) -> bool {
    print!("Delete report {}? [y/N] ", render::report_row(report));
    if std::io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    match std::io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}
