use chrono::{DateTime, Local, Utc};
use colored::{ColoredString, Colorize};

use dd_core::domain::error::DashboardError;
use dd_core::domain::job::{Job, JobDetail, JobStatus, Language};
use dd_core::domain::settings::Theme;
use dd_core::infra::metrics::MetricsSummary;
use dd_core::usecase::job_store::JobListState;

const TITLE_WIDTH: usize = 36;

/// 完了=緑、失敗=赤、それ以外=青。ダークテーマでは明るい色を使う。
pub fn status_badge(status: JobStatus, theme: Theme) -> ColoredString {
    let label = format!("{:<10}", status.as_str());
    match (status, theme) {
        (JobStatus::Completed, Theme::Light) => label.green(),
        (JobStatus::Completed, Theme::Dark) => label.bright_green(),
        (JobStatus::Failed, Theme::Light) => label.red(),
        (JobStatus::Failed, Theme::Dark) => label.bright_red(),
        (_, Theme::Light) => label.blue(),
        (_, Theme::Dark) => label.bright_blue(),
    }
}

/// "EN → KO"
pub fn language_pair(source: Language, target: Language) -> String {
    format!(
        "{} → {}",
        source.code().to_uppercase(),
        target.code().to_uppercase()
    )
}

fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width - 1).collect();
    out.push('…');
    out
}

fn heading(text: &str, theme: Theme) -> ColoredString {
    match theme {
        Theme::Light => text.bold(),
        Theme::Dark => text.bold().white(),
    }
}

fn job_row(job: &Job, theme: Theme) -> String {
    format!(
        "{:<width$}  {:<8}  {}  {}",
        truncate(&job.title, TITLE_WIDTH),
        language_pair(job.source_language, job.target_language),
        status_badge(job.status, theme),
        local_time(job.created_at).dimmed(),
        width = TITLE_WIDTH,
    )
}

/// ジョブ一覧。エラーは表の上にインライン表示する。
pub fn job_table(state: &JobListState, theme: Theme) -> String {
    let mut lines = Vec::new();
    lines.push(heading("Your jobs", theme).to_string());

    if let Some(error) = &state.list_error {
        lines.push(error.red().to_string());
    }
    if let Some(error) = &state.submit_error {
        lines.push(error.red().to_string());
    }

    if state.jobs.is_empty() {
        if state.is_loading {
            lines.push("Loading jobs…".dimmed().to_string());
        } else if state.list_error.is_none() {
            lines.push("No jobs yet. Submit your first translation above.".dimmed().to_string());
        }
    } else {
        lines.push(
            format!(
                "{:<width$}  {:<8}  {:<10}  {}",
                "TITLE",
                "LANGS",
                "STATUS",
                "CREATED",
                width = TITLE_WIDTH
            )
            .dimmed()
            .to_string(),
        );
        lines.extend(state.jobs.iter().map(|job| job_row(job, theme)));
    }

    let mut footer = Vec::new();
    let active = state.jobs.iter().filter(|job| !job.status.is_terminal()).count();
    if active > 0 {
        footer.push(format!("{active} in progress"));
    } else if !state.jobs.is_empty() {
        footer.push("all jobs finished".to_string());
    }
    if state.is_loading && !state.jobs.is_empty() {
        footer.push("refreshing…".to_string());
    }
    if state.is_submitting {
        footer.push("submitting…".to_string());
    }
    if let Some(at) = state.last_refreshed_at {
        footer.push(format!("updated {}", at.with_timezone(&Local).format("%H:%M:%S")));
    }
    if !footer.is_empty() {
        lines.push(footer.join(" · ").dimmed().to_string());
    }

    lines.join("\n")
}

pub fn job_detail(detail: &JobDetail, theme: Theme) -> String {
    let mut lines = vec![
        heading(&detail.title, theme).to_string(),
        format!("  ID:         {}", detail.id),
        format!("  Status:     {}", status_badge(detail.status, theme)),
        format!(
            "  Languages:  {} ({} → {})",
            language_pair(detail.source_language, detail.target_language),
            detail.source_language.display_name(),
            detail.target_language.display_name()
        ),
        format!("  File:       {}", detail.original_filename),
        format!("  Created:    {}", local_time(detail.created_at)),
        format!("  Updated:    {}", local_time(detail.updated_at)),
    ];
    if let Some(message) = &detail.error_message {
        lines.push(format!("  Error:      {}", message.red()));
    }
    lines.join("\n")
}

/// フォーム入力不備の表示
pub fn field_error(error: &DashboardError) -> String {
    match error {
        DashboardError::Validation { field, message } => {
            format!("{} {}", format!("[{field}]").yellow(), message)
        }
        DashboardError::Transport { .. } => error.to_string().red().to_string(),
    }
}

pub fn stats(summary: &MetricsSummary) -> String {
    let avg = |value: Option<f64>| match value {
        Some(ms) => format!("{ms:.1}ms"),
        None => "-".to_string(),
    };
    [
        format!(
            "refreshes: {} started, {} committed, {} failed, {} superseded",
            summary.refreshes.started,
            summary.refreshes.committed,
            summary.refreshes.failed,
            summary.refreshes.superseded
        ),
        format!(
            "submissions: {} accepted, {} rejected, {} failed",
            summary.submissions.accepted, summary.submissions.rejected, summary.submissions.failed
        ),
        format!(
            "avg latency: list {}, create {}",
            avg(summary.avg_latency_ms.list),
            avg(summary.avg_latency_ms.create)
        ),
    ]
    .join("\n")
}
