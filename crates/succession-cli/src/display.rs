//! Terminal rendering for plans, the dashboard summary, and status banners.

use std::fmt::Write;

use chrono::DateTime;
use succession_core::view::DashboardStats;
use succession_core::{Banner, Record, TxStatus};

const LABEL_WIDTH: usize = 18;
const POSITION_WIDTH: usize = 28;
const DEPARTMENT_WIDTH: usize = 16;
const CHART_WIDTH: usize = 30;

/// One plan as a vertical card.
pub fn render_plan_card(record: &Record) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", record.position);
    let _ = writeln!(out);
    field(&mut out, "id", &record.id);
    field(&mut out, "candidate", &record.candidate_label());
    field(&mut out, "candidate_id", &record.candidate_id);
    field(&mut out, "department", or_dash(&record.department));
    field(&mut out, "readiness", record.readiness_level.as_str());
    field(&mut out, "sealed_score", record.encrypted_score.as_str());
    field(&mut out, "submitted", &format_date(record.timestamp));
    if record.encrypted_score.is_simulated() {
        let _ = writeln!(out);
        let _ = writeln!(out, "  note: score sealing is simulated, not encrypted");
    }
    out
}

fn field(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "  {label:<LABEL_WIDTH$} {value}");
}

/// The plan table for one page.
pub fn render_plan_table(records: &[&Record], page: usize, total_pages: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<POSITION_WIDTH$}  {:<10}  {:<DEPARTMENT_WIDTH$}  {:<10}  Readiness",
        "Position", "Candidate", "Department", "Date Added"
    );
    if records.is_empty() {
        let _ = writeln!(out, "No succession plans found");
        return out;
    }
    for record in records {
        let _ = writeln!(
            out,
            "{:<POSITION_WIDTH$}  {:<10}  {:<DEPARTMENT_WIDTH$}  {:<10}  {}",
            truncate(&record.position, POSITION_WIDTH),
            record.candidate_label(),
            truncate(or_dash(&record.department), DEPARTMENT_WIDTH),
            format_date(record.timestamp),
            record.readiness_level,
        );
    }
    if total_pages > 1 {
        let _ = writeln!(out, "Page {page} of {total_pages}");
    }
    out
}

/// Dashboard cards: counts, readiness chart, department preview.
pub fn render_dashboard(stats: &DashboardStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Overview");
    field(&mut out, "plans", &stats.plans.to_string());
    field(&mut out, "positions", &stats.positions.to_string());
    let _ = writeln!(out);
    let _ = writeln!(out, "High Potential Talent");
    let _ = writeln!(
        out,
        "  [{}] {:.1}%",
        readiness_bar(stats.high_readiness_percent),
        stats.high_readiness_percent
    );
    let _ = writeln!(
        out,
        "  High Readiness Candidates: {}/{}",
        stats.high_readiness, stats.chart_total
    );
    if !stats.departments_preview.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Departments");
        for department in &stats.departments_preview {
            let _ = writeln!(out, "  - {}", or_dash(department));
        }
    }
    out
}

/// Department filter values, one per line. The empty department prints as `""`.
pub fn render_department_options(options: &[String]) -> String {
    let mut out = String::new();
    for option in options {
        let shown = if option.is_empty() { "\"\"" } else { option.as_str() };
        let _ = writeln!(out, "{shown}");
    }
    out
}

pub fn render_banner(banner: &Banner) -> String {
    let icon = match banner.status {
        TxStatus::Pending => "…",
        TxStatus::Success => "✓",
        TxStatus::Error => "✕",
    };
    format!("{icon} {}", banner.message)
}

fn readiness_bar(percent: f64) -> String {
    let filled = ((percent / 100.0) * CHART_WIDTH as f64).round() as usize;
    let filled = filled.min(CHART_WIDTH);
    format!("{}{}", "#".repeat(filled), ".".repeat(CHART_WIDTH - filled))
}

fn format_date(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() { "-" } else { s }
}
