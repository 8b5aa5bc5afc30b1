//! Derived projections over the loaded record collection.
//!
//! Everything here is a pure function of its inputs; nothing is cached.

use std::collections::HashSet;

use crate::plan::{ReadinessLevel, Record};

/// Department filter value that matches every record.
pub const ALL_DEPARTMENTS: &str = "all";

/// Departments shown in the dashboard summary.
const DEPARTMENT_PREVIEW: usize = 3;

/// Keep records whose position or candidate id contains `search`
/// (case-insensitive) and whose department matches `department`
/// (or `department == "all"`). Order is preserved.
pub fn filter<'a>(records: &'a [Record], search: &str, department: &str) -> Vec<&'a Record> {
    let needle = search.to_lowercase();
    records
        .iter()
        .filter(|r| {
            r.position.to_lowercase().contains(&needle)
                || r.candidate_id.to_lowercase().contains(&needle)
        })
        .filter(|r| department == ALL_DEPARTMENTS || r.department == department)
        .collect()
}

/// Fixed-size window for the 1-based `page`.
///
/// Pages past the end (and page 0, or a zero page size) yield an empty slice;
/// clamping is the caller's job, see [`clamp_page`].
pub fn paginate<T>(items: &[T], page_size: usize, page: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// `ceil(len / page_size)`.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// Clamp a requested page into `[1, total_pages]` (page 1 when there are none).
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.min(total_pages).max(1)
}

/// Percentage of `high` readiness records, one decimal place.
///
/// An empty collection yields `0.0`.
pub fn readiness_ratio(records: &[Record]) -> f64 {
    let (high, total) = readiness_counts(records);
    percent(high, total)
}

fn readiness_counts(records: &[Record]) -> (usize, usize) {
    records.iter().fold((0, 0), |(high, total), r| {
        let is_high = r.readiness_level == ReadinessLevel::High;
        (high + usize::from(is_high), total + 1)
    })
}

fn percent(high: usize, total: usize) -> f64 {
    let ratio = high as f64 / total.max(1) as f64 * 100.0;
    (ratio * 10.0).round() / 10.0
}

/// Distinct departments in first-appearance order.
pub fn distinct_departments(records: &[Record]) -> Vec<String> {
    distinct(records.iter().map(|r| r.department.as_str()))
}

/// Distinct positions in first-appearance order.
pub fn distinct_positions(records: &[Record]) -> Vec<String> {
    distinct(records.iter().map(|r| r.position.as_str()))
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

/// Headline numbers for the dashboard cards.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub plans: usize,
    pub positions: usize,
    pub high_readiness: usize,
    /// Denominator shown next to the chart: the plan count, or 1 when empty.
    pub chart_total: usize,
    pub high_readiness_percent: f64,
    pub departments_preview: Vec<String>,
}

pub fn dashboard_stats(records: &[Record]) -> DashboardStats {
    let (high, total) = readiness_counts(records);
    let mut departments_preview = distinct_departments(records);
    departments_preview.truncate(DEPARTMENT_PREVIEW);
    DashboardStats {
        plans: total,
        positions: distinct_positions(records).len(),
        high_readiness: high,
        chart_total: total.max(1),
        high_readiness_percent: percent(high, total),
        departments_preview,
    }
}
