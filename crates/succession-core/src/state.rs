//! Dashboard state and the reducer that drives it.
//!
//! Every change goes through [`AppState::apply`]. Time enters only through the
//! timestamps carried by actions, so the reducer stays deterministic.

use chrono::{DateTime, TimeDelta, Utc};

use crate::plan::{PlanInput, Record};
use crate::view::{self, ALL_DEPARTMENTS, DashboardStats};

/// Records per page in the plan table.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Seconds a success banner stays up.
pub const SUCCESS_BANNER_SECS: i64 = 2;

/// Seconds an error banner stays up.
pub const ERROR_BANNER_SECS: i64 = 3;

const SEALING_MESSAGE: &str = "Sealing performance score (simulated FHE, not encrypted)...";
const CREATED_MESSAGE: &str = "Succession plan created with simulated FHE sealing";
const AVAILABLE_MESSAGE: &str = "Contract is available and ready";
const UNAVAILABLE_MESSAGE: &str = "Contract reported itself unavailable";
const PROBE_FAILED_MESSAGE: &str = "Failed to check system availability";
const NO_ACCOUNT_MESSAGE: &str = "Please connect wallet first";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    Pending,
    Success,
    Error,
}

/// Transaction status banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub status: TxStatus,
    pub message: String,
    /// `None` while pending: a pending banner is replaced, never timed out.
    pub dismiss_at: Option<DateTime<Utc>>,
    /// Close and reset the create form when this banner is dismissed.
    pub reset_form_on_dismiss: bool,
}

impl Banner {
    fn pending(message: &str) -> Self {
        Self {
            status: TxStatus::Pending,
            message: message.to_string(),
            dismiss_at: None,
            reset_form_on_dismiss: false,
        }
    }

    fn success(message: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            status: TxStatus::Success,
            message: message.into(),
            dismiss_at: Some(at + TimeDelta::seconds(SUCCESS_BANNER_SECS)),
            reset_form_on_dismiss: false,
        }
    }

    fn error(message: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            status: TxStatus::Error,
            message: message.into(),
            dismiss_at: Some(at + TimeDelta::seconds(ERROR_BANNER_SECS)),
            reset_form_on_dismiss: false,
        }
    }

    fn expired(&self, now: DateTime<Utc>) -> bool {
        self.dismiss_at.is_some_and(|at| now >= at)
    }
}

/// Events that change the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Connected { account: String },
    Disconnected,
    RefreshStarted,
    RecordsLoaded(Vec<Record>),
    /// A failed refresh keeps the previously loaded records.
    RefreshFailed { reason: String },
    SearchChanged(String),
    DepartmentChanged(String),
    PreviousPage,
    NextPage,
    /// Jump to a page; clamped to the pages that exist.
    PageSelected(usize),
    OpenCreateForm,
    CloseCreateForm,
    FormEdited(PlanInput),
    SubmitStarted { at: DateTime<Utc> },
    SubmitSucceeded { record: Record, at: DateTime<Utc> },
    SubmitFailed { message: String, at: DateTime<Utc> },
    AvailabilityChecked { available: bool, at: DateTime<Utc> },
    AvailabilityCheckFailed { at: DateTime<Utc> },
    Tick { now: DateTime<Utc> },
}

/// Everything the dashboard shows, in one place.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub account: Option<String>,
    /// Loaded records, newest first.
    pub records: Vec<Record>,
    /// True until the first load finishes, successfully or not.
    pub loading: bool,
    pub refreshing: bool,
    pub creating: bool,
    pub create_form_open: bool,
    pub form: PlanInput,
    pub search: String,
    pub department: String,
    pub page: usize,
    pub page_size: usize,
    pub banner: Option<Banner>,
    pub last_error: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl AppState {
    pub fn new(page_size: usize) -> Self {
        Self {
            account: None,
            records: Vec::new(),
            loading: true,
            refreshing: false,
            creating: false,
            create_form_open: false,
            form: PlanInput::default(),
            search: String::new(),
            department: ALL_DEPARTMENTS.to_string(),
            page: 1,
            page_size: page_size.max(1),
            banner: None,
            last_error: None,
        }
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Connected { account } => {
                self.account = Some(account).filter(|a| !a.is_empty());
            }
            Action::Disconnected => {
                self.account = None;
            }
            Action::RefreshStarted => {
                self.refreshing = true;
            }
            Action::RecordsLoaded(mut records) => {
                sort_newest_first(&mut records);
                self.records = records;
                self.finish_refresh();
                self.last_error = None;
                self.page = view::clamp_page(self.page, self.total_pages());
            }
            Action::RefreshFailed { reason } => {
                self.finish_refresh();
                self.last_error = Some(reason);
            }
            Action::SearchChanged(search) => {
                self.search = search;
                self.page = 1;
            }
            Action::DepartmentChanged(department) => {
                self.department = department;
                self.page = 1;
            }
            Action::PreviousPage => {
                self.page = self.page.saturating_sub(1).max(1);
            }
            Action::NextPage => {
                self.page = view::clamp_page(self.page + 1, self.total_pages());
            }
            Action::PageSelected(page) => {
                self.page = view::clamp_page(page, self.total_pages());
            }
            Action::OpenCreateForm => {
                self.create_form_open = true;
            }
            Action::CloseCreateForm => {
                self.create_form_open = false;
            }
            Action::FormEdited(form) => {
                self.form = form;
            }
            Action::SubmitStarted { at } => {
                if self.account.is_none() {
                    self.banner = Some(Banner::error(NO_ACCOUNT_MESSAGE, at));
                    return;
                }
                self.creating = true;
                self.banner = Some(Banner::pending(SEALING_MESSAGE));
            }
            Action::SubmitSucceeded { record, at } => {
                self.creating = false;
                self.records.push(record);
                sort_newest_first(&mut self.records);
                let mut banner = Banner::success(CREATED_MESSAGE, at);
                banner.reset_form_on_dismiss = true;
                self.banner = Some(banner);
            }
            Action::SubmitFailed { message, at } => {
                self.creating = false;
                self.banner = Some(Banner::error(message, at));
            }
            Action::AvailabilityChecked { available, at } => {
                self.banner = Some(if available {
                    Banner::success(AVAILABLE_MESSAGE, at)
                } else {
                    Banner::error(UNAVAILABLE_MESSAGE, at)
                });
            }
            Action::AvailabilityCheckFailed { at } => {
                self.banner = Some(Banner::error(PROBE_FAILED_MESSAGE, at));
            }
            Action::Tick { now } => {
                let Some(banner) = self.banner.take_if(|b| b.expired(now)) else {
                    return;
                };
                if banner.reset_form_on_dismiss {
                    self.create_form_open = false;
                    self.form = PlanInput::default();
                }
            }
        }
    }

    fn finish_refresh(&mut self) {
        self.refreshing = false;
        self.loading = false;
    }

    /// Records passing the current search and department filter.
    pub fn visible(&self) -> Vec<&Record> {
        view::filter(&self.records, &self.search, &self.department)
    }

    pub fn total_pages(&self) -> usize {
        view::total_pages(self.visible().len(), self.page_size)
    }

    /// The current page of visible records.
    pub fn page_records(&self) -> Vec<&Record> {
        let visible = self.visible();
        view::paginate(&visible, self.page_size, self.page).to_vec()
    }

    /// Department options for the filter, `"all"` first.
    pub fn department_options(&self) -> Vec<String> {
        let mut options = vec![ALL_DEPARTMENTS.to_string()];
        options.extend(view::distinct_departments(&self.records));
        options
    }

    pub fn stats(&self) -> DashboardStats {
        view::dashboard_stats(&self.records)
    }
}

/// Newest first; ties keep their existing order.
fn sort_newest_first(records: &mut [Record]) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{ReadinessLevel, SealedScore};

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn record(n: i64, department: &str) -> Record {
        Record {
            id: format!("id-{n}"),
            position: format!("Position {n}"),
            candidate_id: format!("cand-{n}"),
            encrypted_score: SealedScore::seal("60"),
            timestamp: n,
            department: department.into(),
            readiness_level: ReadinessLevel::Medium,
        }
    }

    fn loaded(n: i64) -> AppState {
        let mut state = AppState::default();
        state.apply(Action::RecordsLoaded((1..=n).map(|i| record(i, "Ops")).collect()));
        state
    }

    #[test]
    fn load_sorts_newest_first_and_clears_loading() {
        let state = loaded(3);
        assert!(!state.loading);
        let ids: Vec<_> = state.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["id-3", "id-2", "id-1"]);
    }

    #[test]
    fn failed_refresh_keeps_previous_records() {
        let mut state = loaded(2);
        state.apply(Action::RefreshStarted);
        state.apply(Action::RefreshFailed {
            reason: "contract unavailable".into(),
        });
        assert_eq!(state.records.len(), 2);
        assert!(!state.refreshing);
        assert_eq!(state.last_error.as_deref(), Some("contract unavailable"));
    }

    #[test]
    fn paging_stays_within_bounds() {
        let mut state = loaded(12);
        assert_eq!(state.total_pages(), 3);
        state.apply(Action::PreviousPage);
        assert_eq!(state.page, 1);
        for _ in 0..5 {
            state.apply(Action::NextPage);
        }
        assert_eq!(state.page, 3);
        assert_eq!(state.page_records().len(), 2);
    }

    #[test]
    fn selected_page_is_clamped() {
        let mut state = loaded(12);
        state.apply(Action::PageSelected(7));
        assert_eq!(state.page, 3);
        state.apply(Action::PageSelected(0));
        assert_eq!(state.page, 1);
        state.apply(Action::PageSelected(2));
        let ids: Vec<_> = state.page_records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["id-7", "id-6", "id-5", "id-4", "id-3"]);
    }

    #[test]
    fn filter_change_resets_page() {
        let mut state = loaded(12);
        state.apply(Action::NextPage);
        state.apply(Action::SearchChanged("position 1".into()));
        assert_eq!(state.page, 1);
        // Position 1, 10, 11, 12
        assert_eq!(state.visible().len(), 4);
        state.apply(Action::DepartmentChanged("Finance".into()));
        assert!(state.page_records().is_empty());
    }

    #[test]
    fn department_options_start_with_all() {
        let mut state = AppState::default();
        state.apply(Action::RecordsLoaded(vec![record(1, "Ops"), record(2, "Legal"), record(3, "Ops")]));
        assert_eq!(state.department_options(), vec!["all", "Ops", "Legal"]);
    }

    #[test]
    fn submit_without_account_shows_error() {
        let mut state = AppState::default();
        state.apply(Action::SubmitStarted { at: at(0) });
        assert!(!state.creating);
        let banner = state.banner.unwrap();
        assert_eq!(banner.status, TxStatus::Error);
        assert_eq!(banner.message, NO_ACCOUNT_MESSAGE);
    }

    #[test]
    fn successful_submit_resets_form_after_banner_expires() {
        let mut state = loaded(1);
        state.apply(Action::Connected {
            account: "0xabc".into(),
        });
        state.apply(Action::OpenCreateForm);
        state.apply(Action::FormEdited(PlanInput {
            position: "Lead".into(),
            candidate_id: "c".into(),
            department: "Ops".into(),
            score: "90".into(),
        }));
        state.apply(Action::SubmitStarted { at: at(100) });
        assert!(state.creating);
        assert_eq!(state.banner.as_ref().unwrap().status, TxStatus::Pending);

        state.apply(Action::SubmitSucceeded {
            record: record(50, "Ops"),
            at: at(100),
        });
        assert!(!state.creating);
        assert_eq!(state.records[0].id, "id-50");

        state.apply(Action::Tick { now: at(101) });
        assert!(state.banner.is_some());
        assert!(state.create_form_open);

        state.apply(Action::Tick { now: at(102) });
        assert!(state.banner.is_none());
        assert!(!state.create_form_open);
        assert_eq!(state.form, PlanInput::default());
    }

    #[test]
    fn failed_submit_banner_lasts_three_seconds() {
        let mut state = AppState::default();
        state.apply(Action::Connected {
            account: "0xabc".into(),
        });
        state.apply(Action::SubmitStarted { at: at(10) });
        state.apply(Action::SubmitFailed {
            message: "Transaction rejected by user".into(),
            at: at(10),
        });
        assert!(!state.creating);
        state.apply(Action::Tick { now: at(12) });
        assert!(state.banner.is_some());
        state.apply(Action::Tick { now: at(13) });
        assert!(state.banner.is_none());
    }

    #[test]
    fn pending_banner_never_expires() {
        let mut state = AppState::default();
        state.apply(Action::Connected {
            account: "0xabc".into(),
        });
        state.apply(Action::SubmitStarted { at: at(0) });
        state.apply(Action::Tick { now: at(1_000) });
        assert_eq!(state.banner.unwrap().status, TxStatus::Pending);
    }

    #[test]
    fn availability_banner_reflects_probe() {
        let mut state = AppState::default();
        state.apply(Action::AvailabilityChecked {
            available: false,
            at: at(0),
        });
        assert_eq!(state.banner.as_ref().unwrap().status, TxStatus::Error);
        state.apply(Action::AvailabilityChecked {
            available: true,
            at: at(0),
        });
        assert_eq!(state.banner.as_ref().unwrap().status, TxStatus::Success);
    }

    #[test]
    fn empty_account_is_not_connected() {
        let mut state = AppState::default();
        state.apply(Action::Connected { account: String::new() });
        assert!(state.account.is_none());
    }
}
