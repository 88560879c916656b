//! # Pads Admin Panel
//!
//! [`PadsAdminPanel`] is the controller behind the pads table: it owns the list
//! state, the create/edit dialog, and the two collaborators every action goes
//! through.
//!
//! ## Collaborators
//!
//! - An [`ApiClient`] for the REST calls (see [`crate::endpoints`]).
//! - A [`NotificationSink`] for recoverable errors and delete confirmation.
//!
//! ## Error Policy
//!
//! Panel operations never return errors and never panic. A failed request is
//! logged, handed to the sink, and reported as [`Outcome::Failed`]; the state
//! the panel held before the call is kept so the user can retry.
//!
//! ## Loading Flag
//!
//! Every list fetch raises [`PadsListState::loading`] through a guard, so the
//! flag drops on every exit path. [`PadsAdminPanel::loading_flag`] hands out a
//! shared handle for renderers that need to watch it.
//!
//! ## Concurrency
//!
//! Methods take `&mut self` and run to completion, so fetches are strictly
//! serialized and a slower response can never overwrite a newer one.

use crate::client::ApiClient;
use crate::error::ChaospadError;
use crate::endpoints::{PadsEndpoint, DEFAULT_API_BASE};
use crate::export::{export_csv, CsvExport};
use crate::model::{pad_columns, Column, Pad, PadDraft};
use crate::notify::NotificationSink;
use crate::query::FilterQuery;
use crate::state::{LoadingFlag, PadFormState, PadsListState, PageRequest, Pagination};
use crate::timefmt;
use crate::watch::Watched;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this Pads?";

/// How a panel action ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// The error went to the notification sink.
    Failed,
    /// The user answered "no" to a confirmation.
    Declined,
    /// Nothing to do (e.g. the search term did not change).
    Unchanged,
}

impl Outcome {
    pub fn is_completed(self) -> bool {
        self == Outcome::Completed
    }
}

/// Construction-time settings: where the API lives and the initial table state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSettings {
    pub api_base: String,
    pub pagination: Pagination,
    /// Initial search term; it applies to the first fetch without counting as a change.
    pub search: String,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            pagination: Pagination::default(),
            search: String::new(),
        }
    }
}

pub struct PadsAdminPanel<C: ApiClient, N: NotificationSink> {
    client: C,
    notifier: N,
    endpoint: PadsEndpoint,
    columns: Vec<Column>,
    list: PadsListState,
    form: PadFormState,
}

impl<C: ApiClient, N: NotificationSink> PadsAdminPanel<C, N> {
    pub fn new(client: C, notifier: N, settings: PanelSettings) -> Self {
        let list = PadsListState {
            pagination: settings.pagination,
            search: Watched::new(settings.search),
            ..PadsListState::default()
        };
        Self {
            client,
            notifier,
            endpoint: PadsEndpoint::new(&settings.api_base),
            columns: pad_columns(),
            list,
            form: PadFormState::default(),
        }
    }

    /// Build the panel and load its first page.
    pub fn mount(client: C, notifier: N, settings: PanelSettings) -> Self {
        let mut panel = Self::new(client, notifier, settings);
        panel.fetch_page(None);
        panel
    }

    // --- State access ---

    pub fn list(&self) -> &PadsListState {
        &self.list
    }

    pub fn items(&self) -> &[Pad] {
        &self.list.items
    }

    pub fn item(&self, id: &str) -> Option<&Pad> {
        self.list.items.iter().find(|pad| pad.id == id)
    }

    pub fn pagination(&self) -> &Pagination {
        &self.list.pagination
    }

    pub fn is_loading(&self) -> bool {
        self.list.is_loading()
    }

    pub fn loading_flag(&self) -> LoadingFlag {
        self.list.loading.clone()
    }

    pub fn form(&self) -> &PadFormState {
        &self.form
    }

    /// The dialog's draft, for binding form inputs.
    pub fn draft_mut(&mut self) -> &mut PadDraft {
        &mut self.form.draft
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn endpoint(&self) -> &PadsEndpoint {
        &self.endpoint
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    // --- Dialog ---

    pub fn open_create_dialog(&mut self) {
        self.form.draft = PadDraft::blank();
        self.form.visible = true;
        debug!("create dialog opened");
    }

    /// Open the dialog on a copy of `record`; the row itself is never touched
    /// until the save round-trips.
    pub fn open_edit_dialog(&mut self, record: &Pad) {
        self.form.draft = PadDraft::from(record);
        self.form.visible = true;
        debug!(id = %record.id, "edit dialog opened");
    }

    /// Load a record by id and open the edit dialog on it.
    pub fn open_edit_dialog_for(&mut self, id: &str) -> Outcome {
        match self.fetch_record(id) {
            Some(record) => {
                self.open_edit_dialog(&record);
                Outcome::Completed
            }
            None => Outcome::Failed,
        }
    }

    pub fn close_dialog(&mut self) {
        self.form = PadFormState::default();
    }

    /// POST or PUT the draft, then refetch and close the dialog. On failure
    /// the dialog stays open with the draft as it was.
    pub fn save_draft(&mut self) -> Outcome {
        let updating = self.form.draft.is_update();
        match self.endpoint.save(&mut self.client, &self.form.draft) {
            Ok(saved) => {
                info!(id = %saved.id, updating, "pad saved");
                self.fetch_page(None);
                self.close_dialog();
                Outcome::Completed
            }
            Err(err) => self.report("save pad", err),
        }
    }

    // --- List ---

    /// Load the current page. `request` replaces the pagination/sort first,
    /// as a table does when the user pages or sorts.
    pub fn fetch_page(&mut self, request: Option<&PageRequest>) -> Outcome {
        if let Some(request) = request {
            self.list.pagination.apply(request);
        }

        let _loading = self.list.loading.hold();
        let query = FilterQuery::new(&self.list.pagination, self.list.search_term());
        debug!(query = %query.to_query_string(), "fetching pads");

        match self.endpoint.list(&mut self.client, &query) {
            Ok(page) => {
                debug!(rows = page.data.len(), total = page.total, "pads page loaded");
                self.list.items = page.data;
                self.list.pagination.total_count = page.total;
                Outcome::Completed
            }
            Err(err) => self.report("fetch pads", err),
        }
    }

    pub fn request_page(&mut self, request: PageRequest) -> Outcome {
        self.fetch_page(Some(&request))
    }

    /// GET a single record without touching the list.
    pub fn fetch_record(&mut self, id: &str) -> Option<Pad> {
        match self.endpoint.get(&mut self.client, id) {
            Ok(pad) => Some(pad),
            Err(err) => {
                self.report("fetch pad", err);
                None
            }
        }
    }

    // --- Search ---

    /// Update the search field. A changed term refetches immediately.
    pub fn set_search_term(&mut self, term: impl Into<String>) -> Outcome {
        if !self.list.search.set(term.into()) {
            return Outcome::Unchanged;
        }
        debug!(search = %self.list.search_term(), "search changed");
        self.fetch_page(None)
    }

    /// Observe search changes in addition to the built-in refetch.
    pub fn on_search_change(&mut self, callback: impl FnMut(&String) + 'static) {
        self.list.search.subscribe(callback);
    }

    // --- Delete ---

    /// Confirm, DELETE, then refetch. Declining sends nothing.
    pub fn delete_record(&mut self, id: &str) -> Outcome {
        if !self.notifier.confirm(DELETE_CONFIRMATION) {
            debug!(id, "delete declined");
            return Outcome::Declined;
        }

        match self.endpoint.delete(&mut self.client, id) {
            Ok(_) => {
                info!(id, "pad deleted");
                self.fetch_page(None);
                Outcome::Completed
            }
            Err(err) => self.report("delete pad", err),
        }
    }

    // --- Export & display ---

    pub fn export_csv(&self) -> crate::error::Result<CsvExport> {
        let export = export_csv(&self.columns, &self.list.items, Utc::now().date_naive())?;
        info!(file = %export.filename, rows = export.rows, "pads exported");
        Ok(export)
    }

    pub fn relative_time(&self, timestamp: &DateTime<Utc>) -> String {
        timefmt::relative_time(timestamp)
    }

    fn report(&mut self, action: &str, err: ChaospadError) -> Outcome {
        warn!(action, error = %err, "request failed");
        self.notifier.notify_error(&err);
        Outcome::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::memory::fixtures::{backend_with, numbered_pads};
    use crate::client::memory::InMemoryBackend;
    use crate::client::Method;
    use crate::notify::RecordingNotifier;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    type TestPanel = PadsAdminPanel<InMemoryBackend, RecordingNotifier>;

    fn panel_with(backend: InMemoryBackend, notifier: RecordingNotifier) -> TestPanel {
        PadsAdminPanel::new(backend, notifier, PanelSettings::default())
    }

    fn mounted(count: usize) -> TestPanel {
        let mut panel = panel_with(backend_with(count), RecordingNotifier::accepting());
        assert!(panel.fetch_page(None).is_completed());
        panel.client_mut().clear_requests();
        panel
    }

    #[test]
    fn mount_fetches_first_page_once() {
        let panel = PadsAdminPanel::mount(
            backend_with(12),
            RecordingNotifier::default(),
            PanelSettings::default(),
        );
        assert_eq!(panel.client().count(Method::Get), 1);
        assert_eq!(panel.items().len(), 10);
        assert_eq!(panel.pagination().total_count, 12);
        assert_eq!(panel.items()[0].name, "Pad 12");
    }

    #[test]
    fn list_response_fills_items_and_total() {
        let backend = InMemoryBackend::new();
        let mut panel = panel_with(backend, RecordingNotifier::default());
        let pad: Pad = serde_json::from_value(json!({
            "id": 1, "name": "A", "content": "x", "updated_at": "2024-01-01"
        }))
        .unwrap();
        panel.client_mut().insert(pad);

        assert!(panel.fetch_page(None).is_completed());
        assert_eq!(panel.items().len(), 1);
        assert_eq!(panel.pagination().total_count, 1);
    }

    #[test]
    fn create_dialog_starts_blank() {
        let mut panel = mounted(1);
        panel.draft_mut().name = Some("leftover".into());
        panel.open_create_dialog();
        assert!(panel.form().visible);
        assert_eq!(panel.form().draft, PadDraft::blank());
    }

    #[test]
    fn edit_dialog_copies_without_aliasing() {
        let mut panel = mounted(2);
        let record = panel.items()[0].clone();
        panel.open_edit_dialog(&record);

        assert_eq!(panel.form().draft, PadDraft::from(&record));
        panel.draft_mut().name = Some("Changed".into());
        assert_eq!(panel.items()[0].name, record.name);
    }

    #[test]
    fn save_new_draft_posts_with_empty_extra() {
        let mut panel = mounted(0);
        panel.open_create_dialog();
        panel.draft_mut().name = Some("B".into());

        assert!(panel.save_draft().is_completed());

        let requests = panel.client().requests();
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[0].path, "/chaospad/api/v1/pads");
        assert_eq!(requests[0].body, Some(json!({"extra": {}, "name": "B"})));
        assert_eq!(requests[1].method, Method::Get);
        assert!(requests[1].path.starts_with("/chaospad/api/v1/pads/paginated?"));

        assert!(!panel.form().visible);
        assert_eq!(panel.items().len(), 1);
        assert_eq!(panel.items()[0].name, "B");
    }

    #[test]
    fn save_existing_draft_puts_to_record() {
        let mut panel = mounted(3);
        let record = panel.items()[1].clone();
        panel.open_edit_dialog(&record);
        panel.draft_mut().content = Some("edited".into());

        assert!(panel.save_draft().is_completed());

        let put = &panel.client().requests()[0];
        assert_eq!(put.method, Method::Put);
        assert_eq!(put.path, format!("/chaospad/api/v1/pads/{}", record.id));
        let body = put.body.as_ref().unwrap();
        assert_eq!(body["content"], "edited");
        assert_eq!(body["extra"], json!({}));
        assert_eq!(
            panel.item(&record.id).and_then(|p| p.content.as_deref()),
            Some("edited")
        );
    }

    #[test]
    fn failed_save_keeps_dialog_and_draft() {
        let mut panel = mounted(0);
        panel.open_create_dialog();
        panel.draft_mut().name = Some("Retry me".into());
        panel
            .client_mut()
            .fail_next(ChaospadError::api(400, "Content exceeds 6000 characters."));

        assert_eq!(panel.save_draft(), Outcome::Failed);
        assert!(panel.form().visible);
        assert_eq!(panel.form().draft.name.as_deref(), Some("Retry me"));
        assert_eq!(
            panel.notifier().errors,
            vec!["Content exceeds 6000 characters."]
        );
        assert_eq!(panel.client().count(Method::Get), 0);

        assert!(panel.save_draft().is_completed());
        assert!(!panel.form().visible);
    }

    #[test]
    fn loading_is_raised_only_while_fetching() {
        let mut panel = mounted(2);
        let flag = panel.loading_flag();
        panel.client_mut().observe_loading(flag.clone());
        assert!(!flag.is_loading());

        panel.fetch_page(None);
        assert_eq!(panel.client().requests()[0].loading, Some(true));
        assert!(!panel.is_loading());

        panel.client_mut().fail_next(ChaospadError::api(500, "down"));
        assert_eq!(panel.fetch_page(None), Outcome::Failed);
        assert_eq!(panel.client().requests()[1].loading, Some(true));
        assert!(!panel.is_loading());
    }

    #[test]
    fn failed_fetch_keeps_previous_items() {
        let mut panel = mounted(3);
        let before = panel.items().to_vec();
        panel.client_mut().fail_next(ChaospadError::api(503, "Service Unavailable"));

        assert_eq!(panel.request_page(PageRequest::page(2)), Outcome::Failed);
        assert_eq!(panel.items(), before.as_slice());
        assert_eq!(panel.notifier().errors.len(), 1);
    }

    #[test]
    fn declined_delete_sends_nothing() {
        let mut panel = panel_with(backend_with(2), RecordingNotifier::declining());
        panel.fetch_page(None);
        panel.client_mut().clear_requests();

        assert_eq!(panel.delete_record("p1"), Outcome::Declined);
        assert!(panel.client().requests().is_empty());
        assert_eq!(panel.notifier().questions, vec![DELETE_CONFIRMATION]);
        assert_eq!(panel.items().len(), 2);

        panel.notifier_mut().set_answer(true);
        assert!(panel.delete_record("p1").is_completed());
        assert_eq!(panel.client().count(Method::Delete), 1);
    }

    #[test]
    fn confirmed_delete_refetches_once() {
        let mut panel = mounted(2);
        assert!(panel.delete_record("p1").is_completed());

        let requests = panel.client().requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, Method::Delete);
        assert_eq!(requests[0].path, "/chaospad/api/v1/pads/p1");
        assert_eq!(requests[1].method, Method::Get);
        assert_eq!(panel.items().len(), 1);
        assert!(panel.item("p1").is_none());
    }

    #[test]
    fn failed_delete_leaves_state_alone() {
        let mut panel = mounted(2);
        panel.client_mut().fail_next(ChaospadError::api(403, "You do not own this pads."));

        assert_eq!(panel.delete_record("p1"), Outcome::Failed);
        assert_eq!(panel.client().count(Method::Get), 0);
        assert_eq!(panel.items().len(), 2);
        assert_eq!(panel.notifier().errors, vec!["You do not own this pads."]);
    }

    #[test]
    fn delete_with_failed_refetch_still_reports_the_error() {
        let mut panel = mounted(2);
        panel
            .client_mut()
            .fail_next_on(Method::Get, ChaospadError::api(500, "db down"));

        assert!(panel.delete_record("p1").is_completed());
        assert!(panel.client().pads().iter().all(|p| p.id != "p1"));
        assert_eq!(panel.notifier().errors, vec!["db down"]);
        assert_eq!(panel.items().len(), 2);
    }

    #[test]
    fn relative_time_describes_past_timestamps() {
        let panel = mounted(0);
        let earlier = Utc::now() - chrono::Duration::hours(3);
        assert_eq!(panel.relative_time(&earlier), "3 hours ago");
    }

    #[test]
    fn search_change_refetches_with_search_param() {
        let mut panel = mounted(12);
        assert!(panel.set_search_term("Pad 1").is_completed());

        let path = &panel.client().requests()[0].path;
        assert!(path.ends_with("&search=Pad+1"), "unexpected path {path}");
        // "Pad 1", "Pad 10", "Pad 11", "Pad 12"
        assert_eq!(panel.pagination().total_count, 4);
    }

    #[test]
    fn same_search_term_does_not_refetch() {
        let mut panel = mounted(2);
        panel.set_search_term("x");
        panel.client_mut().clear_requests();

        assert_eq!(panel.set_search_term("x"), Outcome::Unchanged);
        assert!(panel.client().requests().is_empty());
    }

    #[test]
    fn clearing_search_omits_param() {
        let mut panel = mounted(2);
        panel.set_search_term("Pad");
        panel.set_search_term("");
        let last = panel.client().requests().last().unwrap();
        assert!(!last.path.contains("search"));
    }

    #[test]
    fn search_subscribers_are_notified() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut panel = mounted(1);
        panel.on_search_change(move |term| sink.borrow_mut().push(term.clone()));

        panel.set_search_term("a");
        panel.set_search_term("a");
        panel.set_search_term("ab");
        assert_eq!(*seen.borrow(), vec!["a", "ab"]);
    }

    #[test]
    fn page_request_updates_query() {
        let mut panel = mounted(25);
        let request = PageRequest::page(3).with_page_size(5).with_sort("name", false);
        assert!(panel.request_page(request).is_completed());

        let path = &panel.client().requests()[0].path;
        assert!(path.contains("limit=5&offset=10&sortby=name&direction=asc"));
        assert_eq!(panel.items().len(), 5);
        assert_eq!(panel.pagination().page, 3);
    }

    #[test]
    fn page_past_the_end_is_empty_not_a_panic() {
        let mut panel = mounted(3);
        assert!(panel.request_page(PageRequest::page(usize::MAX)).is_completed());
        assert!(panel.items().is_empty());
        assert_eq!(panel.pagination().total_count, 3);
    }

    #[test]
    fn export_covers_loaded_page_only() {
        let mut panel = mounted(15);
        assert_eq!(panel.items().len(), 10);
        assert_eq!(panel.pagination().total_count, 15);

        let export = panel.export_csv().unwrap();
        assert_eq!(export.rows, panel.items().len());
        assert!(export.filename.starts_with("pads_"));
        assert!(export.filename.ends_with(".csv"));
        assert!(panel.client().requests().is_empty());
    }

    #[test]
    fn initial_search_applies_to_mount() {
        let settings = PanelSettings {
            search: "Pad 1".into(),
            ..PanelSettings::default()
        };
        let mut panel = PadsAdminPanel::mount(backend_with(12), RecordingNotifier::default(), settings);

        assert_eq!(panel.client().count(Method::Get), 1);
        assert!(panel.client().requests()[0].path.ends_with("&search=Pad+1"));
        assert_eq!(panel.pagination().total_count, 4);
        assert_eq!(panel.set_search_term("Pad 1"), Outcome::Unchanged);
    }

    #[test]
    fn open_edit_dialog_for_loads_record() {
        let mut panel = mounted(0);
        panel.client_mut().insert(numbered_pads(1).remove(0));

        assert!(panel.open_edit_dialog_for("p1").is_completed());
        assert_eq!(panel.form().draft.id.as_deref(), Some("p1"));

        assert_eq!(panel.open_edit_dialog_for("missing"), Outcome::Failed);
        assert_eq!(panel.notifier().errors, vec!["Pads not found."]);
    }

    #[test]
    fn close_dialog_discards_draft() {
        let mut panel = mounted(1);
        panel.open_create_dialog();
        panel.draft_mut().name = Some("unsaved".into());
        panel.close_dialog();

        assert!(!panel.form().visible);
        assert_eq!(panel.form().draft, PadDraft::blank());
        assert!(panel.client().requests().is_empty());
    }

    #[test]
    fn custom_settings_shape_the_first_query() {
        let settings = PanelSettings {
            api_base: "/ext/v2".into(),
            pagination: Pagination {
                page_size: 3,
                ..Pagination::default()
            },
            ..PanelSettings::default()
        };
        let backend = backend_with(4).with_api_base("/ext/v2");
        let panel = PadsAdminPanel::mount(backend, RecordingNotifier::default(), settings);

        assert_eq!(
            panel.client().requests()[0].path,
            "/ext/v2/pads/paginated?limit=3&offset=0&sortby=updated_at&direction=desc"
        );
        assert_eq!(panel.items().len(), 3);
    }
}
