use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::api::{ClientError, Task};
use crate::session::Session;

/// Which screen the client shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Tasks,
}

/// Edit lifecycle of one task row's due-date control
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowState {
    Idle,
    /// A date was picked locally but not persisted yet
    PendingEdit(DateTime<Utc>),
    /// The pending date is on its way to the server
    Saving(DateTime<Utc>),
}

/// Client-local state. The task list is a cache of the server's answer,
/// refreshed after every mutation.
pub struct App {
    pub view: View,
    pub tasks: Vec<Task>,
    pub selected: usize,
    pub loading: bool,
    pub notice: Option<String>,
    row_states: HashMap<String, RowState>,
}

impl App {
    pub fn new(logged_in: bool) -> Self {
        Self {
            view: if logged_in { View::Tasks } else { View::Login },
            tasks: Vec::new(),
            selected: 0,
            loading: false,
            notice: None,
            row_states: HashMap::new(),
        }
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.tasks.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.tasks.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn set_notice(&mut self, notice: String) {
        self.notice = Some(notice);
    }

    /// Row state, Idle unless an edit is in flight. The pending value is
    /// never seeded from the task's persisted due date.
    pub fn row_state(&self, task_id: &str) -> RowState {
        self.row_states
            .get(task_id)
            .cloned()
            .unwrap_or(RowState::Idle)
    }

    /// Pick a date for one row. A row mid-save is left alone.
    pub fn set_pending_due_date(&mut self, task_id: &str, date: DateTime<Utc>) {
        match self.row_state(task_id) {
            RowState::Saving(_) => {}
            _ => {
                self.row_states
                    .insert(task_id.to_string(), RowState::PendingEdit(date));
            }
        }
    }

    /// PendingEdit -> Saving; hands back the date to send
    pub fn begin_save(&mut self, task_id: &str) -> Option<DateTime<Utc>> {
        if let RowState::PendingEdit(date) = self.row_state(task_id) {
            self.row_states
                .insert(task_id.to_string(), RowState::Saving(date));
            Some(date)
        } else {
            None
        }
    }

    /// Server acknowledged: the row returns to Idle, pending value gone
    pub fn save_succeeded(&mut self, task_id: &str) {
        self.row_states.remove(task_id);
    }

    /// Save failed without an auth problem: keep the unsaved selection
    pub fn save_failed(&mut self, task_id: &str) {
        if let RowState::Saving(date) = self.row_state(task_id) {
            self.row_states
                .insert(task_id.to_string(), RowState::PendingEdit(date));
        }
    }

    /// Apply the result of a list fetch
    pub fn apply_fetch(&mut self, session: &mut Session, result: Result<Vec<Task>, ClientError>) {
        self.loading = false;
        match result {
            Ok(tasks) => {
                self.tasks = tasks;
                if self.selected >= self.tasks.len() {
                    self.selected = self.tasks.len().saturating_sub(1);
                }
                // Forget pending edits for rows that no longer exist
                let ids: Vec<String> = self.tasks.iter().map(|t| t.id.clone()).collect();
                self.row_states.retain(|id, _| ids.contains(id));
            }
            Err(ClientError::Unauthorized) => self.log_out(session),
            Err(err) => self.set_notice(err.to_string()),
        }
    }

    /// React to a failed mutation; 401 logs the whole client out
    pub fn apply_mutation_error(&mut self, session: &mut Session, err: ClientError) {
        match err {
            ClientError::Unauthorized => self.log_out(session),
            other => self.set_notice(other.to_string()),
        }
    }

    /// Single exit to the login view: token dropped, local cache cleared
    pub fn log_out(&mut self, session: &mut Session) {
        session.invalidate();
        self.view = View::Login;
        self.tasks.clear();
        self.row_states.clear();
        self.selected = 0;
        self.set_notice("Session expired - sign in again".to_string());
    }

    /// Accept a pasted token and switch to the task list
    pub fn log_in(&mut self, session: &mut Session, token: String) {
        session.set_token(token);
        self.view = View::Tasks;
        self.notice = None;
    }
}

/// Accept "YYYY-MM-DD HH:MM" or a bare "YYYY-MM-DD" (midnight)
pub fn parse_due_date(input: &str) -> Option<DateTime<Utc>> {
    let trimmed = input.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, due_date: Option<&str>) -> Task {
        Task {
            id: id.to_string(),
            description: format!("task {}", id),
            due_date: due_date.map(|raw| {
                DateTime::parse_from_rfc3339(raw)
                    .unwrap()
                    .with_timezone(&Utc)
            }),
        }
    }

    fn app_with_tasks(tasks: Vec<Task>) -> App {
        let mut app = App::new(true);
        app.tasks = tasks;
        app
    }

    #[test]
    fn pending_edit_is_never_seeded_from_persisted_due_date() {
        let app = app_with_tasks(vec![task("t1", Some("2025-03-01T10:00:00Z"))]);
        assert_eq!(app.row_state("t1"), RowState::Idle);
    }

    #[test]
    fn row_walks_the_edit_lifecycle() {
        let mut app = app_with_tasks(vec![task("t1", None)]);
        let date = parse_due_date("2025-03-01 10:00").unwrap();

        app.set_pending_due_date("t1", date);
        assert_eq!(app.row_state("t1"), RowState::PendingEdit(date));

        let to_send = app.begin_save("t1");
        assert_eq!(to_send, Some(date));
        assert_eq!(app.row_state("t1"), RowState::Saving(date));

        app.save_succeeded("t1");
        assert_eq!(app.row_state("t1"), RowState::Idle);
    }

    #[test]
    fn failed_save_keeps_the_pending_selection() {
        let mut app = app_with_tasks(vec![task("t1", None)]);
        let date = parse_due_date("2025-03-01 10:00").unwrap();

        app.set_pending_due_date("t1", date);
        app.begin_save("t1");
        app.save_failed("t1");
        assert_eq!(app.row_state("t1"), RowState::PendingEdit(date));
    }

    #[test]
    fn unauthorized_fetch_logs_the_client_out() {
        let mut session = Session::with_token(Some("tok"));
        let mut app = app_with_tasks(vec![task("t1", None)]);

        app.apply_fetch(&mut session, Err(ClientError::Unauthorized));

        assert_eq!(app.view, View::Login);
        assert!(app.tasks.is_empty());
        assert_eq!(session.token(), None);
    }

    #[test]
    fn non_auth_fetch_error_leaves_the_list_alone() {
        let mut session = Session::with_token(Some("tok"));
        let mut app = app_with_tasks(vec![task("t1", None)]);

        app.apply_fetch(
            &mut session,
            Err(ClientError::Api {
                status: 500,
                message: "boom".to_string(),
            }),
        );

        assert_eq!(app.view, View::Tasks);
        assert_eq!(app.tasks.len(), 1);
        assert!(app.notice.is_some());
        assert_eq!(session.token(), Some("tok"));
    }

    #[test]
    fn successful_fetch_clamps_selection_and_prunes_stale_edits() {
        let mut session = Session::with_token(Some("tok"));
        let mut app = app_with_tasks(vec![
            task("t1", None),
            task("t2", None),
            task("t3", None),
        ]);
        app.selected = 2;
        app.set_pending_due_date("t3", parse_due_date("2025-03-01").unwrap());

        app.apply_fetch(&mut session, Ok(vec![task("t1", None)]));

        assert_eq!(app.selected, 0);
        assert_eq!(app.row_state("t3"), RowState::Idle);
    }

    #[test]
    fn parse_due_date_accepts_both_forms() {
        assert!(parse_due_date("2025-03-01 10:00").is_some());
        assert!(parse_due_date("2025-03-01").is_some());
        assert!(parse_due_date("soon").is_none());
        assert!(parse_due_date("2025-13-01").is_none());
    }
}
