use arboard::Clipboard;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::widgets::ListState;
use std::time::{Duration, Instant};

use crate::api::{ApiClient, ApiError};
use crate::assignments::AssignmentEditor;
use crate::auth::Session;
use crate::dates::{DAY_NAMES, WeekRange, parse_week_input};
use crate::models::{Employee, Project, RoleCatalogEntry};
use crate::storage;
use crate::timesheet::TimesheetEditor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Timesheet,
    Assignments,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Login,
    Loading,
    Browse,
    EmployeeSelect,
    ProjectSelect(PickTarget),
    RoleSelect,
    WeekInput,
    CellInput,
    NotesInput,
    TicketInput,
    RateInput(u64),
    HoursInput,
    Error,
}

/// What a project pick is for: setting the current sheet row's project, or
/// changing the assignments scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickTarget {
    RowProject,
    Scope,
}

pub struct App {
    pub should_quit: bool,
    pub needs_refresh: bool,
    pub mode: Mode,
    pub view: View,
    pub status: Option<String>,
    pub input: String,
    pub show_help: bool,

    server_url: String,
    pub session: Option<Session>,
    api: Option<ApiClient>,

    pub employees: Vec<Employee>,
    pub employee_state: ListState,
    pub selected_employee: Option<Employee>,
    pub projects: Vec<Project>,
    pub project_state: ListState,
    pub selected_project: Option<Project>,
    pub role_catalog: Vec<RoleCatalogEntry>,
    pub role_state: ListState,
    pending_role: Option<RoleCatalogEntry>,

    pub week: WeekRange,
    pub sheet: Option<TimesheetEditor>,
    pub cursor_row: usize,
    pub cursor_day: usize,

    pub assign_editor: Option<AssignmentEditor>,
    pub assign_role_cursor: usize,
    pub assign_emp_cursor: usize,

    toast: Option<Toast>,
}

impl App {
    pub fn new(server_url: String, week: WeekRange, force_login: bool) -> Self {
        let token = if force_login { None } else { storage::read_token() };
        let session = token.as_deref().and_then(|t| Session::from_token(t).ok());
        let mode = if session.is_some() { Mode::Loading } else { Mode::Login };

        let mut employee_state = ListState::default();
        employee_state.select(Some(0));
        let mut project_state = ListState::default();
        project_state.select(Some(0));
        let mut role_state = ListState::default();
        role_state.select(Some(0));

        App {
            should_quit: false,
            needs_refresh: session.is_some(),
            mode,
            view: View::Timesheet,
            status: None,
            input: String::new(),
            show_help: false,
            server_url,
            session,
            api: None,
            employees: Vec::new(),
            employee_state,
            selected_employee: None,
            projects: Vec::new(),
            project_state,
            selected_project: None,
            role_catalog: Vec::new(),
            role_state,
            pending_role: None,
            week,
            sheet: None,
            cursor_row: 0,
            cursor_day: 0,
            assign_editor: None,
            assign_role_cursor: 0,
            assign_emp_cursor: 0,
            toast: None,
        }
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if self.show_help {
            match key.code {
                KeyCode::Char('h') | KeyCode::Esc => self.show_help = false,
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            }
            return;
        }

        match self.mode {
            Mode::Login => self.handle_login_input(key),
            Mode::EmployeeSelect => self.handle_employee_select(key),
            Mode::ProjectSelect(target) => self.handle_project_select(target, key),
            Mode::RoleSelect => self.handle_role_select(key),
            Mode::WeekInput | Mode::CellInput | Mode::NotesInput | Mode::TicketInput
            | Mode::HoursInput => self.handle_text_input(key),
            Mode::RateInput(_) => self.handle_text_input(key),
            Mode::Browse | Mode::Loading | Mode::Error => match self.view {
                View::Timesheet => self.handle_timesheet_input(key),
                View::Assignments => self.handle_assignments_input(key),
            },
        }
    }

    // ---- data loading -------------------------------------------------

    pub fn refresh_data(&mut self) {
        self.needs_refresh = false;
        self.status = None;

        let Some(session) = self.session.clone() else {
            self.mode = Mode::Login;
            return;
        };

        if self.api.is_none() {
            match ApiClient::new(self.server_url.clone(), session.token.clone()) {
                Ok(api) => self.api = Some(api),
                Err(err) => {
                    self.handle_api_error(err);
                    return;
                }
            }
        }
        let Some(api) = self.api.clone() else { return };

        if self.employees.is_empty() {
            match api.fetch_employees() {
                Ok(employees) => self.employees = employees,
                Err(err) => {
                    self.handle_api_error(err);
                    return;
                }
            }
        }
        if self.projects.is_empty() {
            match api.fetch_projects() {
                Ok(projects) => self.projects = projects,
                Err(err) => {
                    self.handle_api_error(err);
                    return;
                }
            }
        }
        if self.role_catalog.is_empty() && session.can_manage_projects() {
            match api.fetch_role_catalog() {
                Ok(roles) => self.role_catalog = roles,
                Err(err) => {
                    self.handle_api_error(err);
                    return;
                }
            }
        }

        if self.selected_employee.is_none() {
            self.restore_scope(&session);
        }
        if self.selected_employee.is_none() {
            if let Some(own_id) = session.employee_id {
                self.selected_employee =
                    self.employees.iter().find(|e| e.id == own_id).cloned();
            }
        }
        if self.selected_employee.is_none() {
            if session.can_manage_projects() && !self.employees.is_empty() {
                self.mode = Mode::EmployeeSelect;
                return;
            }
            self.mode = Mode::Error;
            self.status = Some("No employee scope available for this account.".to_string());
            return;
        }

        match self.view {
            View::Timesheet => self.load_timesheet(&api),
            View::Assignments => self.load_assignments(&api),
        }
    }

    fn restore_scope(&mut self, session: &Session) {
        let Some(scope) = storage::read_last_scope(&session.token) else {
            return;
        };
        if let Some(employee_id) = scope.employee_id {
            self.selected_employee = self.employees.iter().find(|e| e.id == employee_id).cloned();
        }
        if let Some(monday) = scope.week_monday {
            self.week = WeekRange::containing(monday);
        }
        if let Some(project_id) = scope.project_id {
            self.selected_project = self.projects.iter().find(|p| p.id == project_id).cloned();
        }
    }

    fn persist_scope(&self) {
        if let Some(session) = &self.session {
            let _ = storage::write_last_scope(
                &session.token,
                self.selected_employee.as_ref().map(|e| e.id),
                Some(self.week.monday()),
                self.selected_project.as_ref().map(|p| p.id),
            );
        }
    }

    fn load_timesheet(&mut self, api: &ApiClient) {
        let Some(employee) = self.selected_employee.clone() else {
            return;
        };
        match api.fetch_week_entries(employee.id, self.week.monday()) {
            Ok(entries) => {
                self.sheet = Some(TimesheetEditor::load(employee.id, self.week, entries));
                self.cursor_row = 0;
                self.cursor_day = 0;
                self.mode = Mode::Browse;
                self.persist_scope();
            }
            Err(err) => self.handle_api_error(err),
        }
    }

    fn load_assignments(&mut self, api: &ApiClient) {
        let Some(project) = self.selected_project.clone() else {
            self.mode = Mode::ProjectSelect(PickTarget::Scope);
            return;
        };
        match api.fetch_assignments(project.id) {
            Ok(records) => {
                self.assign_editor = Some(AssignmentEditor::load(project.id, records));
                self.assign_role_cursor = 0;
                self.assign_emp_cursor = 0;
                self.mode = Mode::Browse;
                self.persist_scope();
            }
            Err(err) => self.handle_api_error(err),
        }
    }

    fn handle_api_error(&mut self, err: ApiError) {
        if err.requires_login() {
            let _ = storage::clear_token();
            self.session = None;
            self.api = None;
            self.mode = Mode::Login;
            self.status = Some(err.message());
            return;
        }
        self.mode = Mode::Error;
        self.status = Some(err.message());
    }

    // ---- scope changes ------------------------------------------------

    /// A scope change throws the editor away: baseline, working set, pending
    /// deletions and validation messages all reset, then a fresh fetch runs.
    fn change_week(&mut self, week: WeekRange) {
        self.week = week;
        self.sheet = None;
        self.status = None;
        self.mode = Mode::Loading;
        self.needs_refresh = true;
    }

    fn change_employee(&mut self, employee: Employee) {
        self.selected_employee = Some(employee);
        self.sheet = None;
        self.status = None;
        self.mode = Mode::Loading;
        self.needs_refresh = true;
    }

    fn change_project(&mut self, project: Project) {
        self.selected_project = Some(project);
        self.assign_editor = None;
        self.status = None;
        self.mode = Mode::Loading;
        self.needs_refresh = true;
    }

    // ---- saving -------------------------------------------------------

    fn save_timesheet(&mut self) {
        let Some(api) = self.api.clone() else { return };
        let Some(sheet) = self.sheet.as_mut() else { return };

        // A grid that fails validation never reaches the network, so it
        // reads as a plain message rather than a save error.
        let plan = match sheet.build_save_plan() {
            Ok(plan) => plan,
            Err(message) => {
                self.status = Some(message);
                self.set_toast("Fix the week before saving", true);
                return;
            }
        };

        match sheet.save(&api, plan) {
            Ok(report) => {
                if report.delete_failures.is_empty() {
                    self.status = None;
                    self.set_toast(
                        format!(
                            "Saved: {} created, {} updated, {} deleted",
                            report.created, report.updated, report.deleted
                        ),
                        false,
                    );
                } else {
                    let ids: Vec<String> = report
                        .delete_failures
                        .iter()
                        .map(|id| id.to_string())
                        .collect();
                    self.status =
                        Some(format!("Some rows could not be deleted: {}", ids.join(", ")));
                    self.set_toast("Saved with delete failures", true);
                }
                if self.cursor_row >= self.sheet.as_ref().map_or(0, |s| s.rows.len()) {
                    self.cursor_row = 0;
                }
            }
            Err(err) => {
                if err.requires_login() {
                    self.handle_api_error(err);
                    return;
                }
                // Edits stay in place; the user can retry or reload.
                self.status = Some(format!(
                    "{} Your edits are kept; retry, or reload the week if the save partially applied.",
                    err.message()
                ));
                self.set_toast("Save failed", true);
            }
        }
    }

    fn save_assignments(&mut self) {
        let Some(api) = self.api.clone() else { return };
        let Some(editor) = self.assign_editor.as_mut() else { return };

        match editor.save(&api) {
            Ok(ops) => {
                self.status = None;
                self.set_toast(format!("Saved ({ops} operations)"), false);
                self.assign_role_cursor = 0;
            }
            Err(err) => {
                if err.requires_login() {
                    self.handle_api_error(err);
                    return;
                }
                self.status = Some(format!(
                    "{} The project may be partially updated; reopen it to resync.",
                    err.message()
                ));
                self.set_toast("Save failed", true);
            }
        }
    }

    // ---- login --------------------------------------------------------

    fn handle_login_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                let token = self.input.trim().to_string();
                if token.is_empty() {
                    return;
                }
                match Session::from_token(&token) {
                    Ok(session) => {
                        if let Err(err) = storage::write_token(&token) {
                            self.status = Some(format!("Failed to save token: {err}"));
                            return;
                        }
                        self.session = Some(session);
                        self.api = None;
                        self.input.clear();
                        self.status = None;
                        self.mode = Mode::Loading;
                        self.needs_refresh = true;
                    }
                    Err(message) => self.status = Some(message),
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => self.input.push(ch),
            KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    // ---- pickers ------------------------------------------------------

    fn handle_employee_select(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up => move_selection(&mut self.employee_state, self.employees.len(), -1),
            KeyCode::Down => move_selection(&mut self.employee_state, self.employees.len(), 1),
            KeyCode::Enter => {
                if let Some(employee) = self
                    .employee_state
                    .selected()
                    .and_then(|index| self.employees.get(index))
                    .cloned()
                {
                    self.change_employee(employee);
                }
            }
            KeyCode::Esc => {
                if self.selected_employee.is_some() {
                    self.mode = Mode::Browse;
                } else {
                    self.should_quit = true;
                }
            }
            _ => {}
        }
    }

    fn handle_project_select(&mut self, target: PickTarget, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up => move_selection(&mut self.project_state, self.projects.len(), -1),
            KeyCode::Down => move_selection(&mut self.project_state, self.projects.len(), 1),
            KeyCode::Enter => {
                let Some(project) = self
                    .project_state
                    .selected()
                    .and_then(|index| self.projects.get(index))
                    .cloned()
                else {
                    return;
                };
                match target {
                    PickTarget::Scope => self.change_project(project),
                    PickTarget::RowProject => {
                        if let Some(sheet) = self.sheet.as_mut() {
                            if let Some(row) = sheet.rows.get_mut(self.cursor_row) {
                                row.project_id = Some(project.id);
                                row.company_id = project.company_id;
                            }
                        }
                        self.mode = Mode::Browse;
                    }
                }
            }
            KeyCode::Esc => self.mode = Mode::Browse,
            _ => {}
        }
    }

    fn handle_role_select(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up => move_selection(&mut self.role_state, self.role_catalog.len(), -1),
            KeyCode::Down => move_selection(&mut self.role_state, self.role_catalog.len(), 1),
            KeyCode::Enter => {
                if let Some(role) = self
                    .role_state
                    .selected()
                    .and_then(|index| self.role_catalog.get(index))
                    .cloned()
                {
                    self.pending_role = Some(role);
                    self.input.clear();
                    self.mode = Mode::HoursInput;
                }
            }
            KeyCode::Esc => self.mode = Mode::Browse,
            _ => {}
        }
    }

    // ---- text input overlays ------------------------------------------

    fn handle_text_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.commit_text_input(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => self.input.push(ch),
            KeyCode::Esc => {
                self.input.clear();
                self.pending_role = None;
                self.mode = Mode::Browse;
            }
            _ => {}
        }
    }

    fn commit_text_input(&mut self) {
        match self.mode {
            Mode::WeekInput => match parse_week_input(&self.input) {
                Ok(week) => {
                    self.input.clear();
                    self.change_week(week);
                }
                Err(message) => self.status = Some(message),
            },
            Mode::CellInput => {
                let input = self.input.clone();
                let (row, day) = (self.cursor_row, self.cursor_day);
                if let Some(sheet) = self.sheet.as_mut() {
                    match sheet.set_hours(row, day, &input) {
                        Ok(()) => {
                            self.input.clear();
                            self.status = None;
                            self.mode = Mode::Browse;
                        }
                        Err(message) => self.status = Some(message),
                    }
                }
            }
            Mode::NotesInput | Mode::TicketInput => {
                let value = if self.input.trim().is_empty() {
                    None
                } else {
                    Some(self.input.trim().to_string())
                };
                let row = self.cursor_row;
                let editing_notes = self.mode == Mode::NotesInput;
                if let Some(sheet) = self.sheet.as_mut() {
                    if editing_notes {
                        sheet.set_notes(row, value);
                    } else {
                        sheet.set_ticket(row, value);
                    }
                }
                self.input.clear();
                self.mode = Mode::Browse;
            }
            Mode::RateInput(employee_id) => {
                let input = self.input.clone();
                let index = self.assign_role_cursor;
                if let Some(editor) = self.assign_editor.as_mut() {
                    match editor.set_rate(index, employee_id, &input) {
                        Ok(()) => {
                            self.input.clear();
                            self.status = None;
                            self.mode = Mode::Browse;
                        }
                        Err(message) => self.status = Some(message),
                    }
                }
            }
            Mode::HoursInput => {
                let parsed: Result<u32, _> = self.input.trim().parse();
                match parsed {
                    Ok(hours) if hours > 0 => {
                        if let Some(role) = self.pending_role.take() {
                            if let Some(editor) = self.assign_editor.as_mut() {
                                match editor.add_role(role.id, role.name, hours) {
                                    Ok(()) => {
                                        self.assign_role_cursor =
                                            editor.roles.len().saturating_sub(1);
                                        self.status = None;
                                    }
                                    Err(message) => self.status = Some(message),
                                }
                            }
                        } else if let Some(editor) = self.assign_editor.as_mut() {
                            editor.set_estimated_hours(self.assign_role_cursor, hours);
                            self.status = None;
                        }
                        self.input.clear();
                        self.mode = Mode::Browse;
                    }
                    _ => self.status = Some("Estimated hours must be a positive integer".to_string()),
                }
            }
            _ => {}
        }
    }

    // ---- timesheet view -----------------------------------------------

    fn handle_timesheet_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('h') => self.show_help = true,
            KeyCode::Char('r') => {
                self.sheet = None;
                self.mode = Mode::Loading;
                self.needs_refresh = true;
            }
            KeyCode::Tab => self.switch_view(View::Assignments),
            KeyCode::Up => self.cursor_row = self.cursor_row.saturating_sub(1),
            KeyCode::Down => {
                let rows = self.sheet.as_ref().map_or(0, |s| s.rows.len());
                if rows > 0 && self.cursor_row + 1 < rows {
                    self.cursor_row += 1;
                }
            }
            KeyCode::Left => self.cursor_day = self.cursor_day.saturating_sub(1),
            KeyCode::Right => {
                if self.cursor_day + 1 < 7 {
                    self.cursor_day += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                if let Some(sheet) = &self.sheet {
                    if let Some(row) = sheet.rows.get(self.cursor_row) {
                        self.input = row.hours[self.cursor_day].display();
                        self.mode = Mode::CellInput;
                    }
                }
            }
            KeyCode::Char('n') => {
                if let Some(sheet) = &self.sheet {
                    if let Some(row) = sheet.rows.get(self.cursor_row) {
                        self.input = row.notes.clone().unwrap_or_default();
                        self.mode = Mode::NotesInput;
                    }
                }
            }
            KeyCode::Char('t') => {
                if let Some(sheet) = &self.sheet {
                    if let Some(row) = sheet.rows.get(self.cursor_row) {
                        self.input = row.ticket.clone().unwrap_or_default();
                        self.mode = Mode::TicketInput;
                    }
                }
            }
            KeyCode::Char('b') => {
                let row = self.cursor_row;
                if let Some(sheet) = self.sheet.as_mut() {
                    sheet.cycle_billable(row);
                }
            }
            KeyCode::Char('p') => {
                if self.sheet.as_ref().is_some_and(|s| !s.rows.is_empty()) {
                    self.mode = Mode::ProjectSelect(PickTarget::RowProject);
                }
            }
            KeyCode::Char('a') => {
                if let Some(sheet) = self.sheet.as_mut() {
                    sheet.add_row(None, None);
                    self.cursor_row = sheet.rows.len() - 1;
                }
            }
            KeyCode::Char('x') => {
                let row = self.cursor_row;
                if let Some(sheet) = self.sheet.as_mut() {
                    sheet.remove_row(row);
                    if self.cursor_row >= sheet.rows.len() && self.cursor_row > 0 {
                        self.cursor_row -= 1;
                    }
                }
            }
            KeyCode::Char('s') => self.save_timesheet(),
            KeyCode::Char('[') => self.change_week(self.week.prev()),
            KeyCode::Char(']') => self.change_week(self.week.next()),
            KeyCode::Char('w') => {
                self.input.clear();
                self.mode = Mode::WeekInput;
            }
            KeyCode::Char('u') => {
                if self.session.as_ref().is_some_and(|s| s.can_manage_projects()) {
                    self.mode = Mode::EmployeeSelect;
                }
            }
            KeyCode::Char('c') => self.copy_week_to_clipboard(),
            KeyCode::Esc => {
                if self.mode == Mode::Error {
                    self.mode = Mode::Browse;
                    self.status = None;
                }
            }
            _ => {}
        }
    }

    // ---- assignments view ----------------------------------------------

    fn handle_assignments_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('h') => self.show_help = true,
            KeyCode::Char('r') => {
                self.assign_editor = None;
                self.mode = Mode::Loading;
                self.needs_refresh = true;
            }
            KeyCode::Tab => self.switch_view(View::Timesheet),
            KeyCode::Up => self.assign_role_cursor = self.assign_role_cursor.saturating_sub(1),
            KeyCode::Down => {
                let roles = self.assign_editor.as_ref().map_or(0, |e| e.roles.len());
                if roles > 0 && self.assign_role_cursor + 1 < roles {
                    self.assign_role_cursor += 1;
                }
            }
            KeyCode::Left => self.assign_emp_cursor = self.assign_emp_cursor.saturating_sub(1),
            KeyCode::Right => {
                if self.assign_emp_cursor + 1 < self.employees.len() {
                    self.assign_emp_cursor += 1;
                }
            }
            KeyCode::Char(' ') => {
                let (role, employee_id) = (
                    self.assign_role_cursor,
                    self.employees.get(self.assign_emp_cursor).map(|e| e.id),
                );
                if let (Some(editor), Some(employee_id)) =
                    (self.assign_editor.as_mut(), employee_id)
                {
                    editor.toggle_employee(role, employee_id);
                }
            }
            KeyCode::Char('t') => {
                if let Some(employee_id) = self.employees.get(self.assign_emp_cursor).map(|e| e.id)
                {
                    let member = self
                        .assign_editor
                        .as_ref()
                        .and_then(|e| e.roles.get(self.assign_role_cursor))
                        .is_some_and(|role| role.employees.contains(&employee_id));
                    if member {
                        let current = self
                            .assign_editor
                            .as_ref()
                            .and_then(|e| e.roles.get(self.assign_role_cursor))
                            .and_then(|role| role.rate_of(employee_id));
                        self.input = current.map(|rate| rate.to_string()).unwrap_or_default();
                        self.mode = Mode::RateInput(employee_id);
                    } else {
                        self.status = Some("Assign the employee to the role first".to_string());
                    }
                }
            }
            KeyCode::Char('a') => {
                if !self.role_catalog.is_empty() {
                    self.pending_role = None;
                    self.mode = Mode::RoleSelect;
                }
            }
            KeyCode::Char('e') => {
                let has_role = self
                    .assign_editor
                    .as_ref()
                    .is_some_and(|e| e.roles.get(self.assign_role_cursor).is_some());
                if has_role {
                    self.pending_role = None;
                    self.input.clear();
                    self.mode = Mode::HoursInput;
                }
            }
            KeyCode::Char('x') => {
                let index = self.assign_role_cursor;
                if let Some(editor) = self.assign_editor.as_mut() {
                    editor.remove_role(index);
                    if self.assign_role_cursor >= editor.roles.len()
                        && self.assign_role_cursor > 0
                    {
                        self.assign_role_cursor -= 1;
                    }
                }
            }
            KeyCode::Char('s') => self.save_assignments(),
            KeyCode::Char('p') => self.mode = Mode::ProjectSelect(PickTarget::Scope),
            KeyCode::Esc => {
                if self.mode == Mode::Error {
                    self.mode = Mode::Browse;
                    self.status = None;
                }
            }
            _ => {}
        }
    }

    fn switch_view(&mut self, view: View) {
        if self.view == view {
            return;
        }
        if view == View::Assignments
            && !self.session.as_ref().is_some_and(|s| s.can_manage_projects())
        {
            self.status = Some("Project assignments require a manager or admin role.".to_string());
            return;
        }
        self.view = view;
        self.status = None;
        self.mode = Mode::Loading;
        self.needs_refresh = true;
    }

    // ---- clipboard ----------------------------------------------------

    fn copy_week_to_clipboard(&mut self) {
        let Some(sheet) = &self.sheet else {
            return;
        };
        if sheet.rows.is_empty() {
            self.set_toast("No entries to copy.", true);
            return;
        }

        let text = self.format_week_summary();
        match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
            Ok(_) => self.set_toast("Copied week summary to clipboard.", false),
            Err(err) => self.set_toast(format!("Clipboard error: {err}"), true),
        }
    }

    fn format_week_summary(&self) -> String {
        let Some(sheet) = &self.sheet else {
            return String::new();
        };
        let mut lines = vec![self.week.label()];
        for row in &sheet.rows {
            let project = row
                .project_id
                .and_then(|id| self.projects.iter().find(|p| p.id == id))
                .map(|p| p.name.clone())
                .unwrap_or_else(|| "-".to_string());
            let total: f64 = row.hours.iter().map(|cell| cell.value()).sum();
            lines.push(format!(
                "• {} — {} ({:.2}h)",
                project,
                row.notes.as_deref().unwrap_or("-"),
                total
            ));
        }
        let totals = sheet.daily_totals();
        let per_day: Vec<String> = DAY_NAMES
            .iter()
            .zip(totals)
            .map(|(name, total)| format!("{name} {total:.2}"))
            .collect();
        lines.push(per_day.join("  "));
        lines.join("\n")
    }

    // ---- toasts -------------------------------------------------------

    pub fn active_toast(&mut self) -> Option<ToastView> {
        let toast = self.toast.as_ref()?;
        if toast.created_at.elapsed() > Duration::from_secs(2) {
            self.toast = None;
            return None;
        }
        Some(ToastView {
            message: toast.message.clone(),
            is_error: toast.is_error,
        })
    }

    fn set_toast(&mut self, message: impl Into<String>, is_error: bool) {
        self.toast = Some(Toast {
            message: message.into(),
            created_at: Instant::now(),
            is_error,
        });
    }
}

fn move_selection(state: &mut ListState, len: usize, delta: i64) {
    if len == 0 {
        return;
    }
    let current = state.selected().unwrap_or(0) as i64;
    let next = (current + delta).rem_euclid(len as i64) as usize;
    state.select(Some(next));
}

struct Toast {
    message: String,
    created_at: Instant,
    is_error: bool,
}

pub struct ToastView {
    pub message: String,
    pub is_error: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_selection_wraps_both_ways() {
        let mut state = ListState::default();
        state.select(Some(0));
        move_selection(&mut state, 3, -1);
        assert_eq!(state.selected(), Some(2));
        move_selection(&mut state, 3, 1);
        assert_eq!(state.selected(), Some(0));
    }

    #[test]
    fn move_selection_ignores_empty_lists() {
        let mut state = ListState::default();
        move_selection(&mut state, 0, 1);
        assert_eq!(state.selected(), None);
    }

    #[test]
    fn new_app_without_token_starts_at_login() {
        // Force login so a developer's local token file cannot leak in.
        let app = App::new("http://localhost".to_string(), WeekRange::current(), true);
        assert_eq!(app.mode, Mode::Login);
        assert!(!app.needs_refresh);
    }
}
