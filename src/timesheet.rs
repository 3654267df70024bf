use std::collections::{HashMap, HashSet};

use crate::api::{ApiClient, ApiError};
use crate::dates::{DAY_NAMES, WeekRange};
use crate::diff::diff_collections;
use crate::hours::{self, HourField};
use crate::models::EntryRecord;

/// One editable grid line. A row without an `entry_id` has never been
/// persisted and will be created on save regardless of its content.
#[derive(Debug, Clone, Default)]
pub struct SheetRow {
    pub entry_id: Option<u64>,
    pub project_id: Option<u64>,
    pub company_id: Option<u64>,
    pub billable: Option<bool>,
    pub ticket: Option<String>,
    pub work_area: Option<String>,
    pub task_area: Option<String>,
    pub notes: Option<String>,
    pub hours: [HourField; 7],
}

impl SheetRow {
    fn from_record(record: &EntryRecord) -> Self {
        let wire = record.hours();
        let mut cells = [HourField::Empty; 7];
        for (cell, value) in cells.iter_mut().zip(wire) {
            *cell = HourField::from_wire(value);
        }
        SheetRow {
            entry_id: record.id,
            project_id: record.project_id,
            company_id: record.company_id,
            billable: record.billable,
            ticket: record.ticket.clone(),
            work_area: record.work_area.clone(),
            task_area: record.task_area.clone(),
            notes: record.notes.clone(),
            hours: cells,
        }
    }

    /// Wire serialization; this is where empty cells become zeros.
    fn to_record(&self, employee_id: u64, week: WeekRange) -> EntryRecord {
        let mut record = EntryRecord {
            id: self.entry_id,
            employee_id,
            project_id: self.project_id,
            company_id: self.company_id,
            billable: self.billable,
            ticket: self.ticket.clone(),
            work_area: self.work_area.clone(),
            task_area: self.task_area.clone(),
            notes: self.notes.clone(),
            monday_hours: 0.0,
            tuesday_hours: 0.0,
            wednesday_hours: 0.0,
            thursday_hours: 0.0,
            friday_hours: 0.0,
            saturday_hours: 0.0,
            sunday_hours: 0.0,
            period_start_date: week.monday(),
        };
        let mut wire = [0.0; 7];
        for (slot, cell) in wire.iter_mut().zip(self.hours) {
            *slot = cell.to_wire();
        }
        record.set_hours(wire);
        record
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Loaded,
    Dirty,
    Saving,
}

#[derive(Debug, Clone)]
pub struct SavePlan {
    pub deletes: Vec<u64>,
    pub creates: Vec<EntryRecord>,
    pub updates: Vec<EntryRecord>,
}

impl SavePlan {
    pub fn is_noop(&self) -> bool {
        self.deletes.is_empty() && self.creates.is_empty() && self.updates.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SaveReport {
    pub deleted: usize,
    pub created: usize,
    pub updated: usize,
    pub delete_failures: Vec<u64>,
}

/// Baseline and working set for one (employee, week) scope. Neither survives
/// a scope change; the app drops the editor and re-fetches.
pub struct TimesheetEditor {
    pub employee_id: u64,
    pub week: WeekRange,
    baseline: HashMap<u64, EntryRecord>,
    pub rows: Vec<SheetRow>,
    pending_deletions: HashSet<u64>,
    state: EditorState,
}

impl TimesheetEditor {
    pub fn load(employee_id: u64, week: WeekRange, entries: Vec<EntryRecord>) -> Self {
        let mut baseline = HashMap::with_capacity(entries.len());
        let mut rows = Vec::with_capacity(entries.len());
        for entry in entries {
            rows.push(SheetRow::from_record(&entry));
            if let Some(id) = entry.id {
                baseline.insert(id, entry);
            }
        }
        TimesheetEditor {
            employee_id,
            week,
            baseline,
            rows,
            pending_deletions: HashSet::new(),
            state: EditorState::Loaded,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.state == EditorState::Dirty
    }

    pub fn pending_deletion_count(&self) -> usize {
        self.pending_deletions.len()
    }

    pub fn add_row(&mut self, project_id: Option<u64>, company_id: Option<u64>) {
        self.rows.push(SheetRow {
            project_id,
            company_id,
            ..SheetRow::default()
        });
        self.mark_dirty();
    }

    /// Removes a row from the working set. Persisted rows are queued for
    /// deletion; no network call happens until save.
    pub fn remove_row(&mut self, index: usize) {
        if index >= self.rows.len() {
            return;
        }
        let row = self.rows.remove(index);
        if let Some(id) = row.entry_id {
            self.pending_deletions.insert(id);
        }
        self.mark_dirty();
    }

    /// Applies one hour-cell edit. Rejected input (bad number, out of range,
    /// would break the daily cap) leaves the cell untouched.
    pub fn set_hours(&mut self, row: usize, day: usize, input: &str) -> Result<(), String> {
        let field = hours::parse_hours(input)?;
        let grid: Vec<[HourField; 7]> = self.rows.iter().map(|r| r.hours).collect();
        if hours::edit_exceeds_cap(&grid, row, day, field) {
            return Err(format!("{} would exceed 24 hours", DAY_NAMES[day]));
        }
        let cell = self
            .rows
            .get_mut(row)
            .ok_or_else(|| "Row no longer exists".to_string())?;
        if cell.hours[day] != field {
            cell.hours[day] = field;
            self.mark_dirty();
        }
        Ok(())
    }

    pub fn set_notes(&mut self, row: usize, notes: Option<String>) {
        if let Some(cell) = self.rows.get_mut(row) {
            if cell.notes != notes {
                cell.notes = notes;
                self.mark_dirty();
            }
        }
    }

    pub fn set_ticket(&mut self, row: usize, ticket: Option<String>) {
        if let Some(cell) = self.rows.get_mut(row) {
            if cell.ticket != ticket {
                cell.ticket = ticket;
                self.mark_dirty();
            }
        }
    }

    /// Cycles unset → billable → non-billable → unset. The unset state is
    /// meaningful on its own and is never folded into `false`.
    pub fn cycle_billable(&mut self, row: usize) {
        if let Some(cell) = self.rows.get_mut(row) {
            cell.billable = match cell.billable {
                None => Some(true),
                Some(true) => Some(false),
                Some(false) => None,
            };
            self.mark_dirty();
        }
    }

    pub fn daily_totals(&self) -> [f64; 7] {
        let grid: Vec<[HourField; 7]> = self.rows.iter().map(|r| r.hours).collect();
        let mut totals = [0.0; 7];
        for (day, total) in totals.iter_mut().enumerate() {
            *total = hours::daily_total(&grid, day);
        }
        totals
    }

    pub fn week_total(&self) -> f64 {
        self.daily_totals().iter().sum()
    }

    /// Validates the grid and computes the minimal operation set. Deletions
    /// come out of the baseline/working diff, which by construction covers
    /// every queued pending deletion.
    pub fn build_save_plan(&self) -> Result<SavePlan, String> {
        let grid: Vec<[HourField; 7]> = self.rows.iter().map(|r| r.hours).collect();
        if let Some(day) = hours::daily_cap_violation(&grid) {
            return Err(format!("{} exceeds the 24-hour daily cap", DAY_NAMES[day]));
        }

        let working: Vec<(Option<u64>, EntryRecord)> = self
            .rows
            .iter()
            .map(|row| (row.entry_id, row.to_record(self.employee_id, self.week)))
            .collect();

        let plan = diff_collections(&self.baseline, &working, |a, b| a == b);

        Ok(SavePlan {
            deletes: plan.to_delete,
            creates: plan.to_create,
            updates: plan.to_update.into_iter().map(|(_, record)| record).collect(),
        })
    }

    /// Dispatches an already-validated plan: queued deletes first (best
    /// effort, one call per entry), then one batched create, then one batched
    /// update. Validation lives in `build_save_plan`; a rejected grid never
    /// gets here. A failed batch aborts and leaves the editor dirty so the
    /// edits survive a retry; deletes that already went through are not
    /// rolled back — the user is told to reload.
    pub fn save(&mut self, api: &ApiClient, plan: SavePlan) -> Result<SaveReport, ApiError> {
        if plan.is_noop() {
            self.state = EditorState::Loaded;
            return Ok(SaveReport::default());
        }

        self.state = EditorState::Saving;
        let mut report = SaveReport::default();

        for id in &plan.deletes {
            match api.delete_entry(*id) {
                Ok(()) => report.deleted += 1,
                Err(err) if err.requires_login() => {
                    self.state = EditorState::Dirty;
                    return Err(err);
                }
                Err(_) => report.delete_failures.push(*id),
            }
        }

        if !plan.creates.is_empty() {
            report.created = plan.creates.len();
            if let Err(err) = api.create_entries(plan.creates) {
                self.state = EditorState::Dirty;
                return Err(err);
            }
        }

        if !plan.updates.is_empty() {
            report.updated = plan.updates.len();
            if let Err(err) = api.update_entries(plan.updates) {
                self.state = EditorState::Dirty;
                return Err(err);
            }
        }

        // Created rows get their ids from the backend, so the new baseline
        // has to be fetched back rather than patched together locally.
        let refreshed = match api.fetch_week_entries(self.employee_id, self.week.monday()) {
            Ok(entries) => entries,
            Err(err) => {
                self.state = EditorState::Dirty;
                return Err(err);
            }
        };
        *self = TimesheetEditor::load(self.employee_id, self.week, refreshed);

        Ok(report)
    }

    fn mark_dirty(&mut self) {
        self.state = EditorState::Dirty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn week() -> WeekRange {
        WeekRange::containing(NaiveDate::from_ymd_opt(2026, 2, 2).unwrap())
    }

    fn persisted(id: u64, hours: [f64; 7]) -> EntryRecord {
        let mut record = EntryRecord {
            id: Some(id),
            employee_id: 1,
            project_id: Some(10),
            company_id: None,
            billable: Some(true),
            ticket: None,
            work_area: None,
            task_area: None,
            notes: None,
            monday_hours: 0.0,
            tuesday_hours: 0.0,
            wednesday_hours: 0.0,
            thursday_hours: 0.0,
            friday_hours: 0.0,
            saturday_hours: 0.0,
            sunday_hours: 0.0,
            period_start_date: week().monday(),
        };
        record.set_hours(hours);
        record
    }

    #[test]
    fn new_row_produces_one_create_batch() {
        let mut editor = TimesheetEditor::load(1, week(), vec![]);
        editor.add_row(Some(10), None);
        for day in 0..5 {
            editor.set_hours(0, day, "8").unwrap();
        }

        let plan = editor.build_save_plan().unwrap();

        assert_eq!(plan.creates.len(), 1);
        assert!(plan.updates.is_empty());
        assert!(plan.deletes.is_empty());
        let created = &plan.creates[0];
        assert_eq!(created.id, None);
        assert_eq!(created.monday_hours, 8.0);
        assert_eq!(created.friday_hours, 8.0);
        assert_eq!(created.saturday_hours, 0.0);
        assert_eq!(created.period_start_date, week().monday());
    }

    #[test]
    fn removed_persisted_row_is_deleted_only() {
        let mut editor =
            TimesheetEditor::load(1, week(), vec![persisted(42, [8.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])]);
        editor.remove_row(0);

        let plan = editor.build_save_plan().unwrap();

        assert_eq!(plan.deletes, vec![42]);
        assert!(plan.creates.is_empty());
        assert!(plan.updates.is_empty());
    }

    #[test]
    fn deletion_is_deferred_until_save() {
        let mut editor =
            TimesheetEditor::load(1, week(), vec![persisted(7, [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])]);
        assert_eq!(editor.pending_deletion_count(), 0);

        editor.remove_row(0);

        // The row is queued, not gone from the backend's point of view.
        assert_eq!(editor.pending_deletion_count(), 1);
        assert!(editor.is_dirty());
    }

    #[test]
    fn unchanged_rows_generate_no_traffic() {
        let editor =
            TimesheetEditor::load(1, week(), vec![persisted(5, [8.0, 8.0, 0.0, 0.0, 0.0, 0.0, 0.0])]);
        let plan = editor.build_save_plan().unwrap();
        assert!(plan.is_noop());
    }

    #[test]
    fn edited_row_becomes_one_update() {
        let mut editor =
            TimesheetEditor::load(1, week(), vec![persisted(5, [8.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])]);
        editor.set_hours(0, 1, "4").unwrap();

        let plan = editor.build_save_plan().unwrap();

        assert_eq!(plan.updates.len(), 1);
        assert_eq!(plan.updates[0].id, Some(5));
        assert_eq!(plan.updates[0].tuesday_hours, 4.0);
        assert!(plan.creates.is_empty());
        assert!(plan.deletes.is_empty());
    }

    #[test]
    fn cap_rejects_increment_at_exactly_24() {
        let mut editor = TimesheetEditor::load(
            1,
            week(),
            vec![
                persisted(1, [12.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
                persisted(2, [12.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
            ],
        );

        let result = editor.set_hours(1, 0, "12.25");

        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Mon"));
        // The rejected edit was not applied.
        assert_eq!(editor.daily_totals()[0], 24.0);
        assert!(!editor.is_dirty());
    }

    #[test]
    fn bad_input_leaves_cell_untouched() {
        let mut editor =
            TimesheetEditor::load(1, week(), vec![persisted(1, [8.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])]);
        assert!(editor.set_hours(0, 0, "8.1").is_err());
        assert_eq!(editor.rows[0].hours[0], HourField::Set(8.0));
        assert!(!editor.is_dirty());
    }

    #[test]
    fn billable_cycles_through_tri_state() {
        let mut editor = TimesheetEditor::load(1, week(), vec![]);
        editor.add_row(None, None);
        assert_eq!(editor.rows[0].billable, None);
        editor.cycle_billable(0);
        assert_eq!(editor.rows[0].billable, Some(true));
        editor.cycle_billable(0);
        assert_eq!(editor.rows[0].billable, Some(false));
        editor.cycle_billable(0);
        assert_eq!(editor.rows[0].billable, None);
    }

    #[test]
    fn remove_and_readd_yields_delete_plus_create() {
        let mut editor =
            TimesheetEditor::load(1, week(), vec![persisted(42, [8.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])]);
        editor.remove_row(0);
        editor.add_row(Some(10), None);
        editor.set_hours(0, 0, "8").unwrap();

        let plan = editor.build_save_plan().unwrap();

        // Identity over content: the replacement row has no id, so it is a
        // create even though its content matches the deleted baseline row.
        assert_eq!(plan.deletes, vec![42]);
        assert_eq!(plan.creates.len(), 1);
        assert!(plan.updates.is_empty());
    }

    #[test]
    fn overloaded_week_fails_validation_before_any_dispatch() {
        // The backend can serve a week that already breaks the daily cap.
        // The plan build reports it as a plain message; nothing reaches
        // the save path.
        let editor = TimesheetEditor::load(
            1,
            week(),
            vec![
                persisted(1, [20.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
                persisted(2, [20.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
            ],
        );

        let result = editor.build_save_plan();

        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Mon"));
    }

    #[test]
    fn week_total_sums_all_rows() {
        let mut editor = TimesheetEditor::load(
            1,
            week(),
            vec![
                persisted(1, [8.0, 8.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
                persisted(2, [0.0, 2.0, 2.0, 0.0, 0.0, 0.0, 0.0]),
            ],
        );
        assert_eq!(editor.week_total(), 20.0);
        editor.set_hours(1, 3, "1.5").unwrap();
        assert_eq!(editor.week_total(), 21.5);
    }
}
