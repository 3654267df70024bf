use std::collections::{HashMap, HashSet};

use crate::api::{ApiClient, ApiError};
use crate::models::AssignmentRecord;

/// A project role with its member set and per-member rates. A missing rate
/// is "no rate agreed", which is not the same thing as a zero rate.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleAssignment {
    pub role_id: u64,
    pub role_name: String,
    pub estimated_hours: u32,
    pub employees: HashSet<u64>,
    pub rates: HashMap<u64, f64>,
}

impl RoleAssignment {
    pub fn new(role_id: u64, role_name: String, estimated_hours: u32) -> Self {
        RoleAssignment {
            role_id,
            role_name,
            estimated_hours,
            employees: HashSet::new(),
            rates: HashMap::new(),
        }
    }

    pub fn rate_of(&self, employee_id: u64) -> Option<f64> {
        self.rates.get(&employee_id).copied()
    }
}

/// Collapses the backend's flat (role, employee) rows into one entry per
/// role. A bare row with no employee carries a role that has hours but no
/// members yet.
pub fn group_assignments(records: &[AssignmentRecord]) -> Vec<RoleAssignment> {
    let mut order: Vec<u64> = Vec::new();
    let mut by_role: HashMap<u64, RoleAssignment> = HashMap::new();

    for record in records {
        let role = by_role.entry(record.role_id).or_insert_with(|| {
            order.push(record.role_id);
            RoleAssignment::new(record.role_id, record.role_name.clone(), record.estimated_hours)
        });
        role.estimated_hours = record.estimated_hours;
        if let Some(employee_id) = record.employee_id {
            role.employees.insert(employee_id);
            if let Some(rate) = record.rate {
                role.rates.insert(employee_id, rate);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|role_id| by_role.remove(&role_id))
        .collect()
}

/// One backend call of the reconcile plan, in dispatch order.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentOp {
    RemoveRole { role_id: u64 },
    UpsertRoleHours { role_id: u64, estimated_hours: u32 },
    RemoveEmployee { role_id: u64, employee_id: u64 },
    AssignEmployee { role_id: u64, employee_id: u64, rate: Option<f64> },
}

pub struct AssignmentEditor {
    pub project_id: u64,
    baseline: HashMap<u64, RoleAssignment>,
    pub roles: Vec<RoleAssignment>,
    dirty: bool,
}

impl AssignmentEditor {
    pub fn load(project_id: u64, records: Vec<AssignmentRecord>) -> Self {
        let roles = group_assignments(&records);
        let baseline = roles
            .iter()
            .map(|role| (role.role_id, role.clone()))
            .collect();
        AssignmentEditor {
            project_id,
            baseline,
            roles,
            dirty: false,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Derived, never stored: always the sum over the current working set.
    pub fn total_estimated_hours(&self) -> u32 {
        self.roles.iter().map(|role| role.estimated_hours).sum()
    }

    pub fn add_role(
        &mut self,
        role_id: u64,
        role_name: String,
        estimated_hours: u32,
    ) -> Result<(), String> {
        if self.roles.iter().any(|role| role.role_id == role_id) {
            return Err(format!("Role '{role_name}' is already assigned to this project"));
        }
        self.roles
            .push(RoleAssignment::new(role_id, role_name, estimated_hours));
        self.dirty = true;
        Ok(())
    }

    pub fn remove_role(&mut self, index: usize) {
        if index < self.roles.len() {
            self.roles.remove(index);
            self.dirty = true;
        }
    }

    pub fn set_estimated_hours(&mut self, index: usize, estimated_hours: u32) {
        if let Some(role) = self.roles.get_mut(index) {
            if role.estimated_hours != estimated_hours {
                role.estimated_hours = estimated_hours;
                self.dirty = true;
            }
        }
    }

    pub fn toggle_employee(&mut self, index: usize, employee_id: u64) {
        if let Some(role) = self.roles.get_mut(index) {
            if !role.employees.insert(employee_id) {
                role.employees.remove(&employee_id);
                role.rates.remove(&employee_id);
            }
            self.dirty = true;
        }
    }

    /// Sets or clears an employee's rate. Blank input clears (absent, not
    /// zero); unparsable or negative input is rejected without applying.
    pub fn set_rate(&mut self, index: usize, employee_id: u64, input: &str) -> Result<(), String> {
        let role = self
            .roles
            .get_mut(index)
            .ok_or_else(|| "Role no longer exists".to_string())?;
        if !role.employees.contains(&employee_id) {
            return Err("Employee is not assigned to this role".to_string());
        }

        let trimmed = input.trim();
        if trimmed.is_empty() {
            if role.rates.remove(&employee_id).is_some() {
                self.dirty = true;
            }
            return Ok(());
        }

        let rate: f64 = trimmed
            .parse()
            .map_err(|_| format!("'{trimmed}' is not a valid rate"))?;
        if rate < 0.0 {
            return Err("Rate cannot be negative".to_string());
        }
        if role.rates.insert(employee_id, rate) != Some(rate) {
            self.dirty = true;
        }
        Ok(())
    }

    /// Three-level reconcile: role presence, membership within a role, rate
    /// value per member. Role removals come first; then, role by role in
    /// working-set order: the unconditional hours upsert, membership
    /// removals, additions, and rate-only changes for members on both sides.
    pub fn build_reconcile_plan(&self) -> Vec<AssignmentOp> {
        let mut ops = Vec::new();

        let working_ids: HashSet<u64> = self.roles.iter().map(|role| role.role_id).collect();
        let mut removed_roles: Vec<u64> = self
            .baseline
            .keys()
            .filter(|role_id| !working_ids.contains(role_id))
            .copied()
            .collect();
        removed_roles.sort_unstable();
        for role_id in removed_roles {
            ops.push(AssignmentOp::RemoveRole { role_id });
        }

        for role in &self.roles {
            // The backend's role-hours operation is an upsert, so it is sent
            // for every working role rather than diffed.
            ops.push(AssignmentOp::UpsertRoleHours {
                role_id: role.role_id,
                estimated_hours: role.estimated_hours,
            });

            match self.baseline.get(&role.role_id) {
                Some(base) => {
                    let mut removed: Vec<u64> =
                        base.employees.difference(&role.employees).copied().collect();
                    removed.sort_unstable();
                    for employee_id in removed {
                        ops.push(AssignmentOp::RemoveEmployee {
                            role_id: role.role_id,
                            employee_id,
                        });
                    }

                    let mut added: Vec<u64> =
                        role.employees.difference(&base.employees).copied().collect();
                    added.sort_unstable();
                    for employee_id in added {
                        ops.push(AssignmentOp::AssignEmployee {
                            role_id: role.role_id,
                            employee_id,
                            rate: role.rate_of(employee_id),
                        });
                    }

                    let mut common: Vec<u64> =
                        role.employees.intersection(&base.employees).copied().collect();
                    common.sort_unstable();
                    for employee_id in common {
                        // Value inequality, with absence compared as absence;
                        // an unchanged rate produces no call at all.
                        if base.rate_of(employee_id) != role.rate_of(employee_id) {
                            ops.push(AssignmentOp::AssignEmployee {
                                role_id: role.role_id,
                                employee_id,
                                rate: role.rate_of(employee_id),
                            });
                        }
                    }
                }
                None => {
                    let mut members: Vec<u64> = role.employees.iter().copied().collect();
                    members.sort_unstable();
                    for employee_id in members {
                        ops.push(AssignmentOp::AssignEmployee {
                            role_id: role.role_id,
                            employee_id,
                            rate: role.rate_of(employee_id),
                        });
                    }
                }
            }
        }

        ops
    }

    /// Dispatches the plan strictly in order, one call at a time. The first
    /// failure aborts the rest; the backend is then partially updated and
    /// the fresh baseline comes from re-opening the editor.
    pub fn save(&mut self, api: &ApiClient) -> Result<usize, ApiError> {
        let plan = self.build_reconcile_plan();
        let total = plan.len();

        for op in plan {
            match op {
                AssignmentOp::RemoveRole { role_id } => {
                    api.remove_role(self.project_id, role_id)?;
                }
                AssignmentOp::UpsertRoleHours {
                    role_id,
                    estimated_hours,
                } => {
                    api.upsert_role_hours(self.project_id, role_id, estimated_hours)?;
                }
                AssignmentOp::RemoveEmployee { role_id, employee_id } => {
                    api.remove_role_employee(self.project_id, role_id, employee_id)?;
                }
                AssignmentOp::AssignEmployee {
                    role_id,
                    employee_id,
                    rate,
                } => {
                    api.assign_employee(self.project_id, role_id, employee_id, rate)?;
                }
            }
        }

        let refreshed = api.fetch_assignments(self.project_id)?;
        *self = AssignmentEditor::load(self.project_id, refreshed);

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(role_id: u64, name: &str, hours: u32, employee: Option<u64>, rate: Option<f64>) -> AssignmentRecord {
        AssignmentRecord {
            role_id,
            role_name: name.to_string(),
            estimated_hours: hours,
            employee_id: employee,
            rate,
        }
    }

    fn assigns_for(ops: &[AssignmentOp], target: u64) -> Vec<&AssignmentOp> {
        ops.iter()
            .filter(|op| matches!(op, AssignmentOp::AssignEmployee { employee_id, .. } if *employee_id == target))
            .collect()
    }

    #[test]
    fn groups_flat_rows_by_role() {
        let records = vec![
            record(1, "Developer", 100, Some(10), Some(50.0)),
            record(1, "Developer", 100, Some(11), None),
            record(2, "Designer", 40, None, None),
        ];
        let roles = group_assignments(&records);

        assert_eq!(roles.len(), 2);
        assert_eq!(roles[0].role_id, 1);
        assert_eq!(roles[0].employees.len(), 2);
        assert_eq!(roles[0].rate_of(10), Some(50.0));
        assert_eq!(roles[0].rate_of(11), None);
        assert_eq!(roles[1].role_id, 2);
        assert!(roles[1].employees.is_empty());
    }

    #[test]
    fn duplicate_role_is_rejected() {
        let mut editor = AssignmentEditor::load(1, vec![record(1, "Developer", 100, None, None)]);
        let result = editor.add_role(1, "Developer".to_string(), 50);
        assert!(result.is_err());
        assert_eq!(editor.roles.len(), 1);
    }

    #[test]
    fn total_hours_is_always_the_derived_sum() {
        let mut editor = AssignmentEditor::load(1, vec![]);
        assert_eq!(editor.total_estimated_hours(), 0);

        editor.add_role(1, "Developer".to_string(), 100).unwrap();
        editor.add_role(2, "Designer".to_string(), 40).unwrap();
        assert_eq!(editor.total_estimated_hours(), 140);

        editor.set_estimated_hours(0, 80);
        assert_eq!(editor.total_estimated_hours(), 120);

        editor.remove_role(1);
        assert_eq!(editor.total_estimated_hours(), 80);
    }

    #[test]
    fn membership_and_rate_delta_scenario() {
        // Baseline: employees {E1, E2}, rates {E1: 50}.
        // Working:  employees {E2, E3}, rates {E2: 60}.
        let mut editor = AssignmentEditor::load(
            1,
            vec![
                record(1, "Developer", 100, Some(1), Some(50.0)),
                record(1, "Developer", 100, Some(2), None),
            ],
        );
        editor.toggle_employee(0, 1); // drop E1
        editor.toggle_employee(0, 3); // add E3
        editor.set_rate(0, 2, "60").unwrap();

        let ops = editor.build_reconcile_plan();

        assert_eq!(
            ops[0],
            AssignmentOp::UpsertRoleHours {
                role_id: 1,
                estimated_hours: 100
            }
        );
        assert!(ops.contains(&AssignmentOp::RemoveEmployee {
            role_id: 1,
            employee_id: 1
        }));
        assert!(ops.contains(&AssignmentOp::AssignEmployee {
            role_id: 1,
            employee_id: 3,
            rate: None
        }));
        // E2's rate went from absent to 60, so exactly one call for E2.
        assert_eq!(
            assigns_for(&ops, 2),
            vec![&AssignmentOp::AssignEmployee {
                role_id: 1,
                employee_id: 2,
                rate: Some(60.0)
            }]
        );
        assert_eq!(ops.len(), 4);
    }

    #[test]
    fn single_rate_change_yields_exactly_one_assign() {
        let mut editor = AssignmentEditor::load(
            1,
            vec![
                record(1, "Developer", 100, Some(1), Some(50.0)),
                record(1, "Developer", 100, Some(2), Some(70.0)),
                record(1, "Developer", 100, Some(3), None),
            ],
        );
        editor.set_rate(0, 1, "55").unwrap();

        let ops = editor.build_reconcile_plan();

        assert_eq!(
            assigns_for(&ops, 1),
            vec![&AssignmentOp::AssignEmployee {
                role_id: 1,
                employee_id: 1,
                rate: Some(55.0)
            }]
        );
        assert!(assigns_for(&ops, 2).is_empty());
        assert!(assigns_for(&ops, 3).is_empty());
        // Only the unconditional upsert and the one rate change.
        assert_eq!(ops.len(), 2);
    }

    #[test]
    fn unchanged_rate_generates_no_call() {
        let mut editor = AssignmentEditor::load(
            1,
            vec![record(1, "Developer", 100, Some(1), Some(50.0))],
        );
        editor.set_rate(0, 1, "50").unwrap();

        let ops = editor.build_reconcile_plan();
        assert_eq!(ops.len(), 1);
        assert!(matches!(ops[0], AssignmentOp::UpsertRoleHours { .. }));
    }

    #[test]
    fn new_role_assigns_all_members_without_removals() {
        let mut editor = AssignmentEditor::load(1, vec![]);
        editor.add_role(5, "QA".to_string(), 30).unwrap();
        editor.toggle_employee(0, 8);
        editor.toggle_employee(0, 9);
        editor.set_rate(0, 8, "45").unwrap();

        let ops = editor.build_reconcile_plan();

        assert_eq!(
            ops,
            vec![
                AssignmentOp::UpsertRoleHours {
                    role_id: 5,
                    estimated_hours: 30
                },
                AssignmentOp::AssignEmployee {
                    role_id: 5,
                    employee_id: 8,
                    rate: Some(45.0)
                },
                AssignmentOp::AssignEmployee {
                    role_id: 5,
                    employee_id: 9,
                    rate: None
                },
            ]
        );
    }

    #[test]
    fn dropped_role_is_removed_before_everything_else() {
        let mut editor = AssignmentEditor::load(
            1,
            vec![
                record(1, "Developer", 100, Some(1), None),
                record(2, "Designer", 40, Some(2), None),
            ],
        );
        editor.remove_role(1);

        let ops = editor.build_reconcile_plan();

        assert_eq!(ops[0], AssignmentOp::RemoveRole { role_id: 2 });
        // No per-employee removals for a dropped role; the role delete
        // takes its members with it.
        assert!(!ops.iter().any(|op| matches!(
            op,
            AssignmentOp::RemoveEmployee { role_id: 2, .. }
        )));
    }

    #[test]
    fn clearing_a_rate_sends_explicit_absence() {
        let mut editor = AssignmentEditor::load(
            1,
            vec![record(1, "Developer", 100, Some(1), Some(50.0))],
        );
        editor.set_rate(0, 1, "").unwrap();

        let ops = editor.build_reconcile_plan();
        assert_eq!(
            assigns_for(&ops, 1),
            vec![&AssignmentOp::AssignEmployee {
                role_id: 1,
                employee_id: 1,
                rate: None
            }]
        );
    }

    #[test]
    fn rate_input_validation() {
        let mut editor = AssignmentEditor::load(
            1,
            vec![record(1, "Developer", 100, Some(1), None)],
        );
        assert!(editor.set_rate(0, 1, "abc").is_err());
        assert!(editor.set_rate(0, 1, "-5").is_err());
        assert!(editor.set_rate(0, 2, "50").is_err()); // not a member
        assert!(!editor.is_dirty());
    }
}
