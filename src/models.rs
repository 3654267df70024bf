use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Employee {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    #[serde(rename = "company_id", default)]
    pub company_id: Option<u64>,
    #[serde(rename = "company_name", default)]
    pub company_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoleCatalogEntry {
    pub id: u64,
    pub name: String,
}

/// One persisted timesheet row as the backend serves and accepts it.
/// `billable` is tri-state: `None` means no billable flag was ever set,
/// which is distinct from an explicit `false`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EntryRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(rename = "employee_id")]
    pub employee_id: u64,
    #[serde(rename = "project_id", default)]
    pub project_id: Option<u64>,
    #[serde(rename = "company_id", default)]
    pub company_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billable: Option<bool>,
    #[serde(default)]
    pub ticket: Option<String>,
    #[serde(rename = "work_area", default)]
    pub work_area: Option<String>,
    #[serde(rename = "task_area", default)]
    pub task_area: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(rename = "monday_hours")]
    pub monday_hours: f64,
    #[serde(rename = "tuesday_hours")]
    pub tuesday_hours: f64,
    #[serde(rename = "wednesday_hours")]
    pub wednesday_hours: f64,
    #[serde(rename = "thursday_hours")]
    pub thursday_hours: f64,
    #[serde(rename = "friday_hours")]
    pub friday_hours: f64,
    #[serde(rename = "saturday_hours")]
    pub saturday_hours: f64,
    #[serde(rename = "sunday_hours")]
    pub sunday_hours: f64,
    #[serde(rename = "period_start_date")]
    pub period_start_date: NaiveDate,
}

impl EntryRecord {
    pub fn hours(&self) -> [f64; 7] {
        [
            self.monday_hours,
            self.tuesday_hours,
            self.wednesday_hours,
            self.thursday_hours,
            self.friday_hours,
            self.saturday_hours,
            self.sunday_hours,
        ]
    }

    pub fn set_hours(&mut self, hours: [f64; 7]) {
        self.monday_hours = hours[0];
        self.tuesday_hours = hours[1];
        self.wednesday_hours = hours[2];
        self.thursday_hours = hours[3];
        self.friday_hours = hours[4];
        self.saturday_hours = hours[5];
        self.sunday_hours = hours[6];
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryBatch {
    pub entries: Vec<EntryRecord>,
}

/// One flat assignment row: the backend serves a project's roles as one row
/// per (role, employee), plus a bare row (`employee_id: None`) for roles
/// that have hours but no members yet.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentRecord {
    #[serde(rename = "role_id")]
    pub role_id: u64,
    #[serde(rename = "role_name")]
    pub role_name: String,
    #[serde(rename = "estimated_hours")]
    pub estimated_hours: u32,
    #[serde(rename = "employee_id", default)]
    pub employee_id: Option<u64>,
    #[serde(default)]
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleHoursUpsert {
    #[serde(rename = "role_id")]
    pub role_id: u64,
    #[serde(rename = "estimated_hours")]
    pub estimated_hours: u32,
}

/// Assignment body. `rate` intentionally has no `skip_serializing_if`:
/// an unset rate must reach the backend as an explicit `null`, not be
/// omitted and not be coerced to zero.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeAssignment {
    #[serde(rename = "employee_id")]
    pub employee_id: u64,
    pub rate: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_billable_is_omitted() {
        let entry = EntryRecord {
            id: None,
            employee_id: 1,
            project_id: None,
            company_id: None,
            billable: None,
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
            period_start_date: NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("billable").is_none());
        assert!(json.get("id").is_none());
    }

    #[test]
    fn employee_role_is_optional() {
        let bare: Employee =
            serde_json::from_value(serde_json::json!({"id": 1, "name": "Ada"})).unwrap();
        assert_eq!(bare.role, None);

        let titled: Employee = serde_json::from_value(
            serde_json::json!({"id": 2, "name": "Grace", "role": "manager"}),
        )
        .unwrap();
        assert_eq!(titled.role.as_deref(), Some("manager"));
    }

    #[test]
    fn explicit_false_billable_survives() {
        let json = serde_json::json!({
            "employee_id": 1,
            "billable": false,
            "monday_hours": 8.0,
            "tuesday_hours": 0.0,
            "wednesday_hours": 0.0,
            "thursday_hours": 0.0,
            "friday_hours": 0.0,
            "saturday_hours": 0.0,
            "sunday_hours": 0.0,
            "period_start_date": "2026-02-02"
        });
        let entry: EntryRecord = serde_json::from_value(json).unwrap();
        assert_eq!(entry.billable, Some(false));
    }

    #[test]
    fn missing_rate_serializes_as_null() {
        let body = EmployeeAssignment {
            employee_id: 7,
            rate: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("rate").is_some());
        assert!(json["rate"].is_null());
    }
}
