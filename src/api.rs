use chrono::NaiveDate;
use reqwest::blocking::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::models::{
    AssignmentRecord, Employee, EmployeeAssignment, EntryBatch, EntryRecord, Project,
    RoleCatalogEntry, RoleHoursUpsert,
};

#[derive(Debug, Clone)]
pub enum ApiError {
    Unauthorized,
    /// A success status carrying an HTML body where JSON was expected —
    /// the backend redirected an expired session to a login page.
    SessionExpired,
    Server(String),
    Network(String),
}

impl ApiError {
    pub fn message(&self) -> String {
        match self {
            ApiError::Unauthorized => "Not authorized. Please log in again.".to_string(),
            ApiError::SessionExpired => "Session expired. Please log in again.".to_string(),
            ApiError::Server(message) | ApiError::Network(message) => message.clone(),
        }
    }

    pub fn requires_login(&self) -> bool {
        matches!(self, ApiError::Unauthorized | ApiError::SessionExpired)
    }
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    pub fn new(base_url: String, token: String) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent("timedesk-tui")
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn fetch_employees(&self) -> Result<Vec<Employee>, ApiError> {
        self.get_json(&format!("{}/api/employees", self.base_url))
    }

    pub fn fetch_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.get_json(&format!("{}/api/projects", self.base_url))
    }

    pub fn fetch_role_catalog(&self) -> Result<Vec<RoleCatalogEntry>, ApiError> {
        self.get_json(&format!("{}/api/roles", self.base_url))
    }

    pub fn fetch_week_entries(
        &self,
        employee_id: u64,
        week_start: NaiveDate,
    ) -> Result<Vec<EntryRecord>, ApiError> {
        let url = format!(
            "{}/api/timesheet/entries?employee_id={}&week_start={}",
            self.base_url,
            employee_id,
            week_start.format("%Y-%m-%d")
        );
        self.get_json(&url)
    }

    pub fn create_entries(&self, entries: Vec<EntryRecord>) -> Result<(), ApiError> {
        let url = format!("{}/api/timesheet/entries/batch", self.base_url);
        self.send_body(self.client.post(url), &EntryBatch { entries })
    }

    pub fn update_entries(&self, entries: Vec<EntryRecord>) -> Result<(), ApiError> {
        let url = format!("{}/api/timesheet/entries/batch", self.base_url);
        self.send_body(self.client.put(url), &EntryBatch { entries })
    }

    pub fn delete_entry(&self, entry_id: u64) -> Result<(), ApiError> {
        let url = format!("{}/api/timesheet/entries/{}", self.base_url, entry_id);
        self.send(self.client.delete(url))
    }

    pub fn fetch_assignments(&self, project_id: u64) -> Result<Vec<AssignmentRecord>, ApiError> {
        let url = format!("{}/api/projects/{}/assignments", self.base_url, project_id);
        self.get_json(&url)
    }

    pub fn upsert_role_hours(
        &self,
        project_id: u64,
        role_id: u64,
        estimated_hours: u32,
    ) -> Result<(), ApiError> {
        let url = format!("{}/api/projects/{}/roles", self.base_url, project_id);
        self.send_body(
            self.client.post(url),
            &RoleHoursUpsert {
                role_id,
                estimated_hours,
            },
        )
    }

    pub fn assign_employee(
        &self,
        project_id: u64,
        role_id: u64,
        employee_id: u64,
        rate: Option<f64>,
    ) -> Result<(), ApiError> {
        let url = format!(
            "{}/api/projects/{}/roles/{}/employees",
            self.base_url, project_id, role_id
        );
        self.send_body(self.client.post(url), &EmployeeAssignment { employee_id, rate })
    }

    pub fn remove_role_employee(
        &self,
        project_id: u64,
        role_id: u64,
        employee_id: u64,
    ) -> Result<(), ApiError> {
        let url = format!(
            "{}/api/projects/{}/roles/{}/employees/{}",
            self.base_url, project_id, role_id, employee_id
        );
        self.send(self.client.delete(url))
    }

    pub fn remove_role(&self, project_id: u64, role_id: u64) -> Result<(), ApiError> {
        let url = format!("{}/api/projects/{}/roles/{}", self.base_url, project_id, role_id);
        self.send(self.client.delete(url))
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let response = self.execute(self.client.get(url))?;
        if is_html(&response) {
            return Err(ApiError::SessionExpired);
        }
        response
            .json::<T>()
            .map_err(|err| ApiError::Network(err.to_string()))
    }

    fn send_body<B: Serialize>(&self, request: RequestBuilder, body: &B) -> Result<(), ApiError> {
        let response = self.execute(request.json(body))?;
        if is_html(&response) {
            return Err(ApiError::SessionExpired);
        }
        Ok(())
    }

    fn send(&self, request: RequestBuilder) -> Result<(), ApiError> {
        let response = self.execute(request)?;
        if is_html(&response) {
            return Err(ApiError::SessionExpired);
        }
        Ok(())
    }

    fn execute(&self, request: RequestBuilder) -> Result<reqwest::blocking::Response, ApiError> {
        let response = request
            .header("Accept", "application/json")
            .bearer_auth(&self.token)
            .send()
            .map_err(|err| ApiError::Network(err.to_string()))?;

        let status = response.status();
        if status == 401 || status == 403 {
            return Err(ApiError::Unauthorized);
        }
        if status.is_server_error() {
            return Err(ApiError::Server(format!("Backend error: {status}")));
        }
        if !status.is_success() {
            return Err(ApiError::Network(format!("Unexpected response: {status}")));
        }

        Ok(response)
    }
}

fn is_html(response: &reqwest::blocking::Response) -> bool {
    is_html_content_type(
        response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
    )
}

/// An HTML body under a success status means the backend redirected an
/// expired session to its login page instead of answering with JSON.
fn is_html_content_type(value: Option<&str>) -> bool {
    value.is_some_and(|value| value.contains("text/html"))
}
