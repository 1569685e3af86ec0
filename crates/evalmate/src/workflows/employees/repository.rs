use serde::Serialize;

use super::domain::{EmployeeId, EmployeeRecord};

/// Storage abstraction so the service module can be exercised in isolation.
pub trait EmployeeRepository: Send + Sync {
    fn insert(&self, record: EmployeeRecord) -> Result<EmployeeRecord, RepositoryError>;
    fn update(&self, record: EmployeeRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &EmployeeId) -> Result<Option<EmployeeRecord>, RepositoryError>;
    fn list(&self, limit: usize) -> Result<Vec<EmployeeRecord>, RepositoryError>;
    /// Returns whether a record was removed.
    fn delete(&self, id: &EmployeeId) -> Result<bool, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Sanitized representation of a stored record's status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeStatusView {
    pub employee_id: EmployeeId,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    pub field_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_weighted_score: Option<f64>,
}

impl EmployeeRecord {
    pub fn status_view(&self) -> EmployeeStatusView {
        EmployeeStatusView {
            employee_id: self.employee_id.clone(),
            status: self.state.label(),
            name: self.name().map(str::to_owned),
            designation: self.designation().map(str::to_owned),
            field_count: self.fields.len(),
            overall_weighted_score: self.number("overall_weighted_score"),
        }
    }
}
