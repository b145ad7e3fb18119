use std::fmt;

use serde::{Deserialize, Serialize};

use super::storage::RepositoryError;

/// Identifier wrapper for employees (managers are employees too).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub String);

/// Tenant key scoping every record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyId(pub String);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EmployeeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for CompanyId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Minimal employee view needed to address prompts and enumerate batch runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    pub employee_id: EmployeeId,
    pub company_id: CompanyId,
    pub full_name: String,
    pub manager_id: Option<EmployeeId>,
    pub active: bool,
}

/// Read-only view over the HR directory owned by another system.
pub trait EmployeeDirectory: Send + Sync {
    fn direct_reports(
        &self,
        company_id: &CompanyId,
        manager_id: &EmployeeId,
    ) -> Result<Vec<EmployeeProfile>, RepositoryError>;

    fn active_employees(&self, company_id: &CompanyId)
        -> Result<Vec<EmployeeProfile>, RepositoryError>;
}
