use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GriddleError, Result};
use crate::types::{Entity, RecordId};

/// An employee. `manager_id` points at another employee record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub hire_date: Option<DateTime<Utc>>,
    pub salary: Option<i64>,
    pub commission_pct: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<RecordId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployeePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub hire_date: Option<DateTime<Utc>>,
    pub salary: Option<i64>,
    pub commission_pct: Option<i64>,
    pub department_id: Option<RecordId>,
    pub manager_id: Option<RecordId>,
}

impl Entity for Employee {
    type Key = RecordId;
    type Patch = EmployeePatch;

    const KIND: &'static str = "employee";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn validate(&self) -> Result<()> {
        match self.email.as_deref() {
            Some(email) if !email.trim().is_empty() => Ok(()),
            _ => Err(GriddleError::Validation("email is required".to_string())),
        }
    }

    fn merge(&mut self, patch: EmployeePatch) {
        if let Some(first_name) = patch.first_name {
            self.first_name = Some(first_name);
        }
        if let Some(last_name) = patch.last_name {
            self.last_name = Some(last_name);
        }
        if let Some(email) = patch.email {
            self.email = Some(email);
        }
        if let Some(phone_number) = patch.phone_number {
            self.phone_number = Some(phone_number);
        }
        if let Some(hire_date) = patch.hire_date {
            self.hire_date = Some(hire_date);
        }
        if let Some(salary) = patch.salary {
            self.salary = Some(salary);
        }
        if let Some(commission_pct) = patch.commission_pct {
            self.commission_pct = Some(commission_pct);
        }
        if let Some(department_id) = patch.department_id {
            self.department_id = Some(department_id);
        }
        if let Some(manager_id) = patch.manager_id {
            self.manager_id = Some(manager_id);
        }
    }
}
