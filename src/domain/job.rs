use serde::{Deserialize, Serialize};

use crate::error::{GriddleError, Result};
use crate::types::{Entity, RecordId};

/// A job held by an employee. `task_ids` carries the job's task links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub job_title: Option<String>,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub task_ids: Vec<RecordId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobPatch {
    pub job_title: Option<String>,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
    pub employee_id: Option<RecordId>,
    pub task_ids: Option<Vec<RecordId>>,
}

impl Entity for Job {
    type Key = RecordId;
    type Patch = JobPatch;

    const KIND: &'static str = "job";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn validate(&self) -> Result<()> {
        match self.job_title.as_deref() {
            Some(title) if !title.trim().is_empty() => Ok(()),
            _ => Err(GriddleError::Validation("jobTitle is required".to_string())),
        }
    }

    fn merge(&mut self, patch: JobPatch) {
        if let Some(job_title) = patch.job_title {
            self.job_title = Some(job_title);
        }
        if let Some(min_salary) = patch.min_salary {
            self.min_salary = Some(min_salary);
        }
        if let Some(max_salary) = patch.max_salary {
            self.max_salary = Some(max_salary);
        }
        if let Some(employee_id) = patch.employee_id {
            self.employee_id = Some(employee_id);
        }
        if let Some(task_ids) = patch.task_ids {
            self.task_ids = task_ids;
        }
    }
}
