use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Entity, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Language {
    French,
    English,
    Spanish,
}

/// A past job assignment: which job an employee held in which department,
/// over which period. No field is mandatory on create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobHistory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub language: Option<Language>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<RecordId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobHistoryPatch {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub language: Option<Language>,
    pub job_id: Option<RecordId>,
    pub department_id: Option<RecordId>,
    pub employee_id: Option<RecordId>,
}

impl Entity for JobHistory {
    type Key = RecordId;
    type Patch = JobHistoryPatch;

    const KIND: &'static str = "job-history";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn merge(&mut self, patch: JobHistoryPatch) {
        if let Some(start_date) = patch.start_date {
            self.start_date = Some(start_date);
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = Some(end_date);
        }
        if let Some(language) = patch.language {
            self.language = Some(language);
        }
        if let Some(job_id) = patch.job_id {
            self.job_id = Some(job_id);
        }
        if let Some(department_id) = patch.department_id {
            self.department_id = Some(department_id);
        }
        if let Some(employee_id) = patch.employee_id {
            self.employee_id = Some(employee_id);
        }
    }
}
