use serde::{Deserialize, Serialize};

use crate::error::{GriddleError, Result};
use crate::types::{Entity, RecordId};

/// A unit of work that jobs can reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl Entity for Task {
    type Key = RecordId;
    type Patch = TaskPatch;

    const KIND: &'static str = "task";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn validate(&self) -> Result<()> {
        match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => Ok(()),
            _ => Err(GriddleError::Validation("title is required".to_string())),
        }
    }

    fn merge(&mut self, patch: TaskPatch) {
        if let Some(title) = patch.title {
            self.title = Some(title);
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
    }
}
