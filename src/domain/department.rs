use serde::{Deserialize, Serialize};

use crate::error::{GriddleError, Result};
use crate::types::{Entity, RecordId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub department_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<RecordId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DepartmentPatch {
    pub department_name: Option<String>,
    pub location_id: Option<RecordId>,
}

impl Entity for Department {
    type Key = RecordId;
    type Patch = DepartmentPatch;

    const KIND: &'static str = "department";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn validate(&self) -> Result<()> {
        match self.department_name.as_deref() {
            Some(name) if !name.trim().is_empty() => Ok(()),
            _ => Err(GriddleError::Validation(
                "departmentName is required".to_string(),
            )),
        }
    }

    fn merge(&mut self, patch: DepartmentPatch) {
        if let Some(name) = patch.department_name {
            self.department_name = Some(name);
        }
        if let Some(location_id) = patch.location_id {
            self.location_id = Some(location_id);
        }
    }
}
