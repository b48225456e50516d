use serde::{Deserialize, Serialize};

use crate::error::{GriddleError, Result};
use crate::types::{Entity, RecordId};

/// A geographic region, the root of the location hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub region_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegionPatch {
    pub region_name: Option<String>,
}

impl Entity for Region {
    type Key = RecordId;
    type Patch = RegionPatch;

    const KIND: &'static str = "region";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn validate(&self) -> Result<()> {
        match self.region_name.as_deref() {
            Some(name) if !name.trim().is_empty() => Ok(()),
            _ => Err(GriddleError::Validation("regionName is required".to_string())),
        }
    }

    fn merge(&mut self, patch: RegionPatch) {
        if let Some(name) = patch.region_name {
            self.region_name = Some(name);
        }
    }
}
