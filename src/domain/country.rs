use serde::{Deserialize, Serialize};

use crate::error::{GriddleError, Result};
use crate::types::{Entity, RecordId};

/// A country, optionally attached to a [`Region`](crate::domain::Region).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub country_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_id: Option<RecordId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CountryPatch {
    pub country_name: Option<String>,
    pub region_id: Option<RecordId>,
}

impl Entity for Country {
    type Key = RecordId;
    type Patch = CountryPatch;

    const KIND: &'static str = "country";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn validate(&self) -> Result<()> {
        match self.country_name.as_deref() {
            Some(name) if !name.trim().is_empty() => Ok(()),
            _ => Err(GriddleError::Validation(
                "countryName is required".to_string(),
            )),
        }
    }

    fn merge(&mut self, patch: CountryPatch) {
        if let Some(name) = patch.country_name {
            self.country_name = Some(name);
        }
        if let Some(region_id) = patch.region_id {
            self.region_id = Some(region_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_field_paths() {
        let country = Country {
            id: Some(4),
            country_name: Some("France".to_string()),
            region_id: Some(1),
        };
        let json = serde_json::to_value(&country).unwrap();
        assert_eq!(json["countryName"], "France");
        assert_eq!(json["regionId"], 1);
        assert_eq!(json["id"], 4);
    }
}
