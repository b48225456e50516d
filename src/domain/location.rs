use serde::{Deserialize, Serialize};

use crate::error::{GriddleError, Result};
use crate::types::{Entity, RecordId};

/// A postal location, optionally attached to a country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub street_address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub state_province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_id: Option<RecordId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationPatch {
    pub street_address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub state_province: Option<String>,
    pub country_id: Option<RecordId>,
}

impl Entity for Location {
    type Key = RecordId;
    type Patch = LocationPatch;

    const KIND: &'static str = "location";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn validate(&self) -> Result<()> {
        match self.street_address.as_deref() {
            Some(addr) if !addr.trim().is_empty() => Ok(()),
            _ => Err(GriddleError::Validation(
                "streetAddress is required".to_string(),
            )),
        }
    }

    fn merge(&mut self, patch: LocationPatch) {
        if let Some(street_address) = patch.street_address {
            self.street_address = Some(street_address);
        }
        if let Some(postal_code) = patch.postal_code {
            self.postal_code = Some(postal_code);
        }
        if let Some(city) = patch.city {
            self.city = Some(city);
        }
        if let Some(state_province) = patch.state_province {
            self.state_province = Some(state_province);
        }
        if let Some(country_id) = patch.country_id {
            self.country_id = Some(country_id);
        }
    }
}
