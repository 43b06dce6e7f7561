//! Shipping addresses.

use serde::{Deserialize, Serialize};

use crate::types::AddressId;
use crate::validation::{FieldErrors, Validate, ValidationError};

/// A saved shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(rename = "_id")]
    pub id: AddressId,
    pub phone_number: String,
    pub address_line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

impl Address {
    /// Single-line rendering used in order listings.
    #[must_use]
    pub fn one_line(&self) -> String {
        let mut line = self.address_line1.clone();
        if let Some(line2) = self.address_line2.as_deref().filter(|l| !l.is_empty()) {
            line.push_str(", ");
            line.push_str(line2);
        }
        format!("{line}, {}, {} {}", self.city, self.state, self.pincode)
    }
}

/// Body of the address upsert.
///
/// With `address_id` set the backend updates that address; without it a new
/// one is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_id: Option<AddressId>,
    pub phone_number: String,
    pub address_line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

impl AddressInput {
    /// Start editing an existing address.
    #[must_use]
    pub fn editing(address: &Address) -> Self {
        Self {
            address_id: Some(address.id.clone()),
            phone_number: address.phone_number.clone(),
            address_line1: address.address_line1.clone(),
            address_line2: address.address_line2.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            pincode: address.pincode.clone(),
        }
    }

    /// True when this input updates an existing address.
    #[must_use]
    pub const fn is_update(&self) -> bool {
        self.address_id.is_some()
    }
}

impl Validate for AddressInput {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::default();
        errors.min_len("phoneNumber", &self.phone_number, 10, "Phone number must be 10 digits");
        errors.min_len(
            "addressLine1",
            &self.address_line1,
            5,
            "Address must be at least 5 characters",
        );
        errors.min_len("city", &self.city, 2, "City is required");
        errors.min_len("state", &self.state, 2, "State is required");
        errors.min_len("pincode", &self.pincode, 6, "Pincode must be 6 digits");
        errors.finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_input() -> AddressInput {
        AddressInput {
            address_id: None,
            phone_number: "9876543210".to_string(),
            address_line1: "12 MG Road".to_string(),
            address_line2: None,
            city: "Pune".to_string(),
            state: "Maharashtra".to_string(),
            pincode: "411001".to_string(),
        }
    }

    #[test]
    fn test_valid_address_passes() {
        assert!(sample_input().validate().is_ok());
    }

    #[test]
    fn test_short_fields_are_reported_together() {
        let input = AddressInput {
            phone_number: "12345".to_string(),
            pincode: "4110".to_string(),
            ..sample_input()
        };
        let err = input.validate().unwrap_err();
        let fields: Vec<_> = err.fields().map(|e| e.field).collect();
        assert_eq!(fields, vec!["phoneNumber", "pincode"]);
    }

    #[test]
    fn test_upsert_body_carries_id_only_when_editing() {
        let create = serde_json::to_value(sample_input()).unwrap();
        assert!(create.get("addressId").is_none());

        let existing: Address = serde_json::from_value(serde_json::json!({
            "_id": "a1",
            "phoneNumber": "9876543210",
            "addressLine1": "12 MG Road",
            "city": "Pune",
            "state": "Maharashtra",
            "pincode": "411001"
        }))
        .unwrap();
        let update = AddressInput::editing(&existing);
        assert!(update.is_update());
        assert_eq!(serde_json::to_value(update).unwrap()["addressId"], "a1");
        assert_eq!(existing.one_line(), "12 MG Road, Pune, Maharashtra 411001");
    }
}
