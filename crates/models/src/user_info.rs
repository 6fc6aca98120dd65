use serde::{Deserialize, Serialize};

/// Contact details of the person requesting aid.
///
/// Stored as a singleton and overwritten on every save. Both fields are
/// free-form; nothing is validated.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub phone_number: String,
    pub address: String,
}

impl UserInfo {
    pub fn new(phone_number: impl Into<String>, address: impl Into<String>) -> Self {
        Self { phone_number: phone_number.into(), address: address.into() }
    }
}
