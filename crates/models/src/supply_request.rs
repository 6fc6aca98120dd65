use std::{fmt, str::FromStr};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::user_info::UserInfo;

/// Lifecycle label of a supply request.
///
/// Any status may be replaced by any other; the store does not enforce
/// a transition table.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Processing,
    Fulfilled,
    Cancelled,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 4] =
        [Self::Pending, Self::Processing, Self::Fulfilled, Self::Cancelled];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Fulfilled => "fulfilled",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ModelError::Validation(format!("unknown request status: {s}")))
    }
}

/// One line of a supply request, e.g. `10 liters of water`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SupplyItem {
    pub item: String,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl SupplyItem {
    pub fn new(item: impl Into<String>, quantity: i64) -> Self {
        Self { item: item.into(), quantity, unit: None }
    }
}

/// A submitted aid request.
///
/// `user_info` is a by-value snapshot taken when the request was created;
/// later changes to the stored contact record do not touch it.
/// `id` is caller supplied and not checked for uniqueness.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SupplyRequest {
    pub id: String,
    /// Creation time in epoch milliseconds.
    pub timestamp: i64,
    pub supplies: Vec<SupplyItem>,
    pub status: RequestStatus,
    pub user_info: UserInfo,
    pub raw_request: String,
}

/// Input for creating a request: id, timestamp and status are filled in
/// by [`NewSupplyRequest::into_request`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewSupplyRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub supplies: Vec<SupplyItem>,
    pub raw_request: String,
    #[serde(default)]
    pub user_info: Option<UserInfo>,
}

impl NewSupplyRequest {
    /// Build a pending request stamped with the current time.
    ///
    /// Uses the input's own `user_info` when present, otherwise
    /// `stored_user_info`. Fails when neither is available.
    pub fn into_request(self, stored_user_info: Option<UserInfo>) -> Result<SupplyRequest, ModelError> {
        let user_info = self
            .user_info
            .or(stored_user_info)
            .ok_or_else(|| ModelError::Validation("user info is required before submitting a request".into()))?;
        let id = match self.id {
            Some(id) if !id.trim().is_empty() => id,
            _ => Uuid::new_v4().to_string(),
        };
        Ok(SupplyRequest {
            id,
            timestamp: Utc::now().timestamp_millis(),
            supplies: self.supplies,
            status: RequestStatus::Pending,
            user_info,
            raw_request: self.raw_request,
        })
    }
}
