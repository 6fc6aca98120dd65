//! Record types persisted by the relief request store.
//!
//! Field names serialize in camelCase so stored JSON matches what the
//! browser frontend reads and writes under the same keys.

pub mod errors;
pub mod user_info;
pub mod supply_request;

pub use supply_request::{NewSupplyRequest, RequestStatus, SupplyItem, SupplyRequest};
pub use user_info::UserInfo;
