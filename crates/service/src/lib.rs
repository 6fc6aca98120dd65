//! Service layer for the relief request store.
//! - `storage`: the key-value port and its backends.
//! - `request_store`: typed, fail-soft access to user info and supply requests.

pub mod errors;
pub mod runtime;
pub mod storage;
pub mod request_store;

pub use errors::StorageFault;
pub use request_store::RequestStore;
