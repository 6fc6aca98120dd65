use std::sync::Arc;

use models::{RequestStatus, SupplyRequest, UserInfo};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::errors::StorageFault;
use crate::storage::KvStore;

pub const USER_INFO_KEY: &str = "disaster_relief_user_info";
pub const REQUESTS_KEY: &str = "disaster_relief_requests";

/// Typed access to the stored contact record and supply requests.
///
/// Every operation is fail-soft: storage faults are logged, counted, and
/// turned into `None`, an empty list, or a dropped write. Callers never
/// see an error.
///
/// `save_request` and `update_request_status` are read-modify-write
/// sequences. They are serialized per `RequestStore`, so tasks sharing one
/// instance cannot lose each other's updates. Separate processes writing
/// the same backing file are not coordinated.
pub struct RequestStore {
    kv: Arc<dyn KvStore>,
    rmw: Mutex<()>,
}

impl RequestStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv, rmw: Mutex::new(()) }
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageFault> {
        match self.kv.get(key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StorageFault::Deserialize(e.to_string())),
            None => Ok(None),
        }
    }

    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageFault> {
        let raw = serde_json::to_string(value).map_err(|e| StorageFault::Serialize(e.to_string()))?;
        self.kv.set(key, raw).await
    }

    async fn load_requests(&self) -> Result<Vec<SupplyRequest>, StorageFault> {
        Ok(self.read_json(REQUESTS_KEY).await?.unwrap_or_default())
    }

    /// Stored contact record, or `None` when unset or unreadable.
    pub async fn get_user_info(&self) -> Option<UserInfo> {
        self.read_json(USER_INFO_KEY)
            .await
            .unwrap_or_else(|fault| {
                absorb("get_user_info", USER_INFO_KEY, &fault);
                None
            })
    }

    /// Overwrite the contact record.
    pub async fn save_user_info(&self, info: &UserInfo) {
        if let Err(fault) = self.write_json(USER_INFO_KEY, info).await {
            absorb("save_user_info", USER_INFO_KEY, &fault);
        }
    }

    /// All requests, newest first.
    pub async fn get_requests(&self) -> Vec<SupplyRequest> {
        self.load_requests().await.unwrap_or_else(|fault| {
            absorb("get_requests", REQUESTS_KEY, &fault);
            Vec::new()
        })
    }

    /// Insert `request` at the head of the list. Ids are not checked, so a
    /// repeated id yields a second entry.
    ///
    /// An unreadable list is treated as empty and replaced. Decoding is
    /// all-or-nothing: a single entry with an unknown status or a
    /// non-integer quantity makes the whole list unreadable, so every
    /// earlier request is dropped by this save.
    pub async fn save_request(&self, request: SupplyRequest) {
        let _guard = self.rmw.lock().await;
        let mut requests = match self.load_requests().await {
            Ok(requests) => requests,
            Err(fault) if fault.is_unavailable() => {
                absorb("save_request", REQUESTS_KEY, &fault);
                return;
            }
            Err(fault) => {
                absorb("save_request", REQUESTS_KEY, &fault);
                Vec::new()
            }
        };
        let status = request.status;
        let id = request.id.clone();
        requests.insert(0, request);
        match self.write_json(REQUESTS_KEY, &requests).await {
            Ok(()) => {
                common::metrics::record_request_saved(status.as_str());
                debug!(%id, total = requests.len(), "supply request saved");
            }
            Err(fault) => absorb("save_request", REQUESTS_KEY, &fault),
        }
    }

    /// Relabel the first request (in stored order) whose id matches.
    /// Unknown ids are ignored without writing.
    pub async fn update_request_status(&self, id: &str, status: RequestStatus) {
        let _guard = self.rmw.lock().await;
        let mut requests = match self.load_requests().await {
            Ok(requests) => requests,
            Err(fault) => {
                absorb("update_request_status", REQUESTS_KEY, &fault);
                return;
            }
        };
        let Some(request) = requests.iter_mut().find(|r| r.id == id) else { return };
        let previous = std::mem::replace(&mut request.status, status);
        match self.write_json(REQUESTS_KEY, &requests).await {
            Ok(()) => debug!(%id, from = %previous, to = %status, "request status updated"),
            Err(fault) => absorb("update_request_status", REQUESTS_KEY, &fault),
        }
    }

    /// Remove the contact record and every request. Safe to repeat.
    pub async fn clear_all_data(&self) {
        let _guard = self.rmw.lock().await;
        for key in [USER_INFO_KEY, REQUESTS_KEY] {
            if let Err(fault) = self.kv.remove(key).await {
                absorb("clear_all_data", key, &fault);
            }
        }
    }
}

fn absorb(op: &'static str, key: &str, fault: &StorageFault) {
    common::metrics::record_storage_fault(op);
    warn!(op, key, error = %fault, "storage fault absorbed; using default");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryKvStore, UnavailableKvStore};
    use models::SupplyItem;

    fn user() -> UserInfo {
        UserInfo::new("555-0100", "1 Main St")
    }

    fn request(id: &str, timestamp: i64) -> SupplyRequest {
        SupplyRequest {
            id: id.into(),
            timestamp,
            supplies: vec![SupplyItem::new("water", 10)],
            status: RequestStatus::Pending,
            user_info: user(),
            raw_request: format!("request {id}"),
        }
    }

    fn setup() -> (Arc<MemoryKvStore>, RequestStore) {
        let kv = Arc::new(MemoryKvStore::new());
        let store = RequestStore::new(kv.clone());
        (kv, store)
    }

    #[tokio::test]
    async fn user_info_round_trip() {
        let (_, store) = setup();
        assert_eq!(store.get_user_info().await, None);

        store.save_user_info(&user()).await;
        assert_eq!(store.get_user_info().await, Some(user()));

        let moved = UserInfo::new("555-0199", "9 Elm St");
        store.save_user_info(&moved).await;
        assert_eq!(store.get_user_info().await, Some(moved));
    }

    #[tokio::test]
    async fn requests_are_newest_first() {
        let (_, store) = setup();
        assert!(store.get_requests().await.is_empty());

        for (id, ts) in [("r1", 1), ("r2", 2), ("r3", 3)] {
            store.save_request(request(id, ts)).await;
        }
        let ids: Vec<_> = store.get_requests().await.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, ["r3", "r2", "r1"]);
    }

    #[tokio::test]
    async fn status_update_touches_only_the_match() {
        let (_, store) = setup();
        store.save_request(request("a", 1)).await;
        store.save_request(request("b", 2)).await;

        store.update_request_status("a", RequestStatus::Processing).await;

        let requests = store.get_requests().await;
        let mut expected_a = request("a", 1);
        expected_a.status = RequestStatus::Processing;
        assert_eq!(requests, vec![request("b", 2), expected_a]);
    }

    #[tokio::test]
    async fn unknown_id_leaves_stored_bytes_unchanged() -> Result<(), anyhow::Error> {
        let (kv, store) = setup();
        store.save_request(request("a", 1)).await;
        let before = kv.get(REQUESTS_KEY).await?;

        store.update_request_status("missing", RequestStatus::Cancelled).await;

        assert_eq!(kv.get(REQUESTS_KEY).await?, before);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_ids_update_first_in_stored_order() {
        let (_, store) = setup();
        store.save_request(request("dup", 1)).await;
        store.save_request(request("dup", 2)).await;
        assert_eq!(store.get_requests().await.len(), 2);

        store.update_request_status("dup", RequestStatus::Fulfilled).await;

        let requests = store.get_requests().await;
        assert_eq!(requests[0].timestamp, 2);
        assert_eq!(requests[0].status, RequestStatus::Fulfilled);
        assert_eq!(requests[1].timestamp, 1);
        assert_eq!(requests[1].status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn any_status_may_follow_any_other() {
        let (_, store) = setup();
        store.save_request(request("r", 1)).await;
        for status in [RequestStatus::Cancelled, RequestStatus::Pending, RequestStatus::Fulfilled, RequestStatus::Processing] {
            store.update_request_status("r", status).await;
            assert_eq!(store.get_requests().await[0].status, status);
        }
    }

    #[tokio::test]
    async fn clear_removes_everything_and_is_idempotent() {
        let (kv, store) = setup();
        store.save_user_info(&user()).await;
        store.save_request(request("r1", 1)).await;

        store.clear_all_data().await;
        assert_eq!(store.get_user_info().await, None);
        assert!(store.get_requests().await.is_empty());
        assert!(kv.is_empty().await);

        store.clear_all_data().await;
        assert!(kv.is_empty().await);
    }

    #[tokio::test]
    async fn corrupt_values_degrade_to_defaults() -> Result<(), anyhow::Error> {
        let (kv, store) = setup();
        kv.set(USER_INFO_KEY, "{\"phoneNumber\":".into()).await?;
        kv.set(REQUESTS_KEY, "not json at all".into()).await?;

        assert_eq!(store.get_user_info().await, None);
        assert!(store.get_requests().await.is_empty());

        // a status update on a corrupt list does not rewrite it
        store.update_request_status("r1", RequestStatus::Fulfilled).await;
        assert_eq!(kv.get(REQUESTS_KEY).await?.as_deref(), Some("not json at all"));

        // saving replaces the corrupt list
        store.save_request(request("r1", 1)).await;
        assert_eq!(store.get_requests().await, vec![request("r1", 1)]);
        Ok(())
    }

    #[tokio::test]
    async fn one_undecodable_entry_drops_the_list_on_next_save() -> Result<(), anyhow::Error> {
        let (kv, store) = setup();
        store.save_request(request("r1", 1)).await;
        let raw = kv.get(REQUESTS_KEY).await?.unwrap_or_default();
        let mut entries: Vec<serde_json::Value> = serde_json::from_str(&raw)?;
        let mut foreign = entries[0].clone();
        foreign["id"] = "r0".into();
        foreign["status"] = "lost".into();
        entries.push(foreign);
        kv.set(REQUESTS_KEY, serde_json::to_string(&entries)?).await?;

        assert!(store.get_requests().await.is_empty());

        store.save_request(request("r2", 2)).await;
        assert_eq!(store.get_requests().await, vec![request("r2", 2)]);
        Ok(())
    }

    #[tokio::test]
    async fn unavailable_storage_never_fails_the_caller() {
        let store = RequestStore::new(Arc::new(UnavailableKvStore));
        store.save_user_info(&user()).await;
        store.save_request(request("r1", 1)).await;
        store.update_request_status("r1", RequestStatus::Fulfilled).await;
        store.clear_all_data().await;

        assert_eq!(store.get_user_info().await, None);
        assert!(store.get_requests().await.is_empty());
    }

    #[tokio::test]
    async fn rejected_write_keeps_previous_list() {
        // room for one short request list, not two
        let kv = Arc::new(MemoryKvStore::with_quota(Some(400)));
        let store = RequestStore::new(kv);
        store.save_request(request("r1", 1)).await;
        assert_eq!(store.get_requests().await.len(), 1);

        let mut big = request("r2", 2);
        big.raw_request = "x".repeat(1000);
        store.save_request(big).await;

        assert_eq!(store.get_requests().await, vec![request("r1", 1)]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_saves_do_not_lose_requests() {
        let (_, store) = setup();
        let store = Arc::new(store);
        let handles: Vec<_> = (0..32)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.save_request(request(&format!("r{i}"), i)).await })
            })
            .collect();
        for handle in handles {
            handle.await.expect("save task panicked");
        }

        let requests = store.get_requests().await;
        assert_eq!(requests.len(), 32);
        let mut ids: Vec<_> = requests.into_iter().map(|r| r.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 32);
    }

    #[tokio::test]
    async fn relief_scenario_water_request_fulfilled() {
        let (_, store) = setup();
        store.save_user_info(&user()).await;
        let original = SupplyRequest {
            id: "r1".into(),
            timestamp: 1000,
            supplies: vec![SupplyItem::new("water", 10)],
            status: RequestStatus::Pending,
            user_info: store.get_user_info().await.unwrap_or_default(),
            raw_request: "need water".into(),
        };
        store.save_request(original.clone()).await;

        store.update_request_status("r1", RequestStatus::Fulfilled).await;

        let stored = &store.get_requests().await[0];
        assert_eq!(stored.status, RequestStatus::Fulfilled);
        assert_eq!(SupplyRequest { status: RequestStatus::Pending, ..stored.clone() }, original);
    }

    #[tokio::test]
    async fn request_snapshot_survives_user_info_change() {
        let (_, store) = setup();
        store.save_user_info(&user()).await;
        store.save_request(request("r1", 1)).await;
        store.save_user_info(&UserInfo::new("000", "elsewhere")).await;

        assert_eq!(store.get_requests().await[0].user_info, user());
    }
}
