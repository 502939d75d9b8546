use async_trait::async_trait;
use serde_json::Value;

/// Contract the pipeline requires from its shared result store.
///
/// Every operation is individually atomic; no multi-key transaction is
/// assumed. Result keys are partitioned per task (see [`super::keys`]), so
/// concurrent writers only ever contend on the task-group index, which
/// `append` mutates atomically.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Point lookup. `None` when the key is absent.
    async fn get(&self, key: &str) -> Option<Value>;

    /// Upsert.
    async fn add(&self, key: &str, value: Value);

    async fn delete(&self, key: &str);

    /// All keys starting with `prefix`.
    async fn keys_with_prefix(&self, prefix: &str) -> Vec<String>;

    /// Atomically append one element to the list stored at `key`, creating
    /// the list if absent. A non-list value at `key` is replaced.
    async fn append(&self, key: &str, value: Value);
}
