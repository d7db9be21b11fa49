//! Key-value store abstraction.
//!
//! The analytics engine only ever talks to this trait, so the hosted KV
//! service behind it is swappable (and trivially fakeable in tests). The
//! primitive set mirrors what the rollup schema actually needs: string
//! hashes with atomic integer increments, membership sets, and plain keys
//! with optional expiry.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Result;

/// Abstract asynchronous key-value store. Every operation may fail
/// independently; callers decide whether a failure is fatal (the analytics
/// engine never treats one as such).
#[async_trait::async_trait]
pub trait KvStore: Send + Sync + 'static {
    /// Set (or overwrite) string fields on the hash at `key`, creating the
    /// hash if it does not exist.
    async fn hash_set(&self, key: &str, fields: &[(String, String)]) -> Result<()>;

    /// Read one hash field. `Ok(None)` when the hash or field is absent.
    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>>;

    /// Read all fields of a hash. Absent hash ⇒ empty map. Returns a
    /// `BTreeMap` so iteration order is deterministic — repeated reads of
    /// unchanged data must merge in the same order.
    async fn hash_get_all(&self, key: &str) -> Result<BTreeMap<String, String>>;

    /// Atomically add `delta` to the integer value of a hash field,
    /// treating an absent field as 0. Returns the new value.
    async fn hash_incr(&self, key: &str, field: &str, delta: i64) -> Result<i64>;

    /// Add `member` to the set at `key`. Returns `true` if the member was
    /// newly inserted, `false` if it was already present.
    async fn set_add(&self, key: &str, member: &str) -> Result<bool>;

    /// All members of the set at `key`, sorted. Absent set ⇒ empty.
    async fn set_members(&self, key: &str) -> Result<Vec<String>>;

    /// Set a plain string key that expires after `ttl`.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Read a plain string key. `Ok(None)` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Delete a plain key. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}
