//! The primary store: durable keyed storage for entity records.
//!
//! Reads here are authoritative — search-mirror state never influences them.

pub mod journal;
pub mod records;

pub use journal::{Journal, JournalEntry, RecordOp};
pub use records::JournalStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Entity, PageRequest};

/// Durable keyed storage for records of one entity kind.
///
/// Identifier policy: keys are assigned exclusively by the store on create.
/// A caller-supplied id on `create` is rejected — `Conflict` when the id is
/// already present, `Validation` otherwise. `delete_by_id` of an absent id
/// raises `NotFound`; the same strict policy applies to every entity kind.
#[async_trait]
pub trait RecordStore<T: Entity>: Send + Sync {
    /// Store a new record under a freshly assigned identifier and return it
    /// with the identifier populated.
    async fn create(&self, record: T) -> Result<T>;

    /// Fully overwrite the stored record carrying the same identifier.
    async fn replace(&self, record: T) -> Result<T>;

    /// Load the record, apply only the fields the patch explicitly supplies,
    /// persist and return the merged result.
    async fn merge_patch(&self, id: T::Key, patch: T::Patch) -> Result<T>;

    async fn find_by_id(&self, id: &T::Key) -> Result<Option<T>>;

    /// List records in ascending key order. Re-querying with the same page
    /// yields the same slice as long as the store is unchanged.
    async fn find_all(&self, page: Option<PageRequest>) -> Result<Vec<T>>;

    async fn count(&self) -> Result<u64>;

    async fn delete_by_id(&self, id: &T::Key) -> Result<()>;
}
