//! The search mirror: a derived, query-optimized projection of the primary
//! store, eventually consistent with it. Never a read-of-record.

pub mod mirror;
pub mod query;
pub mod schema;

pub use mirror::TantivyMirror;
pub use query::{Filter, StructuredQuery};

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Entity;

/// A queryable secondary index over records of one entity kind.
///
/// Upserts are keyed by record identifier and overwrite any existing
/// document with the same key; deletes are idempotent. The free query-string
/// grammar (`field:value`, ranges, boolean combinators) belongs to the
/// underlying engine and is forwarded, not reimplemented.
#[async_trait]
pub trait SearchIndex<T: Entity>: Send + Sync {
    async fn index_record(&self, record: &T) -> Result<()>;

    /// Bulk upsert, used for index rebuilds. Implementations that can batch
    /// should override this; the default indexes one record at a time.
    async fn index_all(&self, records: &[T]) -> Result<()> {
        for record in records {
            self.index_record(record).await?;
        }
        Ok(())
    }

    async fn delete_record(&self, id: &T::Key) -> Result<()>;

    /// Execute a free query string, engine-default order.
    async fn search(&self, query: &str) -> Result<Vec<T>>;

    /// Execute a pre-built query with deterministic paging.
    async fn search_structured(&self, query: &StructuredQuery) -> Result<Vec<T>>;

    async fn count(&self) -> Result<u64>;

    /// Administrative wipe, used for index rebuilds.
    async fn clear(&self) -> Result<()>;
}
