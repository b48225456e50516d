use serde::{de::DeserializeOwned, Serialize};
use std::fmt::{Debug, Display};
use std::hash::Hash;

use crate::error::Result;

/// Record identifier used by every shipped entity kind — the store assigns
/// these from a monotonically increasing sequence.
pub type RecordId = i64;

/// An identifier type a [`RecordStore`](crate::store::RecordStore) can assign.
///
/// Keys are produced exclusively by the store from its internal sequence;
/// `from_seq`/`to_seq` let the store allocate fresh keys and recover its
/// high-water mark when replaying a journal.
pub trait EntityKey:
    Clone + Eq + Ord + Hash + Display + Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
    fn from_seq(seq: u64) -> Self;

    fn to_seq(&self) -> u64;
}

impl EntityKey for i64 {
    fn from_seq(seq: u64) -> Self {
        seq as i64
    }

    fn to_seq(&self) -> u64 {
        if *self < 0 {
            0
        } else {
            *self as u64
        }
    }
}

/// A record kind managed by the store and mirrored into the search index.
///
/// The identifier is optional on the record itself: absent before the first
/// successful create, present ever after. [`Entity::merge`] applies a merge
/// patch — only fields the patch explicitly supplies overwrite stored values.
pub trait Entity:
    Clone + Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
    type Key: EntityKey;
    type Patch: Debug + Default + Send + Sync + DeserializeOwned + 'static;

    /// Store directory / index name for this kind, e.g. `"country"`.
    const KIND: &'static str;

    fn id(&self) -> Option<Self::Key>;

    fn set_id(&mut self, id: Self::Key);

    /// Required-field checks, run before any store is touched.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn merge(&mut self, patch: Self::Patch);
}

/// Offset/limit pagination for listings and structured search.
///
/// Totals are obtained independently via `count_all` / `search_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

impl PageRequest {
    pub fn new(offset: usize, limit: usize) -> Self {
        PageRequest { offset, limit }
    }
}
