use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::error::{GriddleError, Result};
use crate::store::journal::{Journal, RecordOp};
use crate::store::RecordStore;
use crate::types::{Entity, EntityKey, PageRequest};

/// Journal-backed [`RecordStore`]: an in-memory ordered map made durable by
/// an append-only journal that is replayed on open.
///
/// Key allocation is a high-water mark recovered from the journal — deleted
/// keys stay burned, so identifiers are never reused across restarts.
pub struct JournalStore<T: Entity> {
    journal: Journal,
    records: RwLock<BTreeMap<T::Key, T>>,
    high_water: AtomicU64,
}

impl<T: Entity> JournalStore<T> {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let journal = Journal::open(dir.as_ref())?;

        let mut records = BTreeMap::new();
        let mut high_water = 0u64;
        for entry in journal.read_all()? {
            let key: T::Key = serde_json::from_value(entry.key)?;
            high_water = high_water.max(key.to_seq());
            match entry.op {
                RecordOp::Create | RecordOp::Replace => {
                    let value = entry.record.ok_or_else(|| {
                        GriddleError::Io(format!(
                            "{} journal entry {} has no record payload",
                            T::KIND,
                            entry.seq
                        ))
                    })?;
                    records.insert(key, serde_json::from_value(value)?);
                }
                RecordOp::Delete => {
                    records.remove(&key);
                }
            }
        }

        Ok(JournalStore {
            journal,
            records: RwLock::new(records),
            high_water: AtomicU64::new(high_water),
        })
    }

    fn not_found(id: &T::Key) -> GriddleError {
        GriddleError::NotFound(format!("{} {}", T::KIND, id))
    }
}

#[async_trait]
impl<T: Entity> RecordStore<T> for JournalStore<T> {
    async fn create(&self, mut record: T) -> Result<T> {
        if let Some(id) = record.id() {
            let records = self.records.read().unwrap();
            return Err(if records.contains_key(&id) {
                GriddleError::Conflict(format!("{} {}", T::KIND, id))
            } else {
                GriddleError::Validation(format!(
                    "a new {} must not carry an id",
                    T::KIND
                ))
            });
        }

        let mut records = self.records.write().unwrap();
        let key = T::Key::from_seq(self.high_water.fetch_add(1, Ordering::SeqCst) + 1);
        record.set_id(key.clone());
        self.journal.append(
            RecordOp::Create,
            serde_json::to_value(&key)?,
            Some(serde_json::to_value(&record)?),
        )?;
        records.insert(key, record.clone());
        Ok(record)
    }

    async fn replace(&self, record: T) -> Result<T> {
        let id = record.id().ok_or_else(|| {
            GriddleError::Validation(format!("an existing {} must carry an id", T::KIND))
        })?;

        let mut records = self.records.write().unwrap();
        if !records.contains_key(&id) {
            return Err(Self::not_found(&id));
        }
        self.journal.append(
            RecordOp::Replace,
            serde_json::to_value(&id)?,
            Some(serde_json::to_value(&record)?),
        )?;
        records.insert(id, record.clone());
        Ok(record)
    }

    async fn merge_patch(&self, id: T::Key, patch: T::Patch) -> Result<T> {
        let mut records = self.records.write().unwrap();
        let existing = records.get(&id).ok_or_else(|| Self::not_found(&id))?;

        let mut merged = existing.clone();
        merged.merge(patch);
        self.journal.append(
            RecordOp::Replace,
            serde_json::to_value(&id)?,
            Some(serde_json::to_value(&merged)?),
        )?;
        records.insert(id, merged.clone());
        Ok(merged)
    }

    async fn find_by_id(&self, id: &T::Key) -> Result<Option<T>> {
        Ok(self.records.read().unwrap().get(id).cloned())
    }

    async fn find_all(&self, page: Option<PageRequest>) -> Result<Vec<T>> {
        let records = self.records.read().unwrap();
        let all = records.values();
        Ok(match page {
            Some(page) => all.skip(page.offset).take(page.limit).cloned().collect(),
            None => all.cloned().collect(),
        })
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.records.read().unwrap().len() as u64)
    }

    async fn delete_by_id(&self, id: &T::Key) -> Result<()> {
        let mut records = self.records.write().unwrap();
        if !records.contains_key(id) {
            return Err(Self::not_found(id));
        }
        self.journal
            .append(RecordOp::Delete, serde_json::to_value(id)?, None)?;
        records.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Region, RegionPatch};
    use tempfile::TempDir;

    fn region(name: &str) -> Region {
        Region {
            id: None,
            region_name: Some(name.to_string()),
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let tmp = TempDir::new().unwrap();
        let store = JournalStore::<Region>::open(tmp.path()).unwrap();

        let emea = store.create(region("EMEA")).await.unwrap();
        let apac = store.create(region("APAC")).await.unwrap();
        assert_eq!(emea.id, Some(1));
        assert_eq!(apac.id, Some(2));

        let loaded = store.find_by_id(&1).await.unwrap().unwrap();
        assert_eq!(loaded, emea);
    }

    #[tokio::test]
    async fn create_rejects_caller_supplied_ids() {
        let tmp = TempDir::new().unwrap();
        let store = JournalStore::<Region>::open(tmp.path()).unwrap();
        store.create(region("EMEA")).await.unwrap();

        let mut with_existing = region("LATAM");
        with_existing.id = Some(1);
        assert!(matches!(
            store.create(with_existing).await,
            Err(GriddleError::Conflict(_))
        ));

        let mut with_fresh = region("LATAM");
        with_fresh.id = Some(99);
        assert!(matches!(
            store.create(with_fresh).await,
            Err(GriddleError::Validation(_))
        ));

        // Neither attempt changed the record set.
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn merge_patch_leaves_untouched_fields() {
        let tmp = TempDir::new().unwrap();
        let store = JournalStore::<Region>::open(tmp.path()).unwrap();
        let emea = store.create(region("EMEA")).await.unwrap();

        let patched = store
            .merge_patch(
                emea.id.unwrap(),
                RegionPatch {
                    region_name: Some("APAC".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.region_name.as_deref(), Some("APAC"));

        let unchanged = store
            .merge_patch(emea.id.unwrap(), RegionPatch::default())
            .await
            .unwrap();
        assert_eq!(unchanged.region_name.as_deref(), Some("APAC"));
    }

    #[tokio::test]
    async fn merge_patch_of_absent_id_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let store = JournalStore::<Region>::open(tmp.path()).unwrap();
        assert!(matches!(
            store.merge_patch(41, RegionPatch::default()).await,
            Err(GriddleError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_is_strict() {
        let tmp = TempDir::new().unwrap();
        let store = JournalStore::<Region>::open(tmp.path()).unwrap();
        let emea = store.create(region("EMEA")).await.unwrap();

        store.delete_by_id(&emea.id.unwrap()).await.unwrap();
        assert!(store.find_by_id(&emea.id.unwrap()).await.unwrap().is_none());
        assert!(matches!(
            store.delete_by_id(&emea.id.unwrap()).await,
            Err(GriddleError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn find_all_pages_in_key_order() {
        let tmp = TempDir::new().unwrap();
        let store = JournalStore::<Region>::open(tmp.path()).unwrap();
        for name in ["a", "b", "c", "d", "e"] {
            store.create(region(name)).await.unwrap();
        }

        let page = store
            .find_all(Some(PageRequest::new(1, 2)))
            .await
            .unwrap();
        let names: Vec<_> = page
            .iter()
            .map(|r| r.region_name.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["b", "c"]);

        // Restartable: the same page again yields the same slice.
        let again = store.find_all(Some(PageRequest::new(1, 2))).await.unwrap();
        assert_eq!(page, again);

        assert_eq!(store.find_all(None).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn reopen_replays_journal_and_burns_deleted_ids() {
        let tmp = TempDir::new().unwrap();
        {
            let store = JournalStore::<Region>::open(tmp.path()).unwrap();
            store.create(region("EMEA")).await.unwrap();
            let apac = store.create(region("APAC")).await.unwrap();
            store.delete_by_id(&apac.id.unwrap()).await.unwrap();
        }

        let store = JournalStore::<Region>::open(tmp.path()).unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(store.find_by_id(&2).await.unwrap().is_none());

        // Id 2 was deleted but stays burned: the next create takes 3.
        let latam = store.create(region("LATAM")).await.unwrap();
        assert_eq!(latam.id, Some(3));
    }
}
