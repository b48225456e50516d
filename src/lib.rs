//! # Griddle
//!
//! A keyed record store with an eventually-consistent full-text search
//! mirror, built on [Tantivy](https://github.com/quickwit-oss/tantivy).
//!
//! The primary store is the system of record: an append-only journal plus
//! an in-memory ordered map, replayed on open. Every mutation is pushed to
//! a Tantivy-backed search mirror in the same call, best-effort — a mirror
//! failure never unwinds a primary write. Search always runs against the
//! mirror, reads always run against the primary store.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use griddle::{Catalog, Country};
//!
//! # async fn demo() -> griddle::Result<()> {
//! let catalog = Catalog::open("./data")?;
//!
//! let france = catalog
//!     .countries()
//!     .save(Country {
//!         id: None,
//!         country_name: Some("France".to_string()),
//!         region_id: None,
//!     })
//!     .await?;
//!
//! // The identifier is store-assigned; the record is searchable already.
//! let hits = catalog.countries().search("countryName:France").await?;
//! assert_eq!(hits[0].id, france.id);
//! # Ok(())
//! # }
//! ```
//!
//! ## Consistency model
//!
//! Writes are dual but not transactional: the primary write completes
//! first and stands regardless of what the mirror does. Dropped mirror
//! propagations are counted on the service's [`sync::Propagation`] policy
//! and reconciled with [`sync::EntityService::reindex`].

pub mod catalog;
pub mod domain;
pub mod error;
pub mod search;
pub mod store;
pub mod sync;
pub mod types;

pub use catalog::Catalog;
pub use domain::{
    Country, CountryPatch, Department, DepartmentPatch, Employee, EmployeePatch, Job,
    JobHistory, JobHistoryPatch, JobPatch, Language, Location, LocationPatch, Region,
    RegionPatch, Task, TaskPatch,
};
pub use error::{GriddleError, Result};
pub use search::{Filter, SearchIndex, StructuredQuery, TantivyMirror};
pub use store::{JournalStore, RecordStore};
pub use sync::{EntityService, Propagation};
pub use types::{Entity, EntityKey, PageRequest, RecordId};

/// Initialize a `tracing` subscriber from `RUST_LOG`, defaulting to `info`.
///
/// Call once at startup if the embedding application does not install its
/// own subscriber. Safe to call more than once.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
