use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::{
    Country, Department, Employee, Job, JobHistory, Location, Region, Task,
};
use crate::error::Result;
use crate::search::TantivyMirror;
use crate::store::JournalStore;
use crate::sync::EntityService;
use crate::types::Entity;

/// All entity services over one base directory.
///
/// Each kind owns `<base>/<kind>/records` (journal-backed primary store)
/// and `<base>/<kind>/search` (Tantivy mirror). Everything is opened
/// eagerly so a bad directory fails at startup, not on first use.
pub struct Catalog {
    base_path: PathBuf,
    regions: EntityService<Region>,
    countries: EntityService<Country>,
    locations: EntityService<Location>,
    departments: EntityService<Department>,
    tasks: EntityService<Task>,
    employees: EntityService<Employee>,
    jobs: EntityService<Job>,
    job_histories: EntityService<JobHistory>,
}

impl Catalog {
    pub fn open<P: AsRef<Path>>(base_path: P) -> Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        Ok(Catalog {
            regions: open_service(&base_path)?,
            countries: open_service(&base_path)?,
            locations: open_service(&base_path)?,
            departments: open_service(&base_path)?,
            tasks: open_service(&base_path)?,
            employees: open_service(&base_path)?,
            jobs: open_service(&base_path)?,
            job_histories: open_service(&base_path)?,
            base_path,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn regions(&self) -> &EntityService<Region> {
        &self.regions
    }

    pub fn countries(&self) -> &EntityService<Country> {
        &self.countries
    }

    pub fn locations(&self) -> &EntityService<Location> {
        &self.locations
    }

    pub fn departments(&self) -> &EntityService<Department> {
        &self.departments
    }

    pub fn tasks(&self) -> &EntityService<Task> {
        &self.tasks
    }

    pub fn employees(&self) -> &EntityService<Employee> {
        &self.employees
    }

    pub fn jobs(&self) -> &EntityService<Job> {
        &self.jobs
    }

    pub fn job_histories(&self) -> &EntityService<JobHistory> {
        &self.job_histories
    }
}

fn open_service<T: Entity>(base_path: &Path) -> Result<EntityService<T>> {
    let kind_dir = base_path.join(T::KIND);
    let store = JournalStore::<T>::open(kind_dir.join("records"))?;
    let mirror = TantivyMirror::<T>::open(kind_dir.join("search"))?;
    Ok(EntityService::new(Arc::new(store), Arc::new(mirror)))
}
