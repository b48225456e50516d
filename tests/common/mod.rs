use griddle::{Catalog, Country, Employee, Region, Task};
use tempfile::TempDir;

/// Open a catalog over a fresh temporary directory. The `TempDir` must stay
/// alive for the duration of the test.
#[allow(dead_code)]
pub fn open_catalog() -> (Catalog, TempDir) {
    let tmp = TempDir::new().unwrap();
    let catalog = Catalog::open(tmp.path()).unwrap();
    (catalog, tmp)
}

#[allow(dead_code)]
pub fn region(name: &str) -> Region {
    Region {
        id: None,
        region_name: Some(name.to_string()),
    }
}

#[allow(dead_code)]
pub fn country(name: &str) -> Country {
    Country {
        id: None,
        country_name: Some(name.to_string()),
        region_id: None,
    }
}

#[allow(dead_code)]
pub fn task(title: &str) -> Task {
    Task {
        id: None,
        title: Some(title.to_string()),
        description: None,
    }
}

#[allow(dead_code)]
pub fn employee(first_name: &str, email: &str, salary: i64) -> Employee {
    Employee {
        id: None,
        first_name: Some(first_name.to_string()),
        last_name: None,
        email: Some(email.to_string()),
        phone_number: None,
        hire_date: None,
        salary: Some(salary),
        commission_pct: None,
        department_id: None,
        manager_id: None,
    }
}
