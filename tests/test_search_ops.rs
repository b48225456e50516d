mod common;

use common::{country, employee, open_catalog, task};
use griddle::{Filter, PageRequest, StructuredQuery};
use serde_json::json;

#[tokio::test]
async fn field_query_matches_exactly() {
    let (catalog, _tmp) = open_catalog();
    let countries = catalog.countries();
    countries.save(country("France")).await.unwrap();
    countries.save(country("Spain")).await.unwrap();

    let hits = countries.search("countryName:France").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].country_name.as_deref(), Some("France"));

    let none = countries.search("countryName:Atlantis").await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn bare_terms_search_across_text_fields() {
    let (catalog, _tmp) = open_catalog();
    let employees = catalog.employees();
    employees
        .save(employee("Ada", "ada@example.com", 90_000))
        .await
        .unwrap();
    employees
        .save(employee("Grace", "grace@example.com", 95_000))
        .await
        .unwrap();

    let hits = employees.search("ada").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].first_name.as_deref(), Some("Ada"));

    // A term no record carries matches nothing.
    assert!(employees.search("zzzunknown").await.unwrap().is_empty());
}

#[tokio::test]
async fn search_on_empty_mirror_is_empty() {
    let (catalog, _tmp) = open_catalog();
    assert!(catalog.tasks().search("anything").await.unwrap().is_empty());
    assert_eq!(catalog.tasks().search_count().await.unwrap(), 0);
}

#[tokio::test]
async fn upsert_overwrites_the_existing_document() {
    let (catalog, _tmp) = open_catalog();
    let countries = catalog.countries();
    let mut france = countries.save(country("France")).await.unwrap();

    france.country_name = Some("Francia".to_string());
    countries.update(france).await.unwrap();

    assert_eq!(countries.search_count().await.unwrap(), 1);
    assert!(countries
        .search("countryName:France")
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        countries.search("countryName:Francia").await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn structured_equals_filter() {
    let (catalog, _tmp) = open_catalog();
    let countries = catalog.countries();
    countries.save(country("France")).await.unwrap();
    countries.save(country("Spain")).await.unwrap();

    let query = StructuredQuery {
        text: None,
        filter: Some(Filter::Equals {
            field: "countryName".to_string(),
            value: json!("Spain"),
        }),
        page: None,
    };
    let hits = countries.search_structured(&query).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].country_name.as_deref(), Some("Spain"));
}

#[tokio::test]
async fn structured_range_filter_on_numbers() {
    let (catalog, _tmp) = open_catalog();
    let employees = catalog.employees();
    employees
        .save(employee("Ada", "ada@example.com", 90_000))
        .await
        .unwrap();
    employees
        .save(employee("Grace", "grace@example.com", 120_000))
        .await
        .unwrap();

    let query = StructuredQuery {
        text: None,
        filter: Some(Filter::Range {
            field: "salary".to_string(),
            min: 100_000.0,
            max: 200_000.0,
        }),
        page: None,
    };
    let hits = employees.search_structured(&query).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].first_name.as_deref(), Some("Grace"));
}

#[tokio::test]
async fn structured_paging_is_deterministic_and_disjoint() {
    let (catalog, _tmp) = open_catalog();
    let tasks = catalog.tasks();
    for title in ["alpha", "beta", "gamma", "delta", "epsilon"] {
        tasks.save(task(title)).await.unwrap();
    }

    let page = |offset| StructuredQuery {
        text: None,
        filter: None,
        page: Some(PageRequest::new(offset, 2)),
    };

    let first = tasks.search_structured(&page(0)).await.unwrap();
    let first_again = tasks.search_structured(&page(0)).await.unwrap();
    let second = tasks.search_structured(&page(2)).await.unwrap();
    let third = tasks.search_structured(&page(4)).await.unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);
    assert_eq!(third.len(), 1);

    let ids =
        |hits: &[griddle::Task]| -> Vec<Option<i64>> { hits.iter().map(|t| t.id).collect() };
    assert_eq!(ids(&first), ids(&first_again));

    let mut all: Vec<_> = ids(&first)
        .into_iter()
        .chain(ids(&second))
        .chain(ids(&third))
        .collect();
    let total = all.len();
    all.sort();
    all.dedup();
    assert_eq!(all.len(), total, "pages must not overlap");
}

#[tokio::test]
async fn structured_text_combines_with_filter() {
    let (catalog, _tmp) = open_catalog();
    let employees = catalog.employees();
    employees
        .save(employee("Ada", "ada@example.com", 90_000))
        .await
        .unwrap();
    employees
        .save(employee("Ada", "ada2@example.com", 150_000))
        .await
        .unwrap();

    let query = StructuredQuery {
        text: Some("firstName:Ada".to_string()),
        filter: Some(Filter::Range {
            field: "salary".to_string(),
            min: 100_000.0,
            max: 200_000.0,
        }),
        page: None,
    };
    let hits = employees.search_structured(&query).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].email.as_deref(), Some("ada2@example.com"));
}

#[tokio::test]
async fn reindex_rebuilds_the_mirror_from_the_primary_store() {
    let (catalog, _tmp) = open_catalog();
    let countries = catalog.countries();
    countries.save(country("France")).await.unwrap();
    countries.save(country("Spain")).await.unwrap();
    countries.save(country("Japan")).await.unwrap();

    let written = countries.reindex().await.unwrap();
    assert_eq!(written, 3);
    assert_eq!(countries.search_count().await.unwrap(), 3);
    assert_eq!(countries.search("countryName:Japan").await.unwrap().len(), 1);
}

#[tokio::test]
async fn search_count_tracks_mirror_documents() {
    let (catalog, _tmp) = open_catalog();
    let tasks = catalog.tasks();
    assert_eq!(tasks.search_count().await.unwrap(), 0);

    let a = tasks.save(task("alpha")).await.unwrap();
    tasks.save(task("beta")).await.unwrap();
    assert_eq!(tasks.search_count().await.unwrap(), 2);

    tasks.delete(&a.id.unwrap()).await.unwrap();
    assert_eq!(tasks.search_count().await.unwrap(), 1);
}
