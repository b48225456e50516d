use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tantivy::query::{AllQuery, BooleanQuery, Occur, Query};

use crate::error::{GriddleError, Result};
use crate::search::schema::RECORD_FIELD;
use crate::types::PageRequest;

/// A composable filter tree for structured search, rendered onto the
/// engine's query-string grammar.
#[derive(Debug, Clone)]
pub enum Filter {
    Equals { field: String, value: Value },
    Range { field: String, min: f64, max: f64 },
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

/// A pre-built query: optional free text, optional filter tree, optional
/// pagination for deterministic paging over search results.
#[derive(Debug, Clone, Default)]
pub struct StructuredQuery {
    pub text: Option<String>,
    pub filter: Option<Filter>,
    pub page: Option<PageRequest>,
}

const MAX_FILTER_DEPTH: usize = 10;

/// Compiles filter trees and user query strings into Tantivy queries.
///
/// `Equals`/`Range`/`And`/`Or` render to the engine's own grammar and go
/// through its parser; `Not` needs hybrid compilation because pure negation
/// has no query-string form the parser accepts on its own.
pub struct FilterCompiler {
    parser: tantivy::query::QueryParser,
}

impl FilterCompiler {
    pub fn new(index: &tantivy::Index, record_field: tantivy::schema::Field) -> Self {
        FilterCompiler {
            parser: tantivy::query::QueryParser::for_index(index, vec![record_field]),
        }
    }

    pub fn parse(&self, query_string: &str) -> Result<Box<dyn Query>> {
        self.parser
            .parse_query(query_string)
            .map_err(GriddleError::from)
    }

    pub fn compile(&self, filter: &Filter) -> Result<Box<dyn Query>> {
        self.compile_inner(filter, 0)
    }

    fn compile_inner(&self, filter: &Filter, depth: usize) -> Result<Box<dyn Query>> {
        if depth > MAX_FILTER_DEPTH {
            return Err(GriddleError::QueryParse(format!(
                "filter nesting exceeds {} levels",
                MAX_FILTER_DEPTH
            )));
        }

        match filter {
            Filter::Not(inner) => {
                let inner_query = self.compile_inner(inner, depth + 1)?;
                Ok(Box::new(BooleanQuery::new(vec![
                    (Occur::Must, Box::new(AllQuery) as Box<dyn Query>),
                    (Occur::MustNot, inner_query),
                ])))
            }
            Filter::And(filters) => {
                let mut subqueries = Vec::new();
                for f in filters {
                    subqueries.push((Occur::Must, self.compile_inner(f, depth + 1)?));
                }
                Ok(Box::new(BooleanQuery::new(subqueries)))
            }
            Filter::Or(filters) => {
                let mut subqueries = Vec::new();
                for f in filters {
                    subqueries.push((Occur::Should, self.compile_inner(f, depth + 1)?));
                }
                Ok(Box::new(BooleanQuery::new(subqueries)))
            }
            _ => self.parse(&filter_to_query_string(filter)?),
        }
    }
}

fn filter_to_query_string(filter: &Filter) -> Result<String> {
    match filter {
        Filter::Equals { field, value } => match value {
            Value::String(s) => Ok(format!(
                "{}.{}:{}",
                RECORD_FIELD,
                field,
                format_text_value(s)
            )),
            Value::Number(n) => Ok(format!(
                "{}.{}:[{} TO {}]",
                RECORD_FIELD, field, n, n
            )),
            _ => Err(GriddleError::QueryParse(
                "equals filters support text and numeric values".to_string(),
            )),
        },
        Filter::Range { field, min, max } => Ok(format!(
            "{}.{}:[{} TO {}]",
            RECORD_FIELD, field, min, max
        )),
        Filter::And(filters) => {
            let parts: Result<Vec<_>> = filters.iter().map(filter_to_query_string).collect();
            Ok(format!("({})", parts?.join(" AND ")))
        }
        Filter::Or(filters) => {
            let parts: Result<Vec<_>> = filters.iter().map(filter_to_query_string).collect();
            Ok(format!("({})", parts?.join(" OR ")))
        }
        Filter::Not(_) => Err(GriddleError::QueryParse(
            "NOT filters use hybrid compilation".to_string(),
        )),
    }
}

fn format_text_value(s: &str) -> String {
    if s.contains(' ') || s.contains(':') {
        format!("\"{}\"", s.replace('"', "\\\""))
    } else {
        s.to_string()
    }
}

static FIELD_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[\s(+-])([A-Za-z_][A-Za-z0-9_.]*):").unwrap());

/// Rewrite `field:value` tokens in a user query string onto the record
/// JSON field, so `countryName:France` addresses `record.countryName`.
/// Already-qualified paths are left alone.
pub(crate) fn qualify_field_paths(query: &str) -> String {
    FIELD_PREFIX
        .replace_all(query, |caps: &regex::Captures<'_>| {
            let field = &caps[2];
            if field == RECORD_FIELD || field.starts_with(&format!("{}.", RECORD_FIELD)) {
                caps[0].to_string()
            } else {
                format!("{}{}.{}:", &caps[1], RECORD_FIELD, field)
            }
        })
        .to_string()
}

/// Expand bare terms across the indexed text paths, OR-joined, the way the
/// engine-default "search everywhere" behaves. `paths` comes from the
/// mirror's term-dictionary enumeration.
pub(crate) fn expand_bare_terms(query: &str, paths: &[String]) -> String {
    let mut clauses = Vec::new();
    for token in query.split_whitespace() {
        for path in paths {
            clauses.push(format!("{}.{}:{}", RECORD_FIELD, path, token));
        }
    }
    clauses.join(" OR ")
}
