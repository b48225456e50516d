use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Mutex;
use tantivy::collector::TopDocs;
use tantivy::query::{AllQuery, BooleanQuery, Occur, Query};
use tantivy::schema::OwnedValue;
use tantivy::{Document, Index, IndexReader, IndexWriter, TantivyDocument, Term};

use crate::error::{GriddleError, Result};
use crate::search::query::{expand_bare_terms, qualify_field_paths, FilterCompiler};
use crate::search::schema::{mirror_schema, MirrorFields, RECORD_FIELD};
use crate::search::{SearchIndex, StructuredQuery};
use crate::types::{Entity, PageRequest};

const DEFAULT_WRITER_BUFFER: usize = 15_000_000;
const DEFAULT_SEARCH_LIMIT: usize = 1000;

fn writer_buffer_bytes() -> usize {
    std::env::var("GRIDDLE_WRITER_BUFFER_MB")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .map(|mb| mb * 1024 * 1024)
        .unwrap_or(DEFAULT_WRITER_BUFFER)
}

/// Tantivy-backed [`SearchIndex`].
///
/// Each record is one document: its identifier in a raw `_id` key field and
/// the full record as a stored, indexed JSON object. The single buffered
/// writer commits on every mutation and the reader reloads right after, so
/// a change is visible to searches as soon as the call returns.
pub struct TantivyMirror<T: Entity> {
    index: Index,
    reader: IndexReader,
    writer: Mutex<IndexWriter>,
    fields: MirrorFields,
    compiler: FilterCompiler,
    _kind: PhantomData<T>,
}

impl<T: Entity> TantivyMirror<T> {
    /// Open the mirror at `dir`, creating it (and the directory) if needed.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let index = if dir.join("meta.json").exists() {
            Index::open_in_dir(dir)?
        } else {
            Index::create_in_dir(dir, mirror_schema())?
        };

        let reader = index
            .reader_builder()
            .reload_policy(tantivy::ReloadPolicy::OnCommitWithDelay)
            .try_into()?;
        let writer: IndexWriter = index.writer(writer_buffer_bytes())?;
        let fields = MirrorFields::resolve(&index.schema())?;
        let compiler = FilterCompiler::new(&index, fields.record);

        Ok(TantivyMirror {
            index,
            reader,
            writer: Mutex::new(writer),
            fields,
            compiler,
            _kind: PhantomData,
        })
    }

    fn id_term(&self, id: &T::Key) -> Term {
        Term::from_field_text(self.fields.id, &id.to_string())
    }

    fn to_document(&self, id: &T::Key, record: &T) -> Result<TantivyDocument> {
        let json = serde_json::to_value(record)?;
        let mut doc = TantivyDocument::new();
        doc.add_text(self.fields.id, id.to_string());
        doc.add_object(self.fields.record, json_to_object(&json)?);
        Ok(doc)
    }

    fn record_from_doc(&self, doc: TantivyDocument) -> Result<T> {
        let named = doc.to_named_doc(&self.index.schema());
        let mut json = serde_json::to_value(&named)?;
        let stored = json
            .get_mut(RECORD_FIELD)
            .and_then(|v| v.as_array_mut())
            .filter(|arr| !arr.is_empty())
            .map(|arr| arr.remove(0))
            .ok_or_else(|| {
                GriddleError::Json(format!("document lacks a stored {} field", RECORD_FIELD))
            })?;
        Ok(serde_json::from_value(stored)?)
    }

    /// Enumerate the JSON paths that carry indexed text, from the term
    /// dictionaries of the live segments. Bare search terms are expanded
    /// across these paths.
    fn text_paths(&self) -> Vec<String> {
        let searcher = self.reader.searcher();
        let mut paths = BTreeSet::new();
        for segment in searcher.segment_readers() {
            if let Ok(inverted) = segment.inverted_index(self.fields.record) {
                if let Ok(mut terms) = inverted.terms().stream() {
                    while terms.advance() {
                        let key = terms.key();
                        if let Some(pos) = key.windows(2).position(|w| w == b"\0s") {
                            paths.insert(String::from_utf8_lossy(&key[..pos]).to_string());
                        }
                    }
                }
            }
        }
        paths.into_iter().collect()
    }

    fn user_query(&self, raw: &str) -> Result<Option<Box<dyn Query>>> {
        let query_string = if raw.contains(':') {
            qualify_field_paths(raw)
        } else {
            expand_bare_terms(raw, &self.text_paths())
        };
        if query_string.trim().is_empty() {
            return Ok(None);
        }
        self.compiler.parse(&query_string).map(Some)
    }

    fn execute(&self, query: &dyn Query, page: Option<PageRequest>) -> Result<Vec<T>> {
        let (offset, limit) = match page {
            Some(page) => (page.offset, page.limit),
            None => (0, DEFAULT_SEARCH_LIMIT),
        };
        if limit == 0 {
            return Ok(Vec::new());
        }

        let searcher = self.reader.searcher();
        let top_docs = searcher.search(query, &TopDocs::with_limit(limit).and_offset(offset))?;

        let mut records = Vec::with_capacity(top_docs.len());
        for (_score, address) in top_docs {
            let doc: TantivyDocument = searcher.doc(address)?;
            records.push(self.record_from_doc(doc)?);
        }
        Ok(records)
    }
}

#[async_trait]
impl<T: Entity> SearchIndex<T> for TantivyMirror<T> {
    async fn index_record(&self, record: &T) -> Result<()> {
        let id = record.id().ok_or_else(|| {
            GriddleError::Validation(format!("cannot index a {} without an id", T::KIND))
        })?;
        let doc = self.to_document(&id, record)?;
        {
            let mut writer = self.writer.lock().unwrap();
            writer.delete_term(self.id_term(&id));
            writer.add_document(doc)?;
            writer.commit()?;
        }
        self.reader.reload()?;
        Ok(())
    }

    async fn index_all(&self, records: &[T]) -> Result<()> {
        let mut docs = Vec::with_capacity(records.len());
        for record in records {
            let id = record.id().ok_or_else(|| {
                GriddleError::Validation(format!("cannot index a {} without an id", T::KIND))
            })?;
            docs.push((self.id_term(&id), self.to_document(&id, record)?));
        }
        {
            let mut writer = self.writer.lock().unwrap();
            for (term, doc) in docs {
                writer.delete_term(term);
                writer.add_document(doc)?;
            }
            writer.commit()?;
        }
        self.reader.reload()?;
        Ok(())
    }

    async fn delete_record(&self, id: &T::Key) -> Result<()> {
        {
            let mut writer = self.writer.lock().unwrap();
            writer.delete_term(self.id_term(id));
            writer.commit()?;
        }
        self.reader.reload()?;
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<T>> {
        match self.user_query(query)? {
            Some(parsed) => self.execute(&*parsed, None),
            None => Ok(Vec::new()),
        }
    }

    async fn search_structured(&self, query: &StructuredQuery) -> Result<Vec<T>> {
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        if let Some(text) = query.text.as_deref() {
            if let Some(parsed) = self.user_query(text)? {
                clauses.push((Occur::Must, parsed));
            }
        }
        if let Some(filter) = &query.filter {
            clauses.push((Occur::Must, self.compiler.compile(filter)?));
        }

        let compiled: Box<dyn Query> = match clauses.len() {
            0 => Box::new(AllQuery),
            1 => clauses.pop().unwrap().1,
            _ => Box::new(BooleanQuery::new(clauses)),
        };
        self.execute(&*compiled, query.page)
    }

    async fn count(&self) -> Result<u64> {
        let searcher = self.reader.searcher();
        Ok(searcher
            .segment_readers()
            .iter()
            .map(|r| r.num_docs() as u64)
            .sum())
    }

    async fn clear(&self) -> Result<()> {
        {
            let mut writer = self.writer.lock().unwrap();
            writer.delete_all_documents()?;
            writer.commit()?;
        }
        self.reader.reload()?;
        Ok(())
    }
}

fn json_to_object(value: &serde_json::Value) -> Result<BTreeMap<String, OwnedValue>> {
    match value {
        serde_json::Value::Object(map) => {
            let mut object = BTreeMap::new();
            for (k, v) in map {
                object.insert(k.clone(), json_value_to_owned(v)?);
            }
            Ok(object)
        }
        _ => Err(GriddleError::Json("expected a JSON object".to_string())),
    }
}

fn json_value_to_owned(value: &serde_json::Value) -> Result<OwnedValue> {
    match value {
        serde_json::Value::Null => Ok(OwnedValue::Null),
        serde_json::Value::Bool(b) => Ok(OwnedValue::Bool(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(OwnedValue::I64(i))
            } else if let Some(u) = n.as_u64() {
                Ok(OwnedValue::U64(u))
            } else if let Some(f) = n.as_f64() {
                Ok(OwnedValue::F64(f))
            } else {
                Err(GriddleError::Json("invalid number".to_string()))
            }
        }
        serde_json::Value::String(s) => Ok(OwnedValue::Str(s.clone())),
        serde_json::Value::Array(arr) => {
            let owned: Result<Vec<OwnedValue>> = arr.iter().map(json_value_to_owned).collect();
            Ok(OwnedValue::Array(owned?))
        }
        serde_json::Value::Object(map) => {
            let mut pairs = Vec::new();
            for (k, v) in map {
                pairs.push((k.clone(), json_value_to_owned(v)?));
            }
            Ok(OwnedValue::Object(pairs))
        }
    }
}
