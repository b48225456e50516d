use tantivy::schema::{
    Field, IndexRecordOption, JsonObjectOptions, Schema, TextFieldIndexing, STORED, STRING,
};

use crate::error::{GriddleError, Result};

/// Raw string key field, used for upsert-by-term and delete-by-term.
pub const ID_FIELD: &str = "_id";
/// Stored and indexed JSON projection of the full record. Query strings
/// address fields as paths under this name, e.g. `record.countryName`.
pub const RECORD_FIELD: &str = "record";

/// The fixed mirror schema: every entity kind indexes the same two fields.
pub fn mirror_schema() -> Schema {
    let mut builder = Schema::builder();

    builder.add_text_field(ID_FIELD, STRING | STORED);

    let record_indexing = TextFieldIndexing::default()
        .set_tokenizer("default")
        .set_index_option(IndexRecordOption::WithFreqsAndPositions);
    let record_opts = JsonObjectOptions::default()
        .set_stored()
        .set_indexing_options(record_indexing)
        .set_fast(None);
    builder.add_json_field(RECORD_FIELD, record_opts);

    builder.build()
}

#[derive(Debug, Clone, Copy)]
pub struct MirrorFields {
    pub id: Field,
    pub record: Field,
}

impl MirrorFields {
    pub fn resolve(schema: &Schema) -> Result<Self> {
        let id = schema
            .get_field(ID_FIELD)
            .map_err(|_| GriddleError::Config(format!("mirror schema lacks {}", ID_FIELD)))?;
        let record = schema
            .get_field(RECORD_FIELD)
            .map_err(|_| GriddleError::Config(format!("mirror schema lacks {}", RECORD_FIELD)))?;
        Ok(MirrorFields { id, record })
    }
}
