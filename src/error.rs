use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum GriddleError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Record already exists: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Search mirror propagation failed: {0}")]
    IndexPropagation(String),

    #[error("Query parse error: {0}")]
    QueryParse(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Tantivy error: {0}")]
    Tantivy(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, GriddleError>;

impl From<std::io::Error> for GriddleError {
    fn from(e: std::io::Error) -> Self {
        GriddleError::Io(e.to_string())
    }
}

impl From<tantivy::TantivyError> for GriddleError {
    fn from(e: tantivy::TantivyError) -> Self {
        GriddleError::Tantivy(e.to_string())
    }
}

impl From<tantivy::query::QueryParserError> for GriddleError {
    fn from(e: tantivy::query::QueryParserError) -> Self {
        GriddleError::QueryParse(e.to_string())
    }
}

impl From<serde_json::Error> for GriddleError {
    fn from(e: serde_json::Error) -> Self {
        GriddleError::Json(e.to_string())
    }
}

impl GriddleError {
    /// Status code an upstream HTTP/RPC transport should map this error to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GriddleError::NotFound(_) => StatusCode::NOT_FOUND,
            GriddleError::Conflict(_) => StatusCode::CONFLICT,
            GriddleError::Validation(_) => StatusCode::BAD_REQUEST,
            GriddleError::IndexPropagation(_) => StatusCode::BAD_GATEWAY,
            GriddleError::QueryParse(_) => StatusCode::BAD_REQUEST,
            GriddleError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GriddleError::Tantivy(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GriddleError::Json(_) => StatusCode::BAD_REQUEST,
            GriddleError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
