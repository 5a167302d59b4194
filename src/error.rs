use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors raised by catalog operations.
///
/// The first group are precondition violations: recoverable, checked against
/// the in-memory schema before any physical effect. `HandleMissing` signals
/// that the catalog and the handle registry disagree, which is an internal
/// fault rather than a user error.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("database '{0}' already exists")]
    DatabaseExists(String),
    #[error("database '{0}' not found")]
    DatabaseNotFound(String),
    #[error("table '{0}' already exists")]
    TableExists(String),
    #[error("table '{0}' not found")]
    TableNotFound(String),
    #[error("index on table '{0}' covering ({1}) already exists")]
    IndexExists(String, String),
    #[error("index on table '{0}' covering ({1}) not found")]
    IndexNotFound(String, String),
    #[error("column '{0}' not found")]
    ColumnNotFound(String),
    #[error("column '{0}' defined more than once")]
    DuplicateColumn(String),
    #[error("no open handle registered for '{0}'")]
    HandleMissing(String),
    #[error("metadata file is not parseable: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
