use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open record store at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("record store query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("no stored record with id {0}")]
    RecordMissing(String),
}
