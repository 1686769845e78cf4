#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Cannot connect to document store: {0}")]
    Connection(#[from] diesel::ConnectionError),
    #[error("Document store query failed: {0}")]
    Query(#[from] diesel::result::Error),
    #[error("Migration failed: {0}")]
    Migration(String),
    #[error("Document in {collection} has no usable _id")]
    MissingId { collection: String },
    #[error("Document {id} already exists in {collection}")]
    Duplicate { collection: String, id: String },
    #[error("Cannot decode document from {collection}: {source}")]
    Decode {
        collection: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Cannot encode document for {collection}: {source}")]
    Encode {
        collection: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;
