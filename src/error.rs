#[derive(Debug, thiserror::Error)]
pub enum AuctionError {
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A request filter is missing or malformed.
    #[error("Invalid filter: {0}")]
    Validation(String),

    /// The primary store could not answer a listing query.
    #[error("Store error: {0}")]
    Store(String),

    /// The live-retrieval collaborator failed.
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// A grouped query failed against the primary store. Never swallowed.
    #[error("Aggregation query failed: {0}")]
    AggregationStore(#[source] Box<AuctionError>),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl AuctionError {
    /// True for failures the caller caused (bad filters), as opposed to
    /// failures of the store or the process.
    pub fn is_validation(&self) -> bool {
        matches!(self, AuctionError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, AuctionError>;
