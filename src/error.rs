#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request failed")]
    Request(#[from] reqwest::Error),
    #[error("{url} responded with {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum CrawlerError {
    #[error("Fetch error")]
    Fetch(#[from] FetchError),
    #[error("Database error")]
    DatabaseError(#[from] sqlx::error::Error),
    #[error("CSV error")]
    Csv(#[from] csv::Error),
    #[error("JSON error")]
    Json(#[from] serde_json::Error),
    #[error("IO error")]
    Io(#[from] std::io::Error),
    #[error("Unknown crawler: {0}")]
    UnknownCrawler(String),
    #[error("Unknown feed format: {0}")]
    UnknownFeedFormat(String),
    #[error("{0} is a database feed, not a file feed")]
    NotAFileFeed(String),
    #[error("Feed {path} has header {existing:?}, records have {found:?}")]
    HeaderMismatch {
        path: String,
        existing: String,
        found: String,
    },
    #[error("Cannot append to non-empty JSON feed: {0}")]
    AppendUnsupported(String),
}
