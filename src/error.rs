use thiserror::Error;

#[derive(Error, Debug)]
pub enum ZendeskError {
    /// Transport-level failure: the request never produced a response.
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("authentication failed")]
    Authentication,

    /// The API kept answering 429 after all retries were spent.
    #[error("rate limit exceeded")]
    RateLimit { retry_after: Option<u64> },

    /// Non-2xx response carrying a structured error body.
    #[error("API error {status} {status_text}: {message}")]
    Api {
        status: u16,
        status_text: String,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// A paged search failed mid-sequence; `page` is the page that failed.
    #[error("search failed on page {page} for query {query:?}: {source}")]
    Search {
        query: String,
        page: u32,
        #[source]
        source: Box<ZendeskError>,
    },

    #[error("invalid search criteria: {0}")]
    InvalidSearchCriteria(String),

    #[error("job {job_id} did not complete within {timeout_ms}ms")]
    JobTimeout { job_id: String, timeout_ms: u64 },

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, ZendeskError>;
