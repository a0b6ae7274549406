use thiserror::Error;

/// Recoverable failure raised by a single extractor's run.
///
/// Nothing here ever crosses the `scrape()` boundary: the validity gate
/// converts any variant into the demo-record substitution. Malformed embedded
/// blobs are recovered even earlier, inside the extractor, by falling through
/// to the next field source.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no usable content from {url}: {reason}")]
    Unusable { url: String, reason: String },
}
