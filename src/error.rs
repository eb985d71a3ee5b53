//! Error taxonomy for the sync job.

use thiserror::Error;

/// Errors surfaced by the fetch, parse, and persistence paths.
///
/// The distinction `main` cares about: a feed failure ends the run early
/// with exit code 0 (nothing to sync), everything else that reaches it is
/// fatal with exit code 1.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Network, TLS, timeout, or non-2xx failure from the HTTP client.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The feed document could not be parsed.
    #[error("feed parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Airtable rejected a request; carries the status and body verbatim.
    #[error("airtable api error (status {status}): {body}")]
    Api { status: u16, body: String },

    /// Malformed JSON in an API response or the local store document.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local store file could not be read or written.
    #[error("store i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A constructed URL was invalid.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_includes_status_and_body() {
        let err = SyncError::Api {
            status: 422,
            body: r#"{"error":{"type":"INVALID_VALUE_FOR_COLUMN"}}"#.to_string(),
        };
        let rendered = err.to_string();

        assert!(rendered.contains("422"));
        assert!(rendered.contains("INVALID_VALUE_FOR_COLUMN"));
    }
}
