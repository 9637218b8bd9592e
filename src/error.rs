//! Error types for the CoinGecko client.

/// Errors surfaced by the API client. Everything here is fatal to the
/// run except where the client recovers internally (a 429 below the
/// retry ceiling never reaches the caller).
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Transport or body-decode failure from reqwest.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream kept answering 429 until the retry ceiling.
    #[error("rate limited on {path}: gave up after {attempts} retries")]
    RateLimited { path: String, attempts: u32 },

    /// Non-success, non-429 status from the upstream.
    #[error("upstream returned {status} for {path}: {body}")]
    Status {
        status: reqwest::StatusCode,
        path: String,
        body: String,
    },
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_names_the_path() {
        let err = ApiError::RateLimited {
            path: "/coins/categories".into(),
            attempts: 30,
        };
        let msg = err.to_string();
        assert!(msg.contains("/coins/categories"));
        assert!(msg.contains("30"));
    }

    #[test]
    fn status_error_carries_body() {
        let err = ApiError::Status {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            path: "/coins/markets".into(),
            body: "boom".into(),
        };
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("boom"));
    }
}
