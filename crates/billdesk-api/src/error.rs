use thiserror::Error;

/// Top-level error type for the `billdesk-api` crate.
///
/// Every backend call surfaces one of these instead of resolving to an
/// empty value, so callers can tell "no data yet" apart from "the request
/// failed". `billdesk-core` maps these into domain diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be built (bad CA file, TLS backend, etc.)
    #[error("HTTP client setup failed: {0}")]
    Http(String),

    // ── Backend ─────────────────────────────────────────────────────
    /// Non-2xx response from the billing backend.
    #[error("Backend error (HTTP {status}): {message}")]
    Backend { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the backend reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Backend { status: 404, .. } => true,
            _ => false,
        }
    }

    /// HTTP status code, when the failure came with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_404_is_not_found() {
        let err = Error::Backend {
            status: 404,
            message: "user not found".into(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn deserialization_has_no_status() {
        let err = Error::Deserialization {
            message: "expected value".into(),
            body: "<html>".into(),
        };
        assert_eq!(err.status(), None);
        assert!(!err.is_not_found());
    }
}
