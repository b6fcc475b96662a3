// ── Core error types ──
//
// User-facing errors from billdesk-core. These are NOT transport-specific:
// consumers never see reqwest errors or JSON parse failures directly.
// The `From<billdesk_api::Error>` impl translates them into domain variants.
//
// `CoreError` is `Clone` so a single failed read can be handed to every
// caller that was coalesced onto it.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach billing backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Billing backend timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Backend rejected the request (HTTP {status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Invalid {field}: {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Subscriber {msisdn} has insufficient balance ({balance:.2}) to start a call")]
    InsufficientBalance { msisdn: String, balance: f64 },

    #[error("Cannot {action} a call that is {state}")]
    InvalidCallState { action: String, state: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a validation failure on a named field.
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns `true` for failures caught before any request was sent.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::ValidationFailed { .. }
                | Self::InsufficientBalance { .. }
                | Self::InvalidCallState { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<billdesk_api::Error> for CoreError {
    fn from(err: billdesk_api::Error) -> Self {
        match err {
            billdesk_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Backend {
                        status: e.status().map_or(0, |s| s.as_u16()),
                        message: e.to_string(),
                    }
                }
            }
            billdesk_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            billdesk_api::Error::Http(message) => CoreError::Config { message },
            billdesk_api::Error::Backend {
                status: 404,
                message,
            } => CoreError::NotFound {
                entity_type: "resource".into(),
                identifier: message,
            },
            billdesk_api::Error::Backend { status, message } => {
                CoreError::Backend { status, message }
            }
            billdesk_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_404_maps_to_not_found() {
        let err = CoreError::from(billdesk_api::Error::Backend {
            status: 404,
            message: "no subscriber with MSISDN 1".into(),
        });
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn backend_status_is_kept() {
        let err = CoreError::from(billdesk_api::Error::Backend {
            status: 422,
            message: "Insufficient balance".into(),
        });
        assert_eq!(
            err,
            CoreError::Backend {
                status: 422,
                message: "Insufficient balance".into()
            }
        );
    }

    #[test]
    fn validation_is_local() {
        assert!(CoreError::invalid("price", "must be non-negative").is_local());
        assert!(!CoreError::Timeout.is_local());
    }
}
