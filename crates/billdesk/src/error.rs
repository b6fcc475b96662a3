//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use billdesk_config::ConfigError;
use billdesk_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the billing backend at {url}")]
    #[diagnostic(
        code(billdesk::connection_failed),
        help(
            "Check that the backend is running and accessible.\n\
             Reason: {reason}\n\
             Try: billdesk --server http://localhost:8080 users list"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(billdesk::timeout),
        help("Increase the timeout with --timeout or check backend responsiveness.")
    )]
    Timeout,

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(billdesk::not_found),
        help("Run: billdesk {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Backend ──────────────────────────────────────────────────────
    #[error("Backend error (HTTP {status}): {message}")]
    #[diagnostic(code(billdesk::backend))]
    Backend { status: u16, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(billdesk::validation))]
    Validation { field: String, reason: String },

    // ── Calls ────────────────────────────────────────────────────────
    #[error("Subscriber {msisdn} cannot start a call with balance {balance:.2}")]
    #[diagnostic(
        code(billdesk::insufficient_balance),
        help("Top up first: billdesk users set-balance {msisdn} <AMOUNT>")
    )]
    InsufficientBalance { msisdn: String, balance: f64 },

    #[error("Cannot {action} a call that is {state}")]
    #[diagnostic(code(billdesk::call_state))]
    CallState { action: String, state: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(billdesk::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: billdesk config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No billing backend configured")]
    #[diagnostic(
        code(billdesk::no_config),
        help(
            "Create a profile with: billdesk config init\n\
             Or pass --server / set BILLDESK_SERVER.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(billdesk::config))]
    Config { message: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not render JSON: {0}")]
    #[diagnostic(code(billdesk::json))]
    Json(#[from] serde_json::Error),

    #[error("Could not render YAML: {0}")]
    #[diagnostic(code(billdesk::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Could not render TOML: {0}")]
    #[diagnostic(code(billdesk::toml))]
    Toml(#[from] toml::ser::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(billdesk::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::CallState { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::Timeout => Self::Timeout,
            CoreError::NotFound {
                entity_type,
                identifier,
            } => Self::NotFound {
                list_command: "users list".into(),
                resource_type: entity_type,
                identifier,
            },
            CoreError::Backend { status, message } => Self::Backend { status, message },
            CoreError::ValidationFailed { field, message } => Self::Validation {
                field,
                reason: message,
            },
            CoreError::InsufficientBalance { msisdn, balance } => {
                Self::InsufficientBalance { msisdn, balance }
            }
            CoreError::InvalidCallState { action, state } => Self::CallState { action, state },
            CoreError::Config { message } => Self::Config { message },
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_family() {
        let not_found: CliError = CoreError::NotFound {
            entity_type: "subscriber".into(),
            identifier: "0700".into(),
        }
        .into();
        assert_eq!(not_found.exit_code(), exit_code::NOT_FOUND);

        let invalid: CliError = CoreError::invalid("price", "must be positive").into();
        assert_eq!(invalid.exit_code(), exit_code::USAGE);

        let down: CliError = CoreError::ConnectionFailed {
            url: "http://localhost:8080".into(),
            reason: "refused".into(),
        }
        .into();
        assert_eq!(down.exit_code(), exit_code::CONNECTION);

        assert_eq!(CliError::from(CoreError::Timeout).exit_code(), exit_code::TIMEOUT);

        let broke: CliError = CoreError::InsufficientBalance {
            msisdn: "0700".into(),
            balance: 0.0,
        }
        .into();
        assert_eq!(broke.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn subscriber_not_found_points_at_users_list() {
        let err: CliError = CoreError::NotFound {
            entity_type: "subscriber".into(),
            identifier: "0700".into(),
        }
        .into();
        match err {
            CliError::NotFound { list_command, .. } => assert_eq!(list_command, "users list"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
