// ── Runtime console configuration ──
//
// These types describe how to reach the billing backend and how the
// console behaves. They never touch disk: the CLI resolves a profile into
// a `ConsoleConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use billdesk_api::{TlsMode, TransportConfig};
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed lab backends).
    DangerAcceptInvalid,
}

/// Configuration for one console session against one backend.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Backend root (e.g., `http://localhost:8080`); `/api/v1` is appended.
    pub server: Url,
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// How long a successful read is served from cache. Zero disables reuse.
    pub stale_time: Duration,
    /// A caller's balance must be strictly greater than this to start a call.
    pub min_call_balance: f64,
}

impl ConsoleConfig {
    pub fn new(server: Url) -> Self {
        Self {
            server,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            stale_time: Duration::from_secs(30),
            min_call_balance: 0.0,
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
        }
    }
}
