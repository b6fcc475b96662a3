// ── Transaction domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::msisdn::Msisdn;

/// Classification of a billed transaction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
#[non_exhaustive]
pub enum ServiceType {
    #[strum(to_string = "SMS")]
    Sms,
    #[strum(to_string = "Voice Call", serialize = "VOICE_CALL", serialize = "CALL", serialize = "VoiceCall")]
    VoiceCall,
    #[strum(to_string = "Internet", serialize = "DATA", serialize = "INTERNET")]
    Internet,
}

/// A settled transaction as reported by the backend. Immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: Option<i64>,
    pub sender: Option<Msisdn>,
    /// Receiving party, or the consumer for data usage.
    pub receiver: Option<Msisdn>,
    pub service_type: Option<ServiceType>,
    /// SMS body; empty for other service types.
    pub content: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub amount: Option<f64>,
}

/// Result of the call-duration lookup.
///
/// The same endpoint answers with either the seconds a subscriber can
/// afford or their transaction history, depending on backend build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CallDuration {
    Seconds(f64),
    History(Vec<TransactionRecord>),
}

impl CallDuration {
    /// Total voice seconds implied by the response, if it carries any.
    pub fn seconds(&self) -> Option<f64> {
        match self {
            Self::Seconds(s) => Some(*s),
            Self::History(_) => None,
        }
    }
}
