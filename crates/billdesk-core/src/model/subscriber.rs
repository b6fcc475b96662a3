// ── Subscriber domain type ──

use serde::{Deserialize, Serialize};

use super::msisdn::Msisdn;

/// The canonical subscriber record.
///
/// Balance is owned by the backend; the console only ever displays it or
/// asks the backend to overwrite it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    pub msisdn: Msisdn,
    pub user_id: Option<i64>,
    pub name: String,
    pub balance: f64,
    pub nin: Option<String>,
    pub is_active: bool,

    // Carrier identity
    pub spn: Option<String>,
    pub imsi: Option<String>,
}

impl Subscriber {
    /// Whether the balance clears a call-start threshold (strictly greater).
    pub fn can_afford(&self, threshold: f64) -> bool {
        self.balance > threshold
    }
}
