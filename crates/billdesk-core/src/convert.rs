// ── API-to-domain type conversions ──
//
// Bridges raw `billdesk_api` response types into canonical
// `billdesk_core::model` domain types. Each `From` impl normalizes field
// names, parses strings into strong types, and fills defaults for missing
// optional data.

use billdesk_api::types::{CallDurationResponse, TransactionResponse, UserResponse};

use crate::model::{CallDuration, Msisdn, ServiceType, Subscriber, TransactionRecord};

// ── Helpers ────────────────────────────────────────────────────────

/// Treat blank strings from the backend as absent.
fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

/// Unknown service labels are dropped rather than failing the whole record.
fn parse_service_type(raw: Option<&str>) -> Option<ServiceType> {
    raw.and_then(|s| s.trim().parse().ok())
}

// ── Subscriber ─────────────────────────────────────────────────────

impl From<UserResponse> for Subscriber {
    fn from(u: UserResponse) -> Self {
        Self {
            msisdn: Msisdn::from_backend(u.msisdn),
            user_id: u.user_id,
            name: u.name,
            balance: u.balance,
            nin: non_blank(u.nin),
            is_active: u.is_active,
            spn: non_blank(u.spn),
            imsi: non_blank(u.imsi),
        }
    }
}

// ── Transaction ────────────────────────────────────────────────────

impl From<TransactionResponse> for TransactionRecord {
    fn from(t: TransactionResponse) -> Self {
        Self {
            id: t.transaction_id,
            sender: non_blank(t.sender).map(Msisdn::from_backend),
            receiver: non_blank(t.receiver).map(Msisdn::from_backend),
            service_type: parse_service_type(t.service_type.as_deref()),
            content: t.content.unwrap_or_default(),
            timestamp: t.timestamp,
            amount: t.amount,
        }
    }
}

impl From<CallDurationResponse> for CallDuration {
    fn from(r: CallDurationResponse) -> Self {
        match r {
            CallDurationResponse::Seconds(s) => Self::Seconds(s),
            CallDurationResponse::History(items) => {
                Self::History(items.into_iter().map(TransactionRecord::from).collect())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn subscriber_drops_blank_identity_fields() {
        let raw: UserResponse = serde_json::from_value(json!({
            "userId": 3, "name": "Ana", "msisdn": " 250788000001 ", "balance": 12.5,
            "nin": "", "isActive": true, "spn": "MTN", "imsi": "  "
        }))
        .unwrap();

        let sub = Subscriber::from(raw);
        assert_eq!(sub.msisdn.as_str(), "250788000001");
        assert_eq!(sub.nin, None);
        assert_eq!(sub.spn.as_deref(), Some("MTN"));
        assert_eq!(sub.imsi, None);
    }

    #[test]
    fn transaction_maps_service_type_and_content() {
        let raw: TransactionResponse = serde_json::from_value(json!({
            "transactionId": 5, "consumer": "250788000001",
            "serviceType": "INTERNET", "amount": 2.0
        }))
        .unwrap();

        let tx = TransactionRecord::from(raw);
        assert_eq!(tx.service_type, Some(ServiceType::Internet));
        assert_eq!(tx.receiver.unwrap().as_str(), "250788000001");
        assert_eq!(tx.sender, None);
        assert_eq!(tx.content, "");
    }

    #[test]
    fn unknown_service_type_is_none() {
        let raw: TransactionResponse =
            serde_json::from_value(json!({ "serviceType": "MMS" })).unwrap();
        assert_eq!(TransactionRecord::from(raw).service_type, None);
    }
}
