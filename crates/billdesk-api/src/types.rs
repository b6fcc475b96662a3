// Wire types for the billing backend.
//
// Field names follow the backend's camelCase JSON. Numbers come back as
// plain JSON numbers; monetary values are f64 on the wire.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ── Response envelope ────────────────────────────────────────────────

/// `{ "data": ..., "message": ... }` wrapper used by most endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
    #[serde(default)]
    pub message: Option<String>,
}

/// All response shapes the backend has been seen to produce.
///
/// The user list arrives as `[{ "data": [...] }]`, detail lookups as
/// `{ "data": {...} }`, and some endpoints return the payload bare.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Batched(Vec<DataEnvelope<T>>),
    Wrapped(DataEnvelope<T>),
    Bare(T),
}

impl<T> Envelope<T> {
    /// Strip the envelope. A batched response yields its first entry.
    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Batched(items) => items.into_iter().next().map(|e| e.data),
            Self::Wrapped(e) => Some(e.data),
            Self::Bare(data) => Some(data),
        }
    }
}

// ── Users ────────────────────────────────────────────────────────────

/// Subscriber record as returned by `/traditional-users/*`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(default)]
    pub user_id: Option<i64>,
    pub msisdn: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub nin: Option<String>,
    #[serde(default, alias = "active")]
    pub is_active: bool,
    #[serde(default)]
    pub spn: Option<String>,
    #[serde(default)]
    pub imsi: Option<String>,
}

/// Body for `POST /traditional-users/register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterUserBody<'a> {
    pub name: &'a str,
    pub balance: f64,
    pub nin: &'a str,
}

// ── Transactions ─────────────────────────────────────────────────────

/// Transaction record produced by `/traditional-transactions/*`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    #[serde(default, alias = "id")]
    pub transaction_id: Option<i64>,
    #[serde(default)]
    pub sender: Option<String>,
    /// For data usage, the consuming subscriber.
    #[serde(default, alias = "consumer")]
    pub receiver: Option<String>,
    #[serde(default, alias = "type", alias = "transactionType")]
    pub service_type: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(
        default,
        alias = "timeStamp",
        alias = "date",
        deserialize_with = "deserialize_timestamp"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, alias = "cost", alias = "price")]
    pub amount: Option<f64>,
}

/// Response of the call-duration lookup.
///
/// Some backend builds answer with the number of seconds the subscriber
/// can afford, others with the subscriber's transaction history.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CallDurationResponse {
    Seconds(f64),
    History(Vec<TransactionResponse>),
}

// ── Packages ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternetPackageBody {
    pub internet_package_price: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoicePackageBody {
    pub voice_package_price: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsPackageBody {
    pub sms_package_price: f64,
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Accept RFC 3339, zone-less ISO local times (read as UTC), or epoch millis.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            }),
        Some(serde_json::Value::Number(n)) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn batched_envelope_yields_first_entry() {
        let raw = json!([{ "data": [{ "msisdn": "250788000001", "name": "Ana", "balance": 10.0 }] }]);
        let env: Envelope<Vec<UserResponse>> = serde_json::from_value(raw).unwrap();
        let users = env.into_data().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].msisdn, "250788000001");
    }

    #[test]
    fn wrapped_and_bare_detail_both_decode() {
        let wrapped = json!({ "data": { "msisdn": "1", "name": "A", "balance": 1.5, "isActive": true } });
        let bare = json!({ "msisdn": "1", "name": "A", "balance": 1.5, "isActive": true });

        let a: Envelope<UserResponse> = serde_json::from_value(wrapped).unwrap();
        let b: Envelope<UserResponse> = serde_json::from_value(bare).unwrap();
        assert!(a.into_data().unwrap().is_active);
        assert!((b.into_data().unwrap().balance - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_batch_has_no_data() {
        let env: Envelope<Vec<UserResponse>> = serde_json::from_value(json!([])).unwrap();
        // An empty array matches the batched shape before the bare one.
        assert!(env.into_data().is_none());
    }

    #[test]
    fn timestamp_accepts_local_iso_and_millis() {
        let a: TransactionResponse =
            serde_json::from_value(json!({ "timestamp": "2024-06-15T10:30:00" })).unwrap();
        let b: TransactionResponse =
            serde_json::from_value(json!({ "timestamp": 1_718_447_400_000_i64 })).unwrap();
        assert_eq!(a.timestamp, b.timestamp);
    }

    #[test]
    fn call_duration_decodes_number_or_history() {
        let secs: CallDurationResponse = serde_json::from_value(json!(120)).unwrap();
        assert!(matches!(secs, CallDurationResponse::Seconds(s) if (s - 120.0).abs() < f64::EPSILON));

        let hist: CallDurationResponse =
            serde_json::from_value(json!([{ "sender": "1", "receiver": "2", "serviceType": "SMS" }]))
                .unwrap();
        assert!(matches!(hist, CallDurationResponse::History(h) if h.len() == 1));
    }

    #[test]
    fn package_bodies_use_backend_field_names() {
        let body = serde_json::to_value(SmsPackageBody { sms_package_price: 2.5 }).unwrap();
        assert_eq!(body, json!({ "smsPackagePrice": 2.5 }));
    }
}
