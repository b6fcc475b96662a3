// ── Typed request structs for Command payloads ──
//
// Every write the console can perform is one of these strongly-typed
// requests. `Validate` runs before anything is serialized; a failure
// never reaches the network.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{Msisdn, PackageClass};

/// Client-side validation performed before a request is sent.
pub trait Validate {
    fn validate(&self) -> Result<(), CoreError>;
}

// ── Field rules ────────────────────────────────────────────────────

fn require_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::invalid(field, "must not be empty"));
    }
    Ok(())
}

fn require_amount(field: &str, value: f64) -> Result<(), CoreError> {
    if !value.is_finite() {
        return Err(CoreError::invalid(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(CoreError::invalid(field, "must be non-negative"));
    }
    Ok(())
}

fn require_positive(field: &str, value: u64) -> Result<(), CoreError> {
    if value < 1 {
        return Err(CoreError::invalid(field, "must be at least 1"));
    }
    Ok(())
}

/// Parse free-form numeric input into a non-negative finite amount.
pub fn parse_amount(field: &str, raw: &str) -> Result<f64, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::invalid(field, "must not be empty"));
    }
    let value: f64 = trimmed
        .parse()
        .map_err(|_| CoreError::invalid(field, format!("'{trimmed}' is not a number")))?;
    require_amount(field, value)?;
    Ok(value)
}

// ── Transactions ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmsRequest {
    pub sender: Msisdn,
    pub receiver: Msisdn,
    pub content: String,
}

impl Validate for SmsRequest {
    fn validate(&self) -> Result<(), CoreError> {
        require_text("sender", self.sender.as_str())?;
        require_text("receiver", self.receiver.as_str())?;
        require_text("content", &self.content)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRequest {
    pub sender: Msisdn,
    pub receiver: Msisdn,
    pub duration_secs: u64,
}

impl Validate for CallRequest {
    fn validate(&self) -> Result<(), CoreError> {
        require_text("sender", self.sender.as_str())?;
        require_text("receiver", self.receiver.as_str())?;
        require_positive("duration", self.duration_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternetRequest {
    pub consumer: Msisdn,
    pub data_size_mb: u64,
}

impl Validate for InternetRequest {
    fn validate(&self) -> Result<(), CoreError> {
        require_text("consumer", self.consumer.as_str())?;
        require_positive("data size", self.data_size_mb)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumeDataRequest {
    pub consumer: Msisdn,
}

impl Validate for ConsumeDataRequest {
    fn validate(&self) -> Result<(), CoreError> {
        require_text("consumer", self.consumer.as_str())
    }
}

/// A billable transaction, tagged by service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionRequest {
    Sms(SmsRequest),
    Call(CallRequest),
    Internet(InternetRequest),
}

impl TransactionRequest {
    /// Subscribers whose balance the transaction touches.
    pub fn parties(&self) -> Vec<&Msisdn> {
        match self {
            Self::Sms(r) => vec![&r.sender, &r.receiver],
            Self::Call(r) => vec![&r.sender, &r.receiver],
            Self::Internet(r) => vec![&r.consumer],
        }
    }
}

impl Validate for TransactionRequest {
    fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::Sms(r) => r.validate(),
            Self::Call(r) => r.validate(),
            Self::Internet(r) => r.validate(),
        }
    }
}

// ── Packages ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PackagePrice {
    pub class: PackageClass,
    pub price: f64,
}

impl Validate for PackagePrice {
    fn validate(&self) -> Result<(), CoreError> {
        require_amount("price", self.price)
    }
}

// ── Users ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub name: String,
    pub balance: f64,
    pub nin: String,
}

impl Validate for RegisterUserRequest {
    fn validate(&self) -> Result<(), CoreError> {
        require_text("name", &self.name)?;
        require_text("nin", &self.nin)?;
        require_amount("balance", self.balance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateUsersRequest {
    pub count: u32,
}

impl Validate for GenerateUsersRequest {
    fn validate(&self) -> Result<(), CoreError> {
        require_positive("count", u64::from(self.count))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateBalanceRequest {
    pub msisdn: Msisdn,
    pub new_balance: f64,
}

impl Validate for UpdateBalanceRequest {
    fn validate(&self) -> Result<(), CoreError> {
        require_text("msisdn", self.msisdn.as_str())?;
        require_amount("balance", self.new_balance)
    }
}
