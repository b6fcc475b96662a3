// ── Command API ──
//
// All write operations flow through a unified `Command` enum. The console
// validates each variant, routes it to the matching `BillingClient`
// endpoint, and invalidates the read keys it touched.

pub mod requests;

use serde::Serialize;
use strum::{Display, EnumString};

use crate::error::CoreError;
use crate::model::{Subscriber, TransactionRecord};
use crate::query::QueryKey;

use self::requests::{
    ConsumeDataRequest, GenerateUsersRequest, PackagePrice, RegisterUserRequest,
    TransactionRequest, UpdateBalanceRequest, Validate,
};

/// All possible write operations against the billing backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // ── Subscribers ──────────────────────────────────────────────────
    RegisterUser(RegisterUserRequest),
    GenerateUsers(GenerateUsersRequest),
    UpdateBalance(UpdateBalanceRequest),

    // ── Transactions ─────────────────────────────────────────────────
    Transaction(TransactionRequest),
    ConsumeData(ConsumeDataRequest),

    // ── Packages ─────────────────────────────────────────────────────
    SetPackagePrice(PackagePrice),
}

/// Mutation family, one tracker per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum MutationKind {
    RegisterUser,
    GenerateUsers,
    UpdateBalance,
    SendSms,
    PlaceCall,
    ConsumeInternet,
    ConsumeData,
    SetPackagePrice,
}

impl Command {
    pub fn kind(&self) -> MutationKind {
        match self {
            Self::RegisterUser(_) => MutationKind::RegisterUser,
            Self::GenerateUsers(_) => MutationKind::GenerateUsers,
            Self::UpdateBalance(_) => MutationKind::UpdateBalance,
            Self::Transaction(TransactionRequest::Sms(_)) => MutationKind::SendSms,
            Self::Transaction(TransactionRequest::Call(_)) => MutationKind::PlaceCall,
            Self::Transaction(TransactionRequest::Internet(_)) => MutationKind::ConsumeInternet,
            Self::ConsumeData(_) => MutationKind::ConsumeData,
            Self::SetPackagePrice(_) => MutationKind::SetPackagePrice,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::RegisterUser(r) => r.validate(),
            Self::GenerateUsers(r) => r.validate(),
            Self::UpdateBalance(r) => r.validate(),
            Self::Transaction(r) => r.validate(),
            Self::ConsumeData(r) => r.validate(),
            Self::SetPackagePrice(r) => r.validate(),
        }
    }

    /// Read keys whose cached value a successful run makes stale.
    ///
    /// Transactions move balances, so they touch every participant as well
    /// as the list. Package prices affect no cached read.
    pub fn invalidates(&self) -> Vec<QueryKey> {
        match self {
            Self::RegisterUser(_) | Self::GenerateUsers(_) => vec![QueryKey::AllUsers],
            Self::UpdateBalance(r) => vec![
                QueryKey::AllUsers,
                QueryKey::UserDetail(r.msisdn.clone()),
                QueryKey::CallDuration(r.msisdn.clone()),
            ],
            Self::Transaction(t) => {
                let mut keys = vec![QueryKey::AllUsers];
                for party in t.parties() {
                    keys.push(QueryKey::UserDetail(party.clone()));
                    keys.push(QueryKey::CallDuration(party.clone()));
                }
                keys
            }
            Self::ConsumeData(r) => vec![
                QueryKey::AllUsers,
                QueryKey::UserDetail(r.consumer.clone()),
                QueryKey::CallDuration(r.consumer.clone()),
            ],
            Self::SetPackagePrice(_) => Vec::new(),
        }
    }
}

/// Result of a command execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CommandResult {
    Subscriber(Option<Subscriber>),
    Transaction(Option<TransactionRecord>),
    /// Untyped acknowledgement body (`null` when the backend sent nothing).
    Ack(serde_json::Value),
}
