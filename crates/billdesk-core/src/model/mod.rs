// ── Unified domain model ──
//
// Every type in this module is the canonical representation of a billing
// entity. Consumers (the CLI) depend on these, never on the wire types in
// billdesk-api.

pub mod msisdn;
pub mod package;
pub mod subscriber;
pub mod transaction;

// ── Re-exports ──────────────────────────────────────────────────────

pub use msisdn::Msisdn;
pub use package::PackageClass;
pub use subscriber::Subscriber;
pub use transaction::{CallDuration, ServiceType, TransactionRecord};
