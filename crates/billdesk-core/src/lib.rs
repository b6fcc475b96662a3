// billdesk-core: Domain layer between billdesk-api and the console frontend.

pub mod command;
pub mod config;
pub mod console;
pub mod convert;
pub mod error;
pub mod model;
pub mod query;
pub mod session;
pub mod stats;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::requests::*;
pub use command::{Command, CommandResult, MutationKind};
pub use config::{ConsoleConfig, TlsVerification};
pub use console::Console;
pub use error::CoreError;
pub use query::{MutationStatus, MutationTracker, QueryCache, QueryClient, QueryKey, QueryStatus};
pub use session::{CallClock, CallSession, CallState, CallSummary, check_call_balance, format_elapsed};
pub use stats::{
    BalanceBucket, DEFAULT_PAGE_SIZE, DashboardStats, PAGE_SIZES, Page, check_page_size, paginate,
};

// Re-export model types at the crate root for ergonomics.
pub use model::{CallDuration, Msisdn, PackageClass, ServiceType, Subscriber, TransactionRecord};
